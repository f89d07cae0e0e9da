//! Job submissions: the typed request model and the validator that produces it.
//!
//! Downstream components only ever see a [`Submission`] that came out of
//! [`validate_submission`], so nothing past the HTTP boundary re-checks shape.

mod types;
mod validate;

pub use types::{Filters, Submission, TimeWindow, Traveler};
pub use validate::{validate_submission, ValidationError};
