//! Compact duration tokens (`PT10H30M`).

use once_cell::sync::Lazy;
use regex_lite::Regex;
use thiserror::Error;

static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?$").unwrap()
});

/// A duration token that does not follow `PT<h>H<m>M`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Malformed duration: {0:?}")]
pub struct DurationError(pub String);

/// Convert a `PT<h>H<m>M` token to whole minutes.
///
/// Either component may be absent and counts as zero, but at least one must
/// be present and hours always come first.
pub fn parse_duration_minutes(token: &str) -> Result<u32, DurationError> {
    let malformed = || DurationError(token.to_string());

    let caps = DURATION_RE.captures(token).ok_or_else(malformed)?;
    let hours = caps.get(1);
    let minutes = caps.get(2);
    if hours.is_none() && minutes.is_none() {
        return Err(malformed());
    }

    let hours = component(hours).ok_or_else(malformed)?;
    let minutes = component(minutes).ok_or_else(malformed)?;

    hours
        .checked_mul(60)
        .and_then(|h| h.checked_add(minutes))
        .ok_or_else(malformed)
}

/// Numeric value of an optional capture; absent is zero, overflow is `None`.
fn component(m: Option<regex_lite::Match<'_>>) -> Option<u32> {
    match m {
        Some(m) => m.as_str().parse().ok(),
        None => Some(0),
    }
}
