//! Challenge format and the checks that precede signature verification.
//!
//! A challenge is `<address>:<unix seconds>:starRegistry`. It carries its own
//! issue time, so nothing is tracked between issuance and submission.

use crate::constants::{CHALLENGE_TAG, CHALLENGE_WINDOW_SECS};
use crate::error::ClaimError;

pub fn challenge_message(address: &str, now: i64) -> String {
    format!("{address}:{now}:{CHALLENGE_TAG}")
}

/// An address containing ':' would yield a challenge that can never parse.
pub(crate) fn check_address(address: &str) -> Result<(), ClaimError> {
    if address.is_empty() || address.contains(':') {
        return Err(ClaimError::InvalidAddress(address.to_string()));
    }
    Ok(())
}

/// Checks the message shape and owner, returning the embedded issue time.
pub(crate) fn parse_challenge(message: &str, address: &str) -> Result<i64, ClaimError> {
    let parts: Vec<&str> = message.split(':').collect();
    let [owner, issued, tag] = parts.as_slice() else {
        return Err(ClaimError::MalformedMessage(format!(
            "expected 3 ':'-separated parts, found {}",
            parts.len()
        )));
    };
    if *tag != CHALLENGE_TAG {
        return Err(ClaimError::MalformedMessage(format!(
            "unexpected tag {tag:?}"
        )));
    }
    if *owner != address {
        return Err(ClaimError::AddressMismatch {
            expected: owner.to_string(),
            claimed: address.to_string(),
        });
    }
    // digits only, so a challenge has exactly one spelling
    if issued.is_empty() || !issued.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ClaimError::InvalidTimestamp(issued.to_string()));
    }
    match issued.parse::<i64>() {
        Ok(ts) if ts > 0 => Ok(ts),
        _ => Err(ClaimError::InvalidTimestamp(issued.to_string())),
    }
}

/// A negative elapsed time (clock moved backwards) counts as fresh.
pub(crate) fn check_window(now: i64, issued: i64) -> Result<(), ClaimError> {
    let elapsed = now.saturating_sub(issued);
    if elapsed >= CHALLENGE_WINDOW_SECS {
        return Err(ClaimError::ChallengeExpired {
            elapsed,
            window: CHALLENGE_WINDOW_SECS,
        });
    }
    Ok(())
}
