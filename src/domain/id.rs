//! Container identifiers
//!
//! Container IDs are user-assigned, opaque and case-sensitive. The only
//! structure the application imposes is on *generated* IDs, which follow
//! `{prefix}-{sequence}` with a zero-padded sequence (e.g. `BIN-007`).
//!
//! Generated sequences continue from the highest existing numeric suffix,
//! so gaps left by deleted containers are never reused and a generated
//! ID can never collide with a stored one.

use thiserror::Error;

/// Default prefix for generated container IDs
pub const DEFAULT_PREFIX: &str = "BIN";

/// Default zero-padding width for generated sequences
pub const DEFAULT_WIDTH: usize = 3;

/// Longest decoded scan payload accepted as a container ID
pub const MAX_SCANNED_ID_LEN: usize = 200;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Scanned code is empty")]
    EmptyScan,

    #[error("Scanned code is too long ({0} characters, max 200)")]
    ScanTooLong(usize),

    #[error("Container ID must not be empty")]
    EmptyId,

    #[error("No sequence numbers left after {prefix}-{last}")]
    SequenceExhausted { prefix: String, last: u64 },
}

/// Validates a user-supplied container ID
pub fn container_id(raw: &str) -> Result<String, IdError> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(IdError::EmptyId);
    }
    Ok(id.to_string())
}

/// Turns decoded scanner text into a candidate container ID
pub fn scanned_id(decoded: &str) -> Result<String, IdError> {
    let id = decoded.trim();
    if id.is_empty() {
        return Err(IdError::EmptyScan);
    }

    let len = id.chars().count();
    if len > MAX_SCANNED_ID_LEN {
        return Err(IdError::ScanTooLong(len));
    }

    Ok(id.to_string())
}

/// Returns the numeric suffix of `id` if it has the exact shape `{prefix}-{digits}`
pub fn sequence_number(id: &str, prefix: &str) -> Option<u64> {
    let digits = id.strip_prefix(prefix)?.strip_prefix('-')?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Returns the next free sequence number: `max(existing suffixes) + 1`
///
/// Suffixes too large for a `u64` are ignored; no generated ID can spell
/// them anyway.
pub fn next_sequence<'a>(
    ids: impl IntoIterator<Item = &'a str>,
    prefix: &str,
) -> Result<u64, IdError> {
    let last = ids
        .into_iter()
        .filter_map(|id| sequence_number(id, prefix))
        .max()
        .unwrap_or(0);

    last.checked_add(1).ok_or_else(|| IdError::SequenceExhausted {
        prefix: prefix.to_string(),
        last,
    })
}

/// Formats a generated container ID
pub fn format_id(prefix: &str, sequence: u64, width: usize) -> String {
    format!("{}-{:0width$}", prefix, sequence, width = width)
}

/// Generates `count` sequential IDs that do not collide with `existing`
///
/// Fails rather than wrapping or repeating when the sequence runs out.
pub fn sequential_ids(
    existing: &[String],
    prefix: &str,
    width: usize,
    count: usize,
) -> Result<Vec<String>, IdError> {
    let start = next_sequence(existing.iter().map(String::as_str), prefix)?;

    (0..count as u64)
        .map(|offset| {
            start
                .checked_add(offset)
                .map(|sequence| format_id(prefix, sequence, width))
                .ok_or_else(|| IdError::SequenceExhausted {
                    prefix: prefix.to_string(),
                    last: u64::MAX,
                })
        })
        .collect()
}
