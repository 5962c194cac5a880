//! Transaction reference generation.
//!
//! References look like `TXN_1736931600000_k3j9x0a2b`: a prefix, the unix
//! time in milliseconds and nine random base36 characters.

use chrono::{DateTime, Utc};
use rand::Rng;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 9;

/// Generates a new transaction reference.
#[must_use]
pub fn generate_reference(prefix: &str, now: DateTime<Utc>) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
        .collect();

    format!("{prefix}_{}_{suffix}", now.timestamp_millis())
}
