use chrono::{DateTime, Utc};
use rand::Rng;

pub const EXECUTION_NAME_PREFIX: &str = "execution";
pub const RANDOM_SUFFIX_LEN: usize = 6;

const BASE36_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `execution-<unix millis>-<base36 suffix>`.
///
/// Uniqueness is best effort; a collision is rejected by the orchestrator.
pub fn execution_name(now: DateTime<Utc>, rng: &mut impl Rng) -> String {
    let suffix: String = (0..RANDOM_SUFFIX_LEN)
        .map(|_| BASE36_ALPHABET[rng.gen_range(0..BASE36_ALPHABET.len())] as char)
        .collect();
    format!(
        "{EXECUTION_NAME_PREFIX}-{}-{suffix}",
        now.timestamp_millis()
    )
}

pub fn new_execution_name() -> String {
    execution_name(Utc::now(), &mut rand::thread_rng())
}
