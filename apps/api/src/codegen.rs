use rand::{distributions::Alphanumeric, Rng};

/// Default join code length.
pub const DEFAULT_CODE_LENGTH: usize = 8;

/// Random case-sensitive alphanumeric code. Uniqueness is the caller's job.
pub fn generate_code(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
