//! Human-friendly note identifiers.
//!
//! Counter values are encoded with hashids under a fixed salt and minimum
//! length, so consecutive notes do not get visibly consecutive ids. This is
//! obfuscation only: access is still gated by the password digest.

use crate::config::Config;
use harsh::Harsh;

/// Deterministic counter-to-id encoder
pub struct IdGenerator {
    harsh: Harsh,
}

impl IdGenerator {
    pub fn new(salt: &str, min_length: usize) -> Result<Self, harsh::BuildError> {
        let harsh = Harsh::builder().salt(salt).length(min_length).build()?;
        Ok(Self { harsh })
    }

    pub fn from_config(config: &Config) -> Result<Self, harsh::BuildError> {
        Self::new(&config.id_salt, config.id_min_length)
    }

    /// Encode a counter value. Same input, same id.
    pub fn encode(&self, counter: u64) -> String {
        self.harsh.encode(&[counter])
    }
}
