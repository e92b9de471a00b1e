//! The scannable access code value.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of random bytes backing a generated code (160 bits).
const CODE_BYTES: usize = 20;

/// The opaque, scannable value a credential is presented as.
///
/// Generated from OS randomness; 160 bits makes guessing a live code
/// infeasible. Codes are compared exactly and carry no structure the
/// gate could parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessCode(String);

impl AccessCode {
    /// Generate a fresh random code.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; CODE_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Wrap a code value presented at a gate.
    ///
    /// No validation happens here; an unknown or malformed value simply
    /// fails to resolve at verification time.
    pub fn from_value(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The code as a string slice (what gets rendered into the QR).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccessCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
