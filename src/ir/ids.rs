//! Opaque identifiers for applicability rules.
//!
//! Rule ids exist for UI keying only: they are generated on creation and
//! import, are not stable across round trips, and uniqueness is best-effort.

use rand::{Rng, RngExt};
use serde::{Deserialize, Serialize};
use std::fmt;

const ID_PREFIX: &str = "id_";
const ID_RANDOM_LEN: usize = 7;
const BASE36_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Identifier of a single applicability rule.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(pub String);

impl RuleId {
    /// Creates a RuleId from an existing string.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh id of the form `id_xxxxxxx` (seven base-36 chars).
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        Self::generate_with(&mut rng)
    }

    /// Generates a fresh id from the given random source.
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut id = String::with_capacity(ID_PREFIX.len() + ID_RANDOM_LEN);
        id.push_str(ID_PREFIX);
        for _ in 0..ID_RANDOM_LEN {
            let idx = rng.random_range(0..BASE36_ALPHABET.len());
            id.push(BASE36_ALPHABET[idx] as char);
        }
        Self(id)
    }

    /// Returns the underlying string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RuleId({})", self.0)
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RuleId {
    fn from(id: &str) -> Self {
        RuleId::new(id)
    }
}

impl From<String> for RuleId {
    fn from(id: String) -> Self {
        RuleId(id)
    }
}
