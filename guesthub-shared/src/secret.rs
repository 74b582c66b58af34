use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Wraps a sensitive value (passwords, raw tokens) so it never shows up in
/// `Debug`/`Display` output, including `tracing` fields.
///
/// Deserializes transparently from the inner value. Serializing writes a mask, so a
/// `Masked` field echoed back in a response cannot leak the secret either.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Masked<T>(T);

const MASK: &str = "********";

impl<T> Masked<T> {
    /// Access the secret. Call sites should be easy to grep for.
    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK)
    }
}

impl<T> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK)
    }
}

impl<T> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(MASK)
    }
}

impl From<&str> for Masked<String> {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for Masked<String> {
    fn from(value: String) -> Self {
        Self(value)
    }
}
