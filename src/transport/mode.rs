// Custodian — Operation modes understood by the module proxy

use std::fmt;

/// What the module should do with the vault slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyMode {
    /// Generate a fresh key for the slot and return it.
    CreateKey,
    /// Return the key already stored in the slot.
    RetrieveKey,
}

impl KeyMode {
    /// The tag passed as the proxy's first argument.
    pub fn as_str(self) -> &'static str {
        match self {
            KeyMode::CreateKey => "create-key",
            KeyMode::RetrieveKey => "retrieve-key",
        }
    }
}

impl fmt::Display for KeyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
