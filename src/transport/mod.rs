// Custodian — Transport Module
//
// The module is reached through a local proxy executable. One request is one
// child process: the mode, module serial and PIN go on the command line, the
// request lines go to stdin, and the full response is read from stdout.

mod error;
mod mode;
mod process;

use zeroize::Zeroizing;

pub use error::TransportError;
pub use mode::KeyMode;
pub use process::{ProcessTransport, DEFAULT_PROXY_EXECUTABLE, DEFAULT_TIMEOUT};

/// Operator PIN for the module. Never logged, wiped on drop.
#[derive(Clone)]
pub struct Pin(Zeroizing<String>);

impl Pin {
    pub fn new(pin: impl Into<String>) -> Self {
        Self(Zeroizing::new(pin.into()))
    }

    /// Borrow the PIN for handing to the proxy process.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Pin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Pin([REDACTED])")
    }
}

/// Synchronous request/response channel to the module.
pub trait Transport {
    /// Run one exchange and return the raw response text, line breaks intact.
    fn exchange(
        &self,
        mode: KeyMode,
        module_serial: &str,
        pin: &Pin,
        request_lines: &[String],
    ) -> Result<String, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn exchange(
        &self,
        mode: KeyMode,
        module_serial: &str,
        pin: &Pin,
        request_lines: &[String],
    ) -> Result<String, TransportError> {
        (**self).exchange(mode, module_serial, pin, request_lines)
    }
}

// ─── In-Memory Mock for Testing ──────────────────────────────────────────────


// ─── Tests ───────────────────────────────────────────────────────────────────
