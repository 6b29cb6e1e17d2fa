// Custodian — Subprocess Transport
//
// Spawns the module proxy once per exchange:
//
//   <proxy> <mode> <module-serial> <pin>
//
// writes the request lines to its stdin, closes stdin, and collects stdout
// until end-of-stream. The whole exchange is bounded by a timeout. The child
// is always reaped, and killed first if the exchange fails or times out.
//
// Only the direct child is killed. If the proxy is a wrapper that forks a
// helper inheriting its stdout, the stdout reader thread is left behind on
// timeout and finishes once that helper closes the pipe; the exchange itself
// still returns at the deadline. Proxies should `exec` their helper.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use super::{KeyMode, Pin, Transport, TransportError};

/// Proxy binary looked up on `PATH` when none is configured.
pub const DEFAULT_PROXY_EXECUTABLE: &str = "comm-middleware";

/// Upper bound on a full exchange (spawn, write, read, exit).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const REAP_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Transport backed by a local module-proxy executable.
#[derive(Debug, Clone)]
pub struct ProcessTransport {
    executable: PathBuf,
    working_dir: Option<PathBuf>,
    timeout: Duration,
}

impl ProcessTransport {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            working_dir: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the proxy from `dir` (relative executable paths resolve against it).
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn spawn(&self, mode: KeyMode, module_serial: &str, pin: &Pin) -> Result<Child, TransportError> {
        let mut command = Command::new(&self.executable);
        command
            .arg(mode.as_str())
            .arg(module_serial)
            .arg(pin.expose())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        if let Some(ref dir) = self.working_dir {
            command.current_dir(dir);
        }

        command.spawn().map_err(|source| TransportError::Spawn {
            executable: self.executable.clone(),
            source,
        })
    }
}

impl Default for ProcessTransport {
    fn default() -> Self {
        Self::new(DEFAULT_PROXY_EXECUTABLE)
    }
}

impl Transport for ProcessTransport {
    fn exchange(
        &self,
        mode: KeyMode,
        module_serial: &str,
        pin: &Pin,
        request_lines: &[String],
    ) -> Result<String, TransportError> {
        let deadline = Instant::now()
            .checked_add(self.timeout)
            .ok_or(TransportError::InvalidTimeout(self.timeout))?;

        tracing::debug!(
            executable = %self.executable.display(),
            %mode,
            serial = module_serial,
            "Starting module proxy"
        );
        let mut guard = ChildGuard::new(self.spawn(mode, module_serial, pin)?);

        // Drain stdout on a separate thread so a chatty proxy can never block
        // on a full pipe while we are still writing, and so the read can be
        // abandoned at the deadline.
        let stdout = guard
            .child
            .stdout
            .take()
            .ok_or_else(|| TransportError::Read(io::Error::other("stdout was not captured")))?;
        let (tx, rx) = mpsc::channel();
        let reader = thread::spawn(move || {
            let _ = tx.send(read_response(stdout));
        });

        let stdin = guard
            .child
            .stdin
            .take()
            .ok_or_else(|| TransportError::Write(io::Error::other("stdin was not captured")))?;
        write_request(stdin, request_lines).map_err(TransportError::Write)?;

        let remaining = deadline.saturating_duration_since(Instant::now());
        let response = match rx.recv_timeout(remaining) {
            Ok(result) => {
                // The reader has sent its result and is exiting.
                let _ = reader.join();
                result.map_err(TransportError::Read)?
            }
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(timeout = ?self.timeout, "Module proxy timed out; killing it");
                return Err(TransportError::Timeout(self.timeout));
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err(TransportError::Read(io::Error::other(
                    "response reader exited without a result",
                )));
            }
        };

        match guard.wait_until(deadline).map_err(TransportError::Read)? {
            Some(status) if !status.success() => {
                tracing::warn!(%status, "Module proxy exited with non-zero status");
            }
            Some(status) => tracing::debug!(%status, "Module proxy exited"),
            None => {
                tracing::warn!(timeout = ?self.timeout, "Module proxy closed stdout but did not exit; killing it");
                return Err(TransportError::Timeout(self.timeout));
            }
        }

        Ok(response)
    }
}

/// Write one newline-terminated line per request value, flush, and close.
fn write_request(mut stdin: ChildStdin, request_lines: &[String]) -> io::Result<()> {
    for line in request_lines {
        stdin.write_all(line.as_bytes())?;
        stdin.write_all(b"\n")?;
    }
    stdin.flush()
    // stdin is dropped here, signalling end-of-request.
}

fn read_response(mut stdout: ChildStdout) -> io::Result<String> {
    let mut text = String::new();
    stdout.read_to_string(&mut text)?;
    Ok(text)
}

/// Owns the child process. Unless it has been reaped, dropping the guard
/// kills the process and waits for it.
struct ChildGuard {
    child: Child,
    reaped: bool,
}

impl ChildGuard {
    fn new(child: Child) -> Self {
        Self {
            child,
            reaped: false,
        }
    }

    /// Poll for exit until `deadline`. `Ok(None)` means still running.
    fn wait_until(&mut self, deadline: Instant) -> io::Result<Option<ExitStatus>> {
        loop {
            if let Some(status) = self.child.try_wait()? {
                self.reaped = true;
                return Ok(Some(status));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            thread::sleep(REAP_POLL_INTERVAL);
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if self.reaped {
            return;
        }
        if let Err(e) = self.child.kill() {
            tracing::debug!("Failed to kill module proxy: {}", e);
        }
        match self.child.wait() {
            Ok(status) => tracing::debug!(%status, "Module proxy reaped after abort"),
            Err(e) => tracing::warn!("Failed to reap module proxy: {}", e),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
