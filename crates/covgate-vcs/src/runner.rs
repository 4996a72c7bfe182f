//! Time-bounded process execution.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use covgate_core::CovgateError;
use tracing::trace;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Run `program args…` in `cwd` and return its stdout.
///
/// The child is killed once `timeout` elapses. Spawn failures, timeouts and
/// non-zero exits are all reported as [`CovgateError::Git`].
pub(crate) fn run_captured(
    program: &str,
    args: &[&str],
    cwd: &Path,
    timeout: Duration,
) -> Result<String, CovgateError> {
    let command_line = format!("{program} {}", args.join(" "));
    trace!(command = %command_line, cwd = %cwd.display(), "spawning");

    let mut child = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| CovgateError::Git(format!("failed to run `{command_line}`: {e}")))?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(CovgateError::Git(format!(
                    "`{command_line}` timed out after {}s",
                    timeout.as_secs_f64()
                )));
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                let _ = child.kill();
                return Err(CovgateError::Git(format!("waiting on `{command_line}`: {e}")));
            }
        }
    };

    let stdout = stdout.join().unwrap_or_default();
    if !status.success() {
        let stderr = stderr.join().unwrap_or_default();
        return Err(CovgateError::Git(format!(
            "`{command_line}` exited with {status}: {}",
            String::from_utf8_lossy(&stderr).trim()
        )));
    }

    Ok(String::from_utf8_lossy(&stdout).into_owned())
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}
