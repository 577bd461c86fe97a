//! Writing a script to a temp file and running a solver against it under
//! a wall-clock deadline.

use std::io::{Read, Write};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use crate::config::SmtSolverConfig;
use crate::error::SmtError;

/// How often [`run`] polls a spawned child for completion while waiting
/// out the deadline.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Raw stdout captured from a solver run that exited before the deadline.
pub struct RawOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Writes `script` to a temp `.smt2` file, spawns `config`'s solver
/// against it, and waits up to `timeout_ms` (no limit if `None`) for it
/// to finish, killing it on expiry.
pub fn run(config: &SmtSolverConfig, script: &str, timeout_ms: Option<u64>) -> Result<RawOutput, SmtError> {
    let mut file = tempfile::Builder::new()
        .suffix(".smt2")
        .tempfile()
        .map_err(|e| SmtError::SpawnFailed(e.to_string()))?;
    file.write_all(script.as_bytes()).map_err(|e| SmtError::SpawnFailed(e.to_string()))?;
    file.flush().map_err(|e| SmtError::SpawnFailed(e.to_string()))?;

    let (program, args) = config.command(file.path().to_string_lossy().as_ref());
    let mut child = Command::new(&program)
        .args(&args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| SmtError::SpawnFailed(e.to_string()))?;

    wait_with_timeout(&mut child, timeout_ms)
}

fn wait_with_timeout(child: &mut Child, timeout_ms: Option<u64>) -> Result<RawOutput, SmtError> {
    let deadline = timeout_ms.map(|ms| (Instant::now(), Duration::from_millis(ms)));

    loop {
        if let Some(status) = child.try_wait().map_err(|e| SmtError::SpawnFailed(e.to_string()))? {
            let mut stdout = String::new();
            let mut stderr = String::new();
            if let Some(mut out) = child.stdout.take() {
                let _ = out.read_to_string(&mut stdout);
            }
            if let Some(mut err) = child.stderr.take() {
                let _ = err.read_to_string(&mut stderr);
            }
            if !status.success() {
                return Err(SmtError::NonZeroExit(stderr));
            }
            return Ok(RawOutput { stdout, stderr });
        }

        if let Some((start, limit)) = deadline {
            if start.elapsed() >= limit {
                let _ = child.kill();
                let _ = child.wait();
                return Err(SmtError::TimeLimit);
            }
        }

        std::thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_solver_binary_reports_spawn_failure() {
        let config = SmtSolverConfig::new("Nonexistent", "reasoning-smt-nonexistent-solver-binary", vec![]);
        let result = run(&config, "(check-sat)", Some(1000));
        assert!(matches!(result, Err(SmtError::SpawnFailed(_))));
    }
}
