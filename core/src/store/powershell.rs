//! Runs PowerShell scripts with a deadline.

use std::process::Stdio;
use std::time::Duration;

use progwall_common::error::StoreError;
use tokio::process::Command;
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, warn};

/// Forces UTF-8 output so non-ASCII program paths survive the round trip.
const PRELUDE: &str = "$ErrorActionPreference = 'Stop'; \
                       [Console]::OutputEncoding = [System.Text.Encoding]::UTF8;";

pub(crate) struct PowerShell {
    executable: &'static str,
    timeout: Duration,
    runtime: Runtime,
}

impl PowerShell {
    pub(crate) fn new(timeout: Duration) -> Result<Self, StoreError> {
        let executable = if cfg!(windows) { "powershell.exe" } else { "pwsh" };
        // Calls stay sequential; the runtime only drives the child and its deadline.
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|source| StoreError::Spawn {
                op: "runtime",
                source,
            })?;

        Ok(Self {
            executable,
            timeout,
            runtime,
        })
    }

    /// Runs `script` and returns its standard output.
    ///
    /// A non-zero exit becomes [`StoreError::Command`] carrying stderr. When
    /// the deadline passes the process is killed.
    pub(crate) fn run(&self, op: &'static str, script: &str) -> Result<String, StoreError> {
        debug!("{op}: {script}");

        let mut command = Command::new(self.executable);
        command
            .args(["-NoLogo", "-NoProfile", "-NonInteractive", "-Command"])
            .arg(format!("{PRELUDE} {script}"));
        self.execute(op, command)
    }

    fn execute(&self, op: &'static str, mut command: Command) -> Result<String, StoreError> {
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = self.runtime.block_on(async {
            let child = match command.spawn() {
                Ok(child) => child,
                Err(source) => return Err(StoreError::Spawn { op, source }),
            };

            // Dropping the timed-out future drops the child, which kills it.
            match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
                Ok(waited) => waited.map_err(|source| StoreError::Spawn { op, source }),
                Err(_) => {
                    warn!("{op} timed out after {:?}", self.timeout);
                    Err(StoreError::Timeout {
                        op,
                        after: self.timeout,
                    })
                }
            }
        })?;

        if !output.status.success() {
            let err = String::from_utf8_lossy(&output.stderr);
            let message = first_error_line(&err)
                .unwrap_or_else(|| format!("exited with {}", output.status));
            return Err(StoreError::Command { op, message });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// PowerShell error records span several lines; the first one carries the message.
fn first_error_line(stderr: &str) -> Option<String> {
    stderr
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.to_string())
}

/// Quotes `value` as a PowerShell single-quoted string literal.
///
/// PowerShell also closes single-quoted strings on typographic quotes, so
/// those are doubled too.
pub(crate) fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        if matches!(c, '\'' | '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}') {
            quoted.push(c);
        }
        quoted.push(c);
    }
    quoted.push('\'');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_doubles_single_quotes() {
        assert_eq!(quote("C:\\Apps\\tool.exe"), "'C:\\Apps\\tool.exe'");
        assert_eq!(quote("O'Brien"), "'O''Brien'");
        assert_eq!(quote("a\u{2019}b"), "'a\u{2019}\u{2019}b'");
        assert_eq!(quote(""), "''");
    }

    #[test]
    fn quote_leaves_expansion_characters_inert() {
        // Single-quoted strings do not expand variables or subexpressions.
        assert_eq!(quote("$(Remove-Item x)"), "'$(Remove-Item x)'");
    }

    #[test]
    fn first_error_line_skips_blank_lines() {
        let stderr = "\r\n  New-NetFirewallRule : Access is denied.\r\n At line:1 char:1\r\n";
        assert_eq!(
            first_error_line(stderr).as_deref(),
            Some("New-NetFirewallRule : Access is denied.")
        );
        assert_eq!(first_error_line("   \n"), None);
    }

    #[cfg(unix)]
    fn sh(timeout: Duration, script: &str) -> Result<String, StoreError> {
        let shell = PowerShell::new(timeout).unwrap();
        let mut command = Command::new("sh");
        command.args(["-c", script]);
        shell.execute("test", command)
    }

    #[cfg(unix)]
    #[test]
    fn execute_returns_stdout() {
        let out = sh(Duration::from_secs(5), "echo ok").unwrap();
        assert_eq!(out.trim(), "ok");
    }

    #[cfg(unix)]
    #[test]
    fn execute_reports_first_stderr_line_on_failure() {
        let err = sh(Duration::from_secs(5), "echo '' >&2; echo denied >&2; echo more >&2; exit 3")
            .unwrap_err();
        assert!(matches!(err, StoreError::Command { op: "test", ref message } if message == "denied"));
    }

    #[cfg(unix)]
    #[test]
    fn execute_kills_a_call_that_outlives_its_deadline() {
        let limit = Duration::from_millis(200);
        let started = std::time::Instant::now();

        let err = sh(limit, "sleep 10").unwrap_err();

        assert!(matches!(err, StoreError::Timeout { op: "test", after } if after == limit));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn execute_reports_a_missing_executable() {
        let shell = PowerShell::new(Duration::from_secs(5)).unwrap();
        let err = shell
            .execute("test", Command::new("progwall-no-such-shell"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Spawn { op: "test", .. }));
    }
}
