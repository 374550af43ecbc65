//! External tool invocation strategies.
//!
//! Heavy cryptographic work is delegated to an independently-versioned
//! engine that lives outside the process. The pipeline only ever talks to
//! [`ExternalTool`], so a future in-process proving backend is another
//! implementation of this trait, not a pipeline change.

use std::io;
use std::path::PathBuf;
use std::process::Command;

use tracing::debug;

/// Outcome of a completed (or failed-to-complete) tool invocation.
#[derive(Debug, Clone)]
pub struct ExitResult {
    /// Exit code; `None` when the process was terminated by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ExitResult {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// One supported invocation convention for an external tool.
///
/// Invocations are synchronous and attempt-once: the call blocks until the
/// process exits, and nothing is retried or cancelled.
pub trait ExternalTool: Send + Sync {
    /// Short name used in logs and failure reports.
    fn name(&self) -> &str;

    fn run(&self, args: &[&str]) -> io::Result<ExitResult>;
}

/// Runs a tool and folds a non-zero exit or spawn failure into a
/// [`ToolFailure`](crate::utils::errors::ToolFailure).
pub fn run_checked(
    tool: &dyn ExternalTool,
    args: &[&str],
) -> Result<ExitResult, crate::utils::errors::ToolFailure> {
    let failure = |status, stderr| crate::utils::errors::ToolFailure {
        tool: tool.name().to_string(),
        status,
        stderr,
    };
    match tool.run(args) {
        Ok(out) if out.success() => Ok(out),
        Ok(out) => Err(failure(out.status, out.stderr)),
        Err(e) => Err(failure(None, e.to_string())),
    }
}

/// Native executable invoked directly.
pub struct DirectBinary {
    name: String,
    path: PathBuf,
}

impl DirectBinary {
    pub fn new(name: &str, path: PathBuf) -> Self {
        Self {
            name: name.to_string(),
            path,
        }
    }
}

impl ExternalTool for DirectBinary {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, args: &[&str]) -> io::Result<ExitResult> {
        let program = self.path.to_string_lossy();
        debug!("{}", compose_command_line(&program, args));
        capture(Command::new(&self.path).args(args))
    }
}

/// Script entry point that needs a host runtime to execute.
pub struct NodeScript {
    name: String,
    runtime: PathBuf,
    script: PathBuf,
}

impl NodeScript {
    pub fn new(name: &str, runtime: PathBuf, script: PathBuf) -> Self {
        Self {
            name: name.to_string(),
            runtime,
            script,
        }
    }
}

impl ExternalTool for NodeScript {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, args: &[&str]) -> io::Result<ExitResult> {
        let script = self.script.to_string_lossy().into_owned();
        let mut full_args = vec![script.as_str()];
        full_args.extend_from_slice(args);
        debug!(
            "{}",
            compose_command_line(&self.runtime.to_string_lossy(), &full_args)
        );
        capture(Command::new(&self.runtime).arg(&self.script).args(args))
    }
}

/// Resolved through the platform shell. Package managers on Windows
/// install `.cmd` shims that only the shell can dispatch, so the caller is
/// responsible for having the wrapper on PATH.
pub struct ShellWrapped {
    name: String,
}

impl ShellWrapped {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl ExternalTool for ShellWrapped {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, args: &[&str]) -> io::Result<ExitResult> {
        let command_line = compose_command_line(&self.name, args);
        debug!("{command_line}");
        if cfg!(windows) {
            capture(Command::new("cmd").arg("/C").arg(&command_line))
        } else {
            capture(Command::new("sh").arg("-c").arg(&command_line))
        }
    }
}

fn capture(command: &mut Command) -> io::Result<ExitResult> {
    let output = command.output()?;
    Ok(ExitResult {
        status: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Renders an invocation the way a shell would accept it, for the log.
fn compose_command_line(program: &str, args: &[&str]) -> String {
    // Safe POSIX-style single-quote quoting (no expansions).
    fn sh_quote(s: &str) -> String {
        const SAFE: &str =
            "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_@%+=:,./-";
        if !s.is_empty() && s.chars().all(|c| SAFE.contains(c)) {
            s.to_string()
        } else {
            let mut out = String::with_capacity(s.len() + 2);
            out.push('\'');
            for ch in s.chars() {
                if ch == '\'' {
                    out.push_str("'\\''");
                } else {
                    out.push(ch);
                }
            }
            out.push('\'');
            out
        }
    }

    let mut parts = vec![sh_quote(program)];
    parts.extend(args.iter().map(|a| sh_quote(a)));
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_lines_quote_unsafe_arguments() {
        let line = compose_command_line("snarkjs", &["groth16", "a b", "it's"]);
        assert_eq!(line, "snarkjs groth16 'a b' 'it'\\''s'");
    }

    #[test]
    fn plain_arguments_stay_unquoted() {
        let line = compose_command_line("/usr/bin/circom", &["--r1cs", "-o", "build/x"]);
        assert_eq!(line, "/usr/bin/circom --r1cs -o build/x");
    }

    #[test]
    fn direct_binary_reports_spawn_failure_as_io_error() {
        let tool = DirectBinary::new("ghost", PathBuf::from("/nonexistent/ghost-tool"));
        assert!(tool.run(&["--version"]).is_err());
    }

    #[test]
    fn run_checked_folds_nonzero_exit_into_failure() {
        struct Failing;
        impl ExternalTool for Failing {
            fn name(&self) -> &str {
                "failing"
            }
            fn run(&self, _args: &[&str]) -> io::Result<ExitResult> {
                Ok(ExitResult {
                    status: Some(2),
                    stdout: String::new(),
                    stderr: "boom".to_string(),
                })
            }
        }
        let err = run_checked(&Failing, &[]).unwrap_err();
        assert_eq!(err.status, Some(2));
        assert_eq!(err.stderr, "boom");
    }
}
