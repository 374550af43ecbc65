use core::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Diagnostic record of a failed external tool invocation: the tool's
/// name, its exit status (`None` when it was killed or never spawned) and
/// its raw stderr.
#[derive(Debug, Clone)]
pub struct ToolFailure {
    pub tool: String,
    pub status: Option<i32>,
    pub stderr: String,
}

impl fmt::Display for ToolFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => write!(f, "`{}` exited with status {code}", self.tool)?,
            None => write!(f, "`{}` did not run to completion", self.tool)?,
        }
        if !self.stderr.trim().is_empty() {
            write!(f, ":\n{}", self.stderr.trim_end())?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("`{tool}` not found; searched the package store, node_modules and system paths")]
    ToolchainNotFound { tool: String },

    #[error("circuit `{circuit}` was rejected by the compiler:\n{diagnostics}")]
    CompilationRejected { circuit: String, diagnostics: String },

    #[error("powers-of-tau ceremony failed: {0}")]
    CeremonyFailure(ToolFailure),

    #[error("Groth16 key setup failed: {0}")]
    KeySetupFailure(ToolFailure),

    #[error("proof generation failed: {0}")]
    ProofGenerationFailure(ToolFailure),

    #[error("proof verification could not run: {0}")]
    VerificationFaulted(ToolFailure),

    #[error("artifact `{path}` is malformed: {reason}")]
    MalformedArtifact { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_failure_reports_status_and_stderr() {
        let failure = ToolFailure {
            tool: "snarkjs".to_string(),
            status: Some(1),
            stderr: "[ERROR] snarkJS: witness mismatch\n".to_string(),
        };
        let rendered = failure.to_string();
        assert!(rendered.contains("`snarkjs` exited with status 1"));
        assert!(rendered.contains("witness mismatch"));
    }

    #[test]
    fn spawn_failures_render_without_status() {
        let failure = ToolFailure {
            tool: "snarkjs".to_string(),
            status: None,
            stderr: String::new(),
        };
        assert_eq!(failure.to_string(), "`snarkjs` did not run to completion");
    }
}
