//! Proof generation and verification over a pipeline's artifacts.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use common::path::CircuitPaths;
use common::proof::{Groth16Proof, ProofBundle};
use common::witness::Witness;

use crate::artifacts::ArtifactKind;
use crate::host::runner::{run_checked, ExitResult};
use crate::host::CircuitPipeline;
use crate::utils::diagnostics::{DiagnosticsSink, MemoryPressureFilter, Severity};
use crate::utils::errors::{PipelineError, ToolFailure};

/// Proof engine for one circuit. Assumes the pipeline has already ensured
/// every artifact it reads.
pub struct Prover<'a> {
    pipeline: &'a CircuitPipeline,
    sink: Arc<dyn DiagnosticsSink>,
}

impl<'a> Prover<'a> {
    pub(crate) fn new(pipeline: &'a CircuitPipeline, sink: Arc<dyn DiagnosticsSink>) -> Self {
        Self { pipeline, sink }
    }

    /// Produces a proof plus public signals for `witness`.
    ///
    /// The witness is written next to the circuit artifacts for the
    /// duration of the call and removed afterward; proof and public-signal
    /// JSON stay on disk. The full-proof computation is heavy and may spill
    /// memory-pressure noise on constrained platforms; that noise is
    /// filtered from the diagnostic stream for this call only.
    #[tracing::instrument(skip_all, name = "Prover::prove", fields(circuit = %self.pipeline.name()))]
    pub fn prove(&self, witness: &Witness) -> Result<ProofBundle, PipelineError> {
        let root = self.pipeline.store().build_root();
        let name = self.pipeline.name();

        let input = CircuitPaths::witness_input_path(root, name);
        fs::write(&input, serde_json::to_vec(witness)?)?;
        let outcome = self.run_fullprove(&input);
        // Witnesses are not persisted, success or failure.
        let _ = fs::remove_file(&input);
        outcome?;

        let proof_path = CircuitPaths::proof_path(root, name);
        let proof_json: serde_json::Value = serde_json::from_slice(&fs::read(&proof_path)?)?;
        let proof = Groth16Proof::from_tool_json(&proof_json).map_err(|e| {
            PipelineError::MalformedArtifact {
                path: proof_path,
                reason: e.to_string(),
            }
        })?;

        let public_path = CircuitPaths::public_path(root, name);
        let public_signals: Vec<String> = serde_json::from_slice(&fs::read(public_path)?)?;

        info!(signals = public_signals.len(), "proof generated");
        Ok(ProofBundle {
            proof,
            public_signals,
        })
    }

    fn run_fullprove(&self, input: &std::path::Path) -> Result<(), PipelineError> {
        // Scoped to this call: dropped on every exit path, leaving the
        // injected sink untouched.
        let filter = MemoryPressureFilter::new(&*self.sink);

        let root = self.pipeline.store().build_root();
        let name = self.pipeline.name();
        let input_arg = input.to_string_lossy().into_owned();
        let wasm_arg = CircuitPaths::witness_generator_path(root, name)
            .to_string_lossy()
            .into_owned();
        let zkey_arg = CircuitPaths::zkey_path(root, name)
            .to_string_lossy()
            .into_owned();
        let proof_arg = CircuitPaths::proof_path(root, name)
            .to_string_lossy()
            .into_owned();
        let public_arg = CircuitPaths::public_path(root, name)
            .to_string_lossy()
            .into_owned();

        match run_checked(
            self.pipeline.prover_tool(),
            &[
                "groth16",
                "fullprove",
                &input_arg,
                &wasm_arg,
                &zkey_arg,
                &proof_arg,
                &public_arg,
            ],
        ) {
            Ok(out) => {
                forward_diagnostics(&filter, &out.stderr);
                Ok(())
            }
            Err(failure) => {
                forward_diagnostics(&filter, &failure.stderr);
                Err(PipelineError::ProofGenerationFailure(failure))
            }
        }
    }

    /// Checks `proof` against `public_signals` with the circuit's
    /// verification key.
    ///
    /// A cryptographically invalid combination (tampered proof, mismatched
    /// or wrong-count signals) is `Ok(false)`, a normal outcome. Only
    /// malformed inputs or unreadable key material error.
    #[tracing::instrument(skip_all, name = "Prover::verify", fields(circuit = %self.pipeline.name()))]
    pub fn verify(
        &self,
        proof: &Groth16Proof,
        public_signals: &[String],
    ) -> Result<bool, PipelineError> {
        let vkey = self.ensure_verification_key()?;
        let dir = self
            .pipeline
            .store()
            .ensure_circuit_dir(self.pipeline.name())?;

        // The tool takes files; these are scratch copies of the caller's
        // in-memory values, removed after the check.
        let proof_file = dir.join(".verify-proof.json");
        let public_file = dir.join(".verify-public.json");
        fs::write(&proof_file, serde_json::to_vec(proof)?)?;
        fs::write(&public_file, serde_json::to_vec(public_signals)?)?;

        let vkey_arg = vkey.to_string_lossy().into_owned();
        let public_arg = public_file.to_string_lossy().into_owned();
        let proof_arg = proof_file.to_string_lossy().into_owned();
        let outcome = self.pipeline.prover_tool().run(&[
            "groth16",
            "verify",
            &vkey_arg,
            &public_arg,
            &proof_arg,
        ]);
        let _ = fs::remove_file(&proof_file);
        let _ = fs::remove_file(&public_file);

        match outcome {
            Ok(out) if rejected_proof(&out) => Ok(false),
            Ok(out) if out.success() => Ok(true),
            Ok(out) => Err(PipelineError::VerificationFaulted(ToolFailure {
                tool: self.pipeline.prover_tool().name().to_string(),
                status: out.status,
                stderr: out.stderr,
            })),
            Err(e) => Err(PipelineError::VerificationFaulted(ToolFailure {
                tool: self.pipeline.prover_tool().name().to_string(),
                status: None,
                stderr: e.to_string(),
            })),
        }
    }

    fn ensure_verification_key(&self) -> Result<PathBuf, PipelineError> {
        let store = self.pipeline.store();
        let name = self.pipeline.name();
        let vkey = store.path(ArtifactKind::VerificationKey, name);
        if vkey.exists() {
            return Ok(vkey);
        }

        info!(circuit = name, "exporting verification key");
        let zkey_arg = store
            .path(ArtifactKind::ProvingKey, name)
            .to_string_lossy()
            .into_owned();
        let vkey_arg = vkey.to_string_lossy().into_owned();
        run_checked(
            self.pipeline.prover_tool(),
            &["zkey", "export", "verificationkey", &zkey_arg, &vkey_arg],
        )
        .map_err(PipelineError::KeySetupFailure)?;
        Ok(vkey)
    }
}

/// The tool reports a structurally valid but cryptographically invalid
/// (proof, signals) pair with an invalid-proof marker; exit status alone
/// is not a reliable signal across tool versions.
fn rejected_proof(out: &ExitResult) -> bool {
    let marker = |s: &str| s.to_ascii_lowercase().contains("invalid proof");
    marker(&out.stdout) || marker(&out.stderr)
}

fn forward_diagnostics(sink: &dyn DiagnosticsSink, stderr: &str) {
    for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
        sink.emit(Severity::classify(line), line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exit(status: i32, stdout: &str, stderr: &str) -> ExitResult {
        ExitResult {
            status: Some(status),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn invalid_proof_markers_are_detected_case_insensitively() {
        assert!(rejected_proof(&exit(0, "[ERROR] snarkJS: Invalid proof\n", "")));
        assert!(rejected_proof(&exit(1, "", "INVALID PROOF")));
        assert!(!rejected_proof(&exit(0, "[INFO]  snarkJS: OK!\n", "")));
    }
}
