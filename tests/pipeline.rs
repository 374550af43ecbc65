//! Pipeline orchestration tests.
//!
//! The hermetic tests drive `CircuitPipeline` with fake external tools
//! that record every invocation and materialize the files a real run
//! would produce, so ordering, skip-if-present and failure-resume
//! behavior are checked without a toolchain install. The end-to-end test
//! at the bottom needs circom and snarkjs and is ignored by default.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use common::path::CircuitPaths;
use common::witness::Witness;
use snarkpipe_core::host::runner::{ExitResult, ExternalTool};
use snarkpipe_core::{
    to_onchain, to_onchain_bundle, CircuitPipeline, PipelineConfig, PipelineError, ToolSuite,
};

type CallLog = Arc<Mutex<Vec<Vec<String>>>>;

/// Fake tool: records calls and creates the output files the real tool
/// would, by interpreting the same argument layout the pipeline passes.
struct FakeTool {
    tool: &'static str,
    calls: CallLog,
    /// Fail any invocation whose first argument matches.
    fail_on: Option<&'static str>,
    /// Make `groth16 verify` report an invalid proof.
    reject_proofs: bool,
}

impl FakeTool {
    fn new(tool: &'static str, calls: CallLog) -> Self {
        Self {
            tool,
            calls,
            fail_on: None,
            reject_proofs: false,
        }
    }

    fn failing_on(tool: &'static str, calls: CallLog, subcommand: &'static str) -> Self {
        Self {
            fail_on: Some(subcommand),
            ..Self::new(tool, calls)
        }
    }

    fn ok() -> io::Result<ExitResult> {
        Ok(ExitResult {
            status: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}

impl ExternalTool for FakeTool {
    fn name(&self) -> &str {
        self.tool
    }

    fn run(&self, args: &[&str]) -> io::Result<ExitResult> {
        self.calls
            .lock()
            .unwrap()
            .push(args.iter().map(|a| a.to_string()).collect());

        if self.fail_on == Some(args[0]) {
            return Ok(ExitResult {
                status: Some(1),
                stdout: String::new(),
                stderr: "[ERROR] snarkJS: induced failure\n".to_string(),
            });
        }

        match (self.tool, args[0]) {
            ("circom", source) => {
                let name = Path::new(source).file_stem().unwrap().to_str().unwrap();
                let out_dir = PathBuf::from(args[args.len() - 1]);
                touch(&out_dir.join(format!("{name}.r1cs")));
                touch(&out_dir.join(format!("{name}.sym")));
                touch(&out_dir.join(format!("{name}_js/{name}.wasm")));
                Self::ok()
            }
            ("snarkjs", "powersoftau") => {
                touch(Path::new(args[args.len() - 1]));
                Self::ok()
            }
            ("snarkjs", "groth16") if args[1] == "setup" => {
                touch(Path::new(args[4]));
                Self::ok()
            }
            ("snarkjs", "groth16") if args[1] == "fullprove" => {
                fs::write(
                    args[5],
                    serde_json::json!({
                        "pi_a": ["11", "12", "1"],
                        "pi_b": [["21", "22"], ["23", "24"], ["1", "0"]],
                        "pi_c": ["31", "32", "1"],
                        "protocol": "groth16",
                        "curve": "bn128"
                    })
                    .to_string(),
                )?;
                fs::write(args[6], r#"["33"]"#)?;
                Self::ok()
            }
            ("snarkjs", "groth16") if args[1] == "verify" => {
                if self.reject_proofs {
                    Ok(ExitResult {
                        status: Some(1),
                        stdout: String::new(),
                        stderr: "[ERROR] snarkJS: Invalid proof\n".to_string(),
                    })
                } else {
                    Ok(ExitResult {
                        status: Some(0),
                        stdout: "[INFO]  snarkJS: OK!\n".to_string(),
                        stderr: String::new(),
                    })
                }
            }
            ("snarkjs", "zkey") => {
                fs::write(args[args.len() - 1], "{}")?;
                Self::ok()
            }
            other => panic!("fake tool got unexpected invocation: {other:?}"),
        }
    }
}

fn touch(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::File::create(path).unwrap();
}

struct Workspace {
    _dir: TempDir,
    config: PipelineConfig,
}

fn workspace() -> Workspace {
    let dir = TempDir::new().unwrap();
    let circuit_dir = dir.path().join("circuits");
    fs::create_dir_all(&circuit_dir).unwrap();
    fs::write(
        circuit_dir.join("product.circom"),
        include_str!("fixtures/product.circom"),
    )
    .unwrap();
    let config = PipelineConfig {
        workspace_root: dir.path().to_path_buf(),
        circuit_dir,
        build_root: dir.path().join("build"),
        ptau_power: 12,
    };
    Workspace { _dir: dir, config }
}

fn fake_suite(compiler_calls: &CallLog, prover_calls: &CallLog) -> ToolSuite {
    ToolSuite {
        compiler: Some(Box::new(FakeTool::new("circom", compiler_calls.clone()))),
        prover: Box::new(FakeTool::new("snarkjs", prover_calls.clone())),
    }
}

#[test]
fn construction_runs_every_stage_in_dependency_order() {
    let ws = workspace();
    let compiler_calls: CallLog = Default::default();
    let prover_calls: CallLog = Default::default();

    CircuitPipeline::with_tools(
        "product",
        ws.config.clone(),
        fake_suite(&compiler_calls, &prover_calls),
    )
    .unwrap();

    assert_eq!(compiler_calls.lock().unwrap().len(), 1);
    let prover_calls = prover_calls.lock().unwrap();
    let stages: Vec<(&str, &str)> = prover_calls
        .iter()
        .map(|call| (call[0].as_str(), call[1].as_str()))
        .collect();
    assert_eq!(
        stages,
        [
            ("powersoftau", "new"),
            ("powersoftau", "prepare"),
            ("groth16", "setup"),
        ]
    );
}

#[test]
fn second_construction_performs_no_external_invocation() {
    let ws = workspace();
    let first: CallLog = Default::default();
    CircuitPipeline::with_tools("product", ws.config.clone(), fake_suite(&first, &first)).unwrap();

    let compiler_calls: CallLog = Default::default();
    let prover_calls: CallLog = Default::default();
    CircuitPipeline::with_tools(
        "product",
        ws.config.clone(),
        fake_suite(&compiler_calls, &prover_calls),
    )
    .unwrap();

    assert!(compiler_calls.lock().unwrap().is_empty());
    assert!(prover_calls.lock().unwrap().is_empty());
}

#[test]
fn failed_ceremony_resumes_from_first_missing_artifact() {
    let ws = workspace();
    let calls: CallLog = Default::default();
    let broken = ToolSuite {
        compiler: Some(Box::new(FakeTool::new("circom", calls.clone()))),
        prover: Box::new(FakeTool::failing_on("snarkjs", calls.clone(), "powersoftau")),
    };
    let err = CircuitPipeline::with_tools("product", ws.config.clone(), broken).unwrap_err();
    assert!(matches!(err, PipelineError::CeremonyFailure(_)));
    // Compilation completed before the ceremony fell over.
    assert!(CircuitPaths::witness_generator_path(&ws.config.build_root, "product").exists());

    let compiler_calls: CallLog = Default::default();
    let prover_calls: CallLog = Default::default();
    CircuitPipeline::with_tools(
        "product",
        ws.config.clone(),
        fake_suite(&compiler_calls, &prover_calls),
    )
    .unwrap();

    // The retry picks up at the ceremony; compilation is not redone.
    assert!(compiler_calls.lock().unwrap().is_empty());
    assert_eq!(prover_calls.lock().unwrap().len(), 3);
}

#[test]
fn missing_compiler_is_a_configuration_error_not_a_compile_error() {
    let ws = workspace();
    let prover_calls: CallLog = Default::default();
    let suite = ToolSuite {
        compiler: None,
        prover: Box::new(FakeTool::new("snarkjs", prover_calls.clone())),
    };
    let err = CircuitPipeline::with_tools("product", ws.config.clone(), suite).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::ToolchainNotFound { ref tool } if tool == "circom"
    ));
    // Nothing downstream ran.
    assert!(prover_calls.lock().unwrap().is_empty());
}

#[test]
fn rejected_compilation_surfaces_compiler_diagnostics() {
    let ws = workspace();
    let calls: CallLog = Default::default();
    let source = ws
        .config
        .circuit_dir
        .join("product.circom")
        .to_string_lossy()
        .into_owned();
    let suite = ToolSuite {
        compiler: Some(Box::new(FakeTool {
            tool: "circom",
            calls: calls.clone(),
            fail_on: Some(Box::leak(source.into_boxed_str())),
            reject_proofs: false,
        })),
        prover: Box::new(FakeTool::new("snarkjs", calls.clone())),
    };
    let err = CircuitPipeline::with_tools("product", ws.config.clone(), suite).unwrap_err();
    match err {
        PipelineError::CompilationRejected { circuit, diagnostics } => {
            assert_eq!(circuit, "product");
            assert!(diagnostics.contains("induced failure"));
        }
        other => panic!("expected CompilationRejected, got {other}"),
    }
}

#[test]
fn prove_produces_both_formats_and_discards_the_witness() {
    let ws = workspace();
    let calls: CallLog = Default::default();
    let pipeline =
        CircuitPipeline::with_tools("product", ws.config.clone(), fake_suite(&calls, &calls))
            .unwrap();

    let witness = Witness::new().with_uint("a", 3).with_uint("b", 11);
    let bundle = pipeline.prover().prove(&witness).unwrap();

    assert_eq!(bundle.public_signals, vec!["33".to_string()]);
    assert_eq!(bundle.proof.pi_a, ["11".to_string(), "12".to_string()]);

    // Witness input is not persisted; proof and public signals are.
    assert!(!CircuitPaths::witness_input_path(&ws.config.build_root, "product").exists());
    assert!(CircuitPaths::proof_path(&ws.config.build_root, "product").exists());
    assert!(CircuitPaths::public_path(&ws.config.build_root, "product").exists());

    let onchain = to_onchain_bundle(&bundle);
    assert_eq!(onchain.proof.a, bundle.proof.pi_a);
    assert_eq!(onchain.proof.b[0], ["22".to_string(), "21".to_string()]);
    assert_eq!(onchain.proof.b[1], ["24".to_string(), "23".to_string()]);
    assert_eq!(onchain.proof.c, bundle.proof.pi_c);
}

#[test]
fn verify_reports_invalid_proofs_as_false_not_error() {
    let ws = workspace();
    let calls: CallLog = Default::default();
    let pipeline =
        CircuitPipeline::with_tools("product", ws.config.clone(), fake_suite(&calls, &calls))
            .unwrap();
    let bundle = pipeline
        .prover()
        .prove(&Witness::new().with_uint("a", 2).with_uint("b", 3))
        .unwrap();

    assert!(pipeline
        .prover()
        .verify(&bundle.proof, &bundle.public_signals)
        .unwrap());

    // Same artifacts, but a prover tool that rejects the pairing check.
    let rejecting = ToolSuite {
        compiler: None,
        prover: Box::new(FakeTool {
            tool: "snarkjs",
            calls: calls.clone(),
            fail_on: None,
            reject_proofs: true,
        }),
    };
    let pipeline =
        CircuitPipeline::with_tools("product", ws.config.clone(), rejecting).unwrap();
    let valid = pipeline
        .prover()
        .verify(&bundle.proof, &["7".to_string()])
        .unwrap();
    assert!(!valid);
}

// ---------------------------------------------------------------------------
// End-to-end against the real toolchain.
// ---------------------------------------------------------------------------

#[test]
#[ignore = "requires circom and snarkjs on PATH"]
fn product_circuit_proves_and_verifies_end_to_end() {
    let ws = workspace();

    let pipeline = CircuitPipeline::new("product", ws.config.clone()).unwrap();
    let prover = pipeline.prover();

    for (a, b, product) in [(3, 11, "33"), (5, 7, "35"), (0, 100, "0"), (42, 42, "1764")] {
        let witness = Witness::new().with_uint("a", a).with_uint("b", b);
        let bundle = prover.prove(&witness).unwrap();
        assert_eq!(bundle.public_signals[0], product);
        assert!(prover.verify(&bundle.proof, &bundle.public_signals).unwrap());

        let onchain = to_onchain(&bundle.proof);
        assert_eq!(onchain.a.len(), 2);
        assert!(onchain.b.iter().all(|row| row.len() == 2));
        assert_eq!(onchain.c.len(), 2);
    }

    // Soundness: a signal list that does not match the witness's output.
    let bundle = prover
        .prove(&Witness::new().with_uint("a", 2).with_uint("b", 3))
        .unwrap();
    let valid = prover.verify(&bundle.proof, &["7".to_string()]).unwrap();
    assert!(!valid);
}
