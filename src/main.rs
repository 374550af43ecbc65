use std::fs;
use std::path::PathBuf;
use std::process::exit;

use clap::{Parser, Subcommand};
use eyre::{Result, WrapErr};
use tracing::info;

use common::proof::Groth16Proof;
use common::witness::Witness;
use snarkpipe_core::{to_onchain_bundle, ArtifactStore, CircuitPipeline, PipelineConfig};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: PipeCommand,
}

#[derive(Subcommand)]
enum PipeCommand {
    /// Compile a circuit and derive its proving/verification keys
    Build {
        /// Circuit name (maps to <circuit dir>/<name>.circom)
        circuit: String,
    },

    /// Generate a proof from a witness file
    Prove {
        circuit: String,

        /// Path to the witness JSON (signal name -> decimal value(s))
        #[arg(long)]
        input: PathBuf,

        /// Also print the proof in the on-chain calldata layout
        #[arg(long)]
        calldata: bool,
    },

    /// Verify a proof against its public signals
    Verify {
        circuit: String,

        #[arg(long)]
        proof: PathBuf,

        #[arg(long)]
        public: PathBuf,
    },

    /// Drop a circuit's cached artifacts (and optionally one ceremony size)
    Clean {
        circuit: String,

        /// Also remove the parameter files for this ceremony power
        #[arg(long)]
        ptau: Option<u32>,
    },
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = PipelineConfig::from_env();
    let result = match cli.command {
        PipeCommand::Build { circuit } => build_command(&circuit, config),
        PipeCommand::Prove {
            circuit,
            input,
            calldata,
        } => prove_command(&circuit, &input, calldata, config),
        PipeCommand::Verify {
            circuit,
            proof,
            public,
        } => verify_command(&circuit, &proof, &public, config),
        PipeCommand::Clean { circuit, ptau } => clean_command(&circuit, ptau, config),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        exit(1);
    }
}

fn build_command(circuit: &str, config: PipelineConfig) -> Result<()> {
    let pipeline = CircuitPipeline::new(circuit, config)?;
    info!(
        circuit,
        build_root = %pipeline.store().build_root().display(),
        "artifacts ready"
    );
    Ok(())
}

fn prove_command(circuit: &str, input: &PathBuf, calldata: bool, config: PipelineConfig) -> Result<()> {
    let witness: Witness = serde_json::from_slice(
        &fs::read(input).wrap_err_with(|| format!("could not read witness {}", input.display()))?,
    )?;

    let pipeline = CircuitPipeline::new(circuit, config)?;
    let bundle = pipeline.prover().prove(&witness)?;

    if calldata {
        println!("{}", serde_json::to_string_pretty(&to_onchain_bundle(&bundle))?);
    } else {
        println!("{}", serde_json::to_string_pretty(&bundle)?);
    }
    Ok(())
}

fn verify_command(
    circuit: &str,
    proof: &PathBuf,
    public: &PathBuf,
    config: PipelineConfig,
) -> Result<()> {
    let proof: Groth16Proof = serde_json::from_slice(
        &fs::read(proof).wrap_err_with(|| format!("could not read proof {}", proof.display()))?,
    )?;
    let public_signals: Vec<String> = serde_json::from_slice(
        &fs::read(public)
            .wrap_err_with(|| format!("could not read public signals {}", public.display()))?,
    )?;

    let pipeline = CircuitPipeline::new(circuit, config)?;
    let valid = pipeline.prover().verify(&proof, &public_signals)?;
    println!("{}", if valid { "OK" } else { "INVALID" });
    if !valid {
        exit(2);
    }
    Ok(())
}

fn clean_command(circuit: &str, ptau: Option<u32>, config: PipelineConfig) -> Result<()> {
    let store = ArtifactStore::new(&config.build_root);
    store.clear(circuit)?;
    if let Some(power) = ptau {
        store.clear_ceremony(power)?;
    }
    info!(circuit, "artifacts cleared");
    Ok(())
}
