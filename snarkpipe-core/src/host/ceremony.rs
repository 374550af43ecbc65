//! Universal-parameter ceremony and circuit key derivation.
//!
//! Parameter files are keyed by their power-of-two size bound and shared
//! across every circuit that fits; the zkey is circuit-specific. Both are
//! existence-cached: once a file is on disk it is never regenerated, and a
//! failed run resumes from the first missing file on the next call.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use common::constants::CURVE;
use common::path::CircuitPaths;

use crate::host::runner::{run_checked, ExternalTool};
use crate::utils::errors::PipelineError;

/// Ensures the phase-2-prepared parameter file for `power` exists and
/// returns its path, deriving the raw file first when needed.
pub fn ensure_parameters(
    prover: &dyn ExternalTool,
    build_root: &Path,
    power: u32,
) -> Result<PathBuf, PipelineError> {
    let prepared = CircuitPaths::ptau_final_path(build_root, power);
    if prepared.exists() {
        return Ok(prepared);
    }
    fs::create_dir_all(CircuitPaths::ptau_dir(build_root))?;

    let raw = CircuitPaths::ptau_raw_path(build_root, power);
    if !raw.exists() {
        info!(power, "generating powers of tau");
        let power_arg = power.to_string();
        let raw_arg = raw.to_string_lossy().into_owned();
        run_checked(
            prover,
            &["powersoftau", "new", CURVE, &power_arg, &raw_arg],
        )
        .map_err(PipelineError::CeremonyFailure)?;
    }

    info!(power, "preparing phase 2");
    let raw_arg = raw.to_string_lossy().into_owned();
    let prepared_arg = prepared.to_string_lossy().into_owned();
    run_checked(
        prover,
        &["powersoftau", "prepare", "phase2", &raw_arg, &prepared_arg],
    )
    .map_err(PipelineError::CeremonyFailure)?;

    Ok(prepared)
}

/// Derives the circuit's proving/verification key pair from its constraint
/// system and the prepared parameters. Skipped when the zkey exists.
pub fn derive_key(
    prover: &dyn ExternalTool,
    build_root: &Path,
    name: &str,
    power: u32,
) -> Result<PathBuf, PipelineError> {
    let zkey = CircuitPaths::zkey_path(build_root, name);
    if zkey.exists() {
        return Ok(zkey);
    }

    info!(circuit = name, "running Groth16 setup");
    let r1cs_arg = CircuitPaths::r1cs_path(build_root, name)
        .to_string_lossy()
        .into_owned();
    let prepared_arg = CircuitPaths::ptau_final_path(build_root, power)
        .to_string_lossy()
        .into_owned();
    let zkey_arg = zkey.to_string_lossy().into_owned();
    run_checked(
        prover,
        &["groth16", "setup", &r1cs_arg, &prepared_arg, &zkey_arg],
    )
    .map_err(PipelineError::KeySetupFailure)?;

    Ok(zkey)
}
