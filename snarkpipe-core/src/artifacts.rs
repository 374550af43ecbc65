//! Existence-keyed cache of circuit build artifacts.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use common::path::CircuitPaths;

/// Kinds of per-circuit build artifacts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArtifactKind {
    ConstraintSystem,
    WitnessGenerator,
    SymbolTable,
    ProvingKey,
    VerificationKey,
}

/// Directory-keyed cache mapping a circuit name to its build artifacts.
///
/// An artifact is valid iff its file exists; no checksum or freshness
/// check is performed. Replacing a circuit's source without calling
/// [`clear`](ArtifactStore::clear) therefore yields stale results.
/// Concurrent writers for the same circuit name are undefined; callers
/// that need it must serialize per name.
#[derive(Debug)]
pub struct ArtifactStore {
    build_root: PathBuf,
}

impl ArtifactStore {
    pub fn new(build_root: impl Into<PathBuf>) -> Self {
        Self {
            build_root: build_root.into(),
        }
    }

    pub fn build_root(&self) -> &Path {
        &self.build_root
    }

    pub fn path(&self, kind: ArtifactKind, name: &str) -> PathBuf {
        match kind {
            ArtifactKind::ConstraintSystem => CircuitPaths::r1cs_path(&self.build_root, name),
            ArtifactKind::WitnessGenerator => {
                CircuitPaths::witness_generator_path(&self.build_root, name)
            }
            ArtifactKind::SymbolTable => CircuitPaths::sym_path(&self.build_root, name),
            ArtifactKind::ProvingKey => CircuitPaths::zkey_path(&self.build_root, name),
            ArtifactKind::VerificationKey => CircuitPaths::vkey_path(&self.build_root, name),
        }
    }

    pub fn exists(&self, kind: ArtifactKind, name: &str) -> bool {
        self.path(kind, name).exists()
    }

    /// Creates the circuit's build subtree, returning its path.
    pub fn ensure_circuit_dir(&self, name: &str) -> io::Result<PathBuf> {
        let dir = CircuitPaths::circuit_dir(&self.build_root, name);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// First-class cache invalidation: removes the circuit's entire
    /// subtree. Ceremony files are shared across circuits and left alone.
    pub fn clear(&self, name: &str) -> io::Result<()> {
        let dir = CircuitPaths::circuit_dir(&self.build_root, name);
        if dir.exists() {
            fs::remove_dir_all(dir)?;
        }
        Ok(())
    }

    /// Removes one ceremony size's parameter pair.
    pub fn clear_ceremony(&self, power: u32) -> io::Result<()> {
        for path in [
            CircuitPaths::ptau_raw_path(&self.build_root, power),
            CircuitPaths::ptau_final_path(&self.build_root, power),
        ] {
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}
