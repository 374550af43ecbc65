#[allow(non_snake_case)]
/// For clean importing
pub mod CircuitPaths {
    use std::path::{Path, PathBuf};

    // Per circuit `N`:      <build root>/<N>/<N>.r1cs, <N>.sym, <N>.zkey, <N>.vkey.json
    // Witness generator:    <build root>/<N>/<N>_js/<N>.wasm
    // Ceremony (size-keyed): <build root>/ptau/pot<P>_0000.ptau, pot<P>_final.ptau
    const PTAU_DIR_NAME: &str = "ptau";
    const WITNESS_GEN_DIR_SUFFIX: &str = "_js";

    pub fn circuit_dir(build_root: &Path, name: &str) -> PathBuf {
        build_root.join(name)
    }

    pub fn r1cs_path(build_root: &Path, name: &str) -> PathBuf {
        circuit_dir(build_root, name).join(format!("{name}.r1cs"))
    }

    pub fn sym_path(build_root: &Path, name: &str) -> PathBuf {
        circuit_dir(build_root, name).join(format!("{name}.sym"))
    }

    pub fn witness_generator_dir(build_root: &Path, name: &str) -> PathBuf {
        circuit_dir(build_root, name).join(format!("{name}{WITNESS_GEN_DIR_SUFFIX}"))
    }

    pub fn witness_generator_path(build_root: &Path, name: &str) -> PathBuf {
        witness_generator_dir(build_root, name).join(format!("{name}.wasm"))
    }

    pub fn zkey_path(build_root: &Path, name: &str) -> PathBuf {
        circuit_dir(build_root, name).join(format!("{name}.zkey"))
    }

    pub fn vkey_path(build_root: &Path, name: &str) -> PathBuf {
        circuit_dir(build_root, name).join(format!("{name}.vkey.json"))
    }

    pub fn ptau_dir(build_root: &Path) -> PathBuf {
        build_root.join(PTAU_DIR_NAME)
    }

    pub fn ptau_raw_path(build_root: &Path, power: u32) -> PathBuf {
        ptau_dir(build_root).join(format!("pot{power}_0000.ptau"))
    }

    pub fn ptau_final_path(build_root: &Path, power: u32) -> PathBuf {
        ptau_dir(build_root).join(format!("pot{power}_final.ptau"))
    }

    pub fn witness_input_path(build_root: &Path, name: &str) -> PathBuf {
        circuit_dir(build_root, name).join("input.json")
    }

    pub fn proof_path(build_root: &Path, name: &str) -> PathBuf {
        circuit_dir(build_root, name).join("proof.json")
    }

    pub fn public_path(build_root: &Path, name: &str) -> PathBuf {
        circuit_dir(build_root, name).join("public.json")
    }
}

#[cfg(test)]
mod tests {
    use super::CircuitPaths;
    use std::path::Path;

    #[test]
    fn per_circuit_paths_are_namespaced_by_circuit() {
        let root = Path::new("/tmp/build");
        assert_eq!(
            CircuitPaths::r1cs_path(root, "product"),
            Path::new("/tmp/build/product/product.r1cs")
        );
        assert_eq!(
            CircuitPaths::witness_generator_path(root, "product"),
            Path::new("/tmp/build/product/product_js/product.wasm")
        );
        assert_eq!(
            CircuitPaths::zkey_path(root, "product"),
            Path::new("/tmp/build/product/product.zkey")
        );
    }

    #[test]
    fn ceremony_paths_are_keyed_by_size_not_circuit() {
        let root = Path::new("/tmp/build");
        assert_eq!(
            CircuitPaths::ptau_raw_path(root, 12),
            Path::new("/tmp/build/ptau/pot12_0000.ptau")
        );
        assert_eq!(
            CircuitPaths::ptau_final_path(root, 14),
            Path::new("/tmp/build/ptau/pot14_final.ptau")
        );
    }
}
