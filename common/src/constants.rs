pub const PROTOCOL: &str = "groth16";
pub const CURVE: &str = "bn128";

/// Power-of-two bound on constraint count for the default ceremony.
pub const DEFAULT_PTAU_POWER: u32 = 12;

pub const CIRCUIT_SOURCE_SUFFIX: &str = "circom";
pub const DEFAULT_CIRCUIT_DIR: &str = "circuits";
pub const DEFAULT_BUILD_DIR: &str = "build";

pub const COMPILER_TOOL: &str = "circom";
pub const PROVER_TOOL: &str = "snarkjs";
pub const NODE_RUNTIME: &str = "node";
