pub use common::proof::{Groth16Proof, ProofBundle};
pub use common::witness::{SignalValue, Witness};
pub use snarkpipe_core::{
    to_onchain, to_onchain_bundle, ArtifactKind, ArtifactStore, CircuitPipeline, OnchainBundle,
    OnchainProof, PipelineConfig, PipelineError, Prover, ToolSuite,
};
