pub mod artifacts;
pub mod calldata;
pub mod host;
pub mod prover;
pub mod utils;

pub use artifacts::{ArtifactKind, ArtifactStore};
pub use calldata::{to_onchain, to_onchain_bundle, OnchainBundle, OnchainProof};
pub use host::{CircuitPipeline, PipelineConfig, ToolSuite};
pub use prover::Prover;
pub use utils::errors::{PipelineError, ToolFailure};
