//! Host-side orchestration of the external circuit toolchain.

pub mod ceremony;
pub mod runner;
pub mod toolchain;

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use common::constants::{
    CIRCUIT_SOURCE_SUFFIX, COMPILER_TOOL, DEFAULT_BUILD_DIR, DEFAULT_CIRCUIT_DIR,
    DEFAULT_PTAU_POWER, PROVER_TOOL,
};

use crate::artifacts::{ArtifactKind, ArtifactStore};
use crate::host::runner::{run_checked, ExternalTool};
use crate::prover::Prover;
use crate::utils::diagnostics::{DiagnosticsSink, TracingSink};
use crate::utils::errors::PipelineError;

/// Where circuit sources live, where artifacts go, where the toolchain is
/// installed, and how large a ceremony to run.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Root searched for workspace-local toolchain installs.
    pub workspace_root: PathBuf,
    pub circuit_dir: PathBuf,
    pub build_root: PathBuf,
    pub ptau_power: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workspace_root: PathBuf::from("."),
            circuit_dir: PathBuf::from(DEFAULT_CIRCUIT_DIR),
            build_root: PathBuf::from(DEFAULT_BUILD_DIR),
            ptau_power: DEFAULT_PTAU_POWER,
        }
    }
}

impl PipelineConfig {
    /// Defaults with `SNARKPIPE_*` environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(dir) = env::var("SNARKPIPE_CIRCUIT_DIR") {
            config.circuit_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = env::var("SNARKPIPE_BUILD_DIR") {
            config.build_root = PathBuf::from(dir);
        }
        if let Ok(power) = env::var("SNARKPIPE_PTAU_POWER") {
            match power.parse() {
                Ok(power) => config.ptau_power = power,
                Err(_) => panic!(
                    "Invalid SNARKPIPE_PTAU_POWER value: {power}. Expected a small integer"
                ),
            }
        }
        config
    }
}

/// The two external tools the pipeline drives. The compiler slot may be
/// empty; it is only consulted when compilation is actually needed.
pub struct ToolSuite {
    pub compiler: Option<Box<dyn ExternalTool>>,
    pub prover: Box<dyn ExternalTool>,
}

impl ToolSuite {
    /// Discovers both tools for the configured workspace.
    fn discover(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let prover = toolchain::resolve_prover(&config.workspace_root).ok_or(
            PipelineError::ToolchainNotFound {
                tool: PROVER_TOOL.to_string(),
            },
        )?;
        Ok(Self {
            compiler: toolchain::resolve_compiler(&config.workspace_root),
            prover,
        })
    }
}

/// Per-circuit artifact pipeline.
///
/// Construction synchronously ensures, in dependency order: compiled
/// circuit artifacts, ceremony parameters, and the Groth16 key pair. Each
/// stage is skipped when its output already exists, so re-construction
/// after an external failure resumes from the first missing artifact.
/// Construction is the only place compilation is triggered; everything
/// after it assumes the artifacts are present.
///
/// Concurrent construction for the *same* circuit name is undefined
/// (two processes may race on the same artifact files); callers must
/// serialize per name. Distinct names share nothing but ceremony files.
pub struct CircuitPipeline {
    name: String,
    config: PipelineConfig,
    store: ArtifactStore,
    prover_tool: Box<dyn ExternalTool>,
}

impl std::fmt::Debug for CircuitPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitPipeline")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("store", &self.store)
            .field("prover_tool", &"<dyn ExternalTool>")
            .finish()
    }
}

impl CircuitPipeline {
    /// Builds the pipeline for `name`, discovering the toolchain and
    /// ensuring every artifact through the key pair exists.
    pub fn new(name: &str, config: PipelineConfig) -> Result<Self, PipelineError> {
        let tools = ToolSuite::discover(&config)?;
        Self::with_tools(name, config, tools)
    }

    /// Like [`new`](Self::new), with caller-supplied tools.
    pub fn with_tools(
        name: &str,
        config: PipelineConfig,
        tools: ToolSuite,
    ) -> Result<Self, PipelineError> {
        let store = ArtifactStore::new(&config.build_root);
        let pipeline = Self {
            name: name.to_string(),
            config,
            store,
            prover_tool: tools.prover,
        };
        pipeline.ensure_artifacts(tools.compiler)?;
        Ok(pipeline)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub(crate) fn prover_tool(&self) -> &dyn ExternalTool {
        &*self.prover_tool
    }

    /// Proof engine over this pipeline's artifacts, reporting tool
    /// diagnostics to `tracing`.
    pub fn prover(&self) -> Prover<'_> {
        self.prover_with_sink(Arc::new(TracingSink))
    }

    /// Proof engine with a caller-injected diagnostics sink.
    pub fn prover_with_sink(&self, sink: Arc<dyn DiagnosticsSink>) -> Prover<'_> {
        Prover::new(self, sink)
    }

    fn ensure_artifacts(
        &self,
        compiler: Option<Box<dyn ExternalTool>>,
    ) -> Result<(), PipelineError> {
        self.store.ensure_circuit_dir(&self.name)?;

        if !self.store.exists(ArtifactKind::WitnessGenerator, &self.name) {
            let compiler = compiler.ok_or(PipelineError::ToolchainNotFound {
                tool: COMPILER_TOOL.to_string(),
            })?;
            self.compile(&*compiler)?;
        }

        ceremony::ensure_parameters(
            self.prover_tool(),
            self.store.build_root(),
            self.config.ptau_power,
        )?;
        ceremony::derive_key(
            self.prover_tool(),
            self.store.build_root(),
            &self.name,
            self.config.ptau_power,
        )?;
        Ok(())
    }

    #[tracing::instrument(skip_all, name = "CircuitPipeline::compile")]
    fn compile(&self, compiler: &dyn ExternalTool) -> Result<(), PipelineError> {
        let source = self
            .config
            .circuit_dir
            .join(format!("{}.{CIRCUIT_SOURCE_SUFFIX}", self.name));
        let out_dir = self.store.ensure_circuit_dir(&self.name)?;

        info!(circuit = %self.name, source = %source.display(), "compiling circuit");
        let source_arg = source.to_string_lossy().into_owned();
        let out_arg = out_dir.to_string_lossy().into_owned();
        run_checked(
            compiler,
            &[&source_arg, "--r1cs", "--wasm", "--sym", "-o", &out_arg],
        )
        .map_err(|failure| PipelineError::CompilationRejected {
            circuit: self.name.clone(),
            diagnostics: failure.to_string(),
        })?;
        Ok(())
    }
}
