//! Locating the external circuit toolchain.
//!
//! Pure filesystem lookup: nothing here executes a tool, and a missing or
//! unreadable package store reads as "no matches" rather than an error.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use common::constants::{COMPILER_TOOL, NODE_RUNTIME, PROVER_TOOL};

use crate::host::runner::{DirectBinary, ExternalTool, NodeScript, ShellWrapped};

/// Script entry points a package install may carry, newest layout first.
const PROVER_SCRIPT_ENTRIES: &[&str] = &["build/cli.cjs", "cli.js"];

/// Finds `tool` under the workspace's package installs.
///
/// Search order: the pnpm virtual store (entries matching `<tool>@<version>`,
/// most recently discovered match preferred), a direct `node_modules`
/// install, then the package manager's bin aliases. Returns the first
/// existing path; never executes anything.
pub fn locate(workspace_root: &Path, tool: &str) -> Option<PathBuf> {
    locate_in_store(workspace_root, tool)
        .or_else(|| locate_direct(workspace_root, tool))
        .or_else(|| locate_bin_alias(workspace_root, tool))
}

fn locate_in_store(workspace_root: &Path, tool: &str) -> Option<PathBuf> {
    let store = workspace_root.join("node_modules/.pnpm");
    let prefix = format!("{tool}@");
    let entries = fs::read_dir(&store).ok()?;

    let mut found = None;
    for entry in entries.flatten() {
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if !name.starts_with(&prefix) {
            continue;
        }
        let candidate = entry.path().join("node_modules").join(tool);
        if candidate.exists() {
            // Later store entries shadow earlier ones.
            found = Some(candidate);
        }
    }
    found
}

fn locate_direct(workspace_root: &Path, tool: &str) -> Option<PathBuf> {
    let candidate = workspace_root.join("node_modules").join(tool);
    candidate.exists().then_some(candidate)
}

fn locate_bin_alias(workspace_root: &Path, tool: &str) -> Option<PathBuf> {
    let bin = workspace_root.join("node_modules/.bin");
    let mut names = vec![tool.to_string()];
    if cfg!(windows) {
        names.push(format!("{tool}.cmd"));
    }
    names
        .into_iter()
        .map(|name| bin.join(name))
        .find(|candidate| candidate.exists())
}

/// Finds a tool binary outside the workspace: PATH entries first, then
/// well-known system install directories.
pub fn locate_system_binary(tool: &str) -> Option<PathBuf> {
    if let Some(paths) = env::var_os("PATH") {
        for dir in env::split_paths(&paths) {
            let candidate = dir.join(tool);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }

    let mut candidates: Vec<PathBuf> = vec![
        PathBuf::from("/usr/local/bin"),
        PathBuf::from("/opt/homebrew/bin"),
        PathBuf::from("/usr/bin"),
    ];
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".npm-global/bin"));
        candidates.push(home.join(".local/bin"));
    }
    candidates
        .into_iter()
        .map(|dir| dir.join(tool))
        .find(|candidate| candidate.is_file())
}

/// Resolves the circuit compiler to a runnable tool, if installed.
pub fn resolve_compiler(workspace_root: &Path) -> Option<Box<dyn ExternalTool>> {
    let path = match locate(workspace_root, COMPILER_TOOL) {
        Some(p) if p.is_file() => Some(p),
        // A package-dir install executes through its bin alias.
        Some(_) => locate_bin_alias(workspace_root, COMPILER_TOOL),
        None => None,
    }
    .or_else(|| locate_system_binary(COMPILER_TOOL))?;
    debug!(compiler = %path.display(), "resolved circuit compiler");
    Some(Box::new(DirectBinary::new(COMPILER_TOOL, path)))
}

/// Resolves the proving tool to a runnable tool, if installed.
///
/// Windows installs dispatch through a shell shim on PATH; elsewhere the
/// bin alias runs directly, a bare package install runs through the node
/// runtime, and a global binary install is the last resort.
pub fn resolve_prover(workspace_root: &Path) -> Option<Box<dyn ExternalTool>> {
    if cfg!(windows) {
        return Some(Box::new(ShellWrapped::new(PROVER_TOOL)));
    }

    if let Some(alias) = locate_bin_alias(workspace_root, PROVER_TOOL) {
        debug!(prover = %alias.display(), "resolved proving tool via bin alias");
        return Some(Box::new(DirectBinary::new(PROVER_TOOL, alias)));
    }

    let package = locate_in_store(workspace_root, PROVER_TOOL)
        .or_else(|| locate_direct(workspace_root, PROVER_TOOL));
    if let Some(package) = package {
        if let Some(script) = PROVER_SCRIPT_ENTRIES
            .iter()
            .map(|entry| package.join(entry))
            .find(|p| p.is_file())
        {
            let runtime = locate_system_binary(NODE_RUNTIME)?;
            debug!(prover = %script.display(), "resolved proving tool via script entry");
            return Some(Box::new(NodeScript::new(PROVER_TOOL, runtime, script)));
        }
    }

    let system = locate_system_binary(PROVER_TOOL)?;
    debug!(prover = %system.display(), "resolved proving tool via system install");
    Some(Box::new(DirectBinary::new(PROVER_TOOL, system)))
}
