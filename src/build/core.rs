use super::link::perform_linking;
use super::scheduler::perform_compilation;
use super::state::BuildState;
use super::BuildError;
use crate::compiler::LinkType;
use crate::ui;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};

/// Outcome of a successful build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub artifact: PathBuf,
    pub compile_time: Duration,
    pub link_time: Duration,
}

/// Compile all sources, then link once if nothing failed.
pub fn build_project(state: &BuildState) -> Result<BuildReport, BuildError> {
    let start = Instant::now();
    perform_compilation(state)?;
    let compile_time = start.elapsed();

    ui::info(format!("Linking {} ({})...", state.name, state.link_type));
    let start = Instant::now();
    let artifact = perform_linking(state)?;
    let link_time = start.elapsed();

    Ok(BuildReport {
        artifact,
        compile_time,
        link_time,
    })
}

/// Execute a built artifact with inherited stdio and return its exit code.
/// Only executables can be run.
pub fn run_artifact(
    artifact: &Path,
    link_type: LinkType,
    args: &[String],
) -> std::io::Result<Option<i32>> {
    if link_type != LinkType::Executable {
        ui::warn(format!(
            "Not running {}: only executables can be run",
            artifact.display()
        ));
        return Ok(None);
    }

    // A bare relative name would be looked up on PATH.
    let program = if artifact.is_relative() && artifact.parent() == Some(Path::new("")) {
        Path::new(".").join(artifact)
    } else {
        artifact.to_path_buf()
    };

    ui::info(format!("Running {}", program.display()));
    let status = Command::new(&program).args(args).status()?;
    Ok(Some(status.code().unwrap_or(1)))
}
