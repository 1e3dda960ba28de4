mod clean;
mod core;
mod feedback;
mod link;
pub mod scheduler;
mod sources;
mod state;

pub use clean::clean;
pub use core::{BuildReport, build_project, run_artifact};
pub use feedback::FeedbackAnalyzer;
pub use link::perform_linking;
pub use scheduler::{CompilerWorkerTask, perform_compilation, perform_compilation_with};
pub use sources::{colliding_stems, find_source_files};
pub use state::BuildState;

use crate::compiler::ToolError;
use thiserror::Error;

/// Why a build stopped before producing an artifact.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("no source files found")]
    NoSources,
    #[error("compilation failed ({failed} files)")]
    Compilation { failed: usize },
    #[error("link failed: {0}")]
    Link(#[source] ToolError),
    #[error("unable to start compile workers: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}
