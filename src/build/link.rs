use super::BuildError;
use super::state::BuildState;
use crate::compiler::ToolError;
use std::fs;
use std::path::PathBuf;

/// Link every object under the object root into the final artifact.
/// Refuses to run while any compile error is recorded.
pub fn perform_linking(state: &BuildState) -> Result<PathBuf, BuildError> {
    let failed = state.error_count();
    if failed > 0 {
        return Err(BuildError::Compilation { failed });
    }

    if !state.out_dir.as_os_str().is_empty() {
        fs::create_dir_all(&state.out_dir).map_err(|e| BuildError::Link(ToolError::Io(e)))?;
    }

    state
        .compiler
        .link(
            &state.object_dir,
            &state.output_base(),
            state.link_type,
            &state.options,
        )
        .map_err(BuildError::Link)
}
