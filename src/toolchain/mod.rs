//! Toolchain discovery
//!
//! Produces a ready-to-use [`Compiler`] before any compilation begins.
//! On Windows, vswhere locates Visual Studio and the registry locates the
//! Windows SDK. On Linux, PATH is probed for clang and then gcc. macOS
//! always uses clang.

pub mod types;
pub mod windows;

pub use types::{MsvcInstall, ToolchainError};

use crate::compiler::{Compiler, Toolset};
use std::path::PathBuf;

/// Locate the toolchain for the current platform.
pub fn locate() -> Result<Box<dyn Compiler>, ToolchainError> {
    #[cfg(windows)]
    {
        let install = windows::detect_toolchain()?;
        Ok(Box::new(crate::compiler::MsvcCompiler::new(install)))
    }

    #[cfg(target_os = "macos")]
    {
        Ok(Box::new(crate::compiler::DarwinCompiler::new()))
    }

    #[cfg(all(not(windows), not(target_os = "macos")))]
    {
        let (toolset, driver) = detect_unix_toolset(|name| which::which(name).ok())?;
        Ok(Box::new(crate::compiler::GnuCompiler::new(toolset, driver)))
    }
}

/// Probe for clang, falling back to gcc. `lookup` resolves a program name
/// to its path on PATH.
pub fn detect_unix_toolset<F>(lookup: F) -> Result<(Toolset, PathBuf), ToolchainError>
where
    F: Fn(&str) -> Option<PathBuf>,
{
    for toolset in [Toolset::Clang, Toolset::Gcc] {
        if let Some(path) = lookup(toolset.program_name()) {
            return Ok((toolset, path));
        }
    }

    Err(ToolchainError::NotFound(
        "neither clang nor gcc is on PATH. Please install clang or gcc.".to_string(),
    ))
}
