use std::path::PathBuf;
use thiserror::Error;

/// A located Visual Studio + Windows SDK pair.
///
/// Every other MSVC path is derived from these four values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsvcInstall {
    /// Visual Studio installation path reported by vswhere
    pub install_dir: PathBuf,
    /// MSVC tools version (e.g., "14.38.33130")
    pub tools_version: String,
    /// Windows SDK root (`InstallationFolder` registry value)
    pub sdk_dir: PathBuf,
    /// Windows SDK product version without the trailing ".0" (e.g., "10.0.22621")
    pub sdk_version: String,
}

impl MsvcInstall {
    pub fn tools_dir(&self) -> PathBuf {
        self.install_dir
            .join("VC")
            .join("Tools")
            .join("MSVC")
            .join(&self.tools_version)
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.tools_dir().join("bin").join("Hostx64").join("x64")
    }

    pub fn sdk_include_dir(&self) -> PathBuf {
        self.sdk_dir
            .join("include")
            .join(format!("{}.0", self.sdk_version))
    }

    pub fn sdk_lib_dir(&self) -> PathBuf {
        self.sdk_dir
            .join("lib")
            .join(format!("{}.0", self.sdk_version))
    }

    pub fn compiler(&self) -> PathBuf {
        self.bin_dir().join("cl.exe")
    }

    pub fn linker(&self) -> PathBuf {
        self.bin_dir().join("link.exe")
    }

    pub fn librarian(&self) -> PathBuf {
        self.bin_dir().join("lib.exe")
    }

    /// Value for the `INCLUDE` environment variable.
    pub fn include_dirs(&self) -> Vec<PathBuf> {
        let tools = self.tools_dir();
        let sdk = self.sdk_include_dir();
        vec![
            tools.join("ATLMFC").join("include"),
            tools.join("include"),
            sdk.join("ucrt"),
            sdk.join("shared"),
            sdk.join("um"),
            sdk.join("winrt"),
            sdk.join("cppwinrt"),
        ]
    }

    /// Value for the `LIB` environment variable (x64 only).
    pub fn link_dirs(&self) -> Vec<PathBuf> {
        let tools = self.tools_dir();
        let sdk = self.sdk_lib_dir();
        vec![
            tools.join("ATLMFC").join("lib").join("x64"),
            tools.join("lib").join("x64"),
            sdk.join("ucrt").join("x64"),
            sdk.join("um").join("x64"),
        ]
    }
}

/// Error type for toolchain discovery. Always fatal.
#[derive(Debug, Error)]
pub enum ToolchainError {
    /// No suitable toolchain found
    #[error("no toolchain found: {0}")]
    NotFound(String),
    /// vswhere missing, failing, or reporting nothing
    #[error("vswhere error: {0}")]
    VsWhere(String),
    /// The default MSVC tools version file could not be read
    #[error("unable to read {}: {source}", path.display())]
    VcTools {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Windows SDK registry key or value missing
    #[error("Windows SDK registry lookup failed: {0}")]
    Registry(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
