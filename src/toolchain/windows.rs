//! Windows toolchain discovery using vswhere and the SDK registry key

use super::types::ToolchainError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Fixed location of the Visual Studio installer query tool
pub const VSWHERE_PATH: &str =
    r"C:\Program Files (x86)\Microsoft Visual Studio\Installer\vswhere.exe";

/// HKLM key holding the Windows 10+ SDK location
pub const SDK_REGISTRY_KEY: &str =
    r"SOFTWARE\WOW6432Node\Microsoft\Microsoft SDKs\Windows\v10.0";

#[derive(Debug, Deserialize)]
struct VsWhereEntry {
    #[serde(rename = "installationPath")]
    installation_path: PathBuf,
}

/// First installation path in vswhere's JSON output.
pub fn parse_vswhere_output(json_str: &str) -> Result<PathBuf, ToolchainError> {
    let entries: Vec<VsWhereEntry> = serde_json::from_str(json_str).map_err(|e| {
        ToolchainError::VsWhere(format!("Failed to parse vswhere output: {}", e))
    })?;

    entries
        .into_iter()
        .next()
        .map(|e| e.installation_path)
        .ok_or_else(|| ToolchainError::VsWhere("vswhere didn't return any installations".into()))
}

/// Read the default MSVC tools version bundled with an installation.
pub fn read_tools_version(install_dir: &Path) -> Result<String, ToolchainError> {
    let path = install_dir
        .join("VC")
        .join("Auxiliary")
        .join("Build")
        .join("Microsoft.VCToolsVersion.default.txt");

    let contents = std::fs::read_to_string(&path)
        .map_err(|source| ToolchainError::VcTools { path, source })?;
    Ok(contents.trim().to_string())
}

/// Locate the newest Visual Studio installation.
pub fn find_vs_installation(vswhere: &Path) -> Result<PathBuf, ToolchainError> {
    if !vswhere.exists() {
        return Err(ToolchainError::VsWhere(format!(
            "couldn't find vswhere at {}",
            vswhere.display()
        )));
    }

    let output = std::process::Command::new(vswhere)
        .args(["-latest", "-format", "json", "-utf8"])
        .output()?;

    if !output.status.success() {
        return Err(ToolchainError::VsWhere(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    parse_vswhere_output(&String::from_utf8_lossy(&output.stdout))
}

/// Windows SDK root and product version from the registry.
#[cfg(windows)]
pub fn read_sdk_registry() -> Result<(PathBuf, String), ToolchainError> {
    use winreg::RegKey;
    use winreg::enums::*;

    let key = RegKey::predef(HKEY_LOCAL_MACHINE)
        .open_subkey_with_flags(SDK_REGISTRY_KEY, KEY_QUERY_VALUE)
        .map_err(|e| ToolchainError::Registry(format!("{}: {}", SDK_REGISTRY_KEY, e)))?;

    let sdk_dir: String = key
        .get_value("InstallationFolder")
        .map_err(|e| ToolchainError::Registry(format!("InstallationFolder: {}", e)))?;
    let sdk_version: String = key
        .get_value("ProductVersion")
        .map_err(|e| ToolchainError::Registry(format!("ProductVersion: {}", e)))?;

    Ok((PathBuf::from(sdk_dir), sdk_version))
}

/// Main entry point: every piece must be present, there is no partial toolchain.
#[cfg(windows)]
pub fn detect_toolchain() -> Result<super::types::MsvcInstall, ToolchainError> {
    let install_dir = find_vs_installation(Path::new(VSWHERE_PATH))?;
    let tools_version = read_tools_version(&install_dir)?;
    let (sdk_dir, sdk_version) = read_sdk_registry()?;

    Ok(super::types::MsvcInstall {
        install_dir,
        tools_version,
        sdk_dir,
        sdk_version,
    })
}
