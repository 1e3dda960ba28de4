//! Conan `txt` generator manifest (`conanbuildinfo.txt`).

use crate::compiler::{CompilerOptions, LinkType};
use crate::config::ConfigError;
use crate::ui;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const CONANFILE: &str = "conanfile.txt";
pub const BUILD_INFO: &str = "conanbuildinfo.txt";

/// Section name to its entries, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conanfile {
    pub sections: BTreeMap<String, Vec<String>>,
}

impl Conanfile {
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut sections: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut current: Option<String> = None;

        for (index, line) in text.lines().enumerate() {
            if line.is_empty() {
                continue;
            }

            if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                current = Some(header.to_string());
                continue;
            }

            let Some(section) = &current else {
                return Err(ConfigError::Conan {
                    line: index + 1,
                    text: line.to_string(),
                });
            };

            sections
                .entry(section.clone())
                .or_default()
                .push(line.trim_matches(|c| c == ' ' || c == '\t').to_string());
        }

        Ok(Conanfile { sections })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Entries of `section`, empty when the section is absent.
    pub fn get(&self, section: &str) -> &[String] {
        self.sections.get(section).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Append the manifest to `options`. With `windows` set, libraries
    /// without a `.lib` suffix get one.
    pub fn apply(&self, options: &mut CompilerOptions, link_type: LinkType, windows: bool) {
        options
            .include_directories
            .extend(self.get("includedirs").iter().cloned());
        options
            .link_directories
            .extend(self.get("libdirs").iter().cloned());

        for lib in self.get("libs").iter().chain(self.get("system_libs")) {
            if windows && !lib.ends_with(".lib") {
                options.link_libraries.push(format!("{}.lib", lib));
            } else {
                options.link_libraries.push(lib.clone());
            }
        }

        options.defines.extend(self.get("defines").iter().cloned());
        options.flags_cpp.extend(self.get("cppflags").iter().cloned());
        options
            .flags_shared
            .extend(self.get("cxxflags").iter().cloned());
        options.flags_c.extend(self.get("cflags").iter().cloned());

        let link_flags = match link_type {
            LinkType::DynamicLibrary => self.get("sharedlinkflags"),
            LinkType::Executable => self.get("exelinkflags"),
            LinkType::StaticLibrary => &[],
        };
        options.flags_link.extend(link_flags.iter().cloned());
    }
}

/// Arguments for `conan install`.
pub fn install_args(debug: bool) -> Vec<&'static str> {
    let mut args = vec!["install", ".", "--build=missing", "-g", "txt"];
    if debug {
        args.extend(["-s", "build_type=Debug"]);
    }
    args
}

/// What [`maybe_install`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// No conanfile, or build info already present.
    NotNeeded,
    /// A conanfile exists but conan is not on PATH.
    ConanMissing,
    Installed,
    Failed,
}

/// Run `conan install` when `dir` has a conanfile but no build info yet.
/// Every failure is a warning.
pub fn maybe_install(dir: &Path, debug: bool) -> InstallOutcome {
    install_with(dir, debug, |name| which::which(name).ok())
}

/// [`maybe_install`] with `lookup` resolving program names on PATH.
pub fn install_with<F>(dir: &Path, debug: bool, lookup: F) -> InstallOutcome
where
    F: Fn(&str) -> Option<PathBuf>,
{
    if !dir.join(CONANFILE).exists() || dir.join(BUILD_INFO).exists() {
        return InstallOutcome::NotNeeded;
    }

    let Some(conan) = lookup("conan") else {
        ui::warn(format!(
            "Found {} but conan is not on PATH, skipping install",
            CONANFILE
        ));
        return InstallOutcome::ConanMissing;
    };

    ui::info("Installing Conan packages...");
    let args = install_args(debug);
    ui::trace(ui::display_command(
        &conan,
        &args.iter().map(|a| a.to_string()).collect::<Vec<_>>(),
    ));

    match Command::new(&conan).args(&args).current_dir(dir).output() {
        Ok(output) if output.status.success() => InstallOutcome::Installed,
        Ok(output) => {
            ui::warn(format!(
                "conan install failed:\n{}",
                String::from_utf8_lossy(&output.stderr).trim()
            ));
            InstallOutcome::Failed
        }
        Err(e) => {
            ui::warn(format!("Unable to run conan: {}", e));
            InstallOutcome::Failed
        }
    }
}
