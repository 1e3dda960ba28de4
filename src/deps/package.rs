//! Named package resolution: local `[package.<name>]` tables first, then
//! pkg-config on Unix-like hosts.

use crate::compiler::CompilerOptions;
use crate::config::PackageDef;
use crate::ui;
use std::collections::BTreeMap;
use std::process::Command;

/// A resolved dependency. Only its presence matters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
}

/// Resolve `name` and append its flags to `options`. First success wins.
pub fn add_package(
    options: &mut CompilerOptions,
    local: &BTreeMap<String, PackageDef>,
    name: &str,
) -> Option<Package> {
    if let Some(pkg) = add_package_local(options, local, name) {
        return Some(pkg);
    }

    if cfg!(unix) {
        return add_package_pkg_config(options, name);
    }

    None
}

pub fn add_package_local(
    options: &mut CompilerOptions,
    local: &BTreeMap<String, PackageDef>,
    name: &str,
) -> Option<Package> {
    let def = local.get(name)?;
    ui::trace(format!("Using local package definition for {}", name));
    apply_package_def(options, def);
    Some(Package {
        name: name.to_string(),
    })
}

/// Append a local definition. `cflags` go to the shared bucket.
pub fn apply_package_def(options: &mut CompilerOptions, def: &PackageDef) {
    options.include_directories.extend(def.includes.iter().cloned());
    options.link_directories.extend(def.linkdirs.iter().cloned());
    options.link_libraries.extend(def.links.iter().cloned());
    options.defines.extend(def.defines.iter().cloned());
    options.flags_shared.extend(def.cflags.iter().cloned());
    options.flags_link.extend(def.lflags.iter().cloned());
}

pub fn add_package_pkg_config(options: &mut CompilerOptions, name: &str) -> Option<Package> {
    let pkg_config = which::which("pkg-config").ok()?;

    let query = |flag: &str| -> Option<String> {
        let output = Command::new(&pkg_config).args([name, flag]).output().ok()?;
        if !output.status.success() {
            return None;
        }
        Some(String::from_utf8_lossy(&output.stdout).into_owned())
    };

    // Both queries must succeed before anything is appended.
    let cflags = query("--cflags")?;
    let libs = query("--libs")?;

    ui::trace(format!("Resolved {} via pkg-config", name));
    apply_pkg_config_output(options, &cflags, &libs);
    Some(Package {
        name: name.to_string(),
    })
}

/// Shell-split pkg-config output: `--cflags` into the shared bucket and
/// `--libs` into the linker bucket.
pub fn apply_pkg_config_output(options: &mut CompilerOptions, cflags: &str, libs: &str) {
    options.flags_shared.extend(split_flags(cflags));
    options.flags_link.extend(split_flags(libs));
}

fn split_flags(text: &str) -> Vec<String> {
    let text = text.trim_matches(|c| c == '\r' || c == '\n');
    shlex::split(text).unwrap_or_else(|| text.split_whitespace().map(str::to_string).collect())
}
