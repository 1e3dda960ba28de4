//! Option aggregation.
//!
//! Builds the final [`CompilerOptions`] from every configuration source, in
//! precedence order:
//!
//! 1. Defaults, CLI values and `qb.toml` (already bound in [`BuildSettings`])
//! 2. Each requested package: local definition, else pkg-config
//! 3. The Conan manifest, if present
//!
//! Lists are only ever appended to.

pub mod conan;
pub mod package;

pub use conan::Conanfile;
pub use package::{Package, add_package};

use crate::compiler::{CompilerOptions, Platform};
use crate::config::BuildSettings;
use crate::ui;
use std::path::Path;

/// Merge packages and the Conan manifest found in `project_dir` on top of
/// the bound settings.
pub fn aggregate(settings: &BuildSettings, project_dir: &Path, platform: Platform) -> CompilerOptions {
    let mut options = settings.options.clone();

    for name in &settings.packages {
        match add_package(&mut options, &settings.local_packages, name) {
            Some(pkg) => ui::trace(format!("Added package {}", pkg.name)),
            None => ui::warn(format!("Unable to find package {}", name)),
        }
    }

    let build_info = project_dir.join(conan::BUILD_INFO);
    if build_info.exists() {
        match Conanfile::load(&build_info) {
            Ok(manifest) => {
                ui::info("Adding Conan packages");
                manifest.apply(
                    &mut options,
                    settings.link_type,
                    platform == Platform::Windows,
                );
            }
            Err(e) => ui::warn(format!("Ignoring {}: {}", conan::BUILD_INFO, e)),
        }
    }

    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CliOverrides, PackageDef};

    fn settings() -> BuildSettings {
        let cli = CliOverrides {
            include: vec!["include".into()],
            pkg: vec!["local_dep".into()],
            ..Default::default()
        };
        let mut settings = BuildSettings::resolve(&cli, None, "demo").unwrap();
        settings.local_packages.insert(
            "local_dep".into(),
            PackageDef {
                includes: vec!["deps/local".into()],
                links: vec!["local".into()],
                ..Default::default()
            },
        );
        settings
    }

    #[test]
    fn test_precedence_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(conan::BUILD_INFO),
            "[includedirs]\n/conan/include\n[libs]\nfmt\n",
        )
        .unwrap();

        let options = aggregate(&settings(), dir.path(), Platform::Windows);
        assert_eq!(
            options.include_directories,
            vec!["include", "deps/local", "/conan/include"]
        );
        assert_eq!(options.link_libraries, vec!["local", "fmt.lib"]);
    }

    #[test]
    fn test_without_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let options = aggregate(&settings(), dir.path(), Platform::Linux);
        assert_eq!(options.include_directories, vec!["include", "deps/local"]);
        assert_eq!(options.link_libraries, vec!["local"]);
    }

    #[test]
    fn test_malformed_manifest_contributes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(conan::BUILD_INFO), "orphan\n[libs]\nfmt\n").unwrap();
        let options = aggregate(&settings(), dir.path(), Platform::Linux);
        assert_eq!(options.link_libraries, vec!["local"]);
    }
}
