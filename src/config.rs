//! Project configuration (`qb.toml`) and the CLI/file binding layer.
//!
//! ```toml
//! name = "server"
//! type = "exe"
//! cppstd = 20
//! pkg = ["zlib"]
//!
//! [package.zlib]
//! includes = ["third_party/zlib"]
//! links = ["z"]
//! ```

use crate::compiler::{CStandard, CompilerOptions, CppStandard, Exceptions, LinkType, Optimization};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub const CONFIG_FILE: &str = "qb.toml";

/// Errors from the configuration sources. Never fatal: the source that
/// produced one simply contributes nothing.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for '{key}': {message}")]
    Invalid { key: &'static str, message: String },
    #[error("line {line}: entry '{text}' appears before any [section] header")]
    Conan { line: usize, text: String },
}

/// A language standard written either as a string or a bare integer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StandardValue {
    Number(i64),
    Text(String),
}

impl fmt::Display for StandardValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StandardValue::Number(n) => write!(f, "{}", n),
            StandardValue::Text(s) => f.write_str(s),
        }
    }
}

/// A local package definition, `[package.<name>]`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PackageDef {
    pub includes: Vec<String>,
    pub linkdirs: Vec<String>,
    pub links: Vec<String>,
    pub defines: Vec<String>,
    pub cflags: Vec<String>,
    pub lflags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct QbConfig {
    pub name: Option<String>,
    pub out: Option<String>,
    #[serde(rename = "type")]
    pub link_type: Option<String>,
    #[serde(rename = "static")]
    pub static_link: bool,
    pub debug: bool,
    pub verbose: bool,
    pub strict: bool,
    pub exceptions: Option<String>,
    pub optimize: Option<String>,
    pub cppstd: Option<StandardValue>,
    pub cstd: Option<StandardValue>,
    pub include: Vec<String>,
    pub define: Vec<String>,
    pub pkg: Vec<String>,
    pub package: BTreeMap<String, PackageDef>,
}

/// Load `path`. A missing file is `Ok(None)`.
pub fn load_config(path: &Path) -> Result<Option<QbConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&text)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Values taken from the command line. `None` and empty lists mean "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub name: Option<String>,
    pub out: Option<PathBuf>,
    pub link_type: Option<LinkType>,
    pub static_link: bool,
    pub debug: bool,
    pub verbose: bool,
    pub strict: bool,
    pub exceptions: Option<Exceptions>,
    pub optimize: Option<Optimization>,
    pub cpp_standard: Option<CppStandard>,
    pub c_standard: Option<CStandard>,
    pub include: Vec<String>,
    pub define: Vec<String>,
    pub pkg: Vec<String>,
}

/// The bound configuration a build starts from, before any package or
/// manifest contributions.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildSettings {
    pub name: String,
    pub out_dir: PathBuf,
    pub link_type: LinkType,
    pub options: CompilerOptions,
    /// Requested package names, in resolution order.
    pub packages: Vec<String>,
    pub local_packages: BTreeMap<String, PackageDef>,
}

impl BuildSettings {
    /// Bind CLI values over `file`, falling back to defaults.
    ///
    /// Scalars: CLI, then file, then default. Switches: CLI or file.
    /// Lists: CLI entries followed by file entries.
    pub fn resolve(
        cli: &CliOverrides,
        file: Option<&QbConfig>,
        default_name: &str,
    ) -> Result<Self, ConfigError> {
        let empty = QbConfig::default();
        let file = file.unwrap_or(&empty);

        let name = cli
            .name
            .clone()
            .or_else(|| file.name.clone())
            .unwrap_or_else(|| default_name.to_string());

        let out_dir = cli
            .out
            .clone()
            .or_else(|| file.out.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));

        let link_type = pick(cli.link_type, file.link_type.as_deref(), "type")?;
        let exceptions = pick(cli.exceptions, file.exceptions.as_deref(), "exceptions")?;
        let optimize: Optimization = pick(cli.optimize, file.optimize.as_deref(), "optimize")?;
        let cpp_standard = pick(
            cli.cpp_standard,
            file.cppstd.as_ref().map(|v| v.to_string()).as_deref(),
            "cppstd",
        )?;
        let c_standard = pick(
            cli.c_standard,
            file.cstd.as_ref().map(|v| v.to_string()).as_deref(),
            "cstd",
        )?;

        let debug = cli.debug || file.debug;

        let options = CompilerOptions {
            static_link: cli.static_link || file.static_link,
            debug,
            verbose: cli.verbose || file.verbose,
            strict: cli.strict || file.strict,
            optimization: optimize.resolve(debug),
            exceptions,
            cpp_standard,
            c_standard,
            include_directories: concat(&cli.include, &file.include),
            defines: concat(&cli.define, &file.define),
            ..Default::default()
        };

        Ok(BuildSettings {
            name,
            out_dir,
            link_type,
            options,
            packages: concat(&cli.pkg, &file.pkg),
            local_packages: file.package.clone(),
        })
    }

    /// Output base path, without the platform suffix.
    pub fn output_base(&self) -> PathBuf {
        self.out_dir.join(&self.name)
    }
}

fn pick<T>(cli: Option<T>, file: Option<&str>, key: &'static str) -> Result<T, ConfigError>
where
    T: FromStr<Err = String> + Default,
{
    if let Some(value) = cli {
        return Ok(value);
    }
    match file {
        Some(text) => text
            .parse()
            .map_err(|message| ConfigError::Invalid { key, message }),
        None => Ok(T::default()),
    }
}

fn concat(first: &[String], second: &[String]) -> Vec<String> {
    first.iter().chain(second).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> QbConfig {
        toml::from_str(text).unwrap()
    }

    #[test]
    fn test_defaults_without_file() {
        let settings = BuildSettings::resolve(&CliOverrides::default(), None, "demo").unwrap();
        assert_eq!(settings.name, "demo");
        assert_eq!(settings.out_dir, PathBuf::from("."));
        assert_eq!(settings.link_type, LinkType::Executable);
        assert_eq!(settings.options.exceptions, Exceptions::Standard);
        assert_eq!(settings.options.optimization, Optimization::Speed);
        assert_eq!(settings.options.cpp_standard, CppStandard::Latest);
        assert_eq!(settings.options.c_standard, CStandard::Latest);
        assert!(settings.packages.is_empty());
    }

    #[test]
    fn test_debug_resolves_default_optimization_to_none() {
        let cli = CliOverrides {
            debug: true,
            ..Default::default()
        };
        let settings = BuildSettings::resolve(&cli, None, "demo").unwrap();
        assert_eq!(settings.options.optimization, Optimization::None);

        let cli = CliOverrides {
            debug: true,
            optimize: Some(Optimization::Size),
            ..Default::default()
        };
        let settings = BuildSettings::resolve(&cli, None, "demo").unwrap();
        assert_eq!(settings.options.optimization, Optimization::Size);
    }

    #[test]
    fn test_file_values_and_integer_standards() {
        let file = parse(
            r#"
            name = "server"
            out = "bin"
            type = "dll"
            static = true
            cppstd = 17
            cstd = "11"
            exceptions = "min"
            "#,
        );
        let settings = BuildSettings::resolve(&CliOverrides::default(), Some(&file), "demo").unwrap();
        assert_eq!(settings.name, "server");
        assert_eq!(settings.output_base(), PathBuf::from("bin").join("server"));
        assert_eq!(settings.link_type, LinkType::DynamicLibrary);
        assert!(settings.options.static_link);
        assert_eq!(settings.options.cpp_standard, CppStandard::Cpp17);
        assert_eq!(settings.options.c_standard, CStandard::C11);
        assert_eq!(settings.options.exceptions, Exceptions::Minimal);
    }

    #[test]
    fn test_cli_overrides_file_scalars() {
        let file = parse("name = \"server\"\ntype = \"dll\"\ncppstd = 14\n");
        let cli = CliOverrides {
            name: Some("client".into()),
            link_type: Some(LinkType::StaticLibrary),
            ..Default::default()
        };
        let settings = BuildSettings::resolve(&cli, Some(&file), "demo").unwrap();
        assert_eq!(settings.name, "client");
        assert_eq!(settings.link_type, LinkType::StaticLibrary);
        assert_eq!(settings.options.cpp_standard, CppStandard::Cpp14);
    }

    #[test]
    fn test_lists_append_cli_then_file() {
        let file = parse("include = [\"inc\"]\ndefine = [\"B\"]\npkg = [\"zlib\"]\n");
        let cli = CliOverrides {
            include: vec!["cli_inc".into()],
            define: vec!["A".into()],
            pkg: vec!["sdl2".into(), "zlib".into()],
            ..Default::default()
        };
        let settings = BuildSettings::resolve(&cli, Some(&file), "demo").unwrap();
        assert_eq!(settings.options.include_directories, vec!["cli_inc", "inc"]);
        assert_eq!(settings.options.defines, vec!["A", "B"]);
        assert_eq!(settings.packages, vec!["sdl2", "zlib", "zlib"]);
    }

    #[test]
    fn test_switches_are_or_of_cli_and_file() {
        let file = parse("strict = true\n");
        let cli = CliOverrides {
            verbose: true,
            ..Default::default()
        };
        let settings = BuildSettings::resolve(&cli, Some(&file), "demo").unwrap();
        assert!(settings.options.strict);
        assert!(settings.options.verbose);
        assert!(!settings.options.debug);
    }

    #[test]
    fn test_invalid_file_value() {
        let file = parse("optimize = \"fastest\"\n");
        let err = BuildSettings::resolve(&CliOverrides::default(), Some(&file), "demo").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "optimize", .. }));
    }

    #[test]
    fn test_package_tables() {
        let file = parse(
            r#"
            [package.zlib]
            includes = ["vendor/zlib"]
            links = ["z"]
            "#,
        );
        let zlib = &file.package["zlib"];
        assert_eq!(zlib.includes, vec!["vendor/zlib"]);
        assert_eq!(zlib.links, vec!["z"]);
        assert!(zlib.cflags.is_empty());
    }

    #[test]
    fn test_load_config_missing_and_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        assert!(load_config(&path).unwrap().is_none());

        std::fs::write(&path, "name = [unterminated").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Parse { .. })));

        std::fs::write(&path, "name = \"ok\"\n").unwrap();
        let config = load_config(&path).unwrap().unwrap();
        assert_eq!(config.name.as_deref(), Some("ok"));
    }
}
