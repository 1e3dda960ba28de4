//! Compiler abstraction
//!
//! One [`Compiler`] implementation exists per platform toolchain. Each one
//! turns the shared [`CompilerOptions`] into its own flag syntax, so the rest
//! of the build never needs to know which toolchain is driving it.

pub mod darwin;
pub mod gnu;
pub mod msvc;

pub use darwin::DarwinCompiler;
pub use gnu::{GnuCompiler, Toolset};
pub use msvc::MsvcCompiler;

use crate::ui;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;
use thiserror::Error;
use walkdir::WalkDir;

/// Final artifact category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkType {
    #[default]
    Executable,
    DynamicLibrary,
    StaticLibrary,
}

impl LinkType {
    /// Suffix appended to the output name for this artifact on `platform`.
    pub fn output_suffix(self, platform: Platform) -> &'static str {
        match (self, platform) {
            (LinkType::Executable, Platform::Windows) => ".exe",
            (LinkType::Executable, _) => "",
            (LinkType::DynamicLibrary, Platform::Windows) => ".dll",
            (LinkType::DynamicLibrary, Platform::Linux) => ".so",
            (LinkType::DynamicLibrary, Platform::Darwin) => ".dylib",
            (LinkType::StaticLibrary, Platform::Windows) => ".lib",
            (LinkType::StaticLibrary, _) => ".a",
        }
    }
}

impl FromStr for LinkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exe" => Ok(LinkType::Executable),
            "dll" => Ok(LinkType::DynamicLibrary),
            "lib" => Ok(LinkType::StaticLibrary),
            other => Err(format!(
                "unknown output type '{}' (expected exe, dll or lib)",
                other
            )),
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LinkType::Executable => "exe",
            LinkType::DynamicLibrary => "dll",
            LinkType::StaticLibrary => "lib",
        };
        f.write_str(s)
    }
}

/// Platform family a compiler produces artifacts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Linux,
    Darwin,
}

impl Platform {
    /// Extension (without dot) of object files on this platform.
    pub fn object_extension(self) -> &'static str {
        match self {
            Platform::Windows => "obj",
            _ => "o",
        }
    }

    /// File suffixes `clean` removes, the bare name included.
    pub fn clean_file_suffixes(self) -> &'static [&'static str] {
        match self {
            Platform::Windows => &["", ".exe", ".dll", ".lib", ".exp", ".pdb"],
            Platform::Linux => &["", ".so", ".a"],
            Platform::Darwin => &["", ".dylib", ".a"],
        }
    }

    /// Directory suffixes `clean` removes recursively.
    pub fn clean_dir_suffixes(self) -> &'static [&'static str] {
        match self {
            Platform::Darwin => &[".dSYM"],
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Optimization {
    /// Resolved to `Speed`, or `None` for debug builds.
    #[default]
    Default,
    None,
    Size,
    Speed,
}

impl Optimization {
    pub fn resolve(self, debug: bool) -> Self {
        match self {
            Optimization::Default if debug => Optimization::None,
            Optimization::Default => Optimization::Speed,
            other => other,
        }
    }
}

impl FromStr for Optimization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(Optimization::Default),
            "none" => Ok(Optimization::None),
            "size" => Ok(Optimization::Size),
            "speed" => Ok(Optimization::Speed),
            other => Err(format!(
                "unknown optimization '{}' (expected default, none, size or speed)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Exceptions {
    #[default]
    Standard,
    All,
    Minimal,
}

impl FromStr for Exceptions {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "std" | "standard" => Ok(Exceptions::Standard),
            "all" => Ok(Exceptions::All),
            "min" | "minimal" => Ok(Exceptions::Minimal),
            other => Err(format!(
                "unknown exception mode '{}' (expected std, all or min)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CppStandard {
    #[default]
    Latest,
    Cpp20,
    Cpp17,
    Cpp14,
}

impl FromStr for CppStandard {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_lowercase();
        match normalized.trim_start_matches("c++") {
            "latest" => Ok(CppStandard::Latest),
            "20" => Ok(CppStandard::Cpp20),
            "17" => Ok(CppStandard::Cpp17),
            "14" => Ok(CppStandard::Cpp14),
            _ => Err(format!(
                "unknown C++ standard '{}' (expected latest, 20, 17 or 14)",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CStandard {
    #[default]
    Latest,
    C17,
    C11,
}

impl FromStr for CStandard {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_lowercase();
        match normalized.trim_start_matches('c') {
            "latest" => Ok(CStandard::Latest),
            "17" => Ok(CStandard::C17),
            "11" => Ok(CStandard::C11),
            _ => Err(format!(
                "unknown C standard '{}' (expected latest, 17 or 11)",
                s
            )),
        }
    }
}

/// The merged set of options every compile and link call receives.
///
/// List fields are append-only: insertion order is command-line order, and
/// nothing is ever deduplicated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompilerOptions {
    pub static_link: bool,
    pub debug: bool,
    pub verbose: bool,
    pub strict: bool,

    pub optimization: Optimization,
    pub exceptions: Exceptions,
    pub cpp_standard: CppStandard,
    pub c_standard: CStandard,

    pub include_directories: Vec<String>,
    pub link_directories: Vec<String>,
    pub link_libraries: Vec<String>,
    pub defines: Vec<String>,

    /// Flags only passed when compiling C files.
    pub flags_c: Vec<String>,
    /// Flags only passed when compiling C++ files.
    pub flags_cpp: Vec<String>,
    /// Flags passed for both C and C++ files.
    pub flags_shared: Vec<String>,
    pub flags_link: Vec<String>,
}

/// Source language, decided by file extension alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    C,
    Cpp,
}

impl Language {
    pub fn of(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if ext == "c" => Language::C,
            _ => Language::Cpp,
        }
    }
}

impl CompilerOptions {
    /// The shared flag bucket followed by the bucket for `lang`.
    pub fn language_flags(&self, lang: Language) -> impl Iterator<Item = &String> {
        let specific = match lang {
            Language::C => &self.flags_c,
            Language::Cpp => &self.flags_cpp,
        };
        self.flags_shared.iter().chain(specific.iter())
    }
}

/// Failure of a single toolchain invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unable to run {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The toolchain exited non-zero; holds its output text.
    #[error("{0}")]
    Failed(String),
    #[error("unable to collect objects from {}: {source}", dir.display())]
    Objects {
        dir: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// A fully specified toolchain invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Variables added on top of the inherited environment.
    pub env: Vec<(String, String)>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        ToolCommand {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn arg(&mut self, arg: impl Into<String>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Run to completion. On a non-zero exit, the combined output becomes
    /// the error text.
    pub fn run(&self, verbose: bool) -> Result<(), ToolError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        if verbose {
            ui::trace(ui::display_command(&self.program, &self.args));
        }

        let output = cmd.output().map_err(|source| ToolError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        if output.status.success() {
            return Ok(());
        }

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Err(ToolError::Failed(
            text.trim_matches(|c| c == '\r' || c == '\n').to_string(),
        ))
    }
}

/// The capability set every platform toolchain provides.
pub trait Compiler: Send + Sync {
    /// Platform whose artifact conventions this compiler follows.
    fn platform(&self) -> Platform;

    /// Compile one translation unit into `object_dir/<stem>.<obj ext>`.
    fn compile(
        &self,
        source: &Path,
        object_dir: &Path,
        options: &CompilerOptions,
    ) -> Result<(), ToolError>;

    /// Link every object under `object_dir` into `output` plus the suffix
    /// for `link_type`. Returns the final artifact path.
    fn link(
        &self,
        object_dir: &Path,
        output: &Path,
        link_type: LinkType,
        options: &CompilerOptions,
    ) -> Result<PathBuf, ToolError>;

    /// Remove every artifact `link` could have produced for `name`.
    /// Missing files are ignored.
    fn clean(&self, name: &Path) {
        let platform = self.platform();
        for suffix in platform.clean_file_suffixes() {
            let _ = fs::remove_file(with_suffix(name, suffix));
        }
        for suffix in platform.clean_dir_suffixes() {
            let _ = fs::remove_dir_all(with_suffix(name, suffix));
        }
    }
}

/// `path` with `suffix` appended verbatim (not an extension replacement).
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

/// Path of the object file `source` compiles to.
pub fn object_path(source: &Path, object_dir: &Path, extension: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    object_dir.join(format!("{}.{}", stem, extension))
}

/// Walk `dir` recursively and collect every file with `extension`.
pub fn collect_objects(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, ToolError> {
    let mut objects = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(|source| ToolError::Objects {
            dir: dir.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == extension)
        {
            objects.push(entry.into_path());
        }
    }
    Ok(objects)
}

/// Path argument rendered for a command line.
pub(crate) fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_output_suffix_windows() {
        assert_eq!(LinkType::Executable.output_suffix(Platform::Windows), ".exe");
        assert_eq!(
            LinkType::DynamicLibrary.output_suffix(Platform::Windows),
            ".dll"
        );
        assert_eq!(
            LinkType::StaticLibrary.output_suffix(Platform::Windows),
            ".lib"
        );
    }

    #[test]
    fn test_output_suffix_unix() {
        assert_eq!(LinkType::Executable.output_suffix(Platform::Linux), "");
        assert_eq!(LinkType::Executable.output_suffix(Platform::Darwin), "");
        assert_eq!(LinkType::DynamicLibrary.output_suffix(Platform::Linux), ".so");
        assert_eq!(
            LinkType::DynamicLibrary.output_suffix(Platform::Darwin),
            ".dylib"
        );
        assert_eq!(LinkType::StaticLibrary.output_suffix(Platform::Linux), ".a");
        assert_eq!(LinkType::StaticLibrary.output_suffix(Platform::Darwin), ".a");
    }

    #[test]
    fn test_link_type_parse() {
        assert_eq!("exe".parse::<LinkType>(), Ok(LinkType::Executable));
        assert_eq!("dll".parse::<LinkType>(), Ok(LinkType::DynamicLibrary));
        assert_eq!("LIB".parse::<LinkType>(), Ok(LinkType::StaticLibrary));
        assert!("so".parse::<LinkType>().is_err());
    }

    #[test]
    fn test_optimization_resolve() {
        assert_eq!(Optimization::Default.resolve(false), Optimization::Speed);
        assert_eq!(Optimization::Default.resolve(true), Optimization::None);
        assert_eq!(Optimization::Size.resolve(true), Optimization::Size);
    }

    #[test]
    fn test_standard_parse() {
        assert_eq!("20".parse::<CppStandard>(), Ok(CppStandard::Cpp20));
        assert_eq!("c++17".parse::<CppStandard>(), Ok(CppStandard::Cpp17));
        assert_eq!("latest".parse::<CppStandard>(), Ok(CppStandard::Latest));
        assert!("11".parse::<CppStandard>().is_err());
        assert_eq!("11".parse::<CStandard>(), Ok(CStandard::C11));
        assert_eq!("c17".parse::<CStandard>(), Ok(CStandard::C17));
        assert!("99".parse::<CStandard>().is_err());
    }

    #[test]
    fn test_exceptions_parse() {
        assert_eq!("std".parse::<Exceptions>(), Ok(Exceptions::Standard));
        assert_eq!("all".parse::<Exceptions>(), Ok(Exceptions::All));
        assert_eq!("min".parse::<Exceptions>(), Ok(Exceptions::Minimal));
    }

    #[test]
    fn test_language_by_extension() {
        assert_eq!(Language::of(Path::new("src/a.c")), Language::C);
        assert_eq!(Language::of(Path::new("src/a.cpp")), Language::Cpp);
        assert_eq!(Language::of(Path::new("src/a.cc")), Language::Cpp);
        assert_eq!(Language::of(Path::new("Makefile")), Language::Cpp);
    }

    #[test]
    fn test_with_suffix_appends() {
        assert_eq!(
            with_suffix(Path::new("out/app.v2"), ".so"),
            PathBuf::from("out/app.v2.so")
        );
        assert_eq!(with_suffix(Path::new("app"), ""), PathBuf::from("app"));
    }

    #[test]
    fn test_collect_objects_finds_nested_objects_only() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("src").join("net");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("main.o"), b"").unwrap();
        fs::write(nested.join("socket.o"), b"").unwrap();
        fs::write(nested.join("socket.d"), b"").unwrap();
        fs::write(dir.path().join("notes.obj"), b"").unwrap();

        let found: HashSet<_> = collect_objects(dir.path(), "o")
            .unwrap()
            .into_iter()
            .collect();
        let expected: HashSet<_> = [dir.path().join("main.o"), nested.join("socket.o")]
            .into_iter()
            .collect();
        assert_eq!(found, expected);
    }

    struct NullCompiler(Platform);

    impl Compiler for NullCompiler {
        fn platform(&self) -> Platform {
            self.0
        }

        fn compile(&self, _: &Path, _: &Path, _: &CompilerOptions) -> Result<(), ToolError> {
            Ok(())
        }

        fn link(
            &self,
            _: &Path,
            output: &Path,
            _: LinkType,
            _: &CompilerOptions,
        ) -> Result<PathBuf, ToolError> {
            Ok(output.to_path_buf())
        }
    }

    #[test]
    fn test_clean_removes_darwin_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let name = dir.path().join("app");
        fs::write(&name, b"").unwrap();
        fs::write(with_suffix(&name, ".dylib"), b"").unwrap();
        fs::write(with_suffix(&name, ".a"), b"").unwrap();
        fs::create_dir_all(with_suffix(&name, ".dSYM").join("Contents")).unwrap();
        fs::write(dir.path().join("keep.txt"), b"").unwrap();

        NullCompiler(Platform::Darwin).clean(&name);

        let left: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(left, vec!["keep.txt".to_string()]);
    }

    #[test]
    fn test_clean_is_noop_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        for platform in [Platform::Windows, Platform::Linux, Platform::Darwin] {
            NullCompiler(platform).clean(&dir.path().join("missing"));
        }
        assert!(dir.path().exists());
    }
}
