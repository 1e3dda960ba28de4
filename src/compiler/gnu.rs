//! clang/gcc toolchain for Linux and other Unix-likes.

use super::{
    CStandard, Compiler, CompilerOptions, CppStandard, Exceptions, Language, LinkType,
    Optimization, Platform, ToolCommand, ToolError, collect_objects, object_path, path_arg,
    with_suffix,
};
use std::path::{Path, PathBuf};

/// Which GNU-compatible driver was found on PATH.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toolset {
    Clang,
    Gcc,
}

impl Toolset {
    pub fn program_name(self) -> &'static str {
        match self {
            Toolset::Clang => "clang",
            Toolset::Gcc => "gcc",
        }
    }

    /// Runtime flags added to every non-archive link.
    pub fn runtime_link_flags(self) -> &'static [&'static str] {
        match self {
            Toolset::Clang => &[],
            Toolset::Gcc => &["-static-libgcc", "-static-libstdc++"],
        }
    }
}

#[derive(Debug, Clone)]
pub struct GnuCompiler {
    pub toolset: Toolset,
    /// Resolved compiler driver, also used for linking.
    pub driver: PathBuf,
    pub archiver: PathBuf,
}

impl GnuCompiler {
    pub fn new(toolset: Toolset, driver: PathBuf) -> Self {
        GnuCompiler {
            toolset,
            driver,
            archiver: PathBuf::from("ar"),
        }
    }

    pub fn compile_command(
        &self,
        source: &Path,
        object_dir: &Path,
        options: &CompilerOptions,
    ) -> ToolCommand {
        compile_command(&self.driver, source, object_dir, options)
    }

    pub fn link_command(
        &self,
        objects: &[PathBuf],
        output: &Path,
        link_type: LinkType,
        options: &CompilerOptions,
    ) -> ToolCommand {
        if link_type == LinkType::StaticLibrary {
            return archive_command(&self.archiver, objects, output);
        }
        link_command(
            &self.driver,
            objects,
            output,
            link_type,
            options,
            &LINUX_LINK,
            self.toolset.runtime_link_flags(),
        )
    }
}

impl Compiler for GnuCompiler {
    fn platform(&self) -> Platform {
        Platform::Linux
    }

    fn compile(
        &self,
        source: &Path,
        object_dir: &Path,
        options: &CompilerOptions,
    ) -> Result<(), ToolError> {
        self.compile_command(source, object_dir, options)
            .run(options.verbose)
    }

    fn link(
        &self,
        object_dir: &Path,
        output: &Path,
        link_type: LinkType,
        options: &CompilerOptions,
    ) -> Result<PathBuf, ToolError> {
        let output = with_suffix(output, link_type.output_suffix(Platform::Linux));
        let objects = collect_objects(object_dir, Platform::Linux.object_extension())?;
        self.link_command(&objects, &output, link_type, options)
            .run(options.verbose)?;
        Ok(output)
    }
}

/// Per-platform differences in a GNU-style link line.
pub(crate) struct LinkFlavor {
    pub dynamic_flag: &'static str,
    pub cpp_runtime: &'static str,
}

pub(crate) const LINUX_LINK: LinkFlavor = LinkFlavor {
    dynamic_flag: "-shared",
    cpp_runtime: "-lstdc++",
};

pub(crate) fn std_flag(lang: Language, options: &CompilerOptions) -> &'static str {
    match lang {
        Language::C => match options.c_standard {
            CStandard::Latest => "-std=c2x",
            CStandard::C17 => "-std=c17",
            CStandard::C11 => "-std=c11",
        },
        Language::Cpp => match options.cpp_standard {
            CppStandard::Latest => "-std=c++2b",
            CppStandard::Cpp20 => "-std=c++20",
            CppStandard::Cpp17 => "-std=c++17",
            CppStandard::Cpp14 => "-std=c++14",
        },
    }
}

pub(crate) fn compile_command(
    driver: &Path,
    source: &Path,
    object_dir: &Path,
    options: &CompilerOptions,
) -> ToolCommand {
    let lang = Language::of(source);
    let mut cmd = ToolCommand::new(driver);

    cmd.arg("-c")
        .arg("-o")
        .arg(path_arg(&object_path(source, object_dir, "o")));

    if options.debug {
        cmd.arg("-g");
    }

    match options.optimization {
        Optimization::None => {
            cmd.arg("-O0");
        }
        Optimization::Size => {
            cmd.arg("-Os");
        }
        Optimization::Speed => {
            cmd.arg("-O2");
        }
        Optimization::Default => {}
    }

    if options.strict {
        cmd.args(["-Wall", "-Wextra", "-Werror"]);
    }

    if lang == Language::Cpp && options.exceptions == Exceptions::Minimal {
        cmd.arg("-fno-exceptions");
    }

    cmd.arg(std_flag(lang, options));

    for dir in &options.include_directories {
        cmd.arg(format!("-I{}", dir));
    }

    for define in &options.defines {
        cmd.arg(format!("-D{}", define));
    }

    cmd.args(options.language_flags(lang).cloned());
    cmd.arg(path_arg(source));
    cmd
}

pub(crate) fn link_command(
    driver: &Path,
    objects: &[PathBuf],
    output: &Path,
    link_type: LinkType,
    options: &CompilerOptions,
    flavor: &LinkFlavor,
    runtime_flags: &[&str],
) -> ToolCommand {
    let mut cmd = ToolCommand::new(driver);
    cmd.arg("-o").arg(path_arg(output));

    if link_type == LinkType::DynamicLibrary {
        cmd.arg(flavor.dynamic_flag);
    }

    cmd.args(runtime_flags.iter().copied());

    if options.static_link {
        cmd.arg("-static");
    }

    if options.debug {
        cmd.arg("-g");
    }

    for dir in &options.link_directories {
        cmd.arg(format!("-L{}", dir));
    }

    // Objects must precede libraries for single-pass linkers.
    cmd.args(objects.iter().map(|o| path_arg(o)));

    cmd.arg(flavor.cpp_runtime);

    for lib in &options.link_libraries {
        cmd.arg(format!("-l{}", lib));
    }

    cmd.args(options.flags_link.iter().cloned());
    cmd
}

/// `ar rcs`: insert with replacement, create the archive, write an index.
pub(crate) fn archive_command(archiver: &Path, objects: &[PathBuf], output: &Path) -> ToolCommand {
    let mut cmd = ToolCommand::new(archiver);
    cmd.arg("rcs").arg(path_arg(output));
    cmd.args(objects.iter().map(|o| path_arg(o)));
    cmd
}
