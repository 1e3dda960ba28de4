//! MSVC toolchain (cl.exe, link.exe, lib.exe).
//!
//! Flag references:
//! - cl.exe: <https://learn.microsoft.com/en-us/cpp/build/reference/compiler-options-listed-by-category>
//! - link.exe: <https://learn.microsoft.com/en-us/cpp/build/reference/linker-options>

use super::{
    CStandard, Compiler, CompilerOptions, CppStandard, Exceptions, Language, LinkType,
    Optimization, Platform, ToolCommand, ToolError, collect_objects, object_path, path_arg,
    with_suffix,
};
use crate::toolchain::MsvcInstall;
use std::path::{Path, PathBuf};

/// Libraries every non-static MSVC link pulls in.
const DEFAULT_LIBS: &[&str] = &["kernel32.lib", "user32.lib", "advapi32.lib"];

#[derive(Debug, Clone)]
pub struct MsvcCompiler {
    pub install: MsvcInstall,
}

impl MsvcCompiler {
    pub fn new(install: MsvcInstall) -> Self {
        MsvcCompiler { install }
    }

    fn include_env(&self) -> String {
        join_dirs(&self.install.include_dirs())
    }

    fn lib_env(&self) -> String {
        join_dirs(&self.install.link_dirs())
    }

    pub fn compile_command(
        &self,
        source: &Path,
        object_dir: &Path,
        options: &CompilerOptions,
    ) -> ToolCommand {
        let lang = Language::of(source);
        let mut cmd = ToolCommand::new(self.install.compiler());

        cmd.arg("/nologo").arg("/c");
        cmd.arg(format!(
            "/Fo{}",
            path_arg(&object_path(source, object_dir, "obj"))
        ));

        // /MT or /MD, with a trailing d for the debug runtime
        let mut runtime = String::from("/M");
        runtime.push(if options.static_link { 'T' } else { 'D' });
        if options.debug {
            runtime.push('d');
        }
        cmd.arg(runtime);

        cmd.arg(match options.exceptions {
            Exceptions::Standard => "/EHsc",
            Exceptions::All => "/EHa",
            Exceptions::Minimal => "/EHs",
        });

        if options.debug {
            cmd.arg("/Z7");
        }

        match options.optimization {
            Optimization::None => {
                cmd.arg("/Od");
            }
            Optimization::Size => {
                cmd.arg("/O1");
            }
            Optimization::Speed => {
                cmd.arg("/O2");
            }
            Optimization::Default => {}
        }

        if options.strict {
            cmd.args(["/W4", "/WX"]);
        }

        cmd.arg(std_flag(lang, options));

        for dir in &options.include_directories {
            cmd.arg(format!("/I{}", dir));
        }

        for define in &options.defines {
            cmd.arg(format!("/D{}", define));
        }

        cmd.args(options.language_flags(lang).cloned());
        cmd.arg(path_arg(source));
        cmd.env("INCLUDE", self.include_env());
        cmd
    }

    pub fn link_command(
        &self,
        objects: &[PathBuf],
        output: &Path,
        link_type: LinkType,
        options: &CompilerOptions,
    ) -> ToolCommand {
        if link_type == LinkType::StaticLibrary {
            let mut cmd = ToolCommand::new(self.install.librarian());
            cmd.args(["/nologo", "/machine:x64"]);
            cmd.arg(format!("/out:{}", path_arg(output)));
            cmd.args(objects.iter().map(|o| path_arg(o)));
            cmd.env("LIB", self.lib_env());
            return cmd;
        }

        let mut cmd = ToolCommand::new(self.install.linker());
        cmd.args(["/nologo", "/machine:x64", "/incremental:no"]);

        if options.debug {
            cmd.arg("/debug");
        }

        if link_type == LinkType::DynamicLibrary {
            cmd.arg("/dll");
        }

        cmd.arg(format!("/out:{}", path_arg(output)));

        for dir in &options.link_directories {
            cmd.arg(format!("/libpath:{}", dir));
        }

        cmd.args(DEFAULT_LIBS.iter().copied());
        cmd.args(options.link_libraries.iter().cloned());
        cmd.args(options.flags_link.iter().cloned());
        cmd.args(objects.iter().map(|o| path_arg(o)));
        cmd.env("LIB", self.lib_env());
        cmd
    }
}

impl Compiler for MsvcCompiler {
    fn platform(&self) -> Platform {
        Platform::Windows
    }

    fn compile(
        &self,
        source: &Path,
        object_dir: &Path,
        options: &CompilerOptions,
    ) -> Result<(), ToolError> {
        self.compile_command(source, object_dir, options)
            .run(options.verbose)
            .map_err(strip_filename_line)
    }

    fn link(
        &self,
        object_dir: &Path,
        output: &Path,
        link_type: LinkType,
        options: &CompilerOptions,
    ) -> Result<PathBuf, ToolError> {
        let output = with_suffix(output, link_type.output_suffix(Platform::Windows));
        let objects = collect_objects(object_dir, Platform::Windows.object_extension())?;
        self.link_command(&objects, &output, link_type, options)
            .run(options.verbose)?;
        Ok(output)
    }
}

fn std_flag(lang: Language, options: &CompilerOptions) -> &'static str {
    match lang {
        Language::C => match options.c_standard {
            CStandard::Latest => "/std:clatest",
            CStandard::C17 => "/std:c17",
            CStandard::C11 => "/std:c11",
        },
        Language::Cpp => match options.cpp_standard {
            CppStandard::Latest => "/std:c++latest",
            CppStandard::Cpp20 => "/std:c++20",
            CppStandard::Cpp17 => "/std:c++17",
            CppStandard::Cpp14 => "/std:c++14",
        },
    }
}

/// cl.exe always echoes the source file name as its first output line.
fn strip_filename_line(err: ToolError) -> ToolError {
    match err {
        ToolError::Failed(text) => match text.split_once('\n') {
            Some((_, rest)) => ToolError::Failed(rest.to_string()),
            None => ToolError::Failed(text),
        },
        other => other,
    }
}

fn join_dirs(dirs: &[PathBuf]) -> String {
    dirs.iter()
        .map(|d| path_arg(d))
        .collect::<Vec<_>>()
        .join(";")
}
