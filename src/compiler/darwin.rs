//! Apple clang toolchain.

use super::gnu::{self, LinkFlavor};
use super::{
    Compiler, CompilerOptions, LinkType, Platform, ToolCommand, ToolError, collect_objects,
    path_arg, with_suffix,
};
use crate::ui;
use std::path::{Path, PathBuf};

const DARWIN_LINK: LinkFlavor = LinkFlavor {
    dynamic_flag: "-dynamiclib",
    cpp_runtime: "-lc++",
};

#[derive(Debug, Clone)]
pub struct DarwinCompiler {
    pub driver: PathBuf,
    pub archiver: PathBuf,
    pub dsymutil: PathBuf,
}

impl Default for DarwinCompiler {
    fn default() -> Self {
        DarwinCompiler {
            driver: PathBuf::from("clang"),
            archiver: PathBuf::from("ar"),
            dsymutil: PathBuf::from("dsymutil"),
        }
    }
}

impl DarwinCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compile_command(
        &self,
        source: &Path,
        object_dir: &Path,
        options: &CompilerOptions,
    ) -> ToolCommand {
        gnu::compile_command(&self.driver, source, object_dir, options)
    }

    pub fn link_command(
        &self,
        objects: &[PathBuf],
        output: &Path,
        link_type: LinkType,
        options: &CompilerOptions,
    ) -> ToolCommand {
        if link_type == LinkType::StaticLibrary {
            return gnu::archive_command(&self.archiver, objects, output);
        }
        gnu::link_command(
            &self.driver,
            objects,
            output,
            link_type,
            options,
            &DARWIN_LINK,
            &[],
        )
    }

    /// Bundle debug symbols next to the artifact. Failure is only a warning.
    fn bundle_debug_symbols(&self, artifact: &Path, verbose: bool) {
        let mut cmd = ToolCommand::new(&self.dsymutil);
        cmd.arg(path_arg(artifact));
        if let Err(e) = cmd.run(verbose) {
            ui::warn(format!("Unable to generate debug information: {}", e));
        }
    }
}

impl Compiler for DarwinCompiler {
    fn platform(&self) -> Platform {
        Platform::Darwin
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
        if options.static_link && link_type != LinkType::StaticLibrary {
            ui::warn("Static linking is not supported on macOS!");
        }

        let output = with_suffix(output, link_type.output_suffix(Platform::Darwin));
        let objects = collect_objects(object_dir, Platform::Darwin.object_extension())?;
        self.link_command(&objects, &output, link_type, options)
            .run(options.verbose)?;

        if options.debug && link_type != LinkType::StaticLibrary {
            self.bundle_debug_symbols(&output, options.verbose);
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dynamic_library_uses_dynamiclib_and_libcxx() {
        let options = CompilerOptions {
            link_libraries: vec!["curl".into()],
            ..Default::default()
        };
        let cmd = DarwinCompiler::new().link_command(
            &[PathBuf::from("a.o")],
            Path::new("libnet.dylib"),
            LinkType::DynamicLibrary,
            &options,
        );
        assert_eq!(
            cmd.args,
            vec!["-o", "libnet.dylib", "-dynamiclib", "a.o", "-lc++", "-lcurl"]
        );
    }

    #[test]
    fn test_static_request_still_emits_flag() {
        let options = CompilerOptions {
            static_link: true,
            ..Default::default()
        };
        let cmd = DarwinCompiler::new().link_command(
            &[PathBuf::from("a.o")],
            Path::new("app"),
            LinkType::Executable,
            &options,
        );
        assert!(cmd.args.contains(&"-static".to_string()));
    }

    #[test]
    fn test_static_library_uses_ar() {
        let cmd = DarwinCompiler::new().link_command(
            &[PathBuf::from("a.o")],
            Path::new("app.a"),
            LinkType::StaticLibrary,
            &CompilerOptions::default(),
        );
        assert_eq!(cmd.program, PathBuf::from("ar"));
        assert_eq!(cmd.args, vec!["rcs", "app.a", "a.o"]);
    }

    #[test]
    fn test_missing_dsymutil_is_not_fatal() {
        let compiler = DarwinCompiler {
            dsymutil: PathBuf::from("qb-test-no-such-dsymutil"),
            ..DarwinCompiler::new()
        };
        compiler.bundle_debug_symbols(Path::new("app"), false);
    }
}
