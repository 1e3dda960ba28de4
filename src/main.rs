//! # qb CLI Entry Point
//!
//! `qb [FLAGS] [clean | run [ARGS...]]`
//!
//! Loads `qb.toml`, binds it under the command-line flags, locates the
//! toolchain, then either cleans or builds (and optionally runs) the project
//! in the working directory.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::{Path, PathBuf};

use qb::build::{self, BuildError, BuildState, FeedbackAnalyzer};
use qb::compiler::{CStandard, CppStandard, Exceptions, LinkType, Optimization};
use qb::config::{self, BuildSettings, CONFIG_FILE, CliOverrides};
use qb::deps::{self, conan};
use qb::toolchain;
use qb::ui;

#[cfg(windows)]
#[link(name = "kernel32")]
unsafe extern "system" {
    fn SetConsoleOutputCP(wCodePageID: u32) -> i32;
}

#[cfg(windows)]
fn enable_windows_utf8_console() {
    unsafe {
        SetConsoleOutputCP(65001);
    }
}

#[cfg(not(windows))]
fn enable_windows_utf8_console() {}

#[derive(Parser)]
#[command(name = "qb")]
#[command(about = "Quick native build orchestrator for C/C++", version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
struct Cli {
    /// Binary output name without the extension [default: directory name]
    #[arg(long)]
    name: Option<String>,
    /// Output directory [default: .]
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output type: exe, dll or lib [default: exe]
    #[arg(long = "type", value_name = "TYPE")]
    link_type: Option<LinkType>,
    /// Link statically to create a standalone binary
    #[arg(long = "static")]
    static_link: bool,
    /// Build with debug information
    #[arg(long)]
    debug: bool,
    /// Print every toolchain command
    #[arg(long)]
    verbose: bool,
    /// Treat warnings as errors
    #[arg(long)]
    strict: bool,
    /// Exception handling: std, all or min [default: std]
    #[arg(long)]
    exceptions: Option<Exceptions>,
    /// Optimization: default, none, size or speed [default: default]
    #[arg(long)]
    optimize: Option<Optimization>,
    /// C++ standard: latest, 20, 17 or 14 [default: latest]
    #[arg(long)]
    cppstd: Option<CppStandard>,
    /// C standard: latest, 17 or 11 [default: latest]
    #[arg(long)]
    cstd: Option<CStandard>,
    /// Additional include directory (repeatable)
    #[arg(long, value_name = "DIR")]
    include: Vec<String>,
    /// Preprocessor define (repeatable)
    #[arg(long, value_name = "NAME[=VALUE]")]
    define: Vec<String>,
    /// Package to resolve from qb.toml or pkg-config (repeatable)
    #[arg(long, value_name = "NAME")]
    pkg: Vec<String>,
    /// `clean`, or `run` followed by arguments for the built program
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    command: Vec<String>,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            name: self.name.clone(),
            out: self.out.clone(),
            link_type: self.link_type,
            static_link: self.static_link,
            debug: self.debug,
            verbose: self.verbose,
            strict: self.strict,
            exceptions: self.exceptions,
            optimize: self.optimize,
            cpp_standard: self.cppstd,
            c_standard: self.cstd,
            include: self.include.clone(),
            define: self.define.clone(),
            pkg: self.pkg.clone(),
        }
    }
}

#[derive(Debug, PartialEq)]
enum Action {
    Build,
    Clean,
    Run(Vec<String>),
}

fn parse_action(command: &[String]) -> Result<Action> {
    match command.split_first() {
        None => Ok(Action::Build),
        Some((first, rest)) => match first.as_str() {
            "run" => Ok(Action::Run(rest.to_vec())),
            "clean" if rest.is_empty() => Ok(Action::Clean),
            "clean" => bail!("unexpected arguments after 'clean': {}", rest.join(" ")),
            other => bail!("unknown command '{}' (expected 'clean' or 'run')", other),
        },
    }
}

fn load_settings(cli: &Cli, default_name: &str) -> Result<BuildSettings> {
    let file = match config::load_config(Path::new(CONFIG_FILE)) {
        Ok(Some(file)) => {
            ui::info(format!("Using build configuration file {}", CONFIG_FILE));
            Some(file)
        }
        Ok(None) => None,
        Err(e) => {
            ui::warn(e);
            None
        }
    };

    let overrides = cli.overrides();
    match BuildSettings::resolve(&overrides, file.as_ref(), default_name) {
        Ok(settings) => Ok(settings),
        Err(e) => {
            ui::warn(format!("Ignoring {}: {}", CONFIG_FILE, e));
            BuildSettings::resolve(&overrides, None, default_name).map_err(Into::into)
        }
    }
}

fn report_failure(err: &BuildError) {
    match err {
        BuildError::NoSources => ui::warn("No source files found!"),
        BuildError::Compilation { failed } => {
            ui::error(format!("Compilation failed! ({} files)", failed))
        }
        BuildError::Link(e) => {
            ui::error(format!("Link failed: {}", e));
            if let Some(hint) = FeedbackAnalyzer::analyze(&e.to_string()) {
                eprintln!("{}", hint);
            }
        }
        BuildError::Pool(_) => ui::error(err),
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let action = parse_action(&cli.command)?;

    let cwd = std::env::current_dir().context("Unable to read the working directory")?;
    let default_name = cwd
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "a".to_string());

    let settings = load_settings(&cli, &default_name)?;
    ui::set_verbose(settings.options.verbose);

    let compiler = toolchain::locate().context("Unable to get compiler")?;

    if action == Action::Clean {
        build::clean(compiler.as_ref(), &settings.output_base());
        return Ok(0);
    }

    conan::maybe_install(&cwd, settings.options.debug);
    let options = deps::aggregate(&settings, &cwd, compiler.platform());
    let sources =
        build::find_source_files(Path::new(".")).context("Unable to read directory")?;

    let state = BuildState::new(
        settings.name.clone(),
        settings.link_type,
        sources,
        settings.out_dir.clone(),
        compiler,
        options,
    )
    .context("Unable to create the object directory")?;

    let report = match build::build_project(&state) {
        Ok(report) => report,
        Err(e) => {
            report_failure(&e);
            return Ok(1);
        }
    };

    ui::success(report.artifact.display());
    ui::info(format!(
        "compile {:.2?}, link {:.2?}",
        report.compile_time, report.link_time
    ));

    if let Action::Run(args) = action {
        let code = build::run_artifact(&report.artifact, state.link_type, &args)
            .with_context(|| format!("Unable to run {}", report.artifact.display()))?;
        return Ok(code.unwrap_or(0));
    }

    Ok(0)
}

fn main() {
    enable_windows_utf8_console();

    let code = match run() {
        Ok(code) => code,
        Err(e) => {
            ui::error(format!("{:#}", e));
            1
        }
    };
    std::process::exit(code);
}
