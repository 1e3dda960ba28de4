//! Parallel compilation.
//!
//! Every source file becomes one [`CompilerWorkerTask`] spawned into a rayon
//! pool sized `min(files, cpus)`. Tasks are queued FIFO, so files start in
//! the order they were offered. The pool's scope only returns once every
//! spawned task has finished, so the error count is final when it is read.

use super::BuildError;
use super::feedback::FeedbackAnalyzer;
use super::sources::colliding_stems;
use super::state::BuildState;
use crate::ui;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// One unit of work: compile `source` into `object_dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerWorkerTask {
    pub source: PathBuf,
    pub object_dir: PathBuf,
}

pub fn worker_count(files: usize) -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    files.min(cpus).max(1)
}

/// The source's directory mirrored under `object_root`. Only normal path
/// components are kept, so `..` or absolute prefixes cannot escape it.
pub fn object_subdir(object_root: &Path, source: &Path) -> PathBuf {
    let mut dir = object_root.to_path_buf();
    if let Some(parent) = source.parent() {
        for component in parent.components() {
            if let Component::Normal(part) = component {
                dir.push(part);
            }
        }
    }
    dir
}

fn progress_bar(len: usize, verbose: bool) -> ProgressBar {
    if verbose || len < 2 {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
        .map(|s| s.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

fn display_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}

fn run_task(state: &BuildState, task: &CompilerWorkerTask, progress: &ProgressBar) {
    let file = display_path(&task.source);
    progress.set_message(file.clone());
    progress.suspend(|| ui::info(&file));

    if let Err(e) = state
        .compiler
        .compile(&task.source, &task.object_dir, &state.options)
    {
        state.record_error();
        let text = e.to_string();
        progress.suspend(|| {
            ui::error(format!("Failed to compile {}!\n{}", file, text));
            if let Some(hint) = FeedbackAnalyzer::analyze(&text) {
                eprintln!("{}", hint);
            }
        });
    }

    progress.inc(1);
}

/// Compile every source file. Individual failures are counted and logged
/// but never stop the remaining files.
pub fn perform_compilation(state: &BuildState) -> Result<(), BuildError> {
    perform_compilation_with(state, worker_count(state.source_files.len()))
}

/// [`perform_compilation`] on exactly `workers` threads.
pub fn perform_compilation_with(state: &BuildState, workers: usize) -> Result<(), BuildError> {
    let total = state.source_files.len();
    if total == 0 {
        return Err(BuildError::NoSources);
    }

    for group in colliding_stems(&state.source_files) {
        let names: Vec<String> = group.iter().map(|f| display_path(f)).collect();
        ui::warn(format!(
            "{} share one object file name, only one of them will be linked",
            names.join(", ")
        ));
    }

    let workers = workers.max(1);
    ui::trace(format!("Compiling {} files on {} workers", total, workers));

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("qb-compile-{}", i))
        .build()?;

    let progress = progress_bar(total, state.options.verbose);

    pool.scope_fifo(|scope| {
        for source in &state.source_files {
            let object_dir = object_subdir(&state.object_dir, source);
            if let Err(e) = fs::create_dir_all(&object_dir) {
                state.record_error();
                progress.suspend(|| {
                    ui::error(format!(
                        "Unable to create output directory {}: {}",
                        object_dir.display(),
                        e
                    ))
                });
                progress.inc(1);
                continue;
            }

            let task = CompilerWorkerTask {
                source: source.clone(),
                object_dir,
            };
            let progress = &progress;
            scope.spawn_fifo(move |_| run_task(state, &task, progress));
        }
    });

    progress.finish_and_clear();

    match state.error_count() {
        0 => Ok(()),
        failed => Err(BuildError::Compilation { failed }),
    }
}
