use crate::compiler::{Compiler, CompilerOptions, LinkType, with_suffix};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Everything one build invocation needs, shared read-only by the phases.
///
/// The error counter is the only field mutated after construction.
pub struct BuildState {
    pub name: String,
    pub link_type: LinkType,
    pub source_files: Vec<PathBuf>,
    /// Root of the mirrored per-file object tree.
    pub object_dir: PathBuf,
    pub out_dir: PathBuf,
    pub compiler: Box<dyn Compiler>,
    pub options: CompilerOptions,
    errors: AtomicUsize,
    // Removes the object tree on drop when qb created it.
    _object_guard: Option<TempDir>,
}

impl BuildState {
    pub fn new(
        name: String,
        link_type: LinkType,
        source_files: Vec<PathBuf>,
        out_dir: PathBuf,
        compiler: Box<dyn Compiler>,
        options: CompilerOptions,
    ) -> std::io::Result<Self> {
        let guard = tempfile::Builder::new().prefix("qb_").tempdir()?;
        let mut state = Self::with_object_dir(
            name,
            link_type,
            source_files,
            guard.path().to_path_buf(),
            out_dir,
            compiler,
            options,
        );
        state._object_guard = Some(guard);
        Ok(state)
    }

    /// Use an existing object root that the caller owns.
    pub fn with_object_dir(
        name: String,
        link_type: LinkType,
        source_files: Vec<PathBuf>,
        object_dir: PathBuf,
        out_dir: PathBuf,
        compiler: Box<dyn Compiler>,
        options: CompilerOptions,
    ) -> Self {
        BuildState {
            name,
            link_type,
            source_files,
            object_dir,
            out_dir,
            compiler,
            options,
            errors: AtomicUsize::new(0),
            _object_guard: None,
        }
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }

    pub fn error_count(&self) -> usize {
        self.errors.load(Ordering::SeqCst)
    }

    /// Output path without the platform suffix.
    pub fn output_base(&self) -> PathBuf {
        self.out_dir.join(&self.name)
    }

    /// Path `link` will produce for this state's link type.
    pub fn artifact_path(&self) -> PathBuf {
        with_suffix(
            &self.output_base(),
            self.link_type.output_suffix(self.compiler.platform()),
        )
    }
}
