//! `qb clean`: remove every artifact a build of this project could produce.

use crate::compiler::{Compiler, with_suffix};
use crate::ui;
use std::path::Path;

/// Remove the artifacts for `output_base`. Returns how many existed.
pub fn clean(compiler: &dyn Compiler, output_base: &Path) -> usize {
    let platform = compiler.platform();
    let present = platform
        .clean_file_suffixes()
        .iter()
        .chain(platform.clean_dir_suffixes())
        .filter(|suffix| with_suffix(output_base, suffix).exists())
        .count();

    compiler.clean(output_base);

    if present > 0 {
        ui::success(format!("Removed {} artifact(s) for {}", present, output_base.display()));
    } else {
        ui::warn("Nothing to clean");
    }
    present
}
