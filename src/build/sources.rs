use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

const SOURCE_EXTENSIONS: &[&str] = &["c", "cpp"];

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// Every `.c`/`.cpp` file under `root`, relative to it and sorted.
/// Hidden directories are skipped. Any unreadable entry fails the walk.
pub fn find_source_files(root: &Path) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !(e.file_type().is_dir() && is_hidden(e)))
    {
        let entry = entry?;
        let is_source = entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext));
        if !is_source {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| entry.path().to_path_buf());
        files.push(relative);
    }

    files.sort();
    Ok(files)
}

/// Groups of sources in one directory that share a file stem and would
/// therefore compile to the same object file.
pub fn colliding_stems(files: &[PathBuf]) -> Vec<Vec<PathBuf>> {
    let mut groups: BTreeMap<(PathBuf, OsString), Vec<PathBuf>> = BTreeMap::new();
    for file in files {
        let Some(stem) = file.file_stem() else {
            continue;
        };
        let dir = file.parent().map(Path::to_path_buf).unwrap_or_default();
        groups
            .entry((dir, stem.to_os_string()))
            .or_default()
            .push(file.clone());
    }

    groups.into_values().filter(|g| g.len() > 1).collect()
}
