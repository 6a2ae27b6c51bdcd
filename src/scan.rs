//! Entry enumeration for classpath elements.
//!
//! Directories are walked recursively (skipping VCS metadata directories);
//! archives are read through a memory map. Both produce the same
//! [`ScanResult`]: raw class names (dot-separated, inner classes included)
//! and raw `/`-separated resource paths.

use ignore::{DirEntry, WalkBuilder};
use memmap2::Mmap;
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use zip::ZipArchive;

use crate::element::Source;
use crate::error::{IndexError, IndexResult};

const CLASS_EXTENSION: &str = "class";

/// Directory names never descended into, compared uppercased.
pub const IGNORED_LOCAL_DIRECTORIES: &[&str] = &[".GIT", ".SVN", ".HG", ".BZR"];

/// Marks nested and synthetic classes (`Outer$Inner`, `Outer$1`).
pub const INNER_CLASS_DELIMITER: char = '$';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    classes: Vec<String>,
    resources: Vec<String>,
}

impl ScanResult {
    pub fn new(classes: Vec<String>, resources: Vec<String>) -> Self {
        Self { classes, resources }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn resources(&self) -> &[String] {
        &self.resources
    }
}

impl Source<'_> {
    pub fn scan(&self) -> IndexResult<ScanResult> {
        match self {
            Source::Directory(root) => scan_directory(root),
            Source::Archive(path) => scan_archive(path),
        }
    }
}

pub fn is_inner_class(class_name: &str) -> bool {
    class_name.contains(INNER_CLASS_DELIMITER)
}

/// Strips a trailing `.class` from `file_name` when the remaining base name
/// is non-empty.
pub fn class_base_name(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(CLASS_EXTENSION)
        .and_then(|s| s.strip_suffix('.'))
        .filter(|base| !base.is_empty())
}

pub fn entry_to_class_name(entry_name: &str) -> Option<String> {
    let (dir, file) = match entry_name.rfind(['/', '\\']) {
        Some(idx) => (&entry_name[..idx], &entry_name[idx + 1..]),
        None => ("", entry_name),
    };
    let base = class_base_name(file)?;
    if dir.is_empty() {
        return Some(base.to_string());
    }
    Some(format!("{}.{base}", dir.replace(['/', '\\'], ".")))
}

fn is_ignored_directory(entry: &DirEntry) -> bool {
    entry.file_type().is_some_and(|t| t.is_dir())
        && IGNORED_LOCAL_DIRECTORIES
            .contains(&entry.file_name().to_string_lossy().to_uppercase().as_str())
}

/// A broken symlink below the root surfaces as `NotFound`; link loops and
/// errors on the root itself do not.
fn is_dangling_entry(err: &ignore::Error) -> bool {
    !matches!(err.depth(), Some(0))
        && err
            .io_error()
            .is_some_and(|e| e.kind() == std::io::ErrorKind::NotFound)
}

pub fn scan_directory(root: &Path) -> IndexResult<ScanResult> {
    log::debug!("scanning directory {}", root.display());

    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(true)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| !is_ignored_directory(entry))
        .build();

    let mut classes = Vec::new();
    let mut resources = Vec::new();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if is_dangling_entry(&err) => {
                log::debug!("skipping unreadable entry under {}: {err}", root.display());
                continue;
            }
            Err(source) => {
                return Err(IndexError::Walk {
                    path: root.to_path_buf(),
                    source,
                });
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let package: Vec<String> = relative
            .parent()
            .into_iter()
            .flat_map(|p| p.components())
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();
        let file_name = entry.file_name().to_string_lossy();

        match class_base_name(&file_name) {
            Some(base) if package.is_empty() => classes.push(base.to_string()),
            Some(base) => classes.push(format!("{}.{base}", package.join("."))),
            None if package.is_empty() => resources.push(file_name.to_string()),
            None => resources.push(format!("{}/{file_name}", package.join("/"))),
        }
    }

    Ok(ScanResult::new(classes, resources))
}

pub fn scan_archive(path: &Path) -> IndexResult<ScanResult> {
    log::debug!("scanning archive {}", path.display());

    let file = File::open(path).map_err(|e| IndexError::io(path, e))?;
    // SAFETY: The file is opened read-only and outlives the map; both are
    // dropped when this function returns, on success or error.
    let mmap = unsafe { Mmap::map(&file) }.map_err(|e| IndexError::io(path, e))?;
    let mut archive =
        ZipArchive::new(Cursor::new(&mmap[..])).map_err(|e| IndexError::archive(path, e))?;

    let mut classes = Vec::new();
    let mut resources = Vec::new();
    for i in 0..archive.len() {
        // Raw access reads only headers, so entries with compression methods
        // or encryption this build can't decode are still listed.
        let entry = archive
            .by_index_raw(i)
            .map_err(|e| IndexError::archive(path, e))?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name();
        match entry_to_class_name(name) {
            Some(class_name) => classes.push(class_name),
            None => resources.push(name.replace('\\', "/")),
        }
    }

    Ok(ScanResult::new(classes, resources))
}
