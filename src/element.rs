use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{IndexError, IndexResult};

/// A classpath entry, identified by its canonical path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Element {
    path: PathBuf,
}

impl Element {
    pub fn resolve(path: impl AsRef<Path>) -> IndexResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(IndexError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let canonical = path
            .canonicalize()
            .map_err(|e| IndexError::io(path, e))?;
        Ok(Self { path: canonical })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn display_name(&self) -> String {
        self.path.to_string_lossy().to_string()
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl AsRef<Path> for Element {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// How an element's entries are enumerated. Picked once per `add`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source<'a> {
    Directory(&'a Path),
    Archive(&'a Path),
}

impl<'a> Source<'a> {
    pub fn detect(element: &'a Element) -> IndexResult<Self> {
        let meta = std::fs::metadata(element.path()).map_err(|e| IndexError::io(element.path(), e))?;
        if meta.is_dir() {
            Ok(Source::Directory(element.path()))
        } else {
            Ok(Source::Archive(element.path()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_missing_path_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.jar");
        let err = Element::resolve(&missing).unwrap_err();
        assert!(matches!(err, IndexError::NotFound { path } if path == missing));
    }

    #[test]
    fn resolve_canonicalizes_relative_segments() {
        let dir = tempfile::tempdir().unwrap();
        let classes = dir.path().join("classes");
        std::fs::create_dir_all(&classes).unwrap();

        let a = Element::resolve(&classes).unwrap();
        let b = Element::resolve(classes.join("..").join("classes")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn detect_picks_directory_or_archive() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("lib.jar");
        std::fs::write(&jar, b"").unwrap();

        let dir_element = Element::resolve(dir.path()).unwrap();
        let jar_element = Element::resolve(&jar).unwrap();
        assert!(matches!(Source::detect(&dir_element).unwrap(), Source::Directory(_)));
        assert!(matches!(Source::detect(&jar_element).unwrap(), Source::Archive(_)));
    }
}
