use std::{
    collections::BTreeSet,
    ffi::OsStr,
    future::Future,
    io,
    path::{Path, PathBuf},
};

use log::debug;

use crate::{
    error::{Error, Result},
    signature,
};

/// The class and method enclosing a source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePosition {
    /// Dotted class name, e.g. `com.example.Main`.
    pub class_name: String,
    pub method_name: String,
}

impl SourcePosition {
    pub fn new(class_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: method_name.into(),
        }
    }
}

/// Maps a line of a source file to the class and method it belongs to.
///
/// This needs a parser for the source language, which lives outside of this
/// crate.
pub trait PositionLookup {
    /// `Ok(None)` if the line is not inside any method.
    fn position_at_line(
        &self,
        file: &Path,
        line: u32,
    ) -> impl Future<Output = io::Result<Option<SourcePosition>>> + Send;
}

/// The set of source files known to the session, used to turn the short file
/// names the VM reports into absolute paths.
#[derive(Debug, Clone, Default)]
pub struct SourceIndex {
    files: BTreeSet<PathBuf>,
}

impl SourceIndex {
    pub fn from_paths<I>(paths: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<PathBuf>,
    {
        Self {
            files: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Collects every file with the given extension under the roots.
    ///
    /// Unreadable directory entries are skipped.
    pub fn scan<P: AsRef<Path>>(roots: &[P], extension: &str) -> Self {
        let mut files = BTreeSet::new();
        for root in roots {
            for entry in walkdir::WalkDir::new(root)
                .follow_links(false)
                .into_iter()
                .filter_map(|entry| entry.ok())
            {
                if !entry.file_type().is_file() {
                    continue;
                }
                if entry.path().extension() != Some(OsStr::new(extension)) {
                    continue;
                }
                files.insert(entry.into_path());
            }
        }
        debug!("indexed {} source files", files.len());
        Self { files }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(PathBuf::as_path)
    }

    /// Finds the file a class was compiled from.
    ///
    /// The package of `class_signature` gives the directory and
    /// `short_name` is the file name the VM reported for the class. Returns
    /// `Ok(None)` when no known file ends with that relative path, and
    /// [Error::AmbiguousPath] when more than one does.
    pub fn resolve(&self, class_signature: &str, short_name: &str) -> Result<Option<PathBuf>> {
        let relative = Path::new(signature::package_path(class_signature)?).join(short_name);

        let mut candidates = self.files.iter().filter(|file| file.ends_with(&relative));
        let Some(found) = candidates.next() else {
            return Ok(None);
        };
        let rest: Vec<_> = candidates.cloned().collect();
        if !rest.is_empty() {
            let mut all = vec![found.clone()];
            all.extend(rest);
            return Err(Error::AmbiguousPath {
                relative,
                candidates: all,
            });
        }
        Ok(Some(found.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> SourceIndex {
        SourceIndex::from_paths([
            "/home/me/project/src/com/example/Main.java",
            "/home/me/project/src/com/example/util/Strings.java",
            "/home/me/project/src/Main.java",
        ])
    }

    #[test]
    fn resolves_through_the_package() {
        let found = index().resolve("Lcom/example/Main;", "Main.java").unwrap();
        assert_eq!(found, Some(PathBuf::from("/home/me/project/src/com/example/Main.java")));
    }

    #[test]
    fn default_package() {
        // com/example/Main.java also ends with Main.java
        let err = index().resolve("LMain;", "Main.java").unwrap_err();
        assert!(matches!(err, Error::AmbiguousPath { candidates, .. } if candidates.len() == 2));
    }

    #[test]
    fn unknown_file() {
        let found = index().resolve("Lcom/example/Other;", "Other.java").unwrap();
        assert_eq!(found, None);
    }

    #[test]
    fn matches_whole_components_only() {
        let index = SourceIndex::from_paths(["/src/com/example/XMain.java"]);
        assert_eq!(index.resolve("Lcom/example/Main;", "Main.java").unwrap(), None);
    }
}
