//! Input file references, output specifications and their expansion into
//! concrete paths.
//!
//! A [`FileReference`] names input data either explicitly or as a directory
//! plus pattern; an [`OutputSpec`] does the same for destinations, where the
//! pattern is a `{placeholder}` template applied to each input file name.

pub mod naming;
pub mod pattern;

pub use naming::{generate_output_filename, NamingError};
pub use pattern::{FilePattern, PatternError};

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Pointer to one or more input files
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileReference {
    Explicit(PathBuf),
    Pattern {
        dir: Option<PathBuf>,
        pattern: String,
    },
}

/// Destination for generated output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputSpec {
    Explicit(PathBuf),
    Pattern {
        dir: Option<PathBuf>,
        pattern: String,
    },
}

/// Failure turning a reference into concrete paths
#[derive(Debug, thiserror::Error)]
pub enum FileSetError {
    #[error("input directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),
    #[error("failed to list {}", .dir.display())]
    Listing {
        dir: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error(transparent)]
    Naming(#[from] NamingError),
}

impl FileReference {
    /// The `(filename, dir, pattern)` triple of the reference
    pub fn as_triple(&self) -> (Option<&Path>, Option<&Path>, Option<&str>) {
        match self {
            FileReference::Explicit(file) => (Some(file.as_path()), None, None),
            FileReference::Pattern { dir, pattern } => {
                (None, dir.as_deref(), Some(pattern.as_str()))
            }
        }
    }

    /// Compiled pattern, for the pattern form
    pub fn file_pattern(&self) -> Result<Option<FilePattern>, PatternError> {
        match self {
            FileReference::Explicit(_) => Ok(None),
            FileReference::Pattern { pattern, .. } => FilePattern::parse(pattern).map(Some),
        }
    }

    /// Concrete files, sorted by name.
    ///
    /// The explicit form yields its file unchecked. The pattern form lists
    /// `dir` (the working directory when absent) without recursing.
    pub fn expand(&self) -> Result<Vec<PathBuf>, FileSetError> {
        match self {
            FileReference::Explicit(file) => Ok(vec![file.clone()]),
            FileReference::Pattern { dir, pattern } => {
                let dir = dir.clone().unwrap_or_else(|| PathBuf::from("."));
                let matcher = FilePattern::parse(pattern)?;
                let files = list_matching(&dir, &matcher)?;
                if files.is_empty() {
                    warn!("No files in {} match '{}'", dir.display(), pattern);
                } else {
                    debug!("{} file(s) in {} match '{}'", files.len(), dir.display(), pattern);
                }
                Ok(files)
            }
        }
    }
}

impl OutputSpec {
    /// The `(filename, dir, pattern)` triple of the spec
    pub fn as_triple(&self) -> (Option<&Path>, Option<&Path>, Option<&str>) {
        match self {
            OutputSpec::Explicit(file) => (Some(file.as_path()), None, None),
            OutputSpec::Pattern { dir, pattern } => (None, dir.as_deref(), Some(pattern.as_str())),
        }
    }

    /// Destination for the output derived from `input`
    pub fn destination_for(
        &self,
        input: &Path,
        input_pattern: Option<&FilePattern>,
    ) -> Result<PathBuf, NamingError> {
        match self {
            OutputSpec::Explicit(file) => Ok(file.clone()),
            OutputSpec::Pattern { dir, pattern } => {
                let input_name = input
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                let name = generate_output_filename(&input_name, input_pattern, pattern)?;
                Ok(match dir {
                    Some(dir) => dir.join(name),
                    None => PathBuf::from(name),
                })
            }
        }
    }

    /// Directory the output lands in, when one is named
    pub fn directory(&self) -> Option<PathBuf> {
        match self {
            OutputSpec::Explicit(file) => file
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf),
            OutputSpec::Pattern { dir, .. } => dir.clone(),
        }
    }
}

/// Files directly inside `dir` whose name matches `pattern`, sorted
pub fn list_matching(dir: &Path, pattern: &FilePattern) -> Result<Vec<PathBuf>, FileSetError> {
    if !dir.is_dir() {
        return Err(FileSetError::MissingDirectory(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| FileSetError::Listing {
            dir: dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if pattern.is_match(&entry.file_name().to_string_lossy()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}
