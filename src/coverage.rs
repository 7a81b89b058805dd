//! Optional coverage-based filtering of candidate mutants.
//!
//! Mutants at lines the suite never executes cannot be detected; they are
//! split into an excluded bucket and reported separately instead of being
//! run and miscounted as SURVIVED.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::error::{MutationError, Result};
use crate::mutants::MutantDescriptor;

/// Set of (file, line) pairs the test suite is known to exercise.
#[derive(Debug, Default, Clone)]
pub struct CoverageMap {
    lines: HashSet<(PathBuf, usize)>,
}

impl CoverageMap {
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (PathBuf, usize)>,
    {
        CoverageMap {
            lines: pairs.into_iter().collect(),
        }
    }

    /// Load from a JSON object mapping file path to covered line numbers,
    /// e.g. `{"src/app.py": [1, 2, 6]}`.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| MutationError::Io {
            file: path.to_path_buf(),
            context: "failed to read coverage map",
            source: e,
        })?;
        let raw: HashMap<PathBuf, Vec<usize>> =
            serde_json::from_str(&data).map_err(|e| MutationError::Parse {
                file: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(Self::from_pairs(raw.into_iter().flat_map(|(file, lines)| {
            lines.into_iter().map(move |line| (file.clone(), line))
        })))
    }

    pub fn is_covered(&self, file: &Path, line: usize) -> bool {
        self.lines.contains(&(file.to_path_buf(), line))
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Split descriptors into (runnable, excluded-by-coverage), preserving
    /// order within each half.
    pub fn partition(
        &self,
        mutants: Vec<MutantDescriptor>,
    ) -> (Vec<MutantDescriptor>, Vec<MutantDescriptor>) {
        mutants
            .into_iter()
            .partition(|m| self.is_covered(&m.source_file, m.location.line))
    }
}
