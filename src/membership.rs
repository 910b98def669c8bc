//! The set of article titles a record must name to be kept.
//!
//! Titles are raw bytes: page-view dumps carry percent-encoded titles but
//! nothing guarantees they are valid UTF-8.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::error::FilterError;

/// Field separators: ASCII space, `\t`, `\n`, `\x0b`, `\x0c` and `\r`.
pub(crate) fn is_separator(b: &u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\x0b' | b'\x0c' | b'\r')
}

/// Strip leading and trailing separators.
pub(crate) fn trim_separators(mut bytes: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = bytes {
        if !is_separator(first) {
            break;
        }
        bytes = rest;
    }
    while let [rest @ .., last] = bytes {
        if !is_separator(last) {
            break;
        }
        bytes = rest;
    }
    bytes
}

/// Immutable set of accepted article titles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipSet {
    titles: HashSet<Vec<u8>>,
}

impl MembershipSet {
    /// Load titles from a file, one per line.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::ReadArticles`] if the file cannot be opened or read.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FilterError> {
        let path = path.as_ref();
        let read_error = |source| FilterError::ReadArticles {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(read_error)?;
        let set = Self::from_reader(BufReader::new(file)).map_err(read_error)?;

        if set.is_empty() {
            tracing::warn!(path = %path.display(), "article list is empty; no record will match");
        } else {
            tracing::debug!(path = %path.display(), titles = set.len(), "loaded article list");
        }
        Ok(set)
    }

    /// Read titles from any buffered reader. Lines are trimmed and blank
    /// lines are dropped.
    pub fn from_reader<R: BufRead>(reader: R) -> io::Result<Self> {
        let mut titles = HashSet::new();
        for line in reader.split(b'\n') {
            let line = line?;
            let title = trim_separators(&line);
            if !title.is_empty() {
                titles.insert(title.to_vec());
            }
        }
        Ok(Self { titles })
    }

    pub fn contains(&self, title: impl AsRef<[u8]>) -> bool {
        self.titles.contains(title.as_ref())
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

impl<S: Into<Vec<u8>>> FromIterator<S> for MembershipSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            titles: iter.into_iter().map(Into::into).collect(),
        }
    }
}
