//! Streaming article filter.
//!
//! Reads `<id> <project> <article> ...` records line by line and keeps the
//! ones whose project equals the configured project and whose article is in
//! the [`MembershipSet`]. Kept lines are written trimmed, in input order.
//!
//! Lines are handled as bytes and split on ASCII whitespace only, so titles
//! that are not UTF-8, or that contain Unicode spaces, pass through intact.

use std::io::{self, BufRead, Write};

use crate::config::FilterConfig;
use crate::error::FilterError;
use crate::membership::{is_separator, trim_separators, MembershipSet};

/// Borrowed view of the first three fields of an input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    pub id: &'a [u8],
    pub project: &'a [u8],
    pub article: &'a [u8],
}

impl<'a> Record<'a> {
    /// Split on ASCII whitespace. `None` when fewer than three fields exist.
    pub fn parse(line: &'a [u8]) -> Option<Self> {
        let mut fields = line.split(is_separator).filter(|field| !field.is_empty());
        Some(Self {
            id: fields.next()?,
            project: fields.next()?,
            article: fields.next()?,
        })
    }
}

/// Why a line was not emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Fewer than three fields.
    Malformed,
    /// Second field is not the configured project.
    ProjectMismatch,
    /// Third field is not in the membership set.
    UnknownArticle,
}

/// Verdict for a single input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome<'a> {
    /// Write this (trimmed) line.
    Emit(&'a [u8]),
    Skip(SkipReason),
}

/// Counters for one [`ArticleFilter::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub read: u64,
    pub emitted: u64,
    pub malformed: u64,
    pub project_mismatch: u64,
    pub unknown_article: u64,
}

impl FilterStats {
    fn record(&mut self, outcome: &LineOutcome<'_>) {
        self.read += 1;
        match outcome {
            LineOutcome::Emit(_) => self.emitted += 1,
            LineOutcome::Skip(SkipReason::Malformed) => self.malformed += 1,
            LineOutcome::Skip(SkipReason::ProjectMismatch) => self.project_mismatch += 1,
            LineOutcome::Skip(SkipReason::UnknownArticle) => self.unknown_article += 1,
        }
    }

    /// Lines read but not emitted.
    pub fn skipped(&self) -> u64 {
        self.read - self.emitted
    }
}

/// Keeps records for one project and a fixed set of articles.
#[derive(Debug, Clone)]
pub struct ArticleFilter {
    project: Vec<u8>,
    articles: MembershipSet,
}

impl ArticleFilter {
    pub fn new(project: impl Into<Vec<u8>>, articles: MembershipSet) -> Self {
        Self {
            project: project.into(),
            articles,
        }
    }

    /// Load the article list named by `config` and build a filter.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::ReadArticles`] if the article list cannot be read.
    pub fn from_config(config: &FilterConfig) -> Result<Self, FilterError> {
        let articles = MembershipSet::load(&config.articles_path)?;
        Ok(Self::new(config.project.as_str(), articles))
    }

    /// Decide whether `line` is emitted.
    pub fn classify<'a>(&self, line: &'a [u8]) -> LineOutcome<'a> {
        let line = trim_separators(line);
        let Some(record) = Record::parse(line) else {
            return LineOutcome::Skip(SkipReason::Malformed);
        };
        if record.project != self.project.as_slice() {
            return LineOutcome::Skip(SkipReason::ProjectMismatch);
        }
        if !self.articles.contains(record.article) {
            return LineOutcome::Skip(SkipReason::UnknownArticle);
        }
        LineOutcome::Emit(line)
    }

    /// Stream `reader` to `writer`, one line at a time.
    ///
    /// A broken pipe on `writer` ends the run early without error.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::Io`] on any other read or write failure.
    pub fn run<R: BufRead, W: Write>(
        &self,
        mut reader: R,
        mut writer: W,
    ) -> Result<FilterStats, FilterError> {
        let mut stats = FilterStats::default();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }

            let outcome = self.classify(&buf);
            stats.record(&outcome);

            if let LineOutcome::Emit(line) = outcome {
                match write_line(&mut writer, line) {
                    Ok(()) => {}
                    Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                        tracing::debug!("output closed; stopping early");
                        return Ok(stats);
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }

        match writer.flush() {
            Err(e) if e.kind() != io::ErrorKind::BrokenPipe => return Err(e.into()),
            _ => {}
        }

        tracing::debug!(
            read = stats.read,
            emitted = stats.emitted,
            malformed = stats.malformed,
            project_mismatch = stats.project_mismatch,
            unknown_article = stats.unknown_article,
            "article filter finished"
        );
        Ok(stats)
    }

    /// Lazily yield the lines `run` would write, without trailing newlines.
    pub fn matches<'s, R: BufRead + 's>(
        &'s self,
        reader: R,
    ) -> impl Iterator<Item = io::Result<Vec<u8>>> + 's {
        reader.split(b'\n').filter_map(move |raw| match raw {
            Ok(raw) => match self.classify(&raw) {
                LineOutcome::Emit(line) => Some(Ok(line.to_vec())),
                LineOutcome::Skip(_) => None,
            },
            Err(e) => Some(Err(e)),
        })
    }
}

fn write_line<W: Write>(writer: &mut W, line: &[u8]) -> io::Result<()> {
    writer.write_all(line)?;
    writer.write_all(b"\n")
}
