//! Filter configuration loaded with figment.
//!
//! Sources, lowest to highest priority:
//! 1. Built-in defaults (`articles_path = "tst.txt"`)
//! 2. The `WIKI_PROJ` environment variable, taken verbatim as `project`
//!
//! `WIKI_PROJ` is merged as a plain string rather than through
//! figment's `Env` provider, which would parse values like `123`,
//! `true` or `"en"` into numbers, booleans or unquoted strings.
//!
//! The binary may override `articles_path` afterwards from its CLI flags.

use std::env::{self, VarError};
use std::path::PathBuf;

use figment::{providers::Serialized, Figment};
use serde::{Deserialize, Serialize};

use crate::error::FilterError;

/// Environment variable naming the project a record must belong to.
pub const PROJECT_ENV_VAR: &str = "WIKI_PROJ";

/// Article list read from the working directory when nothing overrides it.
pub const DEFAULT_ARTICLES_PATH: &str = "tst.txt";

/// Shape extracted from the figment before required fields are checked.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct RawFilterConfig {
    articles_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    project: Option<String>,
}

impl Default for RawFilterConfig {
    fn default() -> Self {
        Self {
            articles_path: PathBuf::from(DEFAULT_ARTICLES_PATH),
            project: None,
        }
    }
}

/// Settings for one article filter run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FilterConfig {
    /// File holding the accepted article titles, one per line.
    pub articles_path: PathBuf,
    /// Project name a record's second field must equal. Already trimmed.
    pub project: String,
}

impl FilterConfig {
    /// Create a config from explicit values.
    pub fn new(articles_path: impl Into<PathBuf>, project: impl Into<String>) -> Self {
        let project: String = project.into();
        Self {
            articles_path: articles_path.into(),
            project: project
                .trim_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\x0b' | '\x0c' | '\r'))
                .to_string(),
        }
    }

    /// Load from defaults and the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::MissingEnvVar`] when `WIKI_PROJ` is unset,
    /// [`FilterError::InvalidEnvVar`] when it is not Unicode, or
    /// [`FilterError::Config`] when figment cannot extract the values.
    pub fn load() -> Result<Self, FilterError> {
        Self::from_figment(&Self::figment()?)
    }

    /// Build the figment provider chain.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidEnvVar`] when `WIKI_PROJ` is not Unicode.
    pub fn figment() -> Result<Figment, FilterError> {
        let figment = Figment::from(Serialized::defaults(RawFilterConfig::default()));
        match env::var(PROJECT_ENV_VAR) {
            Ok(project) => Ok(figment.merge(Serialized::default("project", project))),
            Err(VarError::NotPresent) => Ok(figment),
            Err(VarError::NotUnicode(_)) => Err(FilterError::InvalidEnvVar {
                name: PROJECT_ENV_VAR.to_string(),
            }),
        }
    }

    /// Extract a config from an arbitrary figment.
    ///
    /// # Errors
    ///
    /// Same as [`FilterConfig::load`].
    pub fn from_figment(figment: &Figment) -> Result<Self, FilterError> {
        let raw: RawFilterConfig = figment.extract()?;
        let project = raw.project.ok_or_else(|| FilterError::MissingEnvVar {
            name: PROJECT_ENV_VAR.to_string(),
        })?;

        let config = Self::new(raw.articles_path, project);
        if config.project.is_empty() {
            tracing::warn!("{PROJECT_ENV_VAR} is empty; no record will match");
        }
        Ok(config)
    }

    /// Replace the article list path.
    #[must_use]
    pub fn with_articles_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.articles_path = path.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn loads_project_from_env() {
        Jail::expect_with(|jail| {
            jail.set_env(PROJECT_ENV_VAR, "enwiki");
            let config = FilterConfig::load().expect("config loads");
            assert_eq!(config.project, "enwiki");
            assert_eq!(config.articles_path, PathBuf::from(DEFAULT_ARTICLES_PATH));
            Ok(())
        });
    }

    #[test]
    fn trims_project_value() {
        Jail::expect_with(|jail| {
            jail.set_env(PROJECT_ENV_VAR, "  frwiki  ");
            let config = FilterConfig::load().expect("config loads");
            assert_eq!(config.project, "frwiki");
            Ok(())
        });
    }

    #[test]
    fn project_keeps_unicode_spaces() {
        let config = FilterConfig::new(DEFAULT_ARTICLES_PATH, "\u{a0}en\x0b");
        assert_eq!(config.project, "\u{a0}en");
    }

    #[test]
    fn project_is_taken_as_a_literal_string() {
        for value in ["123", "true", "[en]", "\"en\"", "{a = 1}", "en.b"] {
            Jail::expect_with(|jail| {
                jail.set_env(PROJECT_ENV_VAR, value);
                let config = FilterConfig::load().expect("config loads");
                assert_eq!(config.project, value);
                Ok(())
            });
        }
    }

    #[test]
    fn missing_project_is_an_error() {
        Jail::expect_with(|_jail| {
            std::env::remove_var(PROJECT_ENV_VAR);
            let err = FilterConfig::load().unwrap_err();
            match err {
                FilterError::MissingEnvVar { name } => assert_eq!(name, PROJECT_ENV_VAR),
                other => panic!("unexpected error: {other}"),
            }
            Ok(())
        });
    }

    #[test]
    fn ignores_unrelated_env_vars() {
        Jail::expect_with(|jail| {
            jail.set_env(PROJECT_ENV_VAR, "de");
            jail.set_env("ARTICLES_PATH", "elsewhere.txt");
            let config = FilterConfig::load().expect("config loads");
            assert_eq!(config.articles_path, PathBuf::from(DEFAULT_ARTICLES_PATH));
            Ok(())
        });
    }

    #[test]
    fn with_articles_path_overrides_default() {
        let config = FilterConfig::new(DEFAULT_ARTICLES_PATH, "en").with_articles_path("list.txt");
        assert_eq!(config.articles_path, PathBuf::from("list.txt"));
    }
}
