//! Streaming Wikipedia page-view mapper and transactional SQLite session helpers.
//!
//! # Intention
//!
//! - Provide the `article-filter` streaming mapper: keep page-view records
//!   for one project and a fixed list of article titles.
//! - Provide a thin, scoped API over SQLite for the scripts that load the
//!   filtered counts.
//!
//! # Architectural Boundaries
//!
//! - The filter ([`filter`], [`membership`], [`config`]) and the database
//!   helper ([`sqlite`]) share no state and do not call each other.
//! - Configuration is passed in explicitly; only [`config`] reads the
//!   environment.

pub mod config;
pub mod error;
pub mod filter;
pub mod membership;
pub mod sqlite;

pub use config::FilterConfig;
pub use error::FilterError;
pub use filter::{ArticleFilter, FilterStats, LineOutcome, Record, SkipReason};
pub use membership::MembershipSet;
pub use sqlite::{with_session, ParamTuple, SqlQuery, SqliteConfig, SqliteSession, Value};
