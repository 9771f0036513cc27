//! Pipeline query source.
//!
//! The loops only see these traits. A [`PipelineSource`] hands out one
//! [`SourceConnection`] per cycle; dropping the connection releases it, so a
//! cycle releases its connection on every exit path.

pub mod postgres;
pub mod query;

use anyhow::Result;

use crate::models::{Category, DocumentRecord, ResolvedDocument};

pub use postgres::PostgresSource;
pub use query::{BindValue, BuiltQuery, IdColumnType, QueryBuilder, ResolutionRule};

/// Something the loops can open a connection to.
pub trait PipelineSource: Send {
    fn connect(&self) -> Result<Box<dyn SourceConnection + '_>>;
}

/// A connection scoped to one cycle.
pub trait SourceConnection {
    /// Current rows of a category, unfiltered by staleness.
    fn fetch_category(&mut self, category: &Category) -> Result<Vec<DocumentRecord>>;

    /// The document's terminal status, if it has reached one that closes an alert.
    fn check_resolved(&mut self, identifier: &str) -> Result<Option<ResolvedDocument>>;
}
