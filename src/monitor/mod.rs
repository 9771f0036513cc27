//! Alert detection and backlog reconciliation.
//!
//! Two loops share one [`Backlog`]: the [`Detector`] samples the pipeline and
//! admits stale documents, the [`Resolver`] rechecks admitted documents and
//! announces the ones that reached a terminal status.

pub mod backlog;
mod config;
pub mod detector;
pub mod resolver;
pub mod shutdown;
pub mod staleness;
pub mod supervisor;


pub use backlog::Backlog;
pub use config::{DetectorSettings, ResolverSettings, SummaryPolicy};
pub use detector::{Detector, DetectorReport};
pub use resolver::{Resolver, ResolverReport};
pub use shutdown::ShutdownSignal;
pub use staleness::{filter_stale, is_stale};
pub use supervisor::run_loops;
