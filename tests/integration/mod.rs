//! Integration tests for stalewatch
//!
//! These run the detector and resolver loops together against an in-memory
//! pipeline, and deliver alerts to a local HTTP endpoint.

pub mod helpers;
pub mod loops;
pub mod webhook;
