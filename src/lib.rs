pub mod commands;
pub mod config;
pub mod logging;
pub mod models;
pub mod monitor;
pub mod notify;
pub mod source;
