pub mod auth;
pub mod broker;
pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod env;
pub mod error;
pub mod logging;
pub mod output;
pub mod version_gate;

#[cfg(test)]
pub(crate) mod testing;
