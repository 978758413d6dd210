//! Node wiring for the proof-of-stake lottery engine
//!
//! Binds the TCP listener, spawns the background aggregator and lottery
//! tasks and runs one session task per connected validator.

pub mod config;
pub mod server;
pub mod session;

pub use config::NodeConfig;
pub use server::Node;
