//! Chat surfaces for FactQuest.
//!
//! The browser surface is served by the gateway over WebSocket; this crate
//! holds the terminal surface.

pub mod cli;

pub use cli::CliChannel;
