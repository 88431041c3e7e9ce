//! # Future Gateway Admin
//!
//! Command line front end over [`fg_client`] for portal administrators.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 fg-admin CLI                 │
//! ├──────────────────────────────────────────────┤
//! │     FileEndpointStore │ StaticTokenProvider  │
//! ├──────────────────────────────────────────────┤
//! │            fg_client::GatewayClient          │
//! └──────────────────────┬───────────────────────┘
//!                        │ HTTP (Bearer)
//! ┌──────────────────────▼───────────────────────┐
//! │           Future Gateway REST API            │
//! └──────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod config;
pub mod store;

pub use commands::{build_client, execute, AdminClient, Cli, Command};
pub use config::AdminConfig;
pub use store::FileEndpointStore;
