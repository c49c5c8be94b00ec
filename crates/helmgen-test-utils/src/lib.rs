#![deny(unsafe_code)]

//! Shared test utilities for the helmgen workspace.
//!
//! Provides fixture repositories, config builders, a mock chat-completion
//! server, and tracing helpers so that individual crate tests stay concise.
//!
//! Add this crate as a `[dev-dependency]` in any workspace member:
//!
//! ```toml
//! [dev-dependencies]
//! helmgen-test-utils = { workspace = true }
//! ```

pub mod config;
pub mod mock_server;
pub mod repo;
pub mod tracing_setup;

pub use config::TestConfigBuilder;
pub use mock_server::{MockChatServer, RecordedRequest};
pub use repo::FixtureRepo;
