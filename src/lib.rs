/// Graylog mock server
///
/// Emulates the administrative REST API of a Graylog server (users, roles,
/// index sets, streams, stream rules and inputs) so client SDKs can be
/// tested without a real cluster.
pub mod api;
pub mod config;
pub mod context;
pub mod coordinator;
pub mod error;
pub mod persistence;
pub mod server;
pub mod stats;
pub mod store;
pub mod validation;

pub use context::AppContext;
