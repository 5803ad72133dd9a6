//! AI search concierge for the Adalcci Interior website.
//!
//! Visitors get a few free searches a day, tracked by [`quota::QuotaTracker`]
//! against a small [`store::KeyValueStore`]. Queries go through
//! [`relay::Relay`] to a single upstream chat-completion [`provider::Provider`],
//! chosen once at startup. [`concierge::Concierge`] runs the client-side flow;
//! [`server`] exposes the relay over HTTP.

pub mod concierge;
pub mod config;
pub mod consts;
pub mod history;
pub mod logging;
pub mod provider;
pub mod quota;
pub mod relay;
pub mod server;
pub mod store;
