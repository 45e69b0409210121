//! EchoCache — a caching proxy for expensive LLM completions.
//!
//! Fronts a generative completion API with a TTL'd response cache so that
//! repeated identical questions are answered from storage instead of
//! re-invoking the origin. The per-request decision flow lives in
//! [`orchestrator::QueryOrchestrator`]; lookup policy is pluggable via
//! [`strategy::CacheStrategy`], storage via [`store::CacheStore`], and cache
//! lifetime via [`ttl::TtlPolicy`].

pub mod config;
pub mod error;
pub mod gateway;
pub mod orchestrator;
pub mod origin;
pub mod server;
pub mod store;
pub mod strategy;
pub mod ttl;

pub use error::{EchoError, Result};
