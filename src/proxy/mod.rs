//! Extends an upstream GraphQL server with locally defined fields.
//!
//! A request goes through the [`Gateway`]: the query is reduced to what the upstream server
//! knows ([`rewrite`]), forwarded once through an [`UpstreamClient`], and the upstream
//! response is turned into a root value tree ([`reconcile`]) that the local executor
//! completes with synthesized values.

pub mod client;
pub mod gateway;
pub mod reconcile;
pub mod rewrite;

pub use client::{HttpUpstream, UpstreamClient, UpstreamRequest};
pub use gateway::{Gateway, Stage};
pub use reconcile::{reconcile, Reconciled, UpstreamResponse};
pub use rewrite::{rewrite, Rewritten};

#[cfg(test)]
mod gateway_test;
