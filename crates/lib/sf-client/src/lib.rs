//! Typed client for the Space Frontiers search API.
//!
//! Covers the two concerns every tool invocation needs before it can reach
//! upstream: selecting exactly one credential for the call ([`auth`]) and
//! issuing the HTTP request with timeouts and bounded retries ([`client`]).
//! Wire types shared by both sides live in [`types`].

pub mod auth;
pub mod client;
pub mod types;
