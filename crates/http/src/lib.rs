//! Porpagar HTTP module providing the typed backend client
//!
//! The wire types in [`types`] are always available; the [`client`] module
//! is gated behind the `client` feature so that crates which only need the
//! request/response shapes do not pull in `reqwest`.

pub mod types;

#[cfg(feature = "client")]
pub mod client;

#[cfg(feature = "client")]
pub use client::{AuthenticatedClient, PublicClient, TypedClientBuilder, error::ClientError};
