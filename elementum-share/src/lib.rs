//! Moving snapshots in and out of the simulation.
//!
//! A snapshot is opaque bytes produced by the host. This crate keeps the
//! last good one, reads and writes `.elem` files, and talks to the share
//! endpoint. Uploads are single-flight.

pub mod client;
pub mod error;
pub mod files;
pub mod location;
pub mod transfer;

pub use client::{HttpShareClient, ShareBackend};
pub use error::ShareError;
pub use transfer::{LoadOutcome, StateTransfer};
