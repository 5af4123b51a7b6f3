//! Device IAM client library.
//!
//! Lists users and roles on a remote device and attaches, detaches or deletes
//! them through an established connection.

#![deny(clippy::all)]

pub mod config;
pub mod error;
pub mod iam;
pub mod secure;
pub mod transport;
