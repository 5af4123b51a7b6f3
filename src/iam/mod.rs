//! Device IAM (Identity and Access Management) client.
//!
//! This module provides:
//! - Listing users and roles provisioned on a device
//! - Attaching and detaching roles, deleting users
//! - A confirmation gate in front of every mutating request
//! - Console reporting of each outcome

pub mod client;
pub mod connection;
pub mod decode;
pub mod models;
pub mod prompt;
pub mod report;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{ClientOptions, IamClient, UnmatchedStatus};
pub use connection::{Connection, Request};
pub use models::{IamRequest, IamResponse, Method, Mutation, OperationKind, Outcome, Resource};
pub use prompt::{AssumeYes, Confirm, TerminalPrompt};
pub use report::{ConsoleReporter, Reporter};
