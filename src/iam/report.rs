//! User-facing messages for IAM operation results.
//!
//! Presentation only: nothing here changes what an operation returns.

use std::io::{self, Write};

use super::models::{OperationKind, Resource};
use crate::error::IamError;

/// Advisory printed after every access-denied response.
pub const ACCESS_DENIED_ADVISORY: &str = "This is potentially due to insufficient privileges,\n\
     check the IAM policies file if you are the owner of this device.";

/// Hint printed when a role mutation returns 500.
pub const IDENTIFIER_HINT: &str = "Are you sure you typed in the right role id and user id?";

pub const CANCELLED: &str = "Action cancelled.";
pub const SUCCESS: &str = "Success.";

/// Sink for operation messages.
pub trait Reporter {
    /// Progress and result lines.
    fn info(&mut self, line: &str);

    /// Failures that carry no further detail for the operator.
    fn error(&mut self, line: &str);

    /// A listing response arrived; its payload is decoded next.
    fn listing_started(&mut self, resource: Resource) {
        self.info(listing_heading(resource));
    }

    /// Render the entries of a successfully decoded listing.
    fn listing(&mut self, resource: Resource, entries: &[String]) {
        numbered_listing(self, resource, entries);
    }
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn info(&mut self, line: &str) {
        (**self).info(line)
    }

    fn error(&mut self, line: &str) {
        (**self).error(line)
    }

    fn listing_started(&mut self, resource: Resource) {
        (**self).listing_started(resource)
    }

    fn listing(&mut self, resource: Resource, entries: &[String]) {
        (**self).listing(resource, entries)
    }
}

/// One numbered line per entry.
pub fn numbered_listing<R: Reporter + ?Sized>(
    reporter: &mut R,
    resource: Resource,
    entries: &[String],
) {
    for (idx, entry) in entries.iter().enumerate() {
        reporter.info(&listing_entry(resource, idx + 1, entry));
    }
}

pub fn listing_heading(resource: Resource) -> &'static str {
    match resource {
        Resource::Users => "Listing all users...",
        Resource::Roles => "Listing available roles...",
    }
}

/// One numbered listing line; `position` is 1-based.
pub fn listing_entry(resource: Resource, position: usize, entry: &str) -> String {
    match resource {
        Resource::Users => format!("[{}] UserID: {}", position, entry),
        Resource::Roles => format!("[{}]: {}", position, entry),
    }
}

fn denied_line(kind: OperationKind, path: &str) -> String {
    match kind {
        OperationKind::ListUsers => format!("The request to list users ({}) was denied.", path),
        OperationKind::ListRoles => format!("The request to list roles ({}) was denied.", path),
        OperationKind::AddRole => "The request was denied.".to_string(),
        OperationKind::RemoveRole | OperationKind::DeleteUser => {
            format!("The request to DELETE from {} was denied.", path)
        }
    }
}

fn generic_failure_line(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::ListUsers => "Cannot get IAM user list",
        OperationKind::ListRoles => "Cannot get IAM role list",
        _ => "An unknown error occurred.",
    }
}

/// Report a failed operation.
pub fn failure<R: Reporter + ?Sized>(reporter: &mut R, kind: OperationKind, error: &IamError) {
    match error {
        IamError::UnusableIdentifier { identifier } => {
            reporter.error(&format!(
                "\"{}\" is not a valid user or role id.",
                identifier
            ));
        }
        IamError::AccessDenied { path } => {
            reporter.info(&denied_line(kind, path));
            reporter.info(ACCESS_DENIED_ADVISORY);
        }
        IamError::InvalidIdentifier { .. } => {
            reporter.info("The request returned error 500.");
            reporter.info(IDENTIFIER_HINT);
        }
        IamError::UnexpectedStatus { path, code } => {
            reporter.info(&format!(
                "The CoAP request to {} returned response code: {}",
                path, code
            ));
        }
        IamError::Decode { .. } | IamError::Transport { .. } => {
            reporter.error(generic_failure_line(kind));
        }
    }
}

/// Reporter writing to stdout/stderr.
///
/// With `json` set, listings are printed as a single JSON array instead of a heading
/// and numbered lines.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    json: bool,
}

impl ConsoleReporter {
    pub fn new(json: bool) -> Self {
        Self { json }
    }
}

impl Reporter for ConsoleReporter {
    fn info(&mut self, line: &str) {
        let _ = writeln!(io::stdout().lock(), "{}", line);
    }

    fn error(&mut self, line: &str) {
        let _ = writeln!(io::stderr().lock(), "{}", line);
    }

    fn listing_started(&mut self, resource: Resource) {
        if !self.json {
            self.info(listing_heading(resource));
        }
    }

    fn listing(&mut self, resource: Resource, entries: &[String]) {
        if !self.json {
            numbered_listing(self, resource, entries);
            return;
        }

        match render_json(entries) {
            Ok(json) => self.info(&json),
            Err(e) => self.error(&format!("Failed to render listing as JSON: {}", e)),
        }
    }
}

/// Listing entries as a compact JSON array of strings.
pub fn render_json(entries: &[String]) -> serde_json::Result<String> {
    serde_json::to_string(entries)
}
