//! IAM request, response and outcome models.

use std::fmt;

use crate::error::IamError;

/// Root of the user collection on the device.
pub const USERS_ROOT: &str = "/iam/users";

/// Root of the role collection on the device.
pub const ROLES_ROOT: &str = "/iam/roles";

/// Numeric response codes used by the device's IAM service.
///
/// CoAP class/detail codes flattened to integers (2.05 -> 205).
pub mod status {
    pub const CREATED: u16 = 201;
    pub const DELETED: u16 = 202;
    pub const CONTENT: u16 = 205;
    pub const FORBIDDEN: u16 = 403;
    pub const INTERNAL_SERVER_ERROR: u16 = 500;
}

/// Request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listable IAM collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Users,
    Roles,
}

impl Resource {
    pub fn root(&self) -> &'static str {
        match self {
            Self::Users => USERS_ROOT,
            Self::Roles => ROLES_ROOT,
        }
    }

    pub fn list_kind(&self) -> OperationKind {
        match self {
            Self::Users => OperationKind::ListUsers,
            Self::Roles => OperationKind::ListRoles,
        }
    }
}

/// The five operations exposed by the device's IAM service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    ListUsers,
    ListRoles,
    AddRole,
    RemoveRole,
    DeleteUser,
}

impl OperationKind {
    /// Status code that signals success for this operation.
    pub fn success_status(&self) -> u16 {
        match self {
            Self::ListUsers | Self::ListRoles => status::CONTENT,
            Self::AddRole => status::CREATED,
            Self::RemoveRole | Self::DeleteUser => status::DELETED,
        }
    }

    /// Status code the service uses for bad identifiers, if this operation has one.
    ///
    /// Only role attach/detach report malformed ids as 500.
    pub fn semantic_error_status(&self) -> Option<u16> {
        match self {
            Self::AddRole | Self::RemoveRole => Some(status::INTERNAL_SERVER_ERROR),
            _ => None,
        }
    }
}

/// A request descriptor: method plus fully composed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IamRequest {
    pub method: Method,
    pub path: String,
}

impl IamRequest {
    /// GET on a collection root.
    pub fn list(resource: Resource) -> Self {
        Self {
            method: Method::Get,
            path: resource.root().to_string(),
        }
    }

    /// PUT `/iam/users/{user}/roles/{role}`.
    pub fn add_role(user: &str, role: &str) -> Result<Self, IamError> {
        Ok(Self {
            method: Method::Put,
            path: user_role_path(user, role)?,
        })
    }

    /// DELETE `/iam/users/{user}/roles/{role}`.
    pub fn remove_role(user: &str, role: &str) -> Result<Self, IamError> {
        Ok(Self {
            method: Method::Delete,
            path: user_role_path(user, role)?,
        })
    }

    /// DELETE `/iam/users/{user}`.
    pub fn delete_user(user: &str) -> Result<Self, IamError> {
        Ok(Self {
            method: Method::Delete,
            path: user_path(user)?,
        })
    }
}

/// Percent-encode an identifier as one path segment.
///
/// Empty and dot-only identifiers are refused: URL normalization would drop or
/// resolve them and the request would address a different resource.
fn segment(identifier: &str) -> Result<String, IamError> {
    if matches!(identifier, "" | "." | "..") {
        return Err(IamError::UnusableIdentifier {
            identifier: identifier.to_string(),
        });
    }
    Ok(urlencoding::encode(identifier).into_owned())
}

fn user_path(user: &str) -> Result<String, IamError> {
    Ok(format!("{}/{}", USERS_ROOT, segment(user)?))
}

fn user_role_path(user: &str, role: &str) -> Result<String, IamError> {
    Ok(format!("{}/roles/{}", user_path(user)?, segment(role)?))
}

/// Raw response handed back by the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IamResponse {
    pub status_code: u16,
    pub payload: Option<Vec<u8>>,
}

impl IamResponse {
    pub fn new(status_code: u16, payload: Option<Vec<u8>>) -> Self {
        Self {
            status_code,
            payload,
        }
    }

    /// Response with no payload.
    pub fn status(status_code: u16) -> Self {
        Self::new(status_code, None)
    }
}

/// Classified result of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Success(T),
    AccessDenied,
    SemanticError(u16),
    UnknownStatus(u16),
}

impl<T> Outcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Success(value) => Outcome::Success(f(value)),
            Self::AccessDenied => Outcome::AccessDenied,
            Self::SemanticError(code) => Outcome::SemanticError(code),
            Self::UnknownStatus(code) => Outcome::UnknownStatus(code),
        }
    }

    /// Converts a non-success outcome into the matching error for `path`.
    pub fn into_result(self, path: &str) -> Result<T, IamError> {
        let path = path.to_string();
        match self {
            Self::Success(value) => Ok(value),
            Self::AccessDenied => Err(IamError::AccessDenied { path }),
            Self::SemanticError(_) => Err(IamError::InvalidIdentifier { path }),
            Self::UnknownStatus(code) => Err(IamError::UnexpectedStatus { path, code }),
        }
    }
}

/// Result of a confirmation-gated operation that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// The device accepted the change.
    Applied,
    /// The operator declined at the prompt; nothing was sent.
    Cancelled,
}

impl Mutation {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}
