//! Boundary with the connection that carries IAM requests to the device.
//!
//! Session setup, transport security and authentication live behind these traits.

use super::models::{IamResponse, Method};
use crate::error::ConnectionError;

/// An established connection able to create requests.
pub trait Connection {
    type Request: Request;

    /// Prepare a request for `path`. Nothing is sent until [`Request::execute`].
    fn create_request(&self, method: Method, path: &str)
        -> Result<Self::Request, ConnectionError>;
}

/// A single prepared request.
pub trait Request {
    /// Send the request and block until a response or a transport failure.
    fn execute(self) -> Result<IamResponse, ConnectionError>;
}
