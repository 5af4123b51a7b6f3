//! IAM operations against a device.
//!
//! Each operation builds one request, runs it through the borrowed connection,
//! classifies the response and reports the result. Mutating operations ask the
//! confirmation gate first and send nothing if the operator declines.

use tracing::{debug, error, info, warn};

use super::connection::{Connection, Request};
use super::decode;
use super::models::{IamRequest, IamResponse, Mutation, OperationKind, Resource};
use super::prompt::Confirm;
use super::report::{self, Reporter};
use crate::error::IamError;

/// What to do when removing a role returns a code other than 202, 403 or 500.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnmatchedStatus {
    /// Fail without printing anything.
    #[default]
    Silent,
    /// Print the raw response code, like every other operation.
    Report,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ClientOptions {
    pub remove_role_unmatched: UnmatchedStatus,
}

/// IAM client bound to an established connection.
pub struct IamClient<'a, C, P, R> {
    connection: &'a C,
    prompt: P,
    reporter: R,
    options: ClientOptions,
}

impl<'a, C, P, R> IamClient<'a, C, P, R>
where
    C: Connection,
    P: Confirm,
    R: Reporter,
{
    pub fn new(connection: &'a C, prompt: P, reporter: R) -> Self {
        Self {
            connection,
            prompt,
            reporter,
            options: ClientOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    /// List the user ids provisioned on the device.
    pub fn list_users(&mut self) -> Result<Vec<String>, IamError> {
        self.list(Resource::Users)
    }

    /// List the role ids available on the device.
    pub fn list_roles(&mut self) -> Result<Vec<String>, IamError> {
        self.list(Resource::Roles)
    }

    /// Attach `role` to `user`.
    pub fn add_role_to_user(&mut self, user: &str, role: &str) -> Result<Mutation, IamError> {
        let question = format!("Add role \"{}\" to user \"{}\"? ", role, user);
        self.mutate(
            OperationKind::AddRole,
            IamRequest::add_role(user, role),
            &question,
        )
    }

    /// Detach `role` from `user`.
    pub fn remove_role_from_user(&mut self, user: &str, role: &str) -> Result<Mutation, IamError> {
        let question = format!("Remove role \"{}\" from user \"{}\"? ", role, user);
        self.mutate(
            OperationKind::RemoveRole,
            IamRequest::remove_role(user, role),
            &question,
        )
    }

    /// Delete `user` from the device.
    pub fn delete_user(&mut self, user: &str) -> Result<Mutation, IamError> {
        let question = format!("Delete user \"{}\"? ", user);
        self.mutate(
            OperationKind::DeleteUser,
            IamRequest::delete_user(user),
            &question,
        )
    }

    fn list(&mut self, resource: Resource) -> Result<Vec<String>, IamError> {
        let kind = resource.list_kind();
        let request = IamRequest::list(resource);

        match self.fetch_listing(resource, &request) {
            Ok(entries) => {
                info!("Listed {} entries from {}", entries.len(), request.path);
                self.reporter.listing(resource, &entries);
                Ok(entries)
            }
            Err(e) => Err(self.fail(kind, e)),
        }
    }

    fn fetch_listing(
        &mut self,
        resource: Resource,
        request: &IamRequest,
    ) -> Result<Vec<String>, IamError> {
        let kind = resource.list_kind();
        let response = self.exchange(request)?;

        // The heading goes out before the payload is decoded
        if response.status_code == kind.success_status() {
            self.reporter.listing_started(resource);
        }

        decode::decode_listing(kind, &response)
            .map_err(|source| IamError::Decode {
                path: request.path.clone(),
                source,
            })?
            .into_result(&request.path)
    }

    fn mutate(
        &mut self,
        kind: OperationKind,
        request: Result<IamRequest, IamError>,
        question: &str,
    ) -> Result<Mutation, IamError> {
        let request = match request {
            Ok(request) => request,
            Err(e) => return Err(self.fail(kind, e)),
        };

        if !self.prompt.confirm(question) {
            info!("{} {} cancelled by operator", request.method, request.path);
            self.reporter.info(report::CANCELLED);
            return Ok(Mutation::Cancelled);
        }

        let result = self.exchange(&request).and_then(|response| {
            decode::classify(kind, response.status_code).into_result(&request.path)
        });

        match result {
            Ok(()) => {
                info!("{} {} succeeded", request.method, request.path);
                self.reporter.info(report::SUCCESS);
                Ok(Mutation::Applied)
            }
            Err(e) => Err(self.fail(kind, e)),
        }
    }

    /// Run one request through the connection.
    fn exchange(&self, request: &IamRequest) -> Result<IamResponse, IamError> {
        debug!("Sending {} {}", request.method, request.path);

        let response = self
            .connection
            .create_request(request.method, &request.path)
            .and_then(Request::execute)
            .map_err(|source| IamError::Transport {
                path: request.path.clone(),
                source,
            })?;

        debug!(
            "{} {} returned {}",
            request.method, request.path, response.status_code
        );
        Ok(response)
    }

    fn fail(&mut self, kind: OperationKind, err: IamError) -> IamError {
        match &err {
            IamError::Transport { .. } | IamError::Decode { .. } => {
                error!("{:?} failed: {}", kind, err)
            }
            _ => warn!("{:?} failed: {}", kind, err),
        }

        let silent = kind == OperationKind::RemoveRole
            && matches!(err, IamError::UnexpectedStatus { .. })
            && self.options.remove_role_unmatched == UnmatchedStatus::Silent;

        if !silent {
            report::failure(&mut self.reporter, kind, &err);
        }
        err
    }
}
