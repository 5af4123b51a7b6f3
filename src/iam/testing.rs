//! In-memory collaborators for exercising IAM operations in tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use super::connection::{Connection, Request};
use super::models::{IamRequest, IamResponse, Method};
use super::prompt::Confirm;
use super::report::Reporter;
use crate::error::ConnectionError;

#[derive(Default)]
struct Script {
    responses: VecDeque<Result<IamResponse, ConnectionError>>,
    executed: Vec<IamRequest>,
}

/// Connection that replays queued responses and records what was executed.
#[derive(Clone, Default)]
pub struct ScriptedConnection {
    script: Rc<RefCell<Script>>,
}

impl ScriptedConnection {
    pub fn respond(self, response: IamResponse) -> Self {
        self.script.borrow_mut().responses.push_back(Ok(response));
        self
    }

    pub fn fail(self, err: ConnectionError) -> Self {
        self.script.borrow_mut().responses.push_back(Err(err));
        self
    }

    pub fn executed(&self) -> Vec<IamRequest> {
        self.script.borrow().executed.clone()
    }

    pub fn call_count(&self) -> usize {
        self.script.borrow().executed.len()
    }
}

pub struct ScriptedRequest {
    request: IamRequest,
    script: Rc<RefCell<Script>>,
}

impl Connection for ScriptedConnection {
    type Request = ScriptedRequest;

    fn create_request(
        &self,
        method: Method,
        path: &str,
    ) -> Result<Self::Request, ConnectionError> {
        Ok(ScriptedRequest {
            request: IamRequest {
                method,
                path: path.to_string(),
            },
            script: Rc::clone(&self.script),
        })
    }
}

impl Request for ScriptedRequest {
    fn execute(self) -> Result<IamResponse, ConnectionError> {
        let mut script = self.script.borrow_mut();
        script.executed.push(self.request);
        script
            .responses
            .pop_front()
            .unwrap_or(Err(ConnectionError::Closed))
    }
}

/// Gate with fixed answers that remembers every question.
#[derive(Default)]
pub struct ScriptedConfirm {
    answers: VecDeque<bool>,
    pub asked: Vec<String>,
}

impl ScriptedConfirm {
    pub fn answering(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            asked: Vec::new(),
        }
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&mut self, message: &str) -> bool {
        self.asked.push(message.to_string());
        self.answers.pop_front().unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Info(String),
    Error(String),
}

/// Reporter that keeps every emitted line.
#[derive(Default)]
pub struct RecordingReporter {
    pub lines: Vec<Line>,
}

impl RecordingReporter {
    pub fn info_lines(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|l| match l {
                Line::Info(s) => Some(s.as_str()),
                Line::Error(_) => None,
            })
            .collect()
    }

    pub fn error_lines(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|l| match l {
                Line::Error(s) => Some(s.as_str()),
                Line::Info(_) => None,
            })
            .collect()
    }

    /// How many times `line` was emitted on either stream.
    pub fn count(&self, line: &str) -> usize {
        self.lines
            .iter()
            .filter(|l| matches!(l, Line::Info(s) | Line::Error(s) if s == line))
            .count()
    }
}

impl Reporter for RecordingReporter {
    fn info(&mut self, line: &str) {
        self.lines.push(Line::Info(line.to_string()));
    }

    fn error(&mut self, line: &str) {
        self.lines.push(Line::Error(line.to_string()));
    }
}
