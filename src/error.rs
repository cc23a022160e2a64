//! Error types for declaration time and request time failures.

use crate::validator::ValidationIssue;
use std::fmt;

/// A programmer error in the declared Api/Resource/Operation/Model graph.
///
/// Returned synchronously from declaration and setup calls. These are never
/// recovered from automatically: the framework refuses to build a dispatcher
/// until the declaration is fixed.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclarationError {
    /// A declaration failed validation against its schema
    Invalid {
        /// Kind of entity being declared (`api`, `resource`, `operation`, ...)
        entity: &'static str,
        message: String,
        errors: Vec<ValidationIssue>,
    },
    /// A path that must start with `/` does not
    InvalidPath { entity: &'static str, path: String },
    DuplicateApi { resource_path: String },
    DuplicateResource { path: String },
    /// A second operation for the same method on one resource
    DuplicateOperation { method: String, path: String },
    /// Nicknames are unique across the whole owning Api
    DuplicateNickname { nickname: String, resource_path: String },
    DuplicateParameter { nickname: String, name: String },
    MultipleBodyParameters { nickname: String },
    DuplicateModel { id: String },
    /// A non-body parameter whose type is not a primitive
    UnknownParameterType {
        nickname: String,
        name: String,
        type_name: String,
    },
    /// A validated schema references a model that was never registered
    UnresolvedModel { context: String, model: String },
    /// A generated schema failed to compile
    Schema { context: String, message: String },
    /// `setup` was called on an entity that is already attached
    AlreadySetup { entity: &'static str, name: String },
    /// A declaration arrived after the dispatcher was built
    Committed,
}

impl DeclarationError {
    /// Validation issues carried by an `Invalid` error, empty otherwise.
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            DeclarationError::Invalid { errors, .. } => errors,
            _ => &[],
        }
    }
}

impl fmt::Display for DeclarationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclarationError::Invalid {
                entity,
                message,
                errors,
            } => {
                write!(f, "{} {}", entity, message)?;
                for issue in errors {
                    write!(f, "; {}", issue)?;
                }
                Ok(())
            }
            DeclarationError::InvalidPath { entity, path } => {
                write!(f, "{} path must start with /: {}", entity, path)
            }
            DeclarationError::DuplicateApi { resource_path } => {
                write!(f, "\"{}\" api already defined", resource_path)
            }
            DeclarationError::DuplicateResource { path } => {
                write!(f, "\"{}\" resource already defined", path)
            }
            DeclarationError::DuplicateOperation { method, path } => {
                write!(f, "redefined resource: {} {}", method, path)
            }
            DeclarationError::DuplicateNickname {
                nickname,
                resource_path,
            } => write!(
                f,
                "\"{}\" nickname already defined in api {}",
                nickname, resource_path
            ),
            DeclarationError::DuplicateParameter { nickname, name } => {
                write!(f, "{} has duplicate parameter: {}", nickname, name)
            }
            DeclarationError::MultipleBodyParameters { nickname } => {
                write!(f, "{} declares more than one body parameter", nickname)
            }
            DeclarationError::DuplicateModel { id } => {
                write!(f, "\"{}\" model already defined", id)
            }
            DeclarationError::UnknownParameterType {
                nickname,
                name,
                type_name,
            } => write!(
                f,
                "{} parameter {} has unknown type: {}",
                nickname, name, type_name
            ),
            DeclarationError::UnresolvedModel { context, model } => {
                write!(f, "{} references unknown model: {}", context, model)
            }
            DeclarationError::Schema { context, message } => {
                write!(f, "{} schema failed to compile: {}", context, message)
            }
            DeclarationError::AlreadySetup { entity, name } => {
                write!(f, "{} \"{}\" already setup", entity, name)
            }
            DeclarationError::Committed => {
                write!(f, "framework already committed; declare everything before dispatching")
            }
        }
    }
}

impl std::error::Error for DeclarationError {}

/// An error raised while processing a request.
///
/// Stages hand these back as `Outcome::Fail`. Unless `expose` is set the
/// client only sees the reason phrase of a 500; the message is still logged.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerError {
    pub status: Option<u16>,
    pub message: String,
    pub expose: bool,
    pub errors: Option<Vec<ValidationIssue>>,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        HandlerError {
            status: None,
            message: message.into(),
            expose: false,
            errors: None,
        }
    }

    /// An error whose status and message are safe to show to the client.
    pub fn exposed(status: u16, message: impl Into<String>) -> Self {
        HandlerError {
            status: Some(status),
            message: message.into(),
            expose: true,
            errors: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_errors(mut self, errors: Vec<ValidationIssue>) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn expose(mut self, expose: bool) -> Self {
        self.expose = expose;
        self
    }

    /// Status to answer with when this error reaches the generic error reply.
    pub fn response_status(&self) -> u16 {
        match self.status {
            Some(code) if self.expose && (100..600).contains(&code) => code,
            _ => 500,
        }
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} ({})", self.message, status),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for HandlerError {}

impl From<anyhow::Error> for HandlerError {
    fn from(err: anyhow::Error) -> Self {
        HandlerError::new(format!("{:#}", err))
    }
}
