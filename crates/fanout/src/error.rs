use std::error::Error as StdError;
use std::fmt::{Display, Formatter, Result as FmtResult};

use thiserror::Error;

/// Boxed source error carried by remote failures.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Result type for fan-out operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Remote operations issued against the identity, topic, and queue services.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Operation {
    /// Caller identity lookup.
    ResolveAccount,

    /// Topic creation.
    CreateTopic,

    /// Message publication.
    Publish,

    /// Queue lookup by name.
    GetQueue,

    /// Queue access policy replacement.
    SetQueuePolicy,

    /// Topic subscription.
    Subscribe,

    /// Topic unsubscription.
    Unsubscribe,

    /// Topic subscription listing.
    ListSubscriptions,
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            Self::ResolveAccount => "resolve account",
            Self::CreateTopic => "create topic",
            Self::Publish => "publish",
            Self::GetQueue => "get queue",
            Self::SetQueuePolicy => "set queue policy",
            Self::Subscribe => "subscribe",
            Self::Unsubscribe => "unsubscribe",
            Self::ListSubscriptions => "list subscriptions",
        };

        f.write_str(name)
    }
}

/// Coarse classification of errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Credentials were rejected or the identity service was unreachable.
    Authentication,

    /// Caller supplied a value that cannot be used.
    InvalidInput,

    /// A named queue or registry entry is absent.
    NotFound,

    /// A remote call reported a non-success status.
    RemoteService,
}

/// Errors that can occur in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Identity lookup failed.
    #[error("authentication failed: {0}")]
    Authentication(#[source] BoxError),

    /// Region designator is empty.
    #[error("invalid region `{0}`")]
    InvalidRegion(String),

    /// Topic name is not usable as an SNS topic name.
    #[error("invalid topic name `{0}`")]
    InvalidTopicName(String),

    /// Remote response was missing a field the operation depends on.
    #[error("{operation} response missing `{field}`")]
    MalformedResponse {
        /// The attempted operation.
        operation: Operation,

        /// The missing field.
        field: &'static str,
    },

    /// Policy document could not be serialized.
    #[error("policy serialization failed: {0}")]
    Policy(#[from] serde_json::Error),

    /// No queue with the given name exists.
    #[error("queue `{0}` not found")]
    QueueNotFound(String),

    /// Remote call failed.
    #[error("{operation} failed: {source}")]
    RemoteService {
        /// The attempted operation.
        operation: Operation,

        /// HTTP status reported by the service, if a response was received.
        status: Option<u16>,

        /// The raw failure reason.
        #[source]
        source: BoxError,
    },

    /// Queue was never subscribed through this publisher.
    #[error("queue `{0}` is not subscribed through this publisher")]
    SubscriberNotFound(String),
}

impl Error {
    /// Builds a `RemoteService` error without a status code.
    pub fn remote<E>(operation: Operation, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::RemoteService {
            operation,
            status: None,
            source: source.into(),
        }
    }

    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication(_) => ErrorKind::Authentication,
            Self::InvalidRegion(_) | Self::InvalidTopicName(_) | Self::Policy(_) => {
                ErrorKind::InvalidInput
            }
            Self::QueueNotFound(_) | Self::SubscriberNotFound(_) => ErrorKind::NotFound,
            Self::MalformedResponse { .. } | Self::RemoteService { .. } => {
                ErrorKind::RemoteService
            }
        }
    }

    /// Returns `true` if a queue or registry entry was absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}
