use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of an OMF connection as reported by the ingestion service.
///
/// Parsing is an exact, case-sensitive match on the service's text. Anything the client does not
/// know about is kept verbatim in `Unrecognized` so that polling can fail closed on it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConnectionState {
    Creating,
    Created,
    Active,
    Updating,
    Deleting,
    Deleted,
    Failed,
    Unrecognized(String),
}

/// Outcome of evaluating one observed state against the state a poll loop is waiting for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StateResponse {
    /// The target state has been reached.
    Done,
    /// Still in transition; poll again after the interval.
    Wait,
    /// The connection can no longer reach the target state.
    Error(String),
}

impl ConnectionState {
    pub fn as_str(&self) -> &str {
        match self {
            ConnectionState::Creating => "Creating",
            ConnectionState::Created => "Created",
            ConnectionState::Active => "Active",
            ConnectionState::Updating => "Updating",
            ConnectionState::Deleting => "Deleting",
            ConnectionState::Deleted => "Deleted",
            ConnectionState::Failed => "Failed",
            ConnectionState::Unrecognized(raw) => raw.as_str(),
        }
    }

    /// Evaluates this state for a loop waiting on activation.
    pub fn toward_active(&self) -> StateResponse {
        match self {
            ConnectionState::Active => StateResponse::Done,
            ConnectionState::Creating | ConnectionState::Created | ConnectionState::Updating => {
                StateResponse::Wait
            }
            ConnectionState::Deleting | ConnectionState::Deleted | ConnectionState::Failed => {
                StateResponse::Error(format!("connection is {} and cannot become Active", self))
            }
            ConnectionState::Unrecognized(raw) => {
                StateResponse::Error(format!("unrecognized connection state \"{}\"", raw))
            }
        }
    }

    /// Evaluates this state for a loop waiting on deletion.
    pub fn toward_deleted(&self) -> StateResponse {
        match self {
            ConnectionState::Deleted => StateResponse::Done,
            ConnectionState::Failed => {
                StateResponse::Error(format!("connection is {} and will not be deleted", self))
            }
            ConnectionState::Unrecognized(raw) => {
                StateResponse::Error(format!("unrecognized connection state \"{}\"", raw))
            }
            _ => StateResponse::Wait,
        }
    }
}

impl From<String> for ConnectionState {
    fn from(raw: String) -> ConnectionState {
        match raw.as_str() {
            "Creating" => ConnectionState::Creating,
            "Created" => ConnectionState::Created,
            "Active" => ConnectionState::Active,
            "Updating" => ConnectionState::Updating,
            "Deleting" => ConnectionState::Deleting,
            "Deleted" => ConnectionState::Deleted,
            "Failed" => ConnectionState::Failed,
            _ => ConnectionState::Unrecognized(raw),
        }
    }
}

impl From<&str> for ConnectionState {
    fn from(raw: &str) -> ConnectionState {
        ConnectionState::from(raw.to_string())
    }
}

impl From<ConnectionState> for String {
    fn from(state: ConnectionState) -> String {
        match state {
            ConnectionState::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
