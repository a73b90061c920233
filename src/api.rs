use std::{error::Error, fmt, time::Duration};

/// The `ServiceSettings` struct holds everything needed to reach one tenant/namespace of the
/// ingestion service as a single client identity.
///
/// Properties:
///
/// * `resource`: The base URL of the ingestion service, e.g. `https://example.com`. Token and
/// namespace paths are derived from it.
/// * `tenant_id`: The tenant that owns the namespace.
/// * `namespace_id`: The namespace that connections are created in and OMF is sent to.
/// * `client_id`: The client credential identifier used to request an access token.
/// * `client_secret`: The secret paired with `client_id`. It is never logged.
/// * `api_version`: The version segment of the REST path (`v1` unless configured otherwise).
/// * `request_timeout`: The upper bound for any single HTTP request issued with these settings.
#[derive(Clone)]
pub struct ServiceSettings {
    pub resource: String,
    pub tenant_id: String,
    pub namespace_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub api_version: String,
    pub request_timeout: Duration,
}

impl Default for ServiceSettings {
    fn default() -> ServiceSettings {
        ServiceSettings {
            resource: "https://localhost".to_string(),
            tenant_id: "".to_string(),
            namespace_id: "".to_string(),
            client_id: "".to_string(),
            client_secret: "".to_string(),
            api_version: "v1".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl fmt::Debug for ServiceSettings {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ServiceSettings")
            .field("resource", &self.resource)
            .field("tenant_id", &self.tenant_id)
            .field("namespace_id", &self.namespace_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("api_version", &self.api_version)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Broad classification of an [`ApiClientError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required argument was empty or not representable. Raised before any request is made.
    InvalidArgument,
    /// The request never produced an HTTP response (connect, TLS, read or token failures).
    Transport,
    /// The service answered with a non-success status. `code` carries the status.
    Status,
    /// A message or response body could not be encoded or decoded.
    Serialization,
    /// Settings could not be read or were incomplete.
    Config,
    /// The service reported a connection state the operation cannot progress from.
    UnexpectedState,
    /// A polling operation did not finish before its deadline.
    Timeout,
    /// The operation was cancelled by its caller.
    Cancelled,
}

/// The ApiClientError reports failures from the client to its callers.
///
/// Properties:
///
/// * `kind`: What class of failure this is. Callers match on it rather than parsing `details`.
/// * `code`: The HTTP status for [`ErrorKind::Status`] errors, otherwise the source line the
/// error was raised on.
/// * `details`: A human readable description including the code.
#[derive(Clone, Debug)]
pub struct ApiClientError {
    pub kind: ErrorKind,
    pub code: u32,
    pub details: String,
}

impl ApiClientError {
    pub fn new(kind: ErrorKind, code: u32, msg: &str) -> ApiClientError {
        ApiClientError {
            kind,
            code,
            details: format!("Service Error <{}> : {}", &code, &msg),
        }
    }

    pub fn invalid_argument(name: &str, msg: &str) -> ApiClientError {
        ApiClientError {
            kind: ErrorKind::InvalidArgument,
            code: line!(),
            details: format!("Invalid argument `{}`: {}", name, msg),
        }
    }

    pub fn status(status: u16, body: &str) -> ApiClientError {
        let body = body.trim();
        let msg = if body.is_empty() {
            format!("request rejected with status {}", status)
        } else {
            format!("request rejected with status {}: {}", status, body)
        };
        ApiClientError::new(ErrorKind::Status, status as u32, &msg)
    }

    pub fn code(&self) -> u32 {
        self.code
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Display for ApiClientError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.details)
    }
}

impl Error for ApiClientError {}

impl From<serde_json::Error> for ApiClientError {
    fn from(e: serde_json::Error) -> ApiClientError {
        ApiClientError::new(ErrorKind::Serialization, line!(), &e.to_string())
    }
}
