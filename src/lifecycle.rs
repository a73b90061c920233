//! Connection provisioning and teardown.
//!
//! The ingestion service creates and deletes connections asynchronously: the create and delete
//! requests return straight away and the connection then moves through its states on the service
//! side. [`ConnectionManager`] turns that into two awaitable operations by polling the service
//! until the reported state says the work is done.
//!
//! Every operation is bounded by [`PollSettings::timeout`] and observes the caller's
//! [`CancellationToken`] on each request and each wait. Progress is only ever judged from the
//! state the service reports, never from elapsed time or from a request having succeeded.
//! A create that fails after the service accepted it deletes the connection before returning.

use crate::api::{ApiClientError, ErrorKind};
use crate::omf::model::{OmfConnection, OmfConnectionCreate};
use crate::omf::IngressService;
use crate::state::StateResponse;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollSettings {
    /// Pause between two consecutive polls.
    pub interval: Duration,
    /// Deadline for a whole create or delete operation, requests included.
    pub timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> PollSettings {
        PollSettings {
            interval: Duration::from_secs(1),
            timeout: Duration::from_secs(300),
        }
    }
}

pub struct ConnectionManager {
    service: Arc<dyn IngressService>,
    poll: PollSettings,
}

impl ConnectionManager {
    pub fn new(service: Arc<dyn IngressService>, poll: PollSettings) -> ConnectionManager {
        ConnectionManager { service, poll }
    }

    /// Creates a connection and waits until the service reports it `Active`.
    ///
    /// The snapshot returned by the create request is checked first; after that the connection is
    /// re-fetched by id once per interval. States that can never lead to `Active`, including ones
    /// this client does not recognize, end the wait with an [`ErrorKind::UnexpectedState`] error.
    ///
    /// Once the create request has succeeded, a failure while waiting (timeout, cancellation,
    /// a fail-closed state or a service error) deletes the connection again before the error is
    /// returned, so the caller is never left with a connection it was not handed.
    pub async fn create_and_await_active(
        &self,
        spec: &OmfConnectionCreate,
        cancel: &CancellationToken,
    ) -> Result<OmfConnection, ApiClientError> {
        let mut created: Option<String> = None;
        let work = async {
            let mut connection = self.service.begin_create_connection(spec).await?;
            created = Some(connection.id.clone());
            log::debug!(
                "Connection {} created in state {}",
                connection.id,
                connection.state
            );

            loop {
                match connection.state.toward_active() {
                    StateResponse::Done => return Ok(connection),
                    StateResponse::Wait => {}
                    StateResponse::Error(e) => {
                        return Err(unexpected_state(&connection.id, &e));
                    }
                }
                self.pause(cancel).await?;
                connection = self.service.get_connection(&connection.id).await?;
                log::debug!("Connection {} is {}", connection.id, connection.state);
            }
        };

        let result = self.bounded("create connection", work, cancel).await;
        if let (Err(e), Some(connection_id)) = (&result, created) {
            self.discard(&connection_id, e).await;
        }
        result
    }

    /// Deletes a connection left behind by a failed create. Errors are logged, not returned.
    async fn discard(&self, connection_id: &str, reason: &ApiClientError) {
        log::warn!(
            "Connection {} did not become active ({}), deleting it",
            connection_id,
            reason
        );
        // The create may have failed because the caller cancelled.
        let teardown = CancellationToken::new();
        if let Err(e) = self.delete_and_await_gone(connection_id, &teardown).await {
            log::warn!("Could not delete connection {}: {}", connection_id, e);
        }
    }

    /// Deletes a connection and waits until the service reports it `Deleted` or stops listing it.
    ///
    /// A connection missing from the listing is taken as already purged.
    pub async fn delete_and_await_gone(
        &self,
        connection_id: &str,
        cancel: &CancellationToken,
    ) -> Result<(), ApiClientError> {
        if connection_id.trim().is_empty() {
            return Err(ApiClientError::invalid_argument(
                "connection_id",
                "connection id cannot be empty",
            ));
        }

        let work = async {
            self.service.begin_delete_connection(connection_id).await?;

            loop {
                let connections = self.service.list_connections().await?;
                let found = connections
                    .iter()
                    .find(|c| c.id.eq_ignore_ascii_case(connection_id));

                let Some(connection) = found else {
                    log::debug!(
                        "Connection {} is no longer listed, treating it as deleted",
                        connection_id
                    );
                    return Ok(());
                };

                match connection.state.toward_deleted() {
                    StateResponse::Done => return Ok(()),
                    StateResponse::Wait => {
                        log::debug!("Connection {} is {}", connection.id, connection.state)
                    }
                    StateResponse::Error(e) => {
                        return Err(unexpected_state(&connection.id, &e));
                    }
                }
                self.pause(cancel).await?;
            }
        };

        self.bounded("delete connection", work, cancel).await
    }

    async fn pause(&self, cancel: &CancellationToken) -> Result<(), ApiClientError> {
        tokio::select! {
            _ = cancel.cancelled() => Err(cancelled()),
            _ = tokio::time::sleep(self.poll.interval) => Ok(()),
        }
    }

    async fn bounded<T, F>(
        &self,
        operation: &str,
        work: F,
        cancel: &CancellationToken,
    ) -> Result<T, ApiClientError>
    where
        F: Future<Output = Result<T, ApiClientError>>,
    {
        if cancel.is_cancelled() {
            return Err(cancelled());
        }

        tokio::select! {
            _ = cancel.cancelled() => Err(cancelled()),
            res = tokio::time::timeout(self.poll.timeout, work) => match res {
                Ok(outcome) => outcome,
                Err(_) => Err(ApiClientError::new(
                    ErrorKind::Timeout,
                    line!(),
                    &format!("{} did not complete within {:?}", operation, self.poll.timeout),
                )),
            },
        }
    }
}

fn cancelled() -> ApiClientError {
    ApiClientError::new(ErrorKind::Cancelled, line!(), "operation cancelled")
}

fn unexpected_state(id: &str, msg: &str) -> ApiClientError {
    ApiClientError::new(
        ErrorKind::UnexpectedState,
        line!(),
        &format!("connection {}: {}", id, msg),
    )
}
