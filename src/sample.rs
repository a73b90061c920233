use crate::api::{ApiClientError, ErrorKind};
use crate::config::AppSettings;
use crate::device::Device;
use crate::lifecycle::ConnectionManager;
use crate::measurement::Measurement;
use crate::omf::model::{OmfConnection, OmfConnectionCreate};
use std::{error::Error, fmt};
use tokio_util::sync::CancellationToken;

/// Everything a sample run needs, built once by the caller.
pub struct SampleContext {
    pub settings: AppSettings,
    pub device: Device,
    pub connections: ConnectionManager,
}

/// The outcome of a failed run: the first error encountered and everything that went wrong after
/// it, in order.
#[derive(Debug)]
pub struct RunFailure {
    pub primary: ApiClientError,
    pub suppressed: Vec<ApiClientError>,
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.primary)?;
        if !self.suppressed.is_empty() {
            write!(f, " ({} further error(s) during cleanup", self.suppressed.len())?;
            for e in &self.suppressed {
                write!(f, "; {}", e)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl Error for RunFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.primary)
    }
}

/// Accumulates step failures so that every cleanup step runs before the run reports.
#[derive(Debug, Default)]
pub struct Failures {
    errors: Vec<ApiClientError>,
}

impl Failures {
    /// Logs and keeps the error of a failed step, passing a success value through.
    pub fn record<T>(&mut self, step: &str, result: Result<T, ApiClientError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("{} failed: {}", step, e);
                self.errors.push(e);
                None
            }
        }
    }

    pub fn into_result(self) -> Result<(), RunFailure> {
        let mut errors = self.errors.into_iter();
        match errors.next() {
            None => Ok(()),
            Some(primary) => Err(RunFailure {
                primary,
                suppressed: errors.collect(),
            }),
        }
    }
}

/// Runs the whole sample: create a connection, create the type and container, send the
/// configured number of readings, then clean up.
///
/// Cleanup always runs. Each cleanup step is attempted even when the one before it failed. A
/// connection that never became active has already been removed by
/// [`ConnectionManager::create_and_await_active`], so only an active one is deleted here.
pub async fn run(ctx: &SampleContext, cancel: &CancellationToken) -> Result<(), RunFailure> {
    let settings = &ctx.settings;
    let mut failures = Failures::default();

    log::info!("OMF endpoint at {}", settings.resource);

    let connection = failures.record(
        "Creating the OMF connection",
        create_connection(ctx, cancel).await,
    );
    if connection.is_some() {
        failures.record(
            "Sending type, container and data",
            send_type_container_and_data(ctx, cancel).await,
        );
    }

    failures.record(
        "Deleting the container",
        ctx.device.delete_stream(&settings.stream_id).await,
    );
    failures.record(
        "Deleting the type",
        ctx.device.delete_data_point_type().await,
    );

    if let Some(connection) = connection {
        log::info!("Deleting the OMF Connection with Id {}", connection.id);
        // Teardown must still run after the caller cancelled the main sequence.
        let teardown = CancellationToken::new();
        failures.record(
            "Deleting the OMF connection",
            ctx.connections
                .delete_and_await_gone(&connection.id, &teardown)
                .await,
        );
    }

    log::info!("Complete!");
    failures.into_result()
}

async fn create_connection(
    ctx: &SampleContext,
    cancel: &CancellationToken,
) -> Result<OmfConnection, ApiClientError> {
    let settings = &ctx.settings;
    log::info!(
        "Creating an OMF Connection in Namespace {} for Client with Id {}",
        settings.namespace_id,
        settings.device_client_id
    );

    let spec = OmfConnectionCreate {
        name: settings.connection_name.clone(),
        description: settings.connection_description.clone(),
        client_ids: vec![settings.device_client_id.clone()],
    };
    let connection = ctx.connections.create_and_await_active(&spec, cancel).await?;
    log::info!("OMF Connection {} is {}", connection.id, connection.state);
    Ok(connection)
}

async fn send_type_container_and_data(
    ctx: &SampleContext,
    cancel: &CancellationToken,
) -> Result<(), ApiClientError> {
    let settings = &ctx.settings;
    ctx.device.create_data_point_type().await?;
    ctx.device.create_stream(&settings.stream_id).await?;

    log::info!("Sending {} OMF Data Messages.", settings.send_count);
    for _ in 0..settings.send_count {
        let value = Measurement::now(rand::random::<f64>());
        ctx.device.send_value(&settings.stream_id, &value).await?;

        tokio::select! {
            _ = cancel.cancelled() => {
                return Err(ApiClientError::new(
                    ErrorKind::Cancelled,
                    line!(),
                    "sending cancelled",
                ));
            }
            _ = tokio::time::sleep(settings.send_interval()) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn err(msg: &str) -> ApiClientError {
        ApiClientError::new(ErrorKind::Transport, 1, msg)
    }

    #[test]
    fn no_failures_is_success() {
        let mut failures = Failures::default();
        assert_eq!(failures.record("step", Ok::<_, ApiClientError>(3)), Some(3));
        assert!(failures.into_result().is_ok());
    }

    #[test]
    fn first_failure_is_primary() {
        let mut failures = Failures::default();
        failures.record::<()>("send", Err(err("send broke")));
        failures.record::<()>("cleanup", Err(err("cleanup broke")));
        failures.record::<()>("cleanup again", Err(err("still broken")));

        let failure = failures.into_result().unwrap_err();
        assert!(failure.primary.details.contains("send broke"));
        assert_eq!(failure.suppressed.len(), 2);
        assert!(failure.to_string().contains("2 further error(s)"));
    }
}
