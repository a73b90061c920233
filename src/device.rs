use crate::api::ApiClientError;
use crate::measurement::{Measurement, DATA_POINT_TYPE_ID};
use crate::omf::message::{self, ActionType, OmfMessage};
use crate::omf::OmfTransport;
use std::sync::Arc;

/// A single device identity sending OMF for one tenant/namespace.
///
/// Each operation builds its message, serializes it and hands it to the transport once.
pub struct Device {
    transport: Arc<dyn OmfTransport>,
}

impl Device {
    pub fn new(transport: Arc<dyn OmfTransport>) -> Device {
        Device { transport }
    }

    pub async fn create_data_point_type(&self) -> Result<(), ApiClientError> {
        log::info!("Creating Type with Id {}", DATA_POINT_TYPE_ID);
        let msg = message::create_type_message(Measurement::omf_type());
        self.send_omf_message(msg).await
    }

    pub async fn create_stream(&self, stream_id: &str) -> Result<(), ApiClientError> {
        require_stream_id(stream_id)?;
        log::info!("Creating Container with Id {}", stream_id);
        let msg = message::create_container_message(stream_id, DATA_POINT_TYPE_ID);
        self.send_omf_message(msg).await
    }

    /// Sends one measurement to `stream_id`.
    ///
    /// An empty stream id or a non-finite value is rejected before anything is sent.
    pub async fn send_value(
        &self,
        stream_id: &str,
        value: &Measurement,
    ) -> Result<(), ApiClientError> {
        require_stream_id(stream_id)?;
        if !value.value.is_finite() {
            return Err(ApiClientError::invalid_argument(
                "value",
                "measurement value must be a finite number",
            ));
        }

        let msg = message::create_data_message(stream_id, value)?;
        self.send_omf_message(msg).await?;
        log::info!(
            "Sent data point: Time: {}, Value: {}",
            value.timestamp.to_rfc3339(),
            value.value
        );
        Ok(())
    }

    pub async fn delete_data_point_type(&self) -> Result<(), ApiClientError> {
        log::info!("Deleting Type with Id {}", DATA_POINT_TYPE_ID);
        let msg = message::create_type_message(Measurement::omf_type())
            .with_action(ActionType::Delete);
        self.send_omf_message(msg).await
    }

    pub async fn delete_stream(&self, stream_id: &str) -> Result<(), ApiClientError> {
        require_stream_id(stream_id)?;
        log::info!("Deleting Container with Id {}", stream_id);
        let msg = message::create_container_message(stream_id, DATA_POINT_TYPE_ID)
            .with_action(ActionType::Delete);
        self.send_omf_message(msg).await
    }

    async fn send_omf_message(&self, msg: OmfMessage) -> Result<(), ApiClientError> {
        let serialized = message::serialize(&msg)?;
        log::debug!(
            "Sending {} message ({}), {} bytes",
            serialized.headers.message_type.as_str(),
            serialized.headers.action,
            serialized.body.len()
        );
        self.transport.send_omf_message(serialized).await
    }
}

fn require_stream_id(stream_id: &str) -> Result<(), ApiClientError> {
    if stream_id.trim().is_empty() {
        return Err(ApiClientError::invalid_argument(
            "stream_id",
            "stream id cannot be empty",
        ));
    }
    Ok(())
}
