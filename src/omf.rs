use crate::api::ApiClientError;
use crate::omf::message::SerializedOmfMessage;
use crate::omf::model::{OmfConnection, OmfConnectionCreate};
use async_trait::async_trait;

#[async_trait]
/// The `IngressService` trait is the administrative side of the ingestion service, scoped to one
/// tenant/namespace. Every call is a single request; none of them wait for the service to settle.
pub trait IngressService: Send + Sync {
    /// Starts creating a connection and returns the snapshot the service answered with.
    async fn begin_create_connection(
        &self,
        spec: &OmfConnectionCreate,
    ) -> Result<OmfConnection, ApiClientError>;
    async fn get_connection(&self, id: &str) -> Result<OmfConnection, ApiClientError>;
    /// Starts an asynchronous deletion on the service side.
    async fn begin_delete_connection(&self, id: &str) -> Result<(), ApiClientError>;
    async fn list_connections(&self) -> Result<Vec<OmfConnection>, ApiClientError>;
}

#[async_trait]
/// The `OmfTransport` trait is what a device sends its already serialized OMF messages through
pub trait OmfTransport: Send + Sync {
    async fn send_omf_message(&self, message: SerializedOmfMessage) -> Result<(), ApiClientError>;
}

pub mod model {
    use crate::state::ConnectionState;
    use serde::{Deserialize, Serialize};

    /// Request body for creating a connection.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "PascalCase")]
    pub struct OmfConnectionCreate {
        pub name: String,
        pub description: String,
        pub client_ids: Vec<String>,
    }

    /// Snapshot of a connection as last reported by the service.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "PascalCase")]
    pub struct OmfConnection {
        pub id: String,
        #[serde(default)]
        pub name: String,
        #[serde(default)]
        pub description: String,
        pub state: ConnectionState,
        #[serde(default)]
        pub client_ids: Vec<String>,
    }

    /// Connection listings come back either wrapped in a `Results` envelope or as a bare array.
    #[derive(Debug, Deserialize)]
    #[serde(untagged)]
    pub enum OmfConnections {
        Envelope {
            #[serde(rename = "Results")]
            results: Vec<OmfConnection>,
        },
        Bare(Vec<OmfConnection>),
    }

    impl OmfConnections {
        pub fn into_results(self) -> Vec<OmfConnection> {
            match self {
                OmfConnections::Envelope { results } => results,
                OmfConnections::Bare(results) => results,
            }
        }
    }

}

pub mod message {
    use crate::api::{ApiClientError, ErrorKind};
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;
    use std::fmt;

    pub const OMF_VERSION: &str = "1.2";
    pub const MESSAGE_FORMAT: &str = "JSON";

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum MessageType {
        Type,
        Container,
        Data,
    }

    impl MessageType {
        pub fn as_str(&self) -> &'static str {
            match self {
                MessageType::Type => "type",
                MessageType::Container => "container",
                MessageType::Data => "data",
            }
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum ActionType {
        Create,
        Delete,
    }

    impl ActionType {
        pub fn as_str(&self) -> &'static str {
            match self {
                ActionType::Create => "create",
                ActionType::Delete => "delete",
            }
        }
    }

    impl fmt::Display for ActionType {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "{}", self.as_str())
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Classification {
        Dynamic,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct OmfProperty {
        #[serde(rename = "type")]
        pub kind: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub format: Option<String>,
        #[serde(rename = "isindex", skip_serializing_if = "Option::is_none")]
        pub is_index: Option<bool>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct OmfType {
        pub id: String,
        pub classification: Classification,
        #[serde(rename = "type")]
        pub kind: String,
        pub properties: BTreeMap<String, OmfProperty>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct OmfContainer {
        pub id: String,
        pub typeid: String,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct OmfData {
        pub containerid: String,
        pub values: Vec<serde_json::Value>,
    }

    #[derive(Clone, Debug, PartialEq)]
    pub enum OmfBody {
        Types(Vec<OmfType>),
        Containers(Vec<OmfContainer>),
        Data(Vec<OmfData>),
    }

    /// An OMF message before serialization. The message type follows from the body.
    #[derive(Clone, Debug, PartialEq)]
    pub struct OmfMessage {
        pub action: ActionType,
        pub body: OmfBody,
    }

    impl OmfMessage {
        pub fn message_type(&self) -> MessageType {
            match self.body {
                OmfBody::Types(_) => MessageType::Type,
                OmfBody::Containers(_) => MessageType::Container,
                OmfBody::Data(_) => MessageType::Data,
            }
        }

        pub fn with_action(mut self, action: ActionType) -> OmfMessage {
            self.action = action;
            self
        }
    }

    /// Header values that accompany a serialized message on the wire.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct OmfHeaders {
        pub message_type: MessageType,
        pub action: ActionType,
        pub message_format: &'static str,
        pub omf_version: &'static str,
    }

    impl OmfHeaders {
        /// Header name/value pairs in the order they are sent.
        pub fn pairs(&self) -> [(&'static str, &'static str); 4] {
            [
                ("messagetype", self.message_type.as_str()),
                ("action", self.action.as_str()),
                ("messageformat", self.message_format),
                ("omfversion", self.omf_version),
            ]
        }
    }

    #[derive(Clone, Debug, PartialEq)]
    pub struct SerializedOmfMessage {
        pub headers: OmfHeaders,
        pub body: Vec<u8>,
    }

    pub fn create_type_message(omf_type: OmfType) -> OmfMessage {
        OmfMessage {
            action: ActionType::Create,
            body: OmfBody::Types(vec![omf_type]),
        }
    }

    pub fn create_container_message(container_id: &str, type_id: &str) -> OmfMessage {
        OmfMessage {
            action: ActionType::Create,
            body: OmfBody::Containers(vec![OmfContainer {
                id: container_id.to_string(),
                typeid: type_id.to_string(),
            }]),
        }
    }

    pub fn create_data_message<T: Serialize>(
        container_id: &str,
        value: &T,
    ) -> Result<OmfMessage, ApiClientError> {
        let value = serde_json::to_value(value)?;
        Ok(OmfMessage {
            action: ActionType::Create,
            body: OmfBody::Data(vec![OmfData {
                containerid: container_id.to_string(),
                values: vec![value],
            }]),
        })
    }

    pub fn serialize(message: &OmfMessage) -> Result<SerializedOmfMessage, ApiClientError> {
        let body = match &message.body {
            OmfBody::Types(types) => serde_json::to_vec(types),
            OmfBody::Containers(containers) => serde_json::to_vec(containers),
            OmfBody::Data(data) => serde_json::to_vec(data),
        }
        .map_err(|e| ApiClientError::new(ErrorKind::Serialization, line!(), &e.to_string()))?;

        Ok(SerializedOmfMessage {
            headers: OmfHeaders {
                message_type: message.message_type(),
                action: message.action,
                message_format: MESSAGE_FORMAT,
                omf_version: OMF_VERSION,
            },
            body,
        })
    }

}
