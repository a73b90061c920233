#![allow(dead_code)]

use async_trait::async_trait;
use omf_ingress_client::api::{ApiClientError, ErrorKind};
use omf_ingress_client::config::AppSettings;
use omf_ingress_client::omf::message::{ActionType, MessageType, SerializedOmfMessage};
use omf_ingress_client::omf::model::{OmfConnection, OmfConnectionCreate};
use omf_ingress_client::omf::{IngressService, OmfTransport};
use omf_ingress_client::state::ConnectionState;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::time::Instant;

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    CreateConnection(String),
    GetConnection(String),
    DeleteConnection(String),
    ListConnections,
    Omf(MessageType, ActionType),
}

pub fn connection(id: &str, state: &str) -> OmfConnection {
    OmfConnection {
        id: id.to_string(),
        name: "sample".to_string(),
        description: String::new(),
        state: ConnectionState::from(state),
        client_ids: vec!["device".to_string()],
    }
}

pub fn transport_error(msg: &str) -> ApiClientError {
    ApiClientError::new(ErrorKind::Transport, 0, msg)
}

/// In-memory stand-in for the ingestion service that records every call.
///
/// Scripted responses are consumed in order; the last one keeps being returned.
pub struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    data_sent_at: Mutex<Vec<Instant>>,
    create_state: String,
    get_states: Mutex<VecDeque<String>>,
    listings: Mutex<VecDeque<Vec<OmfConnection>>>,
    fail_data_send: Option<usize>,
    fail_omf: Vec<(MessageType, ActionType)>,
    fail_delete_connection: bool,
}

impl FakeBackend {
    /// Creates `conn-1` as `Created`, activates on the first poll and is gone on the first list.
    pub fn new() -> FakeBackend {
        FakeBackend {
            calls: Mutex::new(Vec::new()),
            data_sent_at: Mutex::new(Vec::new()),
            create_state: "Created".to_string(),
            get_states: Mutex::new(VecDeque::from(vec!["Active".to_string()])),
            listings: Mutex::new(VecDeque::from(vec![Vec::new()])),
            fail_data_send: None,
            fail_omf: Vec::new(),
            fail_delete_connection: false,
        }
    }

    pub fn with_create_state(mut self, state: &str) -> FakeBackend {
        self.create_state = state.to_string();
        self
    }

    pub fn with_get_states(self, states: &[&str]) -> FakeBackend {
        *self.get_states.lock().unwrap() = states.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_listings(self, listings: Vec<Vec<OmfConnection>>) -> FakeBackend {
        *self.listings.lock().unwrap() = listings.into();
        self
    }

    /// Fails the `n`th data message (1-based).
    pub fn failing_data_send(mut self, n: usize) -> FakeBackend {
        self.fail_data_send = Some(n);
        self
    }

    pub fn failing_omf(mut self, message_type: MessageType, action: ActionType) -> FakeBackend {
        self.fail_omf.push((message_type, action));
        self
    }

    pub fn failing_delete_connection(mut self) -> FakeBackend {
        self.fail_delete_connection = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn data_sent_at(&self) -> Vec<Instant> {
        self.data_sent_at.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn next_scripted<T: Clone>(queue: &Mutex<VecDeque<T>>) -> Option<T> {
    let mut queue = queue.lock().unwrap();
    if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    }
}

#[async_trait]
impl IngressService for FakeBackend {
    async fn begin_create_connection(
        &self,
        spec: &OmfConnectionCreate,
    ) -> Result<OmfConnection, ApiClientError> {
        self.record(Call::CreateConnection(spec.name.clone()));
        Ok(connection("conn-1", &self.create_state))
    }

    async fn get_connection(&self, id: &str) -> Result<OmfConnection, ApiClientError> {
        self.record(Call::GetConnection(id.to_string()));
        let state = next_scripted(&self.get_states).unwrap_or_else(|| "Active".to_string());
        Ok(connection(id, &state))
    }

    async fn begin_delete_connection(&self, id: &str) -> Result<(), ApiClientError> {
        self.record(Call::DeleteConnection(id.to_string()));
        if self.fail_delete_connection {
            return Err(transport_error("delete connection failed"));
        }
        Ok(())
    }

    async fn list_connections(&self) -> Result<Vec<OmfConnection>, ApiClientError> {
        self.record(Call::ListConnections);
        Ok(next_scripted(&self.listings).unwrap_or_default())
    }
}

#[async_trait]
impl OmfTransport for FakeBackend {
    async fn send_omf_message(&self, message: SerializedOmfMessage) -> Result<(), ApiClientError> {
        let key = (message.headers.message_type, message.headers.action);
        self.record(Call::Omf(key.0, key.1));

        if key.0 == MessageType::Data {
            let sent = {
                let mut sent_at = self.data_sent_at.lock().unwrap();
                sent_at.push(Instant::now());
                sent_at.len()
            };
            if self.fail_data_send == Some(sent) {
                return Err(transport_error("data send failed"));
            }
        }
        if self.fail_omf.contains(&key) {
            return Err(transport_error("omf message rejected"));
        }
        Ok(())
    }
}

pub fn settings() -> AppSettings {
    AppSettings::from_json_str(
        r#"{
            "TenantId": "tenant",
            "NamespaceId": "ns",
            "Resource": "https://example.com",
            "ClientId": "admin",
            "ClientSecret": "admin-secret",
            "ConnectionName": "sample",
            "StreamId": "stream-1",
            "DeviceClientId": "device",
            "DeviceClientSecret": "device-secret"
        }"#,
    )
    .expect("test settings should parse")
}
