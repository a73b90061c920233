use crate::api::{ApiClientError, ErrorKind, ServiceSettings};
use crate::lifecycle::PollSettings;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Settings for a sample run, read from an `appsettings` file.
///
/// Keys are PascalCase, matching the files the ingestion service's other samples ship with. The
/// first nine are required; the rest fall back to defaults.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AppSettings {
    pub tenant_id: String,
    pub namespace_id: String,
    pub resource: String,
    pub client_id: String,
    pub client_secret: String,
    pub connection_name: String,
    pub stream_id: String,
    pub device_client_id: String,
    pub device_client_secret: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_connection_description")]
    pub connection_description: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
    #[serde(default = "default_send_count")]
    pub send_count: u32,
    #[serde(default = "default_send_interval_ms")]
    pub send_interval_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_version() -> String {
    "v1".to_string()
}

fn default_connection_description() -> String {
    "This is a sample Connection".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_poll_timeout_secs() -> u64 {
    300
}

fn default_send_count() -> u32 {
    5
}

fn default_send_interval_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl AppSettings {
    /// Reads settings from `path`. Files ending in `.yaml` or `.yml` are parsed as YAML, anything
    /// else as JSON.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<AppSettings, ApiClientError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            config_error(&format!("cannot read {}: {}", path.display(), e))
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );
        let settings = if is_yaml {
            AppSettings::from_yaml_str(&contents)?
        } else {
            AppSettings::from_json_str(&contents)?
        };
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_yaml_str(contents: &str) -> Result<AppSettings, ApiClientError> {
        serde_yaml::from_str(contents).map_err(|e| config_error(&e.to_string()))
    }

    pub fn from_json_str(contents: &str) -> Result<AppSettings, ApiClientError> {
        serde_json::from_str(contents).map_err(|e| config_error(&e.to_string()))
    }

    /// Service settings for the administrative identity that manages connections.
    pub fn admin_settings(&self) -> ServiceSettings {
        self.service_settings(&self.client_id, &self.client_secret)
    }

    /// Service settings for the device identity that sends OMF.
    pub fn device_settings(&self) -> ServiceSettings {
        self.service_settings(&self.device_client_id, &self.device_client_secret)
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: Duration::from_millis(self.poll_interval_ms),
            timeout: Duration::from_secs(self.poll_timeout_secs),
        }
    }

    pub fn send_interval(&self) -> Duration {
        Duration::from_millis(self.send_interval_ms)
    }

    fn service_settings(&self, client_id: &str, client_secret: &str) -> ServiceSettings {
        ServiceSettings {
            resource: self.resource.clone(),
            tenant_id: self.tenant_id.clone(),
            namespace_id: self.namespace_id.clone(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            api_version: self.api_version.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

impl fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("AppSettings")
            .field("tenant_id", &self.tenant_id)
            .field("namespace_id", &self.namespace_id)
            .field("resource", &self.resource)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("connection_name", &self.connection_name)
            .field("stream_id", &self.stream_id)
            .field("device_client_id", &self.device_client_id)
            .field("device_client_secret", &"<redacted>")
            .field("api_version", &self.api_version)
            .field("connection_description", &self.connection_description)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("send_count", &self.send_count)
            .field("send_interval_ms", &self.send_interval_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

fn config_error(msg: &str) -> ApiClientError {
    ApiClientError::new(ErrorKind::Config, line!(), msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const JSON: &str = r#"{
        "TenantId": "tenant",
        "NamespaceId": "ns",
        "Resource": "https://example.com",
        "ClientId": "admin",
        "ClientSecret": "admin-secret",
        "ConnectionName": "sample",
        "StreamId": "stream-1",
        "DeviceClientId": "device",
        "DeviceClientSecret": "device-secret"
    }"#;

    #[test]
    fn loads_json_file_with_defaults() {
        let dir = tempdir().expect("failed to create temp dir for test");
        let path = dir.path().join("appsettings.json");
        fs::write(&path, JSON).unwrap();

        let settings = AppSettings::load(&path).expect("settings should load");
        assert_eq!(settings.stream_id, "stream-1");
        assert_eq!(settings.api_version, "v1");
        assert_eq!(settings.send_count, 5);
        assert_eq!(settings.poll_settings(), PollSettings::default());
        assert_eq!(settings.send_interval(), Duration::from_secs(1));
    }

    #[test]
    fn loads_yaml_file_with_overrides() {
        let dir = tempdir().expect("failed to create temp dir for test");
        let path = dir.path().join("appsettings.yaml");
        let yaml = r#"
TenantId: tenant
NamespaceId: ns
Resource: https://example.com
ClientId: admin
ClientSecret: admin-secret
ConnectionName: sample
StreamId: stream-1
DeviceClientId: device
DeviceClientSecret: device-secret
SendCount: 2
PollIntervalMs: 250
"#;
        fs::write(&path, yaml).unwrap();

        let settings = AppSettings::load(&path).expect("settings should load");
        assert_eq!(settings.send_count, 2);
        assert_eq!(settings.poll_settings().interval, Duration::from_millis(250));
    }

    #[test]
    fn splits_admin_and_device_identities() {
        let settings = AppSettings::from_json_str(JSON).unwrap();
        let admin = settings.admin_settings();
        let device = settings.device_settings();
        assert_eq!(admin.client_id, "admin");
        assert_eq!(device.client_id, "device");
        assert_eq!(device.client_secret, "device-secret");
        assert_eq!(admin.namespace_id, device.namespace_id);
    }

    #[test]
    fn missing_required_key_is_a_config_error() {
        let err = AppSettings::from_json_str(r#"{"TenantId": "tenant"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let dir = tempdir().expect("failed to create temp dir for test");
        let err = AppSettings::load(dir.path().join("nope.json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
