mod auth;

pub use auth::AuthenticationHandler;

use crate::api::{ApiClientError, ErrorKind, ServiceSettings};
use crate::omf::message::SerializedOmfMessage;
use crate::omf::model::{OmfConnection, OmfConnectionCreate, OmfConnections};
use crate::omf::{IngressService, OmfTransport};
use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, RequestBuilder, Response};
use serde::de::DeserializeOwned;

/// The `HttpClient` struct talks to one tenant/namespace of the ingestion service as one client
/// identity. It implements both the administrative [`IngressService`] and the device
/// [`OmfTransport`]; the sample builds one of each with different credentials.
///
/// Properties:
///
/// * `namespace_url`: `{resource}/api/{version}/Tenants/{tenant}/Namespaces/{namespace}`, the
/// root every REST path is built under.
/// * `client`: The reqwest client; it applies the settings' `request_timeout` to every request.
/// * `auth`: Supplies the bearer token for every request.
pub struct HttpClient {
    namespace_url: url::Url,
    client: ReqwestClient,
    auth: AuthenticationHandler,
}

impl HttpClient {
    pub fn new(settings: ServiceSettings) -> Result<HttpClient, ApiClientError> {
        let resource = url::Url::parse(&settings.resource).map_err(|e| {
            ApiClientError::new(
                ErrorKind::Config,
                line!(),
                &format!("invalid resource url {}: {}", settings.resource, e),
            )
        })?;

        let token_url = with_segments(&resource, &["identity", "connect", "token"])?;
        let namespace_url = with_segments(
            &resource,
            &[
                "api",
                settings.api_version.as_str(),
                "Tenants",
                settings.tenant_id.as_str(),
                "Namespaces",
                settings.namespace_id.as_str(),
            ],
        )?;

        let client = ReqwestClient::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| ApiClientError::new(ErrorKind::Transport, line!(), &e.to_string()))?;
        let auth = AuthenticationHandler::new(
            token_url,
            &settings.client_id,
            &settings.client_secret,
        );

        Ok(HttpClient {
            namespace_url,
            client,
            auth,
        })
    }

    pub fn namespace_url(&self) -> &url::Url {
        &self.namespace_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<url::Url, ApiClientError> {
        with_segments(&self.namespace_url, segments)
    }

    /// Attaches the bearer token, sends the request and maps any non-success status to an error.
    async fn execute(&self, request: RequestBuilder) -> Result<Response, ApiClientError> {
        let token = self.auth.access_token(&self.client).await?;
        let response = match request.bearer_auth(token).send().await {
            Ok(resp) => resp,
            Err(e) => {
                log::warn!("Request send failure: {}", e);
                return Err(ApiClientError::new(
                    ErrorKind::Transport,
                    line!(),
                    &e.to_string(),
                ));
            }
        };

        if response.status().is_success() {
            log::debug!("Request successful");
            Ok(response)
        } else {
            let status = response.status().as_u16();
            log::warn!("Request failure: {}", status);
            let body = response.text().await.unwrap_or_default();
            Err(ApiClientError::status(status, &body))
        }
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiClientError> {
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiClientError::new(ErrorKind::Transport, line!(), &e.to_string()))?;
        Ok(serde_json::from_slice(&body)?)
    }
}

fn with_segments(base: &url::Url, segments: &[&str]) -> Result<url::Url, ApiClientError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| {
            ApiClientError::new(
                ErrorKind::Config,
                line!(),
                &format!("{} cannot be used as a base url", base),
            )
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[async_trait]
impl IngressService for HttpClient {
    async fn begin_create_connection(
        &self,
        spec: &OmfConnectionCreate,
    ) -> Result<OmfConnection, ApiClientError> {
        let url = self.endpoint(&["OmfConnections"])?;
        log::debug!("Creating connection {} at [{}]", spec.name, url);
        let response = self.execute(self.client.post(url).json(spec)).await?;
        Self::read_json(response).await
    }

    async fn get_connection(&self, id: &str) -> Result<OmfConnection, ApiClientError> {
        let url = self.endpoint(&["OmfConnections", id])?;
        let response = self.execute(self.client.get(url)).await?;
        Self::read_json(response).await
    }

    async fn begin_delete_connection(&self, id: &str) -> Result<(), ApiClientError> {
        let url = self.endpoint(&["OmfConnections", id])?;
        log::debug!("Deleting connection at [{}]", url);
        self.execute(self.client.delete(url)).await?;
        Ok(())
    }

    async fn list_connections(&self) -> Result<Vec<OmfConnection>, ApiClientError> {
        let url = self.endpoint(&["OmfConnections"])?;
        let response = self.execute(self.client.get(url)).await?;
        let listing: OmfConnections = Self::read_json(response).await?;
        Ok(listing.into_results())
    }
}

#[async_trait]
impl OmfTransport for HttpClient {
    async fn send_omf_message(&self, message: SerializedOmfMessage) -> Result<(), ApiClientError> {
        let url = self.endpoint(&["omf"])?;
        let mut request = self
            .client
            .post(url)
            .header("Content-Type", "application/json");
        for (name, value) in message.headers.pairs() {
            request = request.header(name, value);
        }

        log::debug!("Sending a standard (uncompressed) payload");
        self.execute(request.body(message.body)).await?;
        Ok(())
    }
}
