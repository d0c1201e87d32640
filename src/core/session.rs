use crate::adapters::http::{bearer, HttpTransport, TransportResponse};
use crate::config::domain_config::{DomainConfig, EndpointConfig};
use crate::domain::model::{DomainInfo, ImageFormat, MapRequest, MAP_SLICE_HEIGHT};
use crate::utils::error::{AuthStage, MapError, Result};
use reqwest::Method;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Credentials and tokens for one domain, filled in by [`DomainSession::authenticate`].
pub struct DomainSession {
    domain_id: String,
    account: String,
    password: String,
    map_endpoint: String,
    endpoints: EndpointConfig,
    transport: HttpTransport,
    posemesh_token: String,
    dds_token: String,
    domain_info: Option<DomainInfo>,
}

impl DomainSession {
    pub fn new(config: &DomainConfig) -> Self {
        Self {
            domain_id: config.domain.domain_id.clone(),
            account: config.domain.posemesh_account.clone(),
            password: config.domain.posemesh_password.clone(),
            map_endpoint: config.domain.map_endpoint.clone(),
            endpoints: config.endpoints.clone(),
            transport: HttpTransport::new(config.request_timeout()),
            posemesh_token: String::new(),
            dds_token: String::new(),
            domain_info: None,
        }
    }

    pub fn domain_id(&self) -> &str {
        &self.domain_id
    }

    pub fn domain_info(&self) -> Option<&DomainInfo> {
        self.domain_info.as_ref()
    }

    pub fn domain_server(&self) -> Option<&str> {
        self.domain_info
            .as_ref()
            .map(|info| info.domain_server.url.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        self.domain_info.is_some()
    }

    /// Runs the three-step bearer handshake. Stops at the first failing step.
    pub async fn authenticate(&mut self) -> Result<()> {
        tracing::info!("🔐 Authenticating posemesh account");
        let login_body = serde_json::json!({
            "email": self.account,
            "password": self.password,
        });
        let response = self
            .post_stage(
                AuthStage::PosemeshAccount,
                &self.endpoints.login_url(),
                &[
                    ("Content-Type", "application/json".to_string()),
                    ("Accept", "application/json".to_string()),
                ],
                Some(&login_body),
            )
            .await?;
        self.posemesh_token = parse_stage::<TokenResponse>(AuthStage::PosemeshAccount, &response)?
            .access_token;

        tracing::info!("🔐 Requesting domain access token");
        let response = self
            .post_stage(
                AuthStage::DomainDds,
                &self.endpoints.domains_access_token_url(),
                &[
                    ("Accept", "application/json".to_string()),
                    ("Authorization", bearer(&self.posemesh_token)),
                ],
                None,
            )
            .await?;
        self.dds_token =
            parse_stage::<TokenResponse>(AuthStage::DomainDds, &response)?.access_token;

        tracing::info!("🔐 Authenticating domain {}", self.domain_id);
        let response = self
            .post_stage(
                AuthStage::DomainAccess,
                &self.endpoints.domain_auth_url(&self.domain_id),
                &[
                    ("Accept", "application/json".to_string()),
                    ("Authorization", bearer(&self.dds_token)),
                ],
                None,
            )
            .await?;
        let domain_info = parse_stage::<DomainInfo>(AuthStage::DomainAccess, &response)?;

        tracing::info!(
            "✅ Domain {} authenticated, domain server: {}",
            self.domain_id,
            domain_info.domain_server.url
        );
        self.domain_info = Some(domain_info);
        Ok(())
    }

    async fn post_stage(
        &self,
        stage: AuthStage,
        url: &str,
        headers: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<TransportResponse> {
        match self
            .transport
            .send_request(Method::POST, url, headers, body)
            .await
        {
            Ok(response) if response.is_success() => Ok(response),
            Ok(response) => {
                tracing::warn!("❌ {} rejected with status {}", stage, response.status);
                Err(MapError::AuthenticationFailed { stage })
            }
            Err(e) => {
                tracing::warn!("❌ {} request failed: {}", stage, e);
                Err(MapError::AuthenticationFailed { stage })
            }
        }
    }

    /// Requests map generation and returns the raw multipart body.
    pub async fn fetch_map(&self, format: ImageFormat, resolution: f64) -> Result<String> {
        let domain_info = self.domain_info.as_ref().ok_or(MapError::NotAuthenticated)?;

        let request = MapRequest {
            domain_id: self.domain_id.clone(),
            domain_server_url: domain_info.domain_server.url.clone(),
            height: MAP_SLICE_HEIGHT,
            pixels_per_meter: resolution,
        };
        let body = serde_json::to_value(&request)?;

        tracing::info!(
            "🗺️ Requesting {} map for domain {} at {} px/m",
            format,
            self.domain_id,
            resolution
        );
        let response = self
            .transport
            .send_request(
                Method::POST,
                &self.map_endpoint,
                &[("Authorization", bearer(&domain_info.access_token))],
                Some(&body),
            )
            .await?;

        if !response.is_success() {
            tracing::error!("❌ Map request failed with status {}", response.status);
            return Err(MapError::MapFetchFailed {
                status: response.status.as_u16(),
            });
        }

        tracing::debug!("Received {} bytes of map payload", response.text.len());
        Ok(response.text)
    }
}

fn parse_stage<T: serde::de::DeserializeOwned>(
    stage: AuthStage,
    response: &TransportResponse,
) -> Result<T> {
    serde_json::from_str(&response.text).map_err(|e| {
        tracing::warn!("❌ {} returned an unexpected body: {}", stage, e);
        MapError::AuthenticationFailed { stage }
    })
}
