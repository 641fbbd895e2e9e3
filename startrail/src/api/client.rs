//! REST client for the Startrail control plane
//!
//! One request per lifecycle call, no retries. Non-200 service replies
//! are returned to the caller rather than turned into errors here, so
//! the lifecycle layer can translate remote diagnostics first.

use super::service::{Service, ServiceEnvelope};
use super::wellknown::{Device, TokenResponse, WellKnownAuth};
use reqwest::{Client as HttpClient, ClientBuilder, Method};
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const USER_AGENT: &str = concat!("startrail-terraform-provider/", env!("CARGO_PKG_VERSION"));

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to decode response body: {0}")]
    Decode(String),
}

#[derive(Clone)]
pub struct Client {
    http: HttpClient,
    base_url: String,
    authorization: String,
    debug: bool,
}

/// Service endpoint reply: the parsed envelope plus status and raw body
/// for error reporting.
#[derive(Debug)]
pub struct ServiceResponse {
    pub status: u16,
    pub body: String,
    pub envelope: ServiceEnvelope,
}

#[derive(Debug)]
pub struct WellKnownResponse {
    pub status: u16,
    pub auth: WellKnownAuth,
}

#[derive(Debug)]
pub struct TokenReply {
    pub status: u16,
    pub body: String,
    pub token: Option<TokenResponse>,
}

impl Client {
    pub fn new(endpoint: &Url, authorization: String, debug: bool) -> Result<Self, ApiError> {
        Self::with_timeout(endpoint, authorization, debug, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        endpoint: &Url,
        authorization: String,
        debug: bool,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = ClientBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: endpoint.as_str().trim_end_matches('/').to_string(),
            authorization,
            debug,
        })
    }

    pub async fn get_service(
        &self,
        tenant: &str,
        environment: &str,
        name: &str,
    ) -> Result<ServiceResponse, ApiError> {
        let url = self.service_url(tenant, environment, name);
        tracing::debug!("GET {}", url);

        let response = self.request(Method::GET, url).send().await?;
        self.service_response(response).await
    }

    pub async fn create_service(&self, service: &Service) -> Result<ServiceResponse, ApiError> {
        let url = format!("{}/v1/services", self.base_url);
        if self.debug {
            tracing::debug!(
                body = %serde_json::to_string(service).unwrap_or_default(),
                "POST {}",
                url
            );
        } else {
            tracing::debug!("POST {}", url);
        }

        let response = self.request(Method::POST, url).json(service).send().await?;
        self.service_response(response).await
    }

    pub async fn delete_service(
        &self,
        tenant: &str,
        environment: &str,
        name: &str,
    ) -> Result<ServiceResponse, ApiError> {
        let url = self.service_url(tenant, environment, name);
        tracing::debug!("DELETE {}", url);

        let response = self.request(Method::DELETE, url).send().await?;
        self.service_response(response).await
    }

    /// Device-flow discovery. Unauthenticated; callers decide what a
    /// non-200 status means.
    pub async fn well_known_auth(&self) -> Result<WellKnownResponse, ApiError> {
        let url = format!("{}/.well-known/auth", self.base_url);
        tracing::debug!("GET {}", url);

        let response = self.request(Method::GET, url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        let auth = if status == 200 {
            serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))?
        } else {
            WellKnownAuth::default()
        };

        Ok(WellKnownResponse { status, auth })
    }

    /// Exchanges a refresh token at the discovered token endpoint.
    pub async fn refresh_access_token(
        &self,
        device: &Device,
        refresh_token: &str,
    ) -> Result<TokenReply, ApiError> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", device.client_id.as_str()),
        ];
        tracing::debug!("POST {}", device.token_url);

        let response = self.http.post(&device.token_url).form(&params).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        let token = if status == 200 {
            Some(serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))?)
        } else {
            None
        };

        Ok(TokenReply {
            status,
            body,
            token,
        })
    }

    fn service_url(&self, tenant: &str, environment: &str, name: &str) -> String {
        format!(
            "{}/v1/tenants/{}/environments/{}/services/{}",
            self.base_url,
            urlencoding::encode(tenant),
            urlencoding::encode(environment),
            urlencoding::encode(name)
        )
    }

    fn request(&self, method: Method, url: String) -> reqwest::RequestBuilder {
        let mut request = self.http.request(method, url);
        if !self.authorization.is_empty() {
            request = request.header(reqwest::header::AUTHORIZATION, &self.authorization);
        }
        request
    }

    async fn service_response(
        &self,
        response: reqwest::Response,
    ) -> Result<ServiceResponse, ApiError> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        if self.debug {
            tracing::debug!(status, body = %body, "service response");
        } else {
            tracing::debug!(status, "service response");
        }

        // A 200 must carry a valid envelope. Anything else may be an
        // arbitrary error page; keep the raw body for diagnostics.
        let envelope = match serde_json::from_str::<ServiceEnvelope>(&body) {
            Ok(envelope) => envelope,
            Err(e) if status == 200 => return Err(ApiError::Decode(e.to_string())),
            Err(_) => ServiceEnvelope::default(),
        };

        Ok(ServiceResponse {
            status,
            body,
            envelope,
        })
    }
}
