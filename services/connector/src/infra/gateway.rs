//! Remote-network access through the MTProto gateway sidecar.
//!
//! The gateway terminates the actual network protocol and exposes a small
//! REST surface per connected client. This adapter owns the mapping from
//! the gateway's error envelopes onto the [`ConnectorError`] taxonomy, so
//! nothing above it ever sees a transport error.

use anyhow::Context as _;
use async_trait::async_trait;
use serde::Deserialize;

use tessera_domain::identity::{AccountIdentity, ExportedCredential};
use tessera_domain::message::{InboundMessage, MessageSource};

use crate::domain::ports::{RemoteAccountClient, RemoteAccountConnector, SignInOutcome};
use crate::domain::types::ChallengeHandle;
use crate::error::ConnectorError;

#[derive(Clone)]
pub struct GatewayConnector {
    http: reqwest::Client,
    base_url: String,
}

impl GatewayConnector {
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }
}

#[derive(Deserialize)]
struct ClientCreated {
    client_id: String,
}

#[async_trait]
impl RemoteAccountConnector for GatewayConnector {
    async fn connect(&self) -> Result<Box<dyn RemoteAccountClient>, ConnectorError> {
        let response = self
            .http
            .post(format!("{}/v1/clients", self.base_url))
            .send()
            .await
            .map_err(transport_error)?;
        let created: ClientCreated = into_payload(response).await?;
        Ok(Box::new(GatewayClient {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            client_id: created.client_id,
        }))
    }

    async fn resume(
        &self,
        credential: &ExportedCredential,
    ) -> Result<Box<dyn RemoteAccountClient>, ConnectorError> {
        let response = self
            .http
            .post(format!("{}/v1/clients/resume", self.base_url))
            .json(&serde_json::json!({ "credential": credential }))
            .send()
            .await
            .map_err(transport_error)?;
        let created: ClientCreated = into_payload(response).await?;
        Ok(Box::new(GatewayClient {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            client_id: created.client_id,
        }))
    }
}

/// One gateway-side client connection, addressed by its id.
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
}

impl GatewayClient {
    fn url(&self, tail: &str) -> String {
        format!("{}/v1/clients/{}/{tail}", self.base_url, self.client_id)
    }
}

#[derive(Deserialize)]
struct CodeRequested {
    challenge: String,
}

#[derive(Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum SignInResponse {
    Authenticated { identity: AccountIdentity },
    PasswordRequired,
}

#[derive(Deserialize)]
struct SessionExported {
    credential: String,
}

#[async_trait]
impl RemoteAccountClient for GatewayClient {
    async fn request_code(&self, phone: &str) -> Result<ChallengeHandle, ConnectorError> {
        let response = self
            .http
            .post(self.url("code-requests"))
            .json(&serde_json::json!({ "phone": phone }))
            .send()
            .await
            .map_err(transport_error)?;
        let requested: CodeRequested = into_payload(response).await?;
        Ok(ChallengeHandle(requested.challenge))
    }

    async fn sign_in_with_code(
        &self,
        challenge: &ChallengeHandle,
        code: &str,
    ) -> Result<SignInOutcome, ConnectorError> {
        let response = self
            .http
            .post(self.url("sign-in"))
            .json(&serde_json::json!({ "challenge": challenge.0, "code": code }))
            .send()
            .await
            .map_err(transport_error)?;
        let signed_in: SignInResponse = into_payload(response).await?;
        Ok(match signed_in {
            SignInResponse::Authenticated { identity } => SignInOutcome::Authenticated(identity),
            SignInResponse::PasswordRequired => SignInOutcome::PasswordRequired,
        })
    }

    async fn sign_in_with_password(
        &self,
        password: &str,
    ) -> Result<AccountIdentity, ConnectorError> {
        let response = self
            .http
            .post(self.url("password"))
            .json(&serde_json::json!({ "password": password }))
            .send()
            .await
            .map_err(transport_error)?;
        into_payload(response).await
    }

    async fn export_session(&self) -> Result<ExportedCredential, ConnectorError> {
        let response = self
            .http
            .post(self.url("export"))
            .send()
            .await
            .map_err(transport_error)?;
        let exported: SessionExported = into_payload(response).await?;
        Ok(ExportedCredential(exported.credential))
    }

    async fn read_recent_messages(
        &self,
        source: MessageSource,
        limit: usize,
    ) -> Result<Vec<InboundMessage>, ConnectorError> {
        let limit = limit.to_string();
        let response = self
            .http
            .get(self.url("messages"))
            .query(&[("source", source.as_str()), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(transport_error)?;
        into_payload(response).await
    }

    async fn disconnect(&self) {
        let result = self
            .http
            .delete(format!("{}/v1/clients/{}", self.base_url, self.client_id))
            .send()
            .await;
        if let Err(err) = result {
            tracing::debug!(error = %err, "gateway disconnect failed, connection will expire server-side");
        }
    }
}

/// Gateway error envelope. `kind` values mirror the connector taxonomy.
#[derive(Deserialize)]
struct GatewayError {
    kind: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    retry_after: Option<u64>,
}

fn transport_error(err: reqwest::Error) -> ConnectorError {
    ConnectorError::RemoteUnavailable(anyhow::Error::new(err).context("gateway request failed"))
}

/// Decode a success payload, or translate the gateway's error envelope.
async fn into_payload<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ConnectorError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .context("malformed gateway response")
            .map_err(ConnectorError::Internal);
    }
    let envelope = response
        .json::<GatewayError>()
        .await
        .map_err(|err| ConnectorError::RemoteUnavailable(anyhow::Error::new(err).context("unreadable gateway error")))?;
    Err(map_gateway_error(status, envelope))
}

fn map_gateway_error(status: reqwest::StatusCode, envelope: GatewayError) -> ConnectorError {
    match envelope.kind.as_str() {
        "INVALID_PHONE_NUMBER" => ConnectorError::InvalidPhoneNumber,
        "INVALID_CODE" => ConnectorError::InvalidCode,
        "CODE_EXPIRED" => ConnectorError::CodeExpired,
        "INVALID_PASSWORD" => ConnectorError::InvalidPassword,
        "RATE_LIMITED" => ConnectorError::RateLimited(envelope.retry_after.unwrap_or(60)),
        kind => ConnectorError::RemoteUnavailable(anyhow::anyhow!(
            "gateway error {status}: {kind} {}",
            envelope.message
        )),
    }
}
