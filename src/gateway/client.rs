use std::time::Duration;

use rand::{Rng, distr::Alphanumeric};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::GatewayError;

use super::ids::{GatewayScope, GatewaySessionId, HandleId};
use super::reply::GatewayReply;
use super::request::{GatewayRequest, VIDEOROOM_PLUGIN};

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

const TRANSACTION_LEN: usize = 12;

// -----------------------------------------------------------------------------
// ----- GatewaySettings -------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub base_url: String,
    pub api_secret: Option<SecretString>,
    pub request_timeout: Duration,
    pub accept_invalid_certs: bool,
}

// -----------------------------------------------------------------------------
// ----- GatewayClient ---------------------------------------------------------

/// HTTP client for the SFU gateway's RPC endpoint. Cheap to clone; clones
/// share the connection pool. No retries: the caller decides what a failure
/// means for its operation.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
    api_secret: Option<SecretString>,
    request_timeout: Duration,
}

#[derive(Serialize)]
struct Envelope<'a> {
    #[serde(flatten)]
    request: &'a GatewayRequest,
    transaction: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    apisecret: Option<&'a str>,
}

// -----------------------------------------------------------------------------
// ----- GatewayClient: Static -------------------------------------------------

impl GatewayClient {
    pub fn new(settings: GatewaySettings) -> Result<Self, GatewayError> {
        if settings.accept_invalid_certs {
            warn!("gateway certificate verification is disabled");
        }

        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .build()?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_secret: settings.api_secret,
            request_timeout: settings.request_timeout,
        })
    }
}

// -----------------------------------------------------------------------------
// ----- GatewayClient: Public -------------------------------------------------

impl GatewayClient {
    /// Sends one request and classifies the reply. Bounded by the configured
    /// request timeout.
    pub async fn invoke(
        &self,
        scope: GatewayScope,
        request: GatewayRequest,
    ) -> Result<GatewayReply, GatewayError> {
        let transaction = transaction_id();
        let url = format!("{}{}", self.base_url, scope.path_suffix());
        let envelope = Envelope {
            request: &request,
            transaction: &transaction,
            apisecret: self.api_secret.as_ref().map(|s| s.expose_secret()),
        };

        debug!(janus = request.kind(), %transaction, %url, "gateway request");

        let exchange = async {
            let response = self.http.post(&url).json(&envelope).send().await?;
            let status = response.status();
            let text = response.text().await?;
            Ok::<_, GatewayError>((status, text))
        };

        let (status, text) = tokio::time::timeout(self.request_timeout, exchange)
            .await
            .map_err(|_| GatewayError::Timeout(self.request_timeout))??;

        let body: Value = serde_json::from_str(&text).map_err(|_| {
            GatewayError::UnexpectedReply(format!("HTTP {status} without a JSON body"))
        })?;

        let reply = GatewayReply::classify(body)?;
        debug!(janus = reply.kind(), %transaction, "gateway reply");

        Ok(reply)
    }

    pub async fn create_session(&self) -> Result<GatewaySessionId, GatewayError> {
        let reply = self
            .invoke(GatewayScope::Root, GatewayRequest::create())
            .await?;
        reply.created_id().map(GatewaySessionId)
    }

    pub async fn attach_videoroom(
        &self,
        session: GatewaySessionId,
    ) -> Result<HandleId, GatewayError> {
        let reply = self
            .invoke(
                GatewayScope::Session(session),
                GatewayRequest::attach(VIDEOROOM_PLUGIN),
            )
            .await?;
        reply.created_id().map(HandleId)
    }

    pub async fn destroy_session(&self, session: GatewaySessionId) -> Result<(), GatewayError> {
        self.invoke(GatewayScope::Session(session), GatewayRequest::destroy())
            .await
            .map(|_| ())
    }

    pub async fn message(
        &self,
        session: GatewaySessionId,
        handle: HandleId,
        body: Value,
        jsep: Option<Value>,
    ) -> Result<GatewayReply, GatewayError> {
        self.invoke(
            GatewayScope::Handle(session, handle),
            GatewayRequest::message(body, jsep),
        )
        .await
    }

    pub async fn trickle(
        &self,
        session: GatewaySessionId,
        handle: HandleId,
        candidate: Value,
    ) -> Result<(), GatewayError> {
        self.invoke(
            GatewayScope::Handle(session, handle),
            GatewayRequest::trickle(candidate),
        )
        .await
        .map(|_| ())
    }
}

// -----------------------------------------------------------------------------
// ----- Internal: Helpers -----------------------------------------------------

fn transaction_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TRANSACTION_LEN)
        .map(char::from)
        .collect()
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
