use serde::Serialize;
use serde_json::Value;

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

pub const VIDEOROOM_PLUGIN: &str = "janus.plugin.videoroom";

// -----------------------------------------------------------------------------
// ----- GatewayRequest --------------------------------------------------------

/// One gateway RPC body, minus the per-call `transaction` and `apisecret`
/// fields which the client adds when sending.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayRequest {
    janus: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    plugin: Option<&'static str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    jsep: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    candidate: Option<Value>,
}

// -----------------------------------------------------------------------------
// ----- GatewayRequest: Static ------------------------------------------------

impl GatewayRequest {
    pub fn create() -> Self {
        Self::bare("create")
    }

    pub fn attach(plugin: &'static str) -> Self {
        Self {
            plugin: Some(plugin),
            ..Self::bare("attach")
        }
    }

    pub fn destroy() -> Self {
        Self::bare("destroy")
    }

    /// Plugin message; `body` is the plugin request, `jsep` an optional
    /// negotiation payload passed through untouched.
    pub fn message(body: Value, jsep: Option<Value>) -> Self {
        Self {
            body: Some(body),
            jsep,
            ..Self::bare("message")
        }
    }

    pub fn trickle(candidate: Value) -> Self {
        Self {
            candidate: Some(candidate),
            ..Self::bare("trickle")
        }
    }

    fn bare(janus: &'static str) -> Self {
        Self {
            janus,
            plugin: None,
            body: None,
            jsep: None,
            candidate: None,
        }
    }
}

// -----------------------------------------------------------------------------
// ----- GatewayRequest: Public ------------------------------------------------

impl GatewayRequest {
    pub fn kind(&self) -> &'static str {
        self.janus
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
