use serde_json::Value;

use crate::errors::GatewayError;

// -----------------------------------------------------------------------------
// ----- GatewayReply ----------------------------------------------------------

/// A gateway reply that has already been classified as a success.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayReply {
    body: Value,
}

// -----------------------------------------------------------------------------
// ----- GatewayReply: Static --------------------------------------------------

impl GatewayReply {
    /// Splits a raw reply into success or `GatewayError::Rejected`.
    ///
    /// Two failure shapes exist: a top-level `"janus": "error"` with an
    /// `error.reason`, and a plugin reply whose `plugindata.data` carries
    /// `error` / `error_code` (the envelope itself says success there).
    pub fn classify(body: Value) -> Result<Self, GatewayError> {
        let Some(object) = body.as_object() else {
            return Err(GatewayError::UnexpectedReply(format!(
                "expected a JSON object, got {body}"
            )));
        };

        if object.get("janus").and_then(Value::as_str) == Some("error") {
            let error = object.get("error");
            return Err(GatewayError::Rejected {
                code: error.and_then(|e| e.get("code")).and_then(Value::as_i64),
                reason: error
                    .and_then(|e| e.get("reason"))
                    .and_then(Value::as_str)
                    .unwrap_or("Janus error")
                    .to_string(),
            });
        }

        let plugin_data = object.get("plugindata").and_then(|p| p.get("data"));
        if let Some(reason) = plugin_data
            .and_then(|d| d.get("error"))
            .and_then(Value::as_str)
        {
            return Err(GatewayError::Rejected {
                code: plugin_data
                    .and_then(|d| d.get("error_code"))
                    .and_then(Value::as_i64),
                reason: reason.to_string(),
            });
        }

        Ok(Self { body })
    }
}

// -----------------------------------------------------------------------------
// ----- GatewayReply: Public --------------------------------------------------

impl GatewayReply {
    pub fn kind(&self) -> &str {
        self.body
            .get("janus")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// `data.id` of a `create` or `attach` reply.
    pub fn created_id(&self) -> Result<u64, GatewayError> {
        self.body
            .get("data")
            .and_then(|d| d.get("id"))
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                GatewayError::UnexpectedReply(format!(
                    "'{}' reply without data.id",
                    self.kind()
                ))
            })
    }

    pub fn jsep(&self) -> Option<Value> {
        self.body.get("jsep").filter(|v| !v.is_null()).cloned()
    }

    pub fn into_body(self) -> Value {
        self.body
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
