use std::fmt;

use serde::{Deserialize, Serialize};

// -----------------------------------------------------------------------------
// ----- Gateway Identifiers ---------------------------------------------------

/// Session allocated by the gateway's `create` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GatewaySessionId(pub u64);

/// Plugin handle allocated by the gateway's `attach` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandleId(pub u64);

impl fmt::Display for GatewaySessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// -----------------------------------------------------------------------------
// ----- GatewayScope ----------------------------------------------------------

/// Which gateway resource a request is addressed to. Maps onto the URL path
/// below the gateway base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayScope {
    Root,
    Session(GatewaySessionId),
    Handle(GatewaySessionId, HandleId),
}

impl GatewayScope {
    pub fn path_suffix(&self) -> String {
        match self {
            GatewayScope::Root => String::new(),
            GatewayScope::Session(session) => format!("/{session}"),
            GatewayScope::Handle(session, handle) => format!("/{session}/{handle}"),
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
