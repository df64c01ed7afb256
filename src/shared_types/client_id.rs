use std::fmt;

use uuid::Uuid;

// -----------------------------------------------------------------------------
// ----- ClientId --------------------------------------------------------------

/// Identifies one live signaling connection. Assigned at connect, never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(String);

impl ClientId {
    pub fn generate() -> Self {
        Self(format!("client_{}", Uuid::now_v7()))
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
