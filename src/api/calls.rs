use axum::Json;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::{Rng, distr::Alphanumeric};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use crate::errors::ApiError;
use crate::server::AppState;
use crate::shared_types::RoomId;

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

const DEFAULT_CUSTOMER_NAME: &str = "고객";
const DEFAULT_AGENT_NAME: &str = "상담원";

const STATUS_WAITING: &str = "waiting";
const STATUS_COMPLETED: &str = "completed";

// -----------------------------------------------------------------------------
// ----- CallRecord ------------------------------------------------------------

/// Bookkeeping for one customer/agent call. Purely informational: nothing in
/// the signaling path reads these.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    pub session_id: String,
    pub room_id: RoomId,
    pub customer_name: String,
    pub agent_name: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    pub participants: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCall {
    pub room_id: Option<RoomId>,
    pub customer_name: Option<String>,
    pub agent_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CallUpdate {
    pub status: Option<String>,
    pub participants: Option<Vec<Value>>,
}

// -----------------------------------------------------------------------------
// ----- CallStore -------------------------------------------------------------

/// In-memory, insertion-ordered. Ended calls stay listed with status
/// `completed`.
#[derive(Debug, Default)]
pub struct CallStore {
    records: Mutex<Vec<CallRecord>>,
}

impl CallStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, new: NewCall) -> Result<CallRecord, ApiError> {
        let room_id = new
            .room_id
            .ok_or_else(|| ApiError::BadRequest("roomId is required".into()))?;

        let now = Utc::now();
        let record = CallRecord {
            session_id: call_id(now),
            room_id,
            customer_name: non_empty_or(new.customer_name, DEFAULT_CUSTOMER_NAME),
            agent_name: non_empty_or(new.agent_name, DEFAULT_AGENT_NAME),
            status: STATUS_WAITING.to_string(),
            created_at: now,
            updated_at: None,
            ended_at: None,
            participants: Vec::new(),
        };

        self.records.lock().push(record.clone());
        Ok(record)
    }

    pub fn list(&self) -> Vec<CallRecord> {
        self.records.lock().clone()
    }

    pub fn get(&self, id: &str) -> Option<CallRecord> {
        self.records
            .lock()
            .iter()
            .find(|r| r.session_id == id)
            .cloned()
    }

    pub fn update(&self, id: &str, update: CallUpdate) -> Option<CallRecord> {
        self.modify(id, |record| {
            if let Some(status) = update.status.filter(|s| !s.is_empty()) {
                record.status = status;
            }
            if let Some(participants) = update.participants {
                record.participants = participants;
            }
            record.updated_at = Some(Utc::now());
        })
    }

    pub fn end(&self, id: &str) -> Option<CallRecord> {
        self.modify(id, |record| {
            record.status = STATUS_COMPLETED.to_string();
            record.ended_at = Some(Utc::now());
        })
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn modify(&self, id: &str, apply: impl FnOnce(&mut CallRecord)) -> Option<CallRecord> {
        let mut records = self.records.lock();
        let record = records.iter_mut().find(|r| r.session_id == id)?;
        apply(record);
        Some(record.clone())
    }
}

// -----------------------------------------------------------------------------
// ----- Handlers --------------------------------------------------------------

pub async fn create_call(
    State(state): State<AppState>,
    Json(new): Json<NewCall>,
) -> Result<Json<Value>, ApiError> {
    let record = state.calls.create(new)?;
    info!(call_id = %record.session_id, room_id = %record.room_id, "call registered");

    Ok(Json(json!({ "success": true, "session": record })))
}

pub async fn list_calls(State(state): State<AppState>) -> Json<Value> {
    let sessions = state.calls.list();
    Json(json!({
        "success": true,
        "count": sessions.len(),
        "sessions": sessions,
    }))
}

pub async fn get_call(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let record = state.calls.get(&id).ok_or_else(not_found)?;
    Ok(Json(json!({ "success": true, "session": record })))
}

pub async fn update_call(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<CallUpdate>,
) -> Result<Json<Value>, ApiError> {
    let record = state.calls.update(&id, update).ok_or_else(not_found)?;
    Ok(Json(json!({ "success": true, "session": record })))
}

pub async fn end_call(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let record = state.calls.end(&id).ok_or_else(not_found)?;
    info!(call_id = %id, "call ended");

    Ok(Json(json!({
        "success": true,
        "message": "session ended",
        "session": record,
    })))
}

// -----------------------------------------------------------------------------
// ----- Internal: Helpers -----------------------------------------------------

fn call_id(now: DateTime<Utc>) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();

    format!("session_{}_{suffix}", now.timestamp_millis())
}

fn non_empty_or(value: Option<String>, fallback: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

fn not_found() -> ApiError {
    ApiError::NotFound("session not found".into())
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn new_call(room: u64) -> NewCall {
        NewCall {
            room_id: Some(RoomId(room)),
            ..NewCall::default()
        }
    }

    #[test]
    fn create_fills_defaults() {
        let store = CallStore::new();
        let record = store.create(new_call(100)).unwrap();

        assert!(record.session_id.starts_with("session_"));
        assert_eq!(record.customer_name, DEFAULT_CUSTOMER_NAME);
        assert_eq!(record.agent_name, DEFAULT_AGENT_NAME);
        assert_eq!(record.status, "waiting");
        assert!(record.participants.is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn create_without_room_is_a_bad_request() {
        let store = CallStore::new();
        let err = store.create(NewCall::default()).unwrap_err();

        assert!(matches!(err, ApiError::BadRequest(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn update_touches_only_supplied_fields() {
        let store = CallStore::new();
        let id = store.create(new_call(5)).unwrap().session_id;

        let record = store
            .update(
                &id,
                CallUpdate {
                    status: None,
                    participants: Some(vec![json!("agent-1")]),
                },
            )
            .unwrap();

        assert_eq!(record.status, "waiting");
        assert_eq!(record.participants, vec![json!("agent-1")]);
        assert!(record.updated_at.is_some());
        assert!(store.update("session_missing", CallUpdate::default()).is_none());
    }

    #[test]
    fn end_keeps_the_record() {
        let store = CallStore::new();
        let id = store.create(new_call(5)).unwrap().session_id;

        let ended = store.end(&id).unwrap();

        assert_eq!(ended.status, "completed");
        assert!(ended.ended_at.is_some());
        assert_eq!(store.get(&id), Some(ended));
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn record_serializes_in_camel_case() {
        let store = CallStore::new();
        let record = store.create(new_call(42)).unwrap();
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["roomId"], "42");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("endedAt").is_none());
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
