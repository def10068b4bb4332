//! Progress events emitted while a query is refined.
//!
//! The orchestrator reports each phase as a [`RunEvent`]. Emitters decide
//! what happens to them:
//! - [`BroadcastEmitter`]: fan-out over a tokio broadcast channel (CLI progress)
//! - [`CollectingEmitter`]: keep everything in memory (tests, reports)
//! - [`NullEmitter`]: discard

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Phases of a refinement run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunEventType {
    RunStart,
    Proximity,
    Generate,
    Validate,
    Rank,
    Evolve,
    Persist,
    Review,
    RunComplete,
    Error,
}

impl std::fmt::Display for RunEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::RunStart => "RUN_START",
            Self::Proximity => "PROXIMITY",
            Self::Generate => "GENERATE",
            Self::Validate => "VALIDATE",
            Self::Rank => "RANK",
            Self::Evolve => "EVOLVE",
            Self::Persist => "PERSIST",
            Self::Review => "REVIEW",
            Self::RunComplete => "RUN_COMPLETE",
            Self::Error => "ERROR",
        };
        write!(f, "{}", s)
    }
}

/// A progress event from one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEvent {
    pub run_id: Uuid,
    pub event_type: RunEventType,
    /// Cycle number, 0 outside the refinement loop
    pub cycle: u32,
    /// Human-readable description
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, Value>>,
    pub timestamp: DateTime<Utc>,
}

impl RunEvent {
    pub fn new(run_id: Uuid, event_type: RunEventType, cycle: u32, content: impl Into<String>) -> Self {
        Self {
            run_id,
            event_type,
            cycle,
            content: content.into(),
            metadata: None,
            timestamp: Utc::now(),
        }
    }

    /// Add metadata to the event.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn get_metadata(&self, key: &str) -> Option<&Value> {
        self.metadata.as_ref()?.get(key)
    }

    pub fn is_error(&self) -> bool {
        self.event_type == RunEventType::Error
    }

    /// Format as a single-line log entry.
    pub fn as_log_line(&self) -> String {
        let phase = if self.cycle > 0 {
            format!("cycle {} {}", self.cycle, self.event_type)
        } else {
            self.event_type.to_string()
        };
        format!(
            "[{}] {}: {}",
            self.timestamp.format("%H:%M:%S%.3f"),
            phase,
            self.content.lines().next().unwrap_or("")
        )
    }
}

/// Sink for run events.
pub trait EventEmitter: Send + Sync {
    fn emit(&self, event: RunEvent);
}

/// Broadcast-based emitter.
pub struct BroadcastEmitter {
    sender: broadcast::Sender<RunEvent>,
}

impl BroadcastEmitter {
    /// Create new broadcast emitter with channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RunEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl EventEmitter for BroadcastEmitter {
    fn emit(&self, event: RunEvent) {
        // No subscribers is fine
        let _ = self.sender.send(event);
    }
}

/// Emitter that stores events in a Vec.
#[derive(Debug, Default, Clone)]
pub struct CollectingEmitter {
    events: Arc<RwLock<Vec<RunEvent>>>,
}

impl CollectingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of collected events.
    pub fn events(&self) -> Vec<RunEvent> {
        self.events
            .read()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Collected events of one type.
    pub fn of_type(&self, event_type: RunEventType) -> Vec<RunEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }
}

impl EventEmitter for CollectingEmitter {
    fn emit(&self, event: RunEvent) {
        if let Ok(mut events) = self.events.write() {
            events.push(event);
        }
    }
}

/// Emitter that discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEmitter;

impl EventEmitter for NullEmitter {
    fn emit(&self, _event: RunEvent) {}
}
