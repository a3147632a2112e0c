use crate::core::{ActorId, ClassProfile, Position};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Runtime session bound to a live actor that has no real client behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub session_id: Uuid,
    pub attached_at: DateTime<Utc>,
}

impl SessionContext {
    pub fn detached() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            attached_at: Utc::now(),
        }
    }
}

/// Live runtime state of one actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveActor {
    pub id: ActorId,
    pub name: String,
    pub class: Option<ClassProfile>,
    pub level: i64,
    pub position: Position,
    /// Current activity label, e.g. `IDLE` or the controller's label.
    pub state_label: String,
    pub attacking: bool,
    pub casting: bool,
    pub controller: Option<String>,
    pub session: Option<SessionContext>,
}

impl LiveActor {
    pub fn new(id: ActorId, name: impl Into<String>, class: Option<ClassProfile>, level: i64) -> Self {
        Self {
            id,
            name: name.into(),
            class,
            level,
            position: Position::default(),
            state_label: "IDLE".to_string(),
            attacking: false,
            casting: false,
            controller: None,
            session: None,
        }
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn is_busy(&self) -> bool {
        self.attacking || self.casting
    }
}
