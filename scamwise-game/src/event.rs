//! Structured events emitted by the session state machine.
//!
//! The journal replaces presentation side effects (toasts, confetti, tones)
//! with data: the shell reads the event stream and decides how to surface
//! each entry. Events never influence core state.

use serde::{Deserialize, Serialize};

/// Mechanical event kind emitted by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    SessionStarted,
    AnswerEvaluated,
    LevelUp,
    SkillLevelUp,
    AchievementUnlocked,
    ToolUsed,
    SessionCompleted,
    SessionRestarted,
}

/// Severity tier for a session event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSeverity {
    Info,
    Warning,
}

/// Structured journal entry with an ordered sequence number and a JSON
/// payload for downstream rendering and debugging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEvent {
    /// 0-based position in the session's event stream.
    pub seq: u32,
    pub kind: EventKind,
    pub severity: EventSeverity,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub payload: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_roundtrip_through_json() {
        let event = SessionEvent {
            seq: 3,
            kind: EventKind::AchievementUnlocked,
            severity: EventSeverity::Info,
            payload: serde_json::json!({ "id": "first_blood", "xp": 50 }),
        };

        let json = serde_json::to_string(&event).expect("serialize");
        let restored: SessionEvent = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, event);
    }

    #[test]
    fn null_payload_is_omitted_from_serialization() {
        let event = SessionEvent {
            seq: 0,
            kind: EventKind::SessionStarted,
            severity: EventSeverity::Info,
            payload: serde_json::Value::Null,
        };
        let json = serde_json::to_string(&event).expect("serialize");
        assert!(!json.contains("payload"));
    }
}
