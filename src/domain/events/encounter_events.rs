//! Encounter events - outbound notifications of encounter state changes
//!
//! Sibling features (music cues, loot prompts, XP awards) react to these
//! instead of reaching into the encounter directly. Events are emitted after
//! the change has been persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{CombatantKind, HpChange};
use crate::domain::value_objects::{CombatantId, Condition, EventId};

/// Base data for all events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMetadata {
    pub event_id: EventId,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
}

impl Default for EventMetadata {
    fn default() -> Self {
        Self {
            event_id: EventId::new(),
            timestamp: Utc::now(),
        }
    }
}

/// All encounter events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EncounterEvent {
    CombatantAdded {
        metadata: EventMetadata,
        combatant_id: CombatantId,
        name: String,
        kind: CombatantKind,
    },

    CombatantRemoved {
        metadata: EventMetadata,
        combatant_id: CombatantId,
        name: String,
    },

    /// Initiative was committed or re-sorted; `order` is the new turn order
    InitiativeCommitted {
        metadata: EventMetadata,
        order: Vec<CombatantId>,
        active_id: Option<CombatantId>,
    },

    TurnAdvanced {
        metadata: EventMetadata,
        round: u32,
        turn_index: usize,
        active_id: CombatantId,
        new_round: bool,
    },

    HpChanged {
        metadata: EventMetadata,
        change: HpChange,
    },

    /// A combatant dropped to 0 hp
    CombatantKnockedOut {
        metadata: EventMetadata,
        combatant_id: CombatantId,
        name: String,
        kind: CombatantKind,
    },

    ConditionToggled {
        metadata: EventMetadata,
        combatant_id: CombatantId,
        condition: Condition,
        active: bool,
    },

    EncounterEnded {
        metadata: EventMetadata,
        removed: Vec<CombatantId>,
    },
}

impl EncounterEvent {
    pub fn metadata(&self) -> &EventMetadata {
        match self {
            Self::CombatantAdded { metadata, .. }
            | Self::CombatantRemoved { metadata, .. }
            | Self::InitiativeCommitted { metadata, .. }
            | Self::TurnAdvanced { metadata, .. }
            | Self::HpChanged { metadata, .. }
            | Self::CombatantKnockedOut { metadata, .. }
            | Self::ConditionToggled { metadata, .. }
            | Self::EncounterEnded { metadata, .. } => metadata,
        }
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::CombatantAdded { .. } => "combatant_added",
            Self::CombatantRemoved { .. } => "combatant_removed",
            Self::InitiativeCommitted { .. } => "initiative_committed",
            Self::TurnAdvanced { .. } => "turn_advanced",
            Self::HpChanged { .. } => "hp_changed",
            Self::CombatantKnockedOut { .. } => "combatant_knocked_out",
            Self::ConditionToggled { .. } => "condition_toggled",
            Self::EncounterEnded { .. } => "encounter_ended",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = EncounterEvent::TurnAdvanced {
            metadata: EventMetadata::default(),
            round: 3,
            turn_index: 1,
            active_id: CombatantId::new(),
            new_round: false,
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "turn_advanced");
        assert_eq!(json["round"], 3);
        assert_eq!(event.name(), "turn_advanced");
        assert_eq!(json["metadata"]["event_id"], event.metadata().event_id.to_string());
    }
}
