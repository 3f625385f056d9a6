//! Combatant entity - a player, NPC or monster taking part in an encounter
//!
//! Hit points are private so every change goes through [`Combatant::apply_hp`],
//! which keeps `hp` inside `[0, max_hp]`. Restored state is clamped the same way.

use serde::{Deserialize, Serialize};

use crate::domain::services::xp_for_challenge_rating;
use crate::domain::value_objects::{CombatantId, Condition};

/// Who a combatant is fighting for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatantKind {
    Player,
    Npc,
    Monster,
}

impl Default for CombatantKind {
    fn default() -> Self {
        Self::Npc
    }
}

/// Direction of a hit point change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HpChangeKind {
    Damage,
    Heal,
}

/// Result of applying damage or healing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HpChange {
    pub combatant_id: CombatantId,
    pub previous_hp: i32,
    pub hp: i32,
    /// hp went from above zero to zero
    pub knocked_out: bool,
    /// hp went from zero to above zero
    pub revived: bool,
}

/// A participant in the current encounter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "CombatantRecord")]
pub struct Combatant {
    pub id: CombatantId,
    pub name: String,
    pub kind: CombatantKind,
    /// Turn order value, higher acts first
    pub initiative: i32,
    /// Added to every initiative roll
    pub initiative_modifier: i32,
    hp: i32,
    max_hp: i32,
    pub armor_class: i32,
    conditions: Vec<Condition>,
    /// Experience awarded for defeating this combatant
    pub xp_value: u32,
}

impl Combatant {
    pub const UNKNOWN_NAME: &'static str = "Unknown";

    /// Create a combatant at full health. Blank names become "Unknown" and
    /// `max_hp` is raised to at least 1.
    pub fn new(name: impl Into<String>, kind: CombatantKind, max_hp: i32) -> Self {
        let name = name.into();
        let name = if name.trim().is_empty() {
            Self::UNKNOWN_NAME.to_string()
        } else {
            name.trim().to_string()
        };
        let max_hp = max_hp.max(1);

        Self {
            id: CombatantId::new(),
            name,
            kind,
            initiative: 0,
            initiative_modifier: 0,
            hp: max_hp,
            max_hp,
            armor_class: 10,
            conditions: Vec::new(),
            xp_value: 0,
        }
    }

    pub fn with_initiative(mut self, initiative: i32) -> Self {
        self.initiative = initiative;
        self
    }

    pub fn with_initiative_modifier(mut self, modifier: i32) -> Self {
        self.initiative_modifier = modifier;
        self
    }

    pub fn with_armor_class(mut self, armor_class: i32) -> Self {
        self.armor_class = armor_class;
        self
    }

    pub fn with_xp_value(mut self, xp_value: u32) -> Self {
        self.xp_value = xp_value;
        self
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn has_condition(&self, condition_id: &str) -> bool {
        self.conditions.iter().any(|c| c.id == condition_id)
    }

    pub fn is_defeated(&self) -> bool {
        self.hp == 0
    }

    /// A monster that still counts toward encounter difficulty
    pub fn is_living_monster(&self) -> bool {
        self.kind == CombatantKind::Monster && self.hp > 0
    }

    /// Apply damage or healing. The sign of `amount` is ignored; `kind`
    /// decides the direction. The result is clamped to `[0, max_hp]`.
    pub fn apply_hp(&mut self, amount: i32, kind: HpChangeKind) -> HpChange {
        let previous_hp = self.hp;
        let magnitude = i64::from(amount.unsigned_abs());
        let raw = match kind {
            HpChangeKind::Damage => i64::from(previous_hp) - magnitude,
            HpChangeKind::Heal => i64::from(previous_hp) + magnitude,
        };
        self.hp = raw.clamp(0, i64::from(self.max_hp)) as i32;

        HpChange {
            combatant_id: self.id,
            previous_hp,
            hp: self.hp,
            knocked_out: previous_hp > 0 && self.hp == 0,
            revived: previous_hp == 0 && self.hp > 0,
        }
    }

    /// Add the condition if absent, otherwise remove it.
    /// Returns whether the condition is present afterwards.
    pub fn toggle_condition(&mut self, condition: Condition) -> bool {
        if let Some(pos) = self.conditions.iter().position(|c| *c == condition) {
            self.conditions.remove(pos);
            false
        } else {
            self.conditions.push(condition);
            true
        }
    }
}

/// Wire shape of a persisted combatant, normalized on the way in
#[derive(Deserialize)]
struct CombatantRecord {
    id: CombatantId,
    name: String,
    kind: CombatantKind,
    #[serde(default)]
    initiative: i32,
    #[serde(default)]
    initiative_modifier: i32,
    hp: i32,
    max_hp: i32,
    #[serde(default)]
    armor_class: i32,
    #[serde(default)]
    conditions: Vec<Condition>,
    #[serde(default)]
    xp_value: u32,
}

impl From<CombatantRecord> for Combatant {
    fn from(record: CombatantRecord) -> Self {
        let max_hp = record.max_hp.max(1);
        let mut conditions: Vec<Condition> = Vec::with_capacity(record.conditions.len());
        for condition in record.conditions {
            if !conditions.contains(&condition) {
                conditions.push(condition);
            }
        }

        Self {
            id: record.id,
            name: record.name,
            kind: record.kind,
            initiative: record.initiative,
            initiative_modifier: record.initiative_modifier,
            hp: record.hp.clamp(0, max_hp),
            max_hp,
            armor_class: record.armor_class,
            conditions,
            xp_value: record.xp_value,
        }
    }
}

/// Loosely-typed input for adding a combatant; every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCombatant {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub kind: Option<CombatantKind>,
    #[serde(default)]
    pub max_hp: Option<i32>,
    #[serde(default)]
    pub armor_class: Option<i32>,
    #[serde(default)]
    pub initiative: Option<i32>,
    #[serde(default)]
    pub initiative_modifier: Option<i32>,
    #[serde(default)]
    pub xp_value: Option<u32>,
    /// Used for `xp_value` when no explicit value is given, e.g. "1/4" or "5"
    #[serde(default)]
    pub challenge_rating: Option<String>,
}

impl NewCombatant {
    pub fn into_combatant(self) -> Combatant {
        let xp_value = self.xp_value.unwrap_or_else(|| {
            self.challenge_rating
                .as_deref()
                .and_then(xp_for_challenge_rating)
                .unwrap_or(0)
        });

        let mut combatant = Combatant::new(
            self.name.unwrap_or_default(),
            self.kind.unwrap_or_default(),
            self.max_hp.unwrap_or(1),
        )
        .with_initiative(self.initiative.unwrap_or(0))
        .with_initiative_modifier(self.initiative_modifier.unwrap_or(0))
        .with_xp_value(xp_value);

        if let Some(armor_class) = self.armor_class {
            combatant = combatant.with_armor_class(armor_class);
        }
        combatant
    }
}
