//! Status conditions that can be toggled on a combatant

use serde::{Deserialize, Serialize};

/// A reference to a status condition, keyed by `id`
///
/// Two conditions with the same id are the same condition regardless of the
/// display name, which lets the UI rename or localize entries freely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub id: String,
    pub name: String,
}

impl Condition {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Look up one of the standard conditions by id (case-insensitive)
    pub fn standard(id: &str) -> Option<Self> {
        let id = id.trim().to_lowercase();
        STANDARD_CONDITIONS
            .iter()
            .find(|(key, _)| *key == id)
            .map(|(key, name)| Self::new(*key, *name))
    }

    /// The full catalog of standard conditions
    pub fn catalog() -> Vec<Self> {
        STANDARD_CONDITIONS
            .iter()
            .map(|(id, name)| Self::new(*id, *name))
            .collect()
    }
}

impl PartialEq for Condition {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Condition {}

const STANDARD_CONDITIONS: &[(&str, &str)] = &[
    ("blinded", "Blinded"),
    ("charmed", "Charmed"),
    ("deafened", "Deafened"),
    ("exhaustion", "Exhaustion"),
    ("frightened", "Frightened"),
    ("grappled", "Grappled"),
    ("incapacitated", "Incapacitated"),
    ("invisible", "Invisible"),
    ("paralyzed", "Paralyzed"),
    ("petrified", "Petrified"),
    ("poisoned", "Poisoned"),
    ("prone", "Prone"),
    ("restrained", "Restrained"),
    ("stunned", "Stunned"),
    ("unconscious", "Unconscious"),
];
