//! Party member entity - a player character as seen by the difficulty classifier

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::PartyMemberId;

/// A member of the adventuring party
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyMember {
    pub id: PartyMemberId,
    pub name: String,
    /// Character level, 1 through 20
    pub level: u8,
    /// Only active members count toward encounter thresholds
    pub active: bool,
}

impl PartyMember {
    pub const MIN_LEVEL: u8 = 1;
    pub const MAX_LEVEL: u8 = 20;

    pub fn new(name: impl Into<String>, level: u8) -> Self {
        Self {
            id: PartyMemberId::new(),
            name: name.into(),
            level: Self::clamp_level(level),
            active: true,
        }
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn set_level(&mut self, level: u8) {
        self.level = Self::clamp_level(level);
    }

    pub fn clamp_level(level: u8) -> u8 {
        level.clamp(Self::MIN_LEVEL, Self::MAX_LEVEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_is_clamped() {
        assert_eq!(PartyMember::new("Aria", 0).level, 1);
        assert_eq!(PartyMember::new("Aria", 25).level, 20);

        let mut member = PartyMember::new("Borin", 3);
        member.set_level(21);
        assert_eq!(member.level, 20);
        assert!(member.active);
        assert!(!member.inactive().active);
    }
}
