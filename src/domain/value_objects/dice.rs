//! Dice expressions and statblock action text
//!
//! Monster actions arrive as free text with embedded dice notation, e.g.
//! `"Scimitar. Hit: 5 (1d6 + 2) slashing damage."`. The text is split once
//! into [`ActionSegment`]s so the UI can render roll buttons without
//! re-scanning the string on every render.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A dice expression in `NdS+M` notation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceExpression {
    pub count: u32,
    pub sides: u32,
    pub modifier: i32,
}

/// Errors raised while parsing a dice expression
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiceParseError {
    #[error("Dice expression is empty")]
    Empty,
    #[error("Malformed dice expression: {0}")]
    Malformed(String),
    #[error("Dice count must be between 1 and {max}, got {0}", max = DiceExpression::MAX_COUNT)]
    CountOutOfRange(u32),
    #[error("Dice sides must be between 1 and {max}, got {0}", max = DiceExpression::MAX_SIDES)]
    SidesOutOfRange(u32),
    #[error("Dice modifier must be within ±{max}, got {0}", max = DiceExpression::MAX_MODIFIER)]
    ModifierOutOfRange(i32),
}

/// The outcome of rolling a [`DiceExpression`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiceRoll {
    pub expression: DiceExpression,
    pub rolls: Vec<u32>,
    pub total: i32,
}

impl DiceExpression {
    pub const MAX_COUNT: u32 = 100;
    pub const MAX_SIDES: u32 = 1000;
    pub const MAX_MODIFIER: i32 = 10_000;

    pub fn new(count: u32, sides: u32, modifier: i32) -> Self {
        Self {
            count,
            sides,
            modifier,
        }
    }

    /// Parse a complete expression such as `"2d6+3"`, `"d20"` or `"1d8 - 1"`
    pub fn parse(input: &str) -> Result<Self, DiceParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(DiceParseError::Empty);
        }

        match scan_dice(trimmed) {
            Some((expression, consumed)) if consumed == trimmed.len() => {
                expression.validate()?;
                Ok(expression)
            }
            _ => Err(DiceParseError::Malformed(trimmed.to_string())),
        }
    }

    pub fn validate(&self) -> Result<(), DiceParseError> {
        if self.count == 0 || self.count > Self::MAX_COUNT {
            return Err(DiceParseError::CountOutOfRange(self.count));
        }
        if self.sides == 0 || self.sides > Self::MAX_SIDES {
            return Err(DiceParseError::SidesOutOfRange(self.sides));
        }
        if self.modifier.unsigned_abs() > Self::MAX_MODIFIER.unsigned_abs() {
            return Err(DiceParseError::ModifierOutOfRange(self.modifier));
        }
        Ok(())
    }

    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> DiceRoll {
        let sides = self.sides.max(1);
        let rolls: Vec<u32> = (0..self.count).map(|_| rng.gen_range(1..=sides)).collect();
        let sum: i64 = rolls.iter().map(|r| i64::from(*r)).sum();
        let total = (sum + i64::from(self.modifier)).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
        DiceRoll {
            expression: *self,
            rolls,
            total,
        }
    }
}

impl std::fmt::Display for DiceExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        match self.modifier {
            0 => Ok(()),
            m if m > 0 => write!(f, "+{}", m),
            m => write!(f, "{}", m),
        }
    }
}

impl std::str::FromStr for DiceExpression {
    type Err = DiceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Scan a dice expression at the start of `input`.
///
/// Returns the expression and the number of bytes consumed. Range checks are
/// left to [`DiceExpression::validate`].
fn scan_dice(input: &str) -> Option<(DiceExpression, usize)> {
    let bytes = input.as_bytes();
    let count_end = digits_end(bytes, 0);
    let count = if count_end == 0 {
        1
    } else {
        input[..count_end].parse().ok()?
    };

    if !matches!(bytes.get(count_end), Some(b'd') | Some(b'D')) {
        return None;
    }
    let sides_start = count_end + 1;
    let sides_end = digits_end(bytes, sides_start);
    if sides_end == sides_start {
        return None;
    }
    let sides = input[sides_start..sides_end].parse().ok()?;
    let without_modifier = (DiceExpression::new(count, sides, 0), sides_end);

    let sign_at = skip_spaces(bytes, sides_end);
    let negative = match bytes.get(sign_at) {
        Some(b'+') => false,
        Some(b'-') => true,
        _ => return Some(without_modifier),
    };
    let modifier_start = skip_spaces(bytes, sign_at + 1);
    let modifier_end = digits_end(bytes, modifier_start);
    if modifier_end == modifier_start
        || bytes.get(modifier_end).is_some_and(|b| b.is_ascii_alphanumeric())
    {
        // "1d6 - 1d4" is two expressions, not a modifier
        return Some(without_modifier);
    }
    let magnitude: i32 = match input[modifier_start..modifier_end].parse() {
        Ok(value) => value,
        Err(_) => return Some(without_modifier),
    };
    let modifier = if negative { -magnitude } else { magnitude };

    Some((DiceExpression::new(count, sides, modifier), modifier_end))
}

fn digits_end(bytes: &[u8], start: usize) -> usize {
    let mut end = start;
    while bytes.get(end).is_some_and(|b| b.is_ascii_digit()) {
        end += 1;
    }
    end
}

fn skip_spaces(bytes: &[u8], start: usize) -> usize {
    let mut end = start;
    while bytes.get(end) == Some(&b' ') {
        end += 1;
    }
    end
}

/// A piece of action text: either prose or an embedded dice expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionSegment {
    PlainText {
        text: String,
    },
    Dice {
        /// The original notation as written, e.g. `"1d6 + 2"`
        text: String,
        expression: DiceExpression,
    },
}

impl ActionSegment {
    pub fn text(&self) -> &str {
        match self {
            Self::PlainText { text } | Self::Dice { text, .. } => text,
        }
    }
}

/// Free-text action description parsed into segments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionText {
    pub segments: Vec<ActionSegment>,
}

impl ActionText {
    pub fn parse(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut segments = Vec::new();
        let mut plain_start = 0;
        let mut i = 0;

        while i < bytes.len() {
            let starts_token = i == 0 || !bytes[i - 1].is_ascii_alphanumeric();
            let candidate = bytes[i].is_ascii_digit() || bytes[i] == b'd' || bytes[i] == b'D';

            if starts_token && candidate {
                if let Some((expression, consumed)) = scan_dice(&text[i..]) {
                    let end = i + consumed;
                    let ends_token = bytes.get(end).map_or(true, |b| !b.is_ascii_alphanumeric());
                    if ends_token && expression.validate().is_ok() {
                        if plain_start < i {
                            segments.push(ActionSegment::PlainText {
                                text: text[plain_start..i].to_string(),
                            });
                        }
                        segments.push(ActionSegment::Dice {
                            text: text[i..end].to_string(),
                            expression,
                        });
                        i = end;
                        plain_start = end;
                        continue;
                    }
                }
            }
            i += 1;
        }

        if plain_start < bytes.len() {
            segments.push(ActionSegment::PlainText {
                text: text[plain_start..].to_string(),
            });
        }

        Self { segments }
    }

    /// Reassemble the original text
    pub fn render(&self) -> String {
        self.segments.iter().map(ActionSegment::text).collect()
    }

    pub fn dice(&self) -> impl Iterator<Item = &DiceExpression> {
        self.segments.iter().filter_map(|segment| match segment {
            ActionSegment::Dice { expression, .. } => Some(expression),
            ActionSegment::PlainText { .. } => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_parse_dice_expressions() {
        assert_eq!(DiceExpression::parse("2d6+3").unwrap(), DiceExpression::new(2, 6, 3));
        assert_eq!(DiceExpression::parse("d20").unwrap(), DiceExpression::new(1, 20, 0));
        assert_eq!(DiceExpression::parse(" 1D8 - 1 ").unwrap(), DiceExpression::new(1, 8, -1));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(DiceExpression::parse("   "), Err(DiceParseError::Empty));
        assert!(matches!(DiceExpression::parse("2d"), Err(DiceParseError::Malformed(_))));
        assert!(matches!(DiceExpression::parse("2d6+"), Err(DiceParseError::Malformed(_))));
        assert!(matches!(DiceExpression::parse("fireball"), Err(DiceParseError::Malformed(_))));
        assert_eq!(DiceExpression::parse("0d6"), Err(DiceParseError::CountOutOfRange(0)));
        assert_eq!(DiceExpression::parse("1d0"), Err(DiceParseError::SidesOutOfRange(0)));
        assert_eq!(DiceExpression::parse("101d6"), Err(DiceParseError::CountOutOfRange(101)));
    }

    #[test]
    fn test_modifier_is_bounded() {
        assert_eq!(
            DiceExpression::parse("1d6+2147483647"),
            Err(DiceParseError::ModifierOutOfRange(i32::MAX))
        );
        assert_eq!(
            DiceExpression::parse("1d6 - 10001"),
            Err(DiceParseError::ModifierOutOfRange(-10_001))
        );
        assert_eq!(
            DiceExpression::parse("1d6+10000").unwrap().modifier,
            DiceExpression::MAX_MODIFIER
        );

        // Unvalidated expressions saturate instead of overflowing
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(DiceExpression::new(1, 6, i32::MAX).roll(&mut rng).total, i32::MAX);
        let low = DiceExpression::new(1, 6, i32::MIN).roll(&mut rng).total;
        assert!((i32::MIN + 1..=i32::MIN + 6).contains(&low));
    }

    #[test]
    fn test_display() {
        assert_eq!(DiceExpression::new(2, 6, 3).to_string(), "2d6+3");
        assert_eq!(DiceExpression::new(1, 8, -1).to_string(), "1d8-1");
        assert_eq!(DiceExpression::new(1, 20, 0).to_string(), "1d20");
    }

    #[test]
    fn test_roll_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let expression = DiceExpression::new(3, 6, 2);
        for _ in 0..200 {
            let roll = expression.roll(&mut rng);
            assert_eq!(roll.rolls.len(), 3);
            assert!(roll.rolls.iter().all(|r| (1..=6).contains(r)));
            assert!((5..=20).contains(&roll.total));
        }
    }

    #[test]
    fn test_action_text_segments() {
        let text = "Scimitar. Melee Weapon Attack: +4 to hit, reach 5 ft. Hit: 5 (1d6 + 2) slashing damage.";
        let action = ActionText::parse(text);

        let dice: Vec<_> = action.dice().copied().collect();
        assert_eq!(dice, vec![DiceExpression::new(1, 6, 2)]);
        assert_eq!(action.render(), text);
        assert!(matches!(
            &action.segments[1],
            ActionSegment::Dice { text, .. } if text == "1d6 + 2"
        ));
    }

    #[test]
    fn test_action_text_ignores_words_and_splits_chained_dice() {
        let action = ActionText::parse("Deals 1d6 - 1d4 damage, add d8 to hit");
        let dice: Vec<_> = action.dice().copied().collect();
        assert_eq!(
            dice,
            vec![
                DiceExpression::new(1, 6, 0),
                DiceExpression::new(1, 4, 0),
                DiceExpression::new(1, 8, 0),
            ]
        );

        let plain = ActionText::parse("The dragon advances 40d feet");
        assert_eq!(plain.dice().count(), 0);
        assert_eq!(plain.segments.len(), 1);
    }
}
