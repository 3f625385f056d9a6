//! Value objects - Immutable objects defined by their attributes

mod condition;
mod dice;
mod ids;

pub use condition::Condition;
pub use dice::{ActionText, DiceExpression, DiceRoll};
pub use ids::*;
