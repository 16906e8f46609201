//! The static credit cost table.
//!
//! Costs depend only on the kind of generation. They are never scaled by the
//! number of variations a client asks for.

use crate::types::GenerationKind;

/// Largest `variations` value a generation request may carry.
pub const MAX_VARIATIONS: u32 = 4;

impl GenerationKind {
    /// Credits charged for a single successful generation of this kind.
    #[must_use]
    pub const fn credit_cost(self) -> i32 {
        match self {
            Self::Prompt => 1,
            Self::StyleReference => 2,
        }
    }
}
