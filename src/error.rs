//! Error types for property evaluation.
//!
//! All errors that can occur while evaluating properties and combine
//! nodes are represented by the `StatError` enum.

use crate::modifier::ModifierKind;
use crate::property_id::PropertyId;
use thiserror::Error;

/// Format a cycle path as a readable string.
fn format_cycle_path(path: &[PropertyId]) -> String {
    if path.is_empty() {
        return String::from("(empty cycle)");
    }
    path.iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Errors that can occur during property evaluation.
///
/// # Examples
///
/// ```rust
/// use modstat::{PropertyId, StatError};
///
/// let err = StatError::PropertyNotFound(PropertyId::from_str("Buff"));
/// println!("{}", err); // "Property not found: Buff"
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StatError {
    /// No strategy is registered for a modifier kind.
    ///
    /// Unreachable with a registry built via
    /// [`StrategyRegistry::with_builtins`](crate::StrategyRegistry::with_builtins);
    /// a hand-assembled registry that misses a kind triggers this at the
    /// first `get_value()` that encounters a modifier of that kind.
    #[error("No strategy registered for modifier kind {kind:?}")]
    UnknownModifierKind { kind: ModifierKind },

    /// A combine node was asked for a child property it does not hold.
    ///
    /// Recoverable: callers usually treat this as "feature not wired" and
    /// skip the operation.
    #[error("Property not found: {0}")]
    PropertyNotFound(PropertyId),

    /// A reducer read its own result, directly or transitively.
    ///
    /// Contains the path of property ids involved in the cycle; the first
    /// and last entries are the property whose evaluation re-entered.
    #[error("Cycle detected: {}", format_cycle_path(.path))]
    CycleDetected { path: Vec<PropertyId> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_not_found_display() {
        let err = StatError::PropertyNotFound(PropertyId::from_str("Buff"));
        assert!(err.to_string().contains("Buff"));
    }

    #[test]
    fn test_unknown_kind_display() {
        let err = StatError::UnknownModifierKind {
            kind: ModifierKind::Clamp,
        };
        assert!(err.to_string().contains("Clamp"));
    }

    #[test]
    fn test_cycle_display() {
        let a = PropertyId::from_str("A");
        let b = PropertyId::from_str("B");
        let err = StatError::CycleDetected {
            path: vec![a.clone(), b.clone(), a.clone()],
        };
        let display = err.to_string();
        assert!(display.contains("Cycle detected"));
        assert!(display.contains("A -> B -> A"));
    }
}
