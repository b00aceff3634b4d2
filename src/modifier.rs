//! Modifier types module.
//!
//! A `Modifier` is an immutable value carrier: a kind, a priority, and a
//! scalar or range payload. Modifiers are plain values (`Copy`), so adding
//! the same logical modifier to several properties always hands each
//! property its own instance.

use crate::context::EngineContext;
use serde::{Deserialize, Serialize};

/// The kind of a modifier, which selects its reduction strategy.
///
/// Kinds are applied in a fixed precedence order regardless of the order
/// modifiers were added, so stacking is deterministic and replay-safe.
/// `Override` and `Clamp` always act last, reliably replacing or bounding
/// whatever the earlier steps accumulated.
///
/// # Examples
///
/// ```rust
/// use modstat::ModifierKind;
///
/// assert_eq!(ModifierKind::APPLY_ORDER[0], ModifierKind::Add);
/// assert_eq!(ModifierKind::APPLY_ORDER[6], ModifierKind::Clamp);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierKind {
    /// Flat addition; all payloads of this kind are summed.
    Add,
    /// Highest-priority-wins addition; a single payload is added.
    PriorityAdd,
    /// Multiplication; all payloads of this kind are multiplied.
    Mul,
    /// Highest-priority-wins multiplication; a single payload multiplies.
    PriorityMul,
    /// Flat addition applied after the multiplicative steps.
    AfterAdd,
    /// Replaces the accumulated value with the highest-priority payload.
    Override,
    /// Bounds the value into the highest-priority range payload.
    Clamp,
}

impl ModifierKind {
    /// The fixed precedence order in which kinds are folded into a value.
    ///
    /// Each kind fully folds in all modifiers of that kind before the next
    /// kind applies to the result.
    pub const APPLY_ORDER: [ModifierKind; 7] = [
        ModifierKind::Add,
        ModifierKind::PriorityAdd,
        ModifierKind::Mul,
        ModifierKind::PriorityMul,
        ModifierKind::AfterAdd,
        ModifierKind::Override,
        ModifierKind::Clamp,
    ];
}

/// The payload of a modifier: a single scalar or a numeric range.
///
/// Range payloads are resolved at recompute time by drawing a uniform
/// sample in `[lo, hi]` for arithmetic kinds, or used as literal bounds
/// for `Clamp`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ModifierPayload {
    /// A fixed scalar value.
    Scalar(f64),
    /// An inclusive numeric interval `[lo, hi]`.
    Range { lo: f64, hi: f64 },
}

impl ModifierPayload {
    /// Whether this payload is a scalar.
    pub fn is_scalar(&self) -> bool {
        matches!(self, ModifierPayload::Scalar(_))
    }

    /// Resolve the payload to a concrete value.
    ///
    /// Scalars return themselves; ranges draw a uniform sample from the
    /// context's random source. Callers cache the folded result, so a
    /// range is sampled once per recompute rather than once per read.
    pub fn resolve(&self, ctx: &EngineContext) -> f64 {
        match *self {
            ModifierPayload::Scalar(v) => v,
            ModifierPayload::Range { lo, hi } => ctx.sample_range(lo, hi),
        }
    }
}

/// A typed, prioritized adjustment applied to a property's value.
///
/// Equality is structural (kind, priority, payload), which is what
/// [`Property::remove_modifier`](crate::Property::remove_modifier) matches
/// against.
///
/// # Examples
///
/// ```rust
/// use modstat::{Modifier, ModifierKind};
///
/// let flat = Modifier::scalar(ModifierKind::Add, 0, 25.0);
/// let roll = Modifier::range(ModifierKind::Add, 0, 1.0, 6.0);
/// let cap = Modifier::range(ModifierKind::Clamp, 0, 0.0, 100.0);
///
/// assert_eq!(flat, Modifier::scalar(ModifierKind::Add, 0, 25.0));
/// assert_ne!(flat, roll);
/// assert_eq!(cap.priority(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    kind: ModifierKind,
    priority: i32,
    payload: ModifierPayload,
}

impl Modifier {
    /// Create a modifier with a scalar payload.
    ///
    /// `priority` is only consulted by the `Priority*`, `Override` and
    /// `Clamp` kinds; pass 0 for the plain arithmetic kinds.
    pub fn scalar(kind: ModifierKind, priority: i32, value: f64) -> Self {
        Self {
            kind,
            priority,
            payload: ModifierPayload::Scalar(value),
        }
    }

    /// Create a modifier with a range payload.
    ///
    /// The bounds are normalized so `lo <= hi`.
    pub fn range(kind: ModifierKind, priority: i32, lo: f64, hi: f64) -> Self {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        Self {
            kind,
            priority,
            payload: ModifierPayload::Range { lo, hi },
        }
    }

    /// The kind of this modifier.
    pub fn kind(&self) -> ModifierKind {
        self.kind
    }

    /// The priority of this modifier.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// The payload of this modifier.
    pub fn payload(&self) -> ModifierPayload {
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EngineContext;

    #[test]
    fn test_structural_equality() {
        let a = Modifier::scalar(ModifierKind::Add, 1, 10.0);
        let b = Modifier::scalar(ModifierKind::Add, 1, 10.0);
        let c = Modifier::scalar(ModifierKind::Add, 2, 10.0);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_range_normalized() {
        let m = Modifier::range(ModifierKind::Add, 0, 5.0, 1.0);
        assert_eq!(
            m.payload(),
            ModifierPayload::Range { lo: 1.0, hi: 5.0 }
        );
    }

    #[test]
    fn test_scalar_resolve_ignores_rng() {
        let ctx = EngineContext::with_seed(1);
        let payload = ModifierPayload::Scalar(42.0);
        assert_eq!(payload.resolve(&ctx), 42.0);
    }

    #[test]
    fn test_range_resolve_within_bounds() {
        let ctx = EngineContext::with_seed(1);
        let payload = ModifierPayload::Range { lo: 2.0, hi: 7.0 };
        for _ in 0..32 {
            let v = payload.resolve(&ctx);
            assert!((2.0..=7.0).contains(&v));
        }
    }

    #[test]
    fn test_degenerate_range_resolve() {
        let ctx = EngineContext::with_seed(1);
        let payload = ModifierPayload::Range { lo: 3.0, hi: 3.0 };
        assert_eq!(payload.resolve(&ctx), 3.0);
    }

    #[test]
    fn test_apply_order_covers_all_kinds() {
        let order = ModifierKind::APPLY_ORDER;
        assert_eq!(order.len(), 7);
        for kind in [
            ModifierKind::Add,
            ModifierKind::PriorityAdd,
            ModifierKind::Mul,
            ModifierKind::PriorityMul,
            ModifierKind::AfterAdd,
            ModifierKind::Override,
            ModifierKind::Clamp,
        ] {
            assert!(order.contains(&kind));
        }
    }

    #[test]
    fn test_serde_round_trip() {
        let m = Modifier::range(ModifierKind::Clamp, 3, 0.0, 50.0);
        let json = serde_json::to_string(&m).unwrap();
        let back: Modifier = serde_json::from_str(&json).unwrap();
        assert_eq!(m, back);
    }
}
