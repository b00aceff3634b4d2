//! Modifier reduction strategies.
//!
//! One pure, stateless reduction per modifier kind. A strategy consumes
//! the modifiers of its kind present on a property and folds them into the
//! running value; an empty modifier set is always a no-op at that step
//! (Add/AfterAdd contribute 0, Mul/PriorityMul contribute ×1,
//! PriorityAdd/Override/Clamp contribute nothing).

use crate::context::EngineContext;
use crate::modifier::{Modifier, ModifierPayload};

/// Trait for per-kind modifier reductions.
///
/// Strategies are stateless and therefore safely shared across all
/// properties of an engine instance. The property hands each strategy the
/// modifiers of its kind in insertion order, together with the running
/// value accumulated by the lower-precedence kinds.
///
/// # Examples
///
/// ```rust
/// use modstat::{AddStrategy, EngineContext, Modifier, ModifierKind, ModifierStrategy};
///
/// let ctx = EngineContext::with_seed(0);
/// let mods = [
///     Modifier::scalar(ModifierKind::Add, 0, 10.0),
///     Modifier::scalar(ModifierKind::Add, 0, 5.0),
/// ];
/// assert_eq!(AddStrategy.apply(100.0, &mods, &ctx), 115.0);
/// ```
pub trait ModifierStrategy: Send + Sync + std::fmt::Debug {
    /// Fold the given modifiers into `input` and return the new value.
    ///
    /// `modifiers` holds only modifiers of this strategy's kind, in the
    /// order they were added to the property. Range payloads are resolved
    /// through `ctx`.
    fn apply(&self, input: f64, modifiers: &[Modifier], ctx: &EngineContext) -> f64;
}

/// Select the modifier that wins a priority contest.
///
/// Highest priority wins. On a priority tie a scalar payload beats a range
/// payload; a full tie keeps the earliest-inserted modifier.
fn select_highest_priority(modifiers: &[Modifier]) -> Option<&Modifier> {
    let mut best: Option<&Modifier> = None;
    for m in modifiers {
        match best {
            None => best = Some(m),
            Some(b) => {
                let wins = m.priority() > b.priority()
                    || (m.priority() == b.priority()
                        && m.payload().is_scalar()
                        && !b.payload().is_scalar());
                if wins {
                    best = Some(m);
                }
            }
        }
    }
    best
}

/// Sums every payload into the running value.
#[derive(Debug)]
pub struct AddStrategy;

impl ModifierStrategy for AddStrategy {
    fn apply(&self, input: f64, modifiers: &[Modifier], ctx: &EngineContext) -> f64 {
        modifiers
            .iter()
            .fold(input, |acc, m| acc + m.payload().resolve(ctx))
    }
}

/// Adds only the highest-priority payload.
#[derive(Debug)]
pub struct PriorityAddStrategy;

impl ModifierStrategy for PriorityAddStrategy {
    fn apply(&self, input: f64, modifiers: &[Modifier], ctx: &EngineContext) -> f64 {
        match select_highest_priority(modifiers) {
            Some(m) => input + m.payload().resolve(ctx),
            None => input,
        }
    }
}

/// Multiplies the running value by every payload.
#[derive(Debug)]
pub struct MulStrategy;

impl ModifierStrategy for MulStrategy {
    fn apply(&self, input: f64, modifiers: &[Modifier], ctx: &EngineContext) -> f64 {
        modifiers
            .iter()
            .fold(input, |acc, m| acc * m.payload().resolve(ctx))
    }
}

/// Multiplies by only the highest-priority payload.
#[derive(Debug)]
pub struct PriorityMulStrategy;

impl ModifierStrategy for PriorityMulStrategy {
    fn apply(&self, input: f64, modifiers: &[Modifier], ctx: &EngineContext) -> f64 {
        match select_highest_priority(modifiers) {
            Some(m) => input * m.payload().resolve(ctx),
            None => input,
        }
    }
}

/// Sums every payload into the running value, after the multiplicative
/// steps have run.
///
/// The reduction is identical to [`AddStrategy`]; only its position in
/// [`ModifierKind::APPLY_ORDER`](crate::ModifierKind::APPLY_ORDER)
/// differs.
#[derive(Debug)]
pub struct AfterAddStrategy;

impl ModifierStrategy for AfterAddStrategy {
    fn apply(&self, input: f64, modifiers: &[Modifier], ctx: &EngineContext) -> f64 {
        modifiers
            .iter()
            .fold(input, |acc, m| acc + m.payload().resolve(ctx))
    }
}

/// Replaces the running value with the highest-priority payload,
/// discarding everything computed so far.
#[derive(Debug)]
pub struct OverrideStrategy;

impl ModifierStrategy for OverrideStrategy {
    fn apply(&self, input: f64, modifiers: &[Modifier], ctx: &EngineContext) -> f64 {
        match select_highest_priority(modifiers) {
            Some(m) => m.payload().resolve(ctx),
            None => input,
        }
    }
}

/// Bounds the running value into the highest-priority range payload.
///
/// Clamp only accepts range payloads; scalar modifiers of this kind are
/// ignored.
#[derive(Debug)]
pub struct ClampStrategy;

impl ModifierStrategy for ClampStrategy {
    fn apply(&self, input: f64, modifiers: &[Modifier], _ctx: &EngineContext) -> f64 {
        let ranges: Vec<Modifier> = modifiers
            .iter()
            .filter(|m| !m.payload().is_scalar())
            .copied()
            .collect();
        match select_highest_priority(&ranges) {
            Some(m) => match m.payload() {
                ModifierPayload::Range { lo, hi } => input.clamp(lo, hi),
                ModifierPayload::Scalar(_) => input,
            },
            None => input,
        }
    }
}
