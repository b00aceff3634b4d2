//! Strategy registry module.
//!
//! Maps each `ModifierKind` to the strategy that reduces modifiers of
//! that kind. The registry is built once per engine instance and shared
//! through the [`EngineContext`](crate::EngineContext); it is never
//! global state, so independent engines can carry different strategy
//! sets without interfering.

use crate::error::StatError;
use crate::modifier::ModifierKind;
use crate::strategy::{
    AddStrategy, AfterAddStrategy, ClampStrategy, ModifierStrategy, MulStrategy, OverrideStrategy,
    PriorityAddStrategy, PriorityMulStrategy,
};
use std::collections::HashMap;

/// Registry mapping modifier kinds to their reduction strategies.
///
/// Registering a kind twice silently replaces the earlier strategy (last
/// registration wins).
///
/// # Examples
///
/// ```rust
/// use modstat::{ModifierKind, StrategyRegistry};
///
/// let registry = StrategyRegistry::with_builtins();
/// assert!(registry.get(ModifierKind::Add).is_ok());
///
/// let empty = StrategyRegistry::new();
/// assert!(empty.get(ModifierKind::Add).is_err());
/// ```
pub struct StrategyRegistry {
    strategies: HashMap<ModifierKind, Box<dyn ModifierStrategy>>,
}

impl StrategyRegistry {
    /// Create an empty registry with no strategies.
    pub fn new() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// Create a registry with the built-in strategy for every kind.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(ModifierKind::Add, Box::new(AddStrategy));
        registry.register(ModifierKind::PriorityAdd, Box::new(PriorityAddStrategy));
        registry.register(ModifierKind::Mul, Box::new(MulStrategy));
        registry.register(ModifierKind::PriorityMul, Box::new(PriorityMulStrategy));
        registry.register(ModifierKind::AfterAdd, Box::new(AfterAddStrategy));
        registry.register(ModifierKind::Override, Box::new(OverrideStrategy));
        registry.register(ModifierKind::Clamp, Box::new(ClampStrategy));
        registry
    }

    /// Register a strategy for a kind, replacing any earlier registration.
    pub fn register(&mut self, kind: ModifierKind, strategy: Box<dyn ModifierStrategy>) {
        if self.strategies.insert(kind, strategy).is_some() {
            log::debug!("strategy registry: replaced strategy for {:?}", kind);
        }
    }

    /// Look up the strategy for a kind.
    ///
    /// # Returns
    ///
    /// * `Ok(&dyn ModifierStrategy)` if the kind is registered
    /// * `Err(StatError::UnknownModifierKind)` otherwise
    pub fn get(&self, kind: ModifierKind) -> Result<&dyn ModifierStrategy, StatError> {
        self.strategies
            .get(&kind)
            .map(|s| s.as_ref())
            .ok_or(StatError::UnknownModifierKind { kind })
    }

    /// Check whether a kind has a registered strategy.
    pub fn contains(&self, kind: ModifierKind) -> bool {
        self.strategies.contains_key(&kind)
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EngineContext;
    use crate::modifier::Modifier;

    #[test]
    fn test_builtins_cover_every_kind() {
        let registry = StrategyRegistry::with_builtins();
        for kind in ModifierKind::APPLY_ORDER {
            assert!(registry.contains(kind), "missing strategy for {:?}", kind);
        }
    }

    #[test]
    fn test_empty_registry_fails_lookup() {
        let registry = StrategyRegistry::new();
        let err = registry.get(ModifierKind::Mul).unwrap_err();
        assert_eq!(
            err,
            StatError::UnknownModifierKind {
                kind: ModifierKind::Mul
            }
        );
    }

    #[test]
    fn test_last_registration_wins() {
        #[derive(Debug)]
        struct DoubleStrategy;
        impl ModifierStrategy for DoubleStrategy {
            fn apply(&self, input: f64, _modifiers: &[Modifier], _ctx: &EngineContext) -> f64 {
                input * 2.0
            }
        }

        let mut registry = StrategyRegistry::with_builtins();
        registry.register(ModifierKind::Add, Box::new(DoubleStrategy));

        let ctx = EngineContext::with_seed(0);
        let strategy = registry.get(ModifierKind::Add).unwrap();
        assert_eq!(strategy.apply(21.0, &[], &ctx), 42.0);
    }
}
