//! Property module.
//!
//! Provides the `Property` type, a single mutable numeric attribute whose
//! value is computed from a base value plus an ordered list of modifiers.
//! Results are memoized behind a dirty flag: mutations mark the property
//! dirty and notify observers, and the next `get_value` call recomputes
//! on demand.

use crate::context::EngineContext;
use crate::error::StatError;
use crate::modifier::{Modifier, ModifierKind};
use crate::property_id::PropertyId;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Stable handle for a dirty observer registered with
/// [`Property::on_dirty`].
///
/// Holders pass it back to [`Property::unsubscribe`] to remove exactly
/// their own callback, leaving other subscriptions on the same property
/// untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type DirtyCallback = Rc<RefCell<dyn FnMut()>>;
type BaseProvider = Rc<dyn Fn() -> Result<f64, StatError>>;

struct PropertyInner {
    id: PropertyId,
    base_value: f64,
    /// Insertion order preserved for stable tie-breaking.
    modifiers: Vec<Modifier>,
    cached_value: f64,
    dirty: bool,
    /// Re-entrancy marker: set while this property is being recomputed.
    evaluating: bool,
    observers: Vec<(ObserverId, DirtyCallback)>,
    next_observer: u64,
    /// Installed by combine nodes; replaces the stored base value as the
    /// starting point of a recompute.
    base_provider: Option<BaseProvider>,
}

/// A single mutable numeric attribute.
///
/// `Property` is a cheap-to-clone handle; clones share the same
/// underlying state. The value is the base value folded through every
/// modifier kind in [`ModifierKind::APPLY_ORDER`], memoized until the
/// next mutation.
///
/// Mutating calls mark the property dirty and notify observers exactly
/// once per clean→dirty transition, synchronously, before the call
/// returns. `get_value` is the only place the dirty flag is cleared.
///
/// # Examples
///
/// ```rust
/// use modstat::{EngineContext, Modifier, ModifierKind, Property};
///
/// let ctx = EngineContext::with_seed(0).into_shared();
/// let atk = Property::new(&ctx, "ATK", 50.0);
///
/// atk.add_modifier(Modifier::scalar(ModifierKind::Add, 0, 20.0));
/// atk.add_modifier(Modifier::scalar(ModifierKind::Mul, 0, 1.5));
/// assert_eq!(atk.get_value().unwrap(), 105.0); // (50 + 20) * 1.5
///
/// atk.set_base_value(10.0);
/// assert_eq!(atk.get_value().unwrap(), 45.0); // (10 + 20) * 1.5
/// ```
#[derive(Clone)]
pub struct Property {
    inner: Rc<RefCell<PropertyInner>>,
    ctx: Rc<EngineContext>,
}

impl std::fmt::Debug for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.inner.try_borrow() {
            Ok(inner) => f
                .debug_struct("Property")
                .field("id", &inner.id)
                .field("base_value", &inner.base_value)
                .field("dirty", &inner.dirty)
                .field("modifiers", &inner.modifiers.len())
                .finish(),
            Err(_) => f.debug_struct("Property").finish_non_exhaustive(),
        }
    }
}

impl Property {
    /// Create a property with the given id and base value.
    ///
    /// A fresh property starts dirty, so the first `get_value` call
    /// performs the initial computation.
    pub fn new(ctx: &Rc<EngineContext>, id: impl Into<PropertyId>, base_value: f64) -> Self {
        Self {
            inner: Rc::new(RefCell::new(PropertyInner {
                id: id.into(),
                base_value,
                modifiers: Vec::new(),
                cached_value: 0.0,
                dirty: true,
                evaluating: false,
                observers: Vec::new(),
                next_observer: 0,
                base_provider: None,
            })),
            ctx: Rc::clone(ctx),
        }
    }

    /// The id of this property.
    pub fn id(&self) -> PropertyId {
        self.inner.borrow().id.clone()
    }

    /// Append a modifier and mark the property dirty.
    ///
    /// The modifier is taken by value, so applying the same logical
    /// modifier to several properties hands each of them its own copy.
    pub fn add_modifier(&self, modifier: Modifier) {
        self.inner.borrow_mut().modifiers.push(modifier);
        self.make_dirty();
    }

    /// Remove the first modifier structurally equal to `modifier`.
    ///
    /// Removing a modifier that is not present is a no-op: the property
    /// stays clean and no notification fires.
    ///
    /// # Returns
    ///
    /// `true` if a modifier was removed.
    pub fn remove_modifier(&self, modifier: Modifier) -> bool {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            match inner.modifiers.iter().position(|m| *m == modifier) {
                Some(pos) => {
                    inner.modifiers.remove(pos);
                    true
                }
                None => false,
            }
        };
        if removed {
            self.make_dirty();
        } else {
            log::debug!(
                "property {}: remove_modifier found no match, skipping",
                self.inner.borrow().id
            );
        }
        removed
    }

    /// Remove every modifier.
    ///
    /// A property with no modifiers stays clean.
    pub fn clear_modifiers(&self) {
        let had_any = {
            let mut inner = self.inner.borrow_mut();
            let had_any = !inner.modifiers.is_empty();
            inner.modifiers.clear();
            had_any
        };
        if had_any {
            self.make_dirty();
        }
    }

    /// Overwrite the base value and mark the property dirty.
    pub fn set_base_value(&self, value: f64) {
        self.inner.borrow_mut().base_value = value;
        self.make_dirty();
    }

    /// The current base value.
    ///
    /// For a combine node's result holder this is the output of the most
    /// recent reducer run, not a hand-set value.
    pub fn get_base_value(&self) -> f64 {
        self.inner.borrow().base_value
    }

    /// The number of modifiers currently on this property.
    ///
    /// Read-only diagnostic accessor.
    pub fn modifier_count(&self) -> usize {
        self.inner.borrow().modifiers.len()
    }

    /// Whether the cached value is stale.
    ///
    /// Read-only diagnostic accessor.
    pub fn is_dirty(&self) -> bool {
        self.inner.borrow().dirty
    }

    /// Mark the property dirty and notify observers.
    ///
    /// Notification fires exactly once per clean→dirty transition; calling
    /// this on an already-dirty property does nothing.
    pub fn make_dirty(&self) {
        let to_fire: Vec<DirtyCallback> = {
            let mut inner = self.inner.borrow_mut();
            if inner.dirty {
                return;
            }
            inner.dirty = true;
            inner.observers.iter().map(|(_, cb)| Rc::clone(cb)).collect()
        };
        for callback in to_fire {
            (callback.borrow_mut())();
        }
    }

    /// Register a callback invoked on every clean→dirty transition.
    ///
    /// # Returns
    ///
    /// A stable [`ObserverId`] that removes this callback when passed to
    /// [`unsubscribe`](Property::unsubscribe).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::cell::Cell;
    /// use std::rc::Rc;
    /// use modstat::{EngineContext, Property};
    ///
    /// let ctx = EngineContext::with_seed(0).into_shared();
    /// let hp = Property::new(&ctx, "HP", 100.0);
    /// hp.get_value().unwrap();
    ///
    /// let fired = Rc::new(Cell::new(0));
    /// let counter = Rc::clone(&fired);
    /// hp.on_dirty(move || counter.set(counter.get() + 1));
    ///
    /// hp.set_base_value(90.0);
    /// hp.set_base_value(80.0); // already dirty, no second notification
    /// assert_eq!(fired.get(), 1);
    /// ```
    pub fn on_dirty(&self, callback: impl FnMut() + 'static) -> ObserverId {
        let mut inner = self.inner.borrow_mut();
        let id = ObserverId(inner.next_observer);
        inner.next_observer += 1;
        inner.observers.push((id, Rc::new(RefCell::new(callback))));
        id
    }

    /// Remove a previously registered dirty observer.
    ///
    /// # Returns
    ///
    /// `true` if the observer was found and removed.
    pub fn unsubscribe(&self, observer: ObserverId) -> bool {
        let mut inner = self.inner.borrow_mut();
        match inner.observers.iter().position(|(id, _)| *id == observer) {
            Some(pos) => {
                inner.observers.remove(pos);
                true
            }
            None => false,
        }
    }

    /// The current value of this property.
    ///
    /// If the property is dirty, the value is recomputed by folding the
    /// base value through every kind in [`ModifierKind::APPLY_ORDER`] and
    /// cached; otherwise the cached value is returned untouched. Range
    /// payloads are sampled during the recompute only, so two reads
    /// without an intervening mutation always agree.
    ///
    /// # Returns
    ///
    /// * `Ok(f64)` with the computed value
    /// * `Err(StatError::UnknownModifierKind)` if a present modifier kind
    ///   has no registered strategy
    /// * `Err(StatError::CycleDetected)` if the recompute re-entered this
    ///   property through a combine-node reducer
    pub fn get_value(&self) -> Result<f64, StatError> {
        {
            let inner = self.inner.borrow();
            if inner.evaluating {
                return Err(StatError::CycleDetected {
                    path: vec![inner.id.clone()],
                });
            }
            if !inner.dirty {
                return Ok(inner.cached_value);
            }
        }

        self.inner.borrow_mut().evaluating = true;
        let outcome = self.recompute();
        self.inner.borrow_mut().evaluating = false;

        match outcome {
            Ok(value) => {
                let mut inner = self.inner.borrow_mut();
                inner.cached_value = value;
                inner.dirty = false;
                Ok(value)
            }
            Err(StatError::CycleDetected { mut path }) => {
                // Each unwinding frame prepends itself until the path closes.
                let closed = path.len() >= 2 && path.first() == path.last();
                if !closed {
                    path.insert(0, self.inner.borrow().id.clone());
                }
                Err(StatError::CycleDetected { path })
            }
            Err(err) => Err(err),
        }
    }

    fn recompute(&self) -> Result<f64, StatError> {
        let provider = self.inner.borrow().base_provider.clone();
        let mut value = match provider {
            Some(provide) => {
                let provided = provide()?;
                self.inner.borrow_mut().base_value = provided;
                provided
            }
            None => self.inner.borrow().base_value,
        };

        let modifiers = self.inner.borrow().modifiers.clone();
        for kind in ModifierKind::APPLY_ORDER {
            let of_kind: Vec<Modifier> = modifiers
                .iter()
                .filter(|m| m.kind() == kind)
                .copied()
                .collect();
            if of_kind.is_empty() {
                continue;
            }
            let strategy = self.ctx.registry().get(kind)?;
            value = strategy.apply(value, &of_kind, &self.ctx);
        }
        Ok(value)
    }

    /// Install a base-value provider, replacing the stored base value as
    /// the starting point of every recompute. The property's own modifier
    /// list still applies on top of the provided value.
    pub(crate) fn set_base_provider(
        &self,
        provider: impl Fn() -> Result<f64, StatError> + 'static,
    ) {
        self.inner.borrow_mut().base_provider = Some(Rc::new(provider));
        self.make_dirty();
    }

    /// Remove the base-value provider; the property falls back to its
    /// stored base value.
    pub(crate) fn clear_base_provider(&self) {
        self.inner.borrow_mut().base_provider = None;
    }

    /// Export this property as a serializable snapshot.
    pub fn snapshot(&self) -> PropertySnapshot {
        let inner = self.inner.borrow();
        PropertySnapshot {
            id: inner.id.clone(),
            base_value: inner.base_value,
            modifiers: inner.modifiers.clone(),
        }
    }

    /// Reconstruct a property from a snapshot.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use modstat::{EngineContext, Modifier, ModifierKind, Property};
    ///
    /// let ctx = EngineContext::with_seed(0).into_shared();
    /// let hp = Property::new(&ctx, "HP", 100.0);
    /// hp.add_modifier(Modifier::scalar(ModifierKind::Add, 0, 25.0));
    ///
    /// let restored = Property::from_snapshot(&ctx, hp.snapshot());
    /// assert_eq!(restored.get_value().unwrap(), 125.0);
    /// ```
    pub fn from_snapshot(ctx: &Rc<EngineContext>, snapshot: PropertySnapshot) -> Self {
        let property = Property::new(ctx, snapshot.id, snapshot.base_value);
        {
            let mut inner = property.inner.borrow_mut();
            inner.modifiers = snapshot.modifiers;
        }
        property
    }
}

/// The serializable face of a property: id, base value, and ordered
/// modifier list.
///
/// Combine-property graphs are not serializable; only their leaf
/// properties round-trip through this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySnapshot {
    pub id: PropertyId,
    pub base_value: f64,
    pub modifiers: Vec<Modifier>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn ctx() -> Rc<EngineContext> {
        EngineContext::with_seed(0).into_shared()
    }

    #[test]
    fn test_base_value_only() {
        let p = Property::new(&ctx(), "HP", 100.0);
        assert_eq!(p.get_value().unwrap(), 100.0);
        assert_eq!(p.get_base_value(), 100.0);
    }

    #[test]
    fn test_apply_order_independent_of_insertion() {
        let ctx = ctx();
        let forward = Property::new(&ctx, "A", 50.0);
        forward.add_modifier(Modifier::scalar(ModifierKind::Add, 0, 20.0));
        forward.add_modifier(Modifier::scalar(ModifierKind::Mul, 0, 2.0));

        let reversed = Property::new(&ctx, "B", 50.0);
        reversed.add_modifier(Modifier::scalar(ModifierKind::Mul, 0, 2.0));
        reversed.add_modifier(Modifier::scalar(ModifierKind::Add, 0, 20.0));

        // Add folds before Mul regardless of insertion order.
        assert_eq!(forward.get_value().unwrap(), 140.0);
        assert_eq!(reversed.get_value().unwrap(), 140.0);
    }

    #[test]
    fn test_get_value_is_cached() {
        let p = Property::new(&ctx(), "HP", 10.0);
        p.add_modifier(Modifier::range(ModifierKind::Add, 0, 0.0, 100.0));

        let first = p.get_value().unwrap();
        assert_eq!(p.get_value().unwrap(), first);
        assert!(!p.is_dirty());
    }

    #[test]
    fn test_dirty_notification_fires_once() {
        let p = Property::new(&ctx(), "HP", 10.0);
        p.get_value().unwrap();

        let fired = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&fired);
        p.on_dirty(move || counter.set(counter.get() + 1));

        p.add_modifier(Modifier::scalar(ModifierKind::Add, 0, 1.0));
        p.add_modifier(Modifier::scalar(ModifierKind::Add, 0, 2.0));
        assert_eq!(fired.get(), 1);

        // Reading clears the flag, so the next mutation notifies again.
        p.get_value().unwrap();
        p.set_base_value(20.0);
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn test_unsubscribe_removes_only_that_observer() {
        let p = Property::new(&ctx(), "HP", 10.0);
        p.get_value().unwrap();

        let first = Rc::new(Cell::new(0u32));
        let second = Rc::new(Cell::new(0u32));
        let c1 = Rc::clone(&first);
        let c2 = Rc::clone(&second);
        let handle = p.on_dirty(move || c1.set(c1.get() + 1));
        p.on_dirty(move || c2.set(c2.get() + 1));

        assert!(p.unsubscribe(handle));
        assert!(!p.unsubscribe(handle));

        p.set_base_value(1.0);
        assert_eq!(first.get(), 0);
        assert_eq!(second.get(), 1);
    }

    #[test]
    fn test_remove_missing_modifier_is_noop() {
        let p = Property::new(&ctx(), "HP", 10.0);
        p.get_value().unwrap();

        let never_added = Modifier::scalar(ModifierKind::Add, 0, 5.0);
        assert!(!p.remove_modifier(never_added));
        assert!(!p.is_dirty());
    }

    #[test]
    fn test_remove_matching_modifier_dirties() {
        let p = Property::new(&ctx(), "HP", 10.0);
        let bonus = Modifier::scalar(ModifierKind::Add, 0, 5.0);
        p.add_modifier(bonus);
        assert_eq!(p.get_value().unwrap(), 15.0);

        assert!(p.remove_modifier(bonus));
        assert!(p.is_dirty());
        assert_eq!(p.get_value().unwrap(), 10.0);
    }

    #[test]
    fn test_clear_modifiers() {
        let p = Property::new(&ctx(), "HP", 10.0);
        p.add_modifier(Modifier::scalar(ModifierKind::Add, 0, 5.0));
        p.add_modifier(Modifier::scalar(ModifierKind::Mul, 0, 3.0));
        p.get_value().unwrap();

        p.clear_modifiers();
        assert_eq!(p.modifier_count(), 0);
        assert_eq!(p.get_value().unwrap(), 10.0);

        // Clearing an empty list does not dirty.
        p.clear_modifiers();
        assert!(!p.is_dirty());
    }

    #[test]
    fn test_base_provider_replaces_base() {
        let p = Property::new(&ctx(), "Derived", 0.0);
        p.set_base_provider(|| Ok(30.0));
        p.add_modifier(Modifier::scalar(ModifierKind::Mul, 0, 2.0));

        assert_eq!(p.get_value().unwrap(), 60.0);
        assert_eq!(p.get_base_value(), 30.0);

        p.clear_base_provider();
        p.make_dirty();
        assert_eq!(p.get_value().unwrap(), 60.0); // falls back to provided 30 * 2
    }

    #[test]
    fn test_self_cycle_detected() {
        let p = Property::new(&ctx(), "Loop", 0.0);
        let probe = p.clone();
        p.set_base_provider(move || probe.get_value());

        match p.get_value() {
            Err(StatError::CycleDetected { path }) => {
                assert_eq!(path.len(), 2);
                assert_eq!(path[0], path[1]);
            }
            other => panic!("expected cycle, got {:?}", other),
        }

        // The guard resets, so the property is still usable once the
        // provider is gone.
        p.clear_base_provider();
        assert_eq!(p.get_value().unwrap(), 0.0);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let ctx = ctx();
        let p = Property::new(&ctx, "HP", 100.0);
        p.add_modifier(Modifier::scalar(ModifierKind::Add, 0, 25.0));
        p.add_modifier(Modifier::range(ModifierKind::Clamp, 0, 0.0, 110.0));

        let snapshot = p.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: PropertySnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, restored);

        let rebuilt = Property::from_snapshot(&ctx, restored);
        assert_eq!(rebuilt.id().as_str(), "HP");
        assert_eq!(rebuilt.get_value().unwrap(), 110.0);
    }

    #[test]
    fn test_unknown_kind_surfaces_on_read() {
        use crate::registry::StrategyRegistry;
        use rand::SeedableRng;
        use rand_chacha::ChaCha8Rng;

        let bare = EngineContext::with_parts(
            StrategyRegistry::new(),
            Box::new(ChaCha8Rng::seed_from_u64(0)),
        )
        .into_shared();

        let p = Property::new(&bare, "HP", 10.0);
        assert_eq!(p.get_value().unwrap(), 10.0); // no modifiers, no lookup

        p.add_modifier(Modifier::scalar(ModifierKind::Add, 0, 5.0));
        assert_eq!(
            p.get_value().unwrap_err(),
            StatError::UnknownModifierKind {
                kind: ModifierKind::Add
            }
        );
    }
}
