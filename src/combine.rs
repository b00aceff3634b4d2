//! Combine-property module.
//!
//! Provides the `CombineProperty` type, a named node that derives a value
//! from a set of named child properties through a caller-supplied reducer.
//! The node owns a result holder (itself a [`Property`]) whose base value
//! is the reducer output; any modifiers on the result holder still apply
//! on top.
//!
//! Dirty propagation is one level at a time and pull-based: a child going
//! dirty marks the node's result dirty through an observer, and nothing
//! recomputes until somebody reads a value.

use crate::context::EngineContext;
use crate::error::StatError;
use crate::property::{ObserverId, Property};
use crate::property_id::PropertyId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

type Reducer = Rc<dyn Fn(&CombineProperty) -> Result<f64, StatError>>;

struct CombineInner {
    id: PropertyId,
    result: Property,
    children: HashMap<PropertyId, Property>,
    subscriptions: Vec<(Property, ObserverId)>,
    reducer: Option<Reducer>,
}

impl CombineInner {
    fn teardown(&mut self) {
        for (child, observer) in self.subscriptions.drain(..) {
            child.unsubscribe(observer);
        }
        self.children.clear();
        self.reducer = None;
        self.result.clear_base_provider();
    }
}

impl Drop for CombineInner {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// A named node computing a derived value from named child properties.
///
/// The reducer must be a pure function of the registered children's
/// current values; hidden external state would break dirty-propagation
/// correctness. Children are not owned: the same child may be registered
/// with any number of nodes, and disposing a node never disposes its
/// children.
///
/// `CombineProperty` is a cheap-to-clone handle; clones share the same
/// node.
///
/// # Examples
///
/// ```rust
/// use modstat::{CombineProperty, EngineContext, Property};
///
/// let ctx = EngineContext::with_seed(0).into_shared();
/// let base = Property::new(&ctx, "Base", 50.0);
/// let bonus = Property::new(&ctx, "Bonus", 10.0);
///
/// let total = CombineProperty::new(&ctx, "Total", |node| {
///     Ok(node.child_value("Base")? + node.child_value("Bonus")?)
/// });
/// total.register_property(&base);
/// total.register_property(&bonus);
/// assert_eq!(total.get_value().unwrap(), 60.0);
///
/// base.set_base_value(5.0);
/// assert_eq!(total.get_value().unwrap(), 15.0);
/// ```
#[derive(Clone)]
pub struct CombineProperty {
    inner: Rc<RefCell<CombineInner>>,
}

impl CombineProperty {
    /// Create a node with the given id and reducer.
    pub fn new<F>(ctx: &Rc<EngineContext>, id: impl Into<PropertyId>, reducer: F) -> Self
    where
        F: Fn(&CombineProperty) -> Result<f64, StatError> + 'static,
    {
        let id = id.into();
        let result = Property::new(ctx, id.clone(), 0.0);
        let inner = Rc::new(RefCell::new(CombineInner {
            id: id.clone(),
            result: result.clone(),
            children: HashMap::new(),
            subscriptions: Vec::new(),
            reducer: Some(Rc::new(reducer)),
        }));

        let node = Rc::downgrade(&inner);
        result.set_base_provider(move || reduce_through(&node, &id));

        Self { inner }
    }

    /// The id of this node.
    pub fn id(&self) -> PropertyId {
        self.inner.borrow().id.clone()
    }

    /// Register a child property under its own id.
    ///
    /// Subscribes to the child's dirty notifications so the result is
    /// invalidated whenever the child changes, and invalidates the result
    /// immediately. Registering a second child with the same id replaces
    /// the first and drops its subscription.
    pub fn register_property(&self, property: &Property) {
        let child_id = property.id();
        let result = self.result_property();
        let notify = result.clone();
        let observer = property.on_dirty(move || notify.make_dirty());

        {
            let mut inner = self.inner.borrow_mut();
            if let Some(pos) = inner.subscriptions.iter().position(|(p, _)| p.id() == child_id) {
                log::debug!("combine node {}: replacing child {}", inner.id, child_id);
                let (old, old_observer) = inner.subscriptions.remove(pos);
                old.unsubscribe(old_observer);
            }
            inner.children.insert(child_id, property.clone());
            inner.subscriptions.push((property.clone(), observer));
        }
        result.make_dirty();
    }

    /// Look up a registered child by name.
    ///
    /// # Returns
    ///
    /// * `Ok(Property)` with a handle to the child
    /// * `Err(StatError::PropertyNotFound)` if no child has that name
    pub fn get_property(&self, name: &str) -> Result<Property, StatError> {
        self.inner
            .borrow()
            .children
            .get(name)
            .cloned()
            .ok_or_else(|| StatError::PropertyNotFound(PropertyId::from_str(name)))
    }

    /// Read a child's current value; shorthand for reducers.
    pub fn child_value(&self, name: &str) -> Result<f64, StatError> {
        self.get_property(name)?.get_value()
    }

    /// The ids of every registered child.
    pub fn child_ids(&self) -> Vec<PropertyId> {
        self.inner.borrow().children.keys().cloned().collect()
    }

    /// The current value of this node.
    ///
    /// Delegates to the result holder: if it is dirty, the reducer runs
    /// to produce the effective base value, then the result holder's own
    /// modifiers apply.
    pub fn get_value(&self) -> Result<f64, StatError> {
        let result = self.inner.borrow().result.clone();
        result.get_value()
    }

    /// The result holder's base value, i.e. the output of the most recent
    /// reducer run.
    pub fn get_base_value(&self) -> f64 {
        self.inner.borrow().result.get_base_value()
    }

    /// A handle to the result holder.
    ///
    /// Register it with another node to build multi-level graphs, or add
    /// modifiers to it to adjust the reduced value.
    pub fn result_property(&self) -> Property {
        self.inner.borrow().result.clone()
    }

    /// Whether this node still has its reducer, i.e. has not been
    /// disposed.
    pub fn is_valid(&self) -> bool {
        self.inner.borrow().reducer.is_some()
    }

    /// Unsubscribe from every registered child and detach the reducer.
    ///
    /// Children are not owned and are left untouched. The result holder
    /// keeps its last computed value; reading a disposed node returns
    /// that value rather than an error.
    pub fn dispose(&self) {
        self.inner.borrow_mut().teardown();
    }
}

fn reduce_through(node: &Weak<RefCell<CombineInner>>, id: &PropertyId) -> Result<f64, StatError> {
    let inner = match node.upgrade() {
        Some(inner) => inner,
        None => {
            log::warn!("combine node {}: evaluated after it was dropped", id);
            return Err(StatError::PropertyNotFound(id.clone()));
        }
    };
    let reducer = inner.borrow().reducer.clone();
    match reducer {
        Some(reduce) => reduce(&CombineProperty { inner }),
        None => {
            log::warn!("combine node {}: evaluated after dispose", id);
            Err(StatError::PropertyNotFound(id.clone()))
        }
    }
}
