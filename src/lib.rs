//! # modstat - Reactive Modifier-Driven Attribute Engine
//!
//! A reactive numeric-attribute engine for gameplay stats (health,
//! attack, resistances) that provides:
//! - **Deterministic stacking** - modifiers fold in a fixed precedence
//!   order, independent of the order they were added
//! - **Lazy re-evaluation** - mutations mark values dirty; nothing
//!   recomputes until somebody reads
//! - **Combined formulas** - named nodes derive values from child
//!   properties through custom reducers, with change notification
//!   propagating one level at a time
//! - **Replay-safe randomness** - range payloads sample from a seedable
//!   generator injected per engine instance
//!
//! ## Value Pipeline
//!
//! A property's value is its base value folded through every modifier
//! kind in precedence order:
//!
//! ```text
//! base → Add → PriorityAdd → Mul → PriorityMul → AfterAdd → Override → Clamp
//! ```
//!
//! Each kind fully folds in all of its modifiers before the next kind
//! applies to the result, so `Override` and `Clamp` always act last.
//!
//! ## Example
//!
//! ```rust
//! use modstat::*;
//!
//! let ctx = EngineContext::with_seed(7).into_shared();
//!
//! let atk = Property::new(&ctx, "ATK", 50.0);
//! atk.add_modifier(Modifier::scalar(ModifierKind::Add, 0, 20.0));
//! atk.add_modifier(Modifier::scalar(ModifierKind::Mul, 0, 1.5));
//! assert_eq!(atk.get_value().unwrap(), 105.0); // (50 + 20) * 1.5
//!
//! // A combined formula over named children.
//! let total = CombineProperty::new(&ctx, "TotalAtk", |node| {
//!     Ok(node.child_value("ATK")? * 2.0)
//! });
//! total.register_property(&atk);
//! assert_eq!(total.get_value().unwrap(), 210.0);
//!
//! // Mutations propagate lazily through the graph.
//! atk.set_base_value(10.0);
//! assert_eq!(total.get_value().unwrap(), 90.0); // (10 + 20) * 1.5 * 2
//! ```
//!
//! ## Modules
//!
//! - [`property_id`] - Property identifier type
//! - [`modifier`] - Modifier kinds and payloads
//! - [`strategy`] - Per-kind reduction strategies
//! - [`registry`] - Strategy registry
//! - [`context`] - Per-engine shared state (registry + random source)
//! - [`property`] - The memoizing property type
//! - [`combine`] - Combine-property graph nodes
//! - [`manager`] - Node registry and static graph validation
//! - [`graph`] - Dependency graph for whole-graph validation
//! - [`error`] - Error types

pub mod combine;
pub mod context;
pub mod error;
pub mod graph;
pub mod manager;
pub mod modifier;
pub mod property;
pub mod property_id;
pub mod registry;
pub mod strategy;

// Re-export main types for convenience
pub use combine::CombineProperty;
pub use context::EngineContext;
pub use error::StatError;
pub use graph::DependencyGraph;
pub use manager::CombinePropertyManager;
pub use modifier::{Modifier, ModifierKind, ModifierPayload};
pub use property::{ObserverId, Property, PropertySnapshot};
pub use property_id::PropertyId;
pub use registry::StrategyRegistry;

// Re-export the built-in strategies
pub use strategy::{
    AddStrategy, AfterAddStrategy, ClampStrategy, ModifierStrategy, MulStrategy, OverrideStrategy,
    PriorityAddStrategy, PriorityMulStrategy,
};
