//! Cycle detection example: static validation and the runtime guard
//!
//! This example demonstrates:
//! - Validating combine wiring with the manager before play
//! - The per-evaluation guard failing fast on a reducer cycle

use modstat::*;

fn main() {
    let ctx = EngineContext::with_seed(42).into_shared();

    // Two nodes that read each other.
    let a = CombineProperty::new(&ctx, "A", |n| n.child_value("B"));
    let b = CombineProperty::new(&ctx, "B", |n| n.child_value("A"));
    a.register_property(&b.result_property());
    b.register_property(&a.result_property());

    // Static validation catches the miswiring without evaluating anything.
    let mut manager = CombinePropertyManager::new();
    manager.add_or_update(a.clone());
    manager.add_or_update(b);

    match manager.ensure_acyclic() {
        Ok(()) => println!("wiring is acyclic"),
        Err(err) => println!("static check: {}", err),
    }

    // The runtime guard catches the same cycle during evaluation.
    match a.get_value() {
        Ok(value) => println!("A = {}", value),
        Err(err) => println!("runtime guard: {}", err),
    }
}
