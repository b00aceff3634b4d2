//! Basic example: a single property with stacked modifiers
//!
//! This example demonstrates:
//! - Creating an engine context and a property
//! - Adding modifiers of different kinds
//! - The fixed precedence order of the value pipeline

use modstat::*;

fn main() -> Result<(), StatError> {
    let ctx = EngineContext::with_seed(42).into_shared();

    let atk = Property::new(&ctx, "ATK", 50.0);
    println!("Base ATK: {}", atk.get_base_value());

    println!("\nAdding modifiers:");
    atk.add_modifier(Modifier::scalar(ModifierKind::Add, 0, 20.0));
    println!("  - Weapon: +20");

    atk.add_modifier(Modifier::scalar(ModifierKind::Mul, 0, 1.5));
    println!("  - Rage buff: x1.5");

    atk.add_modifier(Modifier::scalar(ModifierKind::AfterAdd, 0, 3.0));
    println!("  - Flat enchant (after multipliers): +3");

    atk.add_modifier(Modifier::range(ModifierKind::Clamp, 0, 0.0, 100.0));
    println!("  - Cap: [0, 100]");

    // (50 + 20) * 1.5 + 3 = 108, clamped to 100
    println!("\nFinal ATK: {:.2}", atk.get_value()?);

    // Removal is by structural equality.
    atk.remove_modifier(Modifier::scalar(ModifierKind::Mul, 0, 1.5));
    println!("After the buff expires: {:.2}", atk.get_value()?);

    Ok(())
}
