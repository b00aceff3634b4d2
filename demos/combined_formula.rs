//! Combined formula example: a damage stat derived from five children
//!
//! This example demonstrates:
//! - Registering child properties with a combine node
//! - A custom reducer over named children
//! - Lazy re-evaluation after a child changes

use modstat::*;

fn main() -> Result<(), StatError> {
    let ctx = EngineContext::with_seed(42).into_shared();

    let base = Property::new(&ctx, "Base", 50.0);
    base.add_modifier(Modifier::scalar(ModifierKind::Add, 0, 20.0));

    let buff = Property::new(&ctx, "Buff", 10.0);
    let buff_mul = Property::new(&ctx, "BuffMul", 0.2);
    let debuff = Property::new(&ctx, "Debuff", 5.0);
    let debuff_mul = Property::new(&ctx, "DebuffMul", 0.5);

    let final_atk = CombineProperty::new(&ctx, "FinalAtk", |node| {
        let base = node.child_value("Base")?;
        let buff = node.child_value("Buff")?;
        let buff_mul = node.child_value("BuffMul")?;
        let debuff = node.child_value("Debuff")?;
        let debuff_mul = node.child_value("DebuffMul")?;
        Ok((base + buff) * (1.0 + buff_mul) - debuff * (1.0 + debuff_mul))
    });

    for child in [&base, &buff, &buff_mul, &debuff, &debuff_mul] {
        final_atk.register_property(child);
    }

    println!("(Base+Buff)*(1+BuffMul) - Debuff*(1+DebuffMul)");
    println!("= (70+10)*1.2 - 5*1.5 = {:.1}", final_atk.get_value()?);

    // The debuff wears off; only the dirty portion recomputes on read.
    debuff.set_base_value(0.0);
    println!("After the debuff expires: {:.1}", final_atk.get_value()?);

    // Buffs can also land on the combined result itself.
    final_atk
        .result_property()
        .add_modifier(Modifier::scalar(ModifierKind::Mul, 0, 2.0));
    println!("Under a final-damage doubler: {:.1}", final_atk.get_value()?);

    Ok(())
}
