// enumtable demo
// Builds a table keyed by a flags enum, saves it to JSON and loads it back

use enumtable::{EnumKeyedTable, TypedBits};

enumtable::enum_type! {
    pub enum Hoge: i32 {
        A = 0,
        B = 1,
        C = 2,
    }
}

enumtable::enum_type! {
    pub flags enum Huga: i32 {
        A = 1 << 0,
        B = 1 << 1,
        C = 1 << 2,
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let single = TypedBits::new(Hoge::B);
    tracing::info!("Single value: {} -> {:?}", single, single.to_serialized());

    let mut table: EnumKeyedTable<Option<String>> = EnumKeyedTable::with_default_key(Huga::A);
    table.set(Huga::C, Some("sprite_c".to_string()));
    table.insert_default();
    let added = table.fill_from_default_key();
    tracing::info!("Filled {} missing keys", added);

    let combined = TypedBits::new(Huga::A).or(Huga::B)?;
    table.set(combined, Some("sprite_ab".to_string()));
    table.sort_by_bits();
    table.validate_key_types()?;

    let json = table.to_json()?;
    println!("{}", json);

    let restored: EnumKeyedTable<Option<String>> = EnumKeyedTable::from_json(&json)?;
    for (key, value) in &restored {
        tracing::info!("[{}] {:?}", key, value);
    }

    if restored != table {
        anyhow::bail!("Restored table differs from the original");
    }
    Ok(())
}
