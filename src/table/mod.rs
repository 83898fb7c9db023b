pub mod keyed;
pub mod serialized;

pub use keyed::EnumKeyedTable;
pub use serialized::SerializedTable;
