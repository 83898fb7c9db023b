// enumtable - Type-erased serializable enum values and enum-keyed tables
//
// An enum value is stored as a type handle plus a widened 64-bit pattern, so
// it survives save/load without generic parameters. Tables keyed by such
// values flatten to parallel key/value lists.

pub mod bits;
pub mod error;
pub mod table;
pub mod types;

pub use bits::{AllBitsMode, SerializeOptions, SerializedEnum, TypedBits};
pub use error::{EnumError, Result};
pub use table::{EnumKeyedTable, SerializedTable};
pub use types::{EnumDescriptor, EnumType, EnumValue, RawValue, RegisteredEnum, TypeRegistry, Underlying};
