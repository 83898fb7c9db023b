pub mod serialized;
pub mod typed_bits;

pub use serialized::{AllBitsMode, SerializeOptions, SerializedEnum};
pub use typed_bits::{Operand, TypedBits};
