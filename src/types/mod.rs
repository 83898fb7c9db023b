pub mod descriptor;
pub mod registry;
pub mod value;

pub use descriptor::{EnumDescriptor, Variant};
pub use registry::{EnumType, EnumValue, RegisteredEnum, TypeRegistry};
pub use value::{RawValue, Underlying};
