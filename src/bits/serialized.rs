use super::typed_bits::TypedBits;
use crate::types::{EnumType, TypeRegistry, Underlying};
use serde::{Deserialize, Serialize};

/// Persisted form of a `TypedBits`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedEnum {
    /// Fully qualified type name, empty for the empty value
    pub type_name: String,
    /// Symbolic rendering, comma-joined for flag combinations
    pub value_text: String,
    pub is_all_bits: bool,
}

/// How the all-bits shorthand is detected and restored.
///
/// In width-aware mode a pattern with bits set above the type's width is
/// saved truncated to that width, the way the enum itself would print it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllBitsMode {
    /// All bits of the type's own width (sign-extended for signed types)
    #[default]
    WidthAware,
    /// Always the full 64-bit mask, regardless of the type
    Legacy64,
}

/// Options for converting between `TypedBits` and `SerializedEnum`
#[derive(Clone, Debug, Default)]
pub struct SerializeOptions {
    pub all_bits: AllBitsMode,
}

impl SerializeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_all_bits(mut self, mode: AllBitsMode) -> Self {
        self.all_bits = mode;
        self
    }

    /// The pattern that stands for "every bit set" in `underlying`
    pub fn all_bits_of(&self, underlying: Underlying) -> u64 {
        match self.all_bits {
            AllBitsMode::WidthAware => underlying.all_bits(),
            AllBitsMode::Legacy64 => u64::MAX,
        }
    }
}

impl TypedBits {
    pub fn to_serialized(&self) -> SerializedEnum {
        self.to_serialized_with(&SerializeOptions::default())
    }

    /// Computes the persisted fields on demand
    pub fn to_serialized_with(&self, options: &SerializeOptions) -> SerializedEnum {
        let Some(enum_type) = self.enum_type() else {
            return SerializedEnum::default();
        };

        let descriptor = enum_type.descriptor();
        let all_bits = options.all_bits_of(descriptor.underlying());
        let value_text = match self.unresolved_text() {
            Some(text) if !descriptor.is_resolved() => text.to_string(),
            _ => descriptor.format(self.bits()),
        };
        SerializedEnum {
            type_name: descriptor.name().to_string(),
            value_text,
            is_all_bits: all_bits != 0 && self.bits() == all_bits,
        }
    }

    /// Restores a value using the global registry and default options
    pub fn from_serialized(serialized: &SerializedEnum) -> Self {
        Self::from_serialized_with(serialized, TypeRegistry::global(), &SerializeOptions::default())
    }

    pub fn from_serialized_in(serialized: &SerializedEnum, registry: &TypeRegistry) -> Self {
        Self::from_serialized_with(serialized, registry, &SerializeOptions::default())
    }

    /// Restores a value from its persisted fields.
    ///
    /// Never fails. An unknown type keeps its name and the persisted text
    /// but gets zero (or all-bits) until `resolve` runs after registration.
    /// Unparsable text falls back to all-bits or zero.
    pub fn from_serialized_with(
        serialized: &SerializedEnum,
        registry: &TypeRegistry,
        options: &SerializeOptions,
    ) -> Self {
        if serialized.type_name.is_empty() {
            return Self::empty();
        }

        let enum_type = registry.resolve(&serialized.type_name).unwrap_or_else(|| {
            tracing::warn!("Unknown enum type {}, keeping value text until it resolves", serialized.type_name);
            EnumType::unresolved(serialized.type_name.as_str())
        });

        let descriptor = enum_type.descriptor();
        let fallback = if serialized.is_all_bits {
            options.all_bits_of(descriptor.underlying())
        } else {
            0
        };

        if !descriptor.is_resolved() {
            return Self::unresolved(enum_type, fallback, serialized.value_text.clone());
        }

        let bits = if serialized.is_all_bits {
            fallback
        } else {
            match descriptor.parse(&serialized.value_text) {
                Ok(bits) => bits,
                Err(e) => {
                    tracing::warn!("Failed to restore {} value: {}", descriptor.name(), e);
                    fallback
                }
            }
        };

        Self::from_bits(enum_type, bits)
    }

    /// Re-parses a value loaded before its type was registered, using the
    /// global registry
    pub fn resolve(&self) -> Self {
        self.resolve_in(TypeRegistry::global(), &SerializeOptions::default())
    }

    pub fn resolve_in(&self, registry: &TypeRegistry, options: &SerializeOptions) -> Self {
        match self.enum_type() {
            Some(enum_type) if !enum_type.is_resolved() => {
                Self::from_serialized_with(&self.to_serialized_with(options), registry, options)
            }
            _ => self.clone(),
        }
    }
}

impl From<TypedBits> for SerializedEnum {
    fn from(value: TypedBits) -> Self {
        value.to_serialized()
    }
}

impl From<SerializedEnum> for TypedBits {
    fn from(value: SerializedEnum) -> Self {
        TypedBits::from_serialized(&value)
    }
}
