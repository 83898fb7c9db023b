use super::descriptor::EnumDescriptor;
use super::value::RawValue;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

// ============================================
// Type handle
// ============================================

/// Handle to a registered enum type.
///
/// Identity is the fully qualified type name, so a placeholder for an
/// unresolved name compares equal to the real type once it is registered.
#[derive(Clone, Debug)]
pub struct EnumType(Arc<EnumDescriptor>);

impl EnumType {
    /// Handle for a persisted type name that no registry knows about
    pub fn unresolved(name: impl Into<String>) -> Self {
        EnumType(Arc::new(EnumDescriptor::unresolved(name)))
    }

    pub fn descriptor(&self) -> &EnumDescriptor {
        &self.0
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn display_name(&self) -> &str {
        self.0.display_name()
    }

    pub fn is_resolved(&self) -> bool {
        self.0.is_resolved()
    }

    /// Hash of the type name, stable across runs
    pub fn stable_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.name().hash(&mut hasher);
        hasher.finish()
    }
}

impl PartialEq for EnumType {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for EnumType {}

impl Hash for EnumType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
    }
}

impl fmt::Display for EnumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================
// Registry
// ============================================

/// Maps persisted type names to descriptors
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: RwLock<HashMap<String, EnumType>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry used when (de)serializing through serde.
    ///
    /// Register every enum with `register_enum::<E>()` before loading saved
    /// data. Values of a type registered later load unresolved and need
    /// `TypedBits::resolve` to recover their bits.
    pub fn global() -> &'static TypeRegistry {
        static GLOBAL: OnceLock<TypeRegistry> = OnceLock::new();
        GLOBAL.get_or_init(TypeRegistry::new)
    }

    /// Registers a descriptor under its name.
    ///
    /// Registering a name twice returns the first handle.
    pub fn register(&self, descriptor: EnumDescriptor) -> EnumType {
        let mut types = self.types.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = types.get(descriptor.name()) {
            if existing.descriptor() != &descriptor {
                tracing::warn!(
                    "Enum type {} already registered with a different descriptor, keeping the first",
                    descriptor.name()
                );
            }
            return existing.clone();
        }

        tracing::debug!(
            "Registering enum type {} ({}, {} variants)",
            descriptor.name(),
            descriptor.underlying(),
            descriptor.variants().len()
        );
        let enum_type = EnumType(Arc::new(descriptor));
        types.insert(enum_type.name().to_string(), enum_type.clone());
        enum_type
    }

    /// Registers a Rust enum declared with `enum_type!`
    pub fn register_enum<E: RegisteredEnum>(&self) -> EnumType {
        if let Some(existing) = self.resolve(E::TYPE_NAME) {
            return existing;
        }
        self.register(E::descriptor())
    }

    /// Looks up a type by its fully qualified name
    pub fn resolve(&self, name: &str) -> Option<EnumType> {
        let types = self.types.read().unwrap_or_else(PoisonError::into_inner);
        types.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.types.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered type names, sorted
    pub fn names(&self) -> Vec<String> {
        let types = self.types.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = types.keys().cloned().collect();
        names.sort();
        names
    }
}

// ============================================
// Concrete enums
// ============================================

/// A Rust enum that can be erased into an `EnumValue`.
///
/// Implement it with the `enum_type!` macro rather than by hand.
pub trait RegisteredEnum: Copy + 'static {
    /// Fully qualified name written into persisted data
    const TYPE_NAME: &'static str;

    fn descriptor() -> EnumDescriptor;

    fn to_raw(self) -> RawValue;

    /// Every declared variant, in declaration order
    fn all_values() -> &'static [Self];

    /// Handle in the global registry, registering on first use.
    /// Loading does not trigger this, see `TypeRegistry::global`.
    fn enum_type() -> EnumType {
        TypeRegistry::global().register_enum::<Self>()
    }
}

/// A concrete value of some registered enum type
#[derive(Clone, Debug, PartialEq)]
pub struct EnumValue {
    enum_type: EnumType,
    raw: RawValue,
}

impl EnumValue {
    pub fn new(enum_type: EnumType, raw: RawValue) -> Self {
        Self { enum_type, raw }
    }

    /// Builds a value from a widened bit pattern, narrowing it to the type
    pub fn from_bits(enum_type: EnumType, bits: u64) -> Self {
        let raw = RawValue::from_bits(enum_type.descriptor().underlying(), bits);
        Self { enum_type, raw }
    }

    pub fn enum_type(&self) -> &EnumType {
        &self.enum_type
    }

    pub fn raw(&self) -> RawValue {
        self.raw
    }

    pub fn bits(&self) -> u64 {
        self.raw.to_bits()
    }
}

impl<E: RegisteredEnum> From<E> for EnumValue {
    fn from(value: E) -> Self {
        EnumValue::new(E::enum_type(), value.to_raw())
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.enum_type.descriptor().format(self.bits()))
    }
}

/// Declares a fieldless enum with an explicit integer representation and
/// implements `RegisteredEnum` for it.
///
/// ```
/// enumtable::enum_type! {
///     pub flags enum Access: u8 {
///         Read = 1 << 0,
///         Write = 1 << 1,
///     }
/// }
/// ```
#[macro_export]
macro_rules! enum_type {
    (@define $is_flags:literal
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $repr:ident {
            $($variant:ident = $value:expr),+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[repr($repr)]
        $vis enum $name {
            $($variant = $value),+
        }

        impl $crate::RegisteredEnum for $name {
            const TYPE_NAME: &'static str = concat!(module_path!(), "::", stringify!($name));

            fn descriptor() -> $crate::EnumDescriptor {
                let underlying = $crate::RawValue::from(0 as $repr).underlying();
                let descriptor = $crate::EnumDescriptor::new(Self::TYPE_NAME, underlying);
                let descriptor = if $is_flags { descriptor.flags() } else { descriptor };
                descriptor $(.variant(stringify!($variant), $name::$variant as $repr))+
            }

            fn to_raw(self) -> $crate::RawValue {
                $crate::RawValue::from(self as $repr)
            }

            fn all_values() -> &'static [Self] {
                &[$($name::$variant),+]
            }
        }
    };
    (
        $(#[$meta:meta])*
        $vis:vis flags enum $name:ident : $repr:ident {
            $($variant:ident = $value:expr),+ $(,)?
        }
    ) => {
        $crate::enum_type! { @define true
            $(#[$meta])*
            $vis enum $name : $repr { $($variant = $value),+ }
        }
    };
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $repr:ident {
            $($variant:ident = $value:expr),+ $(,)?
        }
    ) => {
        $crate::enum_type! { @define false
            $(#[$meta])*
            $vis enum $name : $repr { $($variant = $value),+ }
        }
    };
}
