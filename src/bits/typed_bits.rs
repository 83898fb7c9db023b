use super::serialized::SerializedEnum;
use crate::error::{EnumError, Result};
use crate::types::{EnumType, EnumValue, RegisteredEnum};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{BitAnd, BitOr, BitXor};

/// Type-erased enum value: a type handle and a widened 64-bit pattern.
///
/// The empty value has no type and zero bits. It is distinct from every
/// typed zero.
///
/// A value loaded under a type name nobody has registered yet keeps the
/// persisted text, so saving it again does not lose the data.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(into = "SerializedEnum", from = "SerializedEnum")]
pub struct TypedBits {
    enum_type: Option<EnumType>,
    bits: u64,
    unresolved_text: Option<String>,
}

/// Right-hand side of a bitwise operation
#[derive(Clone, Debug)]
pub enum Operand {
    Typed(TypedBits),
    /// Raw bits are assumed compatible and never type-checked
    Raw(u64),
}

impl From<TypedBits> for Operand {
    fn from(value: TypedBits) -> Self {
        Operand::Typed(value)
    }
}

impl From<&TypedBits> for Operand {
    fn from(value: &TypedBits) -> Self {
        Operand::Typed(value.clone())
    }
}

impl From<EnumValue> for Operand {
    fn from(value: EnumValue) -> Self {
        Operand::Typed(TypedBits::new(value))
    }
}

impl<E: RegisteredEnum> From<E> for Operand {
    fn from(value: E) -> Self {
        Operand::Typed(TypedBits::new(value))
    }
}

impl From<u64> for Operand {
    fn from(value: u64) -> Self {
        Operand::Raw(value)
    }
}

impl TypedBits {
    /// Wraps a concrete enum value
    pub fn new(value: impl Into<EnumValue>) -> Self {
        let value = value.into();
        Self::from_bits(value.enum_type().clone(), value.bits())
    }

    /// Wraps a value that may be absent
    pub fn from_option(value: Option<EnumValue>) -> Result<Self> {
        value.map(Self::new).ok_or(EnumError::NullValue)
    }

    /// Builds a value from an already widened bit pattern
    pub fn from_bits(enum_type: EnumType, bits: u64) -> Self {
        Self {
            enum_type: Some(enum_type),
            bits,
            unresolved_text: None,
        }
    }

    /// Placeholder-typed value carrying the text it was loaded from
    pub(crate) fn unresolved(enum_type: EnumType, bits: u64, text: String) -> Self {
        Self {
            enum_type: Some(enum_type),
            bits,
            unresolved_text: Some(text),
        }
    }

    /// Persisted text kept while the type name is unresolved
    pub fn unresolved_text(&self) -> Option<&str> {
        self.unresolved_text.as_deref()
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.enum_type.is_none()
    }

    pub fn enum_type(&self) -> Option<&EnumType> {
        self.enum_type.as_ref()
    }

    pub fn bits(&self) -> u64 {
        self.bits
    }

    /// Rebuilds the concrete value, `None` for the empty value
    pub fn to_enum_value(&self) -> Option<EnumValue> {
        self.enum_type
            .as_ref()
            .map(|t| EnumValue::from_bits(t.clone(), self.bits))
    }

    /// Converts back to a Rust enum when the bits name exactly one variant
    pub fn to_typed<E: RegisteredEnum>(&self) -> Option<E> {
        let enum_type = self.enum_type.as_ref()?;
        if enum_type.name() != E::TYPE_NAME {
            return None;
        }
        E::all_values()
            .iter()
            .copied()
            .find(|v| v.to_raw().to_bits() == self.bits)
    }

    /// Combined hash: type name hash (0 when empty) XOR bits
    pub fn hash_code(&self) -> u64 {
        let type_hash = self.enum_type.as_ref().map_or(0, EnumType::stable_hash);
        type_hash ^ self.bits
    }

    // ============================================
    // Bitwise operations
    // ============================================

    pub fn and(&self, rhs: impl Into<Operand>) -> Result<Self> {
        self.operate(rhs.into(), |a, b| a & b)
    }

    pub fn or(&self, rhs: impl Into<Operand>) -> Result<Self> {
        self.operate(rhs.into(), |a, b| a | b)
    }

    pub fn xor(&self, rhs: impl Into<Operand>) -> Result<Self> {
        self.operate(rhs.into(), |a, b| a ^ b)
    }

    /// The result always takes the left operand's type. An empty left
    /// operand stays empty.
    fn operate(&self, rhs: Operand, op: impl Fn(u64, u64) -> u64) -> Result<Self> {
        let rhs_bits = match rhs {
            Operand::Raw(bits) => bits,
            Operand::Typed(other) => {
                if let (Some(left), Some(right)) = (&self.enum_type, &other.enum_type) {
                    if left != right {
                        return Err(EnumError::TypeMismatch {
                            left: format!("{}({})", self, left.name()),
                            right: format!("{}({})", other, right.name()),
                        });
                    }
                }
                other.bits
            }
        };

        let Some(enum_type) = self.enum_type.clone() else {
            return Ok(Self::empty());
        };
        Ok(Self::from_bits(enum_type, op(self.bits, rhs_bits)))
    }

    fn sort_key(&self) -> (Option<&str>, u64, Option<&str>) {
        (
            self.enum_type.as_ref().map(EnumType::display_name),
            self.bits,
            self.enum_type.as_ref().map(EnumType::name),
        )
    }
}

impl<E: RegisteredEnum> From<E> for TypedBits {
    fn from(value: E) -> Self {
        TypedBits::new(value)
    }
}

impl From<EnumValue> for TypedBits {
    fn from(value: EnumValue) -> Self {
        TypedBits::new(value)
    }
}

impl From<TypedBits> for u64 {
    fn from(value: TypedBits) -> Self {
        value.bits
    }
}

impl PartialEq for TypedBits {
    fn eq(&self, other: &Self) -> bool {
        self.enum_type == other.enum_type && self.bits == other.bits
    }
}

impl Eq for TypedBits {}

impl Hash for TypedBits {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

impl PartialOrd for TypedBits {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Display name first, then bits. The full name only breaks ties between
/// distinct types sharing a short name.
impl Ord for TypedBits {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl fmt::Display for TypedBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_enum_value() {
            Some(value) => write!(f, "{}", value),
            None => Ok(()),
        }
    }
}

macro_rules! impl_raw_bit_op {
    ($($trait:ident :: $method:ident => $op:tt),+ $(,)?) => {
        $(
            impl $trait<u64> for TypedBits {
                type Output = TypedBits;

                fn $method(self, rhs: u64) -> TypedBits {
                    match self.enum_type {
                        Some(enum_type) => TypedBits::from_bits(enum_type, self.bits $op rhs),
                        None => self,
                    }
                }
            }

            impl $trait<u64> for &TypedBits {
                type Output = TypedBits;

                fn $method(self, rhs: u64) -> TypedBits {
                    self.clone().$method(rhs)
                }
            }
        )+
    };
}

impl_raw_bit_op! {
    BitAnd::bitand => &,
    BitOr::bitor => |,
    BitXor::bitxor => ^,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    crate::enum_type! {
        enum Hoge: i32 {
            A = 0,
            B = 1,
            C = 2,
        }
    }

    crate::enum_type! {
        flags enum Huga: i32 {
            A = 1 << 0,
            B = 1 << 1,
            C = 1 << 2,
        }
    }

    crate::enum_type! {
        enum Small: i8 {
            Neg = -1,
            One = 1,
        }
    }

    fn std_hash(value: &TypedBits) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_construct() {
        let bits = TypedBits::new(Huga::C);
        assert_eq!(bits.bits(), 4);
        assert_eq!(bits.enum_type(), Some(&Huga::enum_type()));
        assert_eq!(bits.to_string(), "C");
    }

    #[test]
    fn test_construct_sign_extends() {
        assert_eq!(TypedBits::new(Small::Neg).bits(), u64::MAX);
        assert_eq!(TypedBits::new(Small::One).bits(), 1);
    }

    #[test]
    fn test_absent_value_is_rejected() {
        assert!(matches!(
            TypedBits::from_option(None),
            Err(EnumError::NullValue)
        ));
        let present = TypedBits::from_option(Some(EnumValue::from(Hoge::B))).unwrap();
        assert_eq!(present, TypedBits::new(Hoge::B));
    }

    #[test]
    fn test_empty_is_distinct_from_typed_zero() {
        let empty = TypedBits::empty();
        let zero = TypedBits::new(Hoge::A);
        assert_eq!(zero.bits(), 0);
        assert_ne!(empty, zero);
        assert!(empty.to_enum_value().is_none());
        assert_eq!(empty.to_string(), "");
    }

    #[test]
    fn test_to_enum_value() {
        let value = TypedBits::new(Hoge::C).to_enum_value().unwrap();
        assert_eq!(value, EnumValue::from(Hoge::C));
        assert_eq!(TypedBits::new(Hoge::C).to_typed::<Hoge>(), Some(Hoge::C));
        assert_eq!(TypedBits::new(Hoge::C).to_typed::<Huga>(), None);
    }

    #[test]
    fn test_bitwise_ops() {
        let a = TypedBits::new(Huga::A);
        let ab = a.or(Huga::B).unwrap();
        assert_eq!(ab.bits(), 3);
        assert_eq!(ab.to_string(), "A, B");
        assert_eq!(ab.to_typed::<Huga>(), None);

        assert_eq!(ab.and(&a).unwrap(), a);
        assert_eq!(ab.xor(EnumValue::from(Huga::A)).unwrap(), TypedBits::new(Huga::B));
        assert_eq!(a.bits(), 1);
    }

    #[test]
    fn test_flag_algebra_identity() {
        let values = [Huga::A, Huga::B, Huga::C];
        for &x in &values {
            for &y in &values {
                let a = TypedBits::new(x).or(Huga::C).unwrap();
                let b = TypedBits::new(y);
                let lhs = a.and(&b).unwrap().or(a.xor(&b).unwrap()).unwrap();
                assert_eq!(lhs, a.or(&b).unwrap());
            }
        }
    }

    #[test]
    fn test_mismatched_types_fail() {
        let a = TypedBits::new(Huga::A);
        let b = TypedBits::new(Hoge::B);
        for result in [a.and(&b), a.or(&b), a.xor(&b)] {
            match result {
                Err(EnumError::TypeMismatch { left, right }) => {
                    assert!(left.contains("Huga"));
                    assert!(right.contains("Hoge"));
                }
                other => panic!("expected type mismatch, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_raw_operand_skips_type_check() {
        let a = TypedBits::new(Huga::A);
        assert_eq!(a.or(6u64).unwrap().bits(), 7);
        assert_eq!((&a | 4).bits(), 5);
        assert_eq!((a.clone() & 0).bits(), 0);
        assert_eq!((a ^ 1).enum_type(), Some(&Huga::enum_type()));
    }

    #[test]
    fn test_empty_operands() {
        let empty = TypedBits::empty();
        let a = TypedBits::new(Huga::A);
        assert_eq!(empty.or(&a).unwrap(), TypedBits::empty());
        assert_eq!(a.or(&empty).unwrap(), a);
        assert!((empty | 3).is_empty());
    }

    #[test]
    fn test_equal_values_hash_equally() {
        let a = TypedBits::new(Huga::A).or(Huga::B).unwrap();
        let b = TypedBits::new(Huga::B).or(Huga::A).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.hash_code(), b.hash_code());
        assert_eq!(std_hash(&a), std_hash(&b));
        assert_eq!(TypedBits::empty().hash_code(), 0);
    }

    #[test]
    fn test_ordering() {
        let mut values = vec![
            TypedBits::new(Huga::C),
            TypedBits::new(Hoge::B),
            TypedBits::new(Huga::A),
            TypedBits::empty(),
            TypedBits::new(Hoge::A),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                TypedBits::empty(),
                TypedBits::new(Hoge::A),
                TypedBits::new(Hoge::B),
                TypedBits::new(Huga::A),
                TypedBits::new(Huga::C),
            ]
        );
    }
}
