use serde::{Deserialize, Serialize};
use std::fmt;

/// Underlying representation of an enum type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Underlying {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    Bool,
    Char,
    F32,
    F64,
}

impl Underlying {
    /// Returns the size in bytes of this representation
    pub fn size(&self) -> usize {
        match self {
            Underlying::I8 | Underlying::U8 | Underlying::Bool => 1,
            Underlying::I16 | Underlying::U16 => 2,
            Underlying::I32 | Underlying::U32 | Underlying::Char | Underlying::F32 => 4,
            Underlying::I64 | Underlying::U64 | Underlying::F64 => 8,
        }
    }

    /// Signed integral types are sign-extended when widened to 64 bits
    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            Underlying::I8 | Underlying::I16 | Underlying::I32 | Underlying::I64
        )
    }

    /// Floating point representations carry no bit pattern
    pub fn is_integral(&self) -> bool {
        !matches!(self, Underlying::F32 | Underlying::F64)
    }

    /// Returns a human-readable name for this representation
    pub fn display_name(&self) -> &str {
        match self {
            Underlying::I8 => "Int8",
            Underlying::I16 => "Int16",
            Underlying::I32 => "Int32",
            Underlying::I64 => "Int64",
            Underlying::U8 => "UInt8",
            Underlying::U16 => "UInt16",
            Underlying::U32 => "UInt32",
            Underlying::U64 => "UInt64",
            Underlying::Bool => "Boolean",
            Underlying::Char => "Char",
            Underlying::F32 => "Float",
            Underlying::F64 => "Double",
        }
    }

    /// Mask covering the value bits of this representation
    fn width_mask(&self) -> u64 {
        match self {
            Underlying::Bool => 1,
            Underlying::F32 | Underlying::F64 => 0,
            _ if self.size() == 8 => u64::MAX,
            _ => (1u64 << (self.size() * 8)) - 1,
        }
    }

    /// The widened pattern of a value with every bit of its width set.
    /// Zero when no such pattern is a valid value (chars and floats).
    pub fn all_bits(&self) -> u64 {
        match self {
            Underlying::Char => 0,
            _ if self.is_signed() => u64::MAX,
            _ => self.width_mask(),
        }
    }

    /// Narrows `bits` to this width and widens it back
    pub fn normalize(&self, bits: u64) -> u64 {
        RawValue::from_bits(*self, bits).to_bits()
    }
}

impl fmt::Display for Underlying {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A single concrete value in its underlying representation
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RawValue {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Bool(bool),
    Char(char),
    F32(f32),
    F64(f64),
}

impl RawValue {
    /// Returns the Underlying of this RawValue
    pub fn underlying(&self) -> Underlying {
        match self {
            RawValue::I8(_) => Underlying::I8,
            RawValue::I16(_) => Underlying::I16,
            RawValue::I32(_) => Underlying::I32,
            RawValue::I64(_) => Underlying::I64,
            RawValue::U8(_) => Underlying::U8,
            RawValue::U16(_) => Underlying::U16,
            RawValue::U32(_) => Underlying::U32,
            RawValue::U64(_) => Underlying::U64,
            RawValue::Bool(_) => Underlying::Bool,
            RawValue::Char(_) => Underlying::Char,
            RawValue::F32(_) => Underlying::F32,
            RawValue::F64(_) => Underlying::F64,
        }
    }

    /// Widens the value into a 64-bit pattern.
    ///
    /// Signed values go through `i64` so negative numbers are sign-extended.
    /// Unsigned, boolean and char values are zero-extended. Floats have no
    /// meaningful pattern and yield 0.
    pub fn to_bits(&self) -> u64 {
        match *self {
            RawValue::I8(v) => v as i64 as u64,
            RawValue::I16(v) => v as i64 as u64,
            RawValue::I32(v) => v as i64 as u64,
            RawValue::I64(v) => v as u64,
            RawValue::U8(v) => v as u64,
            RawValue::U16(v) => v as u64,
            RawValue::U32(v) => v as u64,
            RawValue::U64(v) => v,
            RawValue::Bool(v) => v as u64,
            RawValue::Char(v) => v as u64,
            RawValue::F32(_) | RawValue::F64(_) => 0,
        }
    }

    /// Narrows a 64-bit pattern into the given representation (truncating)
    pub fn from_bits(underlying: Underlying, bits: u64) -> Self {
        match underlying {
            Underlying::I8 => RawValue::I8(bits as i8),
            Underlying::I16 => RawValue::I16(bits as i16),
            Underlying::I32 => RawValue::I32(bits as i32),
            Underlying::I64 => RawValue::I64(bits as i64),
            Underlying::U8 => RawValue::U8(bits as u8),
            Underlying::U16 => RawValue::U16(bits as u16),
            Underlying::U32 => RawValue::U32(bits as u32),
            Underlying::U64 => RawValue::U64(bits),
            Underlying::Bool => RawValue::Bool(bits & 1 != 0),
            Underlying::Char => RawValue::Char(char::from_u32(bits as u32).unwrap_or('\0')),
            Underlying::F32 => RawValue::F32(0.0),
            Underlying::F64 => RawValue::F64(0.0),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::I8(v) => write!(f, "{}", v),
            RawValue::I16(v) => write!(f, "{}", v),
            RawValue::I32(v) => write!(f, "{}", v),
            RawValue::I64(v) => write!(f, "{}", v),
            RawValue::U8(v) => write!(f, "{}", v),
            RawValue::U16(v) => write!(f, "{}", v),
            RawValue::U32(v) => write!(f, "{}", v),
            RawValue::U64(v) => write!(f, "{}", v),
            RawValue::Bool(v) => write!(f, "{}", v),
            // Chars render by code point so the text parses back as a number
            RawValue::Char(v) => write!(f, "{}", *v as u32),
            RawValue::F32(v) => write!(f, "{}", v),
            RawValue::F64(v) => write!(f, "{}", v),
        }
    }
}

macro_rules! impl_from_primitive {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$ty> for RawValue {
                fn from(value: $ty) -> Self {
                    RawValue::$variant(value)
                }
            }
        )+
    };
}

impl_from_primitive! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    bool => Bool,
    char => Char,
    f32 => F32,
    f64 => F64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_values_are_sign_extended() {
        assert_eq!(RawValue::I8(-1).to_bits(), u64::MAX);
        assert_eq!(RawValue::I32(-2).to_bits(), 0xFFFF_FFFF_FFFF_FFFE);
        assert_eq!(RawValue::I16(0x7F).to_bits(), 0x7F);
    }

    #[test]
    fn test_unsigned_values_are_zero_extended() {
        assert_eq!(RawValue::U8(0xFF).to_bits(), 0xFF);
        assert_eq!(RawValue::U32(u32::MAX).to_bits(), 0xFFFF_FFFF);
        assert_eq!(RawValue::Bool(true).to_bits(), 1);
        assert_eq!(RawValue::Char('A').to_bits(), 65);
    }

    #[test]
    fn test_float_values_have_no_bits() {
        assert_eq!(RawValue::F32(3.5).to_bits(), 0);
        assert_eq!(RawValue::F64(-1.0).to_bits(), 0);
    }

    #[test]
    fn test_from_bits_truncates() {
        assert_eq!(RawValue::from_bits(Underlying::U8, 0x1FF), RawValue::U8(0xFF));
        assert_eq!(RawValue::from_bits(Underlying::I16, u64::MAX), RawValue::I16(-1));
        assert_eq!(RawValue::from_bits(Underlying::Char, 0xD800), RawValue::Char('\0'));
    }

    #[test]
    fn test_all_bits_is_width_aware() {
        assert_eq!(Underlying::I8.all_bits(), u64::MAX);
        assert_eq!(Underlying::I32.all_bits(), u64::MAX);
        assert_eq!(Underlying::U16.all_bits(), 0xFFFF);
        assert_eq!(Underlying::U64.all_bits(), u64::MAX);
        assert_eq!(Underlying::Bool.all_bits(), 1);
        assert_eq!(Underlying::Char.all_bits(), 0);
        assert_eq!(Underlying::F64.all_bits(), 0);
    }

    #[test]
    fn test_is_integral() {
        assert!(Underlying::I8.is_integral());
        assert!(Underlying::Char.is_integral());
        assert!(Underlying::Bool.is_integral());
        assert!(!Underlying::F32.is_integral());
        assert!(!Underlying::F64.is_integral());
    }

    #[test]
    fn test_normalize() {
        assert_eq!(Underlying::I8.normalize(0xFF), u64::MAX);
        assert_eq!(Underlying::U8.normalize(0x1_02), 0x02);
        assert_eq!(Underlying::U64.normalize(42), 42);
    }
}
