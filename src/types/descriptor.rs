use super::value::{RawValue, Underlying};
use crate::error::{EnumError, Result};

/// A declared variant: symbolic name and widened bit pattern
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Variant {
    pub name: String,
    pub bits: u64,
}

/// Describes one enum type: identity, representation and name table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumDescriptor {
    name: String,
    underlying: Underlying,
    flags: bool,
    variants: Vec<Variant>,
    resolved: bool,
}

impl EnumDescriptor {
    /// Starts a descriptor for the fully qualified type `name`
    pub fn new(name: impl Into<String>, underlying: Underlying) -> Self {
        Self {
            name: name.into(),
            underlying,
            flags: false,
            variants: Vec::new(),
            resolved: true,
        }
    }

    /// Placeholder for a persisted type name with no registered descriptor
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            underlying: Underlying::U64,
            flags: false,
            variants: Vec::new(),
            resolved: false,
        }
    }

    /// Marks the type as flags-style (values combine with bitwise OR)
    pub fn flags(mut self) -> Self {
        self.flags = true;
        self
    }

    /// Adds a variant. The value is widened with the descriptor's rules.
    pub fn variant(mut self, name: impl Into<String>, value: impl Into<RawValue>) -> Self {
        let bits = self.underlying.normalize(value.into().to_bits());
        self.variants.push(Variant {
            name: name.into(),
            bits,
        });
        self
    }

    /// Fully qualified, stable type identifier
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Short name used for display and ordering
    pub fn display_name(&self) -> &str {
        self.name.rsplit("::").next().unwrap_or(&self.name)
    }

    pub fn underlying(&self) -> Underlying {
        self.underlying
    }

    pub fn is_flags(&self) -> bool {
        self.flags
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Bit patterns of every declared variant, in declaration order
    pub fn values(&self) -> Vec<u64> {
        self.variants.iter().map(|v| v.bits).collect()
    }

    /// Name of the first variant declared with exactly `bits`
    pub fn name_of(&self, bits: u64) -> Option<&str> {
        self.variants
            .iter()
            .find(|v| v.bits == bits)
            .map(|v| v.name.as_str())
    }

    /// Renders `bits` the way the enum itself would print it.
    ///
    /// Flags types decompose into a `", "`-joined list of names. Anything
    /// that cannot be expressed with declared names prints as a number.
    pub fn format(&self, bits: u64) -> String {
        if let Some(name) = self.name_of(bits) {
            return name.to_string();
        }
        if self.flags && bits != 0 {
            if let Some(names) = self.decompose(bits) {
                return names.join(", ");
            }
        }
        RawValue::from_bits(self.underlying, bits).to_string()
    }

    /// Greedy decomposition from the highest value down
    fn decompose(&self, bits: u64) -> Option<Vec<&str>> {
        let mut sorted: Vec<&Variant> = self.variants.iter().filter(|v| v.bits != 0).collect();
        sorted.sort_by_key(|v| v.bits);

        let mut remaining = bits;
        let mut names = Vec::new();
        for variant in sorted.iter().rev() {
            if remaining & variant.bits == variant.bits {
                remaining &= !variant.bits;
                names.push(variant.name.as_str());
            }
        }

        if remaining != 0 {
            return None;
        }
        names.reverse();
        Some(names)
    }

    /// Parses text produced by `format` (or a hand-written equivalent)
    pub fn parse(&self, text: &str) -> Result<u64> {
        if text.trim().is_empty() {
            return Err(EnumError::EmptyValueText {
                type_name: self.name.clone(),
            });
        }

        let mut bits = 0u64;
        for part in text.split(',') {
            bits |= self.parse_part(part.trim())?;
        }
        Ok(self.underlying.normalize(bits))
    }

    fn parse_part(&self, part: &str) -> Result<u64> {
        let numeric = part
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '+');

        if numeric {
            let parsed = if self.underlying.is_signed() {
                part.parse::<i64>().map(|v| v as u64).ok()
            } else {
                part.parse::<u64>().ok()
            };
            return parsed.ok_or_else(|| EnumError::InvalidNumber {
                type_name: self.name.clone(),
                text: part.to_string(),
            });
        }

        self.variants
            .iter()
            .find(|v| v.name == part)
            .map(|v| v.bits)
            .ok_or_else(|| EnumError::UnknownVariant {
                type_name: self.name.clone(),
                name: part.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colors() -> EnumDescriptor {
        EnumDescriptor::new("demo::Color", Underlying::I32)
            .variant("Red", 0i32)
            .variant("Green", 1i32)
            .variant("Blue", 2i32)
            .variant("Unknown", -1i32)
    }

    fn access() -> EnumDescriptor {
        EnumDescriptor::new("demo::Access", Underlying::U8)
            .flags()
            .variant("None", 0u8)
            .variant("Read", 1u8)
            .variant("Write", 2u8)
            .variant("Exec", 4u8)
            .variant("ReadWrite", 3u8)
    }

    #[test]
    fn test_display_name() {
        assert_eq!(colors().display_name(), "Color");
        assert_eq!(EnumDescriptor::new("Plain", Underlying::U8).display_name(), "Plain");
    }

    #[test]
    fn test_negative_variant_is_sign_extended() {
        assert_eq!(colors().values(), vec![0, 1, 2, u64::MAX]);
    }

    #[test]
    fn test_format_plain() {
        let desc = colors();
        assert_eq!(desc.format(1), "Green");
        assert_eq!(desc.format(u64::MAX), "Unknown");
        assert_eq!(desc.format(7), "7");
        assert_eq!(desc.format(0xFFFF_FFFF_FFFF_FFFE), "-2");
    }

    #[test]
    fn test_format_flags() {
        let desc = access();
        assert_eq!(desc.format(0), "None");
        assert_eq!(desc.format(3), "ReadWrite");
        assert_eq!(desc.format(5), "Read, Exec");
        assert_eq!(desc.format(7), "ReadWrite, Exec");
        assert_eq!(desc.format(8), "8");
    }

    #[test]
    fn test_parse_names_and_numbers() {
        let desc = access();
        assert_eq!(desc.parse("Read, Exec").unwrap(), 5);
        assert_eq!(desc.parse("ReadWrite").unwrap(), 3);
        assert_eq!(desc.parse("6").unwrap(), 6);
        assert_eq!(desc.parse(" Write ,1").unwrap(), 3);
        assert_eq!(colors().parse("-1").unwrap(), u64::MAX);
    }

    #[test]
    fn test_parse_errors() {
        let desc = access();
        assert!(matches!(desc.parse(""), Err(EnumError::EmptyValueText { .. })));
        assert!(matches!(desc.parse("read"), Err(EnumError::UnknownVariant { .. })));
        assert!(matches!(desc.parse("-1"), Err(EnumError::InvalidNumber { .. })));
    }

    #[test]
    fn test_format_parse_agree() {
        let desc = access();
        for bits in 0..8u64 {
            assert_eq!(desc.parse(&desc.format(bits)).unwrap(), bits);
        }
    }
}
