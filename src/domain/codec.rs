//! Scalar value codecs: lexical text <-> native leaf values.
//!
//! Integer codecs accept an optional sign followed by `0x`/`0X` hexadecimal,
//! leading-zero octal or plain decimal digits.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::error::{DomainError, DomainResult};

/// Built-in scalar types a leaf or leaf-list may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    String,
    Boolean,
    Empty,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
}

impl ScalarType {
    pub const ALL: [ScalarType; 11] = [
        ScalarType::String,
        ScalarType::Boolean,
        ScalarType::Empty,
        ScalarType::Int8,
        ScalarType::Int16,
        ScalarType::Int32,
        ScalarType::Int64,
        ScalarType::Uint8,
        ScalarType::Uint16,
        ScalarType::Uint32,
        ScalarType::Uint64,
    ];

    /// Inclusive value range of integer types.
    fn integer_range(self) -> Option<(i128, i128)> {
        let range = match self {
            ScalarType::Int8 => (i8::MIN as i128, i8::MAX as i128),
            ScalarType::Int16 => (i16::MIN as i128, i16::MAX as i128),
            ScalarType::Int32 => (i32::MIN as i128, i32::MAX as i128),
            ScalarType::Int64 => (i64::MIN as i128, i64::MAX as i128),
            ScalarType::Uint8 => (0, u8::MAX as i128),
            ScalarType::Uint16 => (0, u16::MAX as i128),
            ScalarType::Uint32 => (0, u32::MAX as i128),
            ScalarType::Uint64 => (0, u64::MAX as i128),
            ScalarType::String | ScalarType::Boolean | ScalarType::Empty => return None,
        };
        Some(range)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarType::String => "string",
            ScalarType::Boolean => "boolean",
            ScalarType::Empty => "empty",
            ScalarType::Int8 => "int8",
            ScalarType::Int16 => "int16",
            ScalarType::Int32 => "int32",
            ScalarType::Int64 => "int64",
            ScalarType::Uint8 => "uint8",
            ScalarType::Uint16 => "uint16",
            ScalarType::Uint32 => "uint32",
            ScalarType::Uint64 => "uint64",
        };
        f.write_str(name)
    }
}

/// Native value held by leaf data nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarValue {
    String(String),
    Boolean(bool),
    Empty,
    Int(i64),
    Uint(u64),
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::String(s) => f.write_str(s),
            ScalarValue::Boolean(b) => write!(f, "{}", b),
            ScalarValue::Empty => Ok(()),
            ScalarValue::Int(i) => write!(f, "{}", i),
            ScalarValue::Uint(u) => write!(f, "{}", u),
        }
    }
}

/// Converter between the lexical form of a scalar and its native value.
pub trait ValueCodec: Send + Sync {
    /// Absent values serialize to the empty string.
    fn serialize(&self, value: Option<&ScalarValue>) -> String {
        value.map(ToString::to_string).unwrap_or_default()
    }

    fn deserialize(&self, input: Option<&str>) -> DomainResult<ScalarValue>;
}

fn invalid(type_name: ScalarType, input: Option<&str>, reason: impl Into<String>) -> DomainError {
    DomainError::InvalidLexicalValue {
        type_name,
        value: input.map(str::to_string),
        reason: reason.into(),
    }
}

#[derive(Debug, Default)]
pub struct StringCodec;

impl ValueCodec for StringCodec {
    fn deserialize(&self, input: Option<&str>) -> DomainResult<ScalarValue> {
        input
            .map(|s| ScalarValue::String(s.to_string()))
            .ok_or_else(|| invalid(ScalarType::String, input, "value is absent"))
    }
}

#[derive(Debug, Default)]
pub struct BooleanCodec;

impl ValueCodec for BooleanCodec {
    fn deserialize(&self, input: Option<&str>) -> DomainResult<ScalarValue> {
        match input {
            Some("true") => Ok(ScalarValue::Boolean(true)),
            Some("false") => Ok(ScalarValue::Boolean(false)),
            Some(_) => Err(invalid(ScalarType::Boolean, input, "expected 'true' or 'false'")),
            None => Err(invalid(ScalarType::Boolean, input, "value is absent")),
        }
    }
}

/// `empty` leaves carry presence only.
#[derive(Debug, Default)]
pub struct EmptyCodec;

impl ValueCodec for EmptyCodec {
    fn deserialize(&self, input: Option<&str>) -> DomainResult<ScalarValue> {
        match input {
            None | Some("") => Ok(ScalarValue::Empty),
            Some(_) => Err(invalid(ScalarType::Empty, input, "empty type takes no value")),
        }
    }
}

/// Range-checked integer codec for one of the `intN`/`uintN` types.
#[derive(Debug)]
pub struct IntegerCodec {
    type_name: ScalarType,
    min: i128,
    max: i128,
}

impl IntegerCodec {
    /// Returns `None` for non-integer types.
    pub fn new(type_name: ScalarType) -> Option<Self> {
        let (min, max) = type_name.integer_range()?;
        Some(Self { type_name, min, max })
    }

    fn is_signed(&self) -> bool {
        self.min < 0
    }
}

impl ValueCodec for IntegerCodec {
    fn deserialize(&self, input: Option<&str>) -> DomainResult<ScalarValue> {
        let text = input.ok_or_else(|| invalid(self.type_name, input, "value is absent"))?;
        let parsed =
            parse_integer(text).map_err(|reason| invalid(self.type_name, input, reason))?;

        if parsed < self.min || parsed > self.max {
            return Err(invalid(
                self.type_name,
                input,
                format!("out of range [{}, {}]", self.min, self.max),
            ));
        }

        // Range check above makes both conversions lossless.
        let value = if self.is_signed() {
            i64::try_from(parsed).map(ScalarValue::Int).ok()
        } else {
            u64::try_from(parsed).map(ScalarValue::Uint).ok()
        };
        value.ok_or_else(|| invalid(self.type_name, input, "out of range"))
    }
}

/// Parse `[+-](0x<hex>|0<octal>|<decimal>)`.
fn parse_integer(text: &str) -> Result<i128, String> {
    let (negative, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        Some(_) => (false, text),
        None => return Err("value is empty".to_string()),
    };

    let (radix, digits) = if let Some(hex) = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        (16, hex)
    } else if unsigned.len() > 1 && unsigned.starts_with('0') {
        (8, &unsigned[1..])
    } else {
        (10, unsigned)
    };

    if digits.is_empty() {
        return Err("no digits".to_string());
    }
    if let Some(bad) = digits.chars().find(|c| !c.is_digit(radix)) {
        return Err(format!("invalid character {:?} for radix {}", bad, radix));
    }

    let magnitude = i128::from_str_radix(digits, radix).map_err(|e| e.to_string())?;
    Ok(if negative { -magnitude } else { magnitude })
}

/// Codecs keyed by scalar type; every built-in type is registered by default.
pub struct CodecRegistry {
    codecs: HashMap<ScalarType, Box<dyn ValueCodec>>,
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("types", &self.codecs.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CodecRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            codecs: HashMap::new(),
        };
        for type_name in ScalarType::ALL {
            let codec: Box<dyn ValueCodec> = match type_name {
                ScalarType::String => Box::new(StringCodec),
                ScalarType::Boolean => Box::new(BooleanCodec),
                ScalarType::Empty => Box::new(EmptyCodec),
                _ => match IntegerCodec::new(type_name) {
                    Some(codec) => Box::new(codec),
                    None => continue,
                },
            };
            registry.register(type_name, codec);
        }
        registry
    }

    /// Replace the codec used for `type_name`.
    pub fn register(&mut self, type_name: ScalarType, codec: Box<dyn ValueCodec>) {
        self.codecs.insert(type_name, codec);
    }

    pub fn codec(&self, type_name: ScalarType) -> Option<&dyn ValueCodec> {
        self.codecs.get(&type_name).map(|c| c.as_ref())
    }

    #[instrument(level = "trace", skip(self))]
    pub fn deserialize(&self, type_name: ScalarType, input: Option<&str>) -> DomainResult<ScalarValue> {
        self.lookup(type_name, input)?.deserialize(input)
    }

    pub fn serialize(&self, type_name: ScalarType, value: Option<&ScalarValue>) -> DomainResult<String> {
        let input = value.map(ToString::to_string);
        Ok(self.lookup(type_name, input.as_deref())?.serialize(value))
    }

    fn lookup(&self, type_name: ScalarType, input: Option<&str>) -> DomainResult<&dyn ValueCodec> {
        self.codec(type_name)
            .ok_or_else(|| invalid(type_name, input, "no codec registered"))
    }
}
