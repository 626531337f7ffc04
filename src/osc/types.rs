use std::fmt;

use super::super::enums;
use super::Buffer;

// MARK: Type
/// OSC argument values, Eos dialect subset
#[derive(Debug, PartialEq, PartialOrd, Clone)]
pub enum Type {
    /// 4-byte padded string (s:0x73)
    String(String),
    /// Type list, sent as (,:0x2c) prefixed string
    TypeList(Vec<char>),
    /// 32-bit BE integer (i:0x69)
    Integer(i32),
    /// 64-bit BE integer (h:0x68)
    LongInteger(i64),
    /// 32-bit BE floating point (f:0x66)
    Float(f32),
    /// 64-bit BE floating point (d:0x64)
    Double(f64),
    /// Bool (T:0x54, F:0x46) (empty)
    Boolean(bool),
    /// Null (N:0x4e) (empty)
    Null(),
    /// Generic error type when others fail
    Unknown(),
}

impl Default for Type {
    fn default() -> Self { Self::Unknown() }
}
impl Default for &Type {
    fn default() -> Self { &Type::Unknown() }
}

/// generate `From<T>` and `TryFrom<Type>` for `Type`
macro_rules! value_impl {
    ($(($variant:ident, $ty:ty)),*) => {
        $(
        impl From<$ty> for Type {
            fn from(v: $ty) -> Self {
                Type::$variant(v)
            }
        }
        impl TryFrom<Type> for $ty {
            type Error = enums::Error;

            fn try_from(v: Type) -> Result<$ty, Self::Error> {
                match v {
                    Type::$variant(v) => Ok(v),
                    _ => Err(enums::Error::Osc(enums::OscError::InvalidTypeConversion))
                }
            }
        }
        )*
    }
}

value_impl! {
    (Integer, i32),
    (LongInteger, i64),
    (Float, f32),
    (Double, f64),
    (String, String),
    (TypeList, Vec<char>),
    (Boolean, bool)
}

impl From<&str> for Type {
    fn from(v: &str) -> Self { Self::String(v.to_owned()) }
}

// MARK: Type->Buffer
impl From<Type> for Buffer {
    fn from(v: Type) -> Self { Self::from(<Type as Into<Vec<u8>>>::into(v)) }
}

/// Pad a string buffer (`Vec<u8>`) to a 4-byte multiple, always null terminated
fn padded_string_buffer(v: &str) -> Vec<u8> {
    let mut buffer = v.as_bytes().to_vec();
    let len_act = buffer.len();
    let len_pad = 4 - (len_act % 4);
    buffer.resize(len_act + len_pad, 0_u8);
    buffer
}

// MARK: Type -> Vec<u8>
impl From<Type> for Vec<u8> {
    fn from(v: Type) -> Self {
        match v {
            Type::Integer(v)     => v.to_be_bytes().to_vec(),
            Type::LongInteger(v) => v.to_be_bytes().to_vec(),
            Type::Float(v)       => v.to_be_bytes().to_vec(),
            Type::Double(v)      => v.to_be_bytes().to_vec(),
            Type::String(v)      => padded_string_buffer(&v),
            Type::TypeList(v) => {
                if v.is_empty() {
                    vec![]
                } else {
                    padded_string_buffer(&format!(",{}", v.into_iter().collect::<String>()))
                }
            },
            _ => vec![],
        }
    }
}

// MARK: Type -> String
impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let type_flag = self.as_type_char().unwrap_or('*');

        let type_string: String = match &self {
            Self::Float(v) => v.to_string(),
            Self::Double(v) => v.to_string(),
            Self::Integer(v) => v.to_string(),
            Self::LongInteger(v) => v.to_string(),
            Self::String(v) => v.clone(),
            Self::TypeList(v) => v.iter().collect(),
            Self::Null() | Self::Boolean(_) | Self::Unknown() => String::new(),
        };

        write!(f, "|{type_flag}:{type_string}|")
    }
}

// MARK: ([u8],ch) -> Type
impl TryFrom<(&[u8], char)> for Type {
    type Error = enums::Error;

    fn try_from(value: (&[u8], char)) -> Result<Self, Self::Error> {
        if value.0.len() % 4 != 0 { return Err(enums::Error::Packet(enums::PacketError::NotFourByte)) }
        match (value.1, value.0.len()) {
            ('T', 0) => Ok(true.into()),
            ('F', 0) => Ok(false.into()),
            ('N', 0) => Ok(Self::Null()),
            (',', 0) => Ok(Self::TypeList(vec![])),

            ('i', 4) => {
                let v = &value.0[0..4].try_into().map_err(|_| enums::Error::Packet(enums::PacketError::Underrun))?;
                Ok(i32::from_be_bytes(*v).into())
            },

            ('f', 4) => {
                let v = &value.0[0..4].try_into().map_err(|_| enums::Error::Packet(enums::PacketError::Underrun))?;
                Ok(f32::from_be_bytes(*v).into())
            },

            ('h', 8) => {
                let v = &value.0[0..8].try_into().map_err(|_| enums::Error::Packet(enums::PacketError::Underrun))?;
                Ok(i64::from_be_bytes(*v).into())
            },

            ('d', 8) => {
                let v = &value.0[0..8].try_into().map_err(|_| enums::Error::Packet(enums::PacketError::Underrun))?;
                Ok(f64::from_be_bytes(*v).into())
            },

            ('i' | 'f' | 'h' | 'd', _) | (_, 0) => Err(enums::Error::Packet(enums::PacketError::Underrun)),

            ('s', _) => {
                let v = std::str::from_utf8(value.0).map_err(|_| enums::Error::Osc(enums::OscError::ConvertFromString))?;
                Ok(v.trim_end_matches(char::from(0)).to_owned().into())
            },

            (',', _) => {
                let mut type_list: Vec<char> = vec![];
                for i in &value.0[1..] {
                    if i != &0_u8 { type_list.push(*i as char); }
                }
                Ok(type_list.into())
            },

            _ => Err(enums::Error::Osc(enums::OscError::UnknownType))
        }
    }
}

// MARK: Type impl
impl Type {
    /// is error type? (bool)
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(&self, Self::Unknown())
    }

    /// Decode a block read result into a `Type`
    ///
    /// # Errors
    /// fails on invalid packets or unknown type or invalid type conversion
    #[inline]
    pub fn try_from_buffer(item: Result<Vec<u8>, enums::Error>, type_flag: char) -> Result<Self, enums::Error> {
        match item {
            Err(v) => Err(v),
            Ok(item) => (item.as_slice(), type_flag).try_into()
        }
    }

    /// get character type association
    ///
    /// # Errors
    /// fails on the error type
    pub fn as_type_char(&self) -> Result<char, enums::Error> {
        match &self {
            Self::String(_)      => Ok('s'),
            Self::Integer(_)     => Ok('i'),
            Self::TypeList(_)    => Ok(','),
            Self::Double(_)      => Ok('d'),
            Self::Float(_)       => Ok('f'),
            Self::LongInteger(_) => Ok('h'),
            Self::Null()         => Ok('N'),
            Self::Boolean(v) => if *v { Ok('T') } else { Ok('F') },
            Self::Unknown() => Err(enums::Error::Osc(enums::OscError::UnknownType)),
        }
    }

    /// Get the value with a fallback, type chosen by the default
    #[must_use]
    pub fn default_value<T>(self, default: T) -> T where
        T: TryFrom<Self>
    {
        T::try_from(self).unwrap_or(default)
    }

    /// Read as an integer if the console sent any numeric shape
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(i64::from(*v)),
            Self::LongInteger(v) => Some(*v),
            Self::Float(v) => Some(*v as i64),
            Self::Double(v) => Some(*v as i64),
            _ => None,
        }
    }

    /// Read as a string slice when the argument is a string
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Read as a boolean; accepts T/F and 1/0 integers
    #[must_use]
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            Self::Integer(v) => Some(*v != 0),
            Self::LongInteger(v) => Some(*v != 0),
            _ => None,
        }
    }
}
