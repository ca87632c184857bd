use crate::error::{Error, Result};


/// Tag identifying a value's shape on the wire.
///
/// Tags fit in 4 bits. `Null` terminates a struct's field list and marks
/// types that could not be resolved.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    Null    =  1,
    Bool    =  2,
    Byte    =  3,
    I16     =  4,
    I32     =  5,
    I64     =  6,
    Float   =  7,
    Double  =  8,
    Binary  =  9,
    String  = 10,
    Struct  = 11,
    Map     = 12,
    List    = 13,
    Set     = 14,
}

pub const WIRE_TYPE_MIN:  u8 =  1;
pub const WIRE_TYPE_MAX:  u8 = 14;
pub const WIRE_TYPE_MASK: u8 = 16 - 1;


impl WireType {
    pub fn from_u8(value: u8) -> Option<WireType> {
        use WireType::*;
        Some(match value {
            1  => Null,
            2  => Bool,
            3  => Byte,
            4  => I16,
            5  => I32,
            6  => I64,
            7  => Float,
            8  => Double,
            9  => Binary,
            10 => String,
            11 => Struct,
            12 => Map,
            13 => List,
            14 => Set,
            _  => return None,
        })
    }

    /// Decodes the low nibble of a packed header value.
    pub fn from_nibble(value: u32) -> Result<WireType> {
        let tag = (value & WIRE_TYPE_MASK as u32) as u8;
        WireType::from_u8(tag).ok_or_else(|| Error::UnsupportedType(format!("unknown wire tag {}", tag)))
    }

    /// List and Set share a header layout and are read interchangeably.
    pub fn is_compatible_with(self, other: WireType) -> bool {
        use WireType::*;
        match (self, other) {
            (List, Set) | (Set, List) => true,
            (a, b) => a == b,
        }
    }
}

impl std::fmt::Display for WireType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

impl TryFrom<u8> for WireType {
    type Error = Error;

    fn try_from(value: u8) -> Result<WireType> {
        WireType::from_u8(value).ok_or_else(|| Error::UnsupportedType(format!("unknown wire tag {}", value)))
    }
}
