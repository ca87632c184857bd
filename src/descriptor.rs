use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use crate::decoder;
use crate::error::{Error, Result};
use crate::proto::Protocol;
use crate::schema::{StructSchema, StructValue};
use crate::wire_type::WireType;


/// Looks up a struct's field table on first use.
pub type SchemaFn = fn() -> Result<&'static StructSchema>;


/// Resolved shape of a value: its wire tag plus element, key and value
/// descriptors for containers. Structs carry a lazy handle to their schema.
#[derive(Clone)]
pub enum TypeDescriptor {
    Null,
    Bool,
    Byte,
    I16,
    I32,
    I64,
    Float,
    Double,
    Binary,
    String,
    Struct(SchemaFn),
    Map(Box<TypeDescriptor>, Box<TypeDescriptor>),
    List(Box<TypeDescriptor>),
    Set(Box<TypeDescriptor>),
}

impl TypeDescriptor {
    pub fn list(element: TypeDescriptor) -> TypeDescriptor {
        TypeDescriptor::List(Box::new(element))
    }

    pub fn set(element: TypeDescriptor) -> TypeDescriptor {
        TypeDescriptor::Set(Box::new(element))
    }

    pub fn map(key: TypeDescriptor, value: TypeDescriptor) -> TypeDescriptor {
        TypeDescriptor::Map(Box::new(key), Box::new(value))
    }

    pub fn wire_type(&self) -> WireType {
        use TypeDescriptor::*;
        match self {
            Null      => WireType::Null,
            Bool      => WireType::Bool,
            Byte      => WireType::Byte,
            I16       => WireType::I16,
            I32       => WireType::I32,
            I64       => WireType::I64,
            Float     => WireType::Float,
            Double    => WireType::Double,
            Binary    => WireType::Binary,
            String    => WireType::String,
            Struct(_) => WireType::Struct,
            Map(..)   => WireType::Map,
            List(_)   => WireType::List,
            Set(_)    => WireType::Set,
        }
    }

    /// Fails for `Null` and for containers whose parts are `Null`.
    pub fn check_supported(&self) -> Result<()> {
        match self {
            TypeDescriptor::Null => Err(Error::UnsupportedType("unresolved type".into())),
            TypeDescriptor::List(element) | TypeDescriptor::Set(element) => element.check_supported(),
            TypeDescriptor::Map(key, value) => {
                key.check_supported()?;
                value.check_supported()
            },
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Struct(schema) => {
                match schema() {
                    Ok(schema) => write!(f, "Struct({})", schema.name()),
                    Err(_)     => write!(f, "Struct(<invalid>)"),
                }
            },
            TypeDescriptor::Map(key, value) => write!(f, "Map({:?}, {:?})", key, value),
            TypeDescriptor::List(element)   => write!(f, "List({:?})", element),
            TypeDescriptor::Set(element)    => write!(f, "Set({:?})", element),
            other => write!(f, "{:?}", other.wire_type()),
        }
    }
}


/// Borrowed view of a value, as the encoder sees it.
pub enum ValueRef<'a> {
    Absent,
    Bool   (bool),
    Byte   (i8),
    I16    (i16),
    I32    (i32),
    I64    (i64),
    Float  (f32),
    Double (f64),
    Binary (&'a [u8]),
    String (&'a str),
    Struct (&'a dyn StructValue),
    Seq    (Vec<&'a dyn Wire>),
    Map    (Vec<(&'a dyn Wire, &'a dyn Wire)>),
}

impl<'a> ValueRef<'a> {
    pub fn kind(&self) -> &'static str {
        use ValueRef::*;
        match self {
            Absent    => "absent",
            Bool(_)   => "bool",
            Byte(_)   => "byte",
            I16(_)    => "i16",
            I32(_)    => "i32",
            I64(_)    => "i64",
            Float(_)  => "float",
            Double(_) => "double",
            Binary(_) => "byte sequence",
            String(_) => "string",
            Struct(_) => "struct",
            Seq(_)    => "sequence",
            Map(_)    => "map",
        }
    }
}


/// A Rust type the engine can encode and decode.
///
/// `descriptor` is the static type-to-tag resolution: primitives map to
/// their fixed tag, `Vec<u8>` to Binary, other `Vec`s to List, sets to Set,
/// maps to Map, and registered messages to Struct. `Option<T>` resolves like
/// `T` and reads as absent when `None`. Types with no resolution simply do
/// not implement this trait.
pub trait Wire {
    fn descriptor() -> TypeDescriptor where Self: Sized;

    fn as_value(&self) -> ValueRef<'_>;

    fn decode(ty: &TypeDescriptor, proto: &mut dyn Protocol) -> Result<Self> where Self: Sized;
}


macro_rules! impl_wire_primitive {
    ($ty:ty, $tag:ident, $read:ident) => {
        impl Wire for $ty {
            fn descriptor() -> TypeDescriptor { TypeDescriptor::$tag }

            fn as_value(&self) -> ValueRef<'_> { ValueRef::$tag(*self) }

            fn decode(ty: &TypeDescriptor, proto: &mut dyn Protocol) -> Result<Self> {
                decoder::expect_wire_type(ty, WireType::$tag)?;
                proto.$read()
            }
        }
    };
}

impl_wire_primitive!(bool, Bool,   read_bool);
impl_wire_primitive!(i8,   Byte,   read_byte);
impl_wire_primitive!(i16,  I16,    read_i16);
impl_wire_primitive!(i32,  I32,    read_i32);
impl_wire_primitive!(i64,  I64,    read_i64);
impl_wire_primitive!(f32,  Float,  read_float);
impl_wire_primitive!(f64,  Double, read_double);


// unsigned integers travel as their signed bit pattern.
macro_rules! impl_wire_unsigned {
    ($ty:ty, $signed:ty, $tag:ident, $read:ident) => {
        impl Wire for $ty {
            fn descriptor() -> TypeDescriptor { TypeDescriptor::$tag }

            fn as_value(&self) -> ValueRef<'_> { ValueRef::$tag(*self as $signed) }

            fn decode(ty: &TypeDescriptor, proto: &mut dyn Protocol) -> Result<Self> {
                decoder::expect_wire_type(ty, WireType::$tag)?;
                Ok(proto.$read()? as $ty)
            }
        }
    };
}

impl_wire_unsigned!(u16, i16, I16, read_i16);
impl_wire_unsigned!(u32, i32, I32, read_i32);
impl_wire_unsigned!(u64, i64, I64, read_i64);


impl Wire for String {
    fn descriptor() -> TypeDescriptor { TypeDescriptor::String }

    fn as_value(&self) -> ValueRef<'_> { ValueRef::String(self) }

    fn decode(ty: &TypeDescriptor, proto: &mut dyn Protocol) -> Result<Self> {
        decoder::expect_wire_type(ty, WireType::String)?;
        proto.read_string()
    }
}

// a raw byte sequence. `u8` itself is not `Wire`, which keeps this apart
// from the generic `Vec<T>` list impl below.
impl Wire for Vec<u8> {
    fn descriptor() -> TypeDescriptor { TypeDescriptor::Binary }

    fn as_value(&self) -> ValueRef<'_> { ValueRef::Binary(self) }

    fn decode(ty: &TypeDescriptor, proto: &mut dyn Protocol) -> Result<Self> {
        decoder::expect_wire_type(ty, WireType::Binary)?;
        proto.read_binary()
    }
}

impl<T: Wire> Wire for Vec<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::list(T::descriptor())
    }

    fn as_value(&self) -> ValueRef<'_> {
        ValueRef::Seq(self.iter().map(|v| v as &dyn Wire).collect())
    }

    fn decode(ty: &TypeDescriptor, proto: &mut dyn Protocol) -> Result<Self> {
        let mut result = vec![];
        decoder::read_sequence(ty, proto, |element, proto| {
            result.push(T::decode(element, proto)?);
            Ok(())
        })?;
        Ok(result)
    }
}

impl<T: Wire + Eq + Hash> Wire for HashSet<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::set(T::descriptor())
    }

    fn as_value(&self) -> ValueRef<'_> {
        ValueRef::Seq(self.iter().map(|v| v as &dyn Wire).collect())
    }

    fn decode(ty: &TypeDescriptor, proto: &mut dyn Protocol) -> Result<Self> {
        let mut result = HashSet::new();
        decoder::read_sequence(ty, proto, |element, proto| {
            result.insert(T::decode(element, proto)?);
            Ok(())
        })?;
        Ok(result)
    }
}

impl<T: Wire + Ord> Wire for BTreeSet<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::set(T::descriptor())
    }

    fn as_value(&self) -> ValueRef<'_> {
        ValueRef::Seq(self.iter().map(|v| v as &dyn Wire).collect())
    }

    fn decode(ty: &TypeDescriptor, proto: &mut dyn Protocol) -> Result<Self> {
        let mut result = BTreeSet::new();
        decoder::read_sequence(ty, proto, |element, proto| {
            result.insert(T::decode(element, proto)?);
            Ok(())
        })?;
        Ok(result)
    }
}

impl<K: Wire + Eq + Hash, V: Wire> Wire for HashMap<K, V> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::map(K::descriptor(), V::descriptor())
    }

    fn as_value(&self) -> ValueRef<'_> {
        ValueRef::Map(self.iter().map(|(k, v)| (k as &dyn Wire, v as &dyn Wire)).collect())
    }

    fn decode(ty: &TypeDescriptor, proto: &mut dyn Protocol) -> Result<Self> {
        let mut result = HashMap::new();
        decoder::read_map(ty, proto, |key, value, proto| {
            let k = K::decode(key, proto)?;
            let v = V::decode(value, proto)?;
            result.insert(k, v);
            Ok(())
        })?;
        Ok(result)
    }
}

impl<K: Wire + Ord, V: Wire> Wire for BTreeMap<K, V> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::map(K::descriptor(), V::descriptor())
    }

    fn as_value(&self) -> ValueRef<'_> {
        ValueRef::Map(self.iter().map(|(k, v)| (k as &dyn Wire, v as &dyn Wire)).collect())
    }

    fn decode(ty: &TypeDescriptor, proto: &mut dyn Protocol) -> Result<Self> {
        let mut result = BTreeMap::new();
        decoder::read_map(ty, proto, |key, value, proto| {
            let k = K::decode(key, proto)?;
            let v = V::decode(value, proto)?;
            result.insert(k, v);
            Ok(())
        })?;
        Ok(result)
    }
}

impl<T: Wire> Wire for Option<T> {
    fn descriptor() -> TypeDescriptor {
        T::descriptor()
    }

    fn as_value(&self) -> ValueRef<'_> {
        match self {
            Some(value) => value.as_value(),
            None        => ValueRef::Absent,
        }
    }

    fn decode(ty: &TypeDescriptor, proto: &mut dyn Protocol) -> Result<Self> {
        Ok(Some(T::decode(ty, proto)?))
    }
}

impl<T: Wire> Wire for Box<T> {
    fn descriptor() -> TypeDescriptor {
        T::descriptor()
    }

    fn as_value(&self) -> ValueRef<'_> {
        (**self).as_value()
    }

    fn decode(ty: &TypeDescriptor, proto: &mut dyn Protocol) -> Result<Self> {
        Ok(Box::new(T::decode(ty, proto)?))
    }
}
