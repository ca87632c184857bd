use std::collections::BTreeMap;

use crate::descriptor::{TypeDescriptor, Wire};
use crate::error::{Error, Result};
use crate::header::MAX_PACKED_VALUE;
use crate::proto::Protocol;
use crate::wire_type::WireType;


/// A struct member's wire identity. The name is only used in diagnostics;
/// the ID is what goes on the wire.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    name:       String,
    id:         u32,
    descriptor: TypeDescriptor,
    deprecated: bool,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, id: u32, descriptor: TypeDescriptor) -> FieldDescriptor {
        FieldDescriptor { name: name.into(), id, descriptor, deprecated: false }
    }

    /// Deprecated fields are still read, but never written.
    pub fn deprecated(mut self) -> FieldDescriptor {
        self.deprecated = true;
        self
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn id(&self) -> u32 { self.id }
    pub fn descriptor(&self) -> &TypeDescriptor { &self.descriptor }
    pub fn wire_type(&self) -> WireType { self.descriptor.wire_type() }
    pub fn is_deprecated(&self) -> bool { self.deprecated }
}


/// Field table of one struct type, keyed and iterated by ascending ID.
#[derive(Debug, Clone)]
pub struct StructSchema {
    name:   String,
    fields: BTreeMap<u32, FieldDescriptor>,
}

impl StructSchema {
    pub fn builder(name: impl Into<String>) -> StructSchemaBuilder {
        StructSchemaBuilder { name: name.into(), fields: vec![] }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self, id: u32) -> Option<&FieldDescriptor> {
        self.fields.get(&id)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}


pub struct StructSchemaBuilder {
    name:   String,
    fields: Vec<FieldDescriptor>,
}

impl StructSchemaBuilder {
    pub fn field(mut self, field: FieldDescriptor) -> StructSchemaBuilder {
        self.fields.push(field);
        self
    }

    /// Rejects duplicate IDs, IDs outside `1..=MAX_PACKED_VALUE`, and fields
    /// whose type does not resolve.
    pub fn build(self) -> Result<StructSchema> {
        let mut fields = BTreeMap::new();
        for field in self.fields {
            if field.id == 0 || field.id > MAX_PACKED_VALUE {
                return Err(Error::InvalidFieldId {
                    struct_name: self.name,
                    field:       field.name,
                    id:          field.id,
                });
            }

            field.descriptor.check_supported().map_err(|_| {
                Error::UnsupportedType(format!("{}.{}", self.name, field.name))
            })?;

            if fields.contains_key(&field.id) {
                return Err(Error::DuplicateFieldId {
                    struct_name: self.name,
                    field:       field.name,
                    id:          field.id,
                });
            }
            fields.insert(field.id, field);
        }

        Ok(StructSchema { name: self.name, fields })
    }
}


/// Read access to a struct instance's fields, by ID.
pub trait StructValue {
    fn schema(&self) -> Result<&'static StructSchema>;

    /// `None` when the struct has no member for `id`.
    fn field_value(&self, id: u32) -> Option<&dyn Wire>;
}

/// A registered struct type: its schema, a blank instance, and per-field
/// assignment from the wire.
pub trait Message: StructValue + Sized {
    fn message_schema() -> Result<&'static StructSchema>;

    fn instantiate() -> Result<Self>;

    fn read_field(&mut self, field: &FieldDescriptor, proto: &mut dyn Protocol) -> Result<()>;
}


/// Declares a struct together with its field IDs and registers it as a
/// [`Message`].
///
/// ```
/// msglib::message! {
///     #[derive(Debug, Default, PartialEq)]
///     pub struct Point {
///         1 => pub x: i32,
///         2 => pub y: i32,
///         3 => pub label: Option<String>,
///     }
/// }
/// ```
///
/// A trailing `[deprecated]` after a field's type marks it deprecated in the
/// schema. The struct must implement `Default`.
#[macro_export]
macro_rules! message {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $id:literal => $fvis:vis $field:ident : $ty:ty $([$flag:ident])? ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $fvis $field: $ty, )*
        }

        impl $crate::StructValue for $name {
            fn schema(&self) -> $crate::Result<&'static $crate::StructSchema> {
                <$name as $crate::Message>::message_schema()
            }

            fn field_value(&self, id: u32) -> ::std::option::Option<&dyn $crate::Wire> {
                match id {
                    $( $id => ::std::option::Option::Some(&self.$field as &dyn $crate::Wire), )*
                    _ => ::std::option::Option::None,
                }
            }
        }

        impl $crate::Message for $name {
            fn message_schema() -> $crate::Result<&'static $crate::StructSchema> {
                static SCHEMA: ::std::sync::OnceLock<$crate::Result<$crate::StructSchema>> = ::std::sync::OnceLock::new();
                SCHEMA.get_or_init(|| {
                    $crate::StructSchema::builder(stringify!($name))
                    $(
                        .field($crate::FieldDescriptor::new(
                            stringify!($field), $id, <$ty as $crate::Wire>::descriptor())
                            $(.$flag())?)
                    )*
                    .build()
                }).as_ref().map_err(|e| e.clone())
            }

            fn instantiate() -> $crate::Result<Self> {
                ::std::result::Result::Ok(<$name as ::std::default::Default>::default())
            }

            fn read_field(&mut self, field: &$crate::FieldDescriptor, proto: &mut dyn $crate::Protocol) -> $crate::Result<()> {
                match field.id() {
                    $( $id => { self.$field = <$ty as $crate::Wire>::decode(field.descriptor(), proto)?; }, )*
                    _ => {
                        return ::std::result::Result::Err($crate::Error::FieldAccess {
                            struct_name: stringify!($name).into(),
                            field:       field.name().into(),
                        });
                    },
                }
                ::std::result::Result::Ok(())
            }
        }

        impl $crate::Wire for $name {
            fn descriptor() -> $crate::TypeDescriptor {
                $crate::TypeDescriptor::Struct(<$name as $crate::Message>::message_schema)
            }

            fn as_value(&self) -> $crate::ValueRef<'_> {
                $crate::ValueRef::Struct(self)
            }

            fn decode(ty: &$crate::TypeDescriptor, proto: &mut dyn $crate::Protocol) -> $crate::Result<Self> {
                $crate::decoder::read_struct::<$name>(ty, proto)
            }
        }
    };
}
