use log::trace;

use crate::descriptor::{TypeDescriptor, ValueRef, Wire};
use crate::error::{Error, Result};
use crate::header::{FieldHeader, ListHeader, MapHeader};
use crate::proto::Protocol;
use crate::schema::StructValue;


/// Writes `value` as described by `ty`.
pub fn write(proto: &mut dyn Protocol, value: &dyn Wire, ty: &TypeDescriptor) -> Result<()> {
    write_value(proto, value.as_value(), ty)
}

pub fn write_value(proto: &mut dyn Protocol, value: ValueRef, ty: &TypeDescriptor) -> Result<()> {
    use TypeDescriptor as T;
    use ValueRef as V;

    match (ty, value) {
        (T::Null, _) => Err(Error::UnsupportedType("cannot write a value of unresolved type".into())),

        (T::Bool,   V::Bool(value))   => proto.write_bool(value),
        (T::Byte,   V::Byte(value))   => proto.write_byte(value),
        (T::I16,    V::I16(value))    => proto.write_i16(value),
        (T::I32,    V::I32(value))    => proto.write_i32(value),
        (T::I64,    V::I64(value))    => proto.write_i64(value),
        (T::Float,  V::Float(value))  => proto.write_float(value),
        (T::Double, V::Double(value)) => proto.write_double(value),
        (T::Binary, V::Binary(value)) => proto.write_binary(value),
        (T::String, V::String(value)) => proto.write_string(value),

        (T::Struct(_), V::Struct(value)) => write_struct(proto, value),

        (T::List(element), V::Seq(values)) => {
            proto.write_list_begin(ListHeader::new(values.len(), element.wire_type())?)?;
            write_elements(proto, &values, element)
        },

        (T::Set(element), V::Seq(values)) => {
            proto.write_set_begin(ListHeader::new(values.len(), element.wire_type())?)?;
            write_elements(proto, &values, element)
        },

        (T::Map(key_ty, value_ty), V::Map(entries)) => {
            proto.write_map_begin(MapHeader::new(entries.len(), key_ty.wire_type(), value_ty.wire_type())?)?;
            for (key, value) in entries {
                write_present(proto, key, key_ty)?;
                write_present(proto, value, value_ty)?;
            }
            Ok(())
        },

        (ty, value) => Err(Error::mismatch(ty, value.kind())),
    }
}

fn write_elements(proto: &mut dyn Protocol, values: &[&dyn Wire], element: &TypeDescriptor) -> Result<()> {
    for value in values {
        write_present(proto, *value, element)?;
    }
    Ok(())
}

// containers have no per-entry presence, so an absent entry cannot be written.
fn write_present(proto: &mut dyn Protocol, value: &dyn Wire, ty: &TypeDescriptor) -> Result<()> {
    match value.as_value() {
        ValueRef::Absent => Err(Error::mismatch(ty, "absent container entry")),
        value            => write_value(proto, value, ty),
    }
}

/// Present, non-deprecated fields in ascending ID order, then the stop
/// header. Absent fields produce no bytes at all.
pub fn write_struct(proto: &mut dyn Protocol, value: &dyn StructValue) -> Result<()> {
    let schema = value.schema()?;
    proto.write_struct_begin(schema.name())?;

    for field in schema.fields() {
        if field.is_deprecated() {
            trace!("not writing deprecated field {}.{}", schema.name(), field.name());
            continue;
        }

        let field_value = value.field_value(field.id()).ok_or_else(|| Error::FieldAccess {
            struct_name: schema.name().into(),
            field:       field.name().into(),
        })?;

        let field_value = field_value.as_value();
        if let ValueRef::Absent = field_value {
            continue;
        }

        proto.write_field_begin(FieldHeader::new(field.id(), field.wire_type()))?;
        write_value(proto, field_value, field.descriptor())?;
    }

    proto.write_field_stop()?;
    proto.write_struct_end()
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::BinaryProtocol;
    use std::collections::BTreeMap;

    fn written(value: &dyn Wire, ty: &TypeDescriptor) -> Result<Vec<u8>> {
        let mut proto = BinaryProtocol::new(vec![]);
        write(&mut proto, value, ty)?;
        Ok(proto.into_inner())
    }

    #[test]
    fn lists_have_a_single_header() {
        let value = vec![1i32, -1, 2];
        let bytes = written(&value, &<Vec<i32> as Wire>::descriptor()).unwrap();
        assert_eq!(bytes, [(3 << 4) | 5, 2, 1, 4]);
    }

    #[test]
    fn sets_use_the_list_layout() {
        let value: std::collections::BTreeSet<i8> = [3, 1].into_iter().collect();
        let bytes = written(&value, &<std::collections::BTreeSet<i8> as Wire>::descriptor()).unwrap();
        assert_eq!(bytes, [(2 << 4) | 3, 1, 3]);
    }

    #[test]
    fn maps_write_key_then_value() {
        let mut value = BTreeMap::new();
        value.insert("a".to_string(), true);
        value.insert("b".to_string(), false);
        let bytes = written(&value, &<BTreeMap<String, bool> as Wire>::descriptor()).unwrap();
        assert_eq!(bytes, [2, 0x2a, 1, b'a', 1, 1, b'b', 0]);
    }

    #[test]
    fn empty_containers() {
        let value: Vec<String> = vec![];
        assert_eq!(written(&value, &<Vec<String> as Wire>::descriptor()).unwrap(), [10]);
    }

    #[test]
    fn tag_value_mismatch_fails() {
        let value = 5i32;
        let result = written(&value, &TypeDescriptor::Binary);
        assert_eq!(result, Err(Error::TypeMismatch { expected: "Binary".into(), found: "i32".into() }));

        let result = written(&value, &TypeDescriptor::Null);
        assert!(matches!(result, Err(Error::UnsupportedType(_))));
    }

    #[test]
    fn absent_list_entries_fail() {
        let value = vec![Some(1i32), None];
        let result = written(&value, &<Vec<Option<i32>> as Wire>::descriptor());
        assert!(matches!(result, Err(Error::TypeMismatch { .. })));
    }
}
