use crate::config::Limits;
use crate::error::Result;
use crate::header::{FieldHeader, ListHeader, MapHeader};


/// The contract both wire formats implement.
///
/// Headers are built on two hooks: `write_packed` / `read_packed` carry an
/// unsigned header integer, and the map's type byte travels through
/// `write_byte` / `read_byte`. Bool rides on the byte encoding as well.
pub trait Protocol {
    fn limits(&self) -> Limits;

    /// Called before reading a nested struct or container. Fails once the
    /// depth exceeds `Limits::max_depth`.
    fn enter(&mut self) -> Result<()>;
    fn leave(&mut self);

    fn write_packed(&mut self, value: u32) -> Result<()>;
    fn read_packed(&mut self) -> Result<u32>;


    fn write_struct_begin(&mut self, _name: &str) -> Result<()> {
        Ok(())
    }

    fn write_struct_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_field_begin(&mut self, field: FieldHeader) -> Result<()> {
        let packed = field.pack()?;
        self.write_packed(packed)
    }

    fn write_field_stop(&mut self) -> Result<()> {
        self.write_field_begin(FieldHeader::STOP)
    }

    fn write_map_begin(&mut self, map: MapHeader) -> Result<()> {
        self.write_packed(map.count)?;
        self.write_byte(map.pack_types() as i8)
    }

    fn write_list_begin(&mut self, list: ListHeader) -> Result<()> {
        let packed = list.pack()?;
        self.write_packed(packed)
    }

    fn write_set_begin(&mut self, set: ListHeader) -> Result<()> {
        self.write_list_begin(set)
    }

    fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_byte(if value { 1 } else { 0 })
    }

    fn write_byte(&mut self, value: i8) -> Result<()>;
    fn write_i16(&mut self, value: i16) -> Result<()>;
    fn write_i32(&mut self, value: i32) -> Result<()>;
    fn write_i64(&mut self, value: i64) -> Result<()>;
    fn write_float(&mut self, value: f32) -> Result<()>;
    fn write_double(&mut self, value: f64) -> Result<()>;
    fn write_binary(&mut self, value: &[u8]) -> Result<()>;
    fn write_string(&mut self, value: &str) -> Result<()>;


    fn read_struct_begin(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_struct_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_field_begin(&mut self) -> Result<FieldHeader> {
        let packed = self.read_packed()?;
        FieldHeader::unpack(packed)
    }

    fn read_map_begin(&mut self) -> Result<MapHeader> {
        let count = self.read_packed()?;
        let types = self.read_byte()? as u8;
        MapHeader::unpack(count, types)
    }

    fn read_list_begin(&mut self) -> Result<ListHeader> {
        let packed = self.read_packed()?;
        ListHeader::unpack(packed)
    }

    fn read_set_begin(&mut self) -> Result<ListHeader> {
        self.read_list_begin()
    }

    /// Anything other than 1 reads as false.
    fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_byte()? == 1)
    }

    fn read_byte(&mut self) -> Result<i8>;
    fn read_i16(&mut self) -> Result<i16>;
    fn read_i32(&mut self) -> Result<i32>;
    fn read_i64(&mut self) -> Result<i64>;
    fn read_float(&mut self) -> Result<f32>;
    fn read_double(&mut self) -> Result<f64>;
    fn read_binary(&mut self) -> Result<Vec<u8>>;
    fn read_string(&mut self) -> Result<String>;
}
