//! Canonical JSON form of cache key arguments.
//!
//! Produces the same [`Value`] tree as `serde_json::to_value`, with two
//! differences. Non-finite floats become tagged strings (`"<f64:NaN>"`,
//! `"<f64:inf>"`, `"<f64:-inf>"`) instead of collapsing into `null`, and
//! 128-bit integers outside the 64-bit range become decimal strings.
//! Objects are `serde_json::Map`, which keeps keys sorted.

use serde::ser::{self, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct CanonicalError(String);

impl ser::Error for CanonicalError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        CanonicalError(msg.to_string())
    }
}

pub fn to_canonical_value<T: Serialize + ?Sized>(value: &T) -> Result<Value, CanonicalError> {
    value.serialize(CanonicalSerializer)
}

pub fn to_canonical_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CanonicalError> {
    let value = to_canonical_value(value)?;
    serde_json::to_vec(&value).map_err(|e| CanonicalError(e.to_string()))
}

fn float_value(value: f64) -> Value {
    match Number::from_f64(value) {
        Some(number) => Value::Number(number),
        None if value.is_nan() => Value::String("<f64:NaN>".to_string()),
        None if value > 0.0 => Value::String("<f64:inf>".to_string()),
        None => Value::String("<f64:-inf>".to_string()),
    }
}

fn wrap_variant(variant: Option<&'static str>, value: Value) -> Value {
    match variant {
        Some(name) => {
            let mut map = Map::new();
            map.insert(name.to_string(), value);
            Value::Object(map)
        }
        None => value,
    }
}

fn map_key(key: Value) -> Result<String, CanonicalError> {
    match key {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(CanonicalError(format!(
            "map keys must be strings, numbers or booleans, got {}",
            other
        ))),
    }
}

struct CanonicalSerializer;

impl ser::Serializer for CanonicalSerializer {
    type Ok = Value;
    type Error = CanonicalError;
    type SerializeSeq = SeqBuilder;
    type SerializeTuple = SeqBuilder;
    type SerializeTupleStruct = SeqBuilder;
    type SerializeTupleVariant = SeqBuilder;
    type SerializeMap = MapBuilder;
    type SerializeStruct = MapBuilder;
    type SerializeStructVariant = MapBuilder;

    fn serialize_bool(self, v: bool) -> Result<Value, CanonicalError> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value, CanonicalError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value, CanonicalError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value, CanonicalError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value, CanonicalError> {
        Ok(Value::Number(v.into()))
    }

    fn serialize_i128(self, v: i128) -> Result<Value, CanonicalError> {
        if let Ok(small) = i64::try_from(v) {
            Ok(Value::Number(small.into()))
        } else if let Ok(unsigned) = u64::try_from(v) {
            Ok(Value::Number(unsigned.into()))
        } else {
            Ok(Value::String(v.to_string()))
        }
    }

    fn serialize_u8(self, v: u8) -> Result<Value, CanonicalError> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value, CanonicalError> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value, CanonicalError> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value, CanonicalError> {
        Ok(Value::Number(v.into()))
    }

    fn serialize_u128(self, v: u128) -> Result<Value, CanonicalError> {
        match u64::try_from(v) {
            Ok(small) => Ok(Value::Number(small.into())),
            Err(_) => Ok(Value::String(v.to_string())),
        }
    }

    fn serialize_f32(self, v: f32) -> Result<Value, CanonicalError> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value, CanonicalError> {
        Ok(float_value(v))
    }

    fn serialize_char(self, v: char) -> Result<Value, CanonicalError> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value, CanonicalError> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value, CanonicalError> {
        Ok(Value::Array(
            v.iter().map(|&b| Value::Number(b.into())).collect(),
        ))
    }

    fn serialize_none(self) -> Result<Value, CanonicalError> {
        Ok(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value, CanonicalError>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value, CanonicalError> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, CanonicalError> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value, CanonicalError> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value, CanonicalError>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, CanonicalError>
    where
        T: ?Sized + Serialize,
    {
        let inner = value.serialize(CanonicalSerializer)?;
        Ok(wrap_variant(Some(variant), inner))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqBuilder, CanonicalError> {
        Ok(SeqBuilder {
            items: Vec::with_capacity(len.unwrap_or(0)),
            variant: None,
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqBuilder, CanonicalError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SeqBuilder, CanonicalError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SeqBuilder, CanonicalError> {
        Ok(SeqBuilder {
            items: Vec::with_capacity(len),
            variant: Some(variant),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<MapBuilder, CanonicalError> {
        Ok(MapBuilder::new(None))
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<MapBuilder, CanonicalError> {
        Ok(MapBuilder::new(None))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<MapBuilder, CanonicalError> {
        Ok(MapBuilder::new(Some(variant)))
    }
}

struct SeqBuilder {
    items: Vec<Value>,
    variant: Option<&'static str>,
}

impl SeqBuilder {
    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), CanonicalError> {
        self.items.push(value.serialize(CanonicalSerializer)?);
        Ok(())
    }

    fn finish(self) -> Value {
        wrap_variant(self.variant, Value::Array(self.items))
    }
}

impl ser::SerializeSeq for SeqBuilder {
    type Ok = Value;
    type Error = CanonicalError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), CanonicalError>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value, CanonicalError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SeqBuilder {
    type Ok = Value;
    type Error = CanonicalError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), CanonicalError>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value, CanonicalError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SeqBuilder {
    type Ok = Value;
    type Error = CanonicalError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), CanonicalError>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value, CanonicalError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SeqBuilder {
    type Ok = Value;
    type Error = CanonicalError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), CanonicalError>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value, CanonicalError> {
        Ok(self.finish())
    }
}

struct MapBuilder {
    entries: Map<String, Value>,
    next_key: Option<String>,
    variant: Option<&'static str>,
}

impl MapBuilder {
    fn new(variant: Option<&'static str>) -> Self {
        Self {
            entries: Map::new(),
            next_key: None,
            variant,
        }
    }

    fn field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), CanonicalError> {
        let value = value.serialize(CanonicalSerializer)?;
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn finish(self) -> Value {
        wrap_variant(self.variant, Value::Object(self.entries))
    }
}

impl ser::SerializeMap for MapBuilder {
    type Ok = Value;
    type Error = CanonicalError;

    fn serialize_key<T>(&mut self, key: &T) -> Result<(), CanonicalError>
    where
        T: ?Sized + Serialize,
    {
        self.next_key = Some(map_key(key.serialize(CanonicalSerializer)?)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<(), CanonicalError>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| CanonicalError("map value serialized before its key".to_string()))?;
        let value = value.serialize(CanonicalSerializer)?;
        self.entries.insert(key, value);
        Ok(())
    }

    fn end(self) -> Result<Value, CanonicalError> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for MapBuilder {
    type Ok = Value;
    type Error = CanonicalError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), CanonicalError>
    where
        T: ?Sized + Serialize,
    {
        self.field(key, value)
    }

    fn end(self) -> Result<Value, CanonicalError> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for MapBuilder {
    type Ok = Value;
    type Error = CanonicalError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), CanonicalError>
    where
        T: ?Sized + Serialize,
    {
        self.field(key, value)
    }

    fn end(self) -> Result<Value, CanonicalError> {
        Ok(self.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::BTreeMap;
    use serde::Serialize;

    #[derive(Serialize)]
    enum Shape {
        Point,
        Circle(f64),
        Pair(u8, u8),
        Rect { w: u32, h: u32 },
    }

    #[derive(Serialize)]
    struct Query {
        text: String,
        limit: Option<u32>,
        shapes: Vec<Shape>,
        tags: BTreeMap<u32, bool>,
        unit: (),
    }

    fn sample() -> Query {
        let mut tags = BTreeMap::new();
        tags.insert(2, true);
        tags.insert(1, false);
        Query {
            text: "night sweats".to_string(),
            limit: None,
            shapes: vec![
                Shape::Point,
                Shape::Circle(1.5),
                Shape::Pair(3, 4),
                Shape::Rect { w: 2, h: 5 },
            ],
            tags,
            unit: (),
        }
    }

    #[test]
    fn test_finite_values_match_serde_json() {
        let expected = serde_json::to_value(sample()).unwrap();
        assert_eq!(to_canonical_value(&sample()).unwrap(), expected);
    }

    #[test]
    fn test_non_finite_floats_are_tagged() {
        assert_eq!(to_canonical_value(&f64::NAN).unwrap(), json!("<f64:NaN>"));
        assert_eq!(to_canonical_value(&f64::INFINITY).unwrap(), json!("<f64:inf>"));
        assert_eq!(
            to_canonical_value(&f32::NEG_INFINITY).unwrap(),
            json!("<f64:-inf>")
        );
        assert_eq!(to_canonical_value(&None::<f64>).unwrap(), Value::Null);
        assert_eq!(
            to_canonical_value(&vec![Some(1.0), Some(f64::NAN), None]).unwrap(),
            json!([1.0, "<f64:NaN>", null])
        );
    }

    #[test]
    fn test_wide_integers_become_strings() {
        assert_eq!(to_canonical_value(&7i128).unwrap(), json!(7));
        assert_eq!(
            to_canonical_value(&u128::MAX).unwrap(),
            json!(u128::MAX.to_string())
        );
    }

    #[test]
    fn test_non_scalar_map_key_is_an_error() {
        let mut bad = BTreeMap::new();
        bad.insert(vec![1u8], 1);
        assert!(to_canonical_bytes(&bad).is_err());
    }
}
