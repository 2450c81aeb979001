//! Schema-driven decoding, including resolution of data written under a
//! different schema than the one being read with.

use std::collections::BTreeMap;
use std::io::Read;

use serde_json::Value as Json;

use crate::decode;
use crate::error::{Error, Result};
use crate::schema::{Name, Schema};
use crate::value::Value;
use crate::MAX_DEPTH;

/// Decodes binary data written under `writer` into values shaped by
/// `reader`, applying the schema resolution rules when the two differ.
///
/// Resolution walks both schemas in lock-step with the byte stream: the
/// writer schema dictates what bytes to consume, the reader schema dictates
/// what comes out. Writer-only record fields are skipped over, reader-only
/// fields are filled from their defaults, and numeric and string/bytes
/// promotions convert the decoded value to the reader's type.
#[derive(Clone, Debug)]
pub struct DatumReader<'s> {
    writer: &'s Schema,
    reader: &'s Schema,
    writer_named: BTreeMap<String, &'s Schema>,
    reader_named: BTreeMap<String, &'s Schema>,
}

impl<'s> DatumReader<'s> {
    /// A reader whose writer and reader schemas are the same.
    pub fn new(schema: &'s Schema) -> Self {
        Self::resolving(schema, schema)
    }

    pub fn resolving(writer: &'s Schema, reader: &'s Schema) -> Self {
        DatumReader {
            writer,
            reader,
            writer_named: writer.named_types(),
            reader_named: reader.named_types(),
        }
    }

    /// Decodes one datum from the stream.
    pub fn read<R: Read>(&self, r: &mut R) -> Result<Value> {
        self.read_data(self.writer, self.reader, r, 0)
    }

    /// Shallow compatibility test between a writer and reader schema. This
    /// is the predicate used to pick a reader-union branch; the deep checks
    /// happen as the data itself is walked.
    fn resolvable(&self, writer: &Schema, reader: &Schema) -> bool {
        let writer = match writer.follow(&self.writer_named) {
            Ok(schema) => schema,
            Err(_) => return false,
        };
        let reader = match reader.follow(&self.reader_named) {
            Ok(schema) => schema,
            Err(_) => return false,
        };
        match (writer, reader) {
            (Schema::Union(_), _) | (_, Schema::Union(_)) => true,
            (Schema::Null, Schema::Null)
            | (Schema::Boolean, Schema::Boolean)
            | (Schema::Int, Schema::Int)
            | (Schema::Long, Schema::Long)
            | (Schema::Float, Schema::Float)
            | (Schema::Double, Schema::Double)
            | (Schema::Bytes, Schema::Bytes)
            | (Schema::String, Schema::String) => true,
            // Promotions, writer to reader only
            (Schema::Int, Schema::Long | Schema::Float | Schema::Double) => true,
            (Schema::Long, Schema::Float | Schema::Double) => true,
            (Schema::Float, Schema::Double) => true,
            (Schema::String, Schema::Bytes) | (Schema::Bytes, Schema::String) => true,
            (Schema::Array(_), Schema::Array(_)) => true,
            (Schema::Map(_), Schema::Map(_)) => true,
            (Schema::Record(w), Schema::Record(r)) => names_match(&w.name, &r.name, &r.aliases),
            (Schema::Enum(w), Schema::Enum(r)) => names_match(&w.name, &r.name, &r.aliases),
            (Schema::Fixed(w), Schema::Fixed(r)) => {
                w.size == r.size && names_match(&w.name, &r.name, &r.aliases)
            }
            _ => false,
        }
    }

    fn no_resolution(&self, writer: &Schema, reader: &Schema) -> Error {
        Error::Resolution(format!(
            "data written as {} cannot be read as {}",
            writer, reader
        ))
    }

    /// `depth` counts the value levels enclosing this datum. It grows at
    /// record fields, array items, and map values; union branches and named
    /// references stay on the same level, and every cycle through a named
    /// type crosses a record field, so the walk is bounded either way.
    fn read_data<R: Read>(
        &self,
        writer: &'s Schema,
        reader: &'s Schema,
        r: &mut R,
        depth: usize,
    ) -> Result<Value> {
        if depth >= MAX_DEPTH {
            return Err(Error::Integrity(format!(
                "data nests deeper than {} levels",
                MAX_DEPTH
            )));
        }
        let writer = writer.follow(&self.writer_named)?;
        let reader = reader.follow(&self.reader_named)?;

        if !self.resolvable(writer, reader) {
            return Err(self.no_resolution(writer, reader));
        }

        // A non-union writer against a union reader: re-resolve against the
        // first reader branch the writer is compatible with.
        if !matches!(writer, Schema::Union(_)) {
            if let Schema::Union(un) = reader {
                for branch in &un.branches {
                    if self.resolvable(writer, branch) {
                        return self.read_data(writer, branch, r, depth);
                    }
                }
                return Err(self.no_resolution(writer, reader));
            }
        }

        match writer {
            Schema::Null => Ok(Value::Null),
            Schema::Boolean => Ok(Value::Bool(decode::read_bool(r)?)),
            Schema::Int | Schema::Long => {
                let v = decode::read_long(r)?;
                Ok(match reader {
                    Schema::Float => Value::F32(v as f32),
                    Schema::Double => Value::F64(v as f64),
                    _ => Value::Int(v),
                })
            }
            Schema::Float => {
                let v = decode::read_float(r)?;
                Ok(match reader {
                    Schema::Double => Value::F64(v.into()),
                    _ => Value::F32(v),
                })
            }
            Schema::Double => Ok(Value::F64(decode::read_double(r)?)),
            Schema::Bytes => {
                let v = decode::read_bytes(r)?;
                Ok(match reader {
                    Schema::String => Value::Str(String::from_utf8(v).map_err(|_| {
                        Error::Integrity("string is not valid UTF-8".into())
                    })?),
                    _ => Value::Bin(v),
                })
            }
            Schema::String => Ok(match reader {
                Schema::Bytes => Value::Bin(decode::read_bytes(r)?),
                _ => Value::Str(decode::read_str(r)?),
            }),
            Schema::Fixed(w) => Ok(Value::Bin(decode::read_fixed(r, w.size)?)),
            Schema::Enum(w) => {
                let reader_enum = match reader {
                    Schema::Enum(re) => re,
                    _ => return Err(self.no_resolution(writer, reader)),
                };
                let index = decode::read_long(r)?;
                let symbol = usize::try_from(index)
                    .ok()
                    .and_then(|i| w.symbols.get(i))
                    .ok_or_else(|| {
                        Error::Resolution(format!(
                            "no symbol at index {} of enum {}",
                            index, w.name
                        ))
                    })?;
                if reader_enum.index_of(symbol).is_some() {
                    Ok(Value::Enum(symbol.clone()))
                } else if let Some(default) = &reader_enum.default {
                    Ok(Value::Enum(default.clone()))
                } else {
                    Err(Error::Resolution(format!(
                        "symbol {:?} is not in enum {}, which declares no default",
                        symbol, reader_enum.name
                    )))
                }
            }
            Schema::Array(w_items) => {
                let r_items = match reader {
                    Schema::Array(items) => items,
                    _ => return Err(self.no_resolution(writer, reader)),
                };
                let mut items = Vec::new();
                self.read_blocks(r, |this, r| {
                    items.push(this.read_data(w_items, r_items, r, depth + 1)?);
                    Ok(())
                })?;
                Ok(Value::Array(items))
            }
            Schema::Map(w_values) => {
                let r_values = match reader {
                    Schema::Map(values) => values,
                    _ => return Err(self.no_resolution(writer, reader)),
                };
                let mut map = BTreeMap::new();
                self.read_blocks(r, |this, r| {
                    let key = decode::read_str(r)?;
                    map.insert(key, this.read_data(w_values, r_values, r, depth + 1)?);
                    Ok(())
                })?;
                Ok(Value::Map(map))
            }
            Schema::Union(w_un) => {
                let index = decode::read_long(r)?;
                let branch = usize::try_from(index)
                    .ok()
                    .and_then(|i| w_un.branches.get(i))
                    .ok_or_else(|| {
                        Error::Resolution(format!("no branch at index {} of union {}", index, writer))
                    })?;
                // The selected branch resolves against the whole reader
                // schema; if that is a union too, the re-resolution above
                // picks its branch.
                self.read_data(branch, reader, r, depth)
            }
            Schema::Record(w_rec) => {
                let r_rec = match reader {
                    Schema::Record(rec) => rec,
                    _ => return Err(self.no_resolution(writer, reader)),
                };
                // Consume every writer field in stream order, keeping the
                // ones the reader knows and skipping the rest.
                let mut decoded: BTreeMap<&str, Value> = BTreeMap::new();
                for w_field in &w_rec.fields {
                    match r_rec.fields.iter().find(|rf| rf.answers_to(&w_field.name)) {
                        Some(r_field) => {
                            let value =
                                self.read_data(&w_field.schema, &r_field.schema, r, depth + 1)?;
                            decoded.insert(r_field.name.as_str(), value);
                        }
                        None => self.skip_data(&w_field.schema, r, depth + 1)?,
                    }
                }
                // Assemble in reader order, defaults filling the gaps.
                let mut fields = Vec::with_capacity(r_rec.fields.len());
                for r_field in &r_rec.fields {
                    let value = match decoded.remove(r_field.name.as_str()) {
                        Some(value) => value,
                        None => match &r_field.default {
                            Some(default) => {
                                default_value(&r_field.schema, default, &self.reader_named)?
                            }
                            None => {
                                return Err(Error::Resolution(format!(
                                    "no value and no default for field {:?} of record {}",
                                    r_field.name, r_rec.name
                                )))
                            }
                        },
                    };
                    fields.push((r_field.name.clone(), value));
                }
                Ok(Value::Record {
                    name: r_rec.name.fullname(),
                    fields,
                })
            }
            Schema::Ref(name) => Err(Error::SchemaParse(format!(
                "type name {:?} is not defined",
                name
            ))),
        }
    }

    /// Consumes a datum without building a value, keeping the stream
    /// aligned. Used for writer-only record fields.
    fn skip_data<R: Read>(&self, writer: &'s Schema, r: &mut R, depth: usize) -> Result<()> {
        if depth >= MAX_DEPTH {
            return Err(Error::Integrity(format!(
                "data nests deeper than {} levels",
                MAX_DEPTH
            )));
        }
        let writer = writer.follow(&self.writer_named)?;
        match writer {
            Schema::Null => Ok(()),
            Schema::Boolean => decode::skip(r, 1),
            Schema::Int | Schema::Long | Schema::Enum(_) => decode::read_long(r).map(|_| ()),
            Schema::Float => decode::skip(r, 4),
            Schema::Double => decode::skip(r, 8),
            Schema::Bytes | Schema::String => decode::skip_bytes(r),
            Schema::Fixed(fx) => decode::skip(r, fx.size as u64),
            Schema::Union(un) => {
                let index = decode::read_long(r)?;
                let branch = usize::try_from(index)
                    .ok()
                    .and_then(|i| un.branches.get(i))
                    .ok_or_else(|| {
                        Error::Resolution(format!("no branch at index {} of union {}", index, writer))
                    })?;
                self.skip_data(branch, r, depth)
            }
            Schema::Record(rec) => {
                for field in &rec.fields {
                    self.skip_data(&field.schema, r, depth + 1)?;
                }
                Ok(())
            }
            Schema::Array(items) => {
                self.skip_blocks(r, |this, r| this.skip_data(items, r, depth + 1))
            }
            Schema::Map(values) => self.skip_blocks(r, |this, r| {
                decode::skip_bytes(r)?;
                this.skip_data(values, r, depth + 1)
            }),
            Schema::Ref(name) => Err(Error::SchemaParse(format!(
                "type name {:?} is not defined",
                name
            ))),
        }
    }

    /// Walks the block framing of an array or map, calling `read_item` once
    /// per element. A negative count carries the block's byte length after
    /// it; the items are decoded all the same.
    fn read_blocks<R: Read>(
        &self,
        r: &mut R,
        mut read_item: impl FnMut(&Self, &mut R) -> Result<()>,
    ) -> Result<()> {
        loop {
            let mut count = decode::read_long(r)?;
            if count == 0 {
                return Ok(());
            }
            if count < 0 {
                count = count
                    .checked_neg()
                    .ok_or_else(|| Error::Integrity("block count overflows".into()))?;
                let byte_len = decode::read_long(r)?;
                if byte_len < 0 {
                    return Err(Error::Integrity(format!(
                        "negative block byte length {}",
                        byte_len
                    )));
                }
            }
            for _ in 0..count {
                read_item(self, r)?;
            }
        }
    }

    /// Like [`read_blocks`](Self::read_blocks), but a sized block is skipped
    /// in one go instead of element by element.
    fn skip_blocks<R: Read>(
        &self,
        r: &mut R,
        mut skip_item: impl FnMut(&Self, &mut R) -> Result<()>,
    ) -> Result<()> {
        loop {
            let count = decode::read_long(r)?;
            if count == 0 {
                return Ok(());
            }
            if count < 0 {
                let byte_len = decode::read_long(r)?;
                if byte_len < 0 {
                    return Err(Error::Integrity(format!(
                        "negative block byte length {}",
                        byte_len
                    )));
                }
                decode::skip(r, byte_len as u64)?;
            } else {
                for _ in 0..count {
                    skip_item(self, r)?;
                }
            }
        }
    }
}

fn names_match(writer: &Name, reader: &Name, reader_aliases: &[String]) -> bool {
    writer.fullname() == reader.fullname()
        || reader_aliases
            .iter()
            .any(|alias| *alias == writer.fullname() || *alias == writer.name)
}

/// Materializes a field or enum default, declared as raw JSON, into a value
/// of the given schema. Union defaults are interpreted against the first
/// branch; bytes and fixed defaults are JSON strings with one byte per
/// character.
pub(crate) fn default_value<'a>(
    schema: &'a Schema,
    json: &Json,
    named: &BTreeMap<String, &'a Schema>,
) -> Result<Value> {
    let schema = schema.follow(named)?;
    let bad = || {
        Error::Resolution(format!(
            "default {} does not fit schema {}",
            json, schema
        ))
    };
    match schema {
        Schema::Null => json.is_null().then_some(Value::Null).ok_or_else(bad),
        Schema::Boolean => json.as_bool().map(Value::Bool).ok_or_else(bad),
        Schema::Int => json
            .as_i64()
            .filter(|v| i32::try_from(*v).is_ok())
            .map(Value::Int)
            .ok_or_else(bad),
        Schema::Long => json.as_i64().map(Value::Int).ok_or_else(bad),
        Schema::Float => json.as_f64().map(|v| Value::F32(v as f32)).ok_or_else(bad),
        Schema::Double => json.as_f64().map(Value::F64).ok_or_else(bad),
        Schema::String => json
            .as_str()
            .map(|s| Value::Str(s.to_string()))
            .ok_or_else(bad),
        Schema::Bytes => json
            .as_str()
            .and_then(latin1_bytes)
            .map(Value::Bin)
            .ok_or_else(bad),
        Schema::Fixed(fx) => json
            .as_str()
            .and_then(latin1_bytes)
            .filter(|b| b.len() == fx.size)
            .map(Value::Bin)
            .ok_or_else(bad),
        Schema::Enum(en) => json
            .as_str()
            .filter(|s| en.index_of(s).is_some())
            .map(|s| Value::Enum(s.to_string()))
            .ok_or_else(bad),
        Schema::Array(items) => {
            let defaults = json.as_array().ok_or_else(bad)?;
            let items = defaults
                .iter()
                .map(|d| default_value(items, d, named))
                .collect::<Result<_>>()?;
            Ok(Value::Array(items))
        }
        Schema::Map(values) => {
            let defaults = json.as_object().ok_or_else(bad)?;
            let mut map = BTreeMap::new();
            for (key, d) in defaults {
                map.insert(key.clone(), default_value(values, d, named)?);
            }
            Ok(Value::Map(map))
        }
        Schema::Union(un) => {
            let first = un.branches.first().ok_or_else(bad)?;
            default_value(first, json, named)
        }
        Schema::Record(rec) => {
            let defaults = json.as_object().ok_or_else(bad)?;
            let mut fields = Vec::with_capacity(rec.fields.len());
            for field in &rec.fields {
                let field_json = defaults.get(&field.name).or(field.default.as_ref());
                let value = match field_json {
                    Some(field_json) => default_value(&field.schema, field_json, named)?,
                    None => {
                        return Err(Error::Resolution(format!(
                            "record default gives no value for field {:?}",
                            field.name
                        )))
                    }
                };
                fields.push((field.name.clone(), value));
            }
            Ok(Value::Record {
                name: rec.name.fullname(),
                fields,
            })
        }
        Schema::Ref(name) => Err(Error::SchemaParse(format!(
            "type name {:?} is not defined",
            name
        ))),
    }
}

fn latin1_bytes(s: &str) -> Option<Vec<u8>> {
    s.chars().map(|c| u8::try_from(u32::from(c)).ok()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::DatumWriter;
    use serde_json::json;

    fn round_trip(schema_text: &str, datum: &Value) -> Value {
        let schema = Schema::parse(schema_text).expect("Should have parsed the schema");
        let mut buf = Vec::new();
        DatumWriter::new(&schema)
            .write(datum, &mut buf)
            .expect("Should have encoded the datum");
        DatumReader::new(&schema)
            .read(&mut &buf[..])
            .expect("Should have decoded the datum")
    }

    fn resolve(writer_text: &str, reader_text: &str, datum: &Value) -> Result<Value> {
        let writer_schema = Schema::parse(writer_text).unwrap();
        let reader_schema = Schema::parse(reader_text).unwrap();
        let mut buf = Vec::new();
        // A datum the writer schema refuses comes back as an error too, so
        // callers see encode and resolve failures alike.
        DatumWriter::new(&writer_schema).write(datum, &mut buf)?;
        DatumReader::resolving(&writer_schema, &reader_schema).read(&mut &buf[..])
    }

    #[test]
    fn same_schema_round_trip() {
        let schema = r#"{"type": "record", "name": "Rec", "fields": [
            {"name": "id", "type": "long"},
            {"name": "tags", "type": {"type": "array", "items": "string"}},
            {"name": "attrs", "type": {"type": "map", "values": "int"}},
            {"name": "blob", "type": ["null", "bytes"]}
        ]}"#;
        let mut attrs = BTreeMap::new();
        attrs.insert("x".to_string(), Value::Int(1));
        let datum = Value::record(
            "Rec",
            [
                ("id", Value::Int(42)),
                (
                    "tags",
                    Value::Array(vec![Value::Str("a".into()), Value::Str("b".into())]),
                ),
                ("attrs", Value::Map(attrs)),
                ("blob", Value::Bin(vec![1, 2, 3])),
            ],
        );
        let out = round_trip(schema, &datum);
        // The reader names records by full name and unwraps union branches
        assert_eq!(out["id"], Value::Int(42));
        assert_eq!(out["tags"][1], Value::Str("b".into()));
        assert_eq!(out["attrs"]["x"], Value::Int(1));
        assert_eq!(out["blob"], Value::Bin(vec![1, 2, 3]));
    }

    #[test]
    fn promotions() {
        let v = resolve("\"int\"", "\"long\"", &Value::Int(7)).unwrap();
        assert_eq!(v, Value::Int(7));
        let v = resolve("\"int\"", "\"float\"", &Value::Int(7)).unwrap();
        assert_eq!(v, Value::F32(7.0));
        let v = resolve("\"int\"", "\"double\"", &Value::Int(7)).unwrap();
        assert_eq!(v, Value::F64(7.0));
        let v = resolve("\"long\"", "\"double\"", &Value::Int(1 << 40)).unwrap();
        assert_eq!(v, Value::F64((1u64 << 40) as f64));
        let v = resolve("\"float\"", "\"double\"", &Value::F32(1.5)).unwrap();
        assert_eq!(v, Value::F64(1.5));
        // And the two string promotions
        let v = resolve("\"string\"", "\"bytes\"", &Value::Str("hi".into())).unwrap();
        assert_eq!(v, Value::Bin(b"hi".to_vec()));
        let v = resolve("\"bytes\"", "\"string\"", &Value::Bin(b"hi".to_vec())).unwrap();
        assert_eq!(v, Value::Str("hi".into()));
    }

    #[test]
    fn promotions_never_reverse() {
        for (w, r) in [
            ("\"long\"", "\"int\""),
            ("\"double\"", "\"float\""),
            ("\"float\"", "\"long\""),
            ("\"double\"", "\"int\""),
        ] {
            let result = resolve(w, r, &Value::F64(1.0));
            let result = match result {
                // double datum can't be written as long; use an int datum there
                Err(Error::TypeMismatch(_)) => resolve(w, r, &Value::Int(1)),
                other => other,
            };
            assert!(
                matches!(result, Err(Error::Resolution(_))),
                "{} should not read as {}",
                w,
                r
            );
        }
    }

    #[test]
    fn enum_symbol_drift() {
        let writer = r#"{"type": "enum", "name": "Kind", "symbols": ["A", "B", "C"]}"#;
        // Reader dropped "C" but declares a default
        let with_default =
            r#"{"type": "enum", "name": "Kind", "symbols": ["A", "B", "UNKNOWN"], "default": "UNKNOWN"}"#;
        let v = resolve(writer, with_default, &Value::Enum("C".into())).unwrap();
        assert_eq!(v, Value::Enum("UNKNOWN".into()));
        let v = resolve(writer, with_default, &Value::Enum("B".into())).unwrap();
        assert_eq!(v, Value::Enum("B".into()));

        // No default: unknown symbols are an error
        let without_default = r#"{"type": "enum", "name": "Kind", "symbols": ["A", "B"]}"#;
        let result = resolve(writer, without_default, &Value::Enum("C".into()));
        assert!(matches!(result, Err(Error::Resolution(_))));
    }

    #[test]
    fn enum_round_trip() {
        let schema = r#"{"type": "enum", "name": "Suit",
            "symbols": ["SPADES", "HEARTS", "DIAMONDS", "CLUBS"]}"#;
        let out = round_trip(schema, &Value::Enum("DIAMONDS".into()));
        assert_eq!(out, Value::Enum("DIAMONDS".into()));
    }

    #[test]
    fn enum_index_out_of_range() {
        let schema = Schema::parse(r#"{"type": "enum", "name": "E", "symbols": ["A", "B"]}"#).unwrap();
        let reader = DatumReader::new(&schema);
        // Index 3 on a two-symbol enum
        let result = reader.read(&mut &[0x06u8][..]);
        assert!(matches!(result, Err(Error::Resolution(_))));
    }

    #[test]
    fn union_reader_re_resolution() {
        // Writer branch long must find the reader's double branch
        let v = resolve(
            "[\"null\", \"long\"]",
            "[\"string\", \"double\"]",
            &Value::Int(3),
        )
        .unwrap();
        assert_eq!(v, Value::F64(3.0));

        // Non-union reader against a union writer
        let v = resolve("[\"null\", \"long\"]", "\"double\"", &Value::Int(3)).unwrap();
        assert_eq!(v, Value::F64(3.0));

        // Union reader with no compatible branch
        let result = resolve(
            "[\"null\", \"long\"]",
            "[\"string\", \"bytes\"]",
            &Value::Int(3),
        );
        assert!(matches!(result, Err(Error::Resolution(_))));
    }

    #[test]
    fn writer_only_fields_are_skipped() {
        let writer = r#"{"type": "record", "name": "R", "fields": [
            {"name": "a", "type": "long"},
            {"name": "extra", "type": {"type": "array", "items": "string"}},
            {"name": "b", "type": "string"}
        ]}"#;
        let reader = r#"{"type": "record", "name": "R", "fields": [
            {"name": "a", "type": "long"},
            {"name": "b", "type": "string"}
        ]}"#;
        let datum = Value::record(
            "R",
            [
                ("a", Value::Int(9)),
                ("extra", Value::Array(vec![Value::Str("gone".into())])),
                ("b", Value::Str("kept".into())),
            ],
        );
        let out = resolve(writer, reader, &datum).unwrap();
        assert_eq!(
            out,
            Value::record("R", [("a", Value::Int(9)), ("b", Value::Str("kept".into()))])
        );
    }

    #[test]
    fn reader_only_field_defaults() {
        let writer = r#"{"type": "record", "name": "R", "fields": [
            {"name": "a", "type": "long"}
        ]}"#;
        let with_default = r#"{"type": "record", "name": "R", "fields": [
            {"name": "a", "type": "long"},
            {"name": "c", "type": ["null", "string"], "default": null}
        ]}"#;
        let datum = Value::record("R", [("a", Value::Int(1))]);
        let out = resolve(writer, with_default, &datum).unwrap();
        assert_eq!(out["c"], Value::Null);

        let without_default = r#"{"type": "record", "name": "R", "fields": [
            {"name": "a", "type": "long"},
            {"name": "c", "type": "string"}
        ]}"#;
        let result = resolve(writer, without_default, &datum);
        assert!(matches!(result, Err(Error::Resolution(_))));
    }

    #[test]
    fn field_alias_matches() {
        let writer = r#"{"type": "record", "name": "R", "fields": [
            {"name": "old_name", "type": "long"}
        ]}"#;
        let reader = r#"{"type": "record", "name": "R", "fields": [
            {"name": "new_name", "type": "long", "aliases": ["old_name"]}
        ]}"#;
        let datum = Value::record("R", [("old_name", Value::Int(5))]);
        let out = resolve(writer, reader, &datum).unwrap();
        assert_eq!(out, Value::record("R", [("new_name", Value::Int(5))]));
    }

    #[test]
    fn fixed_size_change_fails() {
        let writer = r#"{"type": "fixed", "name": "F", "size": 2}"#;
        let reader = r#"{"type": "fixed", "name": "F", "size": 3}"#;
        let result = resolve(writer, reader, &Value::Bin(vec![1, 2]));
        assert!(matches!(result, Err(Error::Resolution(_))));
    }

    #[test]
    fn recursive_record_round_trip() {
        let schema = r#"{"type": "record", "name": "Node", "fields": [
            {"name": "label", "type": "string"},
            {"name": "next", "type": ["null", "Node"]}
        ]}"#;
        let tail = Value::record(
            "Node",
            [("label", Value::Str("b".into())), ("next", Value::Null)],
        );
        let datum = Value::record(
            "Node",
            [("label", Value::Str("a".into())), ("next", tail)],
        );
        let out = round_trip(schema, &datum);
        assert_eq!(out["next"]["label"], Value::Str("b".into()));
        assert_eq!(out["next"]["next"], Value::Null);
    }

    #[test]
    fn deep_recursion_is_capped() {
        // Under a recursive schema, a run of "next" branch indexes is valid
        // input that nests as deep as it is long. Decoding has to give up
        // with an error rather than run the stack out.
        let schema = Schema::parse(
            r#"{"type": "record", "name": "Node", "fields": [
                {"name": "next", "type": ["null", "Node"]}
            ]}"#,
        )
        .unwrap();
        let mut bytes = vec![0x02u8; 1_000_000];
        bytes.push(0x00);
        let result = DatumReader::new(&schema).read(&mut &bytes[..]);
        assert!(
            matches!(result, Err(Error::Integrity(_))),
            "Expected a nesting error, got {:?}",
            result
        );
    }

    #[test]
    fn large_arrays_round_trip() {
        let items: Vec<Value> = (0..10_000)
            .map(|i| Value::Str(format!("item-{}", i)))
            .collect();
        let datum = Value::Array(items);
        let out = round_trip(r#"{"type": "array", "items": "string"}"#, &datum);
        assert!(out == datum, "Array contents changed in transit");
    }

    #[test]
    fn arrays_decode_any_block_split() {
        // Our writer emits a single block, but the format allows any split,
        // with or without a byte length after a negative count. Frame four
        // longs as three blocks by hand and check they decode as one array.
        let mut buf = Vec::new();
        crate::encode::write_long(&mut buf, 2);
        crate::encode::write_long(&mut buf, 10);
        crate::encode::write_long(&mut buf, 20);
        let mut sized = Vec::new();
        crate::encode::write_long(&mut sized, 30);
        crate::encode::write_long(&mut sized, 40);
        crate::encode::write_long(&mut buf, -2);
        crate::encode::write_long(&mut buf, sized.len() as i64);
        buf.extend_from_slice(&sized);
        crate::encode::write_long(&mut buf, 0);

        let schema = Schema::parse(r#"{"type": "array", "items": "long"}"#).unwrap();
        let out = DatumReader::new(&schema)
            .read(&mut &buf[..])
            .expect("Should have decoded the hand-framed array");
        let longs: Vec<Value> = [10, 20, 30, 40].into_iter().map(Value::Int).collect();
        assert_eq!(out, Value::Array(longs));
    }

    #[test]
    fn defaults_from_json() {
        let schema = Schema::parse(
            r#"{"type": "record", "name": "D", "fields": [
                {"name": "s", "type": "string"},
                {"name": "b", "type": "bytes"},
                {"name": "n", "type": ["null", "long"]},
                {"name": "list", "type": {"type": "array", "items": "int"}}
            ]}"#,
        )
        .unwrap();
        let named = schema.named_types();
        let json = json!({"s": "hey", "b": "\u{00ff}\u{0000}", "n": null, "list": [1, 2]});
        let value = default_value(&schema, &json, &named).unwrap();
        assert_eq!(value["s"], Value::Str("hey".into()));
        assert_eq!(value["b"], Value::Bin(vec![0xff, 0x00]));
        assert_eq!(value["n"], Value::Null);
        assert_eq!(value["list"], Value::Array(vec![Value::Int(1), Value::Int(2)]));

        // A union default must satisfy the first branch
        let union = Schema::parse("[\"null\", \"long\"]").unwrap();
        let named = union.named_types();
        assert!(default_value(&union, &json!(5), &named).is_err());
        assert_eq!(
            default_value(&union, &json!(null), &named).unwrap(),
            Value::Null
        );
    }
}
