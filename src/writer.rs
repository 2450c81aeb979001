//! Schema-driven encoding of datums into the binary form.

use std::collections::BTreeMap;

use crate::encode;
use crate::error::{Error, Result};
use crate::reader::default_value;
use crate::schema::{RecordSchema, Schema, UnionSchema};
use crate::value::Value;
use crate::MAX_DEPTH;

/// Encodes [`Value`]s under a fixed schema.
///
/// The writer checks that a datum conforms to the schema before any bytes are
/// produced, so a [`TypeMismatch`](Error::TypeMismatch) never leaves a
/// half-written datum in the output buffer.
#[derive(Clone, Debug)]
pub struct DatumWriter<'s> {
    schema: &'s Schema,
    named: BTreeMap<String, &'s Schema>,
}

impl<'s> DatumWriter<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        DatumWriter {
            schema,
            named: schema.named_types(),
        }
    }

    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    /// Appends the binary encoding of `datum` to `buf`.
    pub fn write(&self, datum: &Value, buf: &mut Vec<u8>) -> Result<()> {
        check_depth(datum)?;
        if !self.conforms(self.schema, datum) {
            return Err(self.mismatch(self.schema, datum));
        }
        self.write_data(self.schema, datum, buf)
    }

    /// Recursive conformance check, run in full before encoding starts.
    /// Union branch matching uses this same predicate, branch by branch, so
    /// the first conforming branch in declared order is the one written.
    fn conforms(&self, schema: &Schema, datum: &Value) -> bool {
        match schema {
            Schema::Null => datum.is_null(),
            Schema::Boolean => datum.is_bool(),
            Schema::Int => matches!(datum, Value::Int(v) if i32::try_from(*v).is_ok()),
            Schema::Long => datum.is_int(),
            Schema::Float | Schema::Double => {
                matches!(datum, Value::Int(_) | Value::F32(_) | Value::F64(_))
            }
            Schema::Bytes => datum.is_bin(),
            Schema::String => matches!(datum, Value::Str(_)),
            Schema::Fixed(fx) => matches!(datum, Value::Bin(b) if b.len() == fx.size),
            Schema::Enum(en) => match datum {
                Value::Enum(s) | Value::Str(s) => en.index_of(s).is_some(),
                _ => false,
            },
            Schema::Array(items) => {
                matches!(datum, Value::Array(v) if v.iter().all(|i| self.conforms(items, i)))
            }
            Schema::Map(values) => {
                matches!(datum, Value::Map(m) if m.values().all(|v| self.conforms(values, v)))
            }
            Schema::Union(un) => match datum {
                Value::Union(index, inner) => un
                    .branches
                    .get(*index)
                    .map_or(false, |branch| self.conforms(branch, inner)),
                other => self.branch_index(un, other).is_some(),
            },
            Schema::Record(rec) => match datum {
                Value::Record { name, fields } => {
                    self.record_name_matches(rec, name)
                        && self.record_conforms(rec, |f| {
                            fields.iter().find(|(n, _)| n == f).map(|(_, v)| v)
                        })
                }
                // A plain map can stand in for a record if its entries fit
                // the fields. This is what lets JSON-shaped data match
                // record branches of a union.
                Value::Map(m) => self.record_conforms(rec, |f| m.get(f)),
                _ => false,
            },
            Schema::Ref(name) => match self.named.get(name.as_str()) {
                Some(definition) => self.conforms(definition, datum),
                None => false,
            },
        }
    }

    fn record_name_matches(&self, rec: &RecordSchema, name: &str) -> bool {
        name == rec.name.name || name == rec.name.fullname()
    }

    fn record_conforms<'v>(
        &self,
        rec: &RecordSchema,
        lookup: impl Fn(&str) -> Option<&'v Value>,
    ) -> bool {
        rec.fields.iter().all(|field| match lookup(&field.name) {
            Some(value) => self.conforms(&field.schema, value),
            // An absent field is fine if a default can fill it, or if the
            // field type accepts null outright.
            None => field.default.is_some() || self.conforms(&field.schema, &Value::Null),
        })
    }

    /// First branch, in declared order, that accepts the datum.
    pub(crate) fn branch_index(&self, un: &UnionSchema, datum: &Value) -> Option<usize> {
        un.branches
            .iter()
            .position(|branch| self.conforms(branch, datum))
    }

    fn mismatch(&self, schema: &Schema, datum: &Value) -> Error {
        Error::TypeMismatch(format!(
            "datum {:?} is not an example of schema {}",
            datum, schema
        ))
    }

    fn write_data(&self, schema: &Schema, datum: &Value, buf: &mut Vec<u8>) -> Result<()> {
        match schema {
            Schema::Null => Ok(()),
            Schema::Boolean => {
                let v = datum.as_bool().ok_or_else(|| self.mismatch(schema, datum))?;
                encode::write_bool(buf, v);
                Ok(())
            }
            Schema::Int | Schema::Long => {
                let v = datum.as_i64().ok_or_else(|| self.mismatch(schema, datum))?;
                encode::write_long(buf, v);
                Ok(())
            }
            Schema::Float => {
                let v = match datum {
                    Value::Int(v) => *v as f32,
                    Value::F32(v) => *v,
                    Value::F64(v) => *v as f32,
                    _ => return Err(self.mismatch(schema, datum)),
                };
                encode::write_float(buf, v);
                Ok(())
            }
            Schema::Double => {
                let v = match datum {
                    Value::Int(v) => *v as f64,
                    Value::F32(v) => (*v).into(),
                    Value::F64(v) => *v,
                    _ => return Err(self.mismatch(schema, datum)),
                };
                encode::write_double(buf, v);
                Ok(())
            }
            Schema::Bytes => {
                let v = datum.as_slice().ok_or_else(|| self.mismatch(schema, datum))?;
                encode::write_bytes(buf, v);
                Ok(())
            }
            Schema::String => match datum {
                Value::Str(s) => {
                    encode::write_str(buf, s);
                    Ok(())
                }
                _ => Err(self.mismatch(schema, datum)),
            },
            Schema::Fixed(fx) => {
                let v = datum.as_slice().ok_or_else(|| self.mismatch(schema, datum))?;
                if v.len() != fx.size {
                    return Err(self.mismatch(schema, datum));
                }
                buf.extend_from_slice(v);
                Ok(())
            }
            Schema::Enum(en) => {
                let symbol = match datum {
                    Value::Enum(s) | Value::Str(s) => s,
                    _ => return Err(self.mismatch(schema, datum)),
                };
                let index = en
                    .index_of(symbol)
                    .ok_or_else(|| self.mismatch(schema, datum))?;
                encode::write_long(buf, index as i64);
                Ok(())
            }
            Schema::Array(items) => {
                let array = datum.as_array().ok_or_else(|| self.mismatch(schema, datum))?;
                if !array.is_empty() {
                    encode::write_long(buf, array.len() as i64);
                    for item in array {
                        self.write_data(items, item, buf)?;
                    }
                }
                encode::write_long(buf, 0);
                Ok(())
            }
            Schema::Map(values) => {
                let map = datum.as_map().ok_or_else(|| self.mismatch(schema, datum))?;
                if !map.is_empty() {
                    encode::write_long(buf, map.len() as i64);
                    for (key, value) in map {
                        encode::write_str(buf, key);
                        self.write_data(values, value, buf)?;
                    }
                }
                encode::write_long(buf, 0);
                Ok(())
            }
            Schema::Union(un) => {
                let (index, inner) = match datum {
                    Value::Union(index, inner) => {
                        let branch = un
                            .branches
                            .get(*index)
                            .ok_or_else(|| self.mismatch(schema, datum))?;
                        if !self.conforms(branch, inner) {
                            return Err(self.mismatch(schema, datum));
                        }
                        (*index, inner.as_ref())
                    }
                    other => {
                        let index = self
                            .branch_index(un, other)
                            .ok_or_else(|| self.mismatch(schema, datum))?;
                        (index, other)
                    }
                };
                encode::write_long(buf, index as i64);
                self.write_data(&un.branches[index], inner, buf)
            }
            Schema::Record(rec) => match datum {
                Value::Record { fields, .. } => self.write_record(
                    rec,
                    |f| fields.iter().find(|(n, _)| n == f).map(|(_, v)| v),
                    buf,
                ),
                Value::Map(m) => self.write_record(rec, |f| m.get(f), buf),
                _ => Err(self.mismatch(schema, datum)),
            },
            Schema::Ref(_) => {
                let definition = schema.follow(&self.named)?;
                self.write_data(definition, datum, buf)
            }
        }
    }

    fn write_record<'v>(
        &self,
        rec: &RecordSchema,
        lookup: impl Fn(&str) -> Option<&'v Value>,
        buf: &mut Vec<u8>,
    ) -> Result<()> {
        for field in &rec.fields {
            match lookup(&field.name) {
                Some(value) => self.write_data(&field.schema, value, buf)?,
                None => match &field.default {
                    Some(default) => {
                        let value = default_value(&field.schema, default, &self.named)?;
                        self.write_data(&field.schema, &value, buf)?;
                    }
                    None => self.write_data(&field.schema, &Value::Null, buf)?,
                },
            }
        }
        Ok(())
    }
}

/// Refuses datums nested deeper than [`MAX_DEPTH`] value levels before the
/// recursive walks see them. Union wrappers stay on their value's level, the
/// same way the decoder counts. The scan carries its own stack, so it stays
/// flat no matter the input.
fn check_depth(datum: &Value) -> Result<()> {
    let mut stack = vec![(datum, 0usize)];
    while let Some((value, depth)) = stack.pop() {
        if depth >= MAX_DEPTH {
            return Err(Error::TypeMismatch(format!(
                "datum nests deeper than {} levels",
                MAX_DEPTH
            )));
        }
        match value {
            Value::Array(items) => stack.extend(items.iter().map(|v| (v, depth + 1))),
            Value::Map(entries) => stack.extend(entries.values().map(|v| (v, depth + 1))),
            Value::Record { fields, .. } => {
                stack.extend(fields.iter().map(|(_, v)| (v, depth + 1)))
            }
            Value::Union(_, inner) => stack.push((inner.as_ref(), depth)),
            _ => {}
        }
    }
    Ok(())
}
