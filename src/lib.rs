//! Schema-driven binary serialization in the Avro format: a recursive
//! schema model parsed from JSON declarations, the compact untagged binary
//! encoding those schemas drive, resolution between differing writer and
//! reader schemas, and the object container file format.
//!
//! Data is never self-describing on the wire. Both sides hold a schema,
//! the bytes carry only values, and compatibility between old and new
//! schemas is worked out by resolution rules rather than by tagging every
//! field. The container format closes the loop for files: it embeds the
//! writer's schema in its header, so a file is readable with nothing but
//! this crate.
//!
//! # Encoding and decoding
//!
//! [`Schema::parse`] turns a JSON declaration into a [`Schema`];
//! [`DatumWriter`] and [`DatumReader`] then walk a schema and a [`Value`]
//! in lock-step:
//!
//! ```
//! use avrolite::{Schema, Value, DatumWriter, DatumReader};
//!
//! let schema = Schema::parse(r#"{
//!     "type": "record",
//!     "name": "Pixel",
//!     "fields": [
//!         {"name": "x", "type": "int"},
//!         {"name": "y", "type": "int"},
//!         {"name": "on", "type": "boolean"}
//!     ]
//! }"#)?;
//!
//! let pixel = Value::record("Pixel", [
//!     ("x", Value::Int(3)),
//!     ("y", Value::Int(7)),
//!     ("on", Value::Bool(true)),
//! ]);
//!
//! let mut bytes = Vec::new();
//! DatumWriter::new(&schema).write(&pixel, &mut bytes)?;
//!
//! let decoded = DatumReader::new(&schema).read(&mut &bytes[..])?;
//! assert_eq!(decoded["x"], Value::Int(3));
//! # Ok::<(), avrolite::Error>(())
//! ```
//!
//! # Schema resolution
//!
//! When data was written under one schema and is read under another,
//! [`DatumReader::resolving`] projects each datum into the reader's shape:
//! record fields are matched by name or alias, fields the reader dropped
//! are skipped over, fields it added are filled from their defaults, and
//! numeric and string/bytes promotions convert values where the reader
//! widened a type.
//!
//! ```
//! use avrolite::{Schema, Value, DatumWriter, DatumReader};
//!
//! let writer_schema = Schema::parse(r#""int""#)?;
//! let reader_schema = Schema::parse(r#""double""#)?;
//!
//! let mut bytes = Vec::new();
//! DatumWriter::new(&writer_schema).write(&Value::Int(42), &mut bytes)?;
//!
//! let datum = DatumReader::resolving(&writer_schema, &reader_schema)
//!     .read(&mut &bytes[..])?;
//! assert_eq!(datum, Value::F64(42.0));
//! # Ok::<(), avrolite::Error>(())
//! ```
//!
//! # Container files
//!
//! [`FileWriter`] streams datums into a blocked, optionally compressed
//! file with the schema in its header; [`FileReader`] iterates any such
//! file back, resolving into a newer schema on request:
//!
//! ```
//! use avrolite::{Schema, Value, FileWriter, FileReader};
//!
//! let schema = Schema::parse(r#"{"type": "array", "items": "long"}"#)?;
//!
//! let mut writer = FileWriter::new(&schema, Vec::new());
//! writer.append(&Value::Array(vec![Value::Int(1), Value::Int(2)]))?;
//! let bytes = writer.close()?;
//!
//! let reader = FileReader::new(std::io::Cursor::new(bytes))?;
//! for datum in reader {
//!     assert_eq!(datum?[1], Value::Int(2));
//! }
//! # Ok::<(), avrolite::Error>(())
//! ```
//!
//! Block compression is pluggable through the [`Codec`] trait and
//! [`CodecRegistry`]. The `deflate` feature (on by default) provides the
//! interoperable raw-DEFLATE codec; the `zstandard` feature adds zstd.
//!
//! # The meta-schema
//!
//! The schema declaration grammar is itself expressible as a schema:
//! [`metaschema`] returns a schema whose legal values are exactly the
//! legal declarations, and [`validate_declaration`] checks a candidate by
//! encoding it under that schema.

pub mod codec;
pub mod container;
mod decode;
mod encode;
mod error;
mod metaschema;
mod reader;
pub mod schema;
pub mod value;
mod writer;

pub use codec::{Codec, CodecRegistry, NullCodec};
pub use container::{FileReader, FileWriter};
pub use error::{Error, Result};
pub use metaschema::{metaschema, validate_declaration};
pub use reader::DatumReader;
pub use schema::{
    EnumSchema, Field, FixedSchema, Name, RecordSchema, Schema, SortOrder, UnionSchema,
};
pub use value::Value;
pub use writer::DatumWriter;

#[cfg(feature = "deflate")]
pub use codec::DeflateCodec;

#[cfg(feature = "zstandard")]
pub use codec::ZstandardCodec;

/// The deepest a single datum may nest. Recursive schemas make arbitrary
/// nesting depths legal on the wire, so both encoding and decoding stop
/// with an error at this depth instead of running out of stack.
pub const MAX_DEPTH: usize = 1024;
