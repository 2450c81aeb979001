//! A schema whose value space is the set of legal schema declarations.
//!
//! Declarations come in three JSON shapes: a bare type-name string, an
//! attributed object, and an array for unions. The meta-schema mirrors
//! that as a union of an enum of primitive names, one declaration record
//! per attributed kind, and an array of the same choices. Nested types
//! recurse through named references back into this union, so the
//! meta-schema can describe declarations of any depth, including its own.
//!
//! Validation works by encoding: a candidate declaration is converted to a
//! [`Value`] and written under the meta-schema, and the writer's branch
//! matching does the grammar checking. This proves the declaration grammar
//! is itself expressible as a schema; [`Schema::parse`] remains the real
//! front door, since only it builds a usable schema with name resolution.
//!
//! One concession to the encoding trick: a bare name must be one of the
//! eight primitive names. References to previously declared named types
//! validate only through `parse`, which knows what has been declared.

use std::sync::OnceLock;

use serde_json::Value as Json;

use crate::error::Result;
use crate::schema::Schema;
use crate::value::Value;
use crate::writer::DatumWriter;

/// Each named type is defined at its first textual use and referenced by
/// name afterwards, which keeps the recursion finite. Unions cannot nest
/// directly, so the union-of-declarations reappears as array items where a
/// field type or element type is itself a union.
static METASCHEMA_TEXT: &str = r#"
[
    {"type": "enum", "name": "PrimitiveName",
     "symbols": ["null", "boolean", "int", "long", "float", "double", "bytes", "string"]},
    {"type": "record", "name": "PrimitiveObject", "fields": [
        {"name": "type", "type": "PrimitiveName"}
    ]},
    {"type": "record", "name": "FixedDecl", "fields": [
        {"name": "type", "type": {"type": "enum", "name": "FixedKeyword", "symbols": ["fixed"]}},
        {"name": "name", "type": "string"},
        {"name": "namespace", "type": ["null", "string"], "default": null},
        {"name": "aliases", "type": ["null", {"type": "array", "items": "string"}], "default": null},
        {"name": "size", "type": "int"}
    ]},
    {"type": "record", "name": "EnumDecl", "fields": [
        {"name": "type", "type": {"type": "enum", "name": "EnumKeyword", "symbols": ["enum"]}},
        {"name": "name", "type": "string"},
        {"name": "namespace", "type": ["null", "string"], "default": null},
        {"name": "aliases", "type": ["null", {"type": "array", "items": "string"}], "default": null},
        {"name": "doc", "type": ["null", "string"], "default": null},
        {"name": "symbols", "type": {"type": "array", "items": "string"}},
        {"name": "default", "type": ["null", "string"], "default": null}
    ]},
    {"type": "record", "name": "RecordDecl", "fields": [
        {"name": "type", "type": {"type": "enum", "name": "RecordKeyword", "symbols": ["record"]}},
        {"name": "name", "type": "string"},
        {"name": "namespace", "type": ["null", "string"], "default": null},
        {"name": "aliases", "type": ["null", {"type": "array", "items": "string"}], "default": null},
        {"name": "doc", "type": ["null", "string"], "default": null},
        {"name": "fields", "type": {"type": "array", "items": {
            "type": "record", "name": "FieldDecl", "fields": [
                {"name": "name", "type": "string"},
                {"name": "type", "type": [
                    "PrimitiveName", "PrimitiveObject", "FixedDecl", "EnumDecl", "RecordDecl",
                    {"type": "record", "name": "ArrayDecl", "fields": [
                        {"name": "type", "type": {"type": "enum", "name": "ArrayKeyword", "symbols": ["array"]}},
                        {"name": "items", "type": [
                            "PrimitiveName", "PrimitiveObject", "FixedDecl", "EnumDecl",
                            "RecordDecl", "ArrayDecl",
                            {"type": "record", "name": "MapDecl", "fields": [
                                {"name": "type", "type": {"type": "enum", "name": "MapKeyword", "symbols": ["map"]}},
                                {"name": "values", "type": [
                                    "PrimitiveName", "PrimitiveObject", "FixedDecl", "EnumDecl",
                                    "RecordDecl", "ArrayDecl", "MapDecl",
                                    {"type": "array", "items": [
                                        "PrimitiveName", "PrimitiveObject", "FixedDecl", "EnumDecl",
                                        "RecordDecl", "ArrayDecl", "MapDecl"]}
                                ]}
                            ]},
                            {"type": "array", "items": [
                                "PrimitiveName", "PrimitiveObject", "FixedDecl", "EnumDecl",
                                "RecordDecl", "ArrayDecl", "MapDecl"]}
                        ]}
                    ]},
                    "MapDecl",
                    {"type": "array", "items": [
                        "PrimitiveName", "PrimitiveObject", "FixedDecl", "EnumDecl",
                        "RecordDecl", "ArrayDecl", "MapDecl"]}
                ]},
                {"name": "doc", "type": ["null", "string"], "default": null},
                {"name": "order", "type": ["null", {"type": "enum", "name": "OrderName",
                    "symbols": ["ascending", "descending", "ignore"]}], "default": null},
                {"name": "aliases", "type": ["null", {"type": "array", "items": "string"}], "default": null}
            ]
        }}}
    ]},
    "ArrayDecl",
    "MapDecl",
    {"type": "array", "items": [
        "PrimitiveName", "PrimitiveObject", "FixedDecl", "EnumDecl",
        "RecordDecl", "ArrayDecl", "MapDecl"]}
]
"#;

static METASCHEMA: OnceLock<Schema> = OnceLock::new();

/// The schema of schema declarations.
pub fn metaschema() -> &'static Schema {
    METASCHEMA.get_or_init(|| Schema::parse(METASCHEMA_TEXT).expect("fixed schema text"))
}

/// Checks that `declaration` is a legal schema declaration by encoding it
/// under [`metaschema`]. The error is the branch-matching failure, so it
/// names the rejected piece.
pub fn validate_declaration(declaration: &Json) -> Result<()> {
    let mut scratch = Vec::new();
    DatumWriter::new(metaschema()).write(&Value::from(declaration), &mut scratch)
}
