//! Avro schemas: the in-memory model, parsing from the JSON declaration
//! form, structural equality, and canonical rendering.
//!
//! A parsed [`Schema`] is a tree that owns every named type at the site of
//! its first declaration. Later uses of the same name, including recursive
//! uses inside the declaration itself, are represented as [`Schema::Ref`]
//! back-pointers holding the full name. Consumers that need to chase those
//! references build a borrow map once with [`Schema::named_types`] and look
//! names up in it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::OnceLock;

use educe::Educe;
use regex::Regex;
use serde_json::{Map as JsonMap, Value as Json};

use crate::error::{Error, Result};

/// A schema describing the shape and wire encoding of a datum.
#[derive(Clone, Debug, PartialEq)]
pub enum Schema {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    Record(RecordSchema),
    Enum(EnumSchema),
    Fixed(FixedSchema),
    Array(Box<Schema>),
    Map(Box<Schema>),
    Union(UnionSchema),
    /// A use of a named type declared elsewhere in the same schema. Holds the
    /// full name; the declaration lives at its first occurrence in the tree.
    Ref(String),
}

/// The name of a record, enum, or fixed type, split into its simple name and
/// optional namespace. A dotted `name` attribute is normalized at parse time,
/// so two spellings of the same full name always compare equal.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Name {
    pub name: String,
    pub namespace: Option<String>,
}

impl Name {
    pub fn fullname(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}.{}", ns, self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(ns) = &self.namespace {
            write!(f, "{}.", ns)?;
        }
        f.write_str(&self.name)
    }
}

/// Field sort order. Only recorded, never acted on by the engine itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
    Ignore,
}

#[derive(Educe, Clone, Debug)]
#[educe(PartialEq)]
pub struct RecordSchema {
    pub name: Name,
    #[educe(PartialEq(ignore))]
    pub doc: Option<String>,
    #[educe(PartialEq(ignore))]
    pub aliases: Vec<String>,
    pub fields: Vec<Field>,
}

#[derive(Educe, Clone, Debug)]
#[educe(PartialEq)]
pub struct Field {
    pub name: String,
    #[educe(PartialEq(ignore))]
    pub doc: Option<String>,
    pub schema: Schema,
    /// Default value, kept as raw JSON. It is interpreted against the field
    /// type only when actually needed, at write or resolution time.
    pub default: Option<Json>,
    pub order: SortOrder,
    #[educe(PartialEq(ignore))]
    pub aliases: Vec<String>,
}

impl Field {
    /// True if `name` is this field's name or one of its aliases.
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|a| a == name)
    }
}

#[derive(Educe, Clone, Debug)]
#[educe(PartialEq)]
pub struct EnumSchema {
    pub name: Name,
    #[educe(PartialEq(ignore))]
    pub doc: Option<String>,
    #[educe(PartialEq(ignore))]
    pub aliases: Vec<String>,
    pub symbols: Vec<String>,
    /// Fallback symbol used when resolving data holding a symbol this schema
    /// does not know.
    pub default: Option<String>,
}

impl EnumSchema {
    pub fn index_of(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }
}

#[derive(Educe, Clone, Debug)]
#[educe(PartialEq)]
pub struct FixedSchema {
    pub name: Name,
    #[educe(PartialEq(ignore))]
    pub aliases: Vec<String>,
    pub size: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnionSchema {
    pub branches: Vec<Schema>,
}

impl Schema {
    /// Parses a schema declaration from JSON text.
    pub fn parse(text: &str) -> Result<Schema> {
        let json: Json = serde_json::from_str(text)
            .map_err(|err| Error::SchemaParse(format!("declaration is not valid JSON: {}", err)))?;
        Schema::parse_json(&json)
    }

    /// Parses a schema declaration from already-parsed JSON.
    pub fn parse_json(json: &Json) -> Result<Schema> {
        let mut names = Names::default();
        parse_schema(json, &mut names)
    }

    /// The name of a record, enum, or fixed schema.
    pub fn name(&self) -> Option<&Name> {
        match self {
            Schema::Record(rec) => Some(&rec.name),
            Schema::Enum(en) => Some(&en.name),
            Schema::Fixed(fx) => Some(&fx.name),
            _ => None,
        }
    }

    /// The full name of a named schema or of a name reference.
    pub fn fullname(&self) -> Option<String> {
        match self {
            Schema::Ref(name) => Some(name.clone()),
            _ => self.name().map(Name::fullname),
        }
    }

    /// Collects every named type declared in this schema, keyed by full name.
    /// [`Schema::Ref`] uses are resolved by lookup in the returned map.
    pub fn named_types(&self) -> BTreeMap<String, &Schema> {
        let mut map = BTreeMap::new();
        self.collect_named(&mut map);
        map
    }

    fn collect_named<'a>(&'a self, map: &mut BTreeMap<String, &'a Schema>) {
        match self {
            Schema::Record(rec) => {
                map.insert(rec.name.fullname(), self);
                for field in &rec.fields {
                    field.schema.collect_named(map);
                }
            }
            Schema::Enum(en) => {
                map.insert(en.name.fullname(), self);
            }
            Schema::Fixed(fx) => {
                map.insert(fx.name.fullname(), self);
            }
            Schema::Array(items) => items.collect_named(map),
            Schema::Map(values) => values.collect_named(map),
            Schema::Union(un) => {
                for branch in &un.branches {
                    branch.collect_named(map);
                }
            }
            _ => {}
        }
    }

    /// Follows a name reference to its declaration; any other schema is
    /// returned as-is.
    pub(crate) fn follow<'a>(&'a self, named: &BTreeMap<String, &'a Schema>) -> Result<&'a Schema> {
        match self {
            Schema::Ref(name) => named.get(name.as_str()).copied().ok_or_else(|| {
                Error::SchemaParse(format!("type name {:?} is not defined", name))
            }),
            _ => Ok(self),
        }
    }

    /// Renders the full declaration as JSON. Named types are declared at
    /// their first occurrence and referenced by full name afterwards, so the
    /// output reparses to an equal schema.
    pub fn to_json(&self) -> Json {
        match self {
            Schema::Null => Json::String("null".into()),
            Schema::Boolean => Json::String("boolean".into()),
            Schema::Int => Json::String("int".into()),
            Schema::Long => Json::String("long".into()),
            Schema::Float => Json::String("float".into()),
            Schema::Double => Json::String("double".into()),
            Schema::Bytes => Json::String("bytes".into()),
            Schema::String => Json::String("string".into()),
            Schema::Ref(name) => Json::String(name.clone()),
            Schema::Array(items) => {
                let mut obj = JsonMap::new();
                obj.insert("type".into(), Json::String("array".into()));
                obj.insert("items".into(), items.to_json());
                Json::Object(obj)
            }
            Schema::Map(values) => {
                let mut obj = JsonMap::new();
                obj.insert("type".into(), Json::String("map".into()));
                obj.insert("values".into(), values.to_json());
                Json::Object(obj)
            }
            Schema::Union(un) => Json::Array(un.branches.iter().map(Schema::to_json).collect()),
            Schema::Fixed(fx) => {
                let mut obj = JsonMap::new();
                obj.insert("type".into(), Json::String("fixed".into()));
                obj.insert("name".into(), Json::String(fx.name.fullname()));
                if !fx.aliases.is_empty() {
                    obj.insert("aliases".into(), string_array(&fx.aliases));
                }
                obj.insert("size".into(), Json::from(fx.size));
                Json::Object(obj)
            }
            Schema::Enum(en) => {
                let mut obj = JsonMap::new();
                obj.insert("type".into(), Json::String("enum".into()));
                obj.insert("name".into(), Json::String(en.name.fullname()));
                if let Some(doc) = &en.doc {
                    obj.insert("doc".into(), Json::String(doc.clone()));
                }
                if !en.aliases.is_empty() {
                    obj.insert("aliases".into(), string_array(&en.aliases));
                }
                obj.insert("symbols".into(), string_array(&en.symbols));
                if let Some(default) = &en.default {
                    obj.insert("default".into(), Json::String(default.clone()));
                }
                Json::Object(obj)
            }
            Schema::Record(rec) => {
                let mut obj = JsonMap::new();
                obj.insert("type".into(), Json::String("record".into()));
                obj.insert("name".into(), Json::String(rec.name.fullname()));
                if let Some(doc) = &rec.doc {
                    obj.insert("doc".into(), Json::String(doc.clone()));
                }
                if !rec.aliases.is_empty() {
                    obj.insert("aliases".into(), string_array(&rec.aliases));
                }
                let fields = rec
                    .fields
                    .iter()
                    .map(|f| {
                        let mut fo = JsonMap::new();
                        fo.insert("name".into(), Json::String(f.name.clone()));
                        fo.insert("type".into(), f.schema.to_json());
                        if let Some(default) = &f.default {
                            fo.insert("default".into(), default.clone());
                        }
                        match f.order {
                            SortOrder::Ascending => {}
                            SortOrder::Descending => {
                                fo.insert("order".into(), Json::String("descending".into()));
                            }
                            SortOrder::Ignore => {
                                fo.insert("order".into(), Json::String("ignore".into()));
                            }
                        }
                        if let Some(doc) = &f.doc {
                            fo.insert("doc".into(), Json::String(doc.clone()));
                        }
                        if !f.aliases.is_empty() {
                            fo.insert("aliases".into(), string_array(&f.aliases));
                        }
                        Json::Object(fo)
                    })
                    .collect();
                obj.insert("fields".into(), Json::Array(fields));
                Json::Object(obj)
            }
        }
    }

    /// Renders the parsing canonical form: full names inline, only the
    /// attributes that affect the wire encoding, keys in fixed order, no
    /// whitespace. Two schemas with equal canonical forms encode data
    /// identically.
    pub fn canonical_form(&self) -> String {
        let mut out = String::new();
        self.write_canonical(&mut out);
        out
    }

    fn write_canonical(&self, out: &mut String) {
        match self {
            Schema::Null => out.push_str("\"null\""),
            Schema::Boolean => out.push_str("\"boolean\""),
            Schema::Int => out.push_str("\"int\""),
            Schema::Long => out.push_str("\"long\""),
            Schema::Float => out.push_str("\"float\""),
            Schema::Double => out.push_str("\"double\""),
            Schema::Bytes => out.push_str("\"bytes\""),
            Schema::String => out.push_str("\"string\""),
            Schema::Ref(name) => {
                out.push('"');
                out.push_str(name);
                out.push('"');
            }
            Schema::Array(items) => {
                out.push_str("{\"type\":\"array\",\"items\":");
                items.write_canonical(out);
                out.push('}');
            }
            Schema::Map(values) => {
                out.push_str("{\"type\":\"map\",\"values\":");
                values.write_canonical(out);
                out.push('}');
            }
            Schema::Union(un) => {
                out.push('[');
                for (i, branch) in un.branches.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    branch.write_canonical(out);
                }
                out.push(']');
            }
            Schema::Fixed(fx) => {
                out.push_str("{\"name\":\"");
                out.push_str(&fx.name.fullname());
                out.push_str("\",\"type\":\"fixed\",\"size\":");
                out.push_str(&fx.size.to_string());
                out.push('}');
            }
            Schema::Enum(en) => {
                out.push_str("{\"name\":\"");
                out.push_str(&en.name.fullname());
                out.push_str("\",\"type\":\"enum\",\"symbols\":[");
                for (i, symbol) in en.symbols.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push('"');
                    out.push_str(symbol);
                    out.push('"');
                }
                out.push_str("]}");
            }
            Schema::Record(rec) => {
                out.push_str("{\"name\":\"");
                out.push_str(&rec.name.fullname());
                out.push_str("\",\"type\":\"record\",\"fields\":[");
                for (i, field) in rec.fields.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push_str("{\"name\":\"");
                    out.push_str(&field.name);
                    out.push_str("\",\"type\":");
                    field.schema.write_canonical(out);
                    out.push('}');
                }
                out.push_str("]}");
            }
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl serde::Serialize for Schema {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

fn string_array(strings: &[String]) -> Json {
    Json::Array(strings.iter().cloned().map(Json::String).collect())
}

fn primitive_by_name(name: &str) -> Option<Schema> {
    Some(match name {
        "null" => Schema::Null,
        "boolean" => Schema::Boolean,
        "int" => Schema::Int,
        "long" => Schema::Long,
        "float" => Schema::Float,
        "double" => Schema::Double,
        "bytes" => Schema::Bytes,
        "string" => Schema::String,
        _ => return None,
    })
}

fn base_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("fixed pattern"))
}

fn full_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$").expect("fixed pattern")
    })
}

/// Parse-session state: the set of full names declared so far, and the
/// namespace of the nearest enclosing named declaration.
#[derive(Default)]
struct Names {
    defined: BTreeSet<String>,
    namespace: Option<String>,
}

impl Names {
    /// Normalizes a `name`/`namespace` attribute pair. A dotted name is
    /// already full and its namespace attribute is ignored; otherwise the
    /// explicit namespace or, failing that, the enclosing one applies.
    fn resolve(&self, name_attr: &str, space_attr: Option<&str>) -> Result<Name> {
        let (name, namespace) = match name_attr.rfind('.') {
            Some(dot) => (
                name_attr[dot + 1..].to_string(),
                Some(name_attr[..dot].to_string()),
            ),
            None => {
                let space = space_attr
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .or_else(|| self.namespace.clone());
                (name_attr.to_string(), space)
            }
        };
        let name = Name { name, namespace };
        if !full_name_pattern().is_match(&name.fullname()) {
            return Err(Error::SchemaParse(format!(
                "{:?} is not a well-formed name",
                name.fullname()
            )));
        }
        Ok(name)
    }

    fn define(&mut self, name: &Name) -> Result<()> {
        if primitive_by_name(&name.name).is_some() {
            return Err(Error::SchemaParse(format!(
                "{:?} is a reserved type name",
                name.name
            )));
        }
        let full = name.fullname();
        if !self.defined.insert(full.clone()) {
            return Err(Error::SchemaParse(format!(
                "type {} is declared more than once",
                full
            )));
        }
        Ok(())
    }

    /// Resolves a type-name use to the full name of its declaration, using
    /// the same namespacing rules as declarations themselves.
    fn lookup(&self, reference: &str) -> Option<String> {
        let full = if reference.contains('.') {
            reference.to_string()
        } else {
            match &self.namespace {
                Some(ns) => format!("{}.{}", ns, reference),
                None => reference.to_string(),
            }
        };
        self.defined.contains(&full).then_some(full)
    }
}

fn parse_schema(json: &Json, names: &mut Names) -> Result<Schema> {
    match json {
        Json::String(name) => parse_type_name(name, names),
        Json::Array(branches) => parse_union(branches, names),
        Json::Object(obj) => parse_object(obj, names),
        other => Err(Error::SchemaParse(format!(
            "declaration must be a type name, an object, or a union array, got {}",
            other
        ))),
    }
}

fn parse_type_name(name: &str, names: &Names) -> Result<Schema> {
    if let Some(primitive) = primitive_by_name(name) {
        return Ok(primitive);
    }
    match names.lookup(name) {
        Some(full) => Ok(Schema::Ref(full)),
        None => Err(Error::SchemaParse(format!(
            "type name {:?} is not defined",
            name
        ))),
    }
}

fn parse_object(obj: &JsonMap<String, Json>, names: &mut Names) -> Result<Schema> {
    let kind = match obj.get("type") {
        Some(Json::String(s)) => s.as_str(),
        Some(other) => {
            return Err(Error::SchemaParse(format!(
                "\"type\" attribute must be a type name, got {}",
                other
            )))
        }
        None => {
            return Err(Error::SchemaParse(
                "declaration object has no \"type\" attribute".into(),
            ))
        }
    };
    if let Some(primitive) = primitive_by_name(kind) {
        return Ok(primitive);
    }
    match kind {
        "record" => parse_record(obj, names),
        "enum" => parse_enum(obj, names),
        "fixed" => parse_fixed(obj, names),
        "array" => {
            let items = obj.get("items").ok_or_else(|| {
                Error::SchemaParse("array declaration is missing \"items\"".into())
            })?;
            Ok(Schema::Array(Box::new(parse_schema(items, names)?)))
        }
        "map" => {
            let values = obj.get("values").ok_or_else(|| {
                Error::SchemaParse("map declaration is missing \"values\"".into())
            })?;
            Ok(Schema::Map(Box::new(parse_schema(values, names)?)))
        }
        other => Err(Error::SchemaParse(format!(
            "{:?} is not a known type",
            other
        ))),
    }
}

fn parse_union(branches: &[Json], names: &mut Names) -> Result<Schema> {
    let mut seen = BTreeSet::new();
    let mut parsed = Vec::with_capacity(branches.len());
    for branch in branches {
        let schema = parse_schema(branch, names)?;
        if matches!(schema, Schema::Union(_)) {
            return Err(Error::SchemaParse(
                "union may not immediately contain another union".into(),
            ));
        }
        // Two branches may only repeat a kind when both are named types with
        // different names; everything else must be unambiguous.
        let key = match &schema {
            Schema::Array(_) => "array".to_string(),
            Schema::Map(_) => "map".to_string(),
            other => match other.fullname() {
                Some(full) => full,
                None => other.to_string(),
            },
        };
        if !seen.insert(key.clone()) {
            return Err(Error::SchemaParse(format!(
                "union has more than one {} branch",
                key
            )));
        }
        parsed.push(schema);
    }
    Ok(Schema::Union(UnionSchema { branches: parsed }))
}

fn parse_record(obj: &JsonMap<String, Json>, names: &mut Names) -> Result<Schema> {
    let name = parse_declared_name(obj, names)?;
    let doc = opt_str_attr(obj, "doc")?.map(str::to_string);
    let aliases = parse_aliases(obj)?;
    let fields_json = match obj.get("fields") {
        Some(Json::Array(fields)) => fields,
        Some(other) => {
            return Err(Error::SchemaParse(format!(
                "record {} \"fields\" must be an array, got {}",
                name, other
            )))
        }
        None => {
            return Err(Error::SchemaParse(format!(
                "record {} has no \"fields\" attribute",
                name
            )))
        }
    };

    // Unqualified names inside the record resolve in its namespace.
    let enclosing = std::mem::replace(&mut names.namespace, name.namespace.clone());
    let mut fields = Vec::with_capacity(fields_json.len());
    let mut field_names = BTreeSet::new();
    for field_json in fields_json {
        let field = parse_field(field_json, names)?;
        if !field_names.insert(field.name.clone()) {
            names.namespace = enclosing;
            return Err(Error::SchemaParse(format!(
                "record {} declares field {:?} more than once",
                name, field.name
            )));
        }
        fields.push(field);
    }
    names.namespace = enclosing;

    Ok(Schema::Record(RecordSchema {
        name,
        doc,
        aliases,
        fields,
    }))
}

fn parse_field(json: &Json, names: &mut Names) -> Result<Field> {
    let obj = json.as_object().ok_or_else(|| {
        Error::SchemaParse(format!("record field must be an object, got {}", json))
    })?;
    let name = req_str_attr(obj, "name", "field")?;
    if !base_name_pattern().is_match(name) {
        return Err(Error::SchemaParse(format!(
            "{:?} is not a well-formed field name",
            name
        )));
    }
    let type_json = obj
        .get("type")
        .ok_or_else(|| Error::SchemaParse(format!("field {:?} has no \"type\"", name)))?;
    let schema = parse_schema(type_json, names)?;
    let order = match obj.get("order") {
        None => SortOrder::Ascending,
        Some(Json::String(s)) => match s.as_str() {
            "ascending" => SortOrder::Ascending,
            "descending" => SortOrder::Descending,
            "ignore" => SortOrder::Ignore,
            other => {
                return Err(Error::SchemaParse(format!(
                    "{:?} is not a field order",
                    other
                )))
            }
        },
        Some(other) => {
            return Err(Error::SchemaParse(format!(
                "field \"order\" must be a string, got {}",
                other
            )))
        }
    };
    Ok(Field {
        name: name.to_string(),
        doc: opt_str_attr(obj, "doc")?.map(str::to_string),
        schema,
        default: obj.get("default").cloned(),
        order,
        aliases: parse_aliases(obj)?,
    })
}

fn parse_enum(obj: &JsonMap<String, Json>, names: &mut Names) -> Result<Schema> {
    let name = parse_declared_name(obj, names)?;
    let symbols_json = match obj.get("symbols") {
        Some(Json::Array(symbols)) => symbols,
        Some(other) => {
            return Err(Error::SchemaParse(format!(
                "enum {} \"symbols\" must be an array, got {}",
                name, other
            )))
        }
        None => {
            return Err(Error::SchemaParse(format!(
                "enum {} has no \"symbols\" attribute",
                name
            )))
        }
    };
    let mut symbols = Vec::with_capacity(symbols_json.len());
    let mut seen = BTreeSet::new();
    for symbol in symbols_json {
        let symbol = symbol.as_str().ok_or_else(|| {
            Error::SchemaParse(format!("enum {} symbols must be strings", name))
        })?;
        if !base_name_pattern().is_match(symbol) {
            return Err(Error::SchemaParse(format!(
                "{:?} is not a well-formed enum symbol",
                symbol
            )));
        }
        if !seen.insert(symbol) {
            return Err(Error::SchemaParse(format!(
                "enum {} lists symbol {:?} more than once",
                name, symbol
            )));
        }
        symbols.push(symbol.to_string());
    }
    let default = opt_str_attr(obj, "default")?.map(str::to_string);
    if let Some(default) = &default {
        if !symbols.iter().any(|s| s == default) {
            return Err(Error::SchemaParse(format!(
                "enum {} default {:?} is not one of its symbols",
                name, default
            )));
        }
    }
    Ok(Schema::Enum(EnumSchema {
        name,
        doc: opt_str_attr(obj, "doc")?.map(str::to_string),
        aliases: parse_aliases(obj)?,
        symbols,
        default,
    }))
}

fn parse_fixed(obj: &JsonMap<String, Json>, names: &mut Names) -> Result<Schema> {
    let name = parse_declared_name(obj, names)?;
    let size = match obj.get("size") {
        Some(size) => size.as_u64().ok_or_else(|| {
            Error::SchemaParse(format!(
                "fixed {} \"size\" must be a non-negative integer",
                name
            ))
        })? as usize,
        None => {
            return Err(Error::SchemaParse(format!(
                "fixed {} has no \"size\" attribute",
                name
            )))
        }
    };
    Ok(Schema::Fixed(FixedSchema {
        name,
        aliases: parse_aliases(obj)?,
        size,
    }))
}

/// Reads and registers the name of a named declaration. Registration happens
/// before the body parses, so the body may reference the type being declared.
fn parse_declared_name(obj: &JsonMap<String, Json>, names: &mut Names) -> Result<Name> {
    let name_attr = req_str_attr(obj, "name", "named type")?;
    let space_attr = opt_str_attr(obj, "namespace")?;
    let name = names.resolve(name_attr, space_attr)?;
    names.define(&name)?;
    Ok(name)
}

fn req_str_attr<'a>(obj: &'a JsonMap<String, Json>, key: &str, what: &str) -> Result<&'a str> {
    match obj.get(key) {
        Some(Json::String(s)) => Ok(s),
        Some(other) => Err(Error::SchemaParse(format!(
            "{} attribute {:?} must be a string, got {}",
            what, key, other
        ))),
        None => Err(Error::SchemaParse(format!(
            "{} declaration is missing {:?}",
            what, key
        ))),
    }
}

fn opt_str_attr<'a>(obj: &'a JsonMap<String, Json>, key: &str) -> Result<Option<&'a str>> {
    match obj.get(key) {
        None => Ok(None),
        Some(Json::String(s)) => Ok(Some(s)),
        Some(other) => Err(Error::SchemaParse(format!(
            "attribute {:?} must be a string, got {}",
            key, other
        ))),
    }
}

fn parse_aliases(obj: &JsonMap<String, Json>) -> Result<Vec<String>> {
    match obj.get("aliases") {
        None => Ok(Vec::new()),
        Some(Json::Array(aliases)) => aliases
            .iter()
            .map(|a| {
                a.as_str().map(str::to_string).ok_or_else(|| {
                    Error::SchemaParse("\"aliases\" must be an array of strings".into())
                })
            })
            .collect(),
        Some(other) => Err(Error::SchemaParse(format!(
            "\"aliases\" must be an array of strings, got {}",
            other
        ))),
    }
}
