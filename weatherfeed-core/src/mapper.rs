//! Name-bound conversion of flat feed sections into records.
//!
//! Every record type describes its fields with a static [`FieldSpec`] list.
//! [`map_section`] looks each raw key up by name, coerces it and hands the
//! result to the record's constructor, so the order of keys in the feed never
//! matters.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::{MappingError, MappingReason, RecordError};

/// A flat section as found in the feed: field name to scalar value.
pub type RawSection = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    Text,
    Float,
    Int,
}

/// Binding of one record field to the raw key it is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub key: &'static str,
    pub coercion: Coercion,
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str, coercion: Coercion) -> Self {
        Self { name, key: name, coercion, required: true }
    }

    /// Absent optional fields take the coercion's zero value ("" for text).
    pub const fn optional(name: &'static str, coercion: Coercion) -> Self {
        Self { name, key: name, coercion, required: false }
    }

    /// Read the field from a raw key with a different name.
    pub const fn from_key(self, key: &'static str) -> Self {
        Self { key, ..self }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Float(f64),
    Int(i64),
}

impl Scalar {
    fn zero(coercion: Coercion) -> Self {
        match coercion {
            Coercion::Text => Scalar::Text(String::new()),
            Coercion::Float => Scalar::Float(0.0),
            Coercion::Int => Scalar::Int(0),
        }
    }
}

/// Coerced field values of one section, keyed by record field name.
#[derive(Debug, Clone)]
pub struct Fields {
    section: &'static str,
    values: HashMap<&'static str, Scalar>,
}

impl Fields {
    pub fn section(&self) -> &'static str {
        self.section
    }

    pub fn text(&self, name: &'static str) -> Result<String, MappingError> {
        match self.values.get(name) {
            Some(Scalar::Text(s)) => Ok(s.clone()),
            Some(_) => Err(self.error(name, MappingReason::Type)),
            None => Err(self.error(name, MappingReason::Missing)),
        }
    }

    pub fn float(&self, name: &'static str) -> Result<f64, MappingError> {
        match self.values.get(name) {
            Some(Scalar::Float(v)) => Ok(*v),
            Some(_) => Err(self.error(name, MappingReason::Type)),
            None => Err(self.error(name, MappingReason::Missing)),
        }
    }

    pub fn int(&self, name: &'static str) -> Result<i64, MappingError> {
        match self.values.get(name) {
            Some(Scalar::Int(v)) => Ok(*v),
            Some(_) => Err(self.error(name, MappingReason::Type)),
            None => Err(self.error(name, MappingReason::Missing)),
        }
    }

    fn error(&self, field: &'static str, reason: MappingReason) -> MappingError {
        MappingError { section: self.section, field, reason }
    }
}

/// A record that can be built from a feed section.
pub trait Record: Sized {
    /// Section name, used in error reports.
    const SECTION: &'static str;

    /// Fields in declaration order.
    const FIELDS: &'static [FieldSpec];

    fn from_fields(fields: Fields) -> Result<Self, RecordError>;
}

/// Map one raw section into `T`.
pub fn map_section<T: Record>(raw: &RawSection) -> Result<T, RecordError> {
    let fields = bind(T::SECTION, T::FIELDS, raw)?;
    T::from_fields(fields)
}

/// Look up and coerce every described field. Unknown raw keys are ignored.
pub fn bind(
    section: &'static str,
    specs: &[FieldSpec],
    raw: &RawSection,
) -> Result<Fields, MappingError> {
    let mut values = HashMap::with_capacity(specs.len());

    for spec in specs {
        let scalar = match raw.get(spec.key) {
            None | Some(Value::Null) if spec.required => {
                return Err(MappingError { section, field: spec.name, reason: MappingReason::Missing });
            }
            None | Some(Value::Null) => Scalar::zero(spec.coercion),
            Some(value) => coerce(value, spec.coercion).ok_or(MappingError {
                section,
                field: spec.name,
                reason: MappingReason::Type,
            })?,
        };
        values.insert(spec.name, scalar);
    }

    Ok(Fields { section, values })
}

fn coerce(value: &Value, coercion: Coercion) -> Option<Scalar> {
    match coercion {
        Coercion::Text => match value {
            Value::String(s) => Some(Scalar::Text(s.clone())),
            Value::Number(n) => Some(Scalar::Text(n.to_string())),
            Value::Bool(b) => Some(Scalar::Text(b.to_string())),
            _ => None,
        },
        Coercion::Float => {
            let v = match value {
                Value::Number(n) => n.as_f64()?,
                Value::String(s) => s.trim().parse::<f64>().ok()?,
                _ => return None,
            };
            v.is_finite().then_some(Scalar::Float(v))
        }
        Coercion::Int => match value {
            Value::Number(n) => n.as_i64().map(Scalar::Int),
            Value::String(s) => s.trim().parse::<i64>().ok().map(Scalar::Int),
            _ => None,
        },
    }
}
