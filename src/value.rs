use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

use crate::{
    error::Result,
    infer::NumberColumns,
    property::{DataType, Property},
    Error, Row,
};

/// A typed cell of the resolved table
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Number(f64),
    Null,
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match *self {
            Value::String(ref s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::String(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Value {
        Value::Number(n)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match *self {
            Value::String(ref s) => serializer.serialize_str(s),
            Value::Number(n) if n.is_finite() => serializer.serialize_f64(n),
            // JSON has no NaN or infinities, keep them readable
            Value::Number(n) => serializer.serialize_str(&n.to_string()),
            Value::Null => serializer.serialize_unit(),
        }
    }
}

/// A row of the resolved table: property names mapped to their values, in
/// column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypedRow {
    indexes: HashMap<String, usize>,
    entries: Vec<(String, Value)>,
}

impl TypedRow {
    pub fn with_capacity(capacity: usize) -> TypedRow {
        TypedRow {
            indexes: HashMap::with_capacity(capacity),
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Sets the value of `name`. An already present name keeps its position
    /// and takes the new value.
    pub fn insert(&mut self, name: &str, value: Value) {
        match self.indexes.get(name) {
            Some(&index) => self.entries[index].1 = value,
            None => {
                self.indexes.insert(name.to_string(), self.entries.len());
                self.entries.push((name.to_string(), value));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.indexes.get(name).map(|&index| &self.entries[index].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl<'a> std::iter::FromIterator<(&'a str, Value)> for TypedRow {
    fn from_iter<I: IntoIterator<Item = (&'a str, Value)>>(iter: I) -> TypedRow {
        let mut row = TypedRow::default();

        for (name, value) in iter {
            row.insert(name, value);
        }

        row
    }
}

impl Serialize for TypedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;

        for (name, value) in self.entries.iter() {
            map.serialize_entry(name, value)?;
        }

        map.end()
    }
}

/// Parses a finite number. `NaN` and infinities in any spelling are text.
pub fn parse_number(s: &str) -> Option<f64> {
    if s.is_empty() {
        return None;
    }

    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Tells if a raw cell can be taken as a number. Empty and non-finite cells
/// never are.
pub fn is_number(s: &str) -> bool {
    parse_number(s).is_some()
}

/// Number of cells of `row` that make it into the typed row
fn cutoff(row: &Row, properties: &[Property]) -> usize {
    std::cmp::min(row.len(), properties.len())
}

/// Materializes a row using the column types decided by inference.
pub fn materialize_inferred(
    row: &Row,
    properties: &[Property],
    numbers: &NumberColumns,
) -> Result<TypedRow> {
    let size = cutoff(row, properties);
    let mut typed = TypedRow::with_capacity(size);

    for (i, (property, raw)) in properties.iter().zip(row.iter()).enumerate() {
        let value = if numbers.is_number(i) {
            match parse_number(raw) {
                Some(n) => Value::Number(n),
                None => {
                    return Err(Error::InconsistentNumber {
                        column: property.name.clone(),
                        value: raw.to_string(),
                    })
                }
            }
        } else {
            Value::String(raw.to_string())
        };

        typed.insert(&property.name, value);
    }

    Ok(typed)
}

/// Converts a raw cell to the declared type of its property.
pub fn convert(raw: &str, property: &Property) -> Result<Value> {
    match property.data_type {
        DataType::String => Ok(Value::from(raw)),
        DataType::Number if raw.is_empty() => Ok(Value::Null),
        DataType::Number => parse_number(raw).map(Value::Number).ok_or_else(|| {
            Error::InvalidValue {
                property: property.name.clone(),
                value: raw.to_string(),
            }
        }),
    }
}

/// Materializes a row with caller supplied properties, each cell converted by
/// the type its property declares.
pub fn materialize_declared(row: &Row, properties: &[Property]) -> Result<TypedRow> {
    let mut typed = TypedRow::with_capacity(cutoff(row, properties));

    for (property, raw) in properties.iter().zip(row.iter()) {
        typed.insert(&property.name, convert(raw, property)?);
    }

    Ok(typed)
}
