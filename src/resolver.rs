use log::{debug, warn};
use serde::Serialize;

use crate::{
    error::Result,
    infer::infer_number_columns,
    input::CsvSource,
    names::{NameResolver, NameRow, RecordKind},
    property::Property,
    value::{materialize_declared, materialize_inferred, TypedRow},
    Error, Row, RowResult,
};

/// The typed table a CSV source resolves to.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ResolvedResult {
    pub properties: Vec<Property>,
    pub rows: Vec<TypedRow>,
}

/// Resolves CSV records into a typed table.
///
/// Without properties both the columns and their types are taken from the
/// data. With properties the records are converted using the declared types
/// and nothing is inferred. Either way the configured name row is never taken
/// as data.
#[derive(Debug, Clone, Default)]
pub struct CsvResolver {
    name_row: NameRow,
    properties: Vec<Property>,
}

impl CsvResolver {
    pub fn new() -> CsvResolver {
        Default::default()
    }

    pub fn name_row(mut self, name_row: NameRow) -> CsvResolver {
        self.name_row = name_row;
        self
    }

    pub fn properties(mut self, properties: Vec<Property>) -> CsvResolver {
        self.properties = properties;
        self
    }

    pub fn get_name_row(&self) -> NameRow {
        self.name_row
    }

    pub fn get_properties(&self) -> &[Property] {
        &self.properties
    }

    /// Infers columns and types from the source, ignoring any configured
    /// properties.
    pub fn resolve<S: CsvSource + ?Sized>(&self, source: &S) -> Result<ResolvedResult> {
        infer_records(self.name_row, source.records()?)
    }

    /// Reads the source with the configured properties. Fails before opening
    /// the source if there are none.
    pub fn result<S: CsvSource + ?Sized>(&self, source: &S) -> Result<ResolvedResult> {
        if self.properties.is_empty() {
            return Err(Error::EmptyProperties);
        }

        declared_records(self.name_row, &self.properties, source.records()?)
    }

    /// Resolves already tokenized records: by inference if no properties are
    /// configured, by the declared types otherwise.
    pub fn resolve_records<I>(&self, records: I) -> Result<ResolvedResult>
    where
        I: IntoIterator<Item = RowResult>,
    {
        if self.properties.is_empty() {
            infer_records(self.name_row, records)
        } else {
            declared_records(self.name_row, &self.properties, records)
        }
    }
}

fn infer_records<I>(name_row: NameRow, records: I) -> Result<ResolvedResult>
where
    I: IntoIterator<Item = RowResult>,
{
    let mut names = NameResolver::new(name_row, true);
    let mut data: Vec<Row> = Vec::new();

    for record in records {
        let record = record?;

        if names.feed(&record) == RecordKind::Data {
            data.push(record);
        }
    }

    let mut properties: Vec<Property> = names
        .finish()
        .unwrap_or_default()
        .into_iter()
        .map(Property::string)
        .collect();

    debug!(
        "resolved {} columns from {} data rows",
        properties.len(),
        data.len()
    );

    let numbers = infer_number_columns(properties.len(), &data);
    numbers.apply(&mut properties);

    let ragged = data.iter().filter(|row| row.len() != properties.len()).count();

    if ragged > 0 {
        warn!(
            "{} rows do not have exactly {} cells, they will be truncated",
            ragged,
            properties.len()
        );
    }

    let mut rows = Vec::with_capacity(data.len());

    for row in data.iter() {
        rows.push(materialize_inferred(row, &properties, &numbers)?);
    }

    Ok(ResolvedResult { properties, rows })
}

fn declared_records<I>(
    name_row: NameRow,
    properties: &[Property],
    records: I,
) -> Result<ResolvedResult>
where
    I: IntoIterator<Item = RowResult>,
{
    let mut names = NameResolver::new(name_row, false);
    let mut rows = Vec::new();

    for record in records {
        let record = record?;

        if names.feed(&record) == RecordKind::Data {
            rows.push(materialize_declared(&record, properties)?);
        }
    }

    debug!("read {} rows with {} declared columns", rows.len(), properties.len());

    Ok(ResolvedResult {
        properties: properties.to_vec(),
        rows,
    })
}
