use std::io;
use std::path::PathBuf;
use std::result;

use crate::Row;

/// An error found while resolving a CSV source into a typed table.
#[derive(Debug)]
pub enum Error {
    /// The source could not be opened
    SourceAcquisition { path: PathBuf, source: io::Error },

    /// Reading or tokenizing the source failed mid scan
    SourceParse(csv::Error),

    /// A predefined set of properties was required but none was given
    EmptyProperties,

    /// A cell classified as numeric during inference failed to parse. Never
    /// happens unless inference and materialization disagree.
    InconsistentNumber { column: String, value: String },

    /// A cell could not be converted to the declared type of its property
    InvalidValue { property: String, value: String },

    /// Unknown data type name
    InvalidDataType(String),
}

pub type Result<T> = result::Result<T, Error>;

/// The type that flows from the row reader to the resolver. Either a raw row
/// or an error.
pub type RowResult = result::Result<Row, Error>;

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Error {
        Error::SourceParse(error)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::SourceAcquisition { ref source, .. } => Some(source),
            Error::SourceParse(ref e) => Some(e),
            _ => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Error::SourceAcquisition { ref path, ref source } => {
                write!(f, "could not open source {:?}: {}", path, source)
            }
            Error::SourceParse(ref e) => write!(f, "could not parse source: {}", e),
            Error::EmptyProperties => write!(f, "properties must not be empty"),
            Error::InconsistentNumber { ref column, ref value } => write!(
                f,
                "value {:?} of numeric column {:?} is not a number",
                value, column
            ),
            Error::InvalidValue { ref property, ref value } => write!(
                f,
                "value {:?} does not match the type of property {:?}",
                value, property
            ),
            Error::InvalidDataType(ref t) => write!(f, "unknown data type: {}", t),
        }
    }
}
