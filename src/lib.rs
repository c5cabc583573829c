mod error;
mod infer;
mod input;
mod names;
mod property;
mod resolver;
mod value;

pub use error::{Error, Result, RowResult};
pub use infer::{infer_number_columns, NumberColumns};
pub use input::{CsvFileSource, CsvSource, CsvValueSource, Records};
pub use names::{NameResolver, NameRow, RecordKind};
pub use property::{DataType, Property};
pub use resolver::{CsvResolver, ResolvedResult};
pub use value::{convert, is_number, parse_number, TypedRow, Value};

pub type Row = csv::StringRecord;
