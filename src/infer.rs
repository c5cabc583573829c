use log::debug;

use crate::{
    property::{DataType, Property},
    value::is_number,
    Row,
};

/// What the scan found out about each column: `None` if no cell of it was
/// seen, `Some(false)` as soon as one cell is not a number.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NumberColumns {
    columns: Vec<Option<bool>>,
}

impl NumberColumns {
    pub fn new(column_count: usize) -> NumberColumns {
        NumberColumns {
            columns: vec![None; column_count],
        }
    }

    /// Records the cells of one row. Columns already known not to be numeric
    /// are not looked at again.
    pub fn observe(&mut self, row: &Row) {
        for (seen, cell) in self.columns.iter_mut().zip(row.iter()) {
            if *seen == Some(false) {
                continue;
            }

            *seen = Some(is_number(cell));
        }
    }

    /// Only columns that were seen and had nothing but numbers are numeric
    pub fn is_number(&self, column: usize) -> bool {
        self.columns.get(column) == Some(&Some(true))
    }

    /// Promotes the numeric columns of `properties`.
    pub fn apply(&self, properties: &mut [Property]) {
        for (i, property) in properties.iter_mut().enumerate() {
            if self.is_number(i) {
                property.data_type = DataType::Number;
            }
        }
    }
}

impl From<Vec<Option<bool>>> for NumberColumns {
    fn from(columns: Vec<Option<bool>>) -> NumberColumns {
        NumberColumns { columns }
    }
}

/// Scans every buffered row to decide which of the first `column_count`
/// columns hold only numbers.
pub fn infer_number_columns<'a, I>(column_count: usize, rows: I) -> NumberColumns
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut numbers = NumberColumns::new(column_count);

    for row in rows {
        numbers.observe(row);
    }

    debug!("numeric columns: {:?}", numbers.columns);

    numbers
}

#[cfg(test)]
mod tests {
    use super::{infer_number_columns, NumberColumns};
    use crate::{DataType, Property, Row};

    fn rows(data: &[&[&str]]) -> Vec<Row> {
        data.iter().map(|r| Row::from(r.to_vec())).collect()
    }

    #[test]
    fn test_all_numbers() {
        let data = rows(&[&["1", "a"], &["2.5", "b"]]);

        let numbers = infer_number_columns(2, &data);

        assert!(numbers.is_number(0));
        assert!(!numbers.is_number(1));
    }

    #[test]
    fn test_one_bad_cell_disproves_column() {
        let data = rows(&[&["1"], &["2"], &["n/a"], &["4"]]);

        assert!(!infer_number_columns(1, &data).is_number(0));
    }

    #[test]
    fn test_empty_cell_is_not_a_number() {
        let data = rows(&[&["1"], &[""]]);

        assert!(!infer_number_columns(1, &data).is_number(0));
    }

    #[test]
    fn test_unseen_columns_stay_strings() {
        let data = rows(&[&["1"], &["2"]]);

        let numbers = infer_number_columns(3, &data);

        assert_eq!(numbers, NumberColumns::from(vec![Some(true), None, None]));
        assert!(!numbers.is_number(1));
        assert!(!numbers.is_number(7));
    }

    #[test]
    fn test_cells_beyond_columns_are_ignored() {
        let data = rows(&[&["1", "x"]]);

        assert_eq!(infer_number_columns(1, &data), NumberColumns::from(vec![Some(true)]));
    }

    #[test]
    fn test_apply() {
        let mut properties = vec![Property::string("a"), Property::string("b")];

        NumberColumns::from(vec![Some(false), Some(true)]).apply(&mut properties);

        assert_eq!(properties[0].data_type, DataType::String);
        assert_eq!(properties[1].data_type, DataType::Number);
    }
}
