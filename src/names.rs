use log::trace;

use super::Row;

/// The 1-based number of the record holding the column names, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NameRow(Option<usize>);

impl NameRow {
    /// Builds a name row from its 1-based number. Anything below `1` means
    /// there is no name row.
    pub fn new(row: i64) -> NameRow {
        if row < 1 {
            NameRow(None)
        } else {
            NameRow(Some(row as usize))
        }
    }

    pub fn none() -> NameRow {
        NameRow(None)
    }

    pub fn is_enabled(&self) -> bool {
        self.0.is_some()
    }

    /// Tells if the record at `row_index` (0-based) is the name row
    pub fn is_name_row(&self, row_index: usize) -> bool {
        self.0 == Some(row_index + 1)
    }
}

/// What the resolver decided a record is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Name,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitingNameRow,
    AwaitingFirstDataRow,
    Accumulating,
}

/// Decides the column names while the records go by, without reading them
/// twice.
///
/// Names come either from the configured name row or, when no name row was
/// seen before the first data row, from the positions `"1", "2", ...` of that
/// row. They are resolved at most once.
#[derive(Debug)]
pub struct NameResolver {
    name_row: NameRow,
    resolve_names: bool,
    state: State,
    row_index: usize,
    names: Option<Vec<String>>,
}

impl NameResolver {
    /// `resolve_names` is false when the caller already knows its columns. In
    /// that case the name row is still recognized so it is never taken as
    /// data.
    pub fn new(name_row: NameRow, resolve_names: bool) -> NameResolver {
        let state = if name_row.is_enabled() {
            State::AwaitingNameRow
        } else {
            State::AwaitingFirstDataRow
        };

        NameResolver {
            name_row,
            resolve_names,
            state,
            row_index: 0,
            names: None,
        }
    }

    pub fn feed(&mut self, row: &Row) -> RecordKind {
        let kind = if self.name_row.is_name_row(self.row_index) {
            RecordKind::Name
        } else {
            RecordKind::Data
        };

        match (self.state, kind) {
            (State::AwaitingNameRow, RecordKind::Name) => {
                if self.resolve_names {
                    self.names = Some(row.iter().map(|cell| cell.to_string()).collect());
                }

                self.state = State::Accumulating;
            }
            (State::AwaitingNameRow, RecordKind::Data)
            | (State::AwaitingFirstDataRow, RecordKind::Data) => {
                if self.resolve_names {
                    self.names = Some((1..=row.len()).map(|i| i.to_string()).collect());
                }

                self.state = State::Accumulating;
            }
            // names are already decided, a late name row is only skipped
            _ => {}
        }

        trace!("record {} is {:?}, now {:?}", self.row_index, kind, self.state);

        self.row_index += 1;

        kind
    }

    pub fn names(&self) -> Option<&[String]> {
        self.names.as_ref().map(|n| n.as_slice())
    }

    pub fn finish(self) -> Option<Vec<String>> {
        self.names
    }
}

#[cfg(test)]
mod tests {
    use super::{NameResolver, NameRow, RecordKind};
    use crate::Row;

    fn feed_all(resolver: &mut NameResolver, rows: &[Vec<&str>]) -> Vec<RecordKind> {
        rows.iter()
            .map(|r| resolver.feed(&Row::from(r.clone())))
            .collect()
    }

    #[test]
    fn test_name_row_number() {
        assert!(!NameRow::new(0).is_enabled());
        assert!(!NameRow::new(-3).is_enabled());
        assert_eq!(NameRow::default(), NameRow::none());
        assert!(NameRow::new(1).is_name_row(0));
        assert!(!NameRow::new(2).is_name_row(0));
        assert!(NameRow::new(2).is_name_row(1));
    }

    #[test]
    fn test_names_from_header() {
        let mut resolver = NameResolver::new(NameRow::new(1), true);

        let kinds = feed_all(&mut resolver, &[vec!["a", "b"], vec!["1", "2"]]);

        assert_eq!(kinds, vec![RecordKind::Name, RecordKind::Data]);
        assert_eq!(resolver.finish(), Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_forced_index_names() {
        let mut resolver = NameResolver::new(NameRow::none(), true);

        let kinds = feed_all(&mut resolver, &[vec!["x", "y", "z"], vec!["1"]]);

        assert_eq!(kinds, vec![RecordKind::Data, RecordKind::Data]);
        assert_eq!(
            resolver.finish(),
            Some(vec!["1".to_string(), "2".to_string(), "3".to_string()])
        );
    }

    #[test]
    fn test_late_name_row_does_not_rename() {
        let mut resolver = NameResolver::new(NameRow::new(2), true);

        let kinds = feed_all(&mut resolver, &[vec!["1", "2"], vec!["a", "b"], vec!["3", "4"]]);

        assert_eq!(kinds, vec![RecordKind::Data, RecordKind::Name, RecordKind::Data]);
        assert_eq!(resolver.finish(), Some(vec!["1".to_string(), "2".to_string()]));
    }

    #[test]
    fn test_name_row_past_the_end() {
        let mut resolver = NameResolver::new(NameRow::new(10), true);

        feed_all(&mut resolver, &[vec!["a", "b"]]);

        assert_eq!(resolver.names(), Some(&["1".to_string(), "2".to_string()][..]));
    }

    #[test]
    fn test_no_records() {
        assert_eq!(NameResolver::new(NameRow::new(1), true).finish(), None);
    }

    #[test]
    fn test_passthrough_skips_name_row() {
        let mut resolver = NameResolver::new(NameRow::new(1), false);

        let kinds = feed_all(&mut resolver, &[vec!["a"], vec!["1"]]);

        assert_eq!(kinds, vec![RecordKind::Name, RecordKind::Data]);
        assert_eq!(resolver.finish(), None);
    }
}
