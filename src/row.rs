use std::rc::Rc;

use crate::protocol::ColumnDefinition;
use crate::value::Value;

/// One decoded result row.
///
/// Holds a value per column, in column order, plus a shared handle to the result
/// set's column definitions so a row can be indexed by name as well as by position.
/// `Value::Null` is the null sentinel — there is no separate null bitmap at this
/// layer, unlike the wire-level binary row which carries one.
#[derive(Debug, Clone)]
pub struct Row {
    pub(crate) columns: Rc<[ColumnDefinition]>,
    pub(crate) values: Vec<Value>,
}

impl Row {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn is_null(&self, index: usize) -> bool {
        self.values.get(index).map(Value::is_null).unwrap_or(true)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        let index = self
            .columns
            .iter()
            .position(|c| c.name() == Some(name))?;
        self.values.get(index)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().filter_map(|c| c.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{ColumnType, FieldFlags};

    fn column(name: &str) -> ColumnDefinition {
        ColumnDefinition {
            schema: None,
            table_alias: None,
            table: None,
            column_alias: Some(name.into()),
            column: None,
            char_set: 33,
            max_size: 0,
            column_type: ColumnType::VARCHAR,
            flags: FieldFlags::empty(),
            decimals: 0,
        }
    }

    #[test]
    fn it_looks_up_values_by_column_name() {
        let row = Row {
            columns: Rc::from(vec![column("id"), column("name")]),
            values: vec![Value::I64(1), Value::String("alice".into())],
        };

        assert_eq!(row.get_by_name("name"), Some(&Value::String("alice".into())));
        assert_eq!(row.get_by_name("missing"), None);
    }

    #[test]
    fn it_treats_an_out_of_range_index_as_null() {
        let row = Row {
            columns: Rc::from(Vec::new()),
            values: Vec::new(),
        };
        assert!(row.is_null(0));
    }
}
