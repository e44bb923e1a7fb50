//! Column schema: the fixed, ordered list of column descriptors.

use thiserror::Error;

/// Describes one column of the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Label of the head cell.
    pub head: String,
    /// Key the host uses to locate this column's body cells.
    pub key: String,
    /// This column holds the per-section selection checkbox.
    pub is_selection: bool,
    /// Cells of this column may hold focusable sub-items.
    pub is_drillable: bool,
}

impl Column {
    /// A plain data column.
    pub fn new(key: impl Into<String>, head: impl Into<String>) -> Self {
        Self {
            head: head.into(),
            key: key.into(),
            is_selection: false,
            is_drillable: false,
        }
    }

    /// The selection column.
    pub fn selection(key: impl Into<String>) -> Self {
        Self {
            is_selection: true,
            ..Self::new(key, "")
        }
    }

    /// Mark this column as the drillable one.
    pub fn drillable(mut self) -> Self {
        self.is_drillable = true;
        self
    }
}

/// Errors raised while building a [`ColumnSchema`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The schema has no columns.
    #[error("column schema is empty")]
    Empty,
    /// More than one column is marked as the selection column.
    #[error("columns {first} and {second} are both marked as the selection column")]
    DuplicateSelection { first: usize, second: usize },
    /// More than one column is marked as drillable.
    #[error("columns {first} and {second} are both marked as drillable")]
    DuplicateDrillable { first: usize, second: usize },
    /// A column is marked both selection and drillable.
    #[error("column {0} cannot be both the selection column and drillable")]
    ConflictingMarkers(usize),
}

/// The ordered, immutable list of columns shared by the head and every body row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    columns: Vec<Column>,
    selection: Option<usize>,
    drillable: Option<usize>,
}

impl ColumnSchema {
    /// Validate and freeze a column list.
    pub fn new(columns: Vec<Column>) -> Result<Self, SchemaError> {
        if columns.is_empty() {
            return Err(SchemaError::Empty);
        }
        let mut selection = None;
        let mut drillable = None;
        for (i, column) in columns.iter().enumerate() {
            if column.is_selection && column.is_drillable {
                return Err(SchemaError::ConflictingMarkers(i));
            }
            if column.is_selection {
                if let Some(first) = selection {
                    return Err(SchemaError::DuplicateSelection { first, second: i });
                }
                selection = Some(i);
            }
            if column.is_drillable {
                if let Some(first) = drillable {
                    return Err(SchemaError::DuplicateDrillable { first, second: i });
                }
                drillable = Some(i);
            }
        }
        Ok(Self {
            columns,
            selection,
            drillable,
        })
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Always `false`; an empty schema is rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Index of the last column.
    pub fn last_index(&self) -> usize {
        self.columns.len() - 1
    }

    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Index of the selection column, if the schema has one.
    pub fn selection_column(&self) -> Option<usize> {
        self.selection
    }

    /// Index of the drillable column, if the schema has one.
    pub fn drillable_column(&self) -> Option<usize> {
        self.drillable
    }

    pub fn is_selection(&self, index: usize) -> bool {
        self.selection == Some(index)
    }

    pub fn is_drillable(&self, index: usize) -> bool {
        self.drillable == Some(index)
    }

    /// Locate a column by its body key.
    pub fn index_of_key(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.key == key)
    }
}
