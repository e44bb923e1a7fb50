//! Grid snapshot: sections of rows of cells, addressed by index.
//!
//! The host owns the contents and the visibility flags; the cursor engine
//! only reads them. Structural parents are never stored on children: every
//! lookup goes through explicit `(section, row, column)` indices.

use thiserror::Error;

use crate::schema::ColumnSchema;

/// A focusable element of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusTarget {
    /// A head cell.
    Head { column: usize },
    /// A body cell.
    Cell {
        section: usize,
        row: usize,
        column: usize,
    },
    /// A sub-item inside a drillable body cell.
    SubItem {
        section: usize,
        row: usize,
        column: usize,
        item: usize,
    },
}

impl FocusTarget {
    pub fn column(&self) -> usize {
        match *self {
            FocusTarget::Head { column }
            | FocusTarget::Cell { column, .. }
            | FocusTarget::SubItem { column, .. } => column,
        }
    }

    /// `(section, row)` of a body target.
    pub fn row_address(&self) -> Option<(usize, usize)> {
        match *self {
            FocusTarget::Head { .. } => None,
            FocusTarget::Cell { section, row, .. } | FocusTarget::SubItem { section, row, .. } => {
                Some((section, row))
            }
        }
    }

    pub fn is_head(&self) -> bool {
        matches!(self, FocusTarget::Head { .. })
    }
}

/// One body cell. Only drillable cells have sub-items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridCell {
    pub sub_items: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRow {
    cells: Vec<GridCell>,
    /// Set by the host's filter.
    pub hidden: bool,
}

impl GridRow {
    /// A visible row of `columns` cells without sub-items.
    pub fn new(columns: usize) -> Self {
        Self {
            cells: vec![GridCell::default(); columns],
            hidden: false,
        }
    }

    /// Give the cell at `column` a number of sub-items.
    pub fn with_sub_items(mut self, column: usize, count: usize) -> Self {
        if let Some(cell) = self.cells.get_mut(column) {
            cell.sub_items = count;
        }
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }
}

/// A contiguous run of rows representing one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    rows: Vec<GridRow>,
    /// Set by the host's filter.
    pub hidden: bool,
    /// Value of the selection checkbox shared by every row of the section.
    pub selected: bool,
}

impl Section {
    pub fn new(rows: Vec<GridRow>) -> Self {
        Self {
            rows,
            hidden: false,
            selected: false,
        }
    }

    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    /// Toggle a row's filter flag. Rows themselves stay immutable so the
    /// schema checks made on insertion keep holding.
    pub fn set_row_hidden(&mut self, row: usize, hidden: bool) {
        if let Some(r) = self.rows.get_mut(row) {
            r.hidden = hidden;
        }
    }

    fn has_visible_row(&self) -> bool {
        self.rows.iter().any(|r| !r.hidden)
    }
}

/// A selection value for one section, as delivered to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionChange {
    pub section: usize,
    pub selected: bool,
}

/// Errors raised when grid content does not fit the schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// A row does not have exactly one cell per column.
    #[error("row {row} of section {section} has {found} cells, schema has {expected} columns")]
    CellCount {
        section: usize,
        row: usize,
        expected: usize,
        found: usize,
    },
    /// A cell outside the drillable column carries sub-items.
    #[error("cell ({section}, {row}, {column}) has sub-items but its column is not drillable")]
    SubItemsOutsideDrillable {
        section: usize,
        row: usize,
        column: usize,
    },
    /// A section has no rows.
    #[error("section {0} has no rows")]
    EmptySection(usize),
}

/// The full table body plus its column schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    schema: ColumnSchema,
    sections: Vec<Section>,
}

impl Grid {
    /// Build a grid, checking every row against the schema.
    pub fn new(schema: ColumnSchema, sections: Vec<Section>) -> Result<Self, GridError> {
        for (index, section) in sections.iter().enumerate() {
            check_section(&schema, index, section)?;
        }
        Ok(Self { schema, sections })
    }

    /// A grid with no sections yet.
    pub fn empty(schema: ColumnSchema) -> Self {
        Self {
            schema,
            sections: Vec::new(),
        }
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, section: usize) -> Option<&Section> {
        self.sections.get(section)
    }

    pub fn section_mut(&mut self, section: usize) -> Option<&mut Section> {
        self.sections.get_mut(section)
    }

    pub fn row(&self, section: usize, row: usize) -> Option<&GridRow> {
        self.sections.get(section)?.rows.get(row)
    }

    pub fn cell(&self, section: usize, row: usize, column: usize) -> Option<&GridCell> {
        self.row(section, row)?.cells.get(column)
    }

    /// Append a section (e.g. a freshly fetched record). Returns its index.
    pub fn push_section(&mut self, section: Section) -> Result<usize, GridError> {
        let index = self.sections.len();
        check_section(&self.schema, index, &section)?;
        self.sections.push(section);
        Ok(index)
    }

    /// Remove a section; later sections shift down by one.
    pub fn remove_section(&mut self, section: usize) -> Option<Section> {
        (section < self.sections.len()).then(|| self.sections.remove(section))
    }

    pub fn set_section_hidden(&mut self, section: usize, hidden: bool) {
        if let Some(s) = self.sections.get_mut(section) {
            s.hidden = hidden;
        }
    }

    pub fn set_row_hidden(&mut self, section: usize, row: usize, hidden: bool) {
        if let Some(s) = self.sections.get_mut(section) {
            s.set_row_hidden(row, hidden);
        }
    }

    /// Store selection values, ignoring sections that no longer exist.
    pub fn apply_selection(&mut self, changes: &[SelectionChange]) {
        for change in changes {
            if let Some(s) = self.sections.get_mut(change.section) {
                s.selected = change.selected;
            }
        }
    }

    /// Visible when not hidden and at least one of its rows is visible.
    pub fn is_section_visible(&self, section: usize) -> bool {
        self.sections
            .get(section)
            .is_some_and(|s| !s.hidden && s.has_visible_row())
    }

    pub fn is_row_visible(&self, section: usize, row: usize) -> bool {
        self.is_section_visible(section) && self.row(section, row).is_some_and(|r| !r.hidden)
    }

    /// Indices of visible sections in document order.
    pub fn visible_sections(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.sections.len()).filter(move |&s| self.is_section_visible(s))
    }

    pub fn has_visible_rows(&self) -> bool {
        self.visible_sections().next().is_some()
    }

    /// Every visible body cell of `column`, in document order.
    pub fn visible_cells(&self, column: usize) -> Vec<FocusTarget> {
        if column >= self.schema.len() {
            return Vec::new();
        }
        self.visible_sections()
            .flat_map(|section| {
                self.sections[section]
                    .rows
                    .iter()
                    .enumerate()
                    .filter(|(_, r)| !r.hidden)
                    .map(move |(row, _)| FocusTarget::Cell {
                        section,
                        row,
                        column,
                    })
            })
            .collect()
    }

    /// State of the head selection checkbox: every visible section is selected.
    pub fn head_selected(&self) -> bool {
        let mut visible = self.visible_sections().peekable();
        visible.peek().is_some() && visible.all(|s| self.sections[s].selected)
    }

    /// Whether `target` addresses an element that exists right now.
    pub fn contains(&self, target: &FocusTarget) -> bool {
        match *target {
            FocusTarget::Head { column } => column < self.schema.len(),
            FocusTarget::Cell {
                section,
                row,
                column,
            } => self.cell(section, row, column).is_some(),
            FocusTarget::SubItem {
                section,
                row,
                column,
                item,
            } => self
                .cell(section, row, column)
                .is_some_and(|c| item < c.sub_items),
        }
    }
}

fn check_section(schema: &ColumnSchema, index: usize, section: &Section) -> Result<(), GridError> {
    if section.rows.is_empty() {
        return Err(GridError::EmptySection(index));
    }
    for (row, r) in section.rows.iter().enumerate() {
        if r.cells.len() != schema.len() {
            return Err(GridError::CellCount {
                section: index,
                row,
                expected: schema.len(),
                found: r.cells.len(),
            });
        }
        for (column, cell) in r.cells.iter().enumerate() {
            if cell.sub_items > 0 && !schema.is_drillable(column) {
                return Err(GridError::SubItemsOutsideDrillable {
                    section: index,
                    row,
                    column,
                });
            }
        }
    }
    Ok(())
}
