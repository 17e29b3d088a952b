//! Two-column template table.
//!
//! Templates are kept the way a spreadsheet tab holds them: one row per
//! template, column A the name and column B the body. Rows are exchanged in
//! the spreadsheet `values` shape, an array of rows where each row is an
//! array of cell strings:
//!
//! ```json
//! [["Name", "Template"], ["welcome", "Hello {{name}}"]]
//! ```

use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::store::StoreError;
use crate::template::{SaveOutcome, Template};

/// Lowercased first-cell values that mark a header row
const HEADER_NAMES: [&str; 3] = ["name", "template name", "template"];

/// Header written by [`TemplateTable::to_rows`]
const EXPORT_HEADER: [&str; 2] = ["name", "template"];

/// Rows in the spreadsheet `values` shape
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SheetValues {
    pub values: Vec<Vec<String>>,
}

/// A rows file is either `{"values": [...]}` or the bare array
#[derive(Deserialize)]
#[serde(untagged)]
enum RowsFile {
    Wrapped(SheetValues),
    Bare(Vec<Vec<String>>),
}

/// Ordered name/body rows with upsert-by-name semantics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateTable {
    rows: Vec<Template>,
}

fn is_header(row: &[String]) -> bool {
    row.first()
        .map(|cell| HEADER_NAMES.contains(&cell.trim().to_lowercase().as_str()))
        .unwrap_or(false)
}

impl TemplateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from spreadsheet rows.
    ///
    /// A leading header row is skipped, rows with fewer than two cells or an
    /// empty name are ignored, and a repeated name keeps its first position
    /// with the last body.
    pub fn from_rows(values: Vec<Vec<String>>) -> Self {
        let mut table = Self::new();
        let skip = values.first().map(|row| is_header(row)).unwrap_or(false) as usize;

        for row in values.into_iter().skip(skip) {
            let mut cells = row.into_iter();
            let (Some(name), Some(body)) = (cells.next(), cells.next()) else {
                continue;
            };

            let name = name.trim();
            if name.is_empty() {
                continue;
            }

            table.upsert(Template::new(name, body));
        }

        table
    }

    /// Read a JSON file holding a `values` array, bare or wrapped.
    pub fn load_rows_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let rows: RowsFile = serde_json::from_str(&content).map_err(|e| {
            StoreError::InvalidSeed(format!("{}: {}", path.display(), e))
        })?;

        let values = match rows {
            RowsFile::Wrapped(sheet) => sheet.values,
            RowsFile::Bare(values) => values,
        };
        Ok(Self::from_rows(values))
    }

    /// Export as spreadsheet rows with a header row.
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        std::iter::once(EXPORT_HEADER.iter().map(|s| s.to_string()).collect())
            .chain(
                self.rows
                    .iter()
                    .map(|t| vec![t.name.clone(), t.body.clone()]),
            )
            .collect()
    }

    /// Overwrite the body of an existing row, or append a new one.
    pub fn upsert(&mut self, mut template: Template) -> SaveOutcome {
        template.updated_at.get_or_insert_with(Utc::now);

        match self.rows.iter_mut().find(|row| row.name == template.name) {
            Some(row) => {
                row.body = template.body;
                row.updated_at = template.updated_at;
                SaveOutcome::Updated
            }
            None => {
                self.rows.push(template);
                SaveOutcome::Created
            }
        }
    }

    /// Remove the row with `name`, returning whether it existed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.rows.len();
        self.rows.retain(|row| row.name != name);
        self.rows.len() != before
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.rows.iter().find(|row| row.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Templates in row order
    pub fn templates(&self) -> &[Template] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<Template> for TemplateTable {
    fn from_iter<I: IntoIterator<Item = Template>>(iter: I) -> Self {
        let mut table = Self::new();
        for template in iter {
            table.upsert(template);
        }
        table
    }
}

impl IntoIterator for TemplateTable {
    type Item = Template;
    type IntoIter = std::vec::IntoIter<Template>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
