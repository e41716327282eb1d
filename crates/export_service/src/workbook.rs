use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use serde_json::{Map, Value};

pub type Row = Map<String, Value>;

/// Longest text a single cell can hold
pub const MAX_CELL_CHARS: usize = 32_767;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to write workbook: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("sheet '{sheet}' has too many {what} for a worksheet")]
    TooLarge { sheet: String, what: &'static str },
}

/// One worksheet's worth of rows.
///
/// Columns are the union of the rows' keys in first-seen order; row 0 of the
/// rendered sheet is the header. A table with no rows renders as an empty sheet.
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn from_rows(name: &str, rows: Vec<Row>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        Self {
            name: name.to_string(),
            columns,
            rows,
        }
    }

    fn write_to(&self, worksheet: &mut Worksheet) -> Result<(), RenderError> {
        worksheet.set_name(&self.name)?;
        if self.rows.is_empty() {
            return Ok(());
        }

        for (col, name) in self.columns.iter().enumerate() {
            worksheet.write_string(0, self.col_index(col)?, name)?;
        }

        for (i, row) in self.rows.iter().enumerate() {
            let row_index = u32::try_from(i + 1).map_err(|_| self.too_large("rows"))?;
            for (col, name) in self.columns.iter().enumerate() {
                if let Some(value) = row.get(name) {
                    write_cell(worksheet, row_index, self.col_index(col)?, value)?;
                }
            }
        }
        Ok(())
    }

    fn col_index(&self, col: usize) -> Result<u16, RenderError> {
        u16::try_from(col).map_err(|_| self.too_large("columns"))
    }

    fn too_large(&self, what: &'static str) -> RenderError {
        RenderError::TooLarge {
            sheet: self.name.clone(),
            what,
        }
    }
}

// Excel refuses longer cells; cut at a char boundary
fn cell_text(text: &str) -> String {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &Value,
) -> Result<(), XlsxError> {
    match value {
        Value::Null => {}
        Value::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        Value::Number(n) => match n.as_f64() {
            Some(f) => {
                worksheet.write_number(row, col, f)?;
            }
            None => {
                worksheet.write_string(row, col, n.to_string())?;
            }
        },
        Value::String(s) => {
            worksheet.write_string(row, col, cell_text(s))?;
        }
        Value::Array(_) | Value::Object(_) => {
            worksheet.write_string(row, col, cell_text(&value.to_string()))?;
        }
    }
    Ok(())
}

/// Render tables as worksheets, in order, and return the `.xlsx` bytes
pub fn render(tables: &[Table]) -> Result<Vec<u8>, RenderError> {
    let mut workbook = Workbook::new();
    for table in tables {
        let worksheet = workbook.add_worksheet();
        table.write_to(worksheet)?;
    }
    Ok(workbook.save_to_buffer()?)
}
