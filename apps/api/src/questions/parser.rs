//! Spreadsheet ingestion: turns an uploaded `.xlsx` or `.csv` file into a
//! `QuestionBank`, one role per worksheet.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use thiserror::Error;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::questions::models::{Difficulty, Question, QuestionBank, RoleQuestions};

const QUESTION_HEADER: &str = "question";
const EXPECTED_ANSWER_HEADER: &str = "expected answer";
const DIFFICULTY_HEADER: &str = "difficulty";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Upload failures. The `Display` text is shown to the user verbatim.
#[derive(Debug, Error, PartialEq)]
pub enum UploadError {
    #[error("No file uploaded.")]
    Missing,

    #[error("Invalid file type. Please upload a .xlsx or .csv file.")]
    InvalidType,

    #[error("The uploaded file contains no data.")]
    NoData,

    #[error("Sheet \"{sheet}\" is missing the \"Question\" column.")]
    MissingQuestionColumn { sheet: String },

    #[error("Failed to parse the file. Please ensure it is a valid file and not corrupted.")]
    Corrupt { detail: String },
}

impl From<UploadError> for AppError {
    fn from(e: UploadError) -> Self {
        AppError::Validation(e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Xlsx,
    Csv,
}

/// One decoded spreadsheet cell. Only `Text` cells can hold a question.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Cell {
    Empty,
    Text(String),
    Value(String),
}

impl Cell {
    fn text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) if !s.trim().is_empty() => Some(s.trim()),
            _ => None,
        }
    }

    fn display(&self) -> Option<&str> {
        match self {
            Cell::Text(s) | Cell::Value(s) if !s.trim().is_empty() => Some(s.trim()),
            _ => None,
        }
    }
}

type Sheet = (String, Vec<Vec<Cell>>);

/// Parses an uploaded file into a question bank.
///
/// The company name is the file name without its extension. CSV files hold a
/// single role named after the company; workbooks hold one role per sheet.
pub fn parse_upload(file_name: &str, bytes: &[u8]) -> Result<QuestionBank, UploadError> {
    if bytes.is_empty() {
        return Err(UploadError::Missing);
    }

    let (company, format) = split_file_name(file_name)?;

    let sheets = match format {
        UploadFormat::Xlsx => decode_xlsx(bytes)?,
        UploadFormat::Csv => vec![(company.clone(), decode_csv(bytes)?)],
    };

    if sheets.is_empty() {
        return Err(UploadError::NoData);
    }

    let mut roles = Vec::with_capacity(sheets.len());
    for (sheet, rows) in sheets {
        let questions = rows_to_questions(&sheet, rows)?;
        roles.push(RoleQuestions {
            name: sheet,
            questions,
        });
    }

    let bank = QuestionBank { company, roles };
    info!(
        company = %bank.company,
        roles = bank.roles.len(),
        questions = bank.question_count(),
        "Parsed question upload"
    );
    Ok(bank)
}

/// Splits `Acme.XLSX` into (`Acme`, Xlsx). Any leading path is dropped.
pub fn split_file_name(file_name: &str) -> Result<(String, UploadFormat), UploadError> {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
        .trim();

    if let Some(stem) = strip_suffix_ignore_case(base, ".xlsx") {
        Ok((stem.to_string(), UploadFormat::Xlsx))
    } else if let Some(stem) = strip_suffix_ignore_case(base, ".csv") {
        Ok((stem.to_string(), UploadFormat::Csv))
    } else {
        Err(UploadError::InvalidType)
    }
}

fn strip_suffix_ignore_case<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let split = s.len().checked_sub(suffix.len())?;
    if !s.is_char_boundary(split) {
        return None;
    }
    let (stem, tail) = s.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(stem)
}

fn corrupt(detail: impl std::fmt::Display) -> UploadError {
    let detail = detail.to_string();
    warn!("File parsing error: {detail}");
    UploadError::Corrupt { detail }
}

fn decode_xlsx(bytes: &[u8]) -> Result<Vec<Sheet>, UploadError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).map_err(corrupt)?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name).map_err(corrupt)?;
        let rows = range
            .rows()
            .map(|row| row.iter().map(cell_from_data).collect())
            .collect();
        sheets.push((name, rows));
    }
    Ok(sheets)
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        other => Cell::Value(other.to_string()),
    }
}

fn decode_csv(bytes: &[u8]) -> Result<Vec<Vec<Cell>>, UploadError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(corrupt)?;
        rows.push(record.iter().map(cell_from_csv).collect());
    }
    Ok(rows)
}

/// CSV has no cell types, so numbers and booleans are recognized the way a
/// spreadsheet application would type them on import.
fn cell_from_csv(field: &str) -> Cell {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Cell::Empty;
    }
    let is_number = trimmed.parse::<f64>().is_ok_and(f64::is_finite);
    let is_bool = trimmed.eq_ignore_ascii_case("true") || trimmed.eq_ignore_ascii_case("false");
    if is_number || is_bool {
        Cell::Value(trimmed.to_string())
    } else {
        Cell::Text(field.to_string())
    }
}

/// Converts a sheet's rows to questions.
///
/// The first non-blank row is the header. A sheet without data rows is an
/// empty role; a sheet with data rows but no `Question` header is rejected.
/// Rows whose question cell is blank or not text are skipped.
pub(crate) fn rows_to_questions(
    sheet: &str,
    rows: Vec<Vec<Cell>>,
) -> Result<Vec<Question>, UploadError> {
    let mut rows = rows.into_iter().filter(|row| !is_blank(row));

    let header: Vec<String> = match rows.next() {
        Some(row) => row
            .iter()
            .map(|c| c.display().unwrap_or_default().to_lowercase())
            .collect(),
        None => return Ok(Vec::new()),
    };

    let data: Vec<Vec<Cell>> = rows.collect();
    if data.is_empty() {
        return Ok(Vec::new());
    }

    let column = |name: &str| header.iter().position(|h| h == name);
    let question_col = column(QUESTION_HEADER).ok_or_else(|| UploadError::MissingQuestionColumn {
        sheet: sheet.to_string(),
    })?;
    let expected_col = column(EXPECTED_ANSWER_HEADER);
    let difficulty_col = column(DIFFICULTY_HEADER);

    let cell_at = |row: &[Cell], col: Option<usize>| -> Option<String> {
        col.and_then(|c| row.get(c))
            .and_then(Cell::display)
            .map(str::to_string)
    };

    Ok(data
        .iter()
        .filter_map(|row| {
            let question = row.get(question_col).and_then(Cell::text)?;
            Some(Question {
                question: question.to_string(),
                expected_answer: cell_at(row.as_slice(), expected_col),
                difficulty: cell_at(row.as_slice(), difficulty_col)
                    .and_then(|d| Difficulty::parse(&d)),
            })
        })
        .collect())
}

fn is_blank(row: &[Cell]) -> bool {
    row.iter().all(|c| c.display().is_none())
}
