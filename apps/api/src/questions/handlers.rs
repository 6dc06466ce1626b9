use axum::{extract::Multipart, http::StatusCode, Json};
use bytes::Bytes;
use tracing::warn;

use crate::errors::AppError;
use crate::questions::models::QuestionBank;
use crate::questions::parser::{parse_upload, UploadError};

/// Multipart field carrying the spreadsheet.
const FILE_FIELD: &str = "file";

/// An uploaded file: its client-side name and contents.
pub struct Upload {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Pulls the `file` field out of a multipart body.
pub async fn read_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(UploadError::Missing.into()),
            Err(e) => return Err(multipart_error(e)),
        };

        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(Upload { file_name, bytes });
    }
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge;
    }
    warn!("Rejected multipart upload: {e}");
    UploadError::Missing.into()
}

/// POST /api/v1/question-banks
///
/// Parses an upload without touching any session. Useful for previewing
/// which roles a file contains.
pub async fn handle_parse_upload(multipart: Multipart) -> Result<Json<QuestionBank>, AppError> {
    let upload = read_upload(multipart).await?;
    let bank = parse_upload(&upload.file_name, &upload.bytes)?;
    Ok(Json(bank))
}
