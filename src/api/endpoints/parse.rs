//! Image parsing endpoints.
//!
//! - `POST /api/parse`: `{image: <base64>}` JSON body
//! - `POST /api/parse/upload`: multipart body with a `file` field
//!
//! Both forward the image bytes to the parser collaborator and relay its
//! JSON unchanged.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use base64::Engine;
use serde::Deserialize;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::upstream::parser::PlanImage;

const DEFAULT_FILE_NAME: &str = "plan.png";

#[derive(Deserialize)]
pub struct ParseRequest {
    pub image: String,
    #[serde(default)]
    pub file_name: Option<String>,
}

/// `POST /api/parse`: parse a base64-encoded plan image.
pub async fn from_base64(
    State(ctx): State<ApiContext>,
    payload: Result<Json<ParseRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = payload?;
    let bytes = decode_image(&req.image)?;
    let image = PlanImage {
        file_name: req.file_name.unwrap_or_else(|| DEFAULT_FILE_NAME.to_string()),
        bytes,
    };
    Ok(Json(ctx.parser.parse(image).await?))
}

/// `POST /api/parse/upload`: parse a multipart-uploaded plan image.
pub async fn upload(
    State(ctx): State<ApiContext>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());
        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Err(ApiError::BadRequest("Uploaded file is empty".into()));
        }
        let image = PlanImage {
            file_name,
            bytes: bytes.to_vec(),
        };
        return Ok(Json(ctx.parser.parse(image).await?));
    }
    Err(ApiError::BadRequest("Missing multipart field `file`".into()))
}

/// Decode a base64 image, tolerating a `data:<mime>;base64,` prefix and
/// embedded whitespace.
fn decode_image(encoded: &str) -> Result<Vec<u8>, ApiError> {
    let payload = match encoded.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => encoded,
    };
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return Err(ApiError::BadRequest("Field `image` is empty".into()));
    }
    base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| ApiError::BadRequest(format!("Field `image` is not valid base64: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_plain_base64() {
        assert_eq!(decode_image("aGVsbG8=").unwrap(), b"hello");
    }

    #[test]
    fn decodes_data_url() {
        assert_eq!(decode_image("data:image/png;base64,aGVs\nbG8=").unwrap(), b"hello");
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(decode_image("not base64!!"), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(decode_image("  "), Err(ApiError::BadRequest(_))));
    }
}
