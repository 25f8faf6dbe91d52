use crate::error::ApiError;
use axum::extract::Multipart;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use storage::IncomingFile;

/// A multipart body split into its text fields and its file parts.
pub struct ParsedUpload {
    pub fields: Map<String, Value>,
    pub files: Vec<IncomingFile>,
}

/// Collects file parts from `file_field` and everything else as text fields.
///
/// Form values arrive as strings, so each text field is first tried as a
/// JSON literal; numbers, booleans, and arrays deserialize into the request
/// DTOs that way while free text falls back to a plain string.
pub async fn parse_upload(
    mut multipart: Multipart,
    file_field: &str,
) -> Result<ParsedUpload, ApiError> {
    let mut fields = Map::new();
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_owned();
        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);

        match file_name {
            Some(original_filename) if name == file_field => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {e}")))?;
                files.push(IncomingFile {
                    original_filename,
                    mime_type: content_type
                        .unwrap_or_else(|| "application/octet-stream".to_owned()),
                    bytes: bytes.to_vec(),
                });
            }
            _ => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read field: {e}")))?;
                fields.insert(name, coerce(text));
            }
        }
    }

    Ok(ParsedUpload { fields, files })
}

pub fn from_fields<T: DeserializeOwned>(fields: Map<String, Value>) -> Result<T, ApiError> {
    serde_json::from_value(Value::Object(fields))
        .map_err(|e| ApiError::BadRequest(format!("Invalid form fields: {e}")))
}

fn coerce(text: String) -> Value {
    match serde_json::from_str::<Value>(&text) {
        Ok(value) if !value.is_string() => value,
        _ => Value::String(text),
    }
}
