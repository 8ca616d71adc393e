/*
 * Client for the remote conversion endpoint. A conversion is one multipart
 * POST to `{server_url}/convert` carrying the CSV file, the account id and,
 * when present, the comma-separated tag ids. A successful response body is the
 * converted file; its name comes from the `Content-Disposition` header. A
 * failed response carries a JSON body with a `message` field.
 *
 * The `ConverterOperations` trait lets the form logic be tested without a
 * server.
 */
use regex::Regex;
use reqwest::blocking::Client;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::header::CONTENT_DISPOSITION;
use serde::Deserialize;
use std::io;
use std::sync::LazyLock;
use std::time::Duration;

pub const CONVERT_PATH: &str = "/convert";
pub const DEFAULT_OUTPUT_FILENAME: &str = "ghostfolio-import.json";
pub const FALLBACK_ERROR_MESSAGE: &str = "Conversion failed";

static FILENAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"filename="(.+)""#).expect("filename pattern is a valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertRequest {
    pub file_name: String,
    pub file_bytes: Vec<u8>,
    pub account_id: String,
    pub tag_ids: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
pub enum ConvertError {
    // The server answered with a non-success status.
    Server { status: u16, message: String },
    Transport(reqwest::Error),
    Io(io::Error),
}

impl From<reqwest::Error> for ConvertError {
    fn from(err: reqwest::Error) -> Self {
        ConvertError::Transport(err)
    }
}

impl From<io::Error> for ConvertError {
    fn from(err: io::Error) -> Self {
        ConvertError::Io(err)
    }
}

impl std::fmt::Display for ConvertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConvertError::Server { message, .. } => write!(f, "{message}"),
            ConvertError::Transport(e) => write!(f, "Could not reach the conversion server: {e}"),
            ConvertError::Io(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConvertError::Server { .. } => None,
            ConvertError::Transport(e) => Some(e),
            ConvertError::Io(e) => Some(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;

pub trait ConverterOperations: Send + Sync {
    fn convert(&self, request: &ConvertRequest) -> Result<ConvertedFile>;
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

pub fn convert_endpoint(server_url: &str) -> String {
    format!("{}{CONVERT_PATH}", server_url.trim_end_matches('/'))
}

// Extracts the quoted `filename="..."` value from a Content-Disposition header.
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    FILENAME_PATTERN
        .captures(header)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

// The server message from a JSON error body, or the generic fallback.
pub fn error_message_from_body(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string())
}

pub struct CoreConverterClient {
    endpoint: String,
    client: Client,
}

impl CoreConverterClient {
    pub fn new(server_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(CoreConverterClient {
            endpoint: convert_endpoint(server_url),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ConverterOperations for CoreConverterClient {
    fn convert(&self, request: &ConvertRequest) -> Result<ConvertedFile> {
        log::debug!(
            "CoreConverterClient: Posting '{}' ({} bytes) to {}.",
            request.file_name,
            request.file_bytes.len(),
            self.endpoint
        );
        let file_part = Part::bytes(request.file_bytes.clone())
            .file_name(request.file_name.clone())
            .mime_str("text/csv")?;
        let mut form = Form::new()
            .part("file", file_part)
            .text("accountId", request.account_id.clone());
        if let Some(tag_ids) = &request.tag_ids {
            form = form.text("tagIds", tag_ids.clone());
        }

        let response = self.client.post(&self.endpoint).multipart(form).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let message = error_message_from_body(&body);
            log::warn!("CoreConverterClient: Server returned {status}: {message}");
            return Err(ConvertError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(filename_from_content_disposition)
            .unwrap_or_else(|| DEFAULT_OUTPUT_FILENAME.to_string());
        let bytes = response.bytes()?.to_vec();
        log::debug!(
            "CoreConverterClient: Received '{filename}' ({} bytes).",
            bytes.len()
        );
        Ok(ConvertedFile { filename, bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_endpoint_joins_without_double_slash() {
        assert_eq!(
            convert_endpoint("http://localhost:3000/"),
            "http://localhost:3000/convert"
        );
        assert_eq!(
            convert_endpoint("https://example.org/app"),
            "https://example.org/app/convert"
        );
    }

    #[test]
    fn test_filename_from_content_disposition() {
        assert_eq!(
            filename_from_content_disposition(r#"attachment; filename="ghostfolio-2026.json""#),
            Some("ghostfolio-2026.json".to_string())
        );
        assert_eq!(filename_from_content_disposition("attachment"), None);
        assert_eq!(filename_from_content_disposition("attachment; filename=bare.json"), None);
    }

    #[test]
    fn test_error_message_from_body() {
        assert_eq!(error_message_from_body(r#"{"message":"disk full"}"#), "disk full");
        assert_eq!(error_message_from_body(r#"{"message":""}"#), FALLBACK_ERROR_MESSAGE);
        assert_eq!(error_message_from_body(r#"{"error":"x"}"#), FALLBACK_ERROR_MESSAGE);
        assert_eq!(error_message_from_body("<html>oops</html>"), FALLBACK_ERROR_MESSAGE);
    }

    #[test]
    fn test_server_error_displays_message_only() {
        let error = ConvertError::Server {
            status: 500,
            message: "disk full".to_string(),
        };
        assert_eq!(error.to_string(), "disk full");
    }

    #[test]
    fn test_client_builds_with_and_without_timeout() {
        let client = CoreConverterClient::new("http://127.0.0.1:1", None).unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:1/convert");
        assert!(CoreConverterClient::new("http://127.0.0.1:1", Some(Duration::from_secs(5))).is_ok());
    }

    #[test]
    fn test_unreachable_server_is_a_transport_error() {
        let client =
            CoreConverterClient::new("http://127.0.0.1:1", Some(Duration::from_secs(2))).unwrap();
        let request = ConvertRequest {
            file_name: "a.csv".to_string(),
            file_bytes: b"Date,Amount\n".to_vec(),
            account_id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
            tag_ids: None,
        };

        assert!(matches!(client.convert(&request), Err(ConvertError::Transport(_))));
    }
}
