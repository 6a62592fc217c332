//! Google Sheets data source (Sheets API v4, `values.get`).
//!
//! Credentials are supplied by the caller as an API key or an OAuth bearer
//! token; obtaining them (service accounts, OAuth flows) happens elsewhere.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{DataError, Result};
use crate::range::SheetLayout;
use crate::sheet_id::SheetId;
use crate::sources::{header_from_rows, RowSource, SourceProvider};

/// Default Sheets API endpoint
pub const DEFAULT_SHEETS_URL: &str = "https://sheets.googleapis.com/";

/// How requests authenticate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SheetsAuth {
    /// No credentials (only works for publicly shared sheets behind a proxy)
    #[default]
    Anonymous,
    /// `?key=` query parameter
    ApiKey(String),
    /// `Authorization: Bearer` header
    BearerToken(String),
}

/// Connection settings for the Sheets API
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    /// Base URL of the API
    pub base_url: String,
    /// Credentials
    pub auth: SheetsAuth,
    /// Request timeout
    pub timeout: Duration,
    /// Header location and column bound
    pub layout: SheetLayout,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SHEETS_URL.to_string(),
            auth: SheetsAuth::Anonymous,
            timeout: Duration::from_secs(30),
            layout: SheetLayout::default(),
        }
    }
}

/// `values.get` response body
#[derive(Debug, Deserialize)]
struct ValueRange {
    /// Absent when the range is empty
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Provider holding the shared HTTP client
#[derive(Debug, Clone)]
pub struct GoogleSheetsProvider {
    client: Client,
    config: SheetsConfig,
}

impl GoogleSheetsProvider {
    /// Build the provider and its HTTP client
    pub fn new(config: SheetsConfig) -> Result<Self> {
        config.layout.validate()?;
        Url::parse(&config.base_url).map_err(|e| DataError::InvalidUrl(e.to_string()))?;

        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// The configured layout
    pub fn layout(&self) -> &SheetLayout {
        &self.config.layout
    }
}

impl SourceProvider for GoogleSheetsProvider {
    fn open(&self, sheet: &SheetId, tab: &str) -> Result<Box<dyn RowSource>> {
        Ok(Box::new(GoogleSheetsSource {
            client: self.client.clone(),
            config: self.config.clone(),
            sheet: sheet.clone(),
            tab: tab.to_string(),
        }))
    }
}

/// One tab of one remote spreadsheet
#[derive(Debug)]
pub struct GoogleSheetsSource {
    client: Client,
    config: SheetsConfig,
    sheet: SheetId,
    tab: String,
}

impl GoogleSheetsSource {
    /// Build the `values.get` URL for an A1 range
    pub fn values_url(base_url: &str, sheet: &SheetId, range: &str, auth: &SheetsAuth) -> Result<Url> {
        let mut url = Url::parse(base_url).map_err(|e| DataError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| DataError::InvalidUrl(format!("{} cannot be a base URL", base_url)))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", sheet.as_str(), "values", range]);

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("majorDimension", "ROWS");
            query.append_pair("valueRenderOption", "FORMATTED_VALUE");
            if let SheetsAuth::ApiKey(key) = auth {
                query.append_pair("key", key);
            }
        }

        Ok(url)
    }

    /// Fetch one A1 range as rows of strings
    fn read_range(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let url = Self::values_url(&self.config.base_url, &self.sheet, range, &self.config.auth)?;
        debug!(sheet = %self.sheet, range, "fetching values");

        let mut request = self.client.get(url);
        if let SheetsAuth::BearerToken(token) = &self.config.auth {
            request = request.bearer_auth(token);
        }
        let response = request.send()?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DataError::Remote {
                status: status.as_u16(),
                message: remote_error_message(&message),
            });
        }

        let body = response.text()?;
        let rows = parse_values(&body)?;
        debug!(sheet = %self.sheet, range, rows = rows.len(), "fetched values");
        Ok(rows)
    }
}

impl RowSource for GoogleSheetsSource {
    fn layout(&self) -> &SheetLayout {
        &self.config.layout
    }

    fn fetch_all(&self) -> Result<Vec<Vec<String>>> {
        self.read_range(&self.config.layout.full_range(&self.tab))
    }

    fn fetch_header(&self) -> Result<Vec<String>> {
        let rows = self.read_range(&self.config.layout.header_range(&self.tab))?;
        // A single-row read: re-anchor it so the shared check applies
        let layout = SheetLayout {
            header_row: 1,
            ..self.config.layout.clone()
        };
        header_from_rows(&rows, &layout).map_err(|_| DataError::EmptyHeader {
            row: self.config.layout.header_row,
        })
    }
}

/// Decode a `values.get` body into string rows
pub fn parse_values(body: &str) -> Result<Vec<Vec<String>>> {
    let range: ValueRange = serde_json::from_str(body)?;
    Ok(range
        .values
        .into_iter()
        .map(|row| row.into_iter().map(value_to_string).collect())
        .collect())
}

fn value_to_string(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Bool(b) => if b { "TRUE" } else { "FALSE" }.to_string(),
        other => other.to_string(),
    }
}

/// Pull `error.message` out of a Google error body, falling back to the raw text
fn remote_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.pointer("/error/message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> SheetId {
        SheetId::from_link("1AbCdEf").unwrap()
    }

    #[test]
    fn test_values_url_encodes_range() {
        let url = GoogleSheetsSource::values_url(
            DEFAULT_SHEETS_URL,
            &sheet(),
            "'Escolas 2024'!A1:ZZ",
            &SheetsAuth::Anonymous,
        )
        .unwrap();
        let s = url.as_str();
        assert!(s.starts_with("https://sheets.googleapis.com/v4/spreadsheets/1AbCdEf/values/"));
        assert!(s.contains("Escolas%202024"));
        assert!(s.contains("majorDimension=ROWS"));
        assert!(!s.contains("key="));
    }

    #[test]
    fn test_values_url_with_api_key() {
        let url = GoogleSheetsSource::values_url(
            DEFAULT_SHEETS_URL,
            &sheet(),
            "'Dados'!A4:ZZ4",
            &SheetsAuth::ApiKey("k123".to_string()),
        )
        .unwrap();
        assert!(url.as_str().ends_with("key=k123"));
    }

    #[test]
    fn test_values_url_custom_base_with_path() {
        let url = GoogleSheetsSource::values_url(
            "http://localhost:8080/proxy/",
            &sheet(),
            "A1:B2",
            &SheetsAuth::Anonymous,
        )
        .unwrap();
        assert!(url
            .as_str()
            .starts_with("http://localhost:8080/proxy/v4/spreadsheets/1AbCdEf/values/A1:B2"));
    }

    #[test]
    fn test_parse_values_mixed_cells() {
        let body = r#"{"range":"Dados!A1:D3","majorDimension":"ROWS",
            "values":[["Nome","","Escola"],[],["Ana",3,true,null]]}"#;
        let rows = parse_values(body).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["Nome", "", "Escola"]);
        assert!(rows[1].is_empty());
        assert_eq!(rows[2], vec!["Ana", "3", "TRUE", ""]);
    }

    #[test]
    fn test_parse_values_empty_range() {
        let rows = parse_values(r#"{"range":"Dados!A4:ZZ4","majorDimension":"ROWS"}"#).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_parse_values_rejects_garbage() {
        assert!(matches!(parse_values("<html>"), Err(DataError::Payload(_))));
    }

    #[test]
    fn test_remote_error_message() {
        let body = r#"{"error":{"code":403,"message":"The caller does not have permission","status":"PERMISSION_DENIED"}}"#;
        assert_eq!(
            remote_error_message(body),
            "The caller does not have permission"
        );
        assert_eq!(remote_error_message(" Not Found "), "Not Found");
    }

    #[test]
    fn test_provider_rejects_bad_base_url() {
        let config = SheetsConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            GoogleSheetsProvider::new(config),
            Err(DataError::InvalidUrl(_))
        ));
    }
}
