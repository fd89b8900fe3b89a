//! Google Sheets client
//!
//! Opens a spreadsheet by title through the Drive API, resolves tabs by name
//! and appends rows through the Sheets API. Each append attempt fetches one
//! service-account token and uses it for every call of that attempt.

use reqwest::{Response, Url};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::{Config, SecretString};
use crate::error::{RemoteFault, SetupError};
use crate::infrastructure::{ServiceAccountAuth, ServiceAccountKey};
use crate::models::{WorksheetHandle, WorksheetNames, WorksheetPair};

const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive.readonly",
];

/// Spreadsheet operations the appender needs
///
/// One `Session` is opened per append attempt and shared by the calls that
/// follow it.
#[allow(async_fn_in_trait)]
pub trait SpreadsheetBackend {
    type Session;

    /// Authenticate once for the calls that follow
    async fn session(&self) -> Result<Self::Session, RemoteFault>;

    /// Open `spreadsheet` by title and resolve both tabs
    async fn open_worksheets(
        &self,
        session: &Self::Session,
        spreadsheet: &str,
        names: &WorksheetNames,
    ) -> Result<WorksheetPair, RemoteFault>;

    /// Append `row` as a new row at the end of `worksheet`
    async fn append_row(
        &self,
        session: &Self::Session,
        worksheet: &WorksheetHandle,
        row: &[String],
    ) -> Result<(), RemoteFault>;
}

#[derive(Debug, Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

/// Google Sheets client
pub struct SheetsClient {
    http: reqwest::Client,
    auth: ServiceAccountAuth,
}

impl SheetsClient {
    /// Load the key file and build the HTTP client
    pub fn new(config: &Config) -> Result<Self, SetupError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|source| SetupError::HttpClient {
                service: "sheets",
                timeout: config.request_timeout(),
                source,
            })?;

        let key = ServiceAccountKey::from_file(&config.service_account_key_file)?;
        let auth =
            ServiceAccountAuth::new(key, &config.service_account_key_file, SCOPES, http.clone())?;

        Ok(Self { http, auth })
    }

    pub fn client_email(&self) -> &str {
        self.auth.client_email()
    }

    async fn find_spreadsheet_id(&self, token: &str, title: &str) -> Result<String, RemoteFault> {
        let query = drive_title_query(title);
        let response = self
            .http
            .get(DRIVE_FILES_URL)
            .bearer_auth(token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id)"),
                ("pageSize", "1"),
                ("includeItemsFromAllDrives", "true"),
                ("supportsAllDrives", "true"),
            ])
            .send()
            .await
            .map_err(|e| RemoteFault::from_reqwest(&e))?;

        let list: DriveFileList = read_json(response, "drive files.list").await?;
        list.files
            .into_iter()
            .next()
            .map(|f| f.id)
            .ok_or_else(|| RemoteFault::http(404, "spreadsheet not found"))
    }

    async fn sheet_properties(
        &self,
        token: &str,
        spreadsheet_id: &str,
    ) -> Result<Vec<SheetProperties>, RemoteFault> {
        let url = sheets_url(&[spreadsheet_id])?;
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .query(&[("fields", "sheets.properties(sheetId,title)")])
            .send()
            .await
            .map_err(|e| RemoteFault::from_reqwest(&e))?;

        let meta: SpreadsheetMeta = read_json(response, "spreadsheets.get").await?;
        Ok(meta.sheets.into_iter().map(|s| s.properties).collect())
    }
}

impl SpreadsheetBackend for SheetsClient {
    /// Bearer token for the Drive and Sheets calls of one attempt
    type Session = SecretString;

    async fn session(&self) -> Result<SecretString, RemoteFault> {
        self.auth.access_token().await
    }

    async fn open_worksheets(
        &self,
        token: &SecretString,
        spreadsheet: &str,
        names: &WorksheetNames,
    ) -> Result<WorksheetPair, RemoteFault> {
        let spreadsheet_id = self.find_spreadsheet_id(token.expose(), spreadsheet).await?;
        debug!("Spreadsheet '{}' resolved", spreadsheet);

        let sheets = self.sheet_properties(token.expose(), &spreadsheet_id).await?;
        let select = |title: &str| -> Result<WorksheetHandle, RemoteFault> {
            sheets
                .iter()
                .find(|p| p.title == title)
                .map(|p| WorksheetHandle {
                    spreadsheet_id: spreadsheet_id.clone(),
                    sheet_id: p.sheet_id,
                    title: p.title.clone(),
                })
                .ok_or_else(|| RemoteFault::http(404, "worksheet not found"))
        };

        Ok(WorksheetPair {
            process: select(&names.process)?,
            done: select(&names.done)?,
        })
    }

    async fn append_row(
        &self,
        token: &SecretString,
        worksheet: &WorksheetHandle,
        row: &[String],
    ) -> Result<(), RemoteFault> {
        let range = format!("{}:append", worksheet.append_range());
        let url = sheets_url(&[worksheet.spreadsheet_id.as_str(), "values", range.as_str()])?;

        let response = self
            .http
            .post(url)
            .bearer_auth(token.expose())
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "values": [row] }))
            .send()
            .await
            .map_err(|e| RemoteFault::from_reqwest(&e))?;

        let _: serde_json::Value = read_json(response, "values.append").await?;
        debug!("Row appended to {}", worksheet);
        Ok(())
    }
}

/// Drive search expression for a spreadsheet with exactly this title
fn drive_title_query(title: &str) -> String {
    let escaped = title.replace('\\', "\\\\").replace('\'', "\\'");
    format!("name = '{escaped}' and mimeType = '{SPREADSHEET_MIME}' and trashed = false")
}

/// Sheets API URL with each segment percent-encoded
fn sheets_url(segments: &[&str]) -> Result<Url, RemoteFault> {
    let mut url = Url::parse(SHEETS_BASE_URL)
        .map_err(|e| RemoteFault::from_description(format!("invalid base url: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| RemoteFault::from_description("base url cannot take segments"))?
        .extend(segments);
    Ok(url)
}

/// Turn a non-success status into a fault, otherwise decode the body
async fn read_json<T: serde::de::DeserializeOwned>(
    response: Response,
    operation: &str,
) -> Result<T, RemoteFault> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(RemoteFault::http(
            status.as_u16(),
            format!("{operation} {status}: {body}"),
        ));
    }
    response
        .json()
        .await
        .map_err(|e| RemoteFault::from_reqwest(&e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drive_query_escapes_quotes() {
        assert_eq!(
            drive_title_query("Image Prompt"),
            "name = 'Image Prompt' and mimeType = 'application/vnd.google-apps.spreadsheet' and trashed = false"
        );
        assert!(drive_title_query("Bob's Prompts").starts_with("name = 'Bob\\'s Prompts'"));
    }

    #[test]
    fn test_sheets_url_encodes_range_segment() {
        let url = sheets_url(&["abc123", "values", "'Process'!A1:append"]).unwrap();
        assert!(url
            .as_str()
            .starts_with("https://sheets.googleapis.com/v4/spreadsheets/abc123/values/"));
        assert!(url.as_str().ends_with(":append"));

        let url = sheets_url(&["abc123", "values", "'My Tab'!A1:append"]).unwrap();
        assert!(!url.as_str().contains(' '));
    }

    #[test]
    fn test_metadata_shape() {
        let meta: SpreadsheetMeta = serde_json::from_str(
            r#"{"sheets":[{"properties":{"sheetId":0,"title":"Process"}},{"properties":{"sheetId":7,"title":"Done"}}]}"#,
        )
        .unwrap();
        assert_eq!(meta.sheets.len(), 2);
        assert_eq!(meta.sheets[1].properties.sheet_id, 7);
        assert_eq!(meta.sheets[1].properties.title, "Done");
    }
}
