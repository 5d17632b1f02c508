use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use super::auth::ServiceAccountAuth;
use crate::store::StoreError;

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

/// Thin wrapper over the Sheets v4 REST endpoints the store needs
pub struct SheetsClient {
    http: reqwest::Client,
    base: Url,
    auth: ServiceAccountAuth,
}

impl SheetsClient {
    pub fn new(http: reqwest::Client, base: Url, auth: ServiceAccountAuth) -> Self {
        Self { http, base, auth }
    }

    /// Reads a range as displayed in the sheet
    pub async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>, StoreError> {
        self.read_range(spreadsheet_id, range, &[]).await
    }

    /// Reads a range without the sheet's locale formatting. Date-times come back as
    /// serial day numbers.
    pub async fn get_unformatted_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>, StoreError> {
        let options = [
            ("valueRenderOption", "UNFORMATTED_VALUE"),
            ("dateTimeRenderOption", "SERIAL_NUMBER"),
        ];
        self.read_range(spreadsheet_id, range, &options).await
    }

    /// Rows as strings; trailing empty cells are absent from each row
    #[instrument(skip(self, options))]
    async fn read_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
        options: &[(&str, &str)],
    ) -> Result<Vec<Vec<String>>, StoreError> {
        let url = endpoint(&self.base, &["spreadsheets", spreadsheet_id, "values", range])?;
        let response = self.send(self.http.get(url).query(options)).await?;
        let body: ValueRange = response.json().await?;

        debug!(row_count = body.values.len(), "Range read");
        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    #[instrument(skip(self, rows), fields(row_count = rows.len()))]
    pub async fn append_rows(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: Vec<Vec<Value>>,
    ) -> Result<(), StoreError> {
        let append = format!("{range}:append");
        let url = endpoint(&self.base, &["spreadsheets", spreadsheet_id, "values", &append])?;
        let request = self
            .http
            .post(url)
            .query(&[("valueInputOption", "USER_ENTERED"), ("insertDataOption", "INSERT_ROWS")])
            .json(&json!({ "values": rows }));

        self.send(request).await?;
        debug!("Rows appended");
        Ok(())
    }

    #[instrument(skip(self, rows))]
    pub async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: Vec<Vec<Value>>,
    ) -> Result<(), StoreError> {
        let url = endpoint(&self.base, &["spreadsheets", spreadsheet_id, "values", range])?;
        let request = self
            .http
            .put(url)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&json!({ "range": range, "values": rows }));

        self.send(request).await?;
        Ok(())
    }

    /// Worksheet titles in tab order
    #[instrument(skip(self))]
    pub async fn sheet_titles(&self, spreadsheet_id: &str) -> Result<Vec<String>, StoreError> {
        let url = endpoint(&self.base, &["spreadsheets", spreadsheet_id])?;
        let request = self.http.get(url).query(&[("fields", "sheets.properties.title")]);
        let meta: SpreadsheetMeta = self.send(request).await?.json().await?;

        Ok(meta.sheets.into_iter().map(|s| s.properties.title).collect())
    }

    #[instrument(skip(self))]
    pub async fn add_sheet(
        &self,
        spreadsheet_id: &str,
        title: &str,
        rows: u32,
        columns: u32,
    ) -> Result<(), StoreError> {
        let batch_update = format!("{spreadsheet_id}:batchUpdate");
        let url = endpoint(&self.base, &["spreadsheets", &batch_update])?;
        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": title,
                        "gridProperties": { "rowCount": rows, "columnCount": columns }
                    }
                }
            }]
        });

        self.send(self.http.post(url).json(&body)).await?;
        debug!("Worksheet added");
        Ok(())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let token = self.auth.access_token().await?;
        let response = request.bearer_auth(token).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        warn!(status = %status, "Sheets API request failed");
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Auth(message),
            _ => StoreError::Api {
                status: status.as_u16(),
                message,
            },
        })
    }
}

/// Appends percent-encoded path segments to the API base
pub fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, StoreError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| StoreError::Config(format!("api base '{base}' cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Quotes a worksheet title for use in an A1 range
pub fn a1_range(title: &str, cells: &str) -> String {
    format!("'{}'!{}", title.replace('\'', "''"), cells)
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
