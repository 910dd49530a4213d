use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use super::a1;
use super::{RowLocator, SheetError, SheetGateway, SheetTable};
use crate::shared::config::SheetsConfig;

/// HTTP client for the Google Sheets API v4 (`spreadsheets.values`)
pub struct GoogleSheetsClient {
    client: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    access_token: String,
    header_ttl: Duration,
    header_cache: RwLock<HashMap<String, (Instant, Vec<String>)>>,
}

/// `ValueRange` resource
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    major_dimension: Option<String>,
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendResponse {
    updates: Option<UpdateValuesResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateValuesResponse {
    updated_range: Option<String>,
}

impl GoogleSheetsClient {
    pub fn from_config(config: &SheetsConfig) -> anyhow::Result<Self> {
        if config.spreadsheet_id.trim().is_empty() {
            return Err(anyhow::anyhow!(
                "sheets.spreadsheet_id is not set in config.toml"
            ));
        }
        let access_token = config.resolved_access_token();
        if access_token.trim().is_empty() {
            tracing::warn!(
                "No Sheets access token configured (sheets.access_token / JF_SHEETS_ACCESS_TOKEN); requests will be rejected"
            );
        }
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            spreadsheet_id: config.spreadsheet_id.trim().to_string(),
            access_token,
            header_ttl: config.header_cache_ttl(),
            header_cache: RwLock::new(HashMap::new()),
        })
    }

    fn values_url(&self, range: &str, suffix: &str) -> String {
        format!(
            "{}/spreadsheets/{}/values/{}{}",
            self.base_url,
            self.spreadsheet_id,
            urlencoding::encode(range),
            suffix
        )
    }

    async fn send(&self, request: reqwest::RequestBuilder, url: &str) -> Result<reqwest::Response, SheetError> {
        let response = request
            .bearer_auth(&self.access_token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SheetError::Network(format!("timeout while calling {}", url))
                } else {
                    SheetError::Network(format!("{}: {}", url, e))
                }
            })?;

        let status = response.status();
        tracing::debug!("Sheets API response: {} for {}", status, url);
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SheetError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn read_range(&self, range: &str) -> Result<Vec<Vec<String>>, SheetError> {
        let url = self.values_url(
            range,
            "?majorDimension=ROWS&valueRenderOption=FORMATTED_VALUE",
        );
        let response = self.send(self.client.get(&url), &url).await?;
        let body: ValueRange = response
            .json()
            .await
            .map_err(|e| SheetError::InvalidResponse(format!("{}: {}", url, e)))?;
        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    async fn write_row(&self, sheet: &str, row: u32, values: Vec<Option<String>>) -> Result<(), SheetError> {
        let range = a1::row_range(sheet, row, values.len());
        let url = self.values_url(&range, "?valueInputOption=USER_ENTERED");
        let body = ValueRange {
            range: Some(range),
            major_dimension: Some("ROWS".to_string()),
            values: vec![values.into_iter().map(option_to_cell).collect()],
        };
        self.send(self.client.put(&url).json(&body), &url).await?;
        Ok(())
    }

    fn cached_headers(&self, sheet: &str) -> Option<Vec<String>> {
        let cache = self.header_cache.read().ok()?;
        let (fetched_at, headers) = cache.get(sheet)?;
        if fetched_at.elapsed() < self.header_ttl {
            Some(headers.clone())
        } else {
            None
        }
    }
}

/// Formatted values arrive as strings; anything else is stringified
fn cell_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// `null` cells are skipped by the API, leaving the existing content
fn option_to_cell(value: Option<String>) -> Value {
    match value {
        Some(s) => Value::String(s),
        None => Value::Null,
    }
}

#[async_trait]
impl SheetGateway for GoogleSheetsClient {
    async fn get_all(&self, sheet: &str) -> Result<SheetTable, SheetError> {
        let grid = self.read_range(&a1::sheet_range(sheet)).await?;
        tracing::debug!("Sheets API: '{}' returned {} rows", sheet, grid.len());
        let table = SheetTable::from_grid(sheet, grid);
        if let Ok(mut cache) = self.header_cache.write() {
            cache.insert(
                sheet.to_string(),
                (Instant::now(), table.headers.as_ref().clone()),
            );
        }
        Ok(table)
    }

    async fn get_headers(&self, sheet: &str) -> Result<Vec<String>, SheetError> {
        if let Some(headers) = self.cached_headers(sheet) {
            return Ok(headers);
        }
        let headers = self
            .read_range(&a1::header_range(sheet))
            .await?
            .into_iter()
            .next()
            .unwrap_or_default();
        if let Ok(mut cache) = self.header_cache.write() {
            cache.insert(sheet.to_string(), (Instant::now(), headers.clone()));
        }
        Ok(headers)
    }

    async fn get_column(&self, sheet: &str, index: usize) -> Result<Vec<String>, SheetError> {
        let rows = self.read_range(&a1::column_range(sheet, index)).await?;
        Ok(rows
            .into_iter()
            .map(|row| row.into_iter().next().unwrap_or_default())
            .collect())
    }

    async fn append(&self, sheet: &str, values: Vec<Option<String>>) -> Result<u32, SheetError> {
        let range = format!("{}!A1", a1::quote_sheet(sheet));
        let url = self.values_url(
            &range,
            ":append?valueInputOption=USER_ENTERED&insertDataOption=INSERT_ROWS",
        );
        let body = ValueRange {
            range: None,
            major_dimension: Some("ROWS".to_string()),
            values: vec![values.into_iter().map(option_to_cell).collect()],
        };
        let response = self.send(self.client.post(&url).json(&body), &url).await?;
        let parsed: AppendResponse = response
            .json()
            .await
            .map_err(|e| SheetError::InvalidResponse(format!("{}: {}", url, e)))?;
        let updated_range = parsed
            .updates
            .and_then(|u| u.updated_range)
            .ok_or_else(|| SheetError::InvalidResponse("append without updatedRange".into()))?;
        let row = a1::first_row_of_range(&updated_range).ok_or_else(|| {
            SheetError::InvalidResponse(format!("unexpected updatedRange {}", updated_range))
        })?;
        tracing::info!("Sheets API: appended row {} to '{}'", row, sheet);
        Ok(row)
    }

    async fn update(
        &self,
        sheet: &str,
        locator: RowLocator,
        values: Vec<Option<String>>,
    ) -> Result<u32, SheetError> {
        let row = self.resolve(sheet, &locator).await?;
        self.write_row(sheet, row, values).await?;
        tracing::info!("Sheets API: updated row {} of '{}' ({})", row, sheet, locator);
        Ok(row)
    }

    async fn clear(&self, sheet: &str, locator: RowLocator) -> Result<u32, SheetError> {
        let row = self.resolve(sheet, &locator).await?;
        let width = self.get_headers(sheet).await?.len();
        let range = a1::row_range(sheet, row, width);
        let url = self.values_url(&range, ":clear");
        self.send(self.client.post(&url).json(&serde_json::json!({})), &url)
            .await?;
        tracing::info!("Sheets API: cleared row {} of '{}' ({})", row, sheet, locator);
        Ok(row)
    }
}
