//! Google Sheets: create, append rows, read a range.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use crate::config::ToolConfig;
use crate::context::ToolContext;
use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};
use crate::tools::google::GoogleApi;
use crate::upstream::endpoint;

/// Range used for appends when none is given: the first sheet's table.
const DEFAULT_APPEND_RANGE: &str = "A1";

/// Rows must be a non-empty array of arrays of scalars.
fn rows(args: &ToolArgs) -> Result<Vec<Vec<Value>>, ToolError> {
    let value = args
        .get_value("values")
        .ok_or_else(|| ToolError::MissingParameter("values".to_string()))?;

    let rows = value
        .as_array()
        .filter(|rows| !rows.is_empty())
        .ok_or_else(|| ToolError::invalid("values", "expected a non-empty array of rows"))?;

    rows.iter()
        .map(|row| {
            let cells = row
                .as_array()
                .ok_or_else(|| ToolError::invalid("values", "each row must be an array"))?;
            if cells.iter().any(|c| c.is_array() || c.is_object()) {
                return Err(ToolError::invalid("values", "cells must be strings, numbers, booleans or null"));
            }
            Ok(cells.clone())
        })
        .collect()
}

fn sheets(ctx: &ToolContext) -> (GoogleApi, Arc<ToolConfig>) {
    (GoogleApi::new(ctx, "Google Sheets"), ctx.config.clone())
}

/// `createGoogleSheet`: `{title}`.
pub struct CreateGoogleSheet {
    api: GoogleApi,
    config: Arc<ToolConfig>,
}

impl CreateGoogleSheet {
    pub fn new(ctx: &ToolContext) -> Self {
        let (api, config) = sheets(ctx);
        Self { api, config }
    }
}

#[async_trait]
impl Tool for CreateGoogleSheet {
    fn name(&self) -> &str {
        "createGoogleSheet"
    }

    fn description(&self) -> &str {
        "Creates an empty Google Sheets spreadsheet."
    }

    fn required_params(&self) -> &[&str] {
        &["title"]
    }

    fn demo_body(&self) -> Value {
        json!({ "title": "Leads" })
    }

    fn demo_response(&self) -> Value {
        json!({
            "status": true,
            "spreadsheetId": "1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms",
            "title": "Leads",
            "url": "https://docs.google.com/spreadsheets/d/1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms/edit"
        })
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let title = args.get_string("title")?;
        let url = endpoint(&self.config.google_sheets_url, &["v4", "spreadsheets"])?;
        let created = self
            .api
            .post(url, &json!({ "properties": { "title": title } }))
            .await?;

        let id = created
            .get("spreadsheetId")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::ExecutionFailed("Google Sheets returned no spreadsheet id".to_string()))?;
        let sheet_url = created
            .get("spreadsheetUrl")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("https://docs.google.com/spreadsheets/d/{}/edit", id));

        info!("Created spreadsheet {}", id);

        Ok(ToolOutput::success(json!({
            "status": true,
            "spreadsheetId": id,
            "title": title,
            "url": sheet_url,
        })))
    }
}

/// `appendGoogleSheet`: `{spreadsheetId, range?, values}`.
pub struct AppendGoogleSheet {
    api: GoogleApi,
    config: Arc<ToolConfig>,
}

impl AppendGoogleSheet {
    pub fn new(ctx: &ToolContext) -> Self {
        let (api, config) = sheets(ctx);
        Self { api, config }
    }
}

#[async_trait]
impl Tool for AppendGoogleSheet {
    fn name(&self) -> &str {
        "appendGoogleSheet"
    }

    fn description(&self) -> &str {
        "Appends rows to a spreadsheet. values is an array of rows; range defaults to A1 on the first sheet."
    }

    fn required_params(&self) -> &[&str] {
        &["spreadsheetId", "values"]
    }

    fn demo_body(&self) -> Value {
        json!({
            "spreadsheetId": "1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms",
            "range": "Sheet1!A1",
            "values": [["Jane", "jane@example.com", 42]]
        })
    }

    fn demo_response(&self) -> Value {
        json!({
            "status": true,
            "spreadsheetId": "1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms",
            "updatedRange": "Sheet1!A2:C2",
            "updatedRows": 1,
            "updatedCells": 3
        })
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let id = args.get_string("spreadsheetId")?;
        let range = args
            .get_string_opt("range")
            .unwrap_or_else(|| DEFAULT_APPEND_RANGE.to_string());
        let values = rows(&args)?;

        let mut url = endpoint(
            &self.config.google_sheets_url,
            &["v4", "spreadsheets", id.as_str(), "values", format!("{}:append", range).as_str()],
        )?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "INSERT_ROWS");

        let response = self
            .api
            .post(url, &json!({ "majorDimension": "ROWS", "values": values }))
            .await?;
        let updates = response.get("updates").cloned().unwrap_or(Value::Null);

        Ok(ToolOutput::success(json!({
            "status": true,
            "spreadsheetId": id,
            "updatedRange": updates.get("updatedRange"),
            "updatedRows": updates.get("updatedRows"),
            "updatedCells": updates.get("updatedCells"),
        })))
    }
}

/// `readGoogleSheet`: `{spreadsheetId, range}`.
pub struct ReadGoogleSheet {
    api: GoogleApi,
    config: Arc<ToolConfig>,
}

impl ReadGoogleSheet {
    pub fn new(ctx: &ToolContext) -> Self {
        let (api, config) = sheets(ctx);
        Self { api, config }
    }
}

#[async_trait]
impl Tool for ReadGoogleSheet {
    fn name(&self) -> &str {
        "readGoogleSheet"
    }

    fn description(&self) -> &str {
        "Reads the cell values in a spreadsheet range (A1 notation)."
    }

    fn required_params(&self) -> &[&str] {
        &["spreadsheetId", "range"]
    }

    fn demo_body(&self) -> Value {
        json!({
            "spreadsheetId": "1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms",
            "range": "Sheet1!A1:C2"
        })
    }

    fn demo_response(&self) -> Value {
        json!({
            "status": true,
            "spreadsheetId": "1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms",
            "range": "Sheet1!A1:C2",
            "values": [["Name", "Email", "Score"], ["Jane", "jane@example.com", "42"]]
        })
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let id = args.get_string("spreadsheetId")?;
        let range = args.get_string("range")?;

        let url = endpoint(
            &self.config.google_sheets_url,
            &["v4", "spreadsheets", id.as_str(), "values", range.as_str()],
        )?;
        let data = self.api.get(url).await?;

        Ok(ToolOutput::success(json!({
            "status": true,
            "spreadsheetId": id,
            "range": data.get("range").and_then(Value::as_str).unwrap_or(range.as_str()),
            // Sheets omits `values` for an empty range.
            "values": data.get("values").cloned().unwrap_or_else(|| json!([])),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::google::testing::context_with_token;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn context(server: &MockServer) -> ToolContext {
        context_with_token(ToolConfig {
            google_sheets_url: server.uri(),
            ..Default::default()
        })
        .await
    }

    fn args(value: Value) -> ToolArgs {
        ToolArgs::from_value(value).unwrap()
    }

    #[test]
    fn test_rows_validation() {
        assert!(rows(&args(json!({"values": [["a", 1, true, null]]}))).is_ok());
        assert!(matches!(rows(&args(json!({}))), Err(ToolError::MissingParameter(_))));
        for bad in [json!([]), json!(["a"]), json!([[["nested"]]]), json!("a,b")] {
            assert!(rows(&args(json!({ "values": bad }))).is_err());
        }
    }

    #[tokio::test]
    async fn test_create_sheet() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v4/spreadsheets"))
            .and(body_partial_json(json!({"properties": {"title": "Leads"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "spreadsheetId": "s1",
                "spreadsheetUrl": "https://docs.google.com/spreadsheets/d/s1/edit"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let output = CreateGoogleSheet::new(&context(&server).await)
            .execute(args(json!({"title": "Leads"})))
            .await
            .unwrap();
        assert_eq!(output.content["spreadsheetId"], "s1");
        assert_eq!(output.content["url"], "https://docs.google.com/spreadsheets/d/s1/edit");
    }

    #[tokio::test]
    async fn test_append_rows() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v4/spreadsheets/s1/values/A1:append"))
            .and(query_param("valueInputOption", "USER_ENTERED"))
            .and(body_partial_json(json!({"values": [["Jane", 42]]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "spreadsheetId": "s1",
                "updates": {"updatedRange": "Sheet1!A2:B2", "updatedRows": 1, "updatedCells": 2}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let output = AppendGoogleSheet::new(&context(&server).await)
            .execute(args(json!({"spreadsheetId": "s1", "values": [["Jane", 42]]})))
            .await
            .unwrap();
        assert_eq!(output.content["updatedRange"], "Sheet1!A2:B2");
        assert_eq!(output.content["updatedRows"], 1);
    }

    #[tokio::test]
    async fn test_read_empty_range() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/spreadsheets/s1/values/Sheet1!A1:B2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "range": "Sheet1!A1:B2",
                "majorDimension": "ROWS"
            })))
            .mount(&server)
            .await;

        let output = ReadGoogleSheet::new(&context(&server).await)
            .execute(args(json!({"spreadsheetId": "s1", "range": "Sheet1!A1:B2"})))
            .await
            .unwrap();
        assert_eq!(output.content["values"], json!([]));
        assert_eq!(output.content["range"], "Sheet1!A1:B2");
    }
}
