//! Thin client for the Google Sheets v4 values API.

use serde::{Deserialize, Serialize};

/// Failure modes of the record store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing connection was never established. Construction fails
    /// with this; it must not be reachable after startup.
    #[error("record store connection is not initialized")]
    Unavailable,
    #[error("record store request failed")]
    Remote(#[from] reqwest::Error),
    #[error("record store returned {status}: {message}")]
    Api { status: reqwest::StatusCode, message: String },
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ValueRange {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    values: Vec<Vec<String>>,
}

/// Raw read/append/update operations on spreadsheet ranges. Row typing and
/// filtering live in [`crate::store`].
pub struct SheetsClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl SheetsClient {
    /// Explicit initialization step. Fails when the endpoint or token is
    /// missing, so no operation can ever run against a half-configured
    /// connection.
    pub fn connect(
        http: reqwest::Client,
        base_url: &str,
        token: &str,
    ) -> Result<Self, StoreError> {
        if base_url.trim().is_empty() || token.trim().is_empty() {
            return Err(StoreError::Unavailable);
        }
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Read all rows in `range`. Cells come back as strings; an empty range
    /// yields an empty vector.
    pub async fn values_get(
        &self,
        spreadsheet: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>, StoreError> {
        let url = format!(
            "{}/v4/spreadsheets/{spreadsheet}/values/{range}",
            self.base_url
        );
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        let body: ValueRange = Self::check(response).await?.json().await?;
        Ok(body.values)
    }

    /// Append `rows` after the last data row of `range` (RAW input).
    pub async fn values_append(
        &self,
        spreadsheet: &str,
        range: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<(), StoreError> {
        let url = format!(
            "{}/v4/spreadsheets/{spreadsheet}/values/{range}:append",
            self.base_url
        );
        let response = self
            .http
            .post(url)
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(&self.token)
            .json(&ValueRange { values: rows })
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Overwrite `range` with `rows` (RAW input).
    pub async fn values_update(
        &self,
        spreadsheet: &str,
        range: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<(), StoreError> {
        let url = format!(
            "{}/v4/spreadsheets/{spreadsheet}/values/{range}",
            self.base_url
        );
        let response = self
            .http
            .put(url)
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(&self.token)
            .json(&ValueRange { values: rows })
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn check(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(StoreError::Api { status, message })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_requires_endpoint_and_token() {
        let http = reqwest::Client::new();
        assert!(matches!(
            SheetsClient::connect(http.clone(), "", "token"),
            Err(StoreError::Unavailable)
        ));
        assert!(matches!(
            SheetsClient::connect(http.clone(), "https://example.com", " "),
            Err(StoreError::Unavailable)
        ));
        let client = SheetsClient::connect(
            http,
            "https://sheets.googleapis.com/",
            "token",
        )
        .unwrap();
        assert_eq!(client.base_url, "https://sheets.googleapis.com");
    }

    #[test]
    fn value_range_tolerates_missing_values() {
        let empty: ValueRange = serde_json::from_str("{}").unwrap();
        assert!(empty.values.is_empty());

        let body: ValueRange =
            serde_json::from_str(r#"{"values":[["a","b"],["c"]]}"#).unwrap();
        assert_eq!(body.values, vec![vec!["a", "b"], vec!["c"]]);
    }
}
