//! Typed record-store adapter over the events and recipients sheets.

use chrono::NaiveDate;
use itertools::Itertools;

use crate::models::{Padharamani, Recipient};
use crate::sheets::{SheetsClient, StoreError};

const EVENTS_RANGE: &str = "Sheet1!A:N";
const RECIPIENTS_RANGE: &str = "Sheet1!A:C";
const RECIPIENTS_HEADER_RANGE: &str = "Sheet1!A1:C1";
const RECIPIENTS_HEADER: [&str; 3] = ["Chat ID", "Name", "Registration Date"];

pub struct PadharamaniStore {
    client: SheetsClient,
    events_spreadsheet: String,
    recipients_spreadsheet: String,
}

impl PadharamaniStore {
    pub fn new(
        client: SheetsClient,
        events_spreadsheet: String,
        recipients_spreadsheet: String,
    ) -> Self {
        Self { client, events_spreadsheet, recipients_spreadsheet }
    }

    /// Read the events sheet fresh and return the eligible padharamanis for
    /// `date`, sorted by beginning time.
    pub async fn padharamanis_for(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<Padharamani>, StoreError> {
        let rows = self
            .client
            .values_get(&self.events_spreadsheet, EVENTS_RANGE)
            .await?;
        let today = date.format("%Y-%m-%d").to_string();
        let padharamanis = select_eligible(&rows, &today);
        log::info!("Found {} padharamanis for {today}", padharamanis.len());
        Ok(padharamanis)
    }

    /// All registered recipients. Empty when the sheet holds nothing beyond
    /// the header row.
    pub async fn recipients(&self) -> Result<Vec<Recipient>, StoreError> {
        let rows = self
            .client
            .values_get(&self.recipients_spreadsheet, RECIPIENTS_RANGE)
            .await?;
        if rows.len() < 2 {
            return Ok(Vec::new());
        }
        Ok(rows[1..].iter().filter_map(|r| Recipient::from_row(r)).collect())
    }

    pub async fn append_recipient(
        &self,
        recipient: &Recipient,
    ) -> Result<(), StoreError> {
        self.client
            .values_append(
                &self.recipients_spreadsheet,
                RECIPIENTS_RANGE,
                vec![vec![
                    recipient.chat_id.to_string(),
                    recipient.name.clone(),
                    recipient.registration_date.clone(),
                ]],
            )
            .await
    }

    /// Write the fixed header row when the recipients sheet is empty.
    /// Called once at startup; a failure here aborts startup.
    pub async fn ensure_recipients_header(&self) -> Result<(), StoreError> {
        let rows = self
            .client
            .values_get(&self.recipients_spreadsheet, RECIPIENTS_HEADER_RANGE)
            .await?;
        if rows.first().is_some_and(|r| r.iter().any(|c| !c.is_empty())) {
            return Ok(());
        }
        self.client
            .values_update(
                &self.recipients_spreadsheet,
                RECIPIENTS_HEADER_RANGE,
                vec![RECIPIENTS_HEADER
                    .iter()
                    .map(|s| (*s).to_string())
                    .collect()],
            )
            .await?;
        log::info!("Recipients sheet initialized with header row");
        Ok(())
    }
}

/// Skip the header row, convert the rest verbatim, filter for eligibility,
/// and sort by beginning time (empty time first).
fn select_eligible(rows: &[Vec<String>], today: &str) -> Vec<Padharamani> {
    rows.iter()
        .enumerate()
        .skip(1)
        .map(|(i, row)| Padharamani::from_row(i + 1, row))
        .filter(|p| p.is_eligible(today))
        .sorted_by(|a, b| a.sort_time().cmp(b.sort_time()))
        .collect()
}
