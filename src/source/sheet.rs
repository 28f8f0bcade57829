//! Spreadsheet-backed web app source.
//!
//! The backend exposes one endpoint:
//! - `GET {base}` returns every prediction row
//! - `GET {base}?fn=realScores&gw=N` returns the fixtures and scores of round N
//! - `GET {base}?fn=gwData` returns the current round and its fixtures
//! - `POST {base}` stores a submission

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

use super::convert::{
    align_results, matches_from_sheet, record_from_row, round_from_payload, SheetPredictionRow,
    SheetResultsPayload, SheetRoundPayload, SheetSubmission,
};
use super::{LeagueSource, SourceError};
use crate::models::{MatchResult, PredictionRecord, Round};

/// HTTP client for the sheet backend.
pub struct SheetSource {
    client: Client,
    base_url: Url,
}

impl SheetSource {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, SourceError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("gw-predictor/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Base URL with the given query parameters appended.
    fn url_with(&self, params: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, SourceError> {
        debug!("Fetching {}", url);
        let response = self.client.get(url).send().await?;
        let response = check_status(response)?;
        Ok(response.json().await?)
    }
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SourceError> {
    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::HttpStatus {
            status: status.as_u16(),
            message: status.canonical_reason().unwrap_or("Unknown").to_string(),
        });
    }
    Ok(response)
}

#[async_trait]
impl LeagueSource for SheetSource {
    fn name(&self) -> &'static str {
        "sheet"
    }

    async fn fetch_predictions(&self) -> Result<Vec<PredictionRecord>, SourceError> {
        let rows: Vec<SheetPredictionRow> = self.get_json(self.url_with(&[])).await?;
        let total = rows.len();
        let records: Vec<PredictionRecord> = rows.iter().filter_map(record_from_row).collect();
        info!("Loaded {} of {} prediction rows", records.len(), total);
        Ok(records)
    }

    async fn fetch_round(&self, round: Round) -> Result<Vec<MatchResult>, SourceError> {
        let gw = round.to_string();
        let results_url = self.url_with(&[("fn", "realScores"), ("gw", &gw)]);
        let round_url = self.url_with(&[("fn", "gwData")]);
        let (payload, current): (SheetResultsPayload, SheetRoundPayload) =
            tokio::try_join!(self.get_json(results_url), self.get_json(round_url))?;

        let feed = matches_from_sheet(round, &payload.matches);
        if round_from_payload(&current) != Some(round) || current.fixtures.is_empty() {
            return Ok(feed);
        }
        if feed
            .iter()
            .any(|m| m.home_team.is_empty() || m.away_team.is_empty())
        {
            warn!("GW {} results carry no team names, keeping feed order", round);
            return Ok(feed);
        }

        // Picks for the open round were made against the gwData fixture list.
        let fixtures = matches_from_sheet(round, &current.fixtures);
        debug!(
            "Aligning {} GW {} results to {} fixtures",
            feed.len(),
            round,
            fixtures.len()
        );
        Ok(align_results(&fixtures, &feed))
    }

    async fn current_round(&self) -> Result<Option<Round>, SourceError> {
        let payload: SheetRoundPayload = self.get_json(self.url_with(&[("fn", "gwData")])).await?;
        Ok(round_from_payload(&payload))
    }

    async fn submit(&self, record: &PredictionRecord) -> Result<(), SourceError> {
        let body = serde_json::to_string(&SheetSubmission::from(record))?;
        // Apps Script web apps reject CORS preflights, so the body goes as plain text.
        let response = self
            .client
            .post(self.base_url.clone())
            .header(CONTENT_TYPE, "text/plain;charset=utf-8")
            .body(body)
            .send()
            .await?;
        check_status(response)?;
        info!("Submitted GW {} predictions for {}", record.round, record.user_key());
        Ok(())
    }

    async fn record_result(&self, _result: &MatchResult) -> Result<(), SourceError> {
        Err(SourceError::Unsupported("Recording results", "sheet"))
    }
}
