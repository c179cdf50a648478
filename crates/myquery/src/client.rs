//! Async client for the myquery web service.

use crate::config::{self, MyqueryConfig};
use crate::error::{MyqueryError, Result};
use crate::models::{
    self, ChannelMetadata, DisconnectEvent, IntervalResult, PointResult, SamplerResult,
    StatsResult,
};
use crate::query::{ChannelQuery, IntervalQuery, PointQuery, SamplerQuery, StatsQuery};
use crate::table::SampleTable;
use diagnostics::*;
use serde_json::Value as Json;
use std::collections::BTreeMap;
use std::time::Duration;

const TIMEOUT_SECONDS: u64 = 60;

/// Async myquery client. One HTTP GET per call; failures surface directly
/// to the caller with no retry or recovery.
pub struct Client {
    http: reqwest::Client,
    config: MyqueryConfig,
}

/// Result of running one interval query per channel and joining the series.
#[derive(Debug, Clone)]
pub struct CombinedIntervalResult {
    /// The per-channel series joined on the union of their timestamps.
    pub data: SampleTable,
    pub disconnects: BTreeMap<String, Vec<DisconnectEvent>>,
    pub metadata: BTreeMap<String, BTreeMap<String, Json>>,
}

impl Client {
    /// Create a client against the production service.
    pub fn new() -> Result<Self> {
        Self::with_config(MyqueryConfig::default())
    }

    /// Create a client against a specific service deployment.
    pub fn with_config(config: MyqueryConfig) -> Result<Self> {
        config::validate_config(&config)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECONDS))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &MyqueryConfig {
        &self.config
    }

    /// Sample a set of PVs at regularly spaced time steps.
    pub async fn sampler(&self, query: &SamplerQuery) -> Result<SamplerResult> {
        query.validate()?;
        let body = self
            .fetch_text(&self.config.mysampler_url(), &query.to_web_params())
            .await?;
        let result = models::parse_sampler(&body, &query.pvlist, query.enums_as_strings)?;
        let rows = result.data.num_rows();
        let channels = result.data.num_columns();
        debug!("mysampler returned {rows} rows for {channels} channels");
        Ok(result)
    }

    /// Fetch every archived event for one channel over a time range.
    pub async fn interval(&self, query: &IntervalQuery) -> Result<IntervalResult> {
        query.validate()?;
        let body = self
            .fetch_text(&self.config.interval_url(), &query.to_web_params())
            .await?;
        let result = models::parse_interval(&body, &query.channel, query.enums_as_strings)?;
        let channel = &query.channel;
        let events = result.data.len();
        debug!("interval returned {events} events for {channel}");
        Ok(result)
    }

    /// Run one interval query per channel concurrently and join the series
    /// into a single table.
    ///
    /// The endpoint takes one PV per request, so this fans out a copy of
    /// `template` for each entry of `channels`. `prior_point` is forced on
    /// so every channel has a value at the start of the range, which makes
    /// the join's forward-fill meaningful.
    pub async fn interval_combined(
        &self,
        channels: &[String],
        template: &IntervalQuery,
    ) -> Result<CombinedIntervalResult> {
        if channels.is_empty() {
            return Err(MyqueryError::InvalidQuery(
                "channel list cannot be empty".to_string(),
            ));
        }

        let queries: Vec<IntervalQuery> = channels
            .iter()
            .map(|channel| {
                let mut query = template.clone();
                query.channel = channel.clone();
                query.prior_point = true;
                query
            })
            .collect();

        let results = futures::future::try_join_all(
            queries.iter().map(|query| self.interval(query)),
        )
        .await?;

        let mut series = Vec::with_capacity(results.len());
        let mut disconnects = BTreeMap::new();
        let mut metadata = BTreeMap::new();
        for (channel, result) in channels.iter().zip(results) {
            if !result.disconnects.is_empty() {
                disconnects.insert(channel.clone(), result.disconnects);
            }
            metadata.insert(channel.clone(), result.metadata);
            series.push(result.data);
        }

        Ok(CombinedIntervalResult {
            data: SampleTable::from_series(&series),
            disconnects,
            metadata,
        })
    }

    /// Fetch the single archived event nearest a given time.
    pub async fn point(&self, query: &PointQuery) -> Result<PointResult> {
        query.validate()?;
        let body = self
            .fetch_text(&self.config.point_url(), &query.to_web_params())
            .await?;
        models::parse_point(&body, query.enums_as_strings)
    }

    /// Look up archived channels by SQL LIKE pattern.
    pub async fn channel(&self, query: &ChannelQuery) -> Result<Vec<ChannelMetadata>> {
        query.validate()?;
        let body = self
            .fetch_text(&self.config.channel_url(), &query.to_web_params())
            .await?;
        let matches = models::parse_channels(&body)?;
        let count = matches.len();
        let pattern = &query.pattern;
        debug!("channel lookup for {pattern} matched {count} channels");
        Ok(matches)
    }

    /// Fetch per-bin statistics for a set of float PVs.
    pub async fn stats(&self, query: &StatsQuery) -> Result<StatsResult> {
        query.validate()?;
        let body = self
            .fetch_text(&self.config.mystats_url(), &query.to_web_params())
            .await?;
        models::parse_stats(&body)
    }

    /// GET with query parameters, failing on non-2xx with the body text in
    /// the error.
    async fn fetch_text(&self, url: &str, params: &[(String, String)]) -> Result<String> {
        debug!("GET {url}");
        let response = self.http.get(url).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let url = response.url().to_string();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            error!("request to {url} failed with status {status}");
            return Err(MyqueryError::Status { status, url, body });
        }

        Ok(response.text().await?)
    }
}
