//! Query types for the myquery endpoints.
//!
//! Each query knows how to validate itself and render the web parameters
//! its endpoint expects. The service treats the presence of some parameters
//! as true, and the web form sends "on" rather than a boolean, so boolean
//! flags are only emitted when set.

use crate::error::{MyqueryError, Result};
use chrono::{NaiveDateTime, Timelike};
use diagnostics::*;

const TS_FMT: &str = "%Y-%m-%dT%H:%M:%S";

fn format_ts(ts: &NaiveDateTime) -> String {
    ts.format(TS_FMT).to_string()
}

fn warn_extra_opts(endpoint: &str, extra_opts: &[(String, String)]) {
    if !extra_opts.is_empty() {
        let count = extra_opts.len();
        warn!("passing {count} extra_opts through to the {endpoint} endpoint unchecked");
    }
}

/// Sampling algorithms supported by the interval endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleType {
    Graphical,
    EventSimple,
    MyGet,
    MySampler,
}

impl SampleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SampleType::Graphical => "graphical",
            SampleType::EventSimple => "eventsimple",
            SampleType::MyGet => "myget",
            SampleType::MySampler => "mysampler",
        }
    }
}

/// Query for the mysampler endpoint: the value of a set of PVs at regularly
/// spaced time steps.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerQuery {
    /// Start of the sample run. Sub-second precision is dropped.
    pub start: NaiveDateTime,
    /// Time step between samples, in milliseconds.
    pub interval_ms: u64,
    /// Number of samples to take per channel.
    pub num_samples: u32,
    /// Channels to sample.
    pub pvlist: Vec<String>,
    pub deployment: String,
    pub data_updates_only: bool,
    pub enums_as_strings: bool,
    pub unix_timestamps_ms: bool,
    pub adjust_time_to_server_offset: bool,
    /// Extra parameters passed through to the endpoint unchecked.
    pub extra_opts: Vec<(String, String)>,
}

impl SamplerQuery {
    pub fn new(
        start: NaiveDateTime,
        interval_ms: u64,
        num_samples: u32,
        pvlist: Vec<String>,
    ) -> Self {
        Self {
            start: start.with_nanosecond(0).unwrap_or(start),
            interval_ms,
            num_samples,
            pvlist,
            deployment: "history".to_string(),
            data_updates_only: false,
            enums_as_strings: false,
            unix_timestamps_ms: false,
            adjust_time_to_server_offset: false,
            extra_opts: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.pvlist.is_empty() {
            return Err(MyqueryError::InvalidQuery(
                "pvlist cannot be empty".to_string(),
            ));
        }
        if self.interval_ms == 0 {
            return Err(MyqueryError::InvalidQuery(
                "interval_ms must be positive".to_string(),
            ));
        }
        if self.num_samples == 0 {
            return Err(MyqueryError::InvalidQuery(
                "num_samples must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_web_params(&self) -> Vec<(String, String)> {
        let mut out = vec![
            ("c".to_string(), self.pvlist.join(",")),
            ("b".to_string(), format_ts(&self.start)),
            ("n".to_string(), self.num_samples.to_string()),
            ("m".to_string(), self.deployment.clone()),
            ("s".to_string(), self.interval_ms.to_string()),
        ];

        if self.data_updates_only {
            out.push(("d".to_string(), "on".to_string()));
        }
        if self.enums_as_strings {
            out.push(("e".to_string(), "on".to_string()));
        }
        if self.unix_timestamps_ms {
            out.push(("u".to_string(), "on".to_string()));
        }
        if self.adjust_time_to_server_offset {
            out.push(("a".to_string(), "on".to_string()));
        }

        warn_extra_opts("mysampler", &self.extra_opts);
        out.extend(self.extra_opts.iter().cloned());
        out
    }
}

/// Query for the interval endpoint: every archived event for one channel
/// over a time range. The endpoint supports only one PV per request.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalQuery {
    pub channel: String,
    pub begin: NaiveDateTime,
    pub end: NaiveDateTime,
    /// How many points the archive may return before sampling kicks in.
    /// The web form always sends the parameter, empty when unset.
    pub bin_limit: Option<u64>,
    pub sample_type: Option<SampleType>,
    pub deployment: String,
    /// Digits displayed for fractional seconds.
    pub frac_time_digits: u8,
    /// Significant figures reported in PV values.
    pub sig_figs: u8,
    pub data_updates_only: bool,
    /// Include the most recent update prior to `begin` so the series has a
    /// value at the start of the range.
    pub prior_point: bool,
    pub enums_as_strings: bool,
    pub unix_timestamps_ms: bool,
    pub adjust_time_to_server_offset: bool,
    /// Integrate values over time. Only meaningful for float PVs; left to
    /// the caller to get right, as the service does.
    pub integrate: bool,
    pub extra_opts: Vec<(String, String)>,
}

impl IntervalQuery {
    pub fn new(channel: impl Into<String>, begin: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            channel: channel.into(),
            begin,
            end,
            bin_limit: None,
            sample_type: None,
            deployment: "history".to_string(),
            frac_time_digits: 0,
            sig_figs: 6,
            data_updates_only: false,
            prior_point: false,
            enums_as_strings: false,
            unix_timestamps_ms: false,
            adjust_time_to_server_offset: false,
            integrate: false,
            extra_opts: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.channel.is_empty() {
            return Err(MyqueryError::InvalidQuery(
                "channel cannot be empty".to_string(),
            ));
        }
        if self.begin >= self.end {
            return Err(MyqueryError::InvalidQuery(format!(
                "begin ({}) must precede end ({})",
                self.begin, self.end
            )));
        }
        Ok(())
    }

    pub fn to_web_params(&self) -> Vec<(String, String)> {
        let mut out = vec![
            ("c".to_string(), self.channel.clone()),
            ("b".to_string(), format_ts(&self.begin)),
            ("e".to_string(), format_ts(&self.end)),
            ("m".to_string(), self.deployment.clone()),
            ("f".to_string(), self.frac_time_digits.to_string()),
            ("v".to_string(), self.sig_figs.to_string()),
            (
                "l".to_string(),
                self.bin_limit.map(|l| l.to_string()).unwrap_or_default(),
            ),
        ];

        // The service assumes its own default when 't' is missing.
        if let Some(sample_type) = self.sample_type {
            out.push(("t".to_string(), sample_type.as_str().to_string()));
        }

        if self.data_updates_only {
            out.push(("d".to_string(), "on".to_string()));
        }
        if self.prior_point {
            out.push(("p".to_string(), "on".to_string()));
        }
        if self.enums_as_strings {
            out.push(("s".to_string(), "on".to_string()));
        }
        if self.unix_timestamps_ms {
            out.push(("u".to_string(), "on".to_string()));
        }
        if self.adjust_time_to_server_offset {
            out.push(("a".to_string(), "on".to_string()));
        }
        if self.integrate {
            out.push(("i".to_string(), "on".to_string()));
        }

        warn_extra_opts("interval", &self.extra_opts);
        out.extend(self.extra_opts.iter().cloned());
        out
    }
}

/// Query for the point endpoint: the single archived event closest to a
/// given time for one channel. By default the search looks backward from
/// `time` inclusive; the flags can flip it forward and exclude the given
/// time, which helps when stepping from an event you already hold.
#[derive(Debug, Clone, PartialEq)]
pub struct PointQuery {
    pub channel: String,
    pub time: NaiveDateTime,
    pub deployment: String,
    pub frac_time_digits: u8,
    pub sig_figs: u8,
    pub data_updates_only: bool,
    pub forward_time_search: bool,
    pub exclude_given_time: bool,
    pub enums_as_strings: bool,
    pub unix_timestamps_ms: bool,
    pub adjust_time_to_server_offset: bool,
    pub extra_opts: Vec<(String, String)>,
}

impl PointQuery {
    pub fn new(channel: impl Into<String>, time: NaiveDateTime) -> Self {
        Self {
            channel: channel.into(),
            time,
            deployment: "history".to_string(),
            frac_time_digits: 0,
            sig_figs: 6,
            data_updates_only: false,
            forward_time_search: false,
            exclude_given_time: false,
            enums_as_strings: false,
            unix_timestamps_ms: false,
            adjust_time_to_server_offset: false,
            extra_opts: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.channel.is_empty() {
            return Err(MyqueryError::InvalidQuery(
                "channel cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_web_params(&self) -> Vec<(String, String)> {
        let mut out = vec![
            ("c".to_string(), self.channel.clone()),
            ("t".to_string(), format_ts(&self.time)),
            ("m".to_string(), self.deployment.clone()),
            ("f".to_string(), self.frac_time_digits.to_string()),
            ("v".to_string(), self.sig_figs.to_string()),
        ];

        if self.data_updates_only {
            out.push(("d".to_string(), "on".to_string()));
        }
        if self.forward_time_search {
            out.push(("w".to_string(), "on".to_string()));
        }
        if self.exclude_given_time {
            out.push(("x".to_string(), "on".to_string()));
        }
        if self.enums_as_strings {
            out.push(("s".to_string(), "on".to_string()));
        }
        if self.unix_timestamps_ms {
            out.push(("u".to_string(), "on".to_string()));
        }
        if self.adjust_time_to_server_offset {
            out.push(("a".to_string(), "on".to_string()));
        }

        warn_extra_opts("point", &self.extra_opts);
        out.extend(self.extra_opts.iter().cloned());
        out
    }
}

/// Query for the channel endpoint: look up archived channels by name with
/// SQL LIKE patterns (`%` and `_` wildcards).
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelQuery {
    pub pattern: String,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub deployment: String,
    pub extra_opts: Vec<(String, String)>,
}

impl ChannelQuery {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            limit: None,
            offset: None,
            deployment: "history".to_string(),
            extra_opts: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.pattern.is_empty() {
            return Err(MyqueryError::InvalidQuery(
                "pattern cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_web_params(&self) -> Vec<(String, String)> {
        let mut out = vec![
            ("q".to_string(), self.pattern.clone()),
            ("m".to_string(), self.deployment.clone()),
        ];

        if let Some(limit) = self.limit {
            out.push(("l".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            out.push(("o".to_string(), offset.to_string()));
        }

        warn_extra_opts("channel", &self.extra_opts);
        out.extend(self.extra_opts.iter().cloned());
        out
    }
}

/// Query for the mystats endpoint: per-bin statistics for a set of float
/// PVs over a time range.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsQuery {
    pub pvlist: Vec<String>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Number of equal-width bins the range is divided into.
    pub num_bins: u32,
    pub deployment: String,
    pub frac_time_digits: u8,
    pub sig_figs: u8,
    pub data_updates_only: bool,
    pub unix_timestamps_ms: bool,
    pub adjust_time_to_server_offset: bool,
    pub extra_opts: Vec<(String, String)>,
}

impl StatsQuery {
    pub fn new(pvlist: Vec<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            pvlist,
            start,
            end,
            num_bins: 1,
            deployment: "history".to_string(),
            frac_time_digits: 0,
            sig_figs: 6,
            data_updates_only: false,
            unix_timestamps_ms: false,
            adjust_time_to_server_offset: false,
            extra_opts: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.pvlist.is_empty() {
            return Err(MyqueryError::InvalidQuery(
                "pvlist cannot be empty".to_string(),
            ));
        }
        if self.num_bins == 0 {
            return Err(MyqueryError::InvalidQuery(
                "num_bins must be positive".to_string(),
            ));
        }
        if self.start >= self.end {
            return Err(MyqueryError::InvalidQuery(format!(
                "start ({}) must precede end ({})",
                self.start, self.end
            )));
        }
        Ok(())
    }

    pub fn to_web_params(&self) -> Vec<(String, String)> {
        let mut out = vec![
            ("c".to_string(), self.pvlist.join(",")),
            ("b".to_string(), format_ts(&self.start)),
            ("e".to_string(), format_ts(&self.end)),
            ("n".to_string(), self.num_bins.to_string()),
            ("m".to_string(), self.deployment.clone()),
            ("f".to_string(), self.frac_time_digits.to_string()),
            ("v".to_string(), self.sig_figs.to_string()),
        ];

        if self.data_updates_only {
            out.push(("d".to_string(), "on".to_string()));
        }
        if self.unix_timestamps_ms {
            out.push(("u".to_string(), "on".to_string()));
        }
        if self.adjust_time_to_server_offset {
            out.push(("a".to_string(), "on".to_string()));
        }

        warn_extra_opts("mystats", &self.extra_opts);
        out.extend(self.extra_opts.iter().cloned());
        out
    }
}
