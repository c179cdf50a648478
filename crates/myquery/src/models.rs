//! Wire types for myquery JSON responses and the parsers that shape them
//! into tabular results.
//!
//! Every archived event on the wire is either an update `{"d": .., "v": ..}`
//! or a non-update marker `{"d": .., "t": "<event text>"}` (the interval
//! endpoint tags the latter with an extra "x" key). Timestamps arrive as
//! `YYYY-MM-DD HH:MM:SS[.fff]` text, or as epoch milliseconds when the
//! query asked for `unix_timestamps_ms`. Vector PVs arrive as arrays of
//! strings and must be converted by the channel's EPICS datatype.

use crate::error::{MyqueryError, Result};
use crate::table::{SampleTable, Series};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::collections::BTreeMap;

/// A typed sample value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Float(f64),
    Int(i64),
    Text(String),
    FloatArray(Vec<f64>),
    IntArray(Vec<i64>),
    TextArray(Vec<String>),
}

impl Value {
    /// Numeric view of scalar values; integers widen to f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Text rendering: scalars as-is, arrays comma-joined.
impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn join<T: std::fmt::Display>(
            f: &mut std::fmt::Formatter<'_>,
            items: &[T],
        ) -> std::fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{item}")?;
            }
            Ok(())
        }

        match self {
            Value::Float(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "{v}"),
            Value::FloatArray(v) => join(f, v),
            Value::IntArray(v) => join(f, v),
            Value::TextArray(v) => join(f, v),
        }
    }
}

/// A non-update event: the channel stopped producing data at `timestamp`.
/// The text carries the archiver's reason (network disconnect, channel
/// deactivated, and so on).
#[derive(Debug, Clone, PartialEq)]
pub struct DisconnectEvent {
    pub timestamp: NaiveDateTime,
    pub text: String,
}

/// Descriptive attributes the archiver holds for one channel. Keys this
/// client does not know about are retained in `extra`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChannelMetadata {
    pub name: String,
    pub datatype: String,
    pub datasize: u32,
    #[serde(default)]
    pub datahost: Option<String>,
    #[serde(default)]
    pub ioc: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Json>,
}

impl ChannelMetadata {
    /// Scalar channels have datasize 1; anything larger is a vector PV.
    pub fn is_scalar(&self) -> bool {
        self.datasize == 1
    }
}

/// Shaped mysampler response: one row per sample time, one column per
/// requested channel, with non-update events reported separately.
#[derive(Debug, Clone)]
pub struct SamplerResult {
    pub data: SampleTable,
    /// Channels with at least one non-update event during the run.
    pub disconnects: BTreeMap<String, Vec<DisconnectEvent>>,
    pub metadata: BTreeMap<String, ChannelMetadata>,
}

/// Shaped interval response for a single channel.
#[derive(Debug, Clone)]
pub struct IntervalResult {
    pub data: Series,
    pub disconnects: Vec<DisconnectEvent>,
    /// Everything the response carried besides "data".
    pub metadata: BTreeMap<String, Json>,
}

/// Shaped point response: the archived event nearest the requested time.
#[derive(Debug, Clone)]
pub struct PointResult {
    pub event: Option<PointEvent>,
    pub metadata: ChannelMetadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointEvent {
    pub timestamp: NaiveDateTime,
    /// None when the nearest event was a non-update marker.
    pub value: Option<Value>,
    /// Event text for non-update markers.
    pub text: Option<String>,
}

/// Shaped mystats response: per channel, one entry per bin.
#[derive(Debug, Clone)]
pub struct StatsResult {
    pub data: BTreeMap<String, Vec<StatsBin>>,
    pub metadata: BTreeMap<String, ChannelMetadata>,
}

/// Statistics for one bin: duration, eventCount, integration, max, mean,
/// min, rms, stdev, updateCount - whatever the server computed. Null
/// metrics (empty bins) are None.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsBin {
    pub begin: NaiveDateTime,
    pub metrics: BTreeMap<String, Option<f64>>,
}

// ---------------------------------------------------------------------------
// Wire representation

#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub(crate) enum WireTime {
    Millis(i64),
    Text(String),
}

#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub(crate) enum WireValue {
    Number(f64),
    Text(String),
    Vector(Vec<Json>),
}

#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub(crate) enum WireEvent {
    Update { d: WireTime, v: WireValue },
    NonUpdate { d: WireTime, t: String },
}

#[derive(Deserialize, Debug)]
pub(crate) struct WireSampler {
    pub channels: BTreeMap<String, WireChannel>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct WireChannel {
    pub metadata: ChannelMetadata,
    pub data: Vec<WireEvent>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct WireInterval {
    pub data: Vec<WireEvent>,
    #[serde(flatten)]
    pub metadata: BTreeMap<String, Json>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct WirePoint {
    #[serde(default)]
    pub data: Option<WireEvent>,
    #[serde(flatten)]
    pub metadata: ChannelMetadata,
}

#[derive(Deserialize, Debug)]
pub(crate) struct WireStats {
    pub channels: BTreeMap<String, WireStatsChannel>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct WireStatsChannel {
    pub metadata: ChannelMetadata,
    pub data: Vec<WireStatsBin>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct WireStatsBin {
    pub begin: WireTime,
    #[serde(flatten)]
    pub metrics: BTreeMap<String, Json>,
}

// ---------------------------------------------------------------------------
// Conversions

pub(crate) fn parse_wire_time(time: &WireTime) -> Result<NaiveDateTime> {
    match time {
        WireTime::Millis(ms) => chrono::DateTime::from_timestamp_millis(*ms)
            .map(|dt| dt.naive_utc())
            .ok_or_else(|| {
                MyqueryError::MalformedResponse(format!("timestamp out of range: {ms}"))
            }),
        WireTime::Text(text) => {
            for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
                if let Ok(ts) = NaiveDateTime::parse_from_str(text, fmt) {
                    return Ok(ts);
                }
            }
            // mystats bin boundaries can come back as bare dates
            if let Ok(date) = chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d") {
                if let Some(ts) = date.and_hms_opt(0, 0, 0) {
                    return Ok(ts);
                }
            }
            Err(MyqueryError::MalformedResponse(format!(
                "unparseable timestamp '{text}'"
            )))
        }
    }
}

fn is_integer_datatype(datatype: &str, enums_as_strings: bool) -> bool {
    match datatype {
        "DBR_SHORT" | "DBR_LONG" => true,
        "DBR_ENUM" => !enums_as_strings,
        _ => false,
    }
}

fn is_float_datatype(datatype: &str) -> bool {
    matches!(datatype, "DBR_DOUBLE" | "DBR_FLOAT")
}

fn element_as_f64(element: &Json) -> Result<f64> {
    match element {
        Json::Number(n) => n.as_f64().ok_or_else(|| {
            MyqueryError::MalformedResponse(format!("non-finite vector element: {n}"))
        }),
        Json::String(s) => s.trim().parse::<f64>().map_err(|_| {
            MyqueryError::MalformedResponse(format!("expected float vector element, got '{s}'"))
        }),
        other => Err(MyqueryError::MalformedResponse(format!(
            "expected numeric vector element, got {other}"
        ))),
    }
}

fn element_as_i64(element: &Json) -> Result<i64> {
    match element {
        Json::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| {
                MyqueryError::MalformedResponse(format!("non-integer vector element: {n}"))
            }),
        Json::String(s) => s.trim().parse::<i64>().map_err(|_| {
            MyqueryError::MalformedResponse(format!("expected integer vector element, got '{s}'"))
        }),
        other => Err(MyqueryError::MalformedResponse(format!(
            "expected numeric vector element, got {other}"
        ))),
    }
}

fn element_as_string(element: &Json) -> String {
    match element {
        Json::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Convert a wire value to a typed [`Value`] using the channel's metadata.
///
/// Scalars pass through with integer datatypes narrowed to [`Value::Int`].
/// Vector PVs arrive as arrays of strings and are converted by datatype;
/// unknown datatypes stay text.
pub(crate) fn convert_value(
    raw: &WireValue,
    datatype: &str,
    datasize: u32,
    enums_as_strings: bool,
) -> Result<Value> {
    if datasize <= 1 {
        return match raw {
            WireValue::Number(n) => {
                if is_integer_datatype(datatype, enums_as_strings) {
                    Ok(Value::Int(*n as i64))
                } else {
                    Ok(Value::Float(*n))
                }
            }
            WireValue::Text(s) => Ok(Value::Text(s.clone())),
            WireValue::Vector(_) => Err(MyqueryError::MalformedResponse(format!(
                "scalar channel ({datatype}) returned a vector value"
            ))),
        };
    }

    let WireValue::Vector(elements) = raw else {
        return Err(MyqueryError::MalformedResponse(format!(
            "vector channel ({datatype}, datasize {datasize}) returned a scalar value"
        )));
    };

    if is_float_datatype(datatype) {
        let parsed = elements.iter().map(element_as_f64).collect::<Result<_>>()?;
        Ok(Value::FloatArray(parsed))
    } else if is_integer_datatype(datatype, enums_as_strings) {
        let parsed = elements.iter().map(element_as_i64).collect::<Result<_>>()?;
        Ok(Value::IntArray(parsed))
    } else {
        Ok(Value::TextArray(elements.iter().map(element_as_string).collect()))
    }
}

// ---------------------------------------------------------------------------
// Response parsers. Pure string-to-result functions so response shaping is
// testable without a server.

/// Parse a mysampler response body into a [`SamplerResult`].
///
/// Every requested channel must appear in the response, and all channels
/// must carry the same samples at the same timestamps; anything else is
/// malformed rather than silently-misaligned data. Columns follow the order
/// of `pvlist`.
pub fn parse_sampler(
    body: &str,
    pvlist: &[String],
    enums_as_strings: bool,
) -> Result<SamplerResult> {
    let wire: WireSampler = serde_json::from_str(body)?;

    let mut index: Vec<NaiveDateTime> = Vec::new();
    let mut columns: Vec<(String, Vec<Option<Value>>)> = Vec::new();
    let mut disconnects = BTreeMap::new();
    let mut metadata = BTreeMap::new();

    for (position, pv) in pvlist.iter().enumerate() {
        let channel = wire.channels.get(pv).ok_or_else(|| {
            MyqueryError::MalformedResponse(format!("channel {pv} missing from response"))
        })?;

        let mut values = Vec::with_capacity(channel.data.len());
        let mut channel_disconnects = Vec::new();

        for event in &channel.data {
            let ts = match event {
                WireEvent::Update { d, .. } | WireEvent::NonUpdate { d, .. } => parse_wire_time(d)?,
            };
            // The first channel defines the index; the rest must line up
            // with it row for row, since the join is positional.
            if position == 0 {
                index.push(ts);
            } else if index.get(values.len()) != Some(&ts) {
                return Err(MyqueryError::MalformedResponse(format!(
                    "channel {pv} sample at {ts} does not match the sample index"
                )));
            }

            match event {
                WireEvent::Update { v, .. } => {
                    values.push(Some(convert_value(
                        v,
                        &channel.metadata.datatype,
                        channel.metadata.datasize,
                        enums_as_strings,
                    )?));
                }
                WireEvent::NonUpdate { t, .. } => {
                    values.push(None);
                    channel_disconnects.push(DisconnectEvent {
                        timestamp: ts,
                        text: t.clone(),
                    });
                }
            }
        }

        if values.len() != index.len() {
            return Err(MyqueryError::MalformedResponse(format!(
                "channel {pv} returned {} samples, expected {}",
                values.len(),
                index.len()
            )));
        }

        if !channel_disconnects.is_empty() {
            disconnects.insert(pv.clone(), channel_disconnects);
        }
        metadata.insert(pv.clone(), channel.metadata.clone());
        columns.push((pv.clone(), values));
    }

    Ok(SamplerResult {
        data: SampleTable::from_columns(index, columns)?,
        disconnects,
        metadata,
    })
}

/// Parse an interval response body into an [`IntervalResult`].
///
/// Non-update events stay in the series as empty values so the timeline is
/// complete, and are reported again in `disconnects`.
pub fn parse_interval(
    body: &str,
    channel: &str,
    enums_as_strings: bool,
) -> Result<IntervalResult> {
    let wire: WireInterval = serde_json::from_str(body)?;

    let datatype = wire
        .metadata
        .get("datatype")
        .and_then(Json::as_str)
        .ok_or_else(|| {
            MyqueryError::MalformedResponse("interval response missing datatype".to_string())
        })?
        .to_string();
    let datasize = wire
        .metadata
        .get("datasize")
        .and_then(Json::as_u64)
        .ok_or_else(|| {
            MyqueryError::MalformedResponse("interval response missing datasize".to_string())
        })? as u32;

    let mut timestamps = Vec::with_capacity(wire.data.len());
    let mut values = Vec::with_capacity(wire.data.len());
    let mut disconnects = Vec::new();

    for event in &wire.data {
        match event {
            WireEvent::Update { d, v } => {
                timestamps.push(parse_wire_time(d)?);
                values.push(Some(convert_value(v, &datatype, datasize, enums_as_strings)?));
            }
            WireEvent::NonUpdate { d, t } => {
                let ts = parse_wire_time(d)?;
                timestamps.push(ts);
                values.push(None);
                disconnects.push(DisconnectEvent {
                    timestamp: ts,
                    text: t.clone(),
                });
            }
        }
    }

    Ok(IntervalResult {
        data: Series::new(channel.to_string(), timestamps, values)?,
        disconnects,
        metadata: wire.metadata,
    })
}

/// Parse a point response body into a [`PointResult`].
pub fn parse_point(body: &str, enums_as_strings: bool) -> Result<PointResult> {
    let wire: WirePoint = serde_json::from_str(body)?;

    let event = match &wire.data {
        None => None,
        Some(WireEvent::Update { d, v }) => Some(PointEvent {
            timestamp: parse_wire_time(d)?,
            value: Some(convert_value(
                v,
                &wire.metadata.datatype,
                wire.metadata.datasize,
                enums_as_strings,
            )?),
            text: None,
        }),
        Some(WireEvent::NonUpdate { d, t }) => Some(PointEvent {
            timestamp: parse_wire_time(d)?,
            value: None,
            text: Some(t.clone()),
        }),
    };

    Ok(PointResult {
        event,
        metadata: wire.metadata,
    })
}

/// Parse a channel lookup response body into metadata records.
pub fn parse_channels(body: &str) -> Result<Vec<ChannelMetadata>> {
    let matches: Vec<ChannelMetadata> = serde_json::from_str(body)?;
    Ok(matches)
}

/// Parse a mystats response body into a [`StatsResult`].
pub fn parse_stats(body: &str) -> Result<StatsResult> {
    let wire: WireStats = serde_json::from_str(body)?;

    let mut data = BTreeMap::new();
    let mut metadata = BTreeMap::new();

    for (name, channel) in &wire.channels {
        let mut bins = Vec::with_capacity(channel.data.len());
        for bin in &channel.data {
            let mut metrics = BTreeMap::new();
            for (metric, value) in &bin.metrics {
                let value = match value {
                    Json::Null => None,
                    Json::Number(n) => Some(n.as_f64().ok_or_else(|| {
                        MyqueryError::MalformedResponse(format!(
                            "non-finite stat {metric} for {name}"
                        ))
                    })?),
                    other => {
                        return Err(MyqueryError::MalformedResponse(format!(
                            "non-numeric stat {metric} for {name}: {other}"
                        )));
                    }
                };
                metrics.insert(metric.clone(), value);
            }
            bins.push(StatsBin {
                begin: parse_wire_time(&bin.begin)?,
                metrics,
            });
        }
        data.insert(name.clone(), bins);
        metadata.insert(name.clone(), channel.metadata.clone());
    }

    Ok(StatsResult { data, metadata })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_parse_wire_time_text() {
        let parsed = parse_wire_time(&WireTime::Text("2018-04-24 11:18:19".to_string())).unwrap();
        assert_eq!(parsed, ts(2018, 4, 24, 11, 18, 19));
    }

    #[test]
    fn test_parse_wire_time_fractional() {
        let parsed =
            parse_wire_time(&WireTime::Text("2018-04-24 12:31:11.397".to_string())).unwrap();
        assert_eq!(
            parsed.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            "2018-04-24 12:31:11.397"
        );
    }

    #[test]
    fn test_parse_wire_time_millis() {
        // 2018-04-24 12:31:11.397 UTC
        let parsed = parse_wire_time(&WireTime::Millis(1524573071397)).unwrap();
        assert_eq!(
            parsed.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            "2018-04-24 12:31:11.397"
        );
    }

    #[test]
    fn test_parse_wire_time_bare_date() {
        let parsed = parse_wire_time(&WireTime::Text("2024-04-24".to_string())).unwrap();
        assert_eq!(parsed, ts(2024, 4, 24, 0, 0, 0));
    }

    #[test]
    fn test_parse_wire_time_garbage() {
        assert!(parse_wire_time(&WireTime::Text("not a time".to_string())).is_err());
    }

    #[test]
    fn test_wire_event_update_vs_nonupdate() {
        let update: WireEvent =
            serde_json::from_str(r#"{"d": "2018-04-24 11:18:19", "v": 5.66}"#).unwrap();
        assert!(matches!(update, WireEvent::Update { .. }));

        // interval marks non-update events with an extra "x" key
        let nonupdate: WireEvent = serde_json::from_str(
            r#"{"d": "2018-04-24 11:18:19", "t": "NETWORK_DISCONNECTION", "x": true}"#,
        )
        .unwrap();
        assert!(matches!(nonupdate, WireEvent::NonUpdate { .. }));

        let nonupdate: WireEvent =
            serde_json::from_str(r#"{"d": "2018-04-24 11:18:19", "t": "UNDEFINED"}"#).unwrap();
        assert!(matches!(nonupdate, WireEvent::NonUpdate { .. }));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Float(1.5).to_string(), "1.5");
        assert_eq!(Value::FloatArray(vec![1.5, 2.5]).to_string(), "1.5,2.5");
        assert_eq!(Value::Text("On".to_string()).to_string(), "On");
    }

    #[test]
    fn test_convert_scalar_values() {
        let v = convert_value(&WireValue::Number(5.66), "DBR_DOUBLE", 1, false).unwrap();
        assert_eq!(v, Value::Float(5.66));

        let v = convert_value(&WireValue::Number(3.0), "DBR_ENUM", 1, false).unwrap();
        assert_eq!(v, Value::Int(3));

        let v = convert_value(&WireValue::Text("On".to_string()), "DBR_ENUM", 1, true).unwrap();
        assert_eq!(v, Value::Text("On".to_string()));

        let v = convert_value(&WireValue::Number(7.0), "DBR_LONG", 1, false).unwrap();
        assert_eq!(v, Value::Int(7));
    }

    #[test]
    fn test_convert_vector_values() {
        let raw = WireValue::Vector(vec![Json::from("1.5"), Json::from("2.5")]);
        let v = convert_value(&raw, "DBR_DOUBLE", 2, false).unwrap();
        assert_eq!(v, Value::FloatArray(vec![1.5, 2.5]));

        let raw = WireValue::Vector(vec![Json::from("1"), Json::from("2")]);
        let v = convert_value(&raw, "DBR_SHORT", 2, false).unwrap();
        assert_eq!(v, Value::IntArray(vec![1, 2]));

        let raw = WireValue::Vector(vec![Json::from("a"), Json::from("b")]);
        let v = convert_value(&raw, "DBR_STRING", 2, false).unwrap();
        assert_eq!(v, Value::TextArray(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_convert_vector_rejects_bad_floats() {
        let raw = WireValue::Vector(vec![Json::from("1.5"), Json::from("oops")]);
        assert!(convert_value(&raw, "DBR_DOUBLE", 2, false).is_err());
    }

    #[test]
    fn test_convert_shape_mismatch() {
        assert!(convert_value(&WireValue::Number(1.0), "DBR_DOUBLE", 2, false).is_err());
        let raw = WireValue::Vector(vec![Json::from("1.0")]);
        assert!(convert_value(&raw, "DBR_DOUBLE", 1, false).is_err());
    }

    #[test]
    fn test_parse_point_update() {
        let body = r#"{"name": "channel100", "datatype": "DBR_DOUBLE", "datasize": 1,
                       "datahost": "mya", "data": {"d": "2018-04-24 11:18:19", "v": 5.66}}"#;
        let result = parse_point(body, false).unwrap();
        assert_eq!(result.metadata.name, "channel100");
        assert_eq!(result.metadata.datahost.as_deref(), Some("mya"));
        let event = result.event.unwrap();
        assert_eq!(event.timestamp, ts(2018, 4, 24, 11, 18, 19));
        assert_eq!(event.value, Some(Value::Float(5.66)));
        assert_eq!(event.text, None);
    }

    #[test]
    fn test_parse_channels() {
        let body = r#"[{"name": "channel1", "datatype": "DBR_DOUBLE", "datasize": 1,
                        "datahost": "mya", "ioc": null, "active": true}]"#;
        let matches = parse_channels(body).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "channel1");
        assert_eq!(matches[0].ioc, None);
        assert_eq!(matches[0].active, Some(true));
    }

    #[test]
    fn test_parse_interval_missing_metadata_is_malformed() {
        let body = r#"{"data": [{"d": "2018-04-24 11:18:19", "v": 5.66}]}"#;
        assert!(matches!(
            parse_interval(body, "channel100", false),
            Err(MyqueryError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_sampler_rejects_missing_channel() {
        let body = r#"{"channels": {}}"#;
        let pvlist = vec!["channel100".to_string()];
        assert!(matches!(
            parse_sampler(body, &pvlist, false),
            Err(MyqueryError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_sampler_rejects_mismatched_timestamps() {
        // equal sample counts, but channel b's row is at a different time
        let body = r#"{
            "channels": {
                "a": {
                    "metadata": {"name": "a", "datatype": "DBR_DOUBLE", "datasize": 1},
                    "data": [{"d": "2019-08-12 00:00:00", "v": 1.0}]
                },
                "b": {
                    "metadata": {"name": "b", "datatype": "DBR_DOUBLE", "datasize": 1},
                    "data": [{"d": "2019-08-12 00:05:00", "v": 2.0}]
                }
            }
        }"#;
        let pvlist = vec!["a".to_string(), "b".to_string()];
        assert!(matches!(
            parse_sampler(body, &pvlist, false),
            Err(MyqueryError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_sampler_rejects_truncated_json() {
        let body = r#"{"channels": {"channel100": {"metadata"#;
        let pvlist = vec!["channel100".to_string()];
        assert!(matches!(
            parse_sampler(body, &pvlist, false),
            Err(MyqueryError::Json(_))
        ));
    }
}
