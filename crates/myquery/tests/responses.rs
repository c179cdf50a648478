//! Parser tests against captured endpoint response bodies.

use chrono::NaiveDate;
use myquery::MyqueryError;
use myquery::models::{parse_channels, parse_interval, parse_point, parse_sampler, parse_stats};
use myquery::Value;

const MYSAMPLER_BODY: &str = include_str!("test_data/mysampler.json");
const INTERVAL_BODY: &str = include_str!("test_data/interval.json");
const POINT_BODY: &str = include_str!("test_data/point.json");
const CHANNEL_BODY: &str = include_str!("test_data/channel.json");
const MYSTATS_BODY: &str = include_str!("test_data/mystats.json");
const BROKEN_BODY: &str = include_str!("test_data/broken.json");

fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(h, mi, s)
        .unwrap()
}

#[test]
fn sampler_rows_and_columns() {
    let pvlist = vec!["channel100".to_string(), "channel101".to_string()];
    let result = parse_sampler(MYSAMPLER_BODY, &pvlist, false).unwrap();

    assert_eq!(result.data.num_rows(), 10);
    assert_eq!(result.data.num_columns(), 2);
    assert_eq!(result.data.index()[0], ts(2019, 8, 12, 0, 0, 0));
    assert_eq!(result.data.index()[9], ts(2019, 8, 12, 0, 9, 0));
    assert_eq!(
        result.data.value(9, "channel100"),
        Some(&Value::Float(5.72))
    );
}

#[test]
fn sampler_columns_follow_request_order() {
    let pvlist = vec!["channel101".to_string(), "channel100".to_string()];
    let result = parse_sampler(MYSAMPLER_BODY, &pvlist, false).unwrap();
    assert_eq!(result.data.columns(), ["channel101", "channel100"]);
}

#[test]
fn sampler_disconnects_leave_empty_cells() {
    let pvlist = vec!["channel100".to_string(), "channel101".to_string()];
    let result = parse_sampler(MYSAMPLER_BODY, &pvlist, false).unwrap();

    assert_eq!(result.data.value(3, "channel101"), None);
    assert!(!result.disconnects.contains_key("channel100"));
    let events = &result.disconnects["channel101"];
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].timestamp, ts(2019, 8, 12, 0, 3, 0));
    assert_eq!(events[0].text, "UNDEFINED");
}

#[test]
fn sampler_missing_channel_is_malformed() {
    let pvlist = vec!["channel100".to_string(), "channel999".to_string()];
    let err = parse_sampler(MYSAMPLER_BODY, &pvlist, false).unwrap_err();
    assert!(matches!(err, MyqueryError::MalformedResponse(_)));
}

#[test]
fn sampler_ragged_counts_are_malformed() {
    let body = r#"{
        "channels": {
            "a": {
                "metadata": {"name": "a", "datatype": "DBR_DOUBLE", "datasize": 1},
                "data": [{"d": "2019-08-12 00:00:00", "v": 1.0},
                         {"d": "2019-08-12 00:01:00", "v": 2.0}]
            },
            "b": {
                "metadata": {"name": "b", "datatype": "DBR_DOUBLE", "datasize": 1},
                "data": [{"d": "2019-08-12 00:00:00", "v": 3.0}]
            }
        }
    }"#;
    let pvlist = vec!["a".to_string(), "b".to_string()];
    let err = parse_sampler(body, &pvlist, false).unwrap_err();
    assert!(matches!(err, MyqueryError::MalformedResponse(_)));
}

#[test]
fn interval_events_and_metadata() {
    let result = parse_interval(INTERVAL_BODY, "channel100", false).unwrap();

    assert_eq!(result.data.name, "channel100");
    assert_eq!(result.data.len(), 5);
    assert_eq!(result.data.timestamps()[0], ts(2018, 4, 24, 12, 0, 0));
    assert_eq!(result.data.values()[1], Some(Value::Float(5.7)));
    assert_eq!(result.data.values()[2], None);

    assert_eq!(result.disconnects.len(), 1);
    assert_eq!(result.disconnects[0].text, "NETWORK_DISCONNECTION");

    assert_eq!(
        result.metadata.get("datatype").and_then(|v| v.as_str()),
        Some("DBR_DOUBLE")
    );
    assert_eq!(
        result.metadata.get("returnCount").and_then(|v| v.as_u64()),
        Some(5)
    );
}

#[test]
fn interval_missing_datatype_is_malformed() {
    let body = r#"{"name": "c", "data": [{"d": "2018-04-24 12:00:00", "v": 1.0}]}"#;
    let err = parse_interval(body, "c", false).unwrap_err();
    assert!(matches!(err, MyqueryError::MalformedResponse(_)));
}

#[test]
fn point_event_and_metadata() {
    let result = parse_point(POINT_BODY, false).unwrap();

    let event = result.event.unwrap();
    assert_eq!(event.timestamp, ts(2018, 4, 24, 11, 18, 19));
    assert_eq!(event.value, Some(Value::Float(5.66)));
    assert_eq!(event.text, None);
    assert_eq!(result.metadata.name, "channel100");
    assert_eq!(result.metadata.datasize, 1);
}

#[test]
fn point_without_event() {
    let body = r#"{"name": "channel100", "datatype": "DBR_DOUBLE", "datasize": 1}"#;
    let result = parse_point(body, false).unwrap();
    assert!(result.event.is_none());
}

#[test]
fn channel_matches() {
    let matches = parse_channels(CHANNEL_BODY).unwrap();

    assert_eq!(matches.len(), 3);
    assert_eq!(matches[0].name, "channel100");
    assert_eq!(matches[0].ioc.as_deref(), Some("ioc42"));
    assert_eq!(matches[2].datatype, "DBR_ENUM");
    assert_eq!(matches[2].active, Some(false));
}

#[test]
fn stats_bins_and_null_metrics() {
    let result = parse_stats(MYSTATS_BODY).unwrap();

    assert_eq!(result.data.len(), 2);
    let bins = &result.data["channel100"];
    assert_eq!(bins.len(), 2);
    assert_eq!(bins[0].begin, ts(2024, 4, 24, 0, 0, 0));
    assert_eq!(bins[0].metrics["max"], Some(5.72));
    assert_eq!(bins[0].metrics["duration"], Some(86400.0));
    assert_eq!(bins[1].metrics["mean"], None);
    assert_eq!(result.metadata["channel101"].datatype, "DBR_DOUBLE");
}

#[test]
fn truncated_body_is_a_json_error() {
    let pvlist = vec!["channel100".to_string()];
    let err = parse_sampler(BROKEN_BODY, &pvlist, false).unwrap_err();
    assert!(matches!(err, MyqueryError::Json(_)));
}
