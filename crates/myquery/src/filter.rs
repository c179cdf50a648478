//! Helpers for turning shaped series into downtime intervals.
//!
//! A channel is "down" from a non-update event until its next update. These
//! functions derive those spans, merge them, and combine them across
//! channels, which is how archiver users compute outage windows.

use crate::table::Series;
use chrono::NaiveDateTime;

/// A span during which one channel had no data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownInterval {
    pub channel: String,
    pub begin: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Derive the down-state intervals of a series.
///
/// An interval opens at a non-update event and closes at the channel's next
/// update. Both edges are clamped to the queried range: a disconnection
/// already in effect at `range_begin` (a prior-point event) starts there,
/// and one still open at the end of the series closes at `range_end`.
/// Intervals entirely outside the range are dropped, so every reported
/// interval falls inside the requested time range.
pub fn down_state_intervals(
    series: &Series,
    range_begin: NaiveDateTime,
    range_end: NaiveDateTime,
) -> Vec<DownInterval> {
    let mut intervals = Vec::new();
    let mut open: Option<NaiveDateTime> = None;

    for (ts, value) in series.iter() {
        match (value, open) {
            (None, None) => open = Some(*ts),
            (Some(_), Some(begin)) => {
                intervals.extend(clamped(&series.name, begin, *ts, range_begin, range_end));
                open = None;
            }
            _ => {}
        }
    }

    if let Some(begin) = open {
        intervals.extend(clamped(&series.name, begin, range_end, range_begin, range_end));
    }

    intervals
}

fn clamped(
    channel: &str,
    begin: NaiveDateTime,
    end: NaiveDateTime,
    range_begin: NaiveDateTime,
    range_end: NaiveDateTime,
) -> Option<DownInterval> {
    let begin = begin.max(range_begin);
    let end = end.min(range_end);
    (begin <= end).then(|| DownInterval {
        channel: channel.to_string(),
        begin,
        end,
    })
}

/// Merge overlapping or touching intervals into a minimal disjoint set,
/// sorted by start time.
pub fn collapse_overlapping_intervals(
    intervals: &[(NaiveDateTime, NaiveDateTime)],
) -> Vec<(NaiveDateTime, NaiveDateTime)> {
    let mut sorted: Vec<_> = intervals
        .iter()
        .copied()
        .filter(|(begin, end)| begin <= end)
        .collect();
    sorted.sort();

    let mut collapsed: Vec<(NaiveDateTime, NaiveDateTime)> = Vec::new();
    for (begin, end) in sorted {
        match collapsed.last_mut() {
            Some((_, last_end)) if begin <= *last_end => {
                if end > *last_end {
                    *last_end = end;
                }
            }
            _ => collapsed.push((begin, end)),
        }
    }
    collapsed
}

/// Does `interval` overlap (or touch) any interval in `others`?
pub fn interval_overlap_any(
    interval: (NaiveDateTime, NaiveDateTime),
    others: &[(NaiveDateTime, NaiveDateTime)],
) -> bool {
    others
        .iter()
        .any(|(begin, end)| interval.0 <= *end && *begin <= interval.1)
}

/// Down-state intervals across several channels, merged into the spans
/// where at least one channel was down.
pub fn combined_down_state_intervals(
    series: &[Series],
    range_begin: NaiveDateTime,
    range_end: NaiveDateTime,
) -> Vec<(NaiveDateTime, NaiveDateTime)> {
    let spans: Vec<_> = series
        .iter()
        .flat_map(|s| down_state_intervals(s, range_begin, range_end))
        .map(|iv| (iv.begin, iv.end))
        .collect();
    collapse_overlapping_intervals(&spans)
}

/// Drop consecutive repeated values, keeping the first sample of each run.
/// Runs of empty values collapse the same way.
pub fn remove_repeat_values(series: &Series) -> Series {
    let mut timestamps = Vec::new();
    let mut values = Vec::new();

    for (ts, value) in series.iter() {
        if values.last() != Some(value) {
            timestamps.push(*ts);
            values.push(value.clone());
        }
    }

    // Lengths match by construction.
    Series::new(series.name.clone(), timestamps, values)
        .unwrap_or_else(|_| series.clone())
}
