//! Row-oriented tabular containers for shaped query results.
//!
//! A [`Series`] holds one channel's events; a [`SampleTable`] holds a shared
//! timestamp index with one typed column per channel. Empty cells mean the
//! channel had no value at that time (not yet archived, or disconnected).

use crate::error::{MyqueryError, Result};
use crate::models::Value;
use arrow_array::RecordBatch;
use chrono::NaiveDateTime;
use std::collections::BTreeSet;
use std::sync::Arc;

/// A single channel's history: parallel timestamp and value vectors.
/// `None` values are non-update events.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    timestamps: Vec<NaiveDateTime>,
    values: Vec<Option<Value>>,
}

impl Series {
    pub fn new(
        name: String,
        timestamps: Vec<NaiveDateTime>,
        values: Vec<Option<Value>>,
    ) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(MyqueryError::MalformedResponse(format!(
                "series {name} has {} timestamps but {} values",
                timestamps.len(),
                values.len()
            )));
        }
        Ok(Self {
            name,
            timestamps,
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn values(&self) -> &[Option<Value>] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDateTime, &Option<Value>)> {
        self.timestamps.iter().zip(self.values.iter())
    }
}

/// A table of samples: a shared chronological index and one column per
/// channel, all columns the same length as the index.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleTable {
    index: Vec<NaiveDateTime>,
    columns: Vec<String>,
    // column-major, one vector per entry of `columns`
    values: Vec<Vec<Option<Value>>>,
}

impl SampleTable {
    pub fn from_columns(
        index: Vec<NaiveDateTime>,
        columns: Vec<(String, Vec<Option<Value>>)>,
    ) -> Result<Self> {
        for (name, values) in &columns {
            if values.len() != index.len() {
                return Err(MyqueryError::MalformedResponse(format!(
                    "column {name} has {} values for {} rows",
                    values.len(),
                    index.len()
                )));
            }
        }
        let (names, values) = columns.into_iter().unzip();
        Ok(Self {
            index,
            columns: names,
            values,
        })
    }

    /// Join several single-channel series into one table on the union of
    /// their timestamps, in chronological order.
    ///
    /// Cells between a channel's events carry that channel's most recent
    /// event forward. A non-update event carries forward as an empty cell,
    /// so disconnected spans stay empty instead of being filled over; rows
    /// before a channel's first event are empty too. Each series must be
    /// chronological, which myquery responses are.
    pub fn from_series(series: &[Series]) -> Self {
        let mut union: BTreeSet<NaiveDateTime> = BTreeSet::new();
        for s in series {
            union.extend(s.timestamps.iter().copied());
        }
        let index: Vec<NaiveDateTime> = union.into_iter().collect();

        let mut columns = Vec::with_capacity(series.len());
        let mut values = Vec::with_capacity(series.len());

        for s in series {
            let mut column = Vec::with_capacity(index.len());
            let mut next = 0;
            let mut last: Option<Value> = None;
            for ts in &index {
                while next < s.timestamps.len() && s.timestamps[next] <= *ts {
                    last = s.values[next].clone();
                    next += 1;
                }
                column.push(last.clone());
            }
            columns.push(s.name.clone());
            values.push(column);
        }

        Self {
            index,
            columns,
            values,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.index.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn index(&self) -> &[NaiveDateTime] {
        &self.index
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&[Option<Value>]> {
        let position = self.columns.iter().position(|c| c == name)?;
        Some(&self.values[position])
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        self.column(column)?.get(row)?.as_ref()
    }

    /// Convert the table to an Arrow record batch: a non-null UTC timestamp
    /// column plus one nullable column per channel. Columns whose values are
    /// all numeric become Float64; everything else becomes Utf8 via the
    /// value's text rendering.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        use arrow_array::Array;
        use arrow_array::builder::{Float64Builder, StringBuilder, TimestampSecondBuilder};
        use arrow_schema::{DataType, Field, Schema, TimeUnit};

        let mut fields = vec![Arc::new(Field::new(
            "timestamp",
            DataType::Timestamp(TimeUnit::Second, Some("+00:00".into())),
            false,
        ))];
        let mut arrays: Vec<Arc<dyn Array>> = Vec::with_capacity(self.columns.len() + 1);

        let mut timestamp_builder = TimestampSecondBuilder::new();
        for ts in &self.index {
            timestamp_builder.append_value(ts.and_utc().timestamp());
        }
        arrays.push(Arc::new(
            timestamp_builder.finish().with_timezone_opt(Some("+00:00")),
        ));

        for (name, column) in self.columns.iter().zip(self.values.iter()) {
            let numeric = column
                .iter()
                .flatten()
                .all(|value| value.as_f64().is_some());

            if numeric {
                let mut builder = Float64Builder::new();
                for value in column {
                    match value.as_ref().and_then(Value::as_f64) {
                        Some(v) => builder.append_value(v),
                        None => builder.append_null(),
                    }
                }
                fields.push(Arc::new(Field::new(name, DataType::Float64, true)));
                arrays.push(Arc::new(builder.finish()));
            } else {
                let mut builder = StringBuilder::new();
                for value in column {
                    match value {
                        Some(v) => builder.append_value(v.to_string()),
                        None => builder.append_null(),
                    }
                }
                fields.push(Arc::new(Field::new(name, DataType::Utf8, true)));
                arrays.push(Arc::new(builder.finish()));
            }
        }

        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?;
        Ok(batch)
    }
}
