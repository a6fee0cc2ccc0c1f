//! Group-by-mean aggregation: coerce a value column to numeric, partition by a
//! key column, and rank the per-group means.

use polars::prelude::*;
use thiserror::Error;

const KEY_COLUMN: &str = "group_key";
const VALUE_COLUMN: &str = "group_value";
const MEAN_COLUMN: &str = "mean_value";
const COUNT_COLUMN: &str = "value_count";

/// Errors from a single aggregation call. A missing column fails that call
/// only; unparsable values never fail (they become missing instead).
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("column '{0}' not found in table")]
    ColumnNotFound(String),
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// Which side of the (key, mean) pair to order by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SortKey {
    #[serde(rename = "key")]
    GroupKey,
    #[serde(rename = "value")]
    AggregateValue,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Ordering requested for a ranked result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn by_key(direction: SortDirection) -> Self {
        Self {
            key: SortKey::GroupKey,
            direction,
        }
    }

    pub fn by_value(direction: SortDirection) -> Self {
        Self {
            key: SortKey::AggregateValue,
            direction,
        }
    }
}

/// A distinct value of the group-by column. Numeric key columns keep their
/// numeric identity so line charts can place them on a continuous axis.
#[derive(Clone, Debug, PartialEq)]
pub enum GroupKey {
    Text(String),
    Number(f64),
}

impl GroupKey {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            GroupKey::Number(v) => Some(*v),
            GroupKey::Text(_) => None,
        }
    }

    /// Axis-label rendering: whole numbers without a decimal point.
    pub fn label(&self) -> String {
        match self {
            GroupKey::Text(s) => s.clone(),
            GroupKey::Number(v) => {
                if (v - v.round()).abs() < 1e-10 && v.abs() < 1e15 {
                    format!("{:.0}", v)
                } else {
                    format!("{}", v)
                }
            }
        }
    }
}

/// One group: key, arithmetic mean of the non-missing values, and how many
/// non-missing values contributed.
#[derive(Clone, Debug, PartialEq)]
pub struct AggregatedRow {
    pub key: GroupKey,
    pub mean: f64,
    pub count: u64,
}

/// Sorted, optionally truncated sequence of aggregated rows, tagged with the
/// column names it was derived from (used for default axis labels).
#[derive(Clone, Debug, PartialEq)]
pub struct RankedResult {
    pub group_column: String,
    pub value_column: String,
    pub rows: Vec<AggregatedRow>,
}

impl RankedResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Best-effort numeric interpretation of a textual value. Empty strings,
/// non-numeric tokens, and non-finite spellings ("NaN", "inf") are missing.
pub fn parse_numeric(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn is_numeric_type(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Coerce a column to Float64. Total: every value either becomes its numeric
/// interpretation or null, never an error for the column as a whole.
/// Idempotent, and leaves the source series untouched.
pub fn coerce_numeric(series: &Series) -> PolarsResult<Series> {
    let name = series.name().clone();
    let coerced: Float64Chunked = match series.dtype() {
        DataType::String => {
            let values = series.str()?;
            values
                .into_iter()
                .map(|value| value.and_then(parse_numeric))
                .collect()
        }
        dtype if is_numeric_type(dtype) => {
            let cast = series.cast(&DataType::Float64)?;
            let values = cast.f64()?;
            values
                .into_iter()
                .map(|value| value.filter(|v| v.is_finite()))
                .collect()
        }
        _ => {
            // Booleans, temporal types, and anything else: render to text and
            // apply the same permissive parse.
            let cast = series.cast(&DataType::String)?;
            let values = cast.str()?;
            values
                .into_iter()
                .map(|value| value.and_then(parse_numeric))
                .collect()
        }
    };
    Ok(coerced.with_name(name).into_series())
}

fn extract_keys(column: &Column) -> Result<Vec<GroupKey>, AggregateError> {
    let series = column.as_materialized_series();
    match series.dtype() {
        dtype if is_numeric_type(dtype) => {
            let cast = series.cast(&DataType::Float64)?;
            let values = cast.f64()?;
            Ok(values
                .into_iter()
                .map(|v| GroupKey::Number(v.unwrap_or(f64::NAN)))
                .collect())
        }
        DataType::String => {
            let values = series.str()?;
            Ok(values
                .into_iter()
                .map(|v| GroupKey::Text(v.unwrap_or("").to_string()))
                .collect())
        }
        _ => {
            let cast = series.cast(&DataType::String)?;
            let values = cast.str()?;
            Ok(values
                .into_iter()
                .map(|v| GroupKey::Text(v.unwrap_or("").to_string()))
                .collect())
        }
    }
}

/// Mean of `value` per distinct `group_by` key, ordered and truncated.
///
/// Rows with a missing group key are excluded before grouping, and groups
/// whose values are all missing are dropped rather than emitted as NaN. Ties
/// under the requested ordering keep the keys' first-occurrence order from the
/// table. The input frame is never modified; coercion happens on a derived
/// copy of the value column.
pub fn aggregate(
    df: &DataFrame,
    group_by: &str,
    value: &str,
    sort: SortSpec,
    limit: Option<usize>,
) -> Result<RankedResult, AggregateError> {
    let key_column = df
        .column(group_by)
        .map_err(|_| AggregateError::ColumnNotFound(group_by.to_string()))?;
    let value_column = df
        .column(value)
        .map_err(|_| AggregateError::ColumnNotFound(value.to_string()))?;

    let keys = key_column
        .as_materialized_series()
        .clone()
        .with_name(KEY_COLUMN.into());
    let values =
        coerce_numeric(value_column.as_materialized_series())?.with_name(VALUE_COLUMN.into());
    let working = DataFrame::new(vec![keys.into(), values.into()])?;

    let sort_column = match sort.key {
        SortKey::GroupKey => KEY_COLUMN,
        SortKey::AggregateValue => MEAN_COLUMN,
    };
    let descending = sort.direction == SortDirection::Descending;

    let grouped = working
        .lazy()
        .filter(col(KEY_COLUMN).is_not_null())
        .group_by_stable([col(KEY_COLUMN)])
        .agg([
            col(VALUE_COLUMN).mean().alias(MEAN_COLUMN),
            col(VALUE_COLUMN).count().alias(COUNT_COLUMN),
        ])
        .filter(col(MEAN_COLUMN).is_not_null())
        .sort(
            [sort_column],
            SortMultipleOptions::default()
                .with_order_descending(descending)
                .with_maintain_order(true),
        )
        .collect()?;

    let grouped = match limit {
        Some(n) => grouped.head(Some(n)),
        None => grouped,
    };

    let keys = extract_keys(grouped.column(KEY_COLUMN)?)?;
    let means = grouped.column(MEAN_COLUMN)?.f64()?;
    let counts = grouped.column(COUNT_COLUMN)?.cast(&DataType::UInt64)?;
    let counts = counts.u64()?;

    let rows = keys
        .into_iter()
        .zip(means.into_iter())
        .zip(counts.into_iter())
        .map(|((key, mean), count)| AggregatedRow {
            key,
            mean: mean.unwrap_or(f64::NAN),
            count: count.unwrap_or(0),
        })
        .collect();

    Ok(RankedResult {
        group_column: group_by.to_string(),
        value_column: value.to_string(),
        rows,
    })
}
