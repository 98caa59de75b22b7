use chrono::{Duration, NaiveDate};
use taghist_types::{EntryKey, Period};

use crate::error::{HistorError, HistorResult};

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Assign the enclosing period bucket for a bucket key.
///
/// `capacity` is the number of entries one bucket holds (the owner group's
/// `numberOfValuesInDoc`), at one entry per day. The key's day index since
/// the epoch is divided into aligned `capacity`-day windows, so every key
/// inside one window maps to the same `[start, end]` bounds — a pure
/// function of its inputs with no wall-clock involvement, which is what
/// lets concurrent writers converge on identical period boundaries.
pub fn assign_period(bucket_key: &EntryKey, capacity: u32) -> HistorResult<Period> {
    if capacity == 0 {
        return Err(HistorError::Validation {
            field: "numberOfValuesInDoc",
            reason: "bucket capacity must be positive".into(),
        });
    }
    let day = parse_day(bucket_key)?;
    let epoch = NaiveDate::default();
    let cap = i64::from(capacity);
    let bucket = day.signed_duration_since(epoch).num_days().div_euclid(cap);
    let start = epoch + Duration::days(bucket * cap);
    let end = epoch + Duration::days(bucket * cap + cap - 1);
    Ok(Period::new(
        start.format(DAY_FORMAT).to_string(),
        end.format(DAY_FORMAT).to_string(),
    ))
}

fn parse_day(key: &EntryKey) -> HistorResult<NaiveDate> {
    NaiveDate::parse_from_str(key.day_prefix(), DAY_FORMAT).map_err(|e| {
        HistorError::Validation {
            field: "storeStart",
            reason: format!("bucket key `{key}` has no leading YYYY-MM-DD date: {e}"),
        }
    })
}
