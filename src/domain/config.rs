//! The `RssConfig` domain type: the single row of live-tunable engine state.
//!
//! The engine holds exactly one row at all times (seeded by migration); there
//! is no `id` exposed outside this module because callers never select by it.

use diesel::pg::data_types::PgInterval;
use diesel::prelude::*;
use std::time::Duration;

use crate::schema::config;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = config)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RssConfig {
    pub id: i32,
    pub run: bool,
    pub worker_count: i32,
    pub timer_interval: PgInterval,
}

impl RssConfig {
    pub fn poll_period(&self) -> Duration {
        pg_interval_to_duration(&self.timer_interval)
    }
}

/// `PgInterval` only carries months/days/microseconds; the engine only ever
/// writes whole-second intervals, so months and days are ignored on read.
pub fn pg_interval_to_duration(interval: &PgInterval) -> Duration {
    let days_as_micros = i64::from(interval.days) * 24 * 60 * 60 * 1_000_000;
    let total_micros = interval.microseconds + days_as_micros;
    Duration::from_micros(total_micros.max(0) as u64)
}

pub fn duration_to_pg_interval(duration: Duration) -> PgInterval {
    PgInterval {
        months: 0,
        days: 0,
        microseconds: duration.as_micros() as i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_whole_second_intervals() {
        let duration = Duration::from_secs(300);
        let interval = duration_to_pg_interval(duration);
        assert_eq!(pg_interval_to_duration(&interval), duration);
    }
}
