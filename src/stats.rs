use crate::models::{CompletionRecord, DailyPoint, DateKey, HistoryResponse, HourWindow};
use crate::tracker::{classify, reference_hour};
use chrono::{Duration, NaiveDateTime};

/// Completed-hour counts for the seven days ending on `now`'s date, oldest
/// first. Hours outside the window, and hours of today that have not come
/// yet, are not counted.
pub fn build_history_at(
    now: NaiveDateTime,
    record: &CompletionRecord,
    window: &HourWindow,
) -> HistoryResponse {
    let today = now.date();
    let mut last_7_days = Vec::with_capacity(7);
    for offset in (0..7).rev() {
        let date = DateKey::new(today - Duration::days(offset));
        let now_hour = reference_hour(date, now);
        let completed_count = record
            .completed_on(date)
            .filter(|hour| window.contains(*hour))
            .filter(|hour| classify(true, *hour, now_hour).completed)
            .count();
        last_7_days.push(DailyPoint {
            date,
            completed_count,
            window_size: window.hour_count(),
        });
    }

    HistoryResponse { last_7_days }
}
