use crate::errors::StoreError;
use crate::models::{
    CompletionRecord, DailyProgress, DateKey, HourKey, HourSlot, HourStatus, HourWindow,
};
use crate::storage::{KeyValueMedium, PersistentStore};
use chrono::{NaiveDateTime, Timelike};
use tracing::{debug, error, info, warn};

/// Result of a toggle: the new flag, and the save failure if there was one.
/// The in-memory flip stands either way.
#[derive(Debug)]
pub struct ToggleOutcome {
    pub completed: bool,
    pub save_error: Option<StoreError>,
}

impl ToggleOutcome {
    pub fn persisted(&self) -> bool {
        self.save_error.is_none()
    }
}

/// Owns the in-memory completion record and keeps the store in step with it.
#[derive(Debug)]
pub struct CompletionTracker<M> {
    store: PersistentStore<M>,
    record: CompletionRecord,
    initialized: bool,
}

impl<M: KeyValueMedium> CompletionTracker<M> {
    pub fn new(store: PersistentStore<M>) -> Self {
        Self {
            store,
            record: CompletionRecord::default(),
            initialized: false,
        }
    }

    /// Loads the stored record. Unreadable or corrupt data is logged and
    /// replaced by an empty record.
    pub async fn initialize(&mut self) {
        if self.initialized {
            debug!("tracker already initialized");
            return;
        }

        self.record = match self.store.load().await {
            Ok(record) => {
                info!(days = record.day_count(), "loaded completion record");
                record
            }
            Err(err) => {
                error!("failed to load completion record, starting empty: {err}");
                CompletionRecord::default()
            }
        };
        self.initialized = true;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn record(&self) -> &CompletionRecord {
        &self.record
    }

    pub fn is_completed(&self, date: DateKey, hour: HourKey) -> bool {
        self.record.get(date, hour)
    }

    /// Flips one hour and writes the full record back.
    pub async fn toggle(&mut self, date: DateKey, hour: HourKey) -> ToggleOutcome {
        let completed = self.record.flip(date, hour);
        let save_error = match self.store.save(&self.record).await {
            Ok(()) => None,
            Err(err) => {
                warn!(%date, %hour, "toggle kept in memory but not persisted: {err}");
                Some(err)
            }
        };

        ToggleOutcome {
            completed,
            save_error,
        }
    }

    pub fn classify_hour(&self, date: DateKey, hour: HourKey, now_hour: i32) -> HourStatus {
        classify(self.is_completed(date, hour), hour, now_hour)
    }

    pub fn daily_progress(&self, date: DateKey, window: &HourWindow, now_hour: i32) -> DailyProgress {
        let statuses = window.hours().map(|hour| self.classify_hour(date, hour, now_hour));
        progress_of(statuses)
    }

    pub fn hour_slots(&self, date: DateKey, window: &HourWindow, now_hour: i32) -> Vec<HourSlot> {
        window
            .hours()
            .map(|hour| HourSlot {
                hour,
                label: hour.label(),
                status: self.classify_hour(date, hour, now_hour),
            })
            .collect()
    }
}

/// Classifies one hour against the current hour.
///
/// Future hours are never completed or missed; `completed` can only
/// coexist with `is_current`.
pub fn classify(completed: bool, hour: HourKey, now_hour: i32) -> HourStatus {
    let hour = i32::from(hour.hour());
    let is_future = hour > now_hour;
    let completed = completed && !is_future;
    HourStatus {
        completed,
        missed: hour < now_hour && !completed,
        is_current: hour == now_hour,
        is_future,
    }
}

fn progress_of(statuses: impl Iterator<Item = HourStatus>) -> DailyProgress {
    let (completed_count, available_count) = statuses
        .filter(|status| !status.is_future)
        .fold((0usize, 0usize), |(done, available), status| {
            (done + usize::from(status.completed), available + 1)
        });

    let percent = if available_count == 0 {
        0
    } else {
        (completed_count * 100 / available_count) as u8
    };

    DailyProgress {
        completed_count,
        available_count,
        percent,
    }
}

/// The hour `date` is classified against at wall-clock time `now`.
///
/// Today uses the current hour. Earlier days report 24 so every hour has
/// passed; later days report -1 so every hour is still ahead.
pub fn reference_hour(date: DateKey, now: NaiveDateTime) -> i32 {
    let today = now.date();
    match date.date().cmp(&today) {
        std::cmp::Ordering::Equal => now.hour() as i32,
        std::cmp::Ordering::Less => 24,
        std::cmp::Ordering::Greater => -1,
    }
}
