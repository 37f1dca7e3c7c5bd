use crate::errors::ConfigError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A calendar day in canonical `YYYY-MM-DD` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DateKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|err| format!("invalid date key {s:?}: {err}"))?;
        let key = Self(date);
        // chrono accepts unpadded fields; only the canonical spelling is a key.
        if key.to_string() != s {
            return Err(format!("date key {s:?} is not in YYYY-MM-DD form"));
        }
        Ok(key)
    }
}

impl TryFrom<String> for DateKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DateKey> for String {
    fn from(key: DateKey) -> Self {
        key.to_string()
    }
}

/// One hour slot of a day, spelled `HH:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HourKey(u8);

impl HourKey {
    pub fn new(hour: u32) -> Option<Self> {
        (hour < 24).then_some(Self(hour as u8))
    }

    pub fn hour(&self) -> u8 {
        self.0
    }

    /// 12-hour clock label, e.g. `10AM`, `12PM`, `6PM`.
    pub fn label(&self) -> String {
        let suffix = if self.0 >= 12 { "PM" } else { "AM" };
        let hour = match self.0 % 12 {
            0 => 12,
            h => h,
        };
        format!("{hour}{suffix}")
    }
}

impl fmt::Display for HourKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00", self.0)
    }
}

impl FromStr for HourKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("invalid hour key {s:?}, expected HH:00");
        let digits = s.strip_suffix(":00").ok_or_else(invalid)?;
        if digits.len() != 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let hour: u32 = digits.parse().map_err(|_| invalid())?;
        Self::new(hour).ok_or_else(invalid)
    }
}

impl TryFrom<String> for HourKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HourKey> for String {
    fn from(key: HourKey) -> Self {
        key.to_string()
    }
}

/// Inclusive range of tracked hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourWindow {
    start: u8,
    end: u8,
}

impl HourWindow {
    pub fn new(start: u32, end: u32) -> Result<Self, ConfigError> {
        let start_key = HourKey::new(start).ok_or(ConfigError::HourOutOfRange(start))?;
        let end_key = HourKey::new(end).ok_or(ConfigError::HourOutOfRange(end))?;
        if start_key > end_key {
            return Err(ConfigError::InvertedWindow {
                start: start_key.hour(),
                end: end_key.hour(),
            });
        }
        Ok(Self {
            start: start_key.hour(),
            end: end_key.hour(),
        })
    }

    pub fn start(&self) -> u8 {
        self.start
    }

    pub fn end(&self) -> u8 {
        self.end
    }

    pub fn contains(&self, hour: HourKey) -> bool {
        (self.start..=self.end).contains(&hour.hour())
    }

    pub fn hours(&self) -> impl Iterator<Item = HourKey> + '_ {
        (self.start..=self.end).map(HourKey)
    }

    pub fn hour_count(&self) -> usize {
        usize::from(self.end - self.start) + 1
    }
}

impl Default for HourWindow {
    fn default() -> Self {
        Self { start: 10, end: 18 }
    }
}

/// Per-day, per-hour completion flags. Missing entries read as `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CompletionRecord {
    days: BTreeMap<DateKey, BTreeMap<HourKey, bool>>,
}

impl CompletionRecord {
    pub fn get(&self, date: DateKey, hour: HourKey) -> bool {
        self.days
            .get(&date)
            .and_then(|hours| hours.get(&hour))
            .copied()
            .unwrap_or(false)
    }

    pub fn set(&mut self, date: DateKey, hour: HourKey, value: bool) {
        self.days.entry(date).or_default().insert(hour, value);
    }

    /// Flips one flag and returns the new value.
    pub fn flip(&mut self, date: DateKey, hour: HourKey) -> bool {
        let slot = self.days.entry(date).or_default().entry(hour).or_insert(false);
        *slot = !*slot;
        *slot
    }

    pub fn completed_on(&self, date: DateKey) -> impl Iterator<Item = HourKey> + '_ {
        self.days
            .get(&date)
            .into_iter()
            .flat_map(|hours| hours.iter().filter(|(_, done)| **done).map(|(hour, _)| *hour))
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn day_count(&self) -> usize {
        self.days.len()
    }
}

/// Time-relative state of one hour slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourStatus {
    pub completed: bool,
    pub missed: bool,
    pub is_current: bool,
    pub is_future: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyProgress {
    pub completed_count: usize,
    pub available_count: usize,
    pub percent: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct HourSlot {
    pub hour: HourKey,
    pub label: String,
    #[serde(flatten)]
    pub status: HourStatus,
}

#[derive(Debug, Serialize)]
pub struct DayResponse {
    pub date: DateKey,
    pub hours: Vec<HourSlot>,
    pub progress: DailyProgress,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub hour: String,
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub date: DateKey,
    pub hour: HourKey,
    pub completed: bool,
    pub persisted: bool,
    pub warning: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DailyPoint {
    pub date: DateKey,
    pub completed_count: usize,
    pub window_size: usize,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub last_7_days: Vec<DailyPoint>,
}
