use std::cmp::Reverse;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::Context;
use time::{Date, Duration, OffsetDateTime, UtcOffset};
use tracing::warn;
use uuid::Uuid;

use super::model::{format_date, DailyAggregate, FoodRecord, WeeklySummary};

/// Backing medium for the diary blob: a single named blob holding the
/// serialized record log. Injected so tests can run against memory.
pub trait DiaryBackend: Send + Sync {
    /// Returns the raw blob, or `None` when nothing has been written yet.
    fn load(&self) -> anyhow::Result<Option<Vec<u8>>>;
    fn save(&self, blob: &[u8]) -> anyhow::Result<()>;
    fn clear(&self) -> anyhow::Result<()>;
}

/// Blob stored as one JSON file on disk.
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DiaryBackend for FileBackend {
    fn load(&self) -> anyhow::Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("read {}", self.path.display())),
        }
    }

    fn save(&self, blob: &[u8]) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| *d != Path::new("")) {
            fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        }
        fs::write(&self.path, blob).with_context(|| format!("write {}", self.path.display()))
    }

    fn clear(&self) -> anyhow::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove {}", self.path.display())),
        }
    }
}

/// In-memory blob for tests.
#[derive(Default)]
pub struct MemoryBackend {
    blob: Mutex<Option<Vec<u8>>>,
}

impl DiaryBackend for MemoryBackend {
    fn load(&self) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(self.blob.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, blob: &[u8]) -> anyhow::Result<()> {
        *self.blob.lock().unwrap_or_else(PoisonError::into_inner) = Some(blob.to_vec());
        Ok(())
    }

    fn clear(&self) -> anyhow::Result<()> {
        *self.blob.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Owns the record log and derives day/week statistics from it.
///
/// Every mutation is a read-modify-write of the whole blob behind one lock,
/// so an `append` immediately followed by `list` observes the new record and
/// two appends cannot corrupt the log. A blob that fails to load or decode
/// degrades to the empty log rather than erroring.
pub struct DiaryStore {
    backend: Box<dyn DiaryBackend>,
    offset: UtcOffset,
    lock: Mutex<()>,
}

impl DiaryStore {
    /// `offset` fixes the local time zone used for day-boundary math, so
    /// aggregates match the user's perceived calendar day.
    pub fn new(backend: Box<dyn DiaryBackend>, offset: UtcOffset) -> Self {
        Self {
            backend,
            offset,
            lock: Mutex::new(()),
        }
    }

    pub fn append(&self, record: FoodRecord) -> anyhow::Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut log = self.load_log();
        log.push(record);
        self.persist(&log)
    }

    /// Every record in insertion order. Unreadable or malformed backing
    /// data yields the empty log, never an error.
    pub fn list(&self) -> Vec<FoodRecord> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.load_log()
    }

    /// Idempotent; removing an absent id is not an error.
    pub fn remove(&self, id: Uuid) -> anyhow::Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut log = self.load_log();
        log.retain(|r| r.id != id);
        self.persist(&log)
    }

    pub fn clear(&self) -> anyhow::Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.backend.clear().context("clear diary blob")
    }

    /// Pure function of (log, date): totals and records for the local
    /// calendar day, bounds 00:00:00.000 and 23:59:59.999 inclusive.
    pub fn daily_aggregate(&self, date: Date) -> DailyAggregate {
        aggregate_for(&self.list(), date, self.offset)
    }

    /// The 6 days before `end` through `end` inclusive, oldest first.
    /// A fixed trailing window, not an ISO calendar week.
    pub fn weekly_aggregate(&self, end: Date) -> Vec<DailyAggregate> {
        let log = self.list();
        (0..7)
            .rev()
            .map(|i| aggregate_for(&log, end - Duration::days(i), self.offset))
            .collect()
    }

    pub fn weekly_summary(&self, end: Date) -> WeeklySummary {
        let days = self.weekly_aggregate(end);
        let total: f64 = days.iter().map(|d| d.total_calories).sum();
        let average_calories = (total / days.len() as f64).round() as i64;
        let total_meals = days.iter().map(|d| d.meals.len()).sum();
        WeeklySummary {
            days,
            average_calories,
            total_meals,
        }
    }

    /// Today in the store's local offset.
    pub fn today(&self) -> Date {
        OffsetDateTime::now_utc().to_offset(self.offset).date()
    }

    fn load_log(&self) -> Vec<FoodRecord> {
        let bytes = match self.backend.load() {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "diary backing store unreadable, treating as empty");
                return Vec::new();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(log) => log,
            Err(e) => {
                warn!(error = %e, "diary blob malformed, treating as empty");
                Vec::new()
            }
        }
    }

    fn persist(&self, log: &[FoodRecord]) -> anyhow::Result<()> {
        let blob = serde_json::to_vec(log).context("encode diary blob")?;
        self.backend.save(&blob).context("write diary blob")
    }
}

fn aggregate_for(log: &[FoodRecord], date: Date, offset: UtcOffset) -> DailyAggregate {
    let (start_ms, end_ms) = day_bounds_ms(date, offset);
    let mut meals: Vec<FoodRecord> = log
        .iter()
        .filter(|r| r.timestamp_ms >= start_ms && r.timestamp_ms <= end_ms)
        .cloned()
        .collect();
    meals.sort_by_key(|r| Reverse(r.timestamp_ms));

    let mut agg = DailyAggregate {
        date: format_date(date),
        total_calories: 0.0,
        total_protein: 0.0,
        total_carbs: 0.0,
        total_fat: 0.0,
        meals,
    };
    for meal in &agg.meals {
        agg.total_calories += meal.calories;
        agg.total_protein += meal.protein;
        agg.total_carbs += meal.carbs;
        agg.total_fat += meal.fat;
    }
    agg
}

fn day_bounds_ms(date: Date, offset: UtcOffset) -> (i64, i64) {
    let start = date.midnight().assume_offset(offset);
    let next = (date + Duration::days(1)).midnight().assume_offset(offset);
    let start_ms = (start.unix_timestamp_nanos() / 1_000_000) as i64;
    let end_ms = (next.unix_timestamp_nanos() / 1_000_000) as i64 - 1;
    (start_ms, end_ms)
}
