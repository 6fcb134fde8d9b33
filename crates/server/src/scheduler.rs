//! Periodic scan scheduling.
//!
//! Schedules are given as five-field cron expressions
//! (`minute hour day month weekday`, weekday 0 = Sunday) or the
//! shorthand `daily` (02:00 every day). The loop wakes every 30 seconds
//! and fires at most once per matching minute.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Datelike, Local, Timelike};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::state::AppState;

const TICK: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
enum Field {
    Any,
    /// `*/n`: every n-th value counted from the field's minimum, so
    /// `*/2` in the day field matches 1, 3, 5 and so on.
    Step { base: u32, step: u32 },
    Values(Vec<u32>),
}

impl Field {
    fn parse(s: &str, min: u32, max: u32) -> Option<Field> {
        if s == "*" {
            return Some(Field::Any);
        }
        if let Some(step) = s.strip_prefix("*/") {
            let n: u32 = step.parse().ok()?;
            if n == 0 {
                return None;
            }
            return Some(Field::Step { base: min, step: n });
        }

        let mut values = Vec::new();
        for part in s.split(',') {
            if let Some((a, b)) = part.split_once('-') {
                let a: u32 = a.parse().ok()?;
                let b: u32 = b.parse().ok()?;
                if a > b || a < min || b > max {
                    return None;
                }
                values.extend(a..=b);
            } else {
                let v: u32 = part.parse().ok()?;
                if v < min || v > max {
                    return None;
                }
                values.push(v);
            }
        }
        if values.is_empty() {
            return None;
        }
        Some(Field::Values(values))
    }

    fn matches(&self, v: u32) -> bool {
        match self {
            Field::Any => true,
            Field::Step { base, step } => v >= *base && (v - base) % step == 0,
            Field::Values(values) => values.contains(&v),
        }
    }
}

/// A parsed scan schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct CronSchedule {
    minute: Field,
    hour: Field,
    day: Field,
    month: Field,
    weekday: Field,
}

impl CronSchedule {
    pub fn matches(&self, t: &DateTime<Local>) -> bool {
        self.minute.matches(t.minute())
            && self.hour.matches(t.hour())
            && self.day.matches(t.day())
            && self.month.matches(t.month())
            && self.weekday.matches(t.weekday().num_days_from_sunday())
    }
}

/// Parses a schedule string. `None` disables scheduling; an invalid
/// expression also disables it, with a warning.
pub fn parse_schedule(s: &str) -> Option<CronSchedule> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if matches!(s.to_ascii_lowercase().as_str(), "daily" | "day") {
        return Some(CronSchedule {
            minute: Field::Values(vec![0]),
            hour: Field::Values(vec![2]),
            day: Field::Any,
            month: Field::Any,
            weekday: Field::Any,
        });
    }

    let parts: Vec<&str> = s.split_whitespace().collect();
    if parts.len() != 5 {
        warn!(schedule = s, "invalid schedule, scheduling disabled");
        return None;
    }

    let schedule = CronSchedule {
        minute: Field::parse(parts[0], 0, 59)?,
        hour: Field::parse(parts[1], 0, 23)?,
        day: Field::parse(parts[2], 1, 31)?,
        month: Field::parse(parts[3], 1, 12)?,
        weekday: Field::parse(parts[4], 0, 6)?,
    };
    Some(schedule)
}

/// Runs scheduled scans until `cancel` fires.
pub async fn run_scheduler(
    state: Arc<AppState>,
    schedule: CronSchedule,
    cancel: CancellationToken,
) {
    // Minute stamp of the last fired scan, so one matching minute never
    // triggers twice.
    let mut last_fired: Option<i64> = None;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(TICK) => {}
        }

        let now = Local::now();
        let stamp = now.timestamp() / 60;
        if !schedule.matches(&now) || last_fired == Some(stamp) {
            continue;
        }
        last_fired = Some(stamp);

        info!("scheduled scan starting");
        let _guard = state.scan_lock.lock().await;
        if let Err(e) = gogshelf_scan::run_scan(&state.scan_context()).await {
            error!("scheduled scan failed: {e}");
        }
    }
}
