//! Daily trigger for the `schedule` command.
//!
//! Sleeps until the next occurrence of a local wall-clock time, runs one job,
//! and repeats. A failed job is logged and the loop keeps going; Ctrl-C ends
//! the loop between runs.
use std::future::Future;

use anyhow::Result;
use chrono::{DateTime, Local, NaiveTime, TimeZone};
use tracing::{error, info};

/// First instant strictly after `now` whose local time is `at`.
///
/// Returns `None` only if no such instant exists in the next few days, which
/// would need a timezone that skips `at` repeatedly.
pub fn next_run_after<Tz: TimeZone>(now: &DateTime<Tz>, at: NaiveTime) -> Option<DateTime<Tz>> {
    let tz = now.timezone();
    let mut date = now.date_naive();
    for _ in 0..3 {
        // A DST gap has no earliest instant; try the following day.
        if let Some(candidate) = tz.from_local_datetime(&date.and_time(at)).earliest() {
            if candidate > *now {
                return Some(candidate);
            }
        }
        date = date.succ_opt()?;
    }
    None
}

pub async fn run_daily<F, Fut>(at: NaiveTime, mut job: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    info!(%at, "[SCHEDULE] Daily trigger armed");
    loop {
        let now = Local::now();
        let Some(next) = next_run_after(&now, at) else {
            anyhow::bail!("no local time {at} found in the coming days");
        };
        let wait = (next.clone() - now).to_std().unwrap_or_default();
        info!(next_run = %next, wait_secs = wait.as_secs(), "[SCHEDULE] Waiting for next run");

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("[SCHEDULE] Interrupted, stopping");
                return Ok(());
            }
        }

        match job().await {
            Ok(()) => info!("[SCHEDULE] Run finished"),
            Err(e) => error!(error = %e, "[SCHEDULE][ERROR] Run failed, waiting for next trigger"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn later_today_when_time_not_yet_passed() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 1, 30, 0).unwrap();
        let next = next_run_after(&now, at(2, 0)).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 10, 2, 0, 0).unwrap());
    }

    #[test]
    fn tomorrow_when_time_already_passed() {
        let now = Utc.with_ymd_and_hms(2024, 12, 31, 3, 58, 0).unwrap();
        let next = next_run_after(&now, at(2, 0)).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 1, 1, 2, 0, 0).unwrap());
    }

    #[test]
    fn exact_match_schedules_the_next_day() {
        let now = Utc.with_ymd_and_hms(2024, 2, 28, 2, 0, 0).unwrap();
        let next = next_run_after(&now, at(2, 0)).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 2, 29, 2, 0, 0).unwrap());
    }
}
