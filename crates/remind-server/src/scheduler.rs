//! Periodic sweep driving events from pending to notified to archived.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Timelike, Utc};
use remind_archive::{Archive, ArchiveRecord};
use remind_core::{EventStore, alert_message};
use tokio::time::{Instant, MissedTickBehavior};

use crate::fanout::Hub;

const MINUTE: Duration = Duration::from_secs(60);

/// What one tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Alerts broadcast.
    pub notified: usize,
    /// Events removed from the live store.
    pub archived: usize,
    /// Archive appends that failed and were dropped.
    pub archive_failures: usize,
    /// Subscriber deliveries queued across all alerts.
    pub delivered: usize,
}

/// Owns everything a sweep touches.
#[derive(Debug, Clone)]
pub struct Scheduler {
    store: Arc<EventStore>,
    hub: Hub,
    archive: Arc<Archive>,
    lead_minutes: u32,
}

impl Scheduler {
    pub const fn new(
        store: Arc<EventStore>,
        hub: Hub,
        archive: Arc<Archive>,
        lead_minutes: u32,
    ) -> Self {
        Self {
            store,
            hub,
            archive,
            lead_minutes,
        }
    }

    /// Runs one sweep at `now`.
    ///
    /// Alerts are broadcast after the store lock is released. Archive failures
    /// are logged and dropped; the events stay removed from the live store.
    pub async fn tick(&self, now: DateTime<Utc>) -> TickReport {
        let lead = chrono::Duration::minutes(i64::from(self.lead_minutes));
        let outcome = self.store.sweep(now, lead);

        let mut report = TickReport {
            notified: outcome.notified.len(),
            archived: outcome.archived.len(),
            ..TickReport::default()
        };

        for event in &outcome.notified {
            let delivered = self.hub.broadcast(alert_message(event, self.lead_minutes));
            tracing::info!(
                event_id = %event.id,
                title = %event.title,
                overlaps = event.overlaps,
                subscriber_count = delivered,
                "alert broadcast"
            );
            report.delivered += delivered;
        }

        if !outcome.archived.is_empty() {
            let records: Vec<ArchiveRecord> = outcome
                .archived
                .iter()
                .map(|event| ArchiveRecord::completed(event, now))
                .collect();
            report.archive_failures = self.write_archive(records).await;
        }

        tracing::debug!(?report, "sweep finished");
        report
    }

    /// Appends `records` on the blocking pool. Returns the number that failed.
    async fn write_archive(&self, records: Vec<ArchiveRecord>) -> usize {
        let archive = Arc::clone(&self.archive);
        let total = records.len();
        let result = tokio::task::spawn_blocking(move || {
            let mut failures = 0;
            for record in records {
                let title = record.title.clone();
                match archive.append(record) {
                    Ok(count) => {
                        tracing::info!(title = %title, path = ?archive.path(), count, "event archived");
                    }
                    Err(e) => {
                        tracing::error!(title = %title, error = %e, "failed to archive event");
                        failures += 1;
                    }
                }
            }
            failures
        })
        .await;

        result.unwrap_or_else(|e| {
            tracing::error!(error = %e, "archive task failed");
            total
        })
    }

    /// Sweeps every `period` until the task is dropped.
    ///
    /// With `align_to_minute`, the first tick lands on the next wall-clock
    /// minute boundary. Ticks missed while a sweep overruns are skipped.
    pub async fn run(self, period: Duration, align_to_minute: bool) {
        let delay = if align_to_minute {
            until_next_minute(Utc::now())
        } else {
            Duration::ZERO
        };
        tracing::info!(?period, first_tick_in = ?delay, "scheduler started");

        let mut interval = tokio::time::interval_at(Instant::now() + delay, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            self.tick(Utc::now()).await;
        }
    }
}

/// Time left until the next wall-clock minute boundary; zero when exactly on one.
pub fn until_next_minute(now: DateTime<Utc>) -> Duration {
    // Leap seconds are reported as nanosecond >= 1e9.
    let into_minute = Duration::new(u64::from(now.second()), now.nanosecond() % 1_000_000_000);
    if into_minute.is_zero() {
        Duration::ZERO
    } else {
        MINUTE.saturating_sub(into_minute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;
    use remind_core::EventState;

    struct Fixture {
        _dir: tempfile::TempDir,
        store: Arc<EventStore>,
        hub: Hub,
        archive: Arc<Archive>,
        scheduler: Scheduler,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(EventStore::new());
        let hub = Hub::new(16);
        let archive = Arc::new(Archive::open(dir.path().join("events.json")));
        let scheduler = Scheduler::new(Arc::clone(&store), hub.clone(), Arc::clone(&archive), 5);
        Fixture {
            _dir: dir,
            store,
            hub,
            archive,
            scheduler,
        }
    }

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 8, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn tick_broadcasts_once_per_event() {
        let f = fixture();
        let mut sub = f.hub.subscribe();
        f.store
            .add("Standup", "Daily sync", base() + chrono::Duration::minutes(3), base())
            .unwrap();

        let report = f.scheduler.tick(base()).await;
        assert_eq!(report.notified, 1);
        assert_eq!(report.delivered, 1);
        assert_eq!(
            sub.recv().await.unwrap(),
            "Event \"Standup\" is about to start in 5 minutes."
        );

        let again = f.scheduler.tick(base()).await;
        assert_eq!(again, TickReport::default());
    }

    #[tokio::test]
    async fn tick_archives_past_events() {
        let f = fixture();
        let event = f
            .store
            .add("Standup", "Daily sync", base() + chrono::Duration::minutes(3), base())
            .unwrap();

        let later = event.start_time + chrono::Duration::seconds(30);
        let report = f.scheduler.tick(later).await;
        assert_eq!(report.archived, 1);
        assert_eq!(report.archive_failures, 0);
        assert!(f.store.is_empty());

        let records = f.archive.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Standup");
        assert_eq!(records[0].description, "Daily sync");
        assert_eq!(records[0].timestamp, later);
    }

    #[tokio::test]
    async fn archive_failure_still_removes_event() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the archive file should be makes every write fail.
        let archive_path = dir.path().join("events.json");
        std::fs::create_dir(&archive_path).unwrap();

        let store = Arc::new(EventStore::new());
        let scheduler = Scheduler::new(
            Arc::clone(&store),
            Hub::new(4),
            Arc::new(Archive::open(&archive_path)),
            5,
        );
        store
            .add("Standup", "Daily sync", base() + chrono::Duration::minutes(1), base())
            .unwrap();

        let report = scheduler.tick(base() + chrono::Duration::minutes(2)).await;
        assert_eq!(report.archived, 1);
        assert_eq!(report.archive_failures, 1);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn notification_state_is_visible_in_store() {
        let f = fixture();
        let event = f
            .store
            .add("Standup", "Daily sync", base() + chrono::Duration::minutes(5), base())
            .unwrap();

        f.scheduler.tick(base()).await;
        assert_eq!(f.store.get(event.id).unwrap().state, EventState::Notified);
    }

    #[test]
    fn until_next_minute_mid_minute() {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 8, 0, 45).unwrap();
        assert_eq!(until_next_minute(now), Duration::from_secs(15));
    }

    #[test]
    fn until_next_minute_on_boundary_is_zero() {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 8, 1, 0).unwrap();
        assert_eq!(until_next_minute(now), Duration::ZERO);
    }
}
