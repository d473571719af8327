use crate::domain::analytics::driven_ports::TaskStatsReader;
use crate::domain::digest::driven_ports::{DigestReader, DigestSink, DigestTrigger};
use crate::domain::digest::driving_ports::{DigestError, DigestPort};
use crate::domain::task::{Status, Task};
use crate::domain::user::User;
use crate::domain::user::driven_ports::UserReader;
use crate::external_connections::ExternalConnectivity;
use anyhow::{Context, anyhow};
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

/// One user's daily summary
#[derive(Debug, PartialEq)]
#[cfg_attr(test, derive(Clone))]
pub struct Digest {
    pub user_id: Uuid,
    pub email: String,
    pub overdue_tasks: Vec<Task>,
    pub due_today: Vec<Task>,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    /// Percentage in `0.0..=100.0`
    pub completion_rate: f64,
}

/// Outcome of a single digest run across all users
#[derive(Debug, PartialEq, Default)]
pub struct DigestRunSummary {
    pub delivered: usize,
    pub failed_users: Vec<Uuid>,
}

/// Share of completed tasks as a percentage. An owner with no tasks has a rate of 0.
pub fn completion_rate(completed: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }

    completed as f64 / total as f64 * 100.0
}

/// Next instant strictly after `now` whose wall-clock time in `now`'s zone is `at`. Days on
/// which `at` does not exist locally are skipped; an ambiguous time resolves to its earlier
/// occurrence.
pub fn next_occurrence<Tz: TimeZone>(now: &DateTime<Tz>, at: NaiveTime) -> Option<DateTime<Tz>> {
    let zone = now.timezone();
    let mut date = now.date_naive();
    for _ in 0..3 {
        if let Some(candidate) = zone.from_local_datetime(&date.and_time(at)).earliest() {
            if candidate > *now {
                return Some(candidate);
            }
        }
        date = date.succ_opt()?;
    }

    None
}

fn local_midnight_in_utc<Tz: TimeZone>(
    zone: &Tz,
    date: NaiveDate,
    offset_seconds: i64,
) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    match zone.from_local_datetime(&midnight).earliest() {
        Some(local) => local.with_timezone(&Utc),
        // Midnight skipped by a clock change, fall back to the offset in effect when fired
        None => Utc.from_utc_datetime(&(midnight - Duration::seconds(offset_seconds))),
    }
}

/// `[midnight, next midnight)` of the calendar day containing `at` in its own zone, in UTC
pub fn day_bounds<Tz: TimeZone>(at: &DateTime<Tz>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let zone = at.timezone();
    let offset_seconds = at.offset().fix().local_minus_utc() as i64;
    let today = at.date_naive();
    let tomorrow = today.succ_opt()?;

    Some((
        local_midnight_in_utc(&zone, today, offset_seconds),
        local_midnight_in_utc(&zone, tomorrow, offset_seconds),
    ))
}

pub mod driven_ports {
    use super::*;

    pub trait DigestReader {
        /// Tasks due before `at` which are not completed
        async fn overdue_tasks(
            &self,
            owner_id: Uuid,
            at: DateTime<Utc>,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<Task>, anyhow::Error>;
        /// Tasks due in `[start, end)` which are not completed
        async fn tasks_due_between(
            &self,
            owner_id: Uuid,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<Task>, anyhow::Error>;
    }

    /// Delivers a finished digest to its recipient
    pub trait DigestSink {
        async fn deliver(&self, digest: &Digest) -> Result<(), anyhow::Error>;
    }

    /// Source of digest run times. Each call waits until the next run is due and returns the
    /// instant it fired at, in the zone whose calendar day defines "today". Returns [None]
    /// once no further runs will happen.
    pub trait DigestTrigger {
        type Zone: TimeZone;

        async fn next_fire(&mut self) -> Option<DateTime<Self::Zone>>;
    }
}

pub mod driving_ports {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum DigestError {
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    pub trait DigestPort {
        /// Builds and delivers a digest for every user. A failure for one user is logged and
        /// does not stop the others.
        async fn run_digest<Tz: TimeZone>(
            &self,
            fired_at: &DateTime<Tz>,
            ext_cxn: &mut impl ExternalConnectivity,
            user_read: &impl UserReader,
            digest_read: &impl driven_ports::DigestReader,
            stats_read: &impl TaskStatsReader,
            sink: &impl driven_ports::DigestSink,
        ) -> Result<DigestRunSummary, DigestError>;
    }
}

pub struct DigestService {}

async fn build_digest(
    user: &User,
    now: DateTime<Utc>,
    today: (DateTime<Utc>, DateTime<Utc>),
    ext_cxn: &mut impl ExternalConnectivity,
    digest_read: &impl DigestReader,
    stats_read: &impl TaskStatsReader,
) -> Result<Digest, anyhow::Error> {
    let overdue_tasks = digest_read
        .overdue_tasks(user.id, now, &mut *ext_cxn)
        .await
        .context("fetching overdue tasks")?;
    let due_today = digest_read
        .tasks_due_between(user.id, today.0, today.1, &mut *ext_cxn)
        .await
        .context("fetching tasks due today")?;
    let total_tasks = stats_read
        .count_tasks(user.id, &mut *ext_cxn)
        .await
        .context("counting tasks")?;
    let completed_tasks = stats_read
        .count_by_status(user.id, &mut *ext_cxn)
        .await
        .context("counting completed tasks")?
        .into_iter()
        .find(|bucket| bucket.status == Status::Completed)
        .map_or(0, |bucket| bucket.count);

    Ok(Digest {
        user_id: user.id,
        email: user.email.clone(),
        overdue_tasks,
        due_today,
        total_tasks,
        completed_tasks,
        completion_rate: completion_rate(completed_tasks, total_tasks),
    })
}

impl DigestPort for DigestService {
    async fn run_digest<Tz: TimeZone>(
        &self,
        fired_at: &DateTime<Tz>,
        ext_cxn: &mut impl ExternalConnectivity,
        user_read: &impl UserReader,
        digest_read: &impl DigestReader,
        stats_read: &impl TaskStatsReader,
        sink: &impl DigestSink,
    ) -> Result<DigestRunSummary, DigestError> {
        let now = fired_at.with_timezone(&Utc);
        let today = day_bounds(fired_at).ok_or_else(|| anyhow!("no calendar day after {now}"))?;
        let users = user_read
            .all_users(&mut *ext_cxn)
            .await
            .context("listing users for the digest")?;

        let mut summary = DigestRunSummary::default();
        for user in &users {
            let built =
                build_digest(user, now, today, &mut *ext_cxn, digest_read, stats_read).await;
            let outcome = match built {
                Ok(digest) => sink.deliver(&digest).await.context("delivering a digest"),
                Err(err) => Err(err),
            };

            match outcome {
                Ok(()) => summary.delivered += 1,
                Err(err) => {
                    warn!(user_id = %user.id, "digest failed for user: {err:#}");
                    summary.failed_users.push(user.id);
                }
            }
        }

        Ok(summary)
    }
}

/// Fires once a day at a fixed wall-clock time in the server's local zone
pub struct DailyTrigger {
    at: NaiveTime,
    last_fire: Option<DateTime<Local>>,
}

impl DailyTrigger {
    pub fn new(at: NaiveTime) -> DailyTrigger {
        DailyTrigger {
            at,
            last_fire: None,
        }
    }

    /// The next run strictly after both `now` and the previous run. The sleep runs on the
    /// monotonic clock, so the wall clock may still read just before the run that fired.
    fn next_run(&self, now: DateTime<Local>) -> Option<DateTime<Local>> {
        let reference = match self.last_fire {
            Some(last_fire) if last_fire > now => last_fire,
            _ => now,
        };

        next_occurrence(&reference, self.at)
    }
}

impl DigestTrigger for DailyTrigger {
    type Zone = Local;

    async fn next_fire(&mut self) -> Option<DateTime<Local>> {
        let now = Local::now();
        let fire_at = self.next_run(now)?;
        let wait = (fire_at - now).to_std().unwrap_or_default();
        info!(next_run = %fire_at, "waiting for next digest run");
        tokio::time::sleep(wait).await;
        self.last_fire = Some(fire_at);

        Some(fire_at)
    }
}

/// Writes each digest to the structured log
pub struct LogDigestSink;

impl DigestSink for LogDigestSink {
    async fn deliver(&self, digest: &Digest) -> Result<(), anyhow::Error> {
        info!(
            user_id = %digest.user_id,
            email = %digest.email,
            overdue = digest.overdue_tasks.len(),
            due_today = digest.due_today.len(),
            total_tasks = digest.total_tasks,
            completed_tasks = digest.completed_tasks,
            completion_rate = %format!("{:.2}%", digest.completion_rate),
            "daily digest"
        );

        Ok(())
    }
}

/// Runs the digest each time the trigger fires, until the trigger is exhausted. A failed run
/// is logged and the scheduler waits for the next trigger.
pub async fn run_digest_schedule(
    trigger: &mut impl DigestTrigger,
    digests: &impl DigestPort,
    ext_cxn: &mut impl ExternalConnectivity,
    user_read: &impl UserReader,
    digest_read: &impl DigestReader,
    stats_read: &impl TaskStatsReader,
    sink: &impl DigestSink,
) {
    while let Some(fired_at) = trigger.next_fire().await {
        let run = digests
            .run_digest(
                &fired_at,
                &mut *ext_cxn,
                user_read,
                digest_read,
                stats_read,
                sink,
            )
            .await;

        match run {
            Ok(summary) => info!(
                delivered = summary.delivered,
                failed = summary.failed_users.len(),
                "digest run finished"
            ),
            Err(err) => error!("digest run aborted: {err:#}"),
        }
    }

    info!("digest trigger exhausted, scheduler stopping");
}
