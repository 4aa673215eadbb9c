//! Time-triggered maintenance sweeps
//!
//! Three independent, idempotent sweeps keep loan and reservation state
//! consistent outside of user requests: expiring stale reservations,
//! marking overdue loans, and emitting due-soon reminders. Each sweep is
//! defined exactly once here and driven by its own interval timer; every
//! row transition commits on its own, so an interrupted batch re-runs
//! safely (at worst repeating a notification).

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    clock::Clock,
    config::SchedulerConfig,
    models::loan::LoanStatus,
    services::{
        notifications::{NotificationKind, NotificationSink},
        reservations::ReservationsService,
    },
    store::Store,
};

/// Which sweep to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SweepKind {
    /// Cancel pending reservations past their validity window
    Expire,
    /// Mark active loans past their due date as overdue
    Overdue,
    /// Remind patrons whose loans fall due within the forward window
    Reminders,
}

/// Outcome of one sweep run
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct SweepReport {
    /// Rows transitioned (expire, overdue) or reminders sent
    pub count: usize,
}

pub struct MaintenanceService {
    store: Store,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn NotificationSink>,
    reservations: ReservationsService,
    reminder_lead: Duration,
    reminder_span: Duration,
    lock_wait: StdDuration,
}

impl MaintenanceService {
    pub fn new(
        store: Store,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn NotificationSink>,
        reservations: ReservationsService,
        scheduler: &SchedulerConfig,
        lock_wait: StdDuration,
    ) -> Self {
        Self {
            store,
            clock,
            notifier,
            reservations,
            reminder_lead: Duration::hours(scheduler.reminder_lead_hours),
            reminder_span: Duration::hours(scheduler.reminder_span_hours),
            lock_wait,
        }
    }

    /// Run one sweep at the given instant (defaults to the clock's now)
    pub async fn run_sweep(&self, kind: SweepKind, now: Option<DateTime<Utc>>) -> SweepReport {
        let now = now.unwrap_or_else(|| self.clock.now());
        let count = match kind {
            SweepKind::Expire => self.reservations.cleanup_expired(now).await,
            SweepKind::Overdue => self.mark_overdue(now).await,
            SweepKind::Reminders => self.send_reminders(now).await,
        };
        SweepReport { count }
    }

    /// Mark every active loan past due as overdue and notify the borrower.
    /// Re-marking an already-overdue loan is a no-op, and the penalty stays
    /// untouched until the actual return.
    async fn mark_overdue(&self, now: DateTime<Utc>) -> usize {
        let candidates = self.store.loans.active_due_before(now);

        let mut count = 0;
        for candidate in candidates {
            let guard = match self.store.lock_item(candidate.item_id, self.lock_wait).await {
                Ok(guard) => guard,
                Err(_) => {
                    tracing::warn!(
                        loan_id = candidate.id,
                        "item busy, leaving loan for the next overdue sweep"
                    );
                    continue;
                }
            };

            // Re-read under the lock; a concurrent return may have closed it
            let Ok(mut loan) = self.store.loans.get(candidate.id) else {
                continue;
            };
            if loan.status != LoanStatus::Active || loan.due_at >= now {
                continue;
            }
            loan.status = LoanStatus::Overdue;
            if self.store.loans.update(&loan).is_err() {
                continue;
            }
            drop(guard);
            count += 1;

            self.notify_patron(
                loan.patron_id,
                NotificationKind::LoanOverdue,
                &format!(
                    "Your loan ({}) was due on {} and is now overdue. Please return it.",
                    loan.id, loan.due_at
                ),
            )
            .await;
        }

        if count > 0 {
            tracing::info!(count, "loans marked overdue");
        }
        count
    }

    /// Remind borrowers whose active loans fall due in
    /// `[now + lead, now + lead + span)`. No state changes.
    async fn send_reminders(&self, now: DateTime<Utc>) -> usize {
        let from = now + self.reminder_lead;
        let to = from + self.reminder_span;
        let due_soon = self.store.loans.active_due_between(from, to);

        let mut count = 0;
        for loan in due_soon {
            self.notify_patron(
                loan.patron_id,
                NotificationKind::ReturnReminder,
                &format!(
                    "Your loan ({}) is due on {}. Please return or renew it in time.",
                    loan.id, loan.due_at
                ),
            )
            .await;
            count += 1;
        }

        if count > 0 {
            tracing::info!(count, "return reminders sent");
        }
        count
    }

    /// Best-effort delivery; failures are logged and absorbed
    async fn notify_patron(&self, patron_id: i64, kind: NotificationKind, payload: &str) {
        let recipient = match self.store.patrons.get(patron_id) {
            Ok(patron) => patron,
            Err(_) => {
                tracing::error!(patron_id, "patron not found, skipping notification");
                return;
            }
        };
        if let Err(e) = self.notifier.notify(kind, &recipient, payload).await {
            tracing::error!(patron_id, "failed to send {:?} notification: {}", kind, e);
        }
    }
}

/// Spawn the periodic sweep timers. Each sweep gets its own interval task;
/// a tick that finds nothing to do is cheap.
pub fn spawn_timers(service: Arc<MaintenanceService>, scheduler: &SchedulerConfig) {
    let sweeps = [
        (SweepKind::Expire, scheduler.expire_interval_secs),
        (SweepKind::Overdue, scheduler.overdue_interval_secs),
        (SweepKind::Reminders, scheduler.reminder_interval_secs),
    ];

    for (kind, secs) in sweeps {
        let service = service.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(StdDuration::from_secs(secs));
            // The first tick fires immediately; skip it so startup stays quiet
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let report = service.run_sweep(kind, None).await;
                tracing::debug!(kind = ?kind, count = report.count, "sweep completed");
            }
        });
    }
}
