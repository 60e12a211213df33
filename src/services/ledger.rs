use std::sync::Arc;

use chrono::NaiveDate;
use log::{info, warn};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::activity::{Activity, ActivityChanges, NewActivity};
use crate::store::ActivityStore;

/// Minutes in one day; the ceiling on logged minutes per owner per date.
pub const DAILY_BUDGET_MINUTES: i64 = 1440;

/// Gatekeeper for the daily budget. Every check re-reads the total from the
/// store inside the day's serialized scope, so nothing is cached here.
#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn ActivityStore>,
}

impl Ledger {
    pub fn new(store: Arc<dyn ActivityStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn ActivityStore {
        self.store.as_ref()
    }

    pub async fn current_total(&self, owner: &str, date: NaiveDate) -> AppResult<i64> {
        let activities = self.store.get_by_owner_and_date(owner, date).await?;
        Ok(activities.iter().map(|a| i64::from(a.minutes)).sum())
    }

    pub async fn checked_insert(&self, owner: &str, candidate: NewActivity) -> AppResult<Activity> {
        candidate.validate()?;

        let mut day = self.store.day(owner, candidate.activity_date).await?;
        let current_total = day.total_minutes().await?;
        ensure_within_budget(current_total, candidate.minutes)?;

        let activity = day.insert(candidate).await?;
        day.commit().await?;

        info!(
            "Logged {} minutes for {} on {} ({} of {})",
            activity.minutes,
            owner,
            activity.activity_date,
            current_total + i64::from(activity.minutes),
            DAILY_BUDGET_MINUTES
        );
        Ok(activity)
    }

    pub async fn checked_update(&self, owner: &str, id: Uuid, changes: ActivityChanges) -> AppResult<Activity> {
        changes.validate()?;

        // The date never changes, so it identifies the scope to lock.
        let date = self.store.get_by_id(owner, id).await?.activity_date;
        let mut day = self.store.day(owner, date).await?;

        if let Some(new_minutes) = changes.minutes {
            let existing = day.get(id).await?;
            let other_total = day.total_minutes().await? - i64::from(existing.minutes);
            ensure_within_budget(other_total, new_minutes)?;
        }

        let activity = day.update(id, changes).await?;
        day.commit().await?;
        Ok(activity)
    }

    /// Removal can only lower the total, so no budget check applies.
    pub async fn delete(&self, owner: &str, id: Uuid) -> AppResult<()> {
        self.store.delete(owner, id).await?;
        info!("Deleted activity {} for {}", id, owner);
        Ok(())
    }
}

fn ensure_within_budget(current_total: i64, minutes: i32) -> AppResult<()> {
    let attempted_total = current_total + i64::from(minutes);
    if attempted_total > DAILY_BUDGET_MINUTES {
        warn!(
            "Rejected mutation: {} minutes would exceed the daily budget ({} already logged)",
            attempted_total, current_total
        );
        return Err(AppError::BudgetExceeded {
            current_total,
            attempted_total,
        });
    }
    Ok(())
}
