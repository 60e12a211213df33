use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{activity_not_found, ActivityStore, DayScope};
use crate::errors::{AppError, AppResult};
use crate::models::activity::{Activity, ActivityChanges, NewActivity};

type DayKey = (String, NaiveDate);

/// Process-local store. Rows live in insertion order; each `(owner, date)`
/// key gets its own async mutex while a [`DayScope`] is open.
#[derive(Default)]
pub struct MemoryStore {
    rows: Arc<Mutex<Vec<Activity>>>,
    day_locks: Mutex<HashMap<DayKey, Arc<Mutex<()>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ActivityStore for MemoryStore {
    async fn get_by_owner_and_date(&self, owner: &str, date: NaiveDate) -> AppResult<Vec<Activity>> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .filter(|a| a.owner_id == owner && a.activity_date == date)
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, owner: &str, id: Uuid) -> AppResult<Activity> {
        let rows = self.rows.lock().await;
        rows.iter()
            .find(|a| a.activity_id == id && a.owner_id == owner)
            .cloned()
            .ok_or_else(activity_not_found)
    }

    async fn delete(&self, owner: &str, id: Uuid) -> AppResult<()> {
        let mut rows = self.rows.lock().await;
        let position = rows
            .iter()
            .position(|a| a.activity_id == id && a.owner_id == owner)
            .ok_or_else(activity_not_found)?;
        rows.remove(position);
        Ok(())
    }

    async fn day(&self, owner: &str, date: NaiveDate) -> AppResult<Box<dyn DayScope>> {
        let lock = {
            let mut locks = self.day_locks.lock().await;
            // Unreferenced entries belong to keys nobody holds or waits on.
            locks.retain(|_, l| Arc::strong_count(l) > 1);
            locks.entry((owner.to_string(), date)).or_default().clone()
        };
        let guard = lock.lock_owned().await;

        Ok(Box::new(MemoryDay {
            _guard: guard,
            rows: Arc::clone(&self.rows),
            owner: owner.to_string(),
            date,
        }))
    }
}

/// Writes are applied to the shared rows immediately; `commit` only releases
/// the key.
struct MemoryDay {
    _guard: OwnedMutexGuard<()>,
    rows: Arc<Mutex<Vec<Activity>>>,
    owner: String,
    date: NaiveDate,
}

impl MemoryDay {
    fn owns(&self, activity: &Activity) -> bool {
        activity.owner_id == self.owner && activity.activity_date == self.date
    }
}

#[async_trait]
impl DayScope for MemoryDay {
    async fn activities(&mut self) -> AppResult<Vec<Activity>> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().filter(|a| self.owns(a)).cloned().collect())
    }

    async fn insert(&mut self, record: NewActivity) -> AppResult<Activity> {
        record.validate()?;
        if record.activity_date != self.date {
            return Err(AppError::Validation(
                "Activity date does not match the open day".to_string(),
            ));
        }
        let activity = record.into_activity(&self.owner);
        self.rows.lock().await.push(activity.clone());
        Ok(activity)
    }

    async fn update(&mut self, id: Uuid, changes: ActivityChanges) -> AppResult<Activity> {
        changes.validate()?;
        let mut rows = self.rows.lock().await;
        let activity = rows
            .iter_mut()
            .find(|a| a.activity_id == id && a.owner_id == self.owner && a.activity_date == self.date)
            .ok_or_else(activity_not_found)?;
        changes.apply_to(activity);
        Ok(activity.clone())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
}
