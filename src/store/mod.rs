//! Persistence for activity records.
//!
//! `ActivityStore` is the canonical owner of records. Writes that must observe
//! a consistent daily total go through a [`DayScope`], which serializes all
//! access to one `(owner, date)` key until it is committed or dropped.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::activity::{Activity, ActivityChanges, NewActivity};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Activities of one owner on one day, in insertion order.
    async fn get_by_owner_and_date(&self, owner: &str, date: NaiveDate) -> AppResult<Vec<Activity>>;

    /// Fails with `NotFound` when the id is absent or belongs to another owner.
    async fn get_by_id(&self, owner: &str, id: Uuid) -> AppResult<Activity>;

    /// Permanently removes the record. A second delete of the same id fails.
    async fn delete(&self, owner: &str, id: Uuid) -> AppResult<()>;

    /// Opens the serialized scope for `(owner, date)`. Waits while another
    /// scope for the same key is alive.
    async fn day(&self, owner: &str, date: NaiveDate) -> AppResult<Box<dyn DayScope>>;

    async fn insert(&self, owner: &str, record: NewActivity) -> AppResult<Activity> {
        record.validate()?;
        let mut day = self.day(owner, record.activity_date).await?;
        let activity = day.insert(record).await?;
        day.commit().await?;
        Ok(activity)
    }

    async fn update(&self, owner: &str, id: Uuid, changes: ActivityChanges) -> AppResult<Activity> {
        changes.validate()?;
        let existing = self.get_by_id(owner, id).await?;
        let mut day = self.day(owner, existing.activity_date).await?;
        let activity = day.update(id, changes).await?;
        day.commit().await?;
        Ok(activity)
    }
}

/// Exclusive view of one owner's day.
#[async_trait]
pub trait DayScope: Send {
    async fn activities(&mut self) -> AppResult<Vec<Activity>>;

    async fn total_minutes(&mut self) -> AppResult<i64> {
        Ok(self.activities().await?.iter().map(|a| i64::from(a.minutes)).sum())
    }

    async fn get(&mut self, id: Uuid) -> AppResult<Activity> {
        self.activities()
            .await?
            .into_iter()
            .find(|a| a.activity_id == id)
            .ok_or_else(activity_not_found)
    }

    async fn insert(&mut self, record: NewActivity) -> AppResult<Activity>;

    async fn update(&mut self, id: Uuid, changes: ActivityChanges) -> AppResult<Activity>;

    /// Makes the scope's writes durable and releases the key.
    async fn commit(self: Box<Self>) -> AppResult<()>;
}

pub(crate) fn activity_not_found() -> AppError {
    AppError::NotFound("Activity not found".to_string())
}
