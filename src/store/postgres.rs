use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use log::info;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use super::{activity_not_found, ActivityStore, DayScope};
use crate::config::DatabaseConfig;
use crate::errors::{AppError, AppResult};
use crate::models::activity::{normalize_category, Activity, ActivityChanges, NewActivity};

const ACTIVITY_COLUMNS: &str =
    "activity_id, owner_id, activity_name, minutes, activity_date, category, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }
}

#[async_trait]
impl ActivityStore for PgStore {
    async fn get_by_owner_and_date(&self, owner: &str, date: NaiveDate) -> AppResult<Vec<Activity>> {
        let activities = sqlx::query_as::<_, Activity>(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities WHERE owner_id = $1 AND activity_date = $2 ORDER BY seq ASC"
        ))
        .bind(owner)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(activities)
    }

    async fn get_by_id(&self, owner: &str, id: Uuid) -> AppResult<Activity> {
        sqlx::query_as::<_, Activity>(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities WHERE activity_id = $1 AND owner_id = $2"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(activity_not_found)
    }

    async fn delete(&self, owner: &str, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM activities WHERE activity_id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(activity_not_found());
        }
        Ok(())
    }

    async fn day(&self, owner: &str, date: NaiveDate) -> AppResult<Box<dyn DayScope>> {
        let mut tx = self.pool.begin().await?;
        // Released automatically when the transaction commits or rolls back.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(format!("{owner}:{date}"))
            .execute(&mut *tx)
            .await?;

        Ok(Box::new(PgDay {
            tx,
            owner: owner.to_string(),
            date,
        }))
    }
}

/// Transaction holding the advisory lock for one `(owner, date)` key.
/// Dropping it without `commit` rolls back.
struct PgDay {
    tx: Transaction<'static, Postgres>,
    owner: String,
    date: NaiveDate,
}

#[async_trait]
impl DayScope for PgDay {
    async fn activities(&mut self) -> AppResult<Vec<Activity>> {
        let activities = sqlx::query_as::<_, Activity>(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities WHERE owner_id = $1 AND activity_date = $2 ORDER BY seq ASC"
        ))
        .bind(&self.owner)
        .bind(self.date)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(activities)
    }

    async fn total_minutes(&mut self) -> AppResult<i64> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(minutes), 0)::BIGINT FROM activities WHERE owner_id = $1 AND activity_date = $2",
        )
        .bind(&self.owner)
        .bind(self.date)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(total)
    }

    async fn get(&mut self, id: Uuid) -> AppResult<Activity> {
        sqlx::query_as::<_, Activity>(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities WHERE activity_id = $1 AND owner_id = $2 AND activity_date = $3"
        ))
        .bind(id)
        .bind(&self.owner)
        .bind(self.date)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or_else(activity_not_found)
    }

    async fn insert(&mut self, record: NewActivity) -> AppResult<Activity> {
        record.validate()?;
        if record.activity_date != self.date {
            return Err(AppError::Validation(
                "Activity date does not match the open day".to_string(),
            ));
        }
        let activity = record.into_activity(&self.owner);

        let stored = sqlx::query_as::<_, Activity>(&format!(
            "INSERT INTO activities ({ACTIVITY_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {ACTIVITY_COLUMNS}"
        ))
        .bind(activity.activity_id)
        .bind(&activity.owner_id)
        .bind(&activity.activity_name)
        .bind(activity.minutes)
        .bind(activity.activity_date)
        .bind(&activity.category)
        .bind(activity.created_at)
        .bind(activity.updated_at)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(stored)
    }

    async fn update(&mut self, id: Uuid, changes: ActivityChanges) -> AppResult<Activity> {
        changes.validate()?;
        let (set_category, category) = match changes.category {
            Some(category) => (true, normalize_category(category)),
            None => (false, None),
        };

        sqlx::query_as::<_, Activity>(&format!(
            "UPDATE activities SET \
                activity_name = COALESCE($1, activity_name), \
                minutes = COALESCE($2, minutes), \
                category = CASE WHEN $3 THEN $4 ELSE category END, \
                updated_at = $5 \
             WHERE activity_id = $6 AND owner_id = $7 AND activity_date = $8 \
             RETURNING {ACTIVITY_COLUMNS}"
        ))
        .bind(changes.activity_name)
        .bind(changes.minutes)
        .bind(set_category)
        .bind(category)
        .bind(Utc::now())
        .bind(id)
        .bind(&self.owner)
        .bind(self.date)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or_else(activity_not_found)
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let PgDay { tx, .. } = *self;
        tx.commit().await?;
        Ok(())
    }
}
