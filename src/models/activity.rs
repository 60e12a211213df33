use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Categories offered to clients. Any other text is accepted as well.
pub const SUGGESTED_CATEGORIES: [&str; 10] = [
    "Work",
    "Study",
    "Sleep",
    "Exercise",
    "Entertainment",
    "Meals",
    "Commute",
    "Household",
    "Social",
    "Other",
];

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Activity {
    pub activity_id: Uuid,
    pub owner_id: String,
    pub activity_name: String,
    pub minutes: i32,
    pub activity_date: NaiveDate,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when logging a new activity. Owner is passed separately.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub activity_name: String,
    pub minutes: i32,
    pub activity_date: NaiveDate,
    pub category: Option<String>,
}

impl NewActivity {
    pub fn new(
        activity_name: impl Into<String>,
        minutes: i32,
        activity_date: NaiveDate,
        category: Option<String>,
    ) -> Self {
        Self {
            activity_name: activity_name.into(),
            minutes,
            activity_date,
            category: normalize_category(category),
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        validate_name(&self.activity_name)?;
        validate_minutes(self.minutes)
    }

    /// Materializes the stored record with a fresh id and timestamps.
    pub fn into_activity(self, owner_id: &str) -> Activity {
        let now = Utc::now();
        Activity {
            activity_id: Uuid::now_v7(),
            owner_id: owner_id.to_string(),
            activity_name: self.activity_name,
            minutes: self.minutes,
            activity_date: self.activity_date,
            category: self.category,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update. `None` leaves a field untouched; `category: Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct ActivityChanges {
    pub activity_name: Option<String>,
    pub minutes: Option<i32>,
    pub category: Option<Option<String>>,
}

impl ActivityChanges {
    pub fn minutes(minutes: i32) -> Self {
        Self {
            minutes: Some(minutes),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if let Some(name) = &self.activity_name {
            validate_name(name)?;
        }
        if let Some(minutes) = self.minutes {
            validate_minutes(minutes)?;
        }
        Ok(())
    }

    pub fn apply_to(&self, activity: &mut Activity) {
        if let Some(name) = &self.activity_name {
            activity.activity_name = name.clone();
        }
        if let Some(minutes) = self.minutes {
            activity.minutes = minutes;
        }
        if let Some(category) = &self.category {
            activity.category = normalize_category(category.clone());
        }
        activity.updated_at = Utc::now();
    }
}

/// Empty category text means "no category".
pub fn normalize_category(category: Option<String>) -> Option<String> {
    category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

fn validate_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("Activity name cannot be empty".to_string()));
    }
    Ok(())
}

fn validate_minutes(minutes: i32) -> AppResult<()> {
    if minutes <= 0 {
        return Err(AppError::Validation("Minutes must be a positive integer".to_string()));
    }
    Ok(())
}
