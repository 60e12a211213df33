use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::errors::AppResult;
use crate::models::activity::Activity;
use crate::models::summary::{CategoryTotal, DayAnalytics, Summary, TimelineBlock};
use crate::services::ledger::DAILY_BUDGET_MINUTES;
use crate::store::ActivityStore;

/// Bucket for activities logged without a category.
pub const UNCATEGORIZED: &str = "Other";

pub async fn summarize(store: &dyn ActivityStore, owner: &str, date: NaiveDate) -> AppResult<Summary> {
    let activities = store.get_by_owner_and_date(owner, date).await?;
    Ok(summary_of(date, activities))
}

/// Dashboard view: the summary plus category breakdown and timeline, all from
/// a single fetch.
pub async fn analytics(store: &dyn ActivityStore, owner: &str, date: NaiveDate) -> AppResult<DayAnalytics> {
    let activities = store.get_by_owner_and_date(owner, date).await?;
    let categories = by_category(&activities);
    let timeline = timeline(&activities);
    let summary = summary_of(date, activities);

    Ok(DayAnalytics {
        remaining_minutes: DAILY_BUDGET_MINUTES - summary.total_minutes,
        activity_count: summary.activities.len(),
        category_count: categories.len(),
        top_activity: summary.activities.first().cloned(),
        categories,
        timeline,
        summary,
    })
}

fn summary_of(date: NaiveDate, mut activities: Vec<Activity>) -> Summary {
    let total_minutes = total_minutes(&activities);
    // Stable sort keeps insertion order among equal durations.
    activities.sort_by(|a, b| b.minutes.cmp(&a.minutes));

    Summary {
        date,
        activities,
        total_minutes,
        is_complete: total_minutes == DAILY_BUDGET_MINUTES,
    }
}

pub fn total_minutes(activities: &[Activity]) -> i64 {
    activities.iter().map(|a| i64::from(a.minutes)).sum()
}

pub fn by_category(activities: &[Activity]) -> BTreeMap<String, CategoryTotal> {
    let mut totals: BTreeMap<String, (i64, usize)> = BTreeMap::new();
    for activity in activities {
        let key = activity.category.as_deref().unwrap_or(UNCATEGORIZED).to_string();
        let entry = totals.entry(key).or_insert((0, 0));
        entry.0 += i64::from(activity.minutes);
        entry.1 += 1;
    }

    totals
        .into_iter()
        .map(|(category, (total_minutes, count))| {
            let total = CategoryTotal {
                total_minutes,
                count,
                percentage: share_of_day(total_minutes),
            };
            (category, total)
        })
        .collect()
}

/// Lays activities back to back in the given order starting at minute 0.
/// Only a complete day covers all 24 hours.
pub fn timeline(activities: &[Activity]) -> Vec<TimelineBlock> {
    let mut offset = 0i64;
    activities
        .iter()
        .map(|activity| {
            let duration = i64::from(activity.minutes);
            let block = TimelineBlock {
                activity: activity.clone(),
                start_offset_minutes: offset,
                duration_minutes: duration,
                start_percent: percent(offset),
                width_percent: percent(duration),
            };
            offset += duration;
            block
        })
        .collect()
}

fn percent(minutes: i64) -> f64 {
    minutes as f64 / DAILY_BUDGET_MINUTES as f64 * 100.0
}

fn share_of_day(minutes: i64) -> f64 {
    (percent(minutes) * 10.0).round() / 10.0
}
