use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::activity::Activity;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Summary {
    pub date: NaiveDate,
    /// Longest first; equal durations keep insertion order.
    pub activities: Vec<Activity>,
    pub total_minutes: i64,
    pub is_complete: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub total_minutes: i64,
    pub count: usize,
    /// Share of the full 24-hour day, one decimal place.
    pub percentage: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TimelineBlock {
    pub activity: Activity,
    pub start_offset_minutes: i64,
    pub duration_minutes: i64,
    pub start_percent: f64,
    pub width_percent: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DayAnalytics {
    #[serde(flatten)]
    pub summary: Summary,
    pub remaining_minutes: i64,
    pub activity_count: usize,
    pub category_count: usize,
    pub top_activity: Option<Activity>,
    pub categories: BTreeMap<String, CategoryTotal>,
    pub timeline: Vec<TimelineBlock>,
}
