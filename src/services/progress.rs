//! Checklist progress: daily completion, Monday-based weekly buckets and streaks.
//!
//! Everything here is a pure function over the client's plan and checklist rows so
//! the same numbers come out whether the caller is the API or a test.

use chrono::NaiveDate;
use std::collections::{BTreeSet, HashSet};

use crate::models::{
    week_start, ChecklistItem, ChecklistItemType, DayProgress, PlannedItem, WeekProgress,
};

fn percent(completed: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (completed * 100 + total / 2) / total
}

/// Items assigned for `date`: scheduled that day or unscheduled
pub fn planned_for(plan: &[PlannedItem], date: NaiveDate) -> HashSet<(ChecklistItemType, uuid::Uuid)> {
    plan.iter()
        .filter(|item| item.is_active_on(date))
        .map(|item| (item.item_type, item.item_id))
        .collect()
}

pub fn day_progress(plan: &[PlannedItem], entries: &[ChecklistItem], date: NaiveDate) -> DayProgress {
    let planned = planned_for(plan, date);

    let completed: HashSet<_> = entries
        .iter()
        .filter(|entry| entry.date == date && entry.completed)
        .map(|entry| (entry.item_type, entry.item_id))
        .filter(|key| planned.contains(key))
        .collect();

    let total = planned.len() as u32;
    let completed = completed.len() as u32;

    DayProgress {
        date,
        completed,
        total,
        percent: percent(completed, total),
    }
}

/// Seven days, Monday to Sunday, of the week containing `date`. Stops early
/// at the end of the calendar.
pub fn week_progress(plan: &[PlannedItem], entries: &[ChecklistItem], date: NaiveDate) -> WeekProgress {
    let start = week_start(date);

    let days: Vec<DayProgress> = std::iter::successors(Some(start), |day| day.succ_opt())
        .take(7)
        .map(|day| day_progress(plan, entries, day))
        .collect();

    let completed = days.iter().map(|day| day.completed).sum();
    let total = days.iter().map(|day| day.total).sum();

    WeekProgress {
        week_start: start,
        days,
        completed,
        total,
        percent: percent(completed, total),
    }
}

/// Days on which at least one item was ticked off
pub fn completed_days(entries: &[ChecklistItem]) -> BTreeSet<NaiveDate> {
    entries
        .iter()
        .filter(|entry| entry.completed)
        .map(|entry| entry.date)
        .collect()
}

/// Consecutive active days ending today. A today with nothing ticked yet
/// does not break the run, counting then starts from yesterday.
pub fn current_streak(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut cursor = if days.contains(&today) {
        Some(today)
    } else {
        today.pred_opt()
    };

    let mut streak = 0;
    while let Some(day) = cursor.filter(|day| days.contains(day)) {
        streak += 1;
        cursor = day.pred_opt();
    }
    streak
}

pub fn longest_streak(days: &BTreeSet<NaiveDate>) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for &day in days {
        run = match previous {
            Some(prev) if prev.succ_opt() == Some(day) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
    }

    longest
}
