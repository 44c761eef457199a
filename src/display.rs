//! Pure derivation of the display list from the raw task collection.
//! Never mutates its input and never fails on valid data: an empty or
//! fully filtered-out result is an output, not an error.

use serde::{Deserialize, Serialize};

use crate::types::{Priority, Task, TaskStatus};

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    fn matches(self, status: TaskStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => status == TaskStatus::Active,
            StatusFilter::Completed => status == TaskStatus::Completed,
        }
    }

    pub fn cycled(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Active,
            StatusFilter::Active => StatusFilter::Completed,
            StatusFilter::Completed => StatusFilter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(Priority),
}

impl PriorityFilter {
    fn matches(self, priority: Priority) -> bool {
        match self {
            PriorityFilter::All => true,
            PriorityFilter::Only(wanted) => priority == wanted,
        }
    }

    pub fn cycled(self) -> Self {
        match self {
            PriorityFilter::All => PriorityFilter::Only(Priority::Critical),
            PriorityFilter::Only(Priority::Critical) => PriorityFilter::Only(Priority::High),
            PriorityFilter::Only(Priority::High) => PriorityFilter::Only(Priority::Medium),
            PriorityFilter::Only(Priority::Medium) => PriorityFilter::Only(Priority::Low),
            PriorityFilter::Only(Priority::Low) => PriorityFilter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PriorityFilter::All => "all",
            PriorityFilter::Only(priority) => priority.as_str(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub status: StatusFilter,
    pub priority: PriorityFilter,
}

impl FilterSpec {
    pub fn is_pass_through(&self) -> bool {
        self.status == StatusFilter::All && self.priority == PriorityFilter::All
    }
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum SortKey {
    Deadline,
    Priority,
    #[default]
    CreatedAt,
}

impl SortKey {
    pub fn cycled(self) -> Self {
        match self {
            SortKey::CreatedAt => SortKey::Deadline,
            SortKey::Deadline => SortKey::Priority,
            SortKey::Priority => SortKey::CreatedAt,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Deadline => "deadline",
            SortKey::Priority => "priority",
            SortKey::CreatedAt => "created",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "deadline" => Some(SortKey::Deadline),
            "priority" => Some(SortKey::Priority),
            "created" | "created_at" | "createdat" => Some(SortKey::CreatedAt),
            _ => None,
        }
    }
}

/// Case-insensitive substring match over title and description. A task
/// without a description never matches a non-empty query through that
/// field.
fn matches_query(task: &Task, query_lower: &str) -> bool {
    if query_lower.is_empty() {
        return true;
    }
    if task.title.to_lowercase().contains(query_lower) {
        return true;
    }
    task.description
        .as_deref()
        .is_some_and(|description| description.to_lowercase().contains(query_lower))
}

/// Derives the ordered display list. Output is a permutation-subset of
/// the input: tasks are only ever excluded by the given predicates, and
/// ties keep their input order (stable sort).
pub fn display_list(tasks: &[Task], filter: &FilterSpec, query: &str, sort: SortKey) -> Vec<Task> {
    let query_lower = query.trim().to_lowercase();

    let mut result: Vec<Task> = tasks
        .iter()
        .filter(|task| filter.status.matches(task.status))
        .filter(|task| filter.priority.matches(task.priority))
        .filter(|task| matches_query(task, &query_lower))
        .cloned()
        .collect();

    match sort {
        // Tasks without a deadline sort after all dated ones, keeping
        // their relative order among themselves.
        SortKey::Deadline => result.sort_by(|a, b| match (a.deadline, b.deadline) {
            (Some(left), Some(right)) => left.cmp(&right),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }),
        SortKey::Priority => result.sort_by_key(|task| task.priority.rank()),
        SortKey::CreatedAt => result.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }

    result
}

/// The two empty outcomes carry different messaging: an empty account is
/// not the same situation as filters that matched nothing.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum EmptyKind {
    NoTasksYet,
    NoMatches,
}

pub fn classify_empty(raw_count: usize) -> EmptyKind {
    if raw_count == 0 {
        EmptyKind::NoTasksYet
    } else {
        EmptyKind::NoMatches
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::types::TaskStatus;

    fn task(title: &str, priority: Priority, created_day: u32) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            priority,
            status: TaskStatus::Active,
            deadline: None,
            time_estimate: None,
            tags: Vec::new(),
            created_at: Utc.with_ymd_and_hms(2024, 1, created_day, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, created_day, 0, 0, 0).unwrap(),
        }
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|task| task.title.as_str()).collect()
    }

    #[test]
    fn test_priority_sort_orders_critical_first() {
        let raw = vec![
            task("A", Priority::Low, 1),
            task("B", Priority::Critical, 2),
        ];
        let shown = display_list(&raw, &FilterSpec::default(), "", SortKey::Priority);
        assert_eq!(titles(&shown), vec!["B", "A"]);
    }

    #[test]
    fn test_created_at_descending_is_default() {
        let raw = vec![
            task("oldest", Priority::Medium, 1),
            task("newest", Priority::Medium, 3),
            task("middle", Priority::Medium, 2),
        ];
        let shown = display_list(&raw, &FilterSpec::default(), "", SortKey::default());
        assert_eq!(titles(&shown), vec!["newest", "middle", "oldest"]);
    }

    #[test]
    fn test_status_filter_keeps_only_active() {
        let mut raw = vec![
            task("a", Priority::Medium, 1),
            task("b", Priority::Medium, 2),
            task("c", Priority::Medium, 3),
        ];
        raw[0].status = TaskStatus::Completed;
        raw[2].status = TaskStatus::Completed;

        let filter = FilterSpec {
            status: StatusFilter::Active,
            ..FilterSpec::default()
        };
        let shown = display_list(&raw, &filter, "", SortKey::CreatedAt);
        assert_eq!(titles(&shown), vec!["b"]);
    }

    #[test]
    fn test_search_matches_title_substring_case_insensitively() {
        let raw = vec![
            task("Project plan", Priority::Medium, 1),
            task("Buy milk", Priority::Medium, 2),
        ];
        let shown = display_list(&raw, &FilterSpec::default(), "proj", SortKey::CreatedAt);
        assert_eq!(titles(&shown), vec!["Project plan"]);
    }

    #[test]
    fn test_search_matches_description_but_not_absent_description() {
        let mut raw = vec![
            task("alpha", Priority::Medium, 1),
            task("beta", Priority::Medium, 2),
        ];
        raw[0].description = Some("Quarterly ROADMAP review".to_string());

        let shown = display_list(&raw, &FilterSpec::default(), "roadmap", SortKey::CreatedAt);
        assert_eq!(titles(&shown), vec!["alpha"]);
    }

    #[test]
    fn test_deadline_sort_places_undated_last_in_input_order() {
        let mut raw = vec![
            task("undated-1", Priority::Medium, 1),
            task("late", Priority::Medium, 2),
            task("undated-2", Priority::Medium, 3),
            task("early", Priority::Medium, 4),
        ];
        raw[1].deadline = Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        raw[3].deadline = Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());

        let shown = display_list(&raw, &FilterSpec::default(), "", SortKey::Deadline);
        assert_eq!(titles(&shown), vec!["early", "late", "undated-1", "undated-2"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let raw = vec![
            task("first", Priority::High, 1),
            task("second", Priority::High, 1),
            task("third", Priority::High, 1),
        ];
        let shown = display_list(&raw, &FilterSpec::default(), "", SortKey::Priority);
        assert_eq!(titles(&shown), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_derivation_is_pure_and_idempotent() {
        let mut raw = vec![
            task("keep", Priority::Critical, 2),
            task("drop", Priority::Low, 1),
        ];
        raw[1].status = TaskStatus::Completed;
        let before = raw.clone();
        let filter = FilterSpec {
            status: StatusFilter::Active,
            ..FilterSpec::default()
        };

        let first = display_list(&raw, &filter, "keep", SortKey::Priority);
        let second = display_list(&raw, &filter, "keep", SortKey::Priority);
        assert_eq!(first, second);
        assert_eq!(raw, before);
    }

    #[test]
    fn test_output_is_subset_of_input_ids() {
        let raw: Vec<Task> = (1usize..=9)
            .map(|day| task(&format!("t{day}"), Priority::ALL[day % 4], day as u32))
            .collect();
        let filter = FilterSpec {
            priority: PriorityFilter::Only(Priority::High),
            ..FilterSpec::default()
        };

        let shown = display_list(&raw, &filter, "", SortKey::CreatedAt);
        for task in &shown {
            assert!(raw.iter().any(|original| original.id == task.id));
            assert_eq!(task.priority, Priority::High);
        }
    }

    #[test]
    fn test_priority_filter_all_is_pass_through() {
        let raw = vec![
            task("a", Priority::Critical, 1),
            task("b", Priority::Low, 2),
        ];
        let shown = display_list(&raw, &FilterSpec::default(), "", SortKey::CreatedAt);
        assert_eq!(shown.len(), 2);
    }

    #[test]
    fn test_empty_classification_distinguishes_no_tasks_from_no_matches() {
        assert_eq!(classify_empty(0), EmptyKind::NoTasksYet);
        assert_eq!(classify_empty(5), EmptyKind::NoMatches);
    }

    #[test]
    fn test_filter_cycles_cover_all_values() {
        let mut status = StatusFilter::default();
        for _ in 0..3 {
            status = status.cycled();
        }
        assert_eq!(status, StatusFilter::default());

        let mut priority = PriorityFilter::default();
        for _ in 0..5 {
            priority = priority.cycled();
        }
        assert_eq!(priority, PriorityFilter::default());
    }
}
