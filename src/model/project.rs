use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::work_item::{Relation, WorkItem};

/// A timeline project containing work items, relations, and metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub items: Vec<WorkItem>,
    #[serde(default)]
    pub relations: Vec<Relation>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            name: "Untitled Project".to_string(),
            items: Vec::new(),
            relations: Vec::new(),
            created: Utc::now(),
            modified: Utc::now(),
        }
    }
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Touch the modified timestamp.
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }

    pub fn item(&self, id: Uuid) -> Option<&WorkItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn item_mut(&mut self, id: Uuid) -> Option<&mut WorkItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    /// Add a relation unless it already exists or links an item to itself.
    /// Returns whether the relation was added.
    pub fn add_relation(&mut self, relation: Relation) -> bool {
        if relation.from == relation.to || self.relations.contains(&relation) {
            return false;
        }
        self.relations.push(relation);
        true
    }

    /// Remove an item together with every relation touching it.
    pub fn remove_item(&mut self, id: Uuid) {
        self.items.retain(|i| i.id != id);
        self.relations.retain(|r| r.from != id && r.to != id);
    }

    /// Earliest and latest dated day across all items.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.items
            .iter()
            .filter_map(WorkItem::span)
            .fold(None, |acc, (s, e)| match acc {
                None => Some((s, e)),
                Some((min, max)) => Some((min.min(s), max.max(e))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_add_relation_rejects_duplicates_and_self_links() {
        let mut project = Project::new("P");
        let a = WorkItem::new_milestone("A", None);
        let b = WorkItem::new_milestone("B", None);
        let rel = Relation { from: a.id, to: b.id };

        assert!(project.add_relation(rel));
        assert!(!project.add_relation(rel));
        assert!(!project.add_relation(Relation { from: a.id, to: a.id }));
        assert_eq!(project.relations.len(), 1);
    }

    #[test]
    fn test_remove_item_drops_relations() {
        let mut project = Project::new("P");
        let a = WorkItem::new_milestone("A", Some(ymd(2024, 1, 1)));
        let b = WorkItem::new_milestone("B", Some(ymd(2024, 1, 2)));
        project.add_relation(Relation { from: a.id, to: b.id });
        let a_id = a.id;
        project.items = vec![a, b];

        project.remove_item(a_id);
        assert_eq!(project.items.len(), 1);
        assert!(project.relations.is_empty());
    }

    #[test]
    fn test_date_range_skips_undated_items() {
        let mut project = Project::new("P");
        project.items = vec![
            WorkItem::new_milestone("A", Some(ymd(2024, 3, 10))),
            WorkItem::new_milestone("Undated", None),
            WorkItem::new("T", "Task", Some(ymd(2024, 2, 1)), Some(ymd(2024, 2, 20))),
        ];
        assert_eq!(project.date_range(), Some((ymd(2024, 2, 1), ymd(2024, 3, 10))));

        let empty = Project::new("Empty");
        assert_eq!(empty.date_range(), None);
    }
}
