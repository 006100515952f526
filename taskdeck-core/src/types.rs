use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::limits::AccountPlan;

/// Current version of the persisted project document.
pub const DATA_VERSION: u32 = 1;

/// The three fixed board columns. The set never changes for the lifetime
/// of a project; only the task sequences inside them do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Todo,
    Doing,
    Done,
}

impl ColumnKind {
    pub const ALL: [ColumnKind; 3] = [ColumnKind::Todo, ColumnKind::Doing, ColumnKind::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Todo => "todo",
            ColumnKind::Doing => "doing",
            ColumnKind::Done => "done",
        }
    }
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single unit of work on the board.
///
/// `id` and `created_at` are fixed at creation; only `text` is ever edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskItem {
    pub id: String,
    pub text: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl TaskItem {
    /// New task with a fresh client-side id and creation timestamp.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// The three ordered task sequences, keyed by column name on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Columns {
    #[serde(default)]
    pub todo: Vec<TaskItem>,
    #[serde(default)]
    pub doing: Vec<TaskItem>,
    #[serde(default)]
    pub done: Vec<TaskItem>,
}

impl Columns {
    pub fn get(&self, kind: ColumnKind) -> &Vec<TaskItem> {
        match kind {
            ColumnKind::Todo => &self.todo,
            ColumnKind::Doing => &self.doing,
            ColumnKind::Done => &self.done,
        }
    }

    pub fn get_mut(&mut self, kind: ColumnKind) -> &mut Vec<TaskItem> {
        match kind {
            ColumnKind::Todo => &mut self.todo,
            ColumnKind::Doing => &mut self.doing,
            ColumnKind::Done => &mut self.done,
        }
    }

    /// Iterate columns in their fixed board order.
    pub fn iter(&self) -> impl Iterator<Item = (ColumnKind, &Vec<TaskItem>)> {
        ColumnKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }
}

/// The versioned document persisted per project.
///
/// Wire shape: `{ "v": <number>, "columns": { "todo": [...], "doing": [...],
/// "done": [...] } }`. Loaders must run [`crate::validate::validate_data`]
/// on anything deserialized from outside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectData {
    #[serde(deserialize_with = "version::deserialize")]
    pub v: u32,
    pub columns: Columns,
}

impl ProjectData {
    /// Empty document at the current version.
    pub fn new() -> Self {
        Self {
            v: DATA_VERSION,
            columns: Columns::default(),
        }
    }

    pub fn count(&self, kind: ColumnKind) -> usize {
        self.columns.get(kind).len()
    }

    pub fn total_count(&self) -> usize {
        ColumnKind::ALL.iter().map(|kind| self.count(*kind)).sum()
    }

    /// Locate a task anywhere on the board. A well-formed document holds
    /// each id in exactly one column.
    pub fn find_task(&self, task_id: &str) -> Option<(ColumnKind, usize)> {
        for (kind, tasks) in self.columns.iter() {
            if let Some(index) = tasks.iter().position(|task| task.id == task_id) {
                return Some((kind, index));
            }
        }
        None
    }
}

impl Default for ProjectData {
    fn default() -> Self {
        Self::new()
    }
}

/// The project envelope. `id` is empty until the gateway has persisted the
/// project; `user_id` is absent for temporary (unauthenticated) projects.
/// Both timestamps are maintained by the persistence layer, never here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectModel {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub data: ProjectData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl ProjectModel {
    /// Fresh, not-yet-persisted project with empty columns.
    pub fn new_draft(owner: Option<&Identity>) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            title: "New Project".to_string(),
            description: None,
            data: ProjectData::new(),
            user_id: owner.map(|identity| identity.id.clone()),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_persisted(&self) -> bool {
        !self.id.is_empty()
    }
}

/// Payload for the gateway's create operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProject {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub data: ProjectData,
}

/// Partial update payload for the gateway's update operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ProjectData>,
}

/// Summary entry for project listings (dashboard rendering).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    pub todo_count: usize,
    pub doing_count: usize,
    pub done_count: usize,
    pub total_count: usize,
}

impl From<&ProjectModel> for ProjectSummary {
    fn from(project: &ProjectModel) -> Self {
        Self {
            id: project.id.clone(),
            title: project.title.clone(),
            description: project.description.clone(),
            created_at: project.created_at,
            updated_at: project.updated_at,
            todo_count: project.data.count(ColumnKind::Todo),
            doing_count: project.data.count(ColumnKind::Doing),
            done_count: project.data.count(ColumnKind::Done),
            total_count: project.data.total_count(),
        }
    }
}

/// Authenticated user identity, as handed over by the embedding
/// application's auth layer. The core only reads `id` (ownership scoping)
/// and `plan` (create limits); everything else is carried opaquely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub plan: AccountPlan,
}

/// Reference to the task currently open for inline editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedTask {
    pub id: String,
    pub column: ColumnKind,
}

/// Timestamps are RFC 3339 strings on the wire. Historical documents wrote
/// epoch milliseconds instead; those are migrated on load. Anything else is
/// rejected.
mod timestamp {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Millis(i64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(text) => DateTime::parse_from_rfc3339(&text)
                .map(|parsed| parsed.with_timezone(&Utc))
                .map_err(|err| Error::custom(format!("invalid RFC 3339 timestamp: {err}"))),
            Raw::Millis(millis) => Utc
                .timestamp_millis_opt(millis)
                .single()
                .ok_or_else(|| Error::custom("epoch timestamp out of range")),
        }
    }
}

/// `v` is canonically a number. Revisions of the original document format
/// wrote it as a numeric string; those are migrated on load.
mod version {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(u32),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Num(value) => Ok(value),
            Raw::Text(text) => text
                .trim()
                .parse::<u32>()
                .map_err(|_| Error::custom(format!("invalid document version: {text:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_data() -> ProjectData {
        let mut data = ProjectData::new();
        data.columns.todo.push(TaskItem::new("write spec"));
        data.columns.doing.push(TaskItem::new("build core"));
        data.columns.done.push(TaskItem::new("pick stack"));
        data
    }

    #[test]
    fn wire_round_trip_is_deep_equal() {
        let data = sample_data();
        let encoded = serde_json::to_string(&data).unwrap();
        let decoded: ProjectData = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn wire_shape_uses_expected_keys() {
        let encoded = serde_json::to_value(sample_data()).unwrap();
        assert_eq!(encoded["v"], DATA_VERSION);
        assert!(encoded["columns"]["todo"].is_array());
        assert!(encoded["columns"]["doing"].is_array());
        assert!(encoded["columns"]["done"].is_array());
        let task = &encoded["columns"]["todo"][0];
        assert!(task["id"].is_string());
        assert_eq!(task["text"], "write spec");
        assert!(task["created_at"].is_string());
    }

    #[test]
    fn loads_epoch_millis_timestamps() {
        let raw = r#"{
            "v": 1,
            "columns": {
                "todo": [{ "id": "t1", "text": "legacy", "created_at": 1700000000000 }],
                "doing": [],
                "done": []
            }
        }"#;
        let data: ProjectData = serde_json::from_str(raw).unwrap();
        assert_eq!(data.columns.todo[0].created_at.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn rejects_malformed_timestamps() {
        let raw = r#"{
            "v": 1,
            "columns": {
                "todo": [{ "id": "t1", "text": "bad", "created_at": "yesterday" }],
                "doing": [],
                "done": []
            }
        }"#;
        assert!(serde_json::from_str::<ProjectData>(raw).is_err());
    }

    #[test]
    fn migrates_string_versions() {
        let raw = r#"{ "v": "1", "columns": { "todo": [], "doing": [], "done": [] } }"#;
        let data: ProjectData = serde_json::from_str(raw).unwrap();
        assert_eq!(data.v, 1);
    }

    #[test]
    fn rejects_non_numeric_versions() {
        let raw = r#"{ "v": "one", "columns": { "todo": [], "doing": [], "done": [] } }"#;
        assert!(serde_json::from_str::<ProjectData>(raw).is_err());
    }

    #[test]
    fn missing_columns_default_to_empty() {
        let raw = r#"{ "v": 1, "columns": { "todo": [] } }"#;
        let data: ProjectData = serde_json::from_str(raw).unwrap();
        assert!(data.columns.doing.is_empty());
        assert!(data.columns.done.is_empty());
    }

    #[test]
    fn find_task_reports_column_and_index() {
        let data = sample_data();
        let id = data.columns.doing[0].id.clone();
        assert_eq!(data.find_task(&id), Some((ColumnKind::Doing, 0)));
        assert_eq!(data.find_task("missing"), None);
    }

    #[test]
    fn total_count_sums_all_columns() {
        let data = sample_data();
        assert_eq!(data.total_count(), 3);
        assert_eq!(data.count(ColumnKind::Todo), 1);
    }

    #[test]
    fn new_draft_is_empty_and_unpersisted() {
        let project = ProjectModel::new_draft(None);
        assert!(!project.is_persisted());
        assert_eq!(project.title, "New Project");
        assert_eq!(project.data.v, DATA_VERSION);
        assert_eq!(project.data.total_count(), 0);
        assert!(project.user_id.is_none());
    }

    #[test]
    fn summary_counts_match_document() {
        let mut project = ProjectModel::new_draft(None);
        project.id = "p1".to_string();
        project.data = sample_data();
        project.data.columns.done.push(TaskItem::new("ship"));

        let summary = ProjectSummary::from(&project);
        assert_eq!(summary.id, "p1");
        assert_eq!(summary.todo_count, 1);
        assert_eq!(summary.doing_count, 1);
        assert_eq!(summary.done_count, 2);
        assert_eq!(summary.total_count, 4);
    }
}
