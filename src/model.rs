use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub type SectionId = String;
pub type TaskId = String;

/// Stored section list for one view.
pub type Document = Vec<Section>;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    High,
    Moderate,
    Low,
}

pub const PRIORITIES: [Priority; 3] = [Priority::High, Priority::Moderate, Priority::Low];

impl Priority {
    /// Display rank; lower sorts first.
    pub fn order(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Moderate => 1,
            Priority::Low => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Moderate => "moderate",
            Priority::Low => "low",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Moderate => "Moderate",
            Priority::Low => "Low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Priority::High),
            "moderate" => Some(Priority::Moderate),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(
        default,
        serialize_with = "serialize_deadline",
        deserialize_with = "deserialize_deadline"
    )]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Section {
    pub id: SectionId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Task {
    /// A freshly added task: untitled, high priority, no deadline, open.
    pub fn blank(id: TaskId) -> Self {
        Task {
            id,
            title: String::new(),
            priority: Priority::High,
            deadline: None,
            completed: false,
        }
    }
}

impl Section {
    pub fn new(id: SectionId, title: impl Into<String>) -> Self {
        Section {
            id,
            title: title.into(),
            tasks: Vec::new(),
        }
    }

    pub fn find_task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == task_id)
    }

    /// Tasks in display order: by priority, insertion order among equals.
    pub fn tasks_by_priority(&self) -> Vec<&Task> {
        let mut sorted: Vec<&Task> = self.tasks.iter().collect();
        sorted.sort_by_key(|t| t.priority.order());
        sorted
    }
}

pub fn find_section_mut<'a>(doc: &'a mut Document, section_id: &str) -> Option<&'a mut Section> {
    doc.iter_mut().find(|s| s.id == section_id)
}

pub fn find_task_mut<'a>(
    doc: &'a mut Document,
    section_id: &str,
    task_id: &str,
) -> Option<&'a mut Task> {
    find_section_mut(doc, section_id)?.find_task_mut(task_id)
}

/// Deadline text as entered in a date field: `YYYY-MM-DD`, or empty for none.
pub fn parse_deadline(input: &str) -> Result<Option<NaiveDate>, chrono::ParseError> {
    let raw = input.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map(Some)
}

pub fn format_deadline(deadline: Option<NaiveDate>) -> String {
    deadline
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn serialize_deadline<S>(deadline: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_deadline(*deadline))
}

fn deserialize_deadline<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    // A hand-edited date should not cost the whole document.
    match parse_deadline(&raw) {
        Ok(deadline) => Ok(deadline),
        Err(err) => {
            log::warn!("dropping unreadable deadline {:?}: {}", raw, err);
            Ok(None)
        }
    }
}

pub struct BlueprintTask {
    pub title: &'static str,
    pub priority: Priority,
    pub deadline: &'static str,
    pub completed: bool,
}

pub struct BlueprintSection {
    pub title: &'static str,
    pub tasks: &'static [BlueprintTask],
}

/// Seed content for a view that has nothing stored yet. Titles are kept as
/// written.
pub const DEFAULT_BLUEPRINT: &[BlueprintSection] = &[
    BlueprintSection {
        title: "monday",
        tasks: &[BlueprintTask {
            title: "Math Revision",
            priority: Priority::High,
            deadline: "2025-11-27",
            completed: false,
        }],
    },
    BlueprintSection {
        title: "Tuesday",
        tasks: &[
            BlueprintTask {
                title: "Project Outline",
                priority: Priority::Moderate,
                deadline: "",
                completed: false,
            },
            BlueprintTask {
                title: "Grocery Pickup",
                priority: Priority::Low,
                deadline: "",
                completed: false,
            },
        ],
    },
    BlueprintSection {
        title: "wed",
        tasks: &[],
    },
    BlueprintSection {
        title: "thursday",
        tasks: &[BlueprintTask {
            title: "Gym Session",
            priority: Priority::High,
            deadline: "",
            completed: false,
        }],
    },
];

/// Materialize the blueprint with a fresh id for every section and task.
pub fn seed_document(mut next_id: impl FnMut() -> String) -> Document {
    DEFAULT_BLUEPRINT
        .iter()
        .map(|blueprint| Section {
            id: next_id(),
            title: blueprint.title.to_string(),
            tasks: blueprint
                .tasks
                .iter()
                .map(|task| Task {
                    id: next_id(),
                    title: if task.title.is_empty() {
                        "New Task".to_string()
                    } else {
                        task.title.to_string()
                    },
                    priority: task.priority,
                    deadline: parse_deadline(task.deadline).ok().flatten(),
                    completed: task.completed,
                })
                .collect(),
        })
        .collect()
}
