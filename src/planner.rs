use crate::id::IdGenerator;
use crate::model::{
    find_section_mut, find_task_mut, seed_document, Document, Priority, Section, SectionId, Task,
    TaskId,
};
use crate::render::{render, Grid};
use crate::storage::{Store, StoreError};
use chrono::NaiveDate;

/// What the caller should do after an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing matched; the document is untouched and nothing was written.
    Unchanged,
    /// Saved, but the current view tree stays (the user is typing).
    Persisted,
    /// Saved; rebuild the view tree.
    Redraw,
}

/// One planner operation as data, so view controls can carry it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    CreateSection(String),
    AddTask(SectionId),
    ToggleCompleted {
        section_id: SectionId,
        task_id: TaskId,
    },
    UpdateTitle {
        section_id: SectionId,
        task_id: TaskId,
        text: String,
    },
    UpdatePriority {
        section_id: SectionId,
        task_id: TaskId,
        priority: Priority,
    },
    UpdateDeadline {
        section_id: SectionId,
        task_id: TaskId,
        deadline: Option<NaiveDate>,
    },
}

/// Session state for one loaded view. All document changes go through here
/// and are written to the store before returning.
#[derive(Debug)]
pub struct Planner {
    view: String,
    document: Document,
    pending_focus: Option<TaskId>,
    ids: IdGenerator,
    store: Store,
    save_error: Option<StoreError>,
    seeded: bool,
}

impl Planner {
    /// Load `view` from the store, seeding the default sections when nothing
    /// usable is stored.
    pub fn load(store: Store, view: &str) -> Self {
        let mut ids = IdGenerator::new();
        let seeded;
        let document = match store.load(view) {
            Some(doc) => {
                for section in &doc {
                    ids.register(&section.id);
                    for task in &section.tasks {
                        ids.register(&task.id);
                    }
                }
                seeded = false;
                doc
            }
            None => {
                log::info!("seeding default sections for view {}", view);
                seeded = true;
                seed_document(|| ids.create_id())
            }
        };
        Planner {
            view: view.to_string(),
            document,
            pending_focus: None,
            ids,
            store,
            save_error: None,
            seeded,
        }
    }

    pub fn view(&self) -> &str {
        &self.view
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn pending_focus(&self) -> Option<&str> {
        self.pending_focus.as_deref()
    }

    /// Draw the current document, consuming the pending-focus marker.
    pub fn render(&mut self) -> Grid {
        render(&self.document, &mut self.pending_focus)
    }

    /// Whether the document came from the default blueprint and has not been
    /// written yet.
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Write a freshly seeded document so the ids it carries stay valid
    /// beyond this session. Stored documents are left alone.
    pub fn persist_seed(&mut self) -> Outcome {
        if !self.seeded {
            return Outcome::Unchanged;
        }
        self.persist(Outcome::Persisted)
    }

    /// Last save failure, if any, cleared on read.
    pub fn take_save_error(&mut self) -> Option<StoreError> {
        self.save_error.take()
    }

    pub fn apply(&mut self, action: Action) -> Outcome {
        match action {
            Action::CreateSection(name) => self.create_section(&name),
            Action::AddTask(section_id) => self.add_task(&section_id),
            Action::ToggleCompleted {
                section_id,
                task_id,
            } => self.toggle_completed(&section_id, &task_id),
            Action::UpdateTitle {
                section_id,
                task_id,
                text,
            } => self.update_title(&section_id, &task_id, &text),
            Action::UpdatePriority {
                section_id,
                task_id,
                priority,
            } => self.update_priority(&section_id, &task_id, priority),
            Action::UpdateDeadline {
                section_id,
                task_id,
                deadline,
            } => self.update_deadline(&section_id, &task_id, deadline),
        }
    }

    pub fn create_section(&mut self, name: &str) -> Outcome {
        let name = name.trim();
        if name.is_empty() {
            return Outcome::Unchanged;
        }
        let id = self.ids.create_id();
        self.document.push(Section::new(id, name));
        self.persist(Outcome::Redraw)
    }

    /// Append a blank task and mark it to receive focus on the next render.
    pub fn add_task(&mut self, section_id: &str) -> Outcome {
        if !self.document.iter().any(|s| s.id == section_id) {
            log::debug!("add_task: no section {}", section_id);
            return Outcome::Unchanged;
        }
        let id = self.ids.create_id();
        if let Some(section) = find_section_mut(&mut self.document, section_id) {
            section.tasks.push(Task::blank(id.clone()));
        }
        self.pending_focus = Some(id);
        self.persist(Outcome::Redraw)
    }

    pub fn toggle_completed(&mut self, section_id: &str, task_id: &str) -> Outcome {
        self.update_task(section_id, task_id, Outcome::Redraw, |task| {
            task.completed = !task.completed
        })
    }

    /// Title edits are saved but do not ask for a rebuild, so an open editor
    /// keeps its caret.
    pub fn update_title(&mut self, section_id: &str, task_id: &str, text: &str) -> Outcome {
        self.update_task(section_id, task_id, Outcome::Persisted, |task| {
            task.title = text.to_string()
        })
    }

    pub fn update_priority(&mut self, section_id: &str, task_id: &str, value: Priority) -> Outcome {
        self.update_task(section_id, task_id, Outcome::Redraw, |task| {
            task.priority = value
        })
    }

    pub fn update_deadline(
        &mut self,
        section_id: &str,
        task_id: &str,
        value: Option<NaiveDate>,
    ) -> Outcome {
        self.update_task(section_id, task_id, Outcome::Redraw, |task| {
            task.deadline = value
        })
    }

    fn update_task<F>(&mut self, section_id: &str, task_id: &str, done: Outcome, f: F) -> Outcome
    where
        F: FnOnce(&mut Task),
    {
        match find_task_mut(&mut self.document, section_id, task_id) {
            Some(task) => f(task),
            None => {
                log::debug!("no task {} in section {}", task_id, section_id);
                return Outcome::Unchanged;
            }
        }
        self.persist(done)
    }

    fn persist(&mut self, done: Outcome) -> Outcome {
        match self.store.save(&self.view, &self.document) {
            Ok(()) => self.seeded = false,
            Err(err) => {
                log::error!("saving view {}: {}", self.view, err);
                self.save_error = Some(err);
            }
        }
        done
    }
}
