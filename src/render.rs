//! Projection of a planner document into the grid of cards the UI draws.
//!
//! `render` rebuilds everything from the document; it never looks at the
//! previous grid. Each interactive element is a [`Control`] that knows which
//! planner [`Action`] it drives.

use crate::model::{format_deadline, Document, Priority, Section, SectionId, Task, TaskId};
use crate::planner::Action;
use chrono::NaiveDate;

pub const EMPTY_SECTION_TEXT: &str = "No tasks yet";
pub const NEW_TASK_LABEL: &str = "+ New Task";
pub const CREATE_SECTION_LABEL: &str = "+ Create New Section";
pub const NEW_SECTION_PROMPT: &str = "Name of the new section?";
pub const TITLE_PLACEHOLDER: &str = "Task description";
pub const CHECK_MARK: &str = "✓";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    pub cards: Vec<Card>,
    /// Control that should take input focus once this grid is shown.
    pub focus: Option<Control>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Card {
    Section(SectionCard),
    Create,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionCard {
    pub section_id: SectionId,
    pub title: String,
    pub rows: Vec<TaskRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub section_id: SectionId,
    pub task_id: TaskId,
    pub title: String,
    pub priority: Priority,
    pub deadline: Option<NaiveDate>,
    pub completed: bool,
}

/// The four inputs on a task row, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Toggle,
    Title,
    Priority,
    Deadline,
}

pub const ROW_FIELDS: [Field; 4] = [Field::Toggle, Field::Title, Field::Priority, Field::Deadline];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    Row {
        section_id: SectionId,
        task_id: TaskId,
        field: Field,
    },
    AddTask(SectionId),
    CreateSection,
}

/// Position of a control: card, slot within the card (rows, then the add
/// button), and field within a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub card: usize,
    pub slot: usize,
    pub field: usize,
}

/// Build the grid for `doc`. If `pending_focus` names a task that is drawn,
/// its title field becomes the grid focus and the marker is cleared.
pub fn render(doc: &Document, pending_focus: &mut Option<TaskId>) -> Grid {
    let mut grid = Grid {
        cards: Vec::with_capacity(doc.len() + 1),
        focus: None,
    };
    for section in doc {
        let card = section_card(section);
        if let Some(pending) = pending_focus.as_deref() {
            if let Some(row) = card.rows.iter().find(|r| r.task_id == pending) {
                grid.focus = Some(Control::Row {
                    section_id: row.section_id.clone(),
                    task_id: row.task_id.clone(),
                    field: Field::Title,
                });
                *pending_focus = None;
            }
        }
        grid.cards.push(Card::Section(card));
    }
    grid.cards.push(Card::Create);
    grid
}

fn section_card(section: &Section) -> SectionCard {
    SectionCard {
        section_id: section.id.clone(),
        title: section.title.clone(),
        rows: section
            .tasks_by_priority()
            .into_iter()
            .map(|task| task_row(&section.id, task))
            .collect(),
    }
}

fn task_row(section_id: &str, task: &Task) -> TaskRow {
    TaskRow {
        section_id: section_id.to_string(),
        task_id: task.id.clone(),
        title: task.title.clone(),
        priority: task.priority,
        deadline: task.deadline,
        completed: task.completed,
    }
}

impl SectionCard {
    pub fn empty_message(&self) -> Option<&'static str> {
        self.rows.is_empty().then_some(EMPTY_SECTION_TEXT)
    }

    /// Rows plus the trailing add button.
    pub fn slot_count(&self) -> usize {
        self.rows.len() + 1
    }
}

impl TaskRow {
    pub fn toggle_text(&self) -> &'static str {
        if self.completed {
            CHECK_MARK
        } else {
            " "
        }
    }

    pub fn deadline_text(&self) -> String {
        format_deadline(self.deadline)
    }

    fn control(&self, field: Field) -> Control {
        Control::Row {
            section_id: self.section_id.clone(),
            task_id: self.task_id.clone(),
            field,
        }
    }
}

impl Card {
    pub fn slot_count(&self) -> usize {
        match self {
            Card::Section(card) => card.slot_count(),
            Card::Create => 1,
        }
    }
}

impl Grid {
    pub fn section_cards(&self) -> impl Iterator<Item = &SectionCard> {
        self.cards.iter().filter_map(|c| match c {
            Card::Section(card) => Some(card),
            Card::Create => None,
        })
    }

    pub fn row(&self, task_id: &str) -> Option<&TaskRow> {
        self.section_cards()
            .flat_map(|c| c.rows.iter())
            .find(|r| r.task_id == task_id)
    }

    /// Patch one row's title without rebuilding.
    pub fn set_title(&mut self, task_id: &str, text: &str) -> bool {
        for card in &mut self.cards {
            if let Card::Section(card) = card {
                if let Some(row) = card.rows.iter_mut().find(|r| r.task_id == task_id) {
                    row.title = text.to_string();
                    return true;
                }
            }
        }
        false
    }

    pub fn control_at(&self, cursor: Cursor) -> Option<Control> {
        match self.cards.get(cursor.card)? {
            Card::Create => (cursor.slot == 0).then_some(Control::CreateSection),
            Card::Section(card) => match card.rows.get(cursor.slot) {
                Some(row) => ROW_FIELDS.get(cursor.field).map(|f| row.control(*f)),
                None if cursor.slot == card.rows.len() => {
                    Some(Control::AddTask(card.section_id.clone()))
                }
                None => None,
            },
        }
    }

    pub fn locate(&self, control: &Control) -> Option<Cursor> {
        for (card_idx, card) in self.cards.iter().enumerate() {
            match (card, control) {
                (Card::Create, Control::CreateSection) => {
                    return Some(Cursor {
                        card: card_idx,
                        ..Cursor::default()
                    })
                }
                (Card::Section(card), Control::AddTask(section_id))
                    if &card.section_id == section_id =>
                {
                    return Some(Cursor {
                        card: card_idx,
                        slot: card.rows.len(),
                        field: 0,
                    })
                }
                (
                    Card::Section(card),
                    Control::Row {
                        section_id,
                        task_id,
                        field,
                    },
                ) if &card.section_id == section_id => {
                    let slot = card.rows.iter().position(|r| &r.task_id == task_id)?;
                    let field = ROW_FIELDS.iter().position(|f| f == field).unwrap_or(0);
                    return Some(Cursor {
                        card: card_idx,
                        slot,
                        field,
                    });
                }
                _ => {}
            }
        }
        None
    }

    /// Nearest valid position to `cursor`.
    pub fn clamp(&self, cursor: Cursor) -> Cursor {
        let card = cursor.card.min(self.cards.len().saturating_sub(1));
        let slots = self.cards.get(card).map(Card::slot_count).unwrap_or(1);
        let slot = cursor.slot.min(slots.saturating_sub(1));
        let field = if self.is_row(card, slot) {
            cursor.field.min(ROW_FIELDS.len() - 1)
        } else {
            0
        };
        Cursor { card, slot, field }
    }

    fn is_row(&self, card: usize, slot: usize) -> bool {
        matches!(self.cards.get(card), Some(Card::Section(c)) if slot < c.rows.len())
    }

    /// Next control in reading order: across a row's fields, down the card,
    /// then on to the next card. Wraps at the end.
    pub fn next(&self, cursor: Cursor) -> Cursor {
        let c = self.clamp(cursor);
        if self.is_row(c.card, c.slot) && c.field + 1 < ROW_FIELDS.len() {
            return Cursor {
                field: c.field + 1,
                ..c
            };
        }
        let slots = self.cards[c.card].slot_count();
        if c.slot + 1 < slots {
            return Cursor {
                slot: c.slot + 1,
                field: 0,
                ..c
            };
        }
        Cursor {
            card: (c.card + 1) % self.cards.len(),
            slot: 0,
            field: 0,
        }
    }

    pub fn prev(&self, cursor: Cursor) -> Cursor {
        let c = self.clamp(cursor);
        if c.field > 0 {
            return Cursor {
                field: c.field - 1,
                ..c
            };
        }
        if c.slot > 0 {
            let slot = c.slot - 1;
            return Cursor {
                slot,
                field: self.last_field(c.card, slot),
                ..c
            };
        }
        let card = if c.card == 0 {
            self.cards.len() - 1
        } else {
            c.card - 1
        };
        let slot = self.cards[card].slot_count() - 1;
        Cursor {
            card,
            slot,
            field: self.last_field(card, slot),
        }
    }

    pub fn up(&self, cursor: Cursor) -> Cursor {
        let c = self.clamp(cursor);
        self.clamp(Cursor {
            slot: c.slot.saturating_sub(1),
            ..c
        })
    }

    pub fn down(&self, cursor: Cursor) -> Cursor {
        let c = self.clamp(cursor);
        self.clamp(Cursor {
            slot: c.slot + 1,
            ..c
        })
    }

    pub fn left(&self, cursor: Cursor) -> Cursor {
        let c = self.clamp(cursor);
        self.clamp(Cursor {
            card: c.card.saturating_sub(1),
            ..c
        })
    }

    pub fn right(&self, cursor: Cursor) -> Cursor {
        let c = self.clamp(cursor);
        self.clamp(Cursor {
            card: c.card + 1,
            ..c
        })
    }

    fn last_field(&self, card: usize, slot: usize) -> usize {
        if self.is_row(card, slot) {
            ROW_FIELDS.len() - 1
        } else {
            0
        }
    }
}

impl Control {
    /// The planner action a plain activation triggers, for controls that need
    /// no further input. Title, priority, deadline and new-section controls
    /// collect a value first and build their action with [`Control::with_text`],
    /// [`Control::with_priority`], [`Control::with_deadline`] or
    /// [`Action::CreateSection`].
    pub fn activate(&self) -> Option<Action> {
        match self {
            Control::Row {
                section_id,
                task_id,
                field: Field::Toggle,
            } => Some(Action::ToggleCompleted {
                section_id: section_id.clone(),
                task_id: task_id.clone(),
            }),
            Control::AddTask(section_id) => Some(Action::AddTask(section_id.clone())),
            _ => None,
        }
    }

    pub fn with_text(&self, text: &str) -> Option<Action> {
        match self {
            Control::Row {
                section_id,
                task_id,
                field: Field::Title,
            } => Some(Action::UpdateTitle {
                section_id: section_id.clone(),
                task_id: task_id.clone(),
                text: text.to_string(),
            }),
            _ => None,
        }
    }

    pub fn with_priority(&self, priority: Priority) -> Option<Action> {
        match self {
            Control::Row {
                section_id,
                task_id,
                field: Field::Priority,
            } => Some(Action::UpdatePriority {
                section_id: section_id.clone(),
                task_id: task_id.clone(),
                priority,
            }),
            _ => None,
        }
    }

    pub fn with_deadline(&self, deadline: Option<NaiveDate>) -> Option<Action> {
        match self {
            Control::Row {
                section_id,
                task_id,
                field: Field::Deadline,
            } => Some(Action::UpdateDeadline {
                section_id: section_id.clone(),
                task_id: task_id.clone(),
                deadline,
            }),
            _ => None,
        }
    }

    pub fn task_id(&self) -> Option<&str> {
        match self {
            Control::Row { task_id, .. } => Some(task_id.as_str()),
            _ => None,
        }
    }

    pub fn field(&self) -> Option<Field> {
        match self {
            Control::Row { field, .. } => Some(*field),
            _ => None,
        }
    }

    /// The section a control belongs to; the create card has none.
    pub fn section_id(&self) -> Option<&str> {
        match self {
            Control::Row { section_id, .. } | Control::AddTask(section_id) => {
                Some(section_id.as_str())
            }
            Control::CreateSection => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Task;
    use pretty_assertions::assert_eq;

    fn task(id: &str, priority: Priority) -> Task {
        Task {
            title: id.to_uppercase(),
            priority,
            ..Task::blank(id.into())
        }
    }

    fn doc() -> Document {
        let mut mon = Section::new("mon".into(), "monday");
        mon.tasks = vec![
            task("a", Priority::Low),
            task("b", Priority::High),
            task("c", Priority::Moderate),
            task("d", Priority::High),
        ];
        vec![mon, Section::new("wed".into(), "wed")]
    }

    fn row_ids(card: &Card) -> Vec<&str> {
        match card {
            Card::Section(c) => c.rows.iter().map(|r| r.task_id.as_str()).collect(),
            Card::Create => vec![],
        }
    }

    #[test]
    fn rows_follow_priority_with_stable_ties() {
        let grid = render(&doc(), &mut None);
        assert_eq!(row_ids(&grid.cards[0]), vec!["b", "d", "c", "a"]);
    }

    #[test]
    fn empty_section_shows_message_and_create_card_trails() {
        let grid = render(&doc(), &mut None);
        assert_eq!(grid.cards.len(), 3);
        match &grid.cards[1] {
            Card::Section(card) => {
                assert_eq!(card.title, "wed");
                assert_eq!(card.empty_message(), Some(EMPTY_SECTION_TEXT));
            }
            Card::Create => panic!("expected section card"),
        }
        assert_eq!(grid.cards[2], Card::Create);
    }

    #[test]
    fn pending_focus_is_used_once() {
        let d = doc();
        let mut pending = Some("c".to_string());
        let grid = render(&d, &mut pending);
        assert_eq!(pending, None);
        assert_eq!(
            grid.focus,
            Some(Control::Row {
                section_id: "mon".into(),
                task_id: "c".into(),
                field: Field::Title,
            })
        );
        let again = render(&d, &mut pending);
        assert_eq!(again.focus, None);
    }

    #[test]
    fn unknown_pending_focus_is_left_alone() {
        let mut pending = Some("zzz".to_string());
        let grid = render(&doc(), &mut pending);
        assert_eq!(grid.focus, None);
        assert_eq!(pending.as_deref(), Some("zzz"));
    }

    #[test]
    fn rendering_does_not_touch_the_document() {
        let d = doc();
        let before = d.clone();
        let _ = render(&d, &mut Some("a".into()));
        assert_eq!(d, before);
    }

    #[test]
    fn controls_bind_to_actions() {
        let grid = render(&doc(), &mut None);
        let toggle = grid.control_at(Cursor::default()).unwrap();
        assert_eq!(
            toggle.activate(),
            Some(Action::ToggleCompleted {
                section_id: "mon".into(),
                task_id: "b".into(),
            })
        );
        let add = grid
            .control_at(Cursor {
                card: 1,
                slot: 0,
                field: 0,
            })
            .unwrap();
        assert_eq!(add.activate(), Some(Action::AddTask("wed".into())));
        let title = grid
            .control_at(Cursor {
                card: 0,
                slot: 3,
                field: 1,
            })
            .unwrap();
        assert_eq!(
            title.with_text("hi"),
            Some(Action::UpdateTitle {
                section_id: "mon".into(),
                task_id: "a".into(),
                text: "hi".into(),
            })
        );
        assert_eq!(title.activate(), None);
        assert_eq!(title.with_priority(Priority::Low), None);
    }

    #[test]
    fn locate_finds_rows_after_reordering() {
        let mut d = doc();
        let control = Control::Row {
            section_id: "mon".into(),
            task_id: "a".into(),
            field: Field::Priority,
        };
        d[0].tasks[0].priority = Priority::High;
        let grid = render(&d, &mut None);
        assert_eq!(
            grid.locate(&control),
            Some(Cursor {
                card: 0,
                slot: 0,
                field: 2,
            })
        );
        assert_eq!(grid.locate(&Control::CreateSection).map(|c| c.card), Some(2));
    }

    #[test]
    fn tab_order_walks_every_control_and_wraps() {
        let grid = render(&doc(), &mut None);
        // 4 rows * 4 fields + add (mon) + add (wed) + create
        let total = 4 * 4 + 1 + 1 + 1;
        let mut cursor = Cursor::default();
        let mut seen = Vec::new();
        for _ in 0..total {
            seen.push(grid.control_at(cursor).unwrap());
            cursor = grid.next(cursor);
        }
        assert_eq!(cursor, Cursor::default());
        assert_eq!(seen.last(), Some(&Control::CreateSection));
        assert_eq!(grid.prev(Cursor::default()), grid.locate(&Control::CreateSection).unwrap());
    }

    #[test]
    fn set_title_patches_in_place() {
        let mut grid = render(&doc(), &mut None);
        assert!(grid.set_title("c", "typed"));
        assert_eq!(grid.row("c").map(|r| r.title.as_str()), Some("typed"));
        assert!(!grid.set_title("missing", "x"));
    }
}
