use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;
use tyrozen::bootstrap::bootstrap;
use tyrozen::model::{Priority, Section, Task};
use tyrozen::planner::{Outcome, Planner};
use tyrozen::render::{render, Card, Control, Field};
use tyrozen::storage::Store;
use tyrozen::view::{Location, NavBar};

fn store(tmp: &TempDir) -> Store {
    Store::new(tmp.path().join("planner"))
}

#[test]
fn saved_document_loads_back_equal() {
    let tmp = TempDir::new().unwrap();
    let mut planner = Planner::load(store(&tmp), "daily");
    let section_id = planner.document()[1].id.clone();
    planner.add_task(&section_id);
    let task_id = planner.pending_focus().unwrap().to_string();
    planner.update_title(&section_id, &task_id, "Call: dentist \"asap\"");
    planner.update_deadline(
        &section_id,
        &task_id,
        chrono::NaiveDate::from_ymd_opt(2026, 2, 28),
    );
    planner.create_section("weekend");

    assert_eq!(
        store(&tmp).load("daily").as_ref(),
        Some(planner.document())
    );
}

#[test]
fn equal_priorities_keep_insertion_order() {
    let mut section = Section::new("s".into(), "S");
    for (id, priority) in [
        ("low", Priority::Low),
        ("high-1", Priority::High),
        ("moderate", Priority::Moderate),
        ("high-2", Priority::High),
    ] {
        section.tasks.push(Task {
            priority,
            ..Task::blank(id.into())
        });
    }
    let grid = render(&vec![section], &mut None);
    let Card::Section(card) = &grid.cards[0] else {
        panic!("expected a section card");
    };
    let order: Vec<&str> = card.rows.iter().map(|r| r.task_id.as_str()).collect();
    assert_eq!(order, vec!["high-1", "high-2", "moderate", "low"]);
}

#[test]
fn absent_task_ids_are_noops() {
    let tmp = TempDir::new().unwrap();
    let mut planner = Planner::load(store(&tmp), "daily");
    let section_id = planner.document()[0].id.clone();
    let before = planner.document().clone();

    let outcomes = [
        planner.toggle_completed(&section_id, "missing"),
        planner.update_title(&section_id, "missing", "x"),
        planner.update_priority(&section_id, "missing", Priority::Low),
        planner.update_deadline(&section_id, "missing", None),
    ];
    assert!(outcomes.iter().all(|o| *o == Outcome::Unchanged));
    assert_eq!(planner.document(), &before);
    assert_eq!(store(&tmp).load("daily"), None);
}

#[test]
fn fresh_view_gets_default_sections() {
    let tmp = TempDir::new().unwrap();
    let planner = Planner::load(store(&tmp), "daily");
    let doc = planner.document();
    let titles: Vec<&str> = doc.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["monday", "Tuesday", "wed", "thursday"]);
    let counts: Vec<usize> = doc.iter().map(|s| s.tasks.len()).collect();
    assert_eq!(counts, vec![1, 2, 0, 1]);
    assert!(doc.iter().flat_map(|s| &s.tasks).all(|t| !t.completed));
}

#[test]
fn added_task_is_blank_and_focused_once() {
    let tmp = TempDir::new().unwrap();
    let mut page = bootstrap(store(&tmp), Location::default(), NavBar::standard());
    let section_id = page.planner.document()[3].id.clone();
    assert_eq!(page.planner.add_task(&section_id), Outcome::Redraw);

    let task = page.planner.document()[3].tasks.last().unwrap().clone();
    assert_eq!(task.title, "");
    assert_eq!(task.priority, Priority::High);
    assert_eq!(task.deadline, None);
    assert!(!task.completed);

    page.redraw();
    assert_eq!(
        page.grid.focus,
        Some(Control::Row {
            section_id: section_id.clone(),
            task_id: task.id.clone(),
            field: Field::Title,
        })
    );
    page.redraw();
    assert_eq!(page.grid.focus, None);
}

#[test]
fn blank_section_names_change_nothing() {
    let tmp = TempDir::new().unwrap();
    let mut planner = Planner::load(store(&tmp), "daily");
    let before = planner.document().clone();
    assert_eq!(planner.create_section(""), Outcome::Unchanged);
    assert_eq!(planner.create_section("   "), Outcome::Unchanged);
    assert_eq!(planner.document(), &before);
}

#[test]
fn views_are_isolated() {
    let tmp = TempDir::new().unwrap();
    let mut weekly = Planner::load(store(&tmp), "weekly");
    weekly.create_section("sprint");
    let weekly_saved = store(&tmp).load("weekly").unwrap();

    let mut daily = Planner::load(store(&tmp), "daily");
    let (section_id, task_id) = {
        let s = &daily.document()[0];
        (s.id.clone(), s.tasks[0].id.clone())
    };
    daily.toggle_completed(&section_id, &task_id);
    daily.create_section("errands");

    assert_eq!(store(&tmp).load("weekly"), Some(weekly_saved));
    assert_eq!(store(&tmp).load("daily").unwrap().len(), 5);
}

#[test]
fn corrupt_entry_falls_back_to_defaults() {
    let tmp = TempDir::new().unwrap();
    let store = store(&tmp);
    fs::create_dir_all(store.dir()).unwrap();
    fs::write(store.path_for("daily"), "- id: [unterminated").unwrap();

    let page = bootstrap(
        store.clone(),
        Location::parse("/planner?view=daily"),
        NavBar::standard(),
    );
    assert_eq!(page.planner.document().len(), 4);
    assert_eq!(page.grid.cards.len(), 5);
}

#[test]
fn title_edits_are_saved_without_redraw() {
    let tmp = TempDir::new().unwrap();
    let mut page = bootstrap(store(&tmp), Location::default(), NavBar::standard());
    let (section_id, task_id) = {
        let s = &page.planner.document()[0];
        (s.id.clone(), s.tasks[0].id.clone())
    };
    let outcome = page.planner.update_title(&section_id, &task_id, "Math Revision ch. 4");
    assert_eq!(outcome, Outcome::Persisted);
    assert_eq!(
        store(&tmp).load("daily").unwrap()[0].tasks[0].title,
        "Math Revision ch. 4"
    );
}
