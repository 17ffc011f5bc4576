use crate::bootstrap::{bootstrap, Page};
use crate::model::{parse_deadline, Priority};
use crate::planner::{Outcome, Planner};
use crate::render::{Card, Grid, CREATE_SECTION_LABEL, TITLE_PLACEHOLDER};
use crate::storage::Store;
use crate::ui;
use crate::view::{Location, NavBar};
use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use std::fmt::Write as _;

pub fn tui(store: Store, location: Location) -> Result<()> {
    ui::run(store, location)
}

pub fn list(store: Store, location: Location) -> Result<()> {
    let mut page = open(store, location);
    // Listed ids must still resolve in the next invocation.
    let outcome = page.planner.persist_seed();
    finish(&mut page.planner, outcome, "saving default sections")?;
    println!(
        "View: {} ({})",
        page.planner.view(),
        page.planner.store().path_for(page.planner.view()).display()
    );
    print!("{}", format_grid(&page.grid));
    Ok(())
}

pub fn section(store: Store, location: Location, name: String) -> Result<()> {
    if name.trim().is_empty() {
        bail!("section name is empty");
    }
    let mut page = open(store, location);
    let outcome = page.planner.create_section(&name);
    finish(&mut page.planner, outcome, "creating section")?;
    let created = page
        .planner
        .document()
        .last()
        .ok_or_else(|| anyhow!("section list is empty after create"))?;
    println!("Created section {} ({})", created.id, created.title);
    Ok(())
}

pub fn add(
    store: Store,
    location: Location,
    section_id: String,
    title: Option<String>,
    priority: Option<String>,
    deadline: Option<String>,
) -> Result<()> {
    let priority = priority.as_deref().map(parse_priority).transpose()?;
    let deadline = deadline.as_deref().map(parse_date).transpose()?;
    let mut page = open(store, location);
    let planner = &mut page.planner;
    let outcome = planner.add_task(&section_id);
    if outcome == Outcome::Unchanged {
        bail!("section {} not found", section_id);
    }
    finish(planner, outcome, "adding task")?;
    let task_id = planner
        .pending_focus()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("new task id missing"))?;
    if let Some(title) = title {
        let outcome = planner.update_title(&section_id, &task_id, &title);
        finish(planner, outcome, "setting title")?;
    }
    if let Some(priority) = priority {
        let outcome = planner.update_priority(&section_id, &task_id, priority);
        finish(planner, outcome, "setting priority")?;
    }
    if let Some(deadline) = deadline {
        let outcome = planner.update_deadline(&section_id, &task_id, deadline);
        finish(planner, outcome, "setting deadline")?;
    }
    println!("Added task {} to {}", task_id, section_id);
    Ok(())
}

pub fn toggle(store: Store, location: Location, section_id: String, task_id: String) -> Result<()> {
    let mut page = open(store, location);
    let outcome = page.planner.toggle_completed(&section_id, &task_id);
    if outcome == Outcome::Unchanged {
        bail!("task {} not found in section {}", task_id, section_id);
    }
    finish(&mut page.planner, outcome, "toggling task")?;
    let done = page
        .planner
        .document()
        .iter()
        .flat_map(|s| s.tasks.iter())
        .any(|t| t.id == task_id && t.completed);
    println!(
        "Task {} is now {}",
        task_id,
        if done { "completed" } else { "open" }
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn edit(
    store: Store,
    location: Location,
    section_id: String,
    task_id: String,
    title: Option<String>,
    priority: Option<String>,
    deadline: Option<String>,
    clear_deadline: bool,
) -> Result<()> {
    let priority = priority.as_deref().map(parse_priority).transpose()?;
    let deadline = match (deadline, clear_deadline) {
        (_, true) => Some(None),
        (Some(raw), false) => Some(parse_date(&raw)?),
        (None, false) => None,
    };
    let mut page = open(store, location);
    let planner = &mut page.planner;
    let exists = planner
        .document()
        .iter()
        .any(|s| s.id == section_id && s.tasks.iter().any(|t| t.id == task_id));
    if !exists {
        bail!("task {} not found in section {}", task_id, section_id);
    }
    if let Some(title) = title {
        let outcome = planner.update_title(&section_id, &task_id, &title);
        finish(planner, outcome, "setting title")?;
    }
    if let Some(priority) = priority {
        let outcome = planner.update_priority(&section_id, &task_id, priority);
        finish(planner, outcome, "setting priority")?;
    }
    if let Some(deadline) = deadline {
        let outcome = planner.update_deadline(&section_id, &task_id, deadline);
        finish(planner, outcome, "setting deadline")?;
    }
    println!("Updated task {}", task_id);
    Ok(())
}

fn open(store: Store, location: Location) -> Page {
    bootstrap(store, location, NavBar::standard())
}

fn finish(planner: &mut Planner, outcome: Outcome, what: &str) -> Result<()> {
    log::debug!("{}: {:?}", what, outcome);
    match planner.take_save_error() {
        Some(err) => Err(err).with_context(|| what.to_string()),
        None => Ok(()),
    }
}

fn parse_priority(raw: &str) -> Result<Priority> {
    Priority::parse(raw)
        .ok_or_else(|| anyhow!("invalid priority (use high, moderate or low): {}", raw))
}

fn parse_date(raw: &str) -> Result<Option<NaiveDate>> {
    parse_deadline(raw).map_err(|_| anyhow!("invalid date format (use YYYY-MM-DD): {}", raw))
}

/// Plain-text rendition of a grid for terminal output.
pub fn format_grid(grid: &Grid) -> String {
    let mut out = String::new();
    for card in &grid.cards {
        match card {
            Card::Section(card) => {
                let _ = writeln!(out, "{} [{}]", card.title, card.section_id);
                if let Some(message) = card.empty_message() {
                    let _ = writeln!(out, "  ({})", message);
                }
                for row in &card.rows {
                    let title = if row.title.is_empty() {
                        format!("<{}>", TITLE_PLACEHOLDER)
                    } else {
                        row.title.clone()
                    };
                    let _ = write!(
                        out,
                        "  [{}] {} ({}) {}",
                        if row.completed { "x" } else { " " },
                        title,
                        row.priority.as_str(),
                        row.task_id
                    );
                    let deadline = row.deadline_text();
                    if !deadline.is_empty() {
                        let _ = write!(out, " due {}", deadline);
                    }
                    out.push('\n');
                }
                out.push('\n');
            }
            Card::Create => {
                let _ = writeln!(out, "{}: tyrozen section <NAME>", CREATE_SECTION_LABEL);
            }
        }
    }
    out
}
