use anyhow::{Context, Result};
use clap::Parser;
use tyrozen::cli::{Cli, Command};
use tyrozen::storage::Store;
use tyrozen::view::{Location, DEFAULT_PATH};
use tyrozen::{commands, logging};

fn main() -> Result<()> {
    let args = Cli::parse();
    let command = args.command.unwrap_or(Command::Tui);
    let store = Store::open(args.data_dir).context("opening planner storage")?;

    match command {
        Command::Tui => logging::init_file(store.dir()),
        _ => logging::init_stderr(),
    }

    let location = match &args.view {
        Some(view) => Location::with_view(DEFAULT_PATH, view),
        None => Location::default(),
    };
    log::debug!("using {} at {}", location, store.dir().display());

    match command {
        Command::Tui => commands::tui(store, location),
        Command::List => commands::list(store, location),
        Command::Section { name } => commands::section(store, location, name),
        Command::Add {
            section_id,
            title,
            priority,
            deadline,
        } => commands::add(store, location, section_id, title, priority, deadline),
        Command::Toggle {
            section_id,
            task_id,
        } => commands::toggle(store, location, section_id, task_id),
        Command::Edit {
            section_id,
            task_id,
            title,
            priority,
            deadline,
            clear_deadline,
        } => commands::edit(
            store,
            location,
            section_id,
            task_id,
            title,
            priority,
            deadline,
            clear_deadline,
        ),
    }
}
