use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tyrozen", version, about = "Terminal task planner with sections per view")]
pub struct Cli {
    /// Directory holding one file per view. Defaults to the platform data dir
    #[arg(long, global = true, env = "TYROZEN_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// View to open (daily, weekly, ...). Defaults to daily
    #[arg(long, global = true)]
    pub view: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Launch the interactive planner
    Tui,
    /// Print the sections and tasks of a view
    List,
    /// Create a new section
    Section {
        /// Section name
        name: String,
    },
    /// Add a task to a section
    Add {
        /// Section id
        section_id: String,
        /// Task title
        #[arg(long)]
        title: Option<String>,
        /// high, moderate or low (defaults to high)
        #[arg(long)]
        priority: Option<String>,
        /// Deadline as YYYY-MM-DD
        #[arg(long)]
        deadline: Option<String>,
    },
    /// Flip a task between open and completed
    Toggle {
        section_id: String,
        task_id: String,
    },
    /// Edit an existing task
    Edit {
        section_id: String,
        task_id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// high, moderate or low
        #[arg(long)]
        priority: Option<String>,
        /// Deadline as YYYY-MM-DD
        #[arg(long, conflicts_with = "clear_deadline")]
        deadline: Option<String>,
        /// Remove the deadline
        #[arg(long)]
        clear_deadline: bool,
    },
}
