use env_logger::{Builder, Env, Target};
use std::fs::{self, OpenOptions};
use std::path::Path;

pub const LOG_ENV: &str = "TYROZEN_LOG";
pub const LOG_FILE: &str = "tyrozen.log";

/// Log to stderr. Filter comes from `TYROZEN_LOG`, default `warn`.
pub fn init_stderr() {
    let _ = builder().target(Target::Stderr).try_init();
}

/// Log to a file under `dir` so output does not land on the alternate
/// screen. Falls back to discarding output if the file cannot be opened.
pub fn init_file(dir: &Path) {
    let mut builder = builder();
    let file = fs::create_dir_all(dir).and_then(|_| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(LOG_FILE))
    });
    match file {
        Ok(file) => {
            builder.target(Target::Pipe(Box::new(file)));
        }
        Err(_) => {
            builder.target(Target::Pipe(Box::new(std::io::sink())));
        }
    }
    let _ = builder.try_init();
}

fn builder() -> Builder {
    let mut builder = Builder::from_env(Env::new().filter_or(LOG_ENV, "warn"));
    builder.format_timestamp_secs();
    builder
}
