use clap::Parser;
use std::path::PathBuf;

const DEFAULT_STORE_NAME: &str = ".booknotes.json";

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "booknotes", version, about = "Short notes grouped into books")]
pub struct Cli {
    /// Note store file
    #[arg(long, short, env = "BOOKNOTES_FILE")]
    pub file: Option<PathBuf>,

    /// Only show notes from this book on startup
    #[arg(long, short)]
    pub book: Option<String>,

    /// Write logs to this file (off when not given)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn store_path(&self) -> PathBuf {
        self.file.clone().unwrap_or_else(default_store_path)
    }
}

/// `$HOME/.booknotes.json`, falling back to `USERPROFILE` and then the
/// working directory.
pub fn default_store_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .ok();
    store_path_in(home)
}

fn store_path_in(home: Option<String>) -> PathBuf {
    PathBuf::from(home.unwrap_or_else(|| ".".to_string())).join(DEFAULT_STORE_NAME)
}
