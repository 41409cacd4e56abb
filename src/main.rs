use anyhow::{Context, Result};
use booknotes::config::Cli;
use booknotes::logging::init_logging;
use booknotes::NotesRepo;
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::*;
use std::io;

mod tui;

use tui::app::App;

fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Some(ref log_file) = cli.log_file {
        init_logging(log_file)?;
    }

    // Open the store before touching the terminal so errors print normally
    let store_path = cli.store_path();
    let repo = NotesRepo::open(&store_path)
        .with_context(|| format!("Failed to open note store {}", store_path.display()))?;
    let mut app = App::new(repo, cli.book);

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode; booknotes needs an interactive terminal")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let result = run(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    result
}

fn run<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|f| app.render(f))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                app.handle_key(key.code, key.modifiers)?;
            }
        }
    }
    Ok(())
}
