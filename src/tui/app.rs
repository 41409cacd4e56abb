use anyhow::Result;
use booknotes::{Filter, Note, NoteChanges, NoteFields, NotesRepo};
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::*;

const TITLE: &str = "booknotes";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    List,
    View,
    Edit,
    Create,
    BookFilter,
    MoveBook,
    ArchiveConfirm,
    Help,
}

pub struct App {
    pub repo: NotesRepo,
    pub notes: Vec<Note>,
    pub book_filter: Option<String>,
    pub selected_index: usize,
    pub mode: AppMode,
    pub current_note: Option<Note>,
    pub input_buffer: String,
    pub should_quit: bool,
    pub status_message: Option<String>,
    // Where to go back to after the archive prompt is dismissed.
    archive_return: AppMode,
}

impl App {
    pub fn new(repo: NotesRepo, book_filter: Option<String>) -> Self {
        let mut app = App {
            repo,
            notes: Vec::new(),
            book_filter,
            selected_index: 0,
            mode: AppMode::List,
            current_note: None,
            input_buffer: String::new(),
            should_quit: false,
            status_message: None,
            archive_return: AppMode::List,
        };
        app.refresh();
        app
    }

    /// Reload the visible list from the repository
    pub fn refresh(&mut self) {
        self.notes = self
            .repo
            .find_all(self.book_filter.as_deref())
            .into_iter()
            .cloned()
            .collect();
        if self.selected_index >= self.notes.len() {
            self.selected_index = self.notes.len().saturating_sub(1);
        }
    }

    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> Result<()> {
        match self.mode {
            AppMode::List => self.handle_list_key(key),
            AppMode::View => self.handle_view_key(key),
            AppMode::Edit => self.handle_edit_key(key, modifiers),
            AppMode::Create => self.handle_create_key(key, modifiers),
            AppMode::BookFilter => self.handle_book_filter_key(key),
            AppMode::MoveBook => self.handle_move_book_key(key),
            AppMode::ArchiveConfirm => self.handle_archive_confirm_key(key),
            AppMode::Help => {
                if matches!(key, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                    self.mode = AppMode::List;
                }
            }
        }
        Ok(())
    }

    fn handle_list_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                if self.book_filter.is_some() {
                    self.book_filter = None;
                    self.selected_index = 0;
                    self.refresh();
                } else {
                    self.should_quit = true;
                }
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if self.selected_index < self.notes.len().saturating_sub(1) {
                    self.selected_index += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected_index = self.selected_index.saturating_sub(1);
            }
            KeyCode::Char('n') => {
                self.mode = AppMode::Create;
                self.input_buffer = self
                    .book_filter
                    .as_ref()
                    .map(|book| format!("{book}\n"))
                    .unwrap_or_default();
            }
            KeyCode::Char('b') => {
                self.mode = AppMode::BookFilter;
                self.input_buffer = self.book_filter.clone().unwrap_or_default();
            }
            KeyCode::Char('a') => {
                if let Some(note) = self.notes.get(self.selected_index) {
                    self.current_note = Some(note.clone());
                    self.archive_return = AppMode::List;
                    self.mode = AppMode::ArchiveConfirm;
                }
            }
            KeyCode::Char('r') => {
                self.refresh();
                self.status_message = Some("✓ Notes refreshed".to_string());
            }
            KeyCode::Char('?') => {
                self.mode = AppMode::Help;
            }
            KeyCode::Enter => {
                if let Some(note) = self.notes.get(self.selected_index) {
                    self.current_note = Some(note.clone());
                    self.mode = AppMode::View;
                }
            }
            _ => {}
        }
    }

    fn handle_view_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.mode = AppMode::List;
                self.current_note = None;
                self.status_message = None;
            }
            KeyCode::Char('e') => {
                if let Some(ref note) = self.current_note {
                    self.input_buffer = note.content.clone();
                    self.mode = AppMode::Edit;
                    self.status_message = None;
                }
            }
            KeyCode::Char('m') => {
                if let Some(ref note) = self.current_note {
                    self.input_buffer = note.book.clone();
                    self.mode = AppMode::MoveBook;
                    self.status_message = None;
                }
            }
            KeyCode::Char('a') => {
                if self.current_note.is_some() {
                    self.archive_return = AppMode::View;
                    self.mode = AppMode::ArchiveConfirm;
                }
            }
            _ => {}
        }
    }

    fn handle_edit_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        match key {
            KeyCode::Esc => {
                self.mode = AppMode::View;
            }
            KeyCode::Char('s') if modifiers.contains(KeyModifiers::CONTROL) => {
                let changes = NoteChanges::new().content(self.input_buffer.clone());
                self.save_changes(changes);
            }
            KeyCode::Char(c) => self.input_buffer.push(c),
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Enter => self.input_buffer.push('\n'),
            _ => {}
        }
    }

    fn handle_move_book_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.mode = AppMode::View;
            }
            KeyCode::Enter => {
                let book = self.input_buffer.trim().to_string();
                if book.is_empty() {
                    self.status_message = Some("✗ Book name is required".to_string());
                    return;
                }
                self.save_changes(NoteChanges::new().book(book));
            }
            KeyCode::Char(c) => self.input_buffer.push(c),
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            _ => {}
        }
    }

    fn save_changes(&mut self, changes: NoteChanges) {
        let Some(id) = self.current_note.as_ref().map(|note| note.id) else {
            self.mode = AppMode::List;
            return;
        };
        match self.repo.update(id, &changes) {
            Ok(note) => {
                self.current_note = Some(note);
                self.status_message = Some("✓ Saved".to_string());
            }
            Err(e) => {
                self.status_message = Some(format!("✗ Failed to save: {}", e));
            }
        }
        self.mode = AppMode::View;
        self.input_buffer.clear();
        self.refresh();
    }

    fn handle_create_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        match key {
            KeyCode::Esc => {
                self.mode = AppMode::List;
                self.input_buffer.clear();
            }
            KeyCode::Char('s') if modifiers.contains(KeyModifiers::CONTROL) => {
                // First line is the book, everything after it is the content
                let (book, content) = match self.input_buffer.split_once('\n') {
                    Some((book, content)) => (book.trim().to_string(), content.to_string()),
                    None => (self.input_buffer.trim().to_string(), String::new()),
                };
                if book.is_empty() {
                    self.status_message = Some("✗ First line must name a book".to_string());
                    return;
                }

                match self.repo.create(NoteFields::new(book).content(content)) {
                    Ok(note) => {
                        self.status_message =
                            Some(format!("✓ Created note #{} in {}", note.id, note.book));
                        self.refresh();
                        if let Some(index) = self.notes.iter().position(|n| n.id == note.id) {
                            self.selected_index = index;
                        }
                    }
                    Err(e) => {
                        self.status_message = Some(format!("✗ Failed to create: {}", e));
                    }
                }
                self.mode = AppMode::List;
                self.input_buffer.clear();
            }
            KeyCode::Char(c) => self.input_buffer.push(c),
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Enter => self.input_buffer.push('\n'),
            _ => {}
        }
    }

    fn handle_book_filter_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.mode = AppMode::List;
                self.input_buffer.clear();
            }
            KeyCode::Enter => {
                let book = self.input_buffer.trim();
                self.book_filter = (!book.is_empty()).then(|| book.to_string());
                self.selected_index = 0;
                self.input_buffer.clear();
                self.mode = AppMode::List;
                self.refresh();
            }
            KeyCode::Char(c) => self.input_buffer.push(c),
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            _ => {}
        }
    }

    fn handle_archive_confirm_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('y') | KeyCode::Enter => {
                if let Some(note) = self.current_note.take() {
                    match self.repo.archive(&Filter::new().id(note.id)) {
                        Ok(_) => {
                            self.status_message = Some(format!("✓ Archived note #{}", note.id));
                        }
                        Err(e) => {
                            self.status_message = Some(format!("✗ Failed to archive: {}", e));
                        }
                    }
                }
                self.mode = AppMode::List;
                self.refresh();
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                if self.archive_return == AppMode::List {
                    self.current_note = None;
                }
                self.mode = self.archive_return;
            }
            _ => {}
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        match self.mode {
            AppMode::List => self.render_list(frame),
            AppMode::View => self.render_view(frame),
            AppMode::Edit => self.render_input(frame, "Edit content", "Ctrl+S: save | Esc: cancel"),
            AppMode::Create => self.render_input(
                frame,
                "New note (first line: book, then content)",
                "Ctrl+S: create | Esc: cancel",
            ),
            AppMode::BookFilter => self.render_input(
                frame,
                "Show book (empty for all)",
                "Enter: apply | Esc: cancel",
            ),
            AppMode::MoveBook => {
                self.render_input(frame, "Move to book", "Enter: move | Esc: cancel")
            }
            AppMode::ArchiveConfirm => self.render_archive_confirm(frame),
            AppMode::Help => self.render_help(frame),
        }
    }

    fn layout(frame: &Frame) -> std::rc::Rc<[Rect]> {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area())
    }

    fn render_title(&self, frame: &mut Frame, area: Rect) {
        let subtitle = match self.book_filter {
            Some(ref book) => format!("Book: {}", book),
            None => "All books".to_string(),
        };
        let title = Paragraph::new(subtitle)
            .block(Block::default().borders(Borders::ALL).title(TITLE))
            .style(Style::default().fg(Color::Cyan));
        frame.render_widget(title, area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect, help: &str) {
        let (text, color) = match self.status_message {
            Some(ref message) if message.starts_with('✗') => (message.as_str(), Color::Red),
            Some(ref message) => (message.as_str(), Color::Green),
            None => (help, Color::DarkGray),
        };
        let footer = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Help"))
            .style(Style::default().fg(color));
        frame.render_widget(footer, area);
    }

    fn render_list(&self, frame: &mut Frame) {
        let chunks = Self::layout(frame);
        self.render_title(frame, chunks[0]);

        let items: Vec<ListItem> = self
            .notes
            .iter()
            .map(|note| {
                let preview = note.content.lines().next().unwrap_or("").trim();
                let preview: String = if preview.chars().count() > 60 {
                    format!("{}...", preview.chars().take(60).collect::<String>())
                } else {
                    preview.to_string()
                };
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(format!("#{} ", note.id), Style::default().fg(Color::DarkGray)),
                        Span::styled(
                            note.book.as_str(),
                            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(
                            format!("  {}", note.created_at.format("%Y-%m-%d %H:%M")),
                            Style::default().fg(Color::DarkGray),
                        ),
                    ]),
                    Line::from(Span::styled(
                        format!("  {}", preview),
                        Style::default().fg(Color::White),
                    )),
                ])
            })
            .collect();

        let mut state = ListState::default();
        if !self.notes.is_empty() {
            state.select(Some(self.selected_index));
        }

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Notes ({})", self.notes.len())),
            )
            .highlight_style(Style::default().fg(Color::Yellow).bg(Color::DarkGray))
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(list, chunks[1], &mut state);

        self.render_footer(
            frame,
            chunks[2],
            "j/k: navigate | Enter: view | n: new | b: book | a: archive | r: refresh | ?: help | Esc: quit",
        );
    }

    fn render_view(&self, frame: &mut Frame) {
        let chunks = Self::layout(frame);
        self.render_title(frame, chunks[0]);

        if let Some(ref note) = self.current_note {
            let mut lines = vec![
                Line::from(vec![
                    Span::styled("Created: ", Style::default().fg(Color::Cyan)),
                    Span::raw(note.created_at.format("%Y-%m-%d %H:%M").to_string()),
                    Span::styled("  |  ", Style::default().fg(Color::DarkGray)),
                    Span::styled("Updated: ", Style::default().fg(Color::Cyan)),
                    Span::raw(note.updated_at.format("%Y-%m-%d %H:%M").to_string()),
                ]),
                Line::default(),
            ];
            lines.extend(note.content.lines().map(Line::from));

            let content = Paragraph::new(lines)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(format!("#{} · {}", note.id, note.book)),
                )
                .wrap(Wrap { trim: false });
            frame.render_widget(content, chunks[1]);
        }

        self.render_footer(frame, chunks[2], "e: edit | m: move to book | a: archive | Esc: back");
    }

    fn render_input(&self, frame: &mut Frame, title: &str, help: &str) {
        let chunks = Self::layout(frame);
        self.render_title(frame, chunks[0]);

        let input = Paragraph::new(self.input_buffer.as_str())
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: false });
        frame.render_widget(input, chunks[1]);

        self.render_footer(frame, chunks[2], help);
    }

    fn render_archive_confirm(&self, frame: &mut Frame) {
        let chunks = Self::layout(frame);
        self.render_title(frame, chunks[0]);

        let message = match self.current_note {
            Some(ref note) => format!(
                "Archive note #{} from {}?\n\nArchived notes disappear from every list.",
                note.id, note.book
            ),
            None => "Nothing selected".to_string(),
        };
        let confirm = Paragraph::new(message)
            .block(Block::default().borders(Borders::ALL).title("Confirm Archive"))
            .style(Style::default().fg(Color::Yellow));
        frame.render_widget(confirm, chunks[1]);

        self.render_footer(frame, chunks[2], "Enter/y: archive | Esc/n: cancel");
    }

    fn render_help(&self, frame: &mut Frame) {
        let chunks = Self::layout(frame);
        self.render_title(frame, chunks[0]);

        let text = vec![
            Line::from(Span::styled("List", Style::default().add_modifier(Modifier::BOLD))),
            Line::from("  j/k, ↓/↑   move selection"),
            Line::from("  Enter      open note"),
            Line::from("  n          new note (first line is the book)"),
            Line::from("  b          show one book, empty input shows all"),
            Line::from("  a          archive selected note"),
            Line::from("  r          reload from disk"),
            Line::from("  Esc        clear book filter, then quit"),
            Line::default(),
            Line::from(Span::styled("Note", Style::default().add_modifier(Modifier::BOLD))),
            Line::from("  e          edit content, Ctrl+S saves"),
            Line::from("  m          move to another book"),
            Line::from("  a          archive"),
        ];
        let help = Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Keys"));
        frame.render_widget(help, chunks[1]);

        self.render_footer(frame, chunks[2], "Esc/?: close");
    }
}
