use crate::bootstrap::{bootstrap, Page};
use crate::model::{parse_deadline, Priority, PRIORITIES};
use crate::planner::{Action, Outcome};
use crate::render::{
    Card, Control, Cursor, Field, SectionCard, TaskRow, CREATE_SECTION_LABEL, NEW_SECTION_PROMPT,
    NEW_TASK_LABEL, TITLE_PLACEHOLDER,
};
use crate::storage::Store;
use crate::view::{Location, NavBar};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{stdout, Stdout};
use std::time::{Duration, Instant};

const CARD_WIDTH: u16 = 34;

pub fn run(store: Store, location: Location) -> Result<()> {
    let page = bootstrap(store.clone(), location, NavBar::standard());
    let mut terminal = setup_terminal()?;
    let mut app = App::new(page, store);
    let result = app.event_loop(&mut terminal);
    teardown_terminal(&mut terminal)?;
    result
}

struct App {
    page: Page,
    store: Store,
    cursor: Cursor,
    mode: Mode,
    editor: Option<TitleEditor>,
    card_offset: usize,
    scroll_offsets: Vec<usize>,
    last_save: Option<Instant>,
    status: String,
}

enum Mode {
    Normal,
    NamePrompt(FieldValue),
    PickPriority { control: Control, selected: usize },
    EditDeadline { control: Control, field: FieldValue },
}

/// Live text of the title field under the cursor.
struct TitleEditor {
    task_id: String,
    field: FieldValue,
}

#[derive(Clone)]
struct FieldValue {
    value: String,
    cursor: usize,
}

impl FieldValue {
    fn new(value: &str) -> Self {
        FieldValue {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    fn move_left(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor = prev_grapheme(self.cursor, &self.value);
    }

    fn move_right(&mut self) {
        if self.cursor >= self.value.len() {
            return;
        }
        self.cursor = next_grapheme(self.cursor, &self.value);
    }

    fn move_home(&mut self) {
        self.cursor = 0;
    }

    fn move_end(&mut self) {
        self.cursor = self.value.len();
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = prev_grapheme(self.cursor, &self.value);
        self.value.drain(prev..self.cursor);
        self.cursor = prev;
    }

    fn insert_char(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    /// Shared editing keys; returns false for keys it does not handle.
    fn edit(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.insert_char(c)
            }
            KeyCode::Backspace => self.backspace(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.move_home(),
            KeyCode::End => self.move_end(),
            _ => return false,
        }
        true
    }

    fn with_caret(&self) -> String {
        let mut text = self.value.clone();
        text.insert_str(self.cursor, "▌");
        text
    }
}

impl App {
    fn new(page: Page, store: Store) -> Self {
        let status = format!(
            "Loaded {} view from {}",
            page.planner.view(),
            store.path_for(page.planner.view()).display()
        );
        let mut app = App {
            page,
            store,
            cursor: Cursor::default(),
            mode: Mode::Normal,
            editor: None,
            card_offset: 0,
            scroll_offsets: Vec::new(),
            last_save: None,
            status,
        };
        app.follow_focus(None);
        app
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;
            if event::poll(Duration::from_millis(200))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key)? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(true);
        }
        let mode = std::mem::replace(&mut self.mode, Mode::Normal);
        match mode {
            Mode::Normal => return self.handle_normal_key(key),
            Mode::NamePrompt(field) => self.handle_name_key(field, key),
            Mode::PickPriority { control, selected } => {
                self.handle_priority_key(control, selected, key)
            }
            Mode::EditDeadline { control, field } => self.handle_deadline_key(control, field, key),
        }
        Ok(false)
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Result<bool> {
        let control = self.current_control();
        if let Some(title @ Control::Row {
            field: Field::Title,
            ..
        }) = &control
        {
            if self.handle_title_key(title, key) {
                return Ok(false);
            }
        }
        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('a') => self.add_task_here(control.as_ref()),
            KeyCode::Char('s') => self.open_name_prompt(),
            KeyCode::Char(c @ '1'..='9') => self.switch_view(c as usize - '1' as usize),
            KeyCode::Tab => self.move_to(self.page.grid.next(self.cursor)),
            KeyCode::BackTab => self.move_to(self.page.grid.prev(self.cursor)),
            KeyCode::Up | KeyCode::Char('k') => self.move_to(self.page.grid.up(self.cursor)),
            KeyCode::Down | KeyCode::Char('j') => self.move_to(self.page.grid.down(self.cursor)),
            KeyCode::Left | KeyCode::Char('h') => self.move_to(self.page.grid.left(self.cursor)),
            KeyCode::Right | KeyCode::Char('l') => {
                self.move_to(self.page.grid.right(self.cursor))
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.activate(control),
            _ => {}
        }
        Ok(false)
    }

    /// Keys typed while a title field has the cursor go straight into it.
    fn handle_title_key(&mut self, control: &Control, key: KeyEvent) -> bool {
        let Some(task_id) = control.task_id() else {
            return false;
        };
        match key.code {
            KeyCode::Esc => {
                self.move_to(Cursor {
                    field: 0,
                    ..self.cursor
                });
                true
            }
            KeyCode::Enter => {
                self.move_to(self.page.grid.next(self.cursor));
                true
            }
            _ => {
                let field = self.editor_field(task_id);
                let before = field.value.clone();
                if !field.edit(key) {
                    return false;
                }
                let text = field.value.clone();
                if text != before {
                    if let Some(action) = control.with_text(&text) {
                        self.dispatch(action, "Saved title");
                    }
                }
                true
            }
        }
    }

    fn handle_name_key(&mut self, mut field: FieldValue, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.status = "Canceled".into(),
            KeyCode::Enter => {
                let name = field.value.trim().to_string();
                let outcome = self.dispatch(
                    Action::CreateSection(name.clone()),
                    format!("Created section {}", name),
                );
                match outcome {
                    Outcome::Unchanged => self.status = "No section created".into(),
                    _ => {
                        let new_card = self
                            .page
                            .planner
                            .document()
                            .last()
                            .map(|s| Control::AddTask(s.id.clone()));
                        if let Some(cursor) =
                            new_card.and_then(|c| self.page.grid.locate(&c))
                        {
                            self.move_to(cursor);
                        }
                    }
                }
            }
            _ => {
                field.edit(key);
                self.mode = Mode::NamePrompt(field);
            }
        }
    }

    fn handle_priority_key(&mut self, control: Control, mut selected: usize, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.status = "Canceled".into(),
            KeyCode::Enter | KeyCode::Char(' ') => {
                let priority = PRIORITIES[selected.min(PRIORITIES.len() - 1)];
                if let Some(action) = control.with_priority(priority) {
                    self.dispatch(action, format!("Priority set to {}", priority.label()));
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                selected = selected.saturating_sub(1);
                self.mode = Mode::PickPriority { control, selected };
            }
            KeyCode::Down | KeyCode::Char('j') => {
                selected = (selected + 1).min(PRIORITIES.len() - 1);
                self.mode = Mode::PickPriority { control, selected };
            }
            _ => self.mode = Mode::PickPriority { control, selected },
        }
    }

    fn handle_deadline_key(&mut self, control: Control, mut field: FieldValue, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.status = "Canceled".into(),
            KeyCode::Enter => match parse_deadline(&field.value) {
                Ok(deadline) => {
                    let message = match deadline {
                        Some(d) => format!("Deadline set to {}", d.format("%Y-%m-%d")),
                        None => "Deadline cleared".to_string(),
                    };
                    if let Some(action) = control.with_deadline(deadline) {
                        self.dispatch(action, message);
                    }
                }
                Err(_) => {
                    self.status = format!("Invalid date (use YYYY-MM-DD): {}", field.value.trim());
                    self.mode = Mode::EditDeadline { control, field };
                }
            },
            _ => {
                field.edit(key);
                self.mode = Mode::EditDeadline { control, field };
            }
        }
    }

    fn activate(&mut self, control: Option<Control>) {
        let Some(control) = control else {
            return;
        };
        match &control {
            Control::Row {
                field: Field::Toggle,
                ..
            }
            | Control::AddTask(_) => {
                let message = match &control {
                    Control::AddTask(_) => "Added task",
                    _ => "Toggled task",
                };
                if let Some(action) = control.activate() {
                    self.dispatch(action, message);
                }
            }
            Control::Row {
                field: Field::Priority,
                task_id,
                ..
            } => {
                let current = self
                    .page
                    .grid
                    .row(task_id)
                    .map(|r| r.priority)
                    .unwrap_or_default();
                let selected = PRIORITIES.iter().position(|p| *p == current).unwrap_or(0);
                self.mode = Mode::PickPriority {
                    control: control.clone(),
                    selected,
                };
            }
            Control::Row {
                field: Field::Deadline,
                task_id,
                ..
            } => {
                let text = self
                    .page
                    .grid
                    .row(task_id)
                    .map(TaskRow::deadline_text)
                    .unwrap_or_default();
                self.mode = Mode::EditDeadline {
                    control: control.clone(),
                    field: FieldValue::new(&text),
                };
                self.status = "Deadline as YYYY-MM-DD, empty to clear".into();
            }
            Control::Row {
                field: Field::Title,
                ..
            } => {}
            Control::CreateSection => self.open_name_prompt(),
        }
    }

    fn add_task_here(&mut self, control: Option<&Control>) {
        match control.and_then(Control::section_id) {
            Some(section_id) => {
                let action = Action::AddTask(section_id.to_string());
                self.dispatch(action, "Added task");
            }
            None => self.status = "Move to a section to add a task".into(),
        }
    }

    fn open_name_prompt(&mut self) {
        self.mode = Mode::NamePrompt(FieldValue::new(""));
        self.status = "Enter to create, Esc to cancel".into();
    }

    /// Navigating to another view reloads everything for it.
    fn switch_view(&mut self, idx: usize) {
        let Some(view) = self.page.nav.view_at(idx).map(str::to_string) else {
            return;
        };
        if view == self.page.planner.view() {
            self.status = format!("Already on {} view", view);
            return;
        }
        let location = Location::with_view(&self.page.location.path, &view);
        self.page = bootstrap(self.store.clone(), location, NavBar::standard());
        self.editor = None;
        self.cursor = Cursor::default();
        self.card_offset = 0;
        self.scroll_offsets.clear();
        self.last_save = None;
        self.status = format!("Switched to {} view", view);
    }

    /// Run one planner action and bring the grid up to date with it.
    fn dispatch(&mut self, action: Action, done: impl Into<String>) -> Outcome {
        let before = self.current_control();
        let patch = match &action {
            Action::UpdateTitle { task_id, text, .. } => Some((task_id.clone(), text.clone())),
            _ => None,
        };
        let outcome = self.page.planner.apply(action);
        match outcome {
            Outcome::Unchanged => {
                self.status = "Nothing changed".into();
                return outcome;
            }
            Outcome::Persisted => {
                if let Some((task_id, text)) = patch {
                    self.page.grid.set_title(&task_id, &text);
                }
            }
            Outcome::Redraw => {
                self.page.redraw();
                self.editor = None;
                self.follow_focus(before);
            }
        }
        match self.page.planner.take_save_error() {
            Some(err) => self.status = format!("Save failed: {}", err),
            None => {
                self.last_save = Some(Instant::now());
                self.status = done.into();
            }
        }
        outcome
    }

    /// Place the cursor after a rebuild: the grid's focus wins, then the
    /// control the cursor was on, then the nearest valid spot.
    fn follow_focus(&mut self, previous: Option<Control>) {
        let grid = &self.page.grid;
        let current = self.cursor;
        self.cursor = grid
            .focus
            .clone()
            .or(previous)
            .and_then(|c| grid.locate(&c))
            .unwrap_or_else(|| grid.clamp(current));
    }

    fn move_to(&mut self, cursor: Cursor) {
        if cursor != self.cursor {
            self.editor = None;
        }
        self.cursor = cursor;
    }

    fn current_control(&self) -> Option<Control> {
        self.page.grid.control_at(self.cursor)
    }

    fn editor_field(&mut self, task_id: &str) -> &mut FieldValue {
        if self.editor.as_ref().map_or(true, |e| e.task_id != task_id) {
            self.editor = None;
        }
        let grid = &self.page.grid;
        let editor = self.editor.get_or_insert_with(|| TitleEditor {
            task_id: task_id.to_string(),
            field: FieldValue::new(grid.row(task_id).map(|r| r.title.as_str()).unwrap_or("")),
        });
        &mut editor.field
    }

    fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(3),
            ])
            .split(f.size());

        self.draw_header(f, layout[0]);
        self.draw_grid(f, layout[1]);
        self.draw_footer(f, layout[2]);

        match &self.mode {
            Mode::NamePrompt(field) => draw_name_prompt(f, field),
            Mode::PickPriority { selected, .. } => draw_priority_picker(f, *selected),
            Mode::EditDeadline { field, .. } => draw_deadline_input(f, field),
            Mode::Normal => {}
        }
    }

    fn draw_header(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let mut spans = vec![Span::styled(
            "tyrozen ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )];
        for (idx, link) in self.page.nav.links.iter().enumerate() {
            spans.push(Span::raw(" "));
            let style = if link.active {
                Style::default()
                    .bg(Color::Magenta)
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(
                format!(" {} {} ", idx + 1, link.label),
                style,
            ));
        }
        spans.push(Span::raw("  •  "));
        spans.push(Span::styled(
            format!(
                "{}",
                self.store.path_for(self.page.planner.view()).display()
            ),
            Style::default().fg(Color::DarkGray),
        ));
        spans.push(Span::raw("  •  "));
        spans.push(Span::styled(
            match self.last_save {
                Some(at) => format!("saved {}", format_elapsed(at)),
                None => "no changes yet".to_string(),
            },
            Style::default().fg(Color::Gray),
        ));

        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));
        let paragraph = Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
    }

    fn draw_grid(&mut self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let cards = &self.page.grid.cards;
        let viewport = ((area.width / CARD_WIDTH).max(1)) as usize;
        self.card_offset = adjust_offset(self.cursor.card, self.card_offset, viewport, 0, cards.len());
        let end = (self.card_offset + viewport).min(cards.len());
        let visible = self.card_offset..end;
        if self.scroll_offsets.len() < cards.len() {
            self.scroll_offsets.resize(cards.len(), 0);
        }

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(
                visible
                    .clone()
                    .map(|_| Constraint::Ratio(1, visible.len() as u32))
                    .collect::<Vec<_>>(),
            )
            .split(area);

        for (chunk_idx, card_idx) in visible.enumerate() {
            let chunk = chunks[chunk_idx];
            let selected = (card_idx == self.cursor.card).then_some(self.cursor);
            let editor = self.editor.as_ref();
            let (lines, selected_line) = match &cards[card_idx] {
                Card::Section(card) => section_lines(card, selected, editor),
                Card::Create => create_lines(selected.is_some()),
            };
            let viewport = chunk.height.saturating_sub(2) as usize;
            let offset = match selected_line {
                Some(line) => adjust_offset(
                    line,
                    self.scroll_offsets[card_idx],
                    viewport,
                    1,
                    lines.len(),
                ),
                None => self.scroll_offsets[card_idx].min(lines.len().saturating_sub(1)),
            };
            self.scroll_offsets[card_idx] = offset;

            let accent = color_for_index(card_idx);
            let title = match &cards[card_idx] {
                Card::Section(card) => format!("{} ({})", card.title, card.rows.len()),
                Card::Create => "New Section".to_string(),
            };
            let block = Block::default()
                .title(Span::styled(
                    title,
                    Style::default()
                        .fg(accent)
                        .add_modifier(if selected.is_some() {
                            Modifier::BOLD | Modifier::UNDERLINED
                        } else {
                            Modifier::BOLD
                        }),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent))
                .style(Style::default().bg(Color::Rgb(16, 18, 24)));
            let paragraph = Paragraph::new(lines)
                .block(block)
                .scroll((offset.min(u16::MAX as usize) as u16, 0));
            f.render_widget(paragraph, chunk);
        }
    }

    fn draw_footer(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let lines = vec![self.footer_help_line(), Line::from(self.status.clone())];
        let footer = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        f.render_widget(footer, area);
    }

    fn footer_help_line(&self) -> Line<'static> {
        let on_title = matches!(
            self.current_control(),
            Some(Control::Row {
                field: Field::Title,
                ..
            })
        );
        let spans = match &self.mode {
            Mode::NamePrompt(_) | Mode::EditDeadline { .. } => vec![
                Span::styled("Enter", Style::default().fg(Color::LightGreen)),
                Span::raw(" save  "),
                Span::styled("Esc", Style::default().fg(Color::LightRed)),
                Span::raw(" cancel"),
            ],
            Mode::PickPriority { .. } => vec![
                Span::styled("↑↓", Style::default().fg(Color::LightCyan)),
                Span::raw(" choose  "),
                Span::styled("Enter", Style::default().fg(Color::LightGreen)),
                Span::raw(" set  "),
                Span::styled("Esc", Style::default().fg(Color::LightRed)),
                Span::raw(" cancel"),
            ],
            Mode::Normal if on_title => vec![
                Span::raw("type to edit title  "),
                Span::styled("Tab/↑↓", Style::default().fg(Color::LightCyan)),
                Span::raw(" leave field  "),
                Span::styled("Esc", Style::default().fg(Color::LightYellow)),
                Span::raw(" to checkbox  "),
                Span::styled("Ctrl-C", Style::default().fg(Color::LightRed)),
                Span::raw(" quit"),
            ],
            Mode::Normal => vec![
                Span::styled("1 2 3", Style::default().fg(Color::LightCyan)),
                Span::raw(" view  "),
                Span::styled("←↑↓→ / Tab", Style::default().fg(Color::LightCyan)),
                Span::raw(" move  "),
                Span::styled("Enter", Style::default().fg(Color::LightGreen)),
                Span::raw(" activate  "),
                Span::styled("a", Style::default().fg(Color::LightMagenta)),
                Span::raw(" new task  "),
                Span::styled("s", Style::default().fg(Color::LightMagenta)),
                Span::raw(" new section  "),
                Span::styled("q", Style::default().fg(Color::LightRed)),
                Span::raw(" quit"),
            ],
        };
        Line::from(spans)
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn selected_style() -> Style {
    Style::default()
        .bg(Color::LightCyan)
        .fg(Color::Black)
        .add_modifier(Modifier::BOLD)
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::LightRed,
        Priority::Moderate => Color::LightYellow,
        Priority::Low => Color::LightGreen,
    }
}

/// Lines for a section card and the index of the line holding the cursor.
fn section_lines(
    card: &SectionCard,
    cursor: Option<Cursor>,
    editor: Option<&TitleEditor>,
) -> (Vec<Line<'static>>, Option<usize>) {
    let mut lines = Vec::new();
    let mut selected_line = None;
    if let Some(message) = card.empty_message() {
        lines.push(Line::from(Span::styled(
            message,
            Style::default().fg(Color::DarkGray),
        )));
    }
    for (slot, row) in card.rows.iter().enumerate() {
        let field = cursor.filter(|c| c.slot == slot).map(|c| c.field);
        if let Some(field) = field {
            selected_line = Some(lines.len() + usize::from(field >= 2));
        }
        let editing = editor.filter(|e| e.task_id == row.task_id && field == Some(1));
        lines.extend(row_lines(row, field, editing));
    }
    let add_selected = cursor.is_some_and(|c| c.slot == card.rows.len());
    if add_selected {
        selected_line = Some(lines.len());
    }
    lines.push(Line::from(Span::styled(
        NEW_TASK_LABEL,
        if add_selected {
            selected_style()
        } else {
            Style::default().fg(Color::LightMagenta)
        },
    )));
    (lines, selected_line)
}

fn row_lines(
    row: &TaskRow,
    field: Option<usize>,
    editor: Option<&TitleEditor>,
) -> [Line<'static>; 2] {
    let pick = |idx: usize, base: Style| {
        if field == Some(idx) {
            selected_style()
        } else {
            base
        }
    };
    let mut title_style = Style::default().fg(Color::White);
    if row.completed {
        title_style = title_style
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT);
    }
    let title = match editor {
        Some(editor) => editor.field.with_caret(),
        None if field == Some(1) && row.title.is_empty() => "▌".to_string(),
        None if row.title.is_empty() => TITLE_PLACEHOLDER.to_string(),
        None => row.title.clone(),
    };
    if row.title.is_empty() && editor.is_none() && field != Some(1) {
        title_style = Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC);
    }
    let deadline = row.deadline_text();
    [
        Line::from(vec![
            Span::styled(
                format!("[{}]", row.toggle_text()),
                pick(0, Style::default().fg(Color::LightGreen)),
            ),
            Span::raw(" "),
            Span::styled(title, pick(1, title_style)),
        ]),
        Line::from(vec![
            Span::raw("    "),
            Span::styled(
                format!("‹{}›", row.priority.label()),
                pick(2, Style::default().fg(priority_color(row.priority))),
            ),
            Span::raw("  "),
            Span::styled(
                if deadline.is_empty() {
                    "no deadline".to_string()
                } else {
                    deadline
                },
                pick(3, Style::default().fg(Color::Gray)),
            ),
        ]),
    ]
}

fn create_lines(selected: bool) -> (Vec<Line<'static>>, Option<usize>) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            CREATE_SECTION_LABEL,
            if selected {
                selected_style()
            } else {
                Style::default()
                    .fg(Color::LightMagenta)
                    .add_modifier(Modifier::BOLD)
            },
        )),
    ];
    (lines, selected.then_some(1))
}

fn draw_name_prompt(f: &mut ratatui::Frame<'_>, field: &FieldValue) {
    let area = centered_rect(50, 20, f.size());
    let body = vec![
        Line::from(Span::styled(
            NEW_SECTION_PROMPT,
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            field.with_caret(),
            Style::default().fg(Color::Cyan),
        )),
    ];
    draw_dialog(f, area, "New Section", body);
}

fn draw_deadline_input(f: &mut ratatui::Frame<'_>, field: &FieldValue) {
    let area = centered_rect(40, 20, f.size());
    let body = vec![
        Line::from(Span::styled(
            "Deadline (YYYY-MM-DD, empty clears)",
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            field.with_caret(),
            Style::default().fg(Color::Cyan),
        )),
    ];
    draw_dialog(f, area, "Deadline", body);
}

fn draw_priority_picker(f: &mut ratatui::Frame<'_>, selected: usize) {
    let area = centered_rect(30, 30, f.size());
    let items = PRIORITIES
        .iter()
        .map(|p| ListItem::new(p.label()).style(Style::default().fg(priority_color(*p))))
        .collect::<Vec<_>>();
    let mut state = ListState::default();
    state.select(Some(selected));
    let list = List::new(items)
        .block(
            Block::default()
                .title(Span::styled(
                    "Priority",
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(selected_style());
    f.render_widget(Clear, area);
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_dialog(f: &mut ratatui::Frame<'_>, area: Rect, title: &str, body: Vec<Line<'static>>) {
    let dialog = Paragraph::new(body)
        .block(
            Block::default()
                .title(Span::styled(
                    title.to_string(),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(Clear, area);
    f.render_widget(dialog, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn color_for_index(idx: usize) -> Color {
    let palette = [
        Color::Cyan,
        Color::LightGreen,
        Color::LightMagenta,
        Color::LightBlue,
        Color::LightYellow,
        Color::LightRed,
    ];
    palette[idx % palette.len()]
}

fn adjust_offset(
    selected: usize,
    current_offset: usize,
    viewport: usize,
    scrolloff: usize,
    len: usize,
) -> usize {
    if viewport == 0 || len == 0 {
        return 0;
    }
    let max_offset = len.saturating_sub(viewport);
    let margin = scrolloff.min(viewport.saturating_sub(1));
    let mut offset = current_offset.min(max_offset);
    if selected < offset.saturating_add(margin) {
        offset = selected.saturating_sub(margin);
    } else {
        let upper = offset
            .saturating_add(viewport.saturating_sub(1))
            .saturating_sub(margin);
        if selected > upper {
            offset = selected.saturating_add(margin + 1).saturating_sub(viewport);
        }
    }
    offset.min(max_offset)
}

fn prev_grapheme(cursor: usize, text: &str) -> usize {
    if cursor == 0 {
        return 0;
    }
    let mut prev = 0;
    for (idx, _) in text.char_indices() {
        if idx >= cursor {
            break;
        }
        prev = idx;
    }
    prev
}

fn next_grapheme(cursor: usize, text: &str) -> usize {
    for (idx, ch) in text.char_indices() {
        if idx > cursor {
            return idx;
        }
        if idx == cursor {
            return cursor + ch.len_utf8();
        }
    }
    text.len()
}

fn format_elapsed(last: Instant) -> String {
    let secs = last.elapsed().as_secs();
    if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3600)
    }
}
