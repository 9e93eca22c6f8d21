use std::{
    any,
    backtrace::{Backtrace, BacktraceStatus},
    cmp,
    error::Error as StdError,
    fs, io,
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame, Terminal,
};
use switchlib_core::{
    config::AppConfig,
    entry::{EntryForm, Library},
    error::{CatalogError, EntryError, Field},
    years,
};
use tokio::sync::mpsc;
use tracing::{error, info};

const TICK_RATE: Duration = Duration::from_millis(250);
const MAX_INPUT_LEN: usize = 64;
const MAX_PATH_LEN: usize = 512;

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    error_bg: Color,
    error_border: Color,
    disabled: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            error_bg: Color::Rgb(255, 20, 147),
            error_border: Color::Rgb(199, 21, 133),
            disabled: Color::Gray,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Name,
    Year,
    Price,
    Space,
    Digital,
    Add,
}

impl Focus {
    const ORDER: [Focus; 6] = [
        Focus::Name,
        Focus::Year,
        Focus::Price,
        Focus::Space,
        Focus::Digital,
        Focus::Add,
    ];

    fn step(self, delta: isize) -> Self {
        let len = Self::ORDER.len() as isize;
        let index = Self::ORDER
            .iter()
            .position(|focus| *focus == self)
            .unwrap_or(0) as isize;
        Self::ORDER[(index + delta).rem_euclid(len) as usize]
    }

    fn for_field(field: Field) -> Self {
        match field {
            Field::Name => Focus::Name,
            Field::Price => Focus::Price,
            Field::Space => Focus::Space,
        }
    }

    fn field(self) -> Option<Field> {
        match self {
            Focus::Name => Some(Field::Name),
            Focus::Price => Some(Field::Price),
            Focus::Space => Some(Field::Space),
            _ => None,
        }
    }
}

/// Single-line editor; `cursor` counts chars, not bytes.
#[derive(Debug, Clone)]
struct TextInput {
    value: String,
    cursor: usize,
    limit: usize,
}

impl TextInput {
    fn new(limit: usize) -> Self {
        Self {
            value: String::new(),
            cursor: 0,
            limit,
        }
    }

    fn with_value(limit: usize, value: String) -> Self {
        let cursor = value.chars().count();
        Self {
            value,
            cursor,
            limit,
        }
    }

    fn char_len(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map(|(index, _)| index)
            .unwrap_or(self.value.len())
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.char_len() as isize;
        let next = (self.cursor as isize + delta).clamp(0, len);
        self.cursor = next as usize;
    }

    fn move_home(&mut self) {
        self.cursor = 0;
    }

    fn move_end(&mut self) {
        self.cursor = self.char_len();
    }

    fn insert(&mut self, ch: char) {
        if self.char_len() >= self.limit {
            return;
        }
        if !ch.is_control() {
            let at = self.byte_index(self.cursor);
            self.value.insert(at, ch);
            self.cursor += 1;
        }
    }

    fn backspace(&mut self) {
        if self.cursor > 0 && self.cursor <= self.char_len() {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    fn delete(&mut self) {
        if self.cursor < self.char_len() {
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Apply an editing key; returns true when the text changed.
    fn handle_key(&mut self, key: &KeyEvent) -> bool {
        let before = self.value.len();
        match key.code {
            KeyCode::Left => self.move_cursor(-1),
            KeyCode::Right => self.move_cursor(1),
            KeyCode::Home => self.move_home(),
            KeyCode::End => self.move_end(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Char(ch)
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
            {
                self.insert(ch)
            }
            _ => {}
        }
        self.value.len() != before
    }
}

#[derive(Debug, Clone)]
enum Modal {
    SavePath(TextInput),
    ConfirmExit,
    Failure { title: String, lines: Vec<String> },
}

enum AppEvent {
    Input(Event),
    Tick,
}

struct EntryState {
    name: TextInput,
    price: TextInput,
    space: TextInput,
    years: Vec<i32>,
    year_index: usize,
    is_digital: bool,
    gold_points: Option<u64>,
    focus: Focus,
    error_field: Option<Field>,
    locked: bool,
}

impl EntryState {
    fn new(years: Vec<i32>) -> Self {
        Self {
            name: TextInput::new(MAX_INPUT_LEN),
            price: TextInput::new(MAX_INPUT_LEN),
            space: TextInput::new(MAX_INPUT_LEN),
            years,
            year_index: 0,
            is_digital: false,
            gold_points: None,
            focus: Focus::Name,
            error_field: None,
            locked: false,
        }
    }

    fn reset(&mut self) {
        self.name.clear();
        self.price.clear();
        self.space.clear();
        self.year_index = 0;
        self.is_digital = false;
        self.gold_points = None;
        self.focus = Focus::Name;
        self.error_field = None;
        self.locked = false;
    }

    fn selected_year(&self) -> String {
        self.years
            .get(self.year_index)
            .map(|year| year.to_string())
            .unwrap_or_default()
    }

    fn cycle_year(&mut self, delta: isize) {
        if self.years.is_empty() {
            return;
        }
        let len = self.years.len() as isize;
        self.year_index = (self.year_index as isize + delta).rem_euclid(len) as usize;
    }

    fn form(&self) -> EntryForm {
        EntryForm {
            name: self.name.value.clone(),
            release_year: self.selected_year(),
            price: self.price.value.clone(),
            space: self.space.value.clone(),
            is_digital: self.is_digital,
        }
    }

    fn input_mut(&mut self, focus: Focus) -> Option<&mut TextInput> {
        match focus {
            Focus::Name => Some(&mut self.name),
            Focus::Price => Some(&mut self.price),
            Focus::Space => Some(&mut self.space),
            _ => None,
        }
    }

    fn report_error(&mut self, field: Field) {
        self.error_field = Some(field);
        self.focus = Focus::for_field(field);
        if let Some(input) = self.input_mut(self.focus) {
            input.move_end();
        }
    }
}

/// Terminal front end for entering and saving Switch games.
pub struct SwitchLibApp {
    library: Library,
    config: AppConfig,
    entry: EntryState,
    modal: Option<Modal>,
    status: String,
    theme: Theme,
    should_quit: bool,
}

impl SwitchLibApp {
    pub fn new(library: Library, config: AppConfig) -> Self {
        let years = years::release_years_until_now(config.start_year);
        let mut app = Self {
            library,
            config,
            entry: EntryState::new(years),
            modal: None,
            status: String::new(),
            theme: Theme::default(),
            should_quit: false,
        };
        app.set_status("Ready for new entries.");
        app
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.should_quit {
                break;
            }
            match event_rx.recv().await {
                Some(AppEvent::Input(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    self.handle_key(key)
                }
                Some(AppEvent::Input(_)) | Some(AppEvent::Tick) => {}
                None => break,
            }
        }

        restore_terminal(&mut terminal)?;
        info!(games = self.library.catalog().len(), "Exiting");
        Ok(())
    }

    fn set_status(&mut self, message: impl AsRef<str>) {
        self.status = format!(
            "{}: {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            message.as_ref()
        );
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.modal.is_some() {
            self.handle_modal_key(key);
            return;
        }

        if key.modifiers == KeyModifiers::CONTROL {
            match key.code {
                KeyCode::Char('s') => {
                    self.open_save_prompt();
                    return;
                }
                KeyCode::Char('r') => {
                    self.reset_form();
                    return;
                }
                KeyCode::Char('q') | KeyCode::Char('c') => {
                    self.modal = Some(Modal::ConfirmExit);
                    return;
                }
                _ => {}
            }
        }

        match key.code {
            KeyCode::Esc => self.modal = Some(Modal::ConfirmExit),
            KeyCode::Enter if self.entry.locked => self.reset_form(),
            KeyCode::Enter => self.add_game(),
            _ if self.entry.locked => {}
            KeyCode::Tab | KeyCode::Down => self.entry.focus = self.entry.focus.step(1),
            KeyCode::BackTab | KeyCode::Up => self.entry.focus = self.entry.focus.step(-1),
            _ => self.handle_field_key(key),
        }
    }

    fn handle_field_key(&mut self, key: KeyEvent) {
        let focus = self.entry.focus;
        match focus {
            Focus::Year => match key.code {
                KeyCode::Left => self.entry.cycle_year(-1),
                KeyCode::Right => self.entry.cycle_year(1),
                _ => {}
            },
            Focus::Digital => {
                if matches!(key.code, KeyCode::Char(' ')) {
                    self.entry.is_digital = !self.entry.is_digital;
                }
            }
            Focus::Add => {
                if matches!(key.code, KeyCode::Char(' ')) {
                    self.add_game();
                }
            }
            Focus::Name | Focus::Price | Focus::Space => {
                let changed = self
                    .entry
                    .input_mut(focus)
                    .map(|input| input.handle_key(&key))
                    .unwrap_or(false);
                if changed && self.entry.error_field == focus.field() {
                    self.entry.error_field = None;
                }
            }
        }
    }

    fn add_game(&mut self) {
        let form = self.entry.form();
        match self.library.submit(&form) {
            Ok(receipt) => {
                self.entry.gold_points = Some(receipt.gold_points);
                self.entry.error_field = None;
                self.entry.locked = true;
                self.set_status(format!("Added {}", receipt.summary));
            }
            Err(EntryError::Invalid(err)) => {
                self.entry.report_error(err.field);
                self.set_status(&err.message);
            }
            Err(err) => {
                error!(?err, "Unexpected entry failure");
                self.modal = Some(failure_modal("Unknown Error", &err));
                self.set_status("An unknown error has occurred.");
            }
        }
    }

    fn reset_form(&mut self) {
        self.entry.reset();
        self.set_status("Ready for new entries.");
    }

    fn open_save_prompt(&mut self) {
        let default = self.config.save_path().display().to_string();
        self.modal = Some(Modal::SavePath(TextInput::with_value(MAX_PATH_LEN, default)));
    }

    fn handle_modal_key(&mut self, key: KeyEvent) {
        let Some(modal) = self.modal.take() else {
            return;
        };
        match modal {
            Modal::SavePath(mut input) => match key.code {
                KeyCode::Esc => self.set_status("Cancelled Save operation."),
                KeyCode::Enter => {
                    let path = PathBuf::from(input.value.trim());
                    self.save_to(path);
                }
                _ => {
                    input.handle_key(&key);
                    self.modal = Some(Modal::SavePath(input));
                }
            },
            Modal::ConfirmExit => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => self.should_quit = true,
                _ => self.set_status("Cancelled Exit operation."),
            },
            Modal::Failure { .. } => {}
        }
    }

    fn save_to(&mut self, path: PathBuf) {
        if path.as_os_str().is_empty() {
            self.set_status("Cancelled Save operation.");
            return;
        }
        let result =
            prepare_parent(&path).and_then(|()| self.library.save(&path, self.config.format));
        match result {
            Ok(()) => self.set_status(format!("List saved to {}", path.display())),
            Err(err) => {
                error!(?err, path = %path.display(), "Save failed");
                self.modal = Some(failure_modal("File Access Error", &err));
                self.set_status(format!("Error writing the list to {}", path.display()));
            }
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(12), Constraint::Length(3)])
            .split(frame.size());
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(44), Constraint::Min(20)])
            .split(rows[0]);

        self.render_form(frame, columns[0]);
        self.render_game_list(frame, columns[1]);
        self.render_status(frame, rows[1]);

        match &self.modal {
            Some(Modal::SavePath(input)) => self.render_save_prompt(frame, input),
            Some(Modal::ConfirmExit) => self.render_message(
                frame,
                "Exit?",
                &["Are you sure you want to exit? (y/n)".to_string()],
            ),
            Some(Modal::Failure { title, lines }) => self.render_message(frame, title, lines),
            None => {}
        }
    }

    fn field_style(&self, focus: Focus) -> Style {
        let entry = &self.entry;
        if focus.field().is_some() && entry.error_field == focus.field() {
            return Style::default()
                .bg(self.theme.error_bg)
                .fg(self.theme.error_border)
                .add_modifier(Modifier::BOLD);
        }
        if entry.locked {
            return Style::default().fg(self.theme.disabled);
        }
        if entry.focus == focus {
            return Style::default()
                .fg(self.theme.accent)
                .add_modifier(Modifier::BOLD);
        }
        Style::default().fg(self.theme.primary_fg)
    }

    fn render_form(&self, frame: &mut Frame, area: Rect) {
        let entry = &self.entry;
        let label = |text: &str| {
            Span::styled(format!("{text:<14}"), Style::default().fg(self.theme.muted))
        };
        let digital = if entry.is_digital { "[x]" } else { "[ ]" };
        let gold = entry
            .gold_points
            .map(|points| points.to_string())
            .unwrap_or_default();
        let add_label = if entry.locked {
            "[ Reset (Enter) ]"
        } else {
            "[ Add Game ]"
        };

        let lines = vec![
            Line::from(vec![
                label("Name"),
                Span::styled(
                    format!("{} ", entry.name.value),
                    self.field_style(Focus::Name),
                ),
            ]),
            Line::from(vec![
                label("Release Year"),
                Span::styled(
                    format!("< {} >", entry.selected_year()),
                    self.field_style(Focus::Year),
                ),
            ]),
            Line::from(vec![
                label("Price"),
                Span::styled(
                    format!("{} ", entry.price.value),
                    self.field_style(Focus::Price),
                ),
            ]),
            Line::from(vec![
                label("Space"),
                Span::styled(
                    format!("{} ", entry.space.value),
                    self.field_style(Focus::Space),
                ),
            ]),
            Line::from(vec![
                label("Digital"),
                Span::styled(digital, self.field_style(Focus::Digital)),
            ]),
            Line::from(vec![label("Gold Points"), Span::raw(gold)]),
            Line::from(""),
            Line::from(Span::styled(add_label, self.field_style(Focus::Add))),
            Line::from(""),
            Line::from(Span::styled(
                "Tab move  Enter add  ^R reset  ^S save  Esc exit",
                Style::default().fg(self.theme.muted),
            )),
        ];
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("New Game"))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);

        if self.modal.is_none() && !entry.locked {
            let row = match entry.focus {
                Focus::Name => Some((0, entry.name.cursor)),
                Focus::Price => Some((2, entry.price.cursor)),
                Focus::Space => Some((3, entry.space.cursor)),
                _ => None,
            };
            if let Some((row, cursor)) = row {
                let x = (area.x + 1 + 14 + cursor as u16)
                    .min(area.x + area.width.saturating_sub(2));
                frame.set_cursor(x, area.y + 1 + row);
            }
        }
    }

    fn render_game_list(&self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .library
            .catalog()
            .iter()
            .map(|game| {
                let mut spans = vec![Span::styled(
                    game.describe(),
                    Style::default().fg(self.theme.primary_fg),
                )];
                if game.is_digital() {
                    spans.push(Span::styled(
                        " · digital",
                        Style::default().fg(self.theme.muted),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();
        let title = format!("Games ({})", self.library.catalog().len());
        let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(list, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let paragraph = Paragraph::new(Line::from(self.status.clone()))
            .block(Block::default().borders(Borders::ALL).title("Status"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_save_prompt(&self, frame: &mut Frame, input: &TextInput) {
        let area = centered(frame.size(), 70, 7);
        frame.render_widget(Clear, area);

        let input_line = Line::from(vec![
            Span::styled("> ", Style::default().fg(self.theme.accent)),
            Span::raw(input.value.clone()),
        ]);
        let helper = Line::from(vec![
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" save  "),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" cancel"),
        ]);
        let format_hint = Line::from(format!("Format: {}", self.config.format));
        let paragraph = Paragraph::new(vec![
            Line::from("Save the list to"),
            input_line,
            Line::from(""),
            helper,
            format_hint,
        ])
        .block(Block::default().borders(Borders::ALL).title("Save List"));
        frame.render_widget(paragraph, area);

        let cursor_x =
            (area.x + 3 + input.cursor as u16).min(area.x + area.width.saturating_sub(2));
        frame.set_cursor(cursor_x, area.y + 2);
    }

    fn render_message(&self, frame: &mut Frame, title: &str, lines: &[String]) {
        let height = (lines.len() as u16 + 4).min(frame.size().height);
        let area = centered(frame.size(), 72, height);
        frame.render_widget(Clear, area);
        let mut content: Vec<Line> = lines.iter().map(|line| Line::from(line.clone())).collect();
        content.push(Line::from(""));
        content.push(Line::from(Span::styled(
            "Press any key",
            Style::default().fg(self.theme.muted),
        )));
        let paragraph = Paragraph::new(content)
            .block(Block::default().borders(Borders::ALL).title(title.to_string()))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn failure_modal<E>(title: &str, err: &E) -> Modal
where
    E: StdError + 'static,
{
    let mut lines = vec![
        format!("Message: {err}"),
        format!("Type: {}", any::type_name::<E>()),
    ];
    let mut source = err.source();
    while let Some(cause) = source {
        lines.push(format!("Source: {cause}"));
        source = cause.source();
    }
    lines.push(format!("Details: {err:?}"));

    let trace = Backtrace::capture();
    match trace.status() {
        BacktraceStatus::Captured => {
            lines.push("Trace:".to_string());
            lines.extend(trace.to_string().lines().map(str::to_string));
        }
        _ => lines.push("Trace: not captured (set RUST_BACKTRACE=1)".to_string()),
    }

    Modal::Failure {
        title: title.to_string(),
        lines,
    }
}

fn prepare_parent(path: &Path) -> Result<(), CatalogError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| CatalogError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

fn centered(frame_area: Rect, max_width: u16, height: u16) -> Rect {
    let width = cmp::max(
        cmp::min(max_width, frame_area.width.saturating_sub(4)),
        24_u16.min(frame_area.width),
    );
    let height = height.min(frame_area.height);
    let x = frame_area.x + (frame_area.width.saturating_sub(width)) / 2;
    let y = frame_area.y + (frame_area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    fn app_with_game() -> SwitchLibApp {
        let mut app = app();
        app.entry.name = TextInput::with_value(MAX_INPUT_LEN, "Celeste".to_string());
        app.entry.price = TextInput::with_value(MAX_INPUT_LEN, "19.99".to_string());
        app.entry.space = TextInput::with_value(MAX_INPUT_LEN, "1200".to_string());
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.library.catalog().len(), 1);
        app
    }

    fn failure_lines(app: &SwitchLibApp) -> (&str, &[String]) {
        match &app.modal {
            Some(Modal::Failure { title, lines }) => (title.as_str(), lines.as_slice()),
            other => panic!("expected a failure popup, got {other:?}"),
        }
    }

    fn app() -> SwitchLibApp {
        SwitchLibApp::new(Library::new(), AppConfig::default())
    }

    fn type_text(app: &mut SwitchLibApp, text: &str) {
        for ch in text.chars() {
            app.handle_key(key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn text_input_edits_at_cursor() {
        let mut input = TextInput::new(8);
        for ch in "Zelda".chars() {
            input.insert(ch);
        }
        input.move_home();
        input.delete();
        assert_eq!(input.value, "elda");
        input.move_end();
        input.backspace();
        input.move_cursor(-10);
        assert_eq!(input.cursor, 0);
        assert_eq!(input.value, "eld");
        for ch in "abcdefgh".chars() {
            input.insert(ch);
        }
        assert_eq!(input.value.len(), 8);
    }

    #[test]
    fn focus_wraps_in_both_directions() {
        assert_eq!(Focus::Name.step(-1), Focus::Add);
        assert_eq!(Focus::Add.step(1), Focus::Name);
        assert_eq!(Focus::Year.step(2), Focus::Space);
        assert_eq!(Focus::for_field(Field::Space), Focus::Space);
        assert_eq!(Focus::Digital.field(), None);
    }

    #[test]
    fn failed_submission_focuses_offending_field() {
        let mut app = app();
        type_text(&mut app, "Mario");
        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Tab));
        type_text(&mut app, "abc");
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.entry.error_field, Some(Field::Price));
        assert_eq!(app.entry.focus, Focus::Price);
        assert!(app.status.ends_with("Price must be a number"));
        assert!(app.library.catalog().is_empty());

        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.entry.error_field, None);
    }

    #[test]
    fn successful_submission_locks_until_reset() {
        let mut app = app();
        type_text(&mut app, "Mario Kart 8");
        app.entry.price = TextInput::with_value(MAX_INPUT_LEN, "59.99".to_string());
        app.entry.space = TextInput::with_value(MAX_INPUT_LEN, "6500".to_string());
        app.handle_key(key(KeyCode::Enter));

        assert!(app.entry.locked);
        assert_eq!(app.entry.gold_points, Some(6));
        assert_eq!(app.library.catalog().len(), 1);

        type_text(&mut app, "ignored");
        assert_eq!(app.entry.name.value, "Mario Kart 8");

        app.handle_key(key(KeyCode::Enter));
        assert!(!app.entry.locked);
        assert!(app.entry.name.value.is_empty());
        assert_eq!(app.library.catalog().len(), 1);
    }

    #[test]
    fn year_selector_cycles_through_choices() {
        let mut entry = EntryState::new(vec![2018, 2017, 2016]);
        assert_eq!(entry.selected_year(), "2018");
        entry.cycle_year(-1);
        assert_eq!(entry.selected_year(), "2016");
        entry.cycle_year(2);
        assert_eq!(entry.selected_year(), "2017");
    }

    #[test]
    fn exit_requires_confirmation() {
        let mut app = app();
        app.handle_key(key(KeyCode::Esc));
        app.handle_key(key(KeyCode::Char('n')));
        assert!(!app.should_quit);
        assert!(app.modal.is_none());
        app.handle_key(key(KeyCode::Esc));
        app.handle_key(key(KeyCode::Char('y')));
        assert!(app.should_quit);
    }

    #[test]
    fn text_input_edits_across_multibyte_chars() {
        let mut input = TextInput::with_value(MAX_PATH_LEN, "/home/José/games.json".to_string());
        assert_eq!(input.cursor, 21);
        for _ in 0..11 {
            input.move_cursor(-1);
        }
        input.backspace();
        assert_eq!(input.value, "/home/Jos/games.json");
        input.insert('e');
        assert_eq!(input.value, "/home/Jose/games.json");
        input.move_cursor(-1);
        input.delete();
        input.insert('é');
        assert_eq!(input.value, "/home/José/games.json");
        assert_eq!(input.cursor, 10);
        input.move_end();
        assert_eq!(input.cursor, input.value.chars().count());
    }

    #[test]
    fn save_prompt_can_be_cancelled() {
        let mut app = app_with_game();
        app.handle_key(ctrl('s'));
        assert!(matches!(app.modal, Some(Modal::SavePath(_))));
        app.handle_key(key(KeyCode::Esc));
        assert!(app.modal.is_none());
        assert!(app.status.ends_with("Cancelled Save operation."));
    }

    #[test]
    fn save_prompt_writes_catalog() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("lists").join("games.json");
        let mut app = app_with_game();
        app.handle_key(ctrl('s'));
        app.modal = Some(Modal::SavePath(TextInput::with_value(
            MAX_PATH_LEN,
            path.display().to_string(),
        )));
        app.handle_key(key(KeyCode::Enter));

        assert!(app.modal.is_none());
        assert!(app
            .status
            .ends_with(&format!("List saved to {}", path.display())));
        let contents = fs::read_to_string(&path)?;
        assert!(contents.starts_with("[{\"Name\":\"Celeste\""));
        Ok(())
    }

    #[test]
    fn unwritable_save_target_reports_file_error() -> Result<()> {
        let dir = tempdir()?;
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "file")?;
        let path = blocker.join("games.json");

        let mut app = app_with_game();
        app.handle_key(ctrl('s'));
        app.modal = Some(Modal::SavePath(TextInput::with_value(
            MAX_PATH_LEN,
            path.display().to_string(),
        )));
        app.handle_key(key(KeyCode::Enter));

        let (title, lines) = failure_lines(&app);
        assert_eq!(title, "File Access Error");
        assert!(lines.iter().any(|line| line.starts_with("Type: ")
            && line.contains("CatalogError")));
        assert!(app.status.contains("Error writing the list to"));
        assert_eq!(app.library.catalog().len(), 1);
        Ok(())
    }

    #[test]
    fn unexpected_failure_shows_full_details() {
        let mut app = app();
        app.entry.years.clear();
        app.entry.name = TextInput::with_value(MAX_INPUT_LEN, "Mario".to_string());
        app.entry.price = TextInput::with_value(MAX_INPUT_LEN, "10".to_string());
        app.entry.space = TextInput::with_value(MAX_INPUT_LEN, "5".to_string());
        app.handle_key(key(KeyCode::Enter));

        let (title, lines) = failure_lines(&app);
        assert_eq!(title, "Unknown Error");
        assert!(lines[0].starts_with("Message: release year"));
        assert!(lines.iter().any(|line| line.contains("EntryError")));
        assert!(lines.iter().any(|line| line.starts_with("Source: ")));
        assert!(lines.iter().any(|line| line.starts_with("Details: ReleaseYear")));
        assert!(lines.iter().any(|line| line.starts_with("Trace")));
        assert!(app.library.catalog().is_empty());
        assert!(app.status.ends_with("An unknown error has occurred."));

        app.handle_key(key(KeyCode::Char('x')));
        assert!(app.modal.is_none());
    }
}
