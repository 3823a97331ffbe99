use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::{
    env,
    fs::File,
    io::{Stdout, stdout},
    path::{Path, PathBuf},
    process,
    time::{Duration, Instant},
};
use textvars_config::Config;
use textvars_engine::{
    Dispatcher, ElementId, MemoryDocument, MemoryVariableStore, Response, Session,
    SettingsUpdate, TextHost, Transition, UiMessage, VariableStore,
    dispatcher::Event as Inbound, engine::has_backup, host::DocumentFile,
};

/// How long to wait for a key when no selection is pending.
const IDLE_POLL: Duration = Duration::from_millis(500);

type Host = Dispatcher<MemoryDocument, MemoryVariableStore>;

struct App {
    dispatcher: Host,
    document_path: PathBuf,
    text_ids: Vec<ElementId>,
    list_state: ListState,
    status: String,
}

impl App {
    fn new(config: &Config, variables_path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(&config.document_path)
            .with_context(|| format!("reading {}", config.document_path.display()))?;
        let doc = DocumentFile::from_json(&json)
            .with_context(|| format!("parsing {}", config.document_path.display()))?
            .into_document();

        let vars = if variables_path.exists() {
            let json = std::fs::read_to_string(variables_path)
                .with_context(|| format!("reading {}", variables_path.display()))?;
            MemoryVariableStore::from_json(&json)
                .with_context(|| format!("parsing {}", variables_path.display()))?
        } else {
            log::warn!(
                "No variables file at {}, starting empty",
                variables_path.display()
            );
            MemoryVariableStore::new()
        };

        let session = Session::load(&doc, config.document_settings(), config.enabled);
        let text_ids = doc.text_ids();
        let mut dispatcher = Dispatcher::new(doc, vars, session, config.debounce());
        let init = dispatcher.handle(Inbound::Message(UiMessage::Init), Instant::now());

        let mut app = Self {
            dispatcher,
            document_path: config.document_path.clone(),
            text_ids,
            list_state: ListState::default(),
            status: String::new(),
        };
        app.show_response(init);
        Ok(app)
    }

    fn next_element(&mut self) {
        if self.text_ids.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1) % self.text_ids.len(),
            None => 0,
        };
        self.select(Some(i));
    }

    fn previous_element(&mut self) {
        if self.text_ids.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => self.text_ids.len() - 1,
            Some(i) => i - 1,
        };
        self.select(Some(i));
    }

    /// Moves the document selection, which the dispatcher acts on once it
    /// settles.
    fn select(&mut self, index: Option<usize>) {
        self.list_state.select(index);
        let ids: Vec<ElementId> = index
            .and_then(|i| self.text_ids.get(i))
            .cloned()
            .into_iter()
            .collect();
        self.dispatcher.host_mut().set_selection(ids.clone());
        self.dispatcher
            .handle(Inbound::SelectionChanged(ids), Instant::now());
    }

    fn send(&mut self, message: UiMessage) {
        let response = self.dispatcher.handle(Inbound::Message(message), Instant::now());
        self.show_response(response);
    }

    fn toggle_enabled(&mut self) {
        let enabled = !self.dispatcher.session().is_enabled();
        self.send(UiMessage::Set(SettingsUpdate {
            enabled: Some(enabled),
            ..SettingsUpdate::default()
        }));
    }

    fn cycle_collection(&mut self) {
        let names = self.dispatcher.vars().collection_names();
        if names.is_empty() {
            self.status = "No collections to choose from".to_string();
            return;
        }
        let current = &self.dispatcher.session().settings().collection_name;
        let next = names
            .iter()
            .position(|name| name == current)
            .map(|i| (i + 1) % names.len())
            .unwrap_or(0);
        self.send(UiMessage::Set(SettingsUpdate {
            collection_name: Some(names[next].clone()),
            ..SettingsUpdate::default()
        }));
    }

    fn write_document(&mut self) {
        let file = DocumentFile::from_document(self.dispatcher.host());
        let result = file
            .to_json()
            .map_err(anyhow::Error::from)
            .and_then(|json| Ok(std::fs::write(&self.document_path, json)?));
        self.status = match result {
            Ok(()) => format!("Wrote {}", self.document_path.display()),
            Err(e) => {
                log::error!("Failed to write {}: {e}", self.document_path.display());
                format!("Write failed: {e}")
            }
        };
    }

    fn tick(&mut self) {
        if let Some(transition) = self.dispatcher.tick(Instant::now()) {
            self.status = describe_transition(&transition);
        }
    }

    fn show_response(&mut self, response: Option<Response>) {
        if let Some(response) = response {
            self.status = serde_json::to_string(&response)
                .unwrap_or_else(|e| format!("Unprintable response: {e}"));
        }
    }

    fn selected_id(&self) -> Option<&ElementId> {
        self.list_state
            .selected()
            .and_then(|i| self.text_ids.get(i))
    }

    fn render_element(&self) -> Vec<Line<'static>> {
        let Some(id) = self.selected_id() else {
            return vec![Line::from("Select a text element")];
        };
        let doc = self.dispatcher.host();
        let text = match doc.text(id) {
            Ok(text) => text,
            Err(e) => return vec![Line::from(format!("Error: {e}"))],
        };

        let mut lines = vec![
            Line::from(Span::styled(
                doc.name(id).unwrap_or_default().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(format!("id {id}")),
            Line::from(String::new()),
            Line::from(text.clone()),
            Line::from(String::new()),
        ];

        for run in doc.styled_runs(id).unwrap_or_default() {
            lines.push(Line::from(format!(
                "{:>4}..{:<4} {:<28} {:?}",
                run.range.start,
                run.range.end,
                run.font.to_string(),
                text.get(run.range.clone()).unwrap_or("<invalid range>")
            )));
        }

        lines.push(Line::from(String::new()));
        let backup = if has_backup(doc, id) {
            "backup: stored (showing values)"
        } else {
            "backup: none"
        };
        lines.push(Line::from(backup));
        lines
    }
}

fn describe_transition(transition: &Transition) -> String {
    match transition {
        Transition::Disabled => "Disabled: selection ignored".to_string(),
        Transition::Busy => "Busy: selection dropped".to_string(),
        Transition::Handled {
            substituted,
            restored,
        } => {
            let mut parts = Vec::new();
            if let Some(id) = substituted {
                parts.push(format!("substituted {id}"));
            }
            if let Some(id) = restored {
                parts.push(format!("restored {id}"));
            }
            if parts.is_empty() {
                "Selection settled, nothing to do".to_string()
            } else {
                parts.join(", ")
            }
        }
    }
}

/// Logs go to a file so they do not draw over the alternate screen.
fn init_logging() -> Result<PathBuf> {
    let log_path = env::temp_dir().join("textvars-cli.log");
    let file = File::create(&log_path)
        .with_context(|| format!("creating log file {}", log_path.display()))?;
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(log_path)
}

fn main() -> Result<()> {
    let log_path = init_logging()?;
    log::info!("textvars-cli starting up");

    // Determine document path from CLI args or config file
    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();
    log::info!("Config path: {}", config_path.display());

    let stored = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!("Usage: {} [document.json] [variables.json]", args[0]);
            process::exit(1);
        }
    };

    let (config, variables_path) = match args.len() {
        1 => match stored {
            Some(config) => {
                let variables_path = config.variables_path();
                (config, variables_path)
            }
            None => {
                eprintln!("Error: No document provided and no config file found");
                eprintln!("Usage: {} <document.json> [variables.json]", args[0]);
                eprintln!("Or create a config file at {}", config_path.display());
                process::exit(1);
            }
        },
        2 | 3 => {
            let document_path = PathBuf::from(&args[1]);
            let variables_path = args
                .get(2)
                .map(PathBuf::from)
                .unwrap_or_else(|| Config::sibling_variables_path(&document_path));
            let config = match stored {
                Some(stored) => Config {
                    document_path,
                    variables_path: None,
                    ..stored
                },
                None => Config::new(document_path),
            };
            (config, variables_path)
        }
        _ => {
            eprintln!("Usage: {} [document.json] [variables.json]", args[0]);
            process::exit(1);
        }
    };

    let mut app = match App::new(&config, &variables_path) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }
    println!("Log written to {}", log_path.display());

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        // Wake up in time to act on a settling selection
        let timeout = app
            .dispatcher
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .unwrap_or(IDLE_POLL);

        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('q') => app.send(UiMessage::Close),
                KeyCode::Down | KeyCode::Char('j') => app.next_element(),
                KeyCode::Up | KeyCode::Char('k') => app.previous_element(),
                KeyCode::Esc => app.select(None),
                KeyCode::Char('r') => app.send(UiMessage::RunOnSelection),
                KeyCode::Char('u') => app.send(UiMessage::RestoreOnSelection),
                KeyCode::Char('e') => app.toggle_enabled(),
                KeyCode::Char('c') => app.cycle_collection(),
                KeyCode::Char('w') => app.write_document(),
                _ => {}
            }
        }

        app.tick();
        if app.dispatcher.is_closed() {
            return Ok(());
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(f.area());
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)].as_ref())
        .split(rows[0]);

    // Element list panel
    let doc = app.dispatcher.host();
    let last_focused = app.dispatcher.session().last_focused();
    let items: Vec<ListItem> = app
        .text_ids
        .iter()
        .map(|id| {
            let marker = if Some(id) == last_focused { "✎ " } else { "  " };
            let name = doc.name(id).unwrap_or_default();
            ListItem::new(vec![Line::from(vec![Span::raw(format!("{marker}{name}"))])])
        })
        .collect();

    let session = app.dispatcher.session();
    let title = format!(
        "Text [{}] {}",
        session.settings().collection_name,
        if session.is_enabled() { "on" } else { "off" }
    );
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));

    let content = Paragraph::new(app.render_element())
        .block(Block::default().borders(Borders::ALL).title("Element"))
        .wrap(Wrap { trim: false });

    f.render_stateful_widget(list, columns[0], &mut app.list_state);
    f.render_widget(content, columns[1]);

    // Status and instructions
    let status = vec![
        Line::from(vec![Span::styled(
            app.status.clone(),
            Style::default().fg(Color::Cyan),
        )]),
        Line::from(vec![
            Span::raw("q: Quit | ↑/↓: Select | Esc: Clear | "),
            Span::raw("r: Run | u: Restore | e: Toggle | c: Collection | w: Write"),
        ]),
    ];
    f.render_widget(Paragraph::new(status).block(Block::default()), rows[1]);
}
