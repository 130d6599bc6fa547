use gridworld_core::{
    Direction, Symbol,
    config::GridConfig,
    environment::{Environment, EpisodeStatus, GridWorld, MoveOutcome},
    solver,
};
use anyhow::Result;
use clap::Parser;
use ratatui::{
    crossterm::{
        event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
    widgets::*,
};
use std::{
    fs::File,
    io::{self, BufRead, Stdout, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Board width
    #[arg(long, default_value_t = 4)]
    width: usize,

    /// Board height
    #[arg(long, default_value_t = 4)]
    height: usize,

    /// Square board size, overrides width and height
    #[arg(short, long)]
    size: Option<usize>,

    /// Seed for reproducible boards
    #[arg(long)]
    seed: Option<u64>,

    /// Read u/d/l/r lines from stdin instead of drawing a full-screen UI
    #[arg(long)]
    plain: bool,

    /// Write logs to this file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn grid_config(&self) -> GridConfig {
        let (width, height) = match self.size {
            Some(size) => (size, size),
            None => (self.width, self.height),
        };
        GridConfig {
            width,
            height,
            seed: self.seed,
        }
    }
}

struct App {
    /// The environment being played.
    environment: GridWorld,
    /// Flag to control the main loop.
    should_quit: bool,
    /// Reward of the most recent step.
    last_reward: Option<i32>,
    /// Status line shown under the board.
    message: String,
    show_hint: bool,
}

impl App {
    fn new(config: &GridConfig) -> Result<Self> {
        let mut environment = GridWorld::from_config(config)?;
        environment.reset(None);
        Ok(App {
            environment,
            should_quit: false,
            last_reward: None,
            message: "New episode".to_string(),
            show_hint: false,
        })
    }

    fn step(&mut self, direction: Direction) {
        match self.environment.step(direction) {
            Ok(step) => {
                self.last_reward = Some(step.reward);
                self.message = match self.environment.last_outcome() {
                    Some(MoveOutcome::ReachedGoal) => "Goal reached! Press 'r' for a new board".into(),
                    Some(MoveOutcome::FellInPit) => "Fell into the pit. Press 'r' for a new board".into(),
                    Some(MoveOutcome::Blocked) => "Bumped into something".into(),
                    Some(MoveOutcome::Moved) | None => String::new(),
                };
            }
            Err(err) => self.message = err.to_string(),
        }
    }

    fn reset(&mut self) {
        self.environment.reset(None);
        self.last_reward = None;
        self.message = "New episode".to_string();
    }

    fn hint(&self) -> String {
        let route = self.environment.board().and_then(solver::shortest_route);
        match route {
            Some(route) => route.iter().map(|d| d.token().to_string()).collect::<Vec<_>>().join(" "),
            None => "no route".to_string(),
        }
    }

    fn quit(&mut self) {
        self.should_quit = true;
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path, args.verbose)?;
    }

    let config = args.grid_config();
    config.validate()?;
    let mut app = App::new(&config)?;

    if args.plain {
        return run_plain(&mut app);
    }

    // Set up the terminal
    let mut terminal = setup_terminal()?;

    // Run the main application loop
    let result = run_app(&mut terminal, &mut app);

    // Restore the terminal state
    restore_terminal(&mut terminal)?;

    result
}

/// Sends `tracing` output to a file; stdout belongs to the UI.
fn init_logging(path: &Path, verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .init();
    Ok(())
}

/// Line-oriented loop: one direction token per line, `n` for a new board,
/// `q` to quit.
fn run_plain(app: &mut App) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    print_plain(&mut stdout, app)?;

    for line in stdin.lock().lines() {
        let line = line?;
        match line.trim() {
            "" => continue,
            "q" => break,
            "n" => app.reset(),
            token => match token.parse::<Direction>() {
                Ok(direction) => app.step(direction),
                Err(err) => app.message = err.to_string(),
            },
        }
        print_plain(&mut stdout, app)?;
        if app.environment.status() == EpisodeStatus::Terminated {
            writeln!(stdout, "episode over, 'n' for a new board or 'q' to quit")?;
        }
    }
    Ok(())
}

fn print_plain(out: &mut impl Write, app: &App) -> io::Result<()> {
    if let Some(board) = app.environment.board() {
        writeln!(out, "{board}")?;
    }
    match app.last_reward {
        Some(reward) => {
            write!(
                out,
                "reward {reward:+} return {:+}",
                app.environment.episode_return()
            )?;
            if !app.message.is_empty() {
                write!(out, " {}", app.message)?;
            }
            writeln!(out)
        }
        None => writeln!(out, "{}", app.message),
    }
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into)
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Runs the main loop of the TUI application.
fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        // Moves only happen on key presses, so block until the next event.
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => app.quit(),
                KeyCode::Char('r') => app.reset(),
                KeyCode::Char('?') => app.show_hint = !app.show_hint,
                code => {
                    if let Some(direction) = key_direction(code) {
                        app.step(direction);
                    }
                }
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

fn key_direction(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up | KeyCode::Char('k') => Some(Direction::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(Direction::Down),
        KeyCode::Left | KeyCode::Char('h') => Some(Direction::Left),
        KeyCode::Right | KeyCode::Char('l') => Some(Direction::Right),
        _ => None,
    }
}

/// Renders the user interface.
fn ui(frame: &mut Frame, app: &App) {
    let main_layout = Layout::vertical([
        Constraint::Percentage(70), // Area for the board
        Constraint::Percentage(20), // Area for episode status
        Constraint::Percentage(10), // Area for help
    ])
    .split(frame.area());

    render_board(frame, main_layout[0], &app.environment);
    render_status(frame, main_layout[1], app);

    let help_text = Paragraph::new(
        "Arrows/hjkl to move, 'r' new board, '?' toggle hint, 'q' or 'Esc' to quit.",
    )
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help_text, main_layout[2]);
}

/// Renders the episode status panel.
fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let environment = &app.environment;
    let state = match environment.status() {
        EpisodeStatus::NotStarted => "not started",
        EpisodeStatus::Active => "active",
        EpisodeStatus::Terminated => "terminated",
    };
    let reward = app
        .last_reward
        .map(|r| format!("{r:+}"))
        .unwrap_or_else(|| "-".to_string());

    let mut items = vec![
        ListItem::from(Line::from(format!(
            "Episode: {}  Steps: {}  Last reward: {}  Return: {:+}",
            state,
            environment.steps(),
            reward,
            environment.episode_return()
        ))),
        ListItem::from(Line::from(app.message.clone())),
    ];
    if app.show_hint {
        items.push(ListItem::from(Line::from(format!("Hint: {}", app.hint()))));
    }

    let status_widget =
        List::new(items).block(Block::default().borders(Borders::ALL).title("Status"));
    frame.render_widget(status_widget, area);
}

/// Renders the board onto the frame.
fn render_board(frame: &mut Frame, area: Rect, environment: &GridWorld) {
    let grid = match environment.render() {
        Ok(grid) => grid,
        Err(err) => {
            frame.render_widget(Paragraph::new(err.to_string()), area);
            return;
        }
    };

    let lines: Vec<Line> = grid
        .rows()
        .map(|row| {
            let spans: Vec<Span> = row
                .iter()
                .map(|symbol| Span::styled(format!("{symbol} "), symbol_style(*symbol)))
                .collect();
            Line::from(spans)
        })
        .collect();

    let board_paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(format!(
                    "Grid World {}x{}",
                    environment.width(),
                    environment.height()
                ))
                .borders(Borders::ALL),
        )
        .alignment(Alignment::Center);

    frame.render_widget(board_paragraph, area);
}

fn symbol_style(symbol: Symbol) -> Style {
    match symbol {
        Symbol::Empty => Style::default().fg(Color::DarkGray),
        Symbol::Goal => Style::default().fg(Color::Green).bold(),
        Symbol::Overlap => Style::default().fg(Color::Magenta).bold(),
        Symbol::Pit => Style::default().fg(Color::Red),
        Symbol::Player => Style::default().fg(Color::Yellow).bold(),
        Symbol::Wall => Style::default().fg(Color::Gray),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridworld_core::{Position, board::Board};

    #[test]
    fn test_size_overrides_width_and_height() {
        let args = Args::parse_from(["gridworld_tui", "--width", "6", "--size", "3", "--seed", "9"]);
        assert_eq!(args.grid_config(), GridConfig::square(3).with_seed(9));

        let args = Args::parse_from(["gridworld_tui", "--width", "6", "--height", "2"]);
        assert_eq!(args.grid_config(), GridConfig::new(6, 2));
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(key_direction(KeyCode::Left), Some(Direction::Left));
        assert_eq!(key_direction(KeyCode::Char('k')), Some(Direction::Up));
        assert_eq!(key_direction(KeyCode::Char('j')), Some(Direction::Down));
        assert_eq!(key_direction(KeyCode::Char('l')), Some(Direction::Right));
        assert_eq!(key_direction(KeyCode::Char('x')), None);
        // 'd' means Down in plain mode, so it is not bound to Right here.
        assert_eq!(key_direction(KeyCode::Char('d')), None);
    }

    #[test]
    fn test_plain_output_shows_board_and_reward() {
        let mut app = App::new(&GridConfig::square(3).with_seed(5)).unwrap();
        let board = app.environment.board().unwrap().to_string();

        let mut out = Vec::new();
        print_plain(&mut out, &app).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), format!("{board}\nNew episode\n"));

        // P..
        // ..-
        // .W+
        let board = Board::new(
            3,
            3,
            Position::new(0, 0),
            Position::new(2, 2),
            Position::new(2, 1),
            Position::new(1, 2),
        )
        .unwrap();
        app.environment.load_board(board).unwrap();

        app.step(Direction::Right);
        let mut out = Vec::new();
        print_plain(&mut out, &app).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            ".P.\n..-\n.W+\nreward -1 return -1\n"
        );

        app.step(Direction::Up);
        let mut out = Vec::new();
        print_plain(&mut out, &app).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            ".P.\n..-\n.W+\nreward -1 return -2 Bumped into something\n"
        );
    }
}
