use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use mdspan_config::Config;
use mdspan_engine::parsing::text::WithPosition;
use mdspan_engine::plugins::{GITHUB_AUTOLINKS_PLUGIN_ID, YamlBlockPlugin};
use mdspan_engine::{Document, HtmlOptions, Parser, ParserOptions, PosCache, snapshot, to_html};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};
use std::{
    env,
    io::{Stdout, stdout},
    path::PathBuf,
    process,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Html,
    Ast,
    Inspect,
}

struct Args {
    file: PathBuf,
    mode: Mode,
    recursive: bool,
}

fn parse_args(args: &[String]) -> Option<Args> {
    let mut file = None;
    let mut mode = Mode::Html;
    let mut recursive = false;

    for arg in &args[1..] {
        match arg.as_str() {
            "--html" => mode = Mode::Html,
            "--ast" => mode = Mode::Ast,
            "--inspect" => mode = Mode::Inspect,
            "--recursive" => recursive = true,
            a if a.starts_with("--") => return None,
            a if file.is_none() => file = Some(PathBuf::from(a)),
            _ => return None,
        }
    }

    Some(Args {
        file: file?,
        mode,
        recursive,
    })
}

fn build_parser(config: &Config) -> Parser {
    let settings = &config.parser;
    let mut parser = Parser::with_options(ParserOptions {
        max_nesting_depth: settings.max_nesting_depth,
        extensions: settings.extensions.clone(),
    });
    if !settings.github_autolinks {
        parser.remove_text_plugin(GITHUB_AUTOLINKS_PLUGIN_ID);
    }
    if settings.yaml_front_matter {
        parser.add_block_plugin(Box::new(YamlBlockPlugin::new()));
    }
    parser
}

fn html_options(config: &Config) -> HtmlOptions {
    HtmlOptions {
        wrap_in_body: config.html.wrap_in_body,
        wrap_in_article: config.html.wrap_in_article,
        back_ref_image: config.html.back_ref_image.clone(),
        ..Default::default()
    }
}

struct App {
    source: Vec<String>,
    doc: Document,
    cache: PosCache,
    line: usize,
    column: usize,
}

impl App {
    fn new(source: &str, doc: Document) -> Self {
        let mut cache = PosCache::new();
        cache.initialize(&doc);

        Self {
            source: source.lines().map(str::to_string).collect(),
            doc,
            cache,
            line: 0,
            column: 0,
        }
    }

    fn line_width(&self) -> usize {
        self.source.get(self.line).map_or(0, |l| l.chars().count())
    }

    fn move_vertically(&mut self, down: bool) {
        if down && self.line + 1 < self.source.len() {
            self.line += 1;
        } else if !down && self.line > 0 {
            self.line -= 1;
        }
        self.column = self.column.min(self.line_width().saturating_sub(1));
    }

    fn move_horizontally(&mut self, right: bool) {
        if right && self.column + 1 < self.line_width() {
            self.column += 1;
        } else if !right && self.column > 0 {
            self.column -= 1;
        }
    }

    /// Nodes under the cursor, outermost first.
    fn chain(&self) -> Vec<String> {
        let at = WithPosition::point(self.column as i64, self.line as i64);
        self.cache
            .find_first_in_cache(&at)
            .into_iter()
            .enumerate()
            .map(|(depth, id)| {
                let pos = self.doc.pos(id);
                format!(
                    "{}{:?} {}:{}-{}:{}",
                    "  ".repeat(depth),
                    self.doc.item_type(id),
                    pos.start_line,
                    pos.start_column,
                    pos.end_line,
                    pos.end_column
                )
            })
            .collect()
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    let Some(args_parsed) = parse_args(&args) else {
        eprintln!(
            "Usage: {} <file> [--html|--ast|--inspect] [--recursive]",
            args[0]
        );
        process::exit(1);
    };

    let config_path = Config::config_path();
    log::debug!("Config path: {}", config_path.display());
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    let mut parser = build_parser(&config);
    let doc = parser
        .parse_file_with(&args_parsed.file, args_parsed.recursive, |p| {
            !config.is_excluded(p)
        })
        .with_context(|| format!("Failed to parse {}", args_parsed.file.display()))?;

    match args_parsed.mode {
        Mode::Html => print!("{}", to_html(&doc, &html_options(&config))),
        Mode::Ast => print!("{}", snapshot::normalize(&doc).outline()),
        Mode::Inspect => {
            let source = std::fs::read_to_string(&args_parsed.file)?;
            inspect(App::new(&source, doc))?;
        }
    }

    Ok(())
}

fn inspect(mut app: App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.move_vertically(true),
                KeyCode::Up | KeyCode::Char('k') => app.move_vertically(false),
                KeyCode::Right | KeyCode::Char('l') => app.move_horizontally(true),
                KeyCode::Left | KeyCode::Char('h') => app.move_horizontally(false),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(f.area());
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)].as_ref())
        .split(rows[0]);

    // Source panel, scrolled to keep the cursor line visible
    let height = chunks[0].height.saturating_sub(2) as usize;
    let first = app.line.saturating_sub(height.saturating_sub(1));
    let cursor = Style::default().bg(Color::Yellow).fg(Color::Black);
    let source: Vec<Line> = app
        .source
        .iter()
        .enumerate()
        .skip(first)
        .take(height)
        .map(|(n, text)| {
            if n != app.line {
                return Line::from(Span::raw(text.clone()));
            }
            let chars: Vec<char> = text.chars().collect();
            let at = app.column.min(chars.len());
            let before: String = chars[..at].iter().collect();
            let under: String = chars.get(at).map_or(" ".to_string(), |c| c.to_string());
            let after: String = chars.get(at + 1..).map_or(String::new(), |r| r.iter().collect());
            Line::from(vec![Span::raw(before), Span::styled(under, cursor), Span::raw(after)])
        })
        .collect();

    let title = format!("Source {}:{}", app.line, app.column);
    let source = Paragraph::new(source).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(source, chunks[0]);

    // Node chain panel
    let chain = app.chain();
    let items: Vec<ListItem> = if chain.is_empty() {
        vec![ListItem::new("No node at cursor")]
    } else {
        chain.into_iter().map(ListItem::new).collect()
    };
    let nodes = List::new(items).block(Block::default().borders(Borders::ALL).title("Nodes"));
    f.render_widget(nodes, chunks[1]);

    let help = Paragraph::new(Line::from(vec![
        Span::raw("q: Quit | "),
        Span::raw("←↓↑→ / hjkl: Move cursor"),
    ]));
    f.render_widget(help, rows[1]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("mdspan-cli")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_args_defaults_to_html() {
        let parsed = parse_args(&args(&["notes.md"])).unwrap();
        assert_eq!(parsed.file, PathBuf::from("notes.md"));
        assert_eq!(parsed.mode, Mode::Html);
        assert!(!parsed.recursive);
    }

    #[test]
    fn test_parse_args_flags() {
        let parsed = parse_args(&args(&["--recursive", "a.md", "--ast"])).unwrap();
        assert_eq!(parsed.mode, Mode::Ast);
        assert!(parsed.recursive);
    }

    #[test]
    fn test_parse_args_rejects_bad_input() {
        assert!(parse_args(&args(&[])).is_none());
        assert!(parse_args(&args(&["a.md", "b.md"])).is_none());
        assert!(parse_args(&args(&["a.md", "--bogus"])).is_none());
    }

    #[test]
    fn test_settings_drive_the_parser() {
        let mut config = Config::default();
        config.parser.github_autolinks = false;
        config.parser.yaml_front_matter = true;

        let doc = build_parser(&config)
            .parse("---\na: 1\n---\nwww.example.com")
            .unwrap();
        let html = to_html(&doc, &html_options(&config));
        assert_eq!(html, "<p dir=\"auto\">www.example.com</p>");
    }

    #[test]
    fn test_app_cursor_stays_on_text() {
        let doc = Parser::new().parse("ab\nc").unwrap();
        let mut app = App::new("ab\nc", doc);
        app.move_horizontally(true);
        app.move_horizontally(true);
        assert_eq!(app.column, 1);
        app.move_vertically(true);
        assert_eq!((app.line, app.column), (1, 0));
        assert_eq!(app.chain(), vec!["Paragraph 0:0-1:0", "  Text 1:0-1:0"]);
    }
}
