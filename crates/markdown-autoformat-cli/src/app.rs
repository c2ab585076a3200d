use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent as TermKeyEvent, KeyEventKind, KeyModifiers};
use markdown_autoformat_engine::render::{markdown_to_html, to_markdown};
use markdown_autoformat_engine::{Block as DocBlock, BlockKind, Marks, Point, Selection};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use std::io::Stdout;

use crate::keys::to_engine_event;
use crate::session::{Handled, Session};

/// Width of the block kind label in front of each editor line
const LABEL_WIDTH: usize = 4;

pub struct App {
    session: Session,
    status: String,
    should_quit: bool,
}

impl App {
    pub fn new(session: Session) -> Self {
        let status = match session.path() {
            Some(path) => format!("Editing {}", path.display()),
            None => "Unsaved document".to_string(),
        };
        Self {
            session,
            status,
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: TermKeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('q') if ctrl => self.should_quit = true,
            KeyCode::Char('s') if ctrl => self.save(),
            _ => {
                let Some(event) = to_engine_event(&key) else {
                    return;
                };
                match self.session.handle_key(&event) {
                    Ok(Handled::Autoformat) => self.status = "Autoformatted".to_string(),
                    Ok(_) => {}
                    Err(e) => {
                        log::warn!("Edit rejected: {e}");
                        self.status = format!("Edit rejected: {e}");
                    }
                }
            }
        }
    }

    fn save(&mut self) {
        self.status = match self.session.save() {
            Ok(Some(path)) => format!("Saved {}", path.display()),
            Ok(None) => "No file to save to; pass a path to `edit`".to_string(),
            Err(e) => {
                log::error!("Save failed: {e}");
                format!("Save failed: {e}")
            }
        };
    }
}

pub fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }
    }
    Ok(())
}

fn mark_style(marks: Marks) -> Style {
    let mut style = Style::default();
    if marks.bold {
        style = style.add_modifier(Modifier::BOLD);
    }
    if marks.italic {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if marks.strikethrough {
        style = style.add_modifier(Modifier::CROSSED_OUT);
    }
    style
}

fn block_label(kind: &BlockKind) -> String {
    let label = match kind {
        BlockKind::Paragraph => "¶".to_string(),
        BlockKind::Header { level } => format!("H{}", level.get()),
        BlockKind::Code => "</>".to_string(),
        BlockKind::Unsupported => "?".to_string(),
    };
    format!("{label:<LABEL_WIDTH$}")
}

/// Editor lines for one block: marks become terminal styles and the selected
/// chars are shown reversed.
fn block_lines(block: &DocBlock, index: usize, selection: &Selection) -> Vec<Line<'static>> {
    let (start, end) = selection.ordered();
    let selected = |offset: usize| {
        let point = Point::new(index, offset);
        start <= point && point < end
    };
    let label_style = match block.kind() {
        BlockKind::Header { .. } => Style::default().fg(Color::Yellow),
        BlockKind::Code => Style::default().fg(Color::Green),
        _ => Style::default().fg(Color::DarkGray),
    };

    let mut lines = Vec::new();
    let mut spans = vec![Span::styled(block_label(block.kind()), label_style)];
    let mut pending = String::new();
    let mut pending_style = Style::default();
    let mut offset = 0;

    for run in block.runs() {
        for c in run.text.chars() {
            let mut style = mark_style(run.marks);
            if selected(offset) {
                style = style.add_modifier(Modifier::REVERSED);
            }
            offset += 1;

            if c == '\n' {
                spans.push(Span::styled(std::mem::take(&mut pending), pending_style));
                lines.push(Line::from(std::mem::take(&mut spans)));
                spans.push(Span::raw(" ".repeat(LABEL_WIDTH)));
                continue;
            }
            if style != pending_style && !pending.is_empty() {
                spans.push(Span::styled(std::mem::take(&mut pending), pending_style));
            }
            pending_style = style;
            pending.push(c);
        }
    }
    spans.push(Span::styled(pending, pending_style));
    lines.push(Line::from(spans));
    lines
}

/// Terminal cell of the caret inside the editor pane, if it is visible
fn caret_position(app: &App, area: Rect) -> Option<(u16, u16)> {
    let doc = app.session.document();
    let focus = app.session.selection().focus;
    let rows_before: usize = doc.blocks()[..focus.block.min(doc.len())]
        .iter()
        .map(|block| block.text().matches('\n').count() + 1)
        .sum();

    let chars = doc.block(focus.block)?.chars();
    let before = &chars[..focus.offset.min(chars.len())];
    let row = rows_before + before.iter().filter(|&&c| c == '\n').count();
    let column = match before.iter().rposition(|&c| c == '\n') {
        Some(newline) => before.len() - newline - 1,
        None => before.len(),
    };

    let x = usize::from(area.x) + 1 + LABEL_WIDTH + column;
    let y = usize::from(area.y) + 1 + row;
    if x + 1 >= usize::from(area.right()) || y + 1 >= usize::from(area.bottom()) {
        return None;
    }
    Some((u16::try_from(x).ok()?, u16::try_from(y).ok()?))
}

fn ui(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(f.area());

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage(40),
                Constraint::Percentage(30),
                Constraint::Percentage(30),
            ]
            .as_ref(),
        )
        .split(rows[0]);

    // Editor pane
    let selection = app.session.selection();
    let editor_lines: Vec<Line> = app
        .session
        .document()
        .blocks()
        .iter()
        .enumerate()
        .flat_map(|(index, block)| block_lines(block, index, &selection))
        .collect();
    let dirty = if app.session.is_dirty() { " *" } else { "" };
    let editor = Paragraph::new(editor_lines)
        .block(Block::default().borders(Borders::ALL).title(format!("Editor{dirty}")));
    f.render_widget(editor, panes[0]);
    if let Some(position) = caret_position(app, panes[0]) {
        f.set_cursor_position(position);
    }

    // Markdown and HTML preview panes
    let markdown = to_markdown(app.session.document());
    let html = markdown_to_html(&markdown);

    let markdown_pane = Paragraph::new(markdown)
        .block(Block::default().borders(Borders::ALL).title("Markdown"))
        .wrap(Wrap { trim: false });
    f.render_widget(markdown_pane, panes[1]);

    let html_pane = Paragraph::new(html)
        .block(Block::default().borders(Borders::ALL).title("HTML"))
        .wrap(Wrap { trim: false });
    f.render_widget(html_pane, panes[2]);

    // Status line
    let status = Line::from(vec![
        Span::styled(app.status.clone(), Style::default().fg(Color::Cyan)),
        Span::raw(" | Ctrl+S: Save | Esc/Ctrl+Q: Quit | Shift+arrows: Select"),
    ]);
    f.render_widget(Paragraph::new(status), rows[1]);
}
