use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// Scrollable read-only text pane for transcripts, prompts and model output.
pub struct Viewer {
    pub content: String,
    pub scroll: usize,
    pub title: String,
    wrapped_len: usize,
}

impl Viewer {
    pub fn new(content: String, title: String) -> Self {
        Self {
            content,
            scroll: 0,
            title,
            wrapped_len: 0,
        }
    }

    pub fn set_content(&mut self, content: String, title: String) {
        self.content = content;
        self.title = title;
        self.scroll = 0;
    }

    pub fn handle_key(&mut self, key: KeyEvent, area_height: u16) -> bool {
        let page_size = (area_height as usize).saturating_sub(2).max(1);
        let max_scroll = self.wrapped_len.saturating_sub(page_size);
        match key.code {
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(page_size);
                true
            }
            KeyCode::PageDown => {
                self.scroll = (self.scroll + page_size).min(max_scroll);
                true
            }
            KeyCode::Char('[') => {
                self.scroll = self.scroll.saturating_sub(1);
                true
            }
            KeyCode::Char(']') => {
                self.scroll = (self.scroll + 1).min(max_scroll);
                true
            }
            _ => false,
        }
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        let width = area.width.saturating_sub(2).max(1) as usize;
        let visible = area.height.saturating_sub(2) as usize;

        let wrapped: Vec<String> = self
            .content
            .lines()
            .flat_map(|line| {
                if line.is_empty() {
                    vec![String::new()]
                } else {
                    textwrap::wrap(line, width)
                        .into_iter()
                        .map(|l| l.into_owned())
                        .collect()
                }
            })
            .collect();
        self.wrapped_len = wrapped.len();
        self.scroll = self.scroll.min(wrapped.len().saturating_sub(visible));

        let lines: Vec<Line> = wrapped
            .iter()
            .skip(self.scroll)
            .take(visible)
            .map(|line| {
                if line.starts_with('(') && line.get(9..10) == Some(")") {
                    // Transcript rows: highlight the timestamp.
                    let (ts, rest) = line.split_at(10);
                    Line::from(vec![
                        Span::styled(ts.to_string(), Style::default().fg(Color::Cyan)),
                        Span::raw(rest.to_string()),
                    ])
                } else if line.starts_with('#') {
                    Line::from(Span::styled(line.clone(), Style::default().fg(Color::Yellow)))
                } else if line.starts_with("• ") {
                    Line::from(Span::styled(line.clone(), Style::default().fg(Color::Green)))
                } else {
                    Line::from(Span::raw(line.clone()))
                }
            })
            .collect();

        let scroll_info = if wrapped.len() > visible {
            format!(
                " ({}-{} of {})",
                self.scroll + 1,
                (self.scroll + visible).min(wrapped.len()),
                wrapped.len()
            )
        } else {
            String::new()
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("{}{scroll_info}", self.title));

        f.render_widget(Paragraph::new(lines).block(block), area);
    }
}
