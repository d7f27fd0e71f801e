use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// Horizontal option picker, cycled with ←/→ or space.
#[derive(Debug, Clone)]
pub struct Selector {
    pub label: String,
    pub options: Vec<String>,
    pub selected: usize,
    pub focused: bool,
}

impl Selector {
    pub fn new(label: &str, options: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            selected: 0,
            focused: false,
        }
    }

    pub fn value(&self) -> &str {
        self.options
            .get(self.selected)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn select_value(&mut self, value: &str) -> bool {
        match self.options.iter().position(|o| o == value) {
            Some(i) => {
                self.selected = i;
                true
            }
            None => false,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.options.is_empty() {
            return false;
        }
        match key.code {
            KeyCode::Right | KeyCode::Char(' ') => {
                self.selected = (self.selected + 1) % self.options.len();
                true
            }
            KeyCode::Left => {
                self.selected = (self.selected + self.options.len() - 1) % self.options.len();
                true
            }
            _ => false,
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.label.as_str())
            .border_style(if self.focused {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::Gray)
            });

        let mut spans = Vec::new();
        for (i, option) in self.options.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw("  "));
            }
            if i == self.selected {
                spans.push(Span::styled(
                    format!("● {option}"),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ));
            } else {
                spans.push(Span::styled(
                    format!("○ {option}"),
                    Style::default().fg(Color::White),
                ));
            }
        }

        f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    #[test]
    fn cycles_both_directions() {
        let mut selector = Selector::new("Language", &["en", "zh-TW", "zh-CN"]);
        selector.handle_key(KeyEvent::new(KeyCode::Left, KeyModifiers::NONE));
        assert_eq!(selector.value(), "zh-CN");
        selector.handle_key(KeyEvent::new(KeyCode::Right, KeyModifiers::NONE));
        assert_eq!(selector.value(), "en");
    }

    #[test]
    fn selects_known_values_only() {
        let mut selector = Selector::new("Language", &["en", "zh-TW"]);
        assert!(selector.select_value("zh-TW"));
        assert!(!selector.select_value("fr"));
        assert_eq!(selector.value(), "zh-TW");
    }
}
