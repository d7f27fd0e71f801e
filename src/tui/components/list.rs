use crate::core::Section;
use crossterm::event::{KeyCode, KeyEvent, MouseEvent, MouseEventKind};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};

pub struct SectionList {
    pub items: Vec<Section>,
    pub state: ListState,
    pub focused: bool,
    viewport_size: usize,
}

impl SectionList {
    pub fn new(items: Vec<Section>) -> Self {
        let mut state = ListState::default();
        if !items.is_empty() {
            state.select(Some(0));
        }

        Self {
            items,
            state,
            focused: false,
            viewport_size: 0,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Up => {
                self.previous();
                true
            }
            KeyCode::Down => {
                self.next();
                true
            }
            KeyCode::Home => {
                self.go_home();
                true
            }
            KeyCode::End => {
                self.go_end();
                true
            }
            _ => false,
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> bool {
        match mouse.kind {
            MouseEventKind::ScrollUp => {
                self.scroll_up();
                true
            }
            MouseEventKind::ScrollDown => {
                self.scroll_down();
                true
            }
            _ => false,
        }
    }

    pub fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }

        let i = match self.state.selected() {
            Some(i) => (i + 1) % self.items.len(),
            None => 0,
        };
        self.state.select(Some(i));
        self.adjust_offset();
    }

    pub fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }

        let i = match self.state.selected() {
            Some(0) | None => self.items.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
        self.adjust_offset();
    }

    fn go_home(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.state.select(Some(0));
        self.adjust_offset();
    }

    fn go_end(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.state.select(Some(self.items.len() - 1));
        self.adjust_offset();
    }

    fn scroll_up(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let current = self.state.selected().unwrap_or(0);
        self.state.select(Some(current.saturating_sub(1)));
        self.adjust_offset();
    }

    fn scroll_down(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let current = self.state.selected().unwrap_or(0);
        let new_index = (current + 1).min(self.items.len() - 1);
        self.state.select(Some(new_index));
        self.adjust_offset();
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.state.selected().filter(|i| *i < self.items.len())
    }

    pub fn get_selected(&self) -> Option<&Section> {
        self.selected_index().and_then(|i| self.items.get(i))
    }

    pub fn get_selected_mut(&mut self) -> Option<&mut Section> {
        self.selected_index().and_then(|i| self.items.get_mut(i))
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, title: &str) {
        // Each section takes two rows: heading and wrapped first line of text.
        self.viewport_size = (area.height.saturating_sub(2) as usize / 2).max(1);
        self.adjust_offset();

        let text_width = area.width.saturating_sub(6).max(10) as usize;
        let items: Vec<ListItem> = self
            .items
            .iter()
            .map(|section| {
                let marker = match section.latest_refinement() {
                    Some(r) => format!("  [{}]", r.style.label()),
                    None => String::new(),
                };
                let first_line = textwrap::wrap(&section.text, text_width)
                    .into_iter()
                    .next()
                    .map(|l| l.into_owned())
                    .unwrap_or_default();

                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(
                            section.timestamp.clone(),
                            Style::default()
                                .fg(Color::Cyan)
                                .add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(marker, Style::default().fg(Color::Green)),
                    ]),
                    Line::from(Span::raw(format!("  {first_line}"))),
                ])
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(if self.focused {
                        Style::default().fg(Color::Yellow)
                    } else {
                        Style::default().fg(Color::Gray)
                    }),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            );

        f.render_stateful_widget(list, area, &mut self.state);
    }

    pub fn update_items(&mut self, new_items: Vec<Section>) {
        self.items = new_items;
        if self.items.is_empty() {
            self.state.select(None);
        } else {
            self.state.select(Some(0));
        }
        *self.state.offset_mut() = 0;
        self.adjust_offset();
    }

    fn adjust_offset(&mut self) {
        if self.items.is_empty() {
            *self.state.offset_mut() = 0;
            return;
        }

        let viewport = self.viewport_size.max(1);
        let max_index = self.items.len() - 1;
        let selected = self
            .state
            .selected()
            .map(|idx| idx.min(max_index))
            .unwrap_or(0);
        self.state.select(Some(selected));

        let max_offset = self.items.len().saturating_sub(viewport);
        let offset = self.state.offset().min(max_offset);
        *self.state.offset_mut() = offset;

        if selected < offset {
            *self.state.offset_mut() = selected;
        } else if selected >= offset + viewport {
            *self.state.offset_mut() = selected + 1 - viewport;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Transcript, format_sections};
    use crossterm::event::KeyModifiers;
    use std::sync::Arc;

    fn sections(n: usize) -> Vec<Section> {
        let summary: String = (0..n).map(|i| format!("00:00:{i:02} part {i}\n")).collect();
        let transcript = Arc::new(Transcript {
            video_id: "ABC".into(),
            language_code: "en".into(),
            lines: Vec::new(),
        });
        format_sections(&summary, "https://x/watch?v=ABC", transcript).sections
    }

    #[test]
    fn wraps_selection_with_arrows() {
        let mut list = SectionList::new(sections(3));
        list.handle_key(KeyEvent::new(KeyCode::Up, KeyModifiers::NONE));
        assert_eq!(list.selected_index(), Some(2));
        list.handle_key(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE));
        assert_eq!(list.selected_index(), Some(0));
    }

    #[test]
    fn empty_list_has_no_selection() {
        let mut list = SectionList::new(sections(2));
        list.update_items(Vec::new());
        assert!(list.get_selected().is_none());
        list.next();
        assert!(list.get_selected().is_none());
    }
}
