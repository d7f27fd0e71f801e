use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Running-action panel: current status plus a short timestamped log.
pub struct ActivityLog {
    pub message: String,
    pub logs: Vec<String>,
    pub max_logs: usize,
    ticks: usize,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self {
            message: String::new(),
            logs: Vec::new(),
            max_logs: 10,
            ticks: 0,
        }
    }

    pub fn set_message(&mut self, message: String) {
        self.message = message;
    }

    pub fn add_log(&mut self, log: String) {
        let timestamp = chrono::Local::now().format("%H:%M:%S");
        let log_entry = format!("[{timestamp}] {log}");

        self.logs.push(log_entry);

        if self.logs.len() > self.max_logs {
            self.logs.remove(0);
        }
    }

    pub fn tick(&mut self) {
        self.ticks = self.ticks.wrapping_add(1);
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1)])
            .split(area);

        let spinner = SPINNER[self.ticks % SPINNER.len()];
        let status = Paragraph::new(format!("{spinner} {}", self.message))
            .style(Style::default().fg(Color::Yellow));
        f.render_widget(status, chunks[0]);

        let log_lines: Vec<Line> = self
            .logs
            .iter()
            .map(|log| Line::from(Span::raw(log.as_str())))
            .collect();

        let logs_paragraph =
            Paragraph::new(log_lines).block(Block::default().borders(Borders::ALL).title("Log"));
        f.render_widget(logs_paragraph, chunks[1]);
    }

    pub fn reset(&mut self) {
        self.message.clear();
        self.logs.clear();
        self.ticks = 0;
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::ActivityLog;

    #[test]
    fn keeps_only_recent_logs() {
        let mut log = ActivityLog::new();
        for i in 0..15 {
            log.add_log(format!("step {i}"));
        }
        assert_eq!(log.logs.len(), 10);
        assert!(log.logs[0].ends_with("step 5"));
    }
}
