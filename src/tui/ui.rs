use crate::core::{Completer, TranscriptSource};
use crate::tui::app::{App, DetailPane, Focus};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

pub fn draw<S, C>(f: &mut Frame, app: &mut App<S, C>)
where
    S: TranscriptSource + Send + Sync + 'static,
    C: Completer + Send + Sync + 'static,
{
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(38), Constraint::Min(1)])
        .split(f.area());

    draw_sidebar(f, app, chunks[0]);
    draw_main(f, app, chunks[1]);
}

fn draw_sidebar<S, C>(f: &mut Frame, app: &App<S, C>, area: Rect)
where
    S: TranscriptSource + Send + Sync + 'static,
    C: Completer + Send + Sync + 'static,
{
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(3), // URL input
            Constraint::Length(3), // Language
            Constraint::Length(3), // Generate Summary
            Constraint::Length(3), // Generate Detailed Summary
            Constraint::Min(1),    // Help
        ])
        .split(area);

    let title = Paragraph::new("YouTube Summarizer")
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    app.url_input.render(f, chunks[1]);
    app.language.render(f, chunks[2]);
    draw_button(f, chunks[3], "Generate Summary", app.focus == Focus::Generate, app.busy);
    draw_button(
        f,
        chunks[4],
        "Generate Detailed Summary",
        app.focus == Focus::GenerateDetailed,
        app.busy,
    );

    let help = Paragraph::new(vec![
        Line::from("[Tab] Next  [Enter] Run"),
        Line::from("[←→] Language"),
        Line::from(""),
        Line::from("Sections:"),
        Line::from("[↑↓] Select  [e] Edit"),
        Line::from("[t] Transcript  [p] Prompt"),
        Line::from("[o] LLM Output"),
        Line::from("[d] Detail  [c] Concise  [f] Fun"),
        Line::from("[s] Download HTML"),
        Line::from("[PgUp/PgDn] Scroll  [q] Exit"),
    ])
    .style(Style::default().fg(Color::Gray))
    .block(Block::default().borders(Borders::ALL).title("Keys"));
    f.render_widget(help, chunks[5]);
}

fn draw_button(f: &mut Frame, area: Rect, label: &str, focused: bool, busy: bool) {
    let style = if busy {
        Style::default().fg(Color::DarkGray)
    } else if focused {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    let button = Paragraph::new(label)
        .style(style)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        }));
    f.render_widget(button, area);
}

fn draw_main<S, C>(f: &mut Frame, app: &mut App<S, C>, area: Rect)
where
    S: TranscriptSource + Send + Sync + 'static,
    C: Completer + Send + Sync + 'static,
{
    let editor_height = if app.editor.is_some() { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),             // Title + URL
            Constraint::Length(1),             // Status
            Constraint::Min(1),                // Body
            Constraint::Length(editor_height), // Editor
        ])
        .split(area);

    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            app.title.clone().unwrap_or_else(|| "No summary yet".to_string()),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("Video URL: {}", app.session.video_url)),
    ])
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    if let Some(status) = &app.status {
        let style = if status.is_error {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Green)
        };
        f.render_widget(Paragraph::new(status.text.as_str()).style(style), chunks[1]);
    }

    if app.busy {
        app.activity.render(f, chunks[2]);
    } else if app.sections.items.is_empty() && app.pane == DetailPane::Output {
        app.detail_height = chunks[2].height;
        app.detail.render(f, chunks[2]);
    } else if app.sections.items.is_empty() {
        let placeholder = Paragraph::new("Enter a YouTube URL and press [Enter] to generate a summary.")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(placeholder, chunks[2]);
    } else {
        let body = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(chunks[2]);

        app.sections.render(f, body[0], "Sections");
        app.detail_height = body[1].height;
        app.detail.render(f, body[1]);
    }

    if let Some(editor) = &app.editor {
        editor.render(f, chunks[3]);
    }
}

#[cfg(test)]
mod tests {
    use super::draw;
    use crate::core::summary::mock::MockCompleter;
    use crate::core::transcript::mock::MockTranscriptSource;
    use crate::core::{Pipeline, Session};
    use crate::tui::App;
    use ratatui::{Terminal, backend::TestBackend};

    #[tokio::test]
    async fn renders_sidebar_controls() {
        let mut app = App::new(
            Pipeline::new(MockTranscriptSource::default(), MockCompleter::new("")),
            Session::default(),
            std::env::temp_dir(),
        );
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).expect("terminal");
        terminal.draw(|f| draw(f, &mut app)).expect("draw");

        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("Generate Summary"));
        assert!(screen.contains("Generate Detailed Summary"));
        assert!(screen.contains("zh-TW"));
    }
}
