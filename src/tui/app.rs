use crate::core::{
    Completer, ExportArtifact, FormatWarning, LANGUAGES, Pipeline, Prompt, RefineStyle,
    Refinement, Session, SummaryMode, SummaryView, TranscriptSource, markdown_to_text,
};
use crate::error::Result;
use crate::tui::components::{ActivityLog, InputField, SectionList, Selector, Viewer};
use crate::tui::events::AppEvent;
use crossterm::event::{KeyCode, KeyEvent};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Url,
    Language,
    Generate,
    GenerateDetailed,
    Sections,
}

const FOCUS_ORDER: [Focus; 5] = [
    Focus::Url,
    Focus::Language,
    Focus::Generate,
    Focus::GenerateDetailed,
    Focus::Sections,
];

/// What the lower pane shows for the selected section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailPane {
    Section,
    Transcript,
    Prompt,
    Output,
}

/// Results sent back from spawned pipeline actions.
#[derive(Debug)]
pub enum WorkerMessage {
    Log(String),
    SummaryReady {
        session: Session,
        view: Box<SummaryView>,
    },
    Refined {
        index: usize,
        refinement: Refinement,
    },
    Exported(PathBuf),
    /// Export runs outside the one-action guard, so its failure leaves `busy` alone.
    ExportFailed(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub is_error: bool,
}

pub struct App<S, C> {
    pub should_quit: bool,
    pub focus: Focus,
    pub session: Session,

    // Sidebar
    pub url_input: InputField,
    pub language: Selector,

    // Results
    pub title: Option<String>,
    pub prompt: Option<Prompt>,
    pub warnings: Vec<FormatWarning>,
    pub sections: SectionList,
    pub pane: DetailPane,
    pub detail: Viewer,
    pub detail_height: u16,
    pub editor: Option<InputField>,

    // Running action
    pub busy: bool,
    pub activity: ActivityLog,
    pub status: Option<Status>,

    pub export_dir: PathBuf,
    pipeline: Arc<Pipeline<S, C>>,
    worker_tx: mpsc::UnboundedSender<WorkerMessage>,
    worker_rx: mpsc::UnboundedReceiver<WorkerMessage>,
}

impl<S, C> App<S, C>
where
    S: TranscriptSource + Send + Sync + 'static,
    C: Completer + Send + Sync + 'static,
{
    pub fn new(pipeline: Pipeline<S, C>, session: Session, export_dir: PathBuf) -> Self {
        let (worker_tx, worker_rx) = mpsc::unbounded_channel();

        let mut url_input = InputField::new(
            "YouTube URL",
            "https://www.youtube.com/watch?v=SLwpqD8n3d0",
        )
        .with_value(&session.video_url);
        url_input.focused = true;

        let mut language = Selector::new("Language", &LANGUAGES);
        language.select_value(&session.language);

        Self {
            should_quit: false,
            focus: Focus::Url,
            session,

            url_input,
            language,

            title: None,
            prompt: None,
            warnings: Vec::new(),
            sections: SectionList::new(Vec::new()),
            pane: DetailPane::Section,
            detail: Viewer::new(String::new(), "Section".into()),
            detail_height: 0,
            editor: None,

            busy: false,
            activity: ActivityLog::new(),
            status: None,

            export_dir,
            pipeline: Arc::new(pipeline),
            worker_tx,
            worker_rx,
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Result<()> {
        match event {
            AppEvent::Quit => {
                self.should_quit = true;
            }
            AppEvent::Key(key) => {
                self.handle_key(key);
            }
            AppEvent::Mouse(mouse) => {
                if self.sections.handle_mouse(mouse) {
                    self.refresh_detail();
                }
            }
            AppEvent::Tick => {
                self.handle_tick();
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.editor.is_some() {
            self.handle_editor_key(key);
            return;
        }

        match key.code {
            KeyCode::Tab => return self.cycle_focus(true),
            KeyCode::BackTab => return self.cycle_focus(false),
            _ => {}
        }

        match self.focus {
            Focus::Url => self.handle_url_key(key),
            Focus::Language => match key.code {
                KeyCode::Enter => self.start_summary(SummaryMode::Standard),
                KeyCode::Char('q') => self.should_quit = true,
                _ => {
                    self.language.handle_key(key);
                }
            },
            Focus::Generate | Focus::GenerateDetailed => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => {
                    let mode = if self.focus == Focus::Generate {
                        SummaryMode::Standard
                    } else {
                        SummaryMode::Detailed
                    };
                    self.start_summary(mode);
                }
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            },
            Focus::Sections => self.handle_sections_key(key),
        }
    }

    fn handle_url_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.start_summary(SummaryMode::Standard),
            KeyCode::Esc => self.set_focus(Focus::Language),
            _ => {
                self.url_input.handle_key(key);
            }
        }
    }

    fn handle_sections_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => self.set_focus(Focus::Url),
            KeyCode::Enter | KeyCode::Char('e') => self.open_editor(),
            KeyCode::Char('t') => self.toggle_pane(DetailPane::Transcript),
            KeyCode::Char('p') => self.toggle_pane(DetailPane::Prompt),
            KeyCode::Char('o') => self.toggle_pane(DetailPane::Output),
            KeyCode::Char('d') => self.start_refine(RefineStyle::Detailed),
            KeyCode::Char('c') => self.start_refine(RefineStyle::Concise),
            KeyCode::Char('f') => self.start_refine(RefineStyle::Fun),
            KeyCode::Char('s') => self.start_export(),
            KeyCode::PageUp | KeyCode::PageDown | KeyCode::Char('[') | KeyCode::Char(']') => {
                self.detail.handle_key(key, self.detail_height);
            }
            _ => {
                if self.sections.handle_key(key) {
                    self.refresh_detail();
                }
            }
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.editor = None;
            }
            KeyCode::Enter => {
                if let Some(editor) = self.editor.take()
                    && let Some(section) = self.sections.get_selected_mut()
                {
                    section.text = editor.value.trim().to_string();
                    self.set_status("Section updated.", false);
                }
                self.refresh_detail();
            }
            _ => {
                if let Some(editor) = &mut self.editor {
                    editor.handle_key(key);
                }
            }
        }
    }

    fn handle_tick(&mut self) {
        self.activity.tick();
        while let Ok(message) = self.worker_rx.try_recv() {
            self.handle_worker_message(message);
        }
    }

    pub fn handle_worker_message(&mut self, message: WorkerMessage) {
        match message {
            WorkerMessage::Log(log) => {
                self.activity.set_message(log.clone());
                self.activity.add_log(log);
            }
            WorkerMessage::SummaryReady { session, view } => {
                self.busy = false;
                self.session = session;

                let view = *view;
                let count = view.sections.len();
                let skipped = view.warnings.len();
                self.title = Some(view.title);
                self.prompt = Some(view.prompt);
                self.warnings = view.warnings;
                self.sections.update_items(view.sections);
                self.pane = DetailPane::Section;
                self.set_focus(Focus::Sections);
                self.refresh_detail();

                let text = match (count, skipped) {
                    (0, _) => "The model returned no timestamped sections.".to_string(),
                    (n, 0) => format!("Summary ready: {n} sections."),
                    (n, k) => format!("Summary ready: {n} sections ({k} malformed lines skipped)."),
                };
                self.set_status(&text, count == 0);
            }
            WorkerMessage::Refined { index, refinement } => {
                self.busy = false;
                let heading = refinement.style.heading();
                if let Some(section) = self.sections.items.get_mut(index) {
                    section.refinements.push(refinement);
                }
                if self.sections.selected_index() == Some(index) {
                    self.pane = DetailPane::Section;
                    self.refresh_detail();
                }
                self.set_status(&format!("{heading} ready."), false);
            }
            WorkerMessage::Exported(path) => {
                self.set_status(&format!("Saved {} (text/html).", path.display()), false);
            }
            WorkerMessage::ExportFailed(message) => {
                self.set_status(&message, true);
            }
            WorkerMessage::Failed(message) => {
                self.busy = false;
                self.set_status(&message, true);
            }
        }
    }

    fn cycle_focus(&mut self, forward: bool) {
        let available: Vec<Focus> = FOCUS_ORDER
            .iter()
            .copied()
            .filter(|f| *f != Focus::Sections || self.has_results())
            .collect();
        let current = available.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (current + 1) % available.len()
        } else {
            (current + available.len() - 1) % available.len()
        };
        self.set_focus(available[next]);
    }

    pub fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.url_input.focused = focus == Focus::Url;
        self.language.focused = focus == Focus::Language;
        self.sections.focused = focus == Focus::Sections;
    }

    fn set_status(&mut self, text: &str, is_error: bool) {
        self.status = Some(Status {
            text: text.to_string(),
            is_error,
        });
    }

    fn has_results(&self) -> bool {
        !self.sections.items.is_empty() || !self.session.summary.is_empty()
    }

    fn clear_results(&mut self) {
        self.title = None;
        self.prompt = None;
        self.warnings.clear();
        self.sections.update_items(Vec::new());
        self.editor = None;
        self.pane = DetailPane::Section;
        self.refresh_detail();
    }

    fn ensure_idle(&mut self) -> bool {
        if self.busy {
            self.set_status("Still working on the previous action...", true);
            return false;
        }
        true
    }

    fn start_summary(&mut self, mode: SummaryMode) {
        if !self.ensure_idle() {
            return;
        }
        if !self.url_input.is_valid() {
            self.set_status("Enter a YouTube URL first.", true);
            return;
        }

        let session = self
            .session
            .with_input(&self.url_input.value, self.language.value());
        if session.summary.is_empty() {
            // Results from a different video or language must not outlive the input change.
            self.clear_results();
        }
        self.session = session;
        self.busy = true;
        self.status = None;
        self.activity.reset();

        let label = match mode {
            SummaryMode::Standard => "Generating summary...",
            SummaryMode::Detailed => "Generating detailed summary...",
        };
        self.activity.set_message(label.to_string());
        self.activity.add_log(format!("Video: {}", self.session.video_url));

        let pipeline = Arc::clone(&self.pipeline);
        let tx = self.worker_tx.clone();
        let session = self.session.clone();

        let log_tx = tx.clone();
        spawn_action(tx, aborted(), async move {
            let _ = log_tx.send(WorkerMessage::Log(
                "Fetching transcript and requesting summary...".to_string(),
            ));
            match pipeline.generate(&session, mode).await {
                Ok((session, view)) => WorkerMessage::SummaryReady {
                    session,
                    view: Box::new(view),
                },
                Err(e) => {
                    tracing::error!(error = %e, ?mode, "Summary action failed");
                    WorkerMessage::Failed(e.user_message())
                }
            }
        });
    }

    fn start_refine(&mut self, style: RefineStyle) {
        if !self.ensure_idle() {
            return;
        }
        let (Some(index), Some(section)) = (
            self.sections.selected_index(),
            self.sections.get_selected().cloned(),
        ) else {
            return;
        };

        self.busy = true;
        self.status = None;
        self.activity.reset();
        self.activity
            .set_message(format!("{} for {}...", style.label(), section.timestamp));

        let pipeline = Arc::clone(&self.pipeline);
        let tx = self.worker_tx.clone();
        let session = self.session.clone();

        spawn_action(tx, aborted(), async move {
            match pipeline.refine(&session, &section, style).await {
                Ok(refinement) => WorkerMessage::Refined { index, refinement },
                Err(e) => {
                    tracing::error!(error = %e, ?style, "Refine action failed");
                    WorkerMessage::Failed(e.user_message())
                }
            }
        });
    }

    fn start_export(&mut self) {
        let artifact = ExportArtifact::from_sections(&self.sections.items);
        let dir = self.export_dir.clone();
        let tx = self.worker_tx.clone();

        let on_abort = WorkerMessage::ExportFailed("Export failed.".to_string());
        spawn_action(tx, on_abort, async move {
            match artifact.save_in(&dir).await {
                Ok(path) => WorkerMessage::Exported(path),
                Err(e) => {
                    tracing::error!(error = %e, "Export failed");
                    WorkerMessage::ExportFailed(format!("Export failed: {e}"))
                }
            }
        });
    }

    fn open_editor(&mut self) {
        if let Some(section) = self.sections.get_selected() {
            let mut editor = InputField::new(
                &format!("Edit Summary ({})", section.timestamp),
                "",
            )
            .with_value(&section.text);
            editor.focused = true;
            self.editor = Some(editor);
        }
    }

    fn toggle_pane(&mut self, pane: DetailPane) {
        self.pane = if self.pane == pane {
            DetailPane::Section
        } else {
            pane
        };
        self.refresh_detail();
    }

    fn refresh_detail(&mut self) {
        let (content, title) = match (self.pane, self.sections.get_selected()) {
            (DetailPane::Output, _) => (self.output_text(), "LLM Output".to_string()),
            (_, None) => (String::new(), "Section".to_string()),
            (DetailPane::Section, Some(section)) => {
                let mut content = format!("{}\n\nWatch on YouTube: {}", section.text, section.link);
                for refinement in &section.refinements {
                    content.push_str(&format!(
                        "\n\n# {}\n\n{}",
                        refinement.style.heading(),
                        markdown_to_text(&refinement.text)
                    ));
                }
                (content, format!("Section {}", section.timestamp))
            }
            (DetailPane::Transcript, Some(section)) => {
                (section.transcript.text(), "Transcript".to_string())
            }
            (DetailPane::Prompt, Some(_)) => (
                self.prompt
                    .as_ref()
                    .map(|p| p.user.clone())
                    .unwrap_or_default(),
                "Prompt".to_string(),
            ),
        };
        self.detail.set_content(content, title);
    }

    /// Raw model reply followed by the lines that could not be turned into sections.
    fn output_text(&self) -> String {
        let mut text = self.session.summary.clone();
        if !self.warnings.is_empty() {
            text.push_str("\n\n# Skipped lines\n");
            for warning in &self.warnings {
                text.push_str(&format!("\n{warning}"));
            }
        }
        text
    }

    #[cfg(test)]
    pub async fn recv_worker_message(&mut self) -> Option<WorkerMessage> {
        self.worker_rx.recv().await
    }
}

fn aborted() -> WorkerMessage {
    WorkerMessage::Failed("The action stopped unexpectedly.".to_string())
}

/// Runs `action` on its own task and forwards its result. If the task panics,
/// `on_abort` is sent instead so the app never waits on a message that will not come.
fn spawn_action<F>(tx: mpsc::UnboundedSender<WorkerMessage>, on_abort: WorkerMessage, action: F)
where
    F: Future<Output = WorkerMessage> + Send + 'static,
{
    tokio::spawn(async move {
        let message = match tokio::spawn(action).await {
            Ok(message) => message,
            Err(e) => {
                tracing::error!(error = %e, "Background action aborted");
                on_abort
            }
        };
        let _ = tx.send(message);
    });
}
