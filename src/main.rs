mod cli;
mod config;
mod core;
mod error;
mod logging;
mod tui;

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::core::{
    ExportArtifact, Pipeline, RefineStyle, Session, SummaryClient, SummaryMode, TranscriptService,
    markdown_to_text, write_html,
};
use crate::error::{Error, Result};
use crate::logging::{LogTarget, init_tracing};
use crate::tui::{App, EventHandler, init as tui_init, restore as tui_restore, ui};
use clap::Parser;
use std::path::PathBuf;

type LivePipeline = Pipeline<TranscriptService, SummaryClient>;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let interactive = matches!(cli.command, None | Some(Commands::Tui { .. }));
    if interactive {
        init_tracing(LogTarget::File(&cli.log_file))?;
    } else {
        init_tracing(LogTarget::Stderr)?;
    }

    let config = Config::from_env(cli.provider)?;
    tracing::info!(provider = %config.provider, transcript_api = %config.transcript_api.base_url, "Configuration loaded");
    let pipeline = build_pipeline(&config)?;

    match cli.command {
        Some(Commands::Summarize {
            url,
            language,
            detailed,
            output,
        }) => {
            let mode = if detailed {
                SummaryMode::Detailed
            } else {
                SummaryMode::Standard
            };
            run_cli_summarize(&pipeline, Session::new(url, language), mode, output).await?;
        }
        Some(Commands::Refine {
            url,
            language,
            timestamp,
            style,
        }) => {
            run_cli_refine(&pipeline, Session::new(url, language), timestamp, style).await?;
        }
        Some(Commands::Tui {
            url,
            language,
            export_dir,
        }) => {
            run_tui(pipeline, Session::new(url.unwrap_or_default(), language), export_dir)?;
        }
        None => {
            run_tui(pipeline, Session::default(), PathBuf::from("."))?;
        }
    }

    Ok(())
}

fn build_pipeline(config: &Config) -> Result<LivePipeline> {
    let provider = config.active_provider()?;
    let transcripts = TranscriptService::new(&config.transcript_api)?;
    let completer = SummaryClient::new(provider);
    tracing::debug!(model = completer.model(), "Completion client ready");
    Ok(Pipeline::new(transcripts, completer))
}

async fn run_cli_summarize(
    pipeline: &LivePipeline,
    session: Session,
    mode: SummaryMode,
    output: PathBuf,
) -> Result<()> {
    println!("Summarizing: {}", session.video_url);

    let (_, view) = pipeline
        .generate(&session, mode)
        .await
        .map_err(|e| Error::custom(e.user_message()))?;

    println!("{} [{}]", view.title, view.transcript.language_code);
    println!("Video URL: {}", view.video_url);
    println!();
    for section in &view.sections {
        println!("{} - {}", section.timestamp, section.text);
        println!("    {}", section.link);
    }
    if !view.warnings.is_empty() {
        println!();
        println!("Skipped {} malformed lines:", view.warnings.len());
        for warning in &view.warnings {
            println!("  {warning}");
        }
    }

    let artifact = ExportArtifact::from_sections(&view.sections);
    write_html(&output, &artifact.body).await?;
    println!();
    println!("Summary saved to: {output:?} ({})", artifact.mime);

    Ok(())
}

async fn run_cli_refine(
    pipeline: &LivePipeline,
    session: Session,
    timestamp: Option<String>,
    style: RefineStyle,
) -> Result<()> {
    let (session, view) = pipeline
        .generate(&session, SummaryMode::Standard)
        .await
        .map_err(|e| Error::custom(e.user_message()))?;

    let section = match &timestamp {
        Some(ts) => view.sections.iter().find(|s| &s.timestamp == ts),
        None => view.sections.first(),
    }
    .ok_or_else(|| {
        Error::custom(format!(
            "No section at {} in the generated summary",
            timestamp.as_deref().unwrap_or("the start")
        ))
    })?;

    println!("{} - {}", section.timestamp, section.text);
    let refinement = pipeline
        .refine(&session, section, style)
        .await
        .map_err(|e| Error::custom(e.user_message()))?;

    println!();
    println!("{}:", style.heading());
    println!("{}", markdown_to_text(&refinement.text));

    Ok(())
}

fn run_tui(pipeline: LivePipeline, session: Session, export_dir: PathBuf) -> Result<()> {
    let mut terminal = tui_init()?;
    let mut app = App::new(pipeline, session, export_dir);
    let event_handler = EventHandler::new();

    let outcome = (|| -> Result<()> {
        loop {
            let event = event_handler.next_event()?;
            app.handle_event(event)?;

            terminal.draw(|f| {
                ui::draw(f, &mut app);
            })?;

            if app.should_quit {
                return Ok(());
            }
        }
    })();

    // Always hand the terminal back, even if the loop failed.
    tui_restore()?;
    outcome
}
