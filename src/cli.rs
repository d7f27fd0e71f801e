use crate::config::Provider;
use crate::core::{LANGUAGES, RefineStyle};
use clap::builder::PossibleValuesParser;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vidsum")]
#[command(about = "Summarize YouTube videos into timestamped sections with an LLM")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Chat-completion provider (overrides VIDSUM_PROVIDER)
    #[arg(long, global = true, value_enum)]
    pub provider: Option<Provider>,

    /// Log file used while the TUI owns the terminal
    #[arg(long, global = true, env = "VIDSUM_LOG_FILE", default_value = "vidsum.log")]
    pub log_file: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive summarizer (default)
    Tui {
        /// Prefill the URL field
        #[arg(long)]
        url: Option<String>,

        /// Summary language
        #[arg(short, long, default_value = "en", value_parser = PossibleValuesParser::new(LANGUAGES))]
        language: String,

        /// Directory where summary.html is written
        #[arg(long, default_value = ".")]
        export_dir: PathBuf,
    },

    /// Summarize a video and write the HTML export
    Summarize {
        /// YouTube watch URL
        url: String,

        /// Summary language
        #[arg(short, long, default_value = "en", value_parser = PossibleValuesParser::new(LANGUAGES))]
        language: String,

        /// Use the detailed whole-video prompt
        #[arg(long)]
        detailed: bool,

        /// Where to write the HTML export
        #[arg(short, long, default_value = "summary.html")]
        output: PathBuf,
    },

    /// Summarize a video, then regenerate one section in another style
    Refine {
        /// YouTube watch URL
        url: String,

        /// Summary language
        #[arg(short, long, default_value = "en", value_parser = PossibleValuesParser::new(LANGUAGES))]
        language: String,

        /// Section timestamp (hh:mm:ss); defaults to the first section
        #[arg(short, long)]
        timestamp: Option<String>,

        /// Regeneration style
        #[arg(short, long, value_enum, default_value = "detailed")]
        style: RefineStyle,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_summarize_options() {
        let cli = Cli::parse_from([
            "vidsum",
            "summarize",
            "https://www.youtube.com/watch?v=ABC",
            "--language",
            "zh-CN",
            "--detailed",
            "--provider",
            "openrouter",
        ]);
        assert_eq!(cli.provider, Some(Provider::Openrouter));
        let Some(Commands::Summarize {
            language, detailed, output, ..
        }) = cli.command
        else {
            panic!("expected summarize");
        };
        assert_eq!(language, "zh-CN");
        assert!(detailed);
        assert_eq!(output, PathBuf::from("summary.html"));
    }

    #[test]
    fn summarize_always_prints_without_a_flag() {
        assert!(Cli::try_parse_from(["vidsum", "summarize", "u", "--print"]).is_err());
        let cli = Cli::parse_from(["vidsum", "summarize", "u"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Summarize { detailed: false, .. })
        ));
    }

    #[test]
    fn rejects_unsupported_language() {
        assert!(
            Cli::try_parse_from(["vidsum", "summarize", "u", "--language", "fr"]).is_err()
        );
    }

    #[test]
    fn refine_style_parses() {
        let cli = Cli::parse_from(["vidsum", "refine", "u", "--style", "fun"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Refine {
                style: RefineStyle::Fun,
                timestamp: None,
                ..
            })
        ));
    }
}
