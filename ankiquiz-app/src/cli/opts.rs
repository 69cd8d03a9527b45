use ankiquiz_core::DEFAULT_TEMPLATE;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Debug, Parser, Clone)]
#[command(name = "ankiquiz", version, about = "Multiple-choice tests from a local Anki collection")]
pub struct Cli {
    /// Collection file to open instead of searching Anki's data folder
    #[arg(long, global = true)]
    pub collection: Option<PathBuf>,

    /// Anki data folder to search for `collection.anki2`
    #[arg(long, global = true)]
    pub anki_dir: Option<PathBuf>,

    /// Note type whose notes are treated as questions
    #[arg(long, global = true, default_value = DEFAULT_TEMPLATE)]
    pub template: String,

    /// Output format for non-interactive commands
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Plain)]
    pub format: OutputFormat,

    /// Write logs to this file (the TUI logs to the app data dir by default)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Defaults to the terminal UI
    #[command(subcommand)]
    pub cmd: Option<Command>,
}

impl Cli {
    pub fn is_tui(&self) -> bool {
        matches!(self.cmd, None | Some(Command::Tui))
    }
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Launch the terminal UI
    Tui,
    /// List decks containing questions
    Decks,
    /// Parse a deck and report skipped notes
    Check {
        #[arg(long)]
        deck: String,
    },
    /// Take a test on the command line
    Quiz(QuizCmd),
    /// Export a deck to a Word document
    Export(ExportCmd),
}

#[derive(Debug, Args, Clone)]
pub struct QuizCmd {
    #[arg(long)]
    pub deck: String,
    /// Keep answer options in their stored order
    #[arg(long)]
    pub no_shuffle: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ExportCmd {
    #[arg(long)]
    pub deck: String,
    /// Output path (defaults to `<deck>.docx` in the current directory)
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Emit correct answers only once, highlighted
    #[arg(long)]
    pub no_duplicate_correct: bool,
}
