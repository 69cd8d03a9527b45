mod cli;
mod logging;
mod paths;
pub mod tui;

use anyhow::Result;
use clap::Parser; // needed for Cli::parse()
use std::sync::Arc;
use tokio::runtime::Runtime;

use ankiquiz_docx::ExportOptions;
use cli::commands::{open_collection, run_cli};
use cli::opts::Cli;
use tui::app::TuiApp;

fn main() -> Result<()> {
    let args = Cli::parse();

    // The TUI owns the terminal, so its logs go to a file unless told otherwise.
    let log_file = match (&args.log_file, args.is_tui()) {
        (Some(p), _) => Some(p.clone()),
        (None, true) => Some(paths::default_log_file()),
        (None, false) => None,
    };
    logging::init(args.verbose, log_file.as_deref())?;

    if args.is_tui() {
        // Run TUI on its own runtime (no nested Tokio)
        let rt = Arc::new(Runtime::new()?);
        let collection = rt.block_on(open_collection(&args));
        let mut app = TuiApp::new(collection, rt, ExportOptions::default());
        app.run()
    } else {
        let rt = Runtime::new()?;
        rt.block_on(run_cli(args))
    }
}
