use crate::cli::opts::*;

use ankiquiz_anki::AnkiCollection;
use ankiquiz_core::{Collection, CoreError, DeckSession};
use ankiquiz_docx::{default_file_name, export_deck, ExportOptions};
use anyhow::{bail, Result};
use serde_json::json;
use std::collections::BTreeSet;
use std::io::{stdin, stdout, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

pub async fn run_cli(args: Cli) -> Result<()> {
    let collection = open_collection(&args).await?;
    match args.cmd.clone() {
        Some(Command::Decks) => decks_cmd(&*collection, &args.format).await,
        Some(Command::Check { deck }) => check_cmd(&*collection, &deck, &args.format).await,
        Some(Command::Quiz(cmd)) => quiz_cmd(&*collection, cmd, &args.format).await,
        Some(Command::Export(cmd)) => export_cmd(&*collection, cmd).await,
        Some(Command::Tui) | None => bail!("the terminal UI is started from main"),
    }
}

/// Opens the collection named on the command line, or Anki's default one.
pub async fn open_collection(args: &Cli) -> Result<Arc<dyn Collection>, CoreError> {
    let c = match (&args.collection, &args.anki_dir) {
        (Some(file), _) => AnkiCollection::open_file(file, &args.template).await?,
        (None, Some(dir)) => AnkiCollection::open_in(dir, &args.template).await?,
        (None, None) => AnkiCollection::open_default(&args.template).await?,
    };
    Ok(Arc::new(c))
}

async fn decks_cmd(collection: &dyn Collection, format: &OutputFormat) -> Result<()> {
    let names = collection.deck_names().await?;
    match format {
        OutputFormat::Plain => {
            for n in names {
                println!("{n}");
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&names)?),
    }
    Ok(())
}

async fn check_cmd(collection: &dyn Collection, deck: &str, format: &OutputFormat) -> Result<()> {
    let mut session = DeckSession::new(deck);
    let res = session.load(collection).await;
    match format {
        OutputFormat::Plain => {
            println!("deck: {}", session.name());
            println!("questions: {}", session.len());
            println!("skipped: {}", session.errors().len());
            for e in session.errors() {
                println!("  - {}", e.replace('\n', " "));
            }
        }
        OutputFormat::Json => {
            let v = json!({
                "deck": session.name(),
                "questions": session.len(),
                "skipped": session.errors(),
            });
            println!("{}", serde_json::to_string_pretty(&v)?);
        }
    }
    res?;
    Ok(())
}

async fn quiz_cmd(collection: &dyn Collection, cmd: QuizCmd, format: &OutputFormat) -> Result<()> {
    let mut session = DeckSession::new(&cmd.deck);
    session.load(collection).await?;

    loop {
        if !cmd.no_shuffle {
            session.shuffle_current();
        }
        println!("\n{}/{} Question:", session.position() + 1, session.len());
        println!("{}", session.question());
        if !session.images().is_empty() {
            println!("({} image(s) not shown)", session.images().len());
        }
        for (i, a) in session.answers().iter().enumerate() {
            println!("  {}) {}", i + 1, a);
        }
        println!("[numbers or letters, e.g. `1 3` or `a c`; q=quit]");

        let selected = loop {
            let line = read_line("answer> ")?;
            let line = line.trim();
            if line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit") {
                return print_score(&session, format);
            }
            match parse_selection(line, session.answers().len()) {
                Some(sel) => break sel,
                None => println!("pick options 1-{}", session.answers().len()),
            }
        };

        let hit = session.record_answer(&selected)?;
        println!("{}", if hit { "correct" } else { "wrong" });
        match session.advance() {
            Ok(()) => {}
            Err(CoreError::Exhausted) => break,
            Err(e) => return Err(e.into()),
        }
    }

    print_score(&session, format)
}

async fn export_cmd(collection: &dyn Collection, cmd: ExportCmd) -> Result<()> {
    let path = cmd
        .out
        .unwrap_or_else(|| PathBuf::from(default_file_name(&cmd.deck)));
    let mut session = DeckSession::new(&cmd.deck);
    session.load(collection).await?;
    let opts = ExportOptions {
        duplicate_correct_plain: !cmd.no_duplicate_correct,
    };
    let summary = export_deck(&session, &path, &opts)?;
    info!(questions = summary.questions, "export finished");
    println!("wrote {} ({} questions)", path.display(), summary.questions);
    Ok(())
}

// ===== Helpers =====
fn print_score(session: &DeckSession, format: &OutputFormat) -> Result<()> {
    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&session.report())?);
        return Ok(());
    }
    println!(
        "\nScore: {}/{} ({}%)",
        session.score(),
        session.max_score(),
        session.percentage()
    );
    if !session.wrong_questions().is_empty() {
        println!("Wrong answers:");
        for (i, q) in session.wrong_questions().iter().enumerate() {
            println!("{} {}", i + 1, q);
        }
    }
    Ok(())
}

/// `"1 3"`, `"1,3"` and `"a c"` all select options 0 and 2. An empty line selects nothing.
pub fn parse_selection(line: &str, count: usize) -> Option<BTreeSet<usize>> {
    let mut out = BTreeSet::new();
    for tok in line.split(|c: char| c == ',' || c.is_whitespace()).filter(|t| !t.is_empty()) {
        let idx = if let Ok(n) = tok.parse::<usize>() {
            n.checked_sub(1)?
        } else if tok.len() == 1 && tok.chars().all(|c| c.is_ascii_alphabetic()) {
            (tok.to_ascii_uppercase().as_bytes()[0] - b'A') as usize
        } else {
            return None;
        };
        if idx >= count {
            return None;
        }
        out.insert(idx);
    }
    Some(out)
}

fn read_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    stdout().flush().ok();
    let mut s = String::new();
    if stdin().read_line(&mut s)? == 0 {
        bail!("input closed");
    }
    Ok(s)
}
