use crate::tui::{inputs::map_event, state::AppState, views};
use ankiquiz_core::{Collection, CoreError};
use ankiquiz_docx::ExportOptions;
use crossterm::{
    event::{self},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{stdout, Stdout};
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::info;

pub struct TuiApp {
    pub rt: Arc<Runtime>,
    state: AppState,
}

impl TuiApp {
    pub fn new(
        collection: Result<Arc<dyn Collection>, CoreError>,
        rt: Arc<Runtime>,
        export_opts: ExportOptions,
    ) -> Self {
        Self {
            rt,
            state: AppState::new(collection, export_opts),
        }
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        self.rt.block_on(self.state.init());
        info!(decks = self.state.decks.len(), "tui started");

        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let res = self.mainloop(&mut terminal);

        disable_raw_mode().ok();
        let mut out: Stdout = std::io::stdout();
        execute!(out, LeaveAlternateScreen).ok();
        terminal.show_cursor().ok();

        res
    }

    fn mainloop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
        while !self.state.quit {
            terminal.draw(|f| views::draw(f, &self.state))?;

            if event::poll(std::time::Duration::from_millis(100))? {
                let ev = event::read()?;
                let action = map_event(ev, self.state.screen.takes_text());
                self.rt.block_on(self.state.handle(action));
            }
        }
        Ok(())
    }
}
