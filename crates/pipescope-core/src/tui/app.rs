//! Main TUI application.

use std::io;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{info, warn};

use crate::provider::RecordProvider;
use crate::survey::{SurveyChange, SurveyId, SurveyWatcher};
use crate::table::TableError;

use super::event::{Event, EventHandler};
use super::input::{KeyAction, handle_key};
use super::render::render;
use super::state::{AppConfig, AppState};

/// Main TUI application.
pub struct App {
    provider: Box<dyn RecordProvider>,
    /// `None` when the survey was fixed on the command line.
    watcher: Option<SurveyWatcher>,
    state: AppState,
    should_quit: bool,
}

impl App {
    pub fn new(
        provider: Box<dyn RecordProvider>,
        survey: Option<SurveyId>,
        watcher: Option<SurveyWatcher>,
        config: &AppConfig,
    ) -> Result<Self, TableError> {
        let mut state = AppState::new(config)?;
        state.survey = survey;
        state.load(provider.as_ref());
        Ok(Self {
            provider,
            watcher,
            state,
            should_quit: false,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Runs the TUI until the user quits.
    pub fn run(mut self, tick_rate: Duration) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let events = EventHandler::new(tick_rate);
        self.poll_survey();

        let result = loop {
            if let Err(e) = terminal.draw(|frame| render(frame, &mut self.state)) {
                break Err(e);
            }

            match events.next() {
                Ok(Event::Tick) => self.poll_survey(),
                Ok(Event::Key(key)) => match handle_key(&mut self.state, key) {
                    KeyAction::Quit => self.should_quit = true,
                    KeyAction::Reload => self.reload(),
                    KeyAction::None => {}
                },
                // Next draw picks up the new size.
                Ok(Event::Resize) => {}
                Err(_) => self.should_quit = true,
            }

            if self.should_quit {
                break Ok(());
            }
        };

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        result
    }

    /// Applies the latest pending survey change, if any.
    pub fn poll_survey(&mut self) {
        let Some(watcher) = &self.watcher else {
            return;
        };
        let mut latest: Option<SurveyChange> = None;
        while let Some(change) = watcher.try_recv() {
            latest = Some(change);
        }
        if let Some(change) = latest {
            self.apply_survey_change(change);
        }
    }

    fn apply_survey_change(&mut self, change: SurveyChange) {
        if change.current == self.state.survey {
            return;
        }
        info!(
            "Active survey: {}",
            change
                .current
                .as_ref()
                .map(SurveyId::as_str)
                .unwrap_or("none")
        );
        self.state.set_survey(change.current, self.provider.as_ref());
        self.state.status_message = Some(match &self.state.survey {
            Some(id) => format!("Survey changed to {}", id),
            None => "Survey cleared".to_string(),
        });
    }

    /// Re-reads the provider; on failure the previous records stay visible.
    pub fn reload(&mut self) {
        match self.provider.reload() {
            Ok(()) => {
                self.state.load(self.provider.as_ref());
                self.state.status_message = Some("Reloaded".to_string());
            }
            Err(e) => {
                warn!("Reload failed: {}", e);
                self.state.status_message = Some(format!("Reload failed: {}", e));
            }
        }
    }
}
