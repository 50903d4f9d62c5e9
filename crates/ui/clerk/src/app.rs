use std::sync::Arc;

use api::TrackerApi;
use color_eyre::Result;
use ratatui::{Frame, prelude::Rect};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error};

use crate::{
    action::{Action, Route},
    components::Component,
    components::milestone_editor::MilestoneEditor,
    config::Config,
    pages::{LoginPage, MilestonesPage, Page, RegisterPage},
    services::cache::QueryCache,
    services::session::SessionGate,
    state::{InputMode, State},
    tui::{Event, EventResponse, Tui},
};

/// Owns the event loop. Events come out of [`Tui`], flow popup-first through
/// the active page, and end up as [`Action`]s on one queue; the queue is
/// drained to exhaustion before the next event is awaited, so every spawned
/// task reports through the same single-file path.
pub struct App {
    config: Config,
    tracker: Arc<dyn TrackerApi>,
    session: SessionGate,
    pages: Vec<Box<dyn Page>>,
    active_page: usize,
    popup: Option<MilestoneEditor>,
    should_quit: bool,
    should_suspend: bool,
    state: State,
    action_tx: UnboundedSender<Action>,
    action_rx: UnboundedReceiver<Action>,
}

impl App {
    pub fn new(config: Config, tracker: Arc<dyn TrackerApi>) -> Result<Self> {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let session = SessionGate::new();
        let cache = QueryCache::new();
        let state = State::new(session.signal(), cache.clone());

        let pages: Vec<Box<dyn Page>> = vec![
            Box::new(LoginPage::new(Arc::clone(&tracker), action_tx.clone())),
            Box::new(RegisterPage::new(
                Arc::clone(&tracker),
                action_tx.clone(),
                cache.clone(),
            )),
            Box::new(MilestonesPage::new(
                Arc::clone(&tracker),
                action_tx.clone(),
            )),
        ];

        Ok(Self {
            config,
            tracker,
            session,
            pages,
            active_page: Self::page_index(Route::Login),
            popup: None,
            should_quit: false,
            should_suspend: false,
            state,
            action_tx,
            action_rx,
        })
    }

    fn page_index(route: Route) -> usize {
        match route {
            Route::Login => 0,
            Route::Register => 1,
            Route::Milestones => 2,
        }
    }

    /// Where a navigation actually lands. The milestone board is behind the
    /// session; everything else is open.
    fn resolve_route(route: Route, authenticated: bool) -> Route {
        if route == Route::Milestones && !authenticated {
            debug!("milestones need a session; redirecting to login");
            Route::Login
        } else {
            route
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let action_tx = self.action_tx.clone();

        let mut tui = Tui::new()?
            .tick_rate(self.config.config.tick_rate)
            .frame_rate(self.config.config.frame_rate);
        tui.enter()?;

        if let Some(page) = self.pages.get_mut(self.active_page) {
            page.focus(&mut self.state)?;
        }

        loop {
            if let Some(e) = tui.next().await {
                let mut stop_event_propagation = false;

                // global chords outrank every surface, the modal dialog
                // included; ctrl-c must quit from anywhere
                if let Event::Key(key) = &e {
                    if let Some(action) = self.config.keybindings.global_action(key) {
                        action_tx.send(action)?;
                        stop_event_propagation = true;
                    }
                }

                if !stop_event_propagation {
                    if let Some(popup) = &mut self.popup {
                        match popup.handle_events(e.clone(), &mut self.state)? {
                            Some(EventResponse::Continue(action)) => {
                                action_tx.send(action)?;
                            }
                            Some(EventResponse::Stop(action)) => {
                                action_tx.send(action)?;
                                stop_event_propagation = true;
                            }
                            None => {}
                        }
                        // the dialog is modal; input never falls through it
                        if matches!(e, Event::Key(_) | Event::Paste(_)) {
                            stop_event_propagation = true;
                        }
                    }
                }

                if !stop_event_propagation {
                    if let Some(page) = self.pages.get_mut(self.active_page) {
                        match page.handle_events(e.clone(), &mut self.state)? {
                            Some(EventResponse::Continue(action)) => {
                                action_tx.send(action)?;
                            }
                            Some(EventResponse::Stop(action)) => {
                                action_tx.send(action)?;
                                stop_event_propagation = true;
                            }
                            None => {}
                        }
                    }
                }

                if !stop_event_propagation {
                    match e {
                        Event::Tick => action_tx.send(Action::Tick)?,
                        Event::Render => action_tx.send(Action::Render)?,
                        Event::Resize(x, y) => action_tx.send(Action::Resize(x, y))?,
                        Event::Error => {
                            action_tx.send(Action::Error("terminal event stream failed".into()))?
                        }
                        Event::Key(key) => {
                            if self.state.input_mode == InputMode::Normal {
                                if let Some(action) = self.config.keybindings.normal_action(&key) {
                                    action_tx.send(action)?;
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }

            while let Ok(action) = self.action_rx.try_recv() {
                if action != Action::Tick && action != Action::Render {
                    debug!("{action:?}");
                }
                match &action {
                    Action::Quit => self.should_quit = true,
                    Action::Suspend => self.should_suspend = true,
                    Action::Resume => self.should_suspend = false,
                    Action::Resize(w, h) => {
                        tui.resize(Rect::new(0, 0, *w, *h))?;
                        tui.draw(|f| {
                            self.render(f).unwrap_or_else(|err| {
                                action_tx
                                    .send(Action::Error(format!("Failed to draw: {err:?}")))
                                    .ok();
                            })
                        })?;
                    }
                    Action::Render => {
                        tui.draw(|f| {
                            self.render(f).unwrap_or_else(|err| {
                                action_tx
                                    .send(Action::Error(format!("Failed to draw: {err:?}")))
                                    .ok();
                            })
                        })?;
                    }
                    Action::Error(message) => {
                        error!(%message, "app error");
                    }
                    Action::Navigate(route) => {
                        self.navigate(*route)?;
                    }
                    Action::LoginFinished(Ok(profile)) => {
                        self.session
                            .authenticate(profile.user_id.clone(), profile.nickname.clone());
                        self.navigate(Route::Milestones)?;
                    }
                    Action::Logout => {
                        self.session.clear();
                        self.navigate(Route::Login)?;
                    }
                    Action::OpenMilestoneEditor(prefill) => {
                        self.popup = Some(MilestoneEditor::new(
                            Arc::clone(&self.tracker),
                            action_tx.clone(),
                            self.state.cache.clone(),
                            prefill.clone(),
                        ));
                        self.state.input_mode = InputMode::Insert;
                    }
                    Action::ClosePopup => {
                        if let Some(mut editor) = self.popup.take() {
                            editor.abandon();
                            self.state.input_mode = InputMode::Normal;
                        }
                    }
                    _ => {}
                }

                if let Some(popup) = &mut self.popup {
                    if let Some(follow_up) = popup.update(action.clone(), &mut self.state)? {
                        action_tx.send(follow_up)?;
                    }
                }
                if let Some(page) = self.pages.get_mut(self.active_page) {
                    if let Some(follow_up) = page.update(action, &mut self.state)? {
                        action_tx.send(follow_up)?;
                    }
                }
            }

            if self.should_suspend {
                tui.suspend()?;
                action_tx.send(Action::Resume)?;
                tui = Tui::new()?
                    .tick_rate(self.config.config.tick_rate)
                    .frame_rate(self.config.config.frame_rate);
                tui.enter()?;
            } else if self.should_quit {
                break;
            }
        }
        tui.exit()?;
        Ok(())
    }

    fn navigate(&mut self, route: Route) -> Result<()> {
        let route = Self::resolve_route(route, self.state.session.is_authenticated());
        let target = Self::page_index(route);
        if target == self.active_page {
            return Ok(());
        }
        if let Some(page) = self.pages.get_mut(self.active_page) {
            page.unfocus(&mut self.state)?;
        }
        self.active_page = target;
        if let Some(page) = self.pages.get_mut(self.active_page) {
            page.focus(&mut self.state)?;
        }
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame<'_>) -> Result<()> {
        let area = frame.area();
        if let Some(page) = self.pages.get_mut(self.active_page) {
            page.draw(frame, area, &self.state)?;
        }
        if let Some(popup) = &mut self.popup {
            popup.draw(frame, area, &self.state)?;
        }
        Ok(())
    }
}
