//! Generic runtime for view orchestration.
//!
//! The Runtime drives the panel event loop, coordinating between:
//! - [`App`]: view state machine
//! - [`Bridge`]: translation layer over the conversation store
//! - [`Driver`]: platform-specific I/O

use parlor_core::{UserId, env::Environment};

use crate::{App, Bridge, Driver, FetchRequest, ViewAction, ViewFrame};

/// Generic runtime that orchestrates App, Bridge, and Driver.
///
/// # Type Parameters
///
/// - `D`: platform-specific I/O driver
/// - `E`: environment for time and randomness
pub struct Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    driver: D,
    app: App,
    bridge: Bridge<E>,
}

impl<D, E> Runtime<D, E>
where
    D: Driver<Instant = E::Instant>,
    E: Environment,
{
    /// Create a new runtime with the given driver and environment.
    pub fn new(driver: D, env: E, self_id: UserId) -> Self {
        Self { driver, app: App::new(), bridge: Bridge::new(env, self_id) }
    }

    /// Run the main event loop.
    ///
    /// This is the core orchestration loop that:
    /// 1. Polls for input intents from the driver
    /// 2. Receives gateway updates
    /// 3. Processes actions and events between App and Bridge
    /// 4. Sends outgoing events and runs fetches through the driver
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(mut self) -> Result<(), D::Error> {
        self.render()?;

        loop {
            let should_quit = self.process_cycle().await?;
            if should_quit {
                break;
            }
        }

        self.driver.stop();
        Ok(())
    }

    /// Process one cycle of the event loop.
    ///
    /// Returns `true` if the application should quit.
    pub async fn process_cycle(&mut self) -> Result<bool, D::Error> {
        let actions = self.driver.poll_input(&mut self.app).await?;
        if self.process_actions(actions).await? {
            return Ok(true);
        }

        if let Some(update) = self.driver.poll_gateway().await {
            let events = self.bridge.handle_gateway(update);
            self.send_outgoing().await?;
            let actions = self.events_to_actions(events);
            if self.process_actions(actions).await? {
                return Ok(true);
            }
        }

        let now = self.driver.now();
        let events = self.bridge.handle_tick(now);
        self.send_outgoing().await?;
        let actions = self.events_to_actions(events);
        if self.process_actions(actions).await? {
            return Ok(true);
        }

        Ok(false)
    }

    /// Process actions until both the action queue and the fetch queue are
    /// drained.
    ///
    /// Returns `true` if should quit.
    async fn process_actions(&mut self, initial: Vec<ViewAction>) -> Result<bool, D::Error> {
        let mut pending = initial;

        loop {
            while !pending.is_empty() {
                let actions = std::mem::take(&mut pending);

                for action in actions {
                    match action {
                        ViewAction::Render => self.render()?,
                        ViewAction::Quit => return Ok(true),

                        // Store operations go through the bridge
                        ViewAction::Refresh
                        | ViewAction::Open { .. }
                        | ViewAction::Close
                        | ViewAction::Send { .. }
                        | ViewAction::Input { .. } => {
                            let events = self.bridge.process_view_action(action);
                            self.send_outgoing().await?;
                            pending.extend(self.events_to_actions(events));
                        },
                    }
                }
            }

            // Actions settled; run fetches they requested. Completions may
            // raise new actions (deep-link resolution, notices), so loop.
            let fetches = self.bridge.take_fetches();
            if fetches.is_empty() {
                return Ok(false);
            }
            for fetch in fetches {
                pending.extend(self.run_fetch(fetch).await?);
            }
        }
    }

    /// Execute one fetch and feed its completion back through the store.
    async fn run_fetch(&mut self, fetch: FetchRequest) -> Result<Vec<ViewAction>, D::Error> {
        let mut pending = Vec::new();

        match fetch {
            FetchRequest::Conversations { generation } => {
                let result = self.driver.fetch_conversations().await;
                let loaded = result.is_ok();
                let events = self.bridge.complete_conversations(generation, result);
                self.send_outgoing().await?;
                pending.extend(self.events_to_actions(events));

                // The list is the prerequisite a parked deep link waits for
                if loaded {
                    pending.extend(self.app.resolve_deep_link());
                }
            },
            FetchRequest::History { partner_id, generation } => {
                let result = self.driver.fetch_history(partner_id.as_str()).await;
                let events = self.bridge.complete_history(partner_id, generation, result);
                self.send_outgoing().await?;
                pending.extend(self.events_to_actions(events));
            },
        }

        Ok(pending)
    }

    /// Route view events through the App, collecting its actions.
    fn events_to_actions(&mut self, events: Vec<crate::ViewEvent>) -> Vec<ViewAction> {
        let mut actions = Vec::new();
        for event in events {
            actions.extend(self.app.handle(event));
        }
        actions
    }

    /// Send all pending outgoing events to the gateway.
    async fn send_outgoing(&mut self) -> Result<(), D::Error> {
        for event in self.bridge.take_outgoing() {
            self.driver.send_event(event).await?;
        }
        Ok(())
    }

    /// Assemble a view frame and hand it to the driver.
    fn render(&mut self) -> Result<(), D::Error> {
        let store = self.bridge.store();
        let frame = ViewFrame {
            panel_open: self.app.panel_open(),
            pane: self.app.pane(),
            collapsed: self.app.is_collapsed(),
            compose: self.app.compose(),
            status: self.app.status_message(),
            connected: store.is_connected(),
            summaries: store.summaries(),
            active: store.active(),
            thread: store.thread(),
            presence: store.presence(),
            partner_typing: store.partner_typing(),
            total_unread: store.summaries().iter().map(|s| s.unread_count).sum(),
        };
        self.driver.render(&frame)
    }

    /// Get a reference to the App.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a mutable reference to the App.
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    /// Get a reference to the Bridge.
    pub fn bridge(&self) -> &Bridge<E> {
        &self.bridge
    }
}
