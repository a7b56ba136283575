//! Loader: runs fetches and writes on tokio and posts results back to the
//! app loop as [`Action`]s.
//!
//! Nothing here decides whether a result is still wanted. Fetch results
//! carry their token and the owning view drops stale ones; write results
//! become one [`Mutation`](lemvue_core::Mutation) each, broadcast by the app.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use lemvue_core::{Command, Fetch, Instance, RequestError};

use crate::action::{Action, Notification};

/// How often unread badges are refreshed while signed in.
const UNREAD_POLL: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct Loader {
    instance: Instance,
    tx: UnboundedSender<Action>,
}

impl Loader {
    pub fn new(instance: Instance, tx: UnboundedSender<Action>) -> Self {
        Self { instance, tx }
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// Spawn one task per fetch.
    pub fn fetch(&self, fetches: Vec<Fetch>) {
        for fetch in fetches {
            let instance = self.instance.clone();
            let tx = self.tx.clone();
            debug!(token = ?fetch.token(), "spawning fetch");
            tokio::spawn(async move {
                let fetched = fetch.run(&instance).await;
                let _ = tx.send(Action::Fetched(Box::new(fetched)));
            });
        }
    }

    /// Run a write. Success posts the mutation; failure posts a toast.
    pub fn execute(&self, cmd: Command) {
        let instance = self.instance.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let name = cmd.name();
            match instance.execute(cmd).await {
                Ok(mutation) => {
                    let _ = tx.send(Action::Mutated(Arc::new(mutation)));
                }
                Err(e) => {
                    warn!(command = name, error = %e, "command failed");
                    let message = RequestError::from(e).user_message();
                    let _ = tx.send(Action::Notify(Notification::error(message)));
                }
            }
        });
    }

    /// Finish an OAuth handshake from the callback's query values.
    pub fn complete_oauth(&self, code: String, state: String) {
        let instance = self.instance.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = instance
                .complete_oauth(&code, &state, Utc::now())
                .await
                .map_err(|e| {
                    warn!(error = %e, "oauth callback rejected");
                    RequestError::from(e).user_message()
                });
            let _ = tx.send(Action::OAuthFinished(result));
        });
    }

    /// Forward unread counts and connection state until cancelled, and
    /// poll the badge counts in the background.
    pub fn spawn_watchers(&self, cancel: CancellationToken) {
        let instance = self.instance.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let mut unread = instance.services().unread.subscribe();
            let mut connection = instance.connection_state();
            let mut poll = tokio::time::interval(UNREAD_POLL);
            poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            let _ = tx.send(Action::UnreadChanged(*unread.borrow_and_update()));
            let _ = tx.send(Action::ConnectionChanged(
                connection.borrow_and_update().clone(),
            ));

            loop {
                tokio::select! {
                    biased;

                    () = cancel.cancelled() => break,

                    Ok(()) = unread.changed() => {
                        let counts = *unread.borrow_and_update();
                        let _ = tx.send(Action::UnreadChanged(counts));
                    }
                    Ok(()) = connection.changed() => {
                        let state = connection.borrow_and_update().clone();
                        let _ = tx.send(Action::ConnectionChanged(state));
                    }
                    _ = poll.tick() => {
                        if let Err(e) = instance.refresh_unread().await {
                            debug!(error = %e, "unread refresh failed");
                        }
                    }
                }
            }
            debug!("watchers shut down");
        });
    }
}
