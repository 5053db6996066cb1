//! Discord Rich Presence integration using discord-sdk

use std::sync::Mutex;
use std::time::Duration;

use discord_sdk::{
    activity::{ActivityBuilder, Assets},
    wheel::{UserState, Wheel},
    Discord, Subscriptions,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::presence::{PresenceSink, PresentationState};

/// Timeout for waiting for Discord handshake
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

enum SinkMessage {
    Update(PresentationState),
    Shutdown,
}

/// Discord presence sink. Updates are queued to a background task that
/// owns the Discord connection.
pub struct DiscordPresence {
    update_tx: mpsc::UnboundedSender<SinkMessage>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl DiscordPresence {
    /// Connect to the local Discord client and wait for the handshake.
    ///
    /// Fails if Discord is not running or does not answer in time.
    pub async fn connect(app_id: &str) -> Result<Self> {
        let app_id: i64 = app_id
            .trim()
            .parse()
            .map_err(|_| Error::InvalidAppId(app_id.to_string()))?;

        let (wheel, handler) = Wheel::new(Box::new(|err| {
            tracing::warn!("Discord error: {:?}", err);
        }));

        let mut user_spoke = wheel.user();

        let discord = Discord::new(app_id, Subscriptions::ACTIVITY, Box::new(handler))
            .map_err(|e| Error::SinkUnavailable(format!("{:?}", e)))?;

        tracing::info!("Discord connecting...");

        let user = tokio::time::timeout(HANDSHAKE_TIMEOUT, async {
            if user_spoke.0.changed().await.is_err() {
                return Err(Error::SinkUnavailable(
                    "Discord connection closed".to_string(),
                ));
            }
            match &*user_spoke.0.borrow() {
                UserState::Connected(user) => Ok(user.clone()),
                UserState::Disconnected(err) => Err(Error::SinkUnavailable(format!(
                    "Discord disconnected: {:?}",
                    err
                ))),
            }
        })
        .await
        .map_err(|_| Error::SinkTimeout)??;

        tracing::info!("Discord Rich Presence connected as {}", user.username);

        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(Self::run_discord_task(discord, update_rx));

        Ok(Self {
            update_tx,
            task: Mutex::new(Some(task)),
        })
    }

    /// Background task that applies queued presence updates
    async fn run_discord_task(
        discord: Discord,
        mut update_rx: mpsc::UnboundedReceiver<SinkMessage>,
    ) {
        while let Some(message) = update_rx.recv().await {
            match message {
                SinkMessage::Update(state) => {
                    if let Err(e) = discord.update_activity(activity_for(&state)).await {
                        tracing::debug!("Failed to update Discord activity: {:?}", e);
                    }
                }
                SinkMessage::Shutdown => break,
            }
        }

        if let Err(e) = discord.clear_activity().await {
            tracing::debug!("Failed to clear Discord activity: {:?}", e);
        }
        discord.disconnect().await;
        tracing::info!("Discord Rich Presence disconnected");
    }
}

fn activity_for(state: &PresentationState) -> ActivityBuilder {
    let mut assets = Assets::default().large(
        state.large_image_key.as_str(),
        Some(state.large_image_text.as_str()),
    );
    if let Some(key) = &state.small_image_key {
        assets = assets.small(key.as_str(), state.small_image_text.as_deref());
    }

    ActivityBuilder::new()
        .details(state.headline.as_str())
        .state(state.subline.as_str())
        .start_timestamp(state.session_start)
        .assets(assets)
}

impl PresenceSink for DiscordPresence {
    fn name(&self) -> &'static str {
        "Discord"
    }

    fn publish(&self, state: &PresentationState) {
        let _ = self.update_tx.send(SinkMessage::Update(state.clone()));
    }

    async fn shutdown(&self) {
        let _ = self.update_tx.send(SinkMessage::Shutdown);

        let task = match self.task.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::warn!("Discord task ended abnormally: {}", e);
            }
        }
    }
}
