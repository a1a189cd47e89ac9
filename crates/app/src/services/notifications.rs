//! Push-notification forwarding.
//!
//! The core does not interpret push payloads: it ensures the notification
//! channel exists, then forwards each incoming message's title and body to
//! the local-notification display. Permission and registration-token
//! failures are logged and never fatal; message delivery is entirely the
//! messaging service's concern.

use crate::providers::{
    LocalNotification, LocalNotifier, NotificationChannel, PushMessage, PushSource, Subscription,
};

/// Forwards push messages to the local-notification display.
///
/// Borrowing wrapper; construct one per scope from [`crate::state::AppState`].
pub struct NotificationForwarder<'a> {
    source: &'a dyn PushSource,
    notifier: &'a dyn LocalNotifier,
    channel: &'a NotificationChannel,
}

impl<'a> NotificationForwarder<'a> {
    /// Create a new forwarder.
    #[must_use]
    pub const fn new(
        source: &'a dyn PushSource,
        notifier: &'a dyn LocalNotifier,
        channel: &'a NotificationChannel,
    ) -> Self {
        Self {
            source,
            notifier,
            channel,
        }
    }

    /// One-time setup: create the channel, request display permission, and
    /// log the registration token.
    ///
    /// Every step is best-effort; a denied permission or unreachable
    /// messaging service only costs notifications, never the session.
    pub async fn init(&self) -> Subscription<PushMessage> {
        if let Err(error) = self.notifier.ensure_channel(self.channel).await {
            tracing::warn!(%error, channel = %self.channel.id, "channel creation failed");
        }

        match self.source.request_permission().await {
            Ok(true) => tracing::debug!("notification permission granted"),
            Ok(false) => tracing::info!("notification permission denied"),
            Err(error) => tracing::warn!(%error, "notification permission request failed"),
        }

        match self.source.registration_token().await {
            Ok(token) => tracing::debug!(%token, "push registration token"),
            Err(error) => tracing::warn!(%error, "push registration token fetch failed"),
        }

        self.source.subscribe_messages()
    }

    /// Forward messages until the stream closes.
    ///
    /// Messages with neither title nor body are skipped; display failures
    /// are logged and the loop continues. The subscription is dropped on
    /// return, releasing the source-side registration.
    pub async fn run(&self, mut messages: Subscription<PushMessage>) {
        while let Some(message) = messages.recv().await {
            self.forward(&message).await;
        }
        tracing::debug!("push message stream closed");
    }

    /// Forward a single message.
    pub async fn forward(&self, message: &PushMessage) {
        if message.title.is_none() && message.body.is_none() {
            tracing::debug!("skipping push message with no displayable content");
            return;
        }

        let notification = LocalNotification {
            channel_id: self.channel.id.clone(),
            title: message.title.clone().unwrap_or_default(),
            body: message.body.clone().unwrap_or_default(),
        };

        if let Err(error) = self.notifier.display(&notification).await {
            tracing::warn!(%error, "local notification display failed");
        }
    }
}
