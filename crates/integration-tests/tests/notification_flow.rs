//! Push messages forwarded to the local-notification display.

use serde_json::json;

use plateful_app::providers::PushMessage;
use plateful_integration_tests::Harness;

#[tokio::test]
async fn test_forwards_pushes_on_the_configured_channel() {
    let harness = Harness::new();
    let state = &harness.state;

    let forwarder = state.notification_forwarder();
    let mut messages = forwarder.init().await;
    assert_eq!(harness.notifier.channel_ids(), ["default-channel-id"]);

    harness.push.push(PushMessage {
        title: Some("Order up".to_owned()),
        body: Some("Table 4".to_owned()),
        data: json!({ "order": 17 }),
    });
    harness.push.push(PushMessage {
        title: None,
        body: None,
        data: json!({ "silent": true }),
    });

    while let Some(message) = messages.try_recv() {
        forwarder.forward(&message).await;
    }

    // The data-only message is skipped; titles/bodies pass through as-is.
    let displayed = harness.notifier.displayed();
    assert_eq!(displayed.len(), 1);
    assert_eq!(displayed[0].channel_id, "default-channel-id");
    assert_eq!(displayed[0].title, "Order up");
    assert_eq!(displayed[0].body, "Table 4");
}

#[tokio::test]
async fn test_message_subscription_is_released_with_its_scope() {
    let harness = Harness::new();
    let state = &harness.state;

    {
        let forwarder = state.notification_forwarder();
        let _messages = forwarder.init().await;
        assert_eq!(harness.push.live_subscriptions(), 1);
    }
    assert_eq!(harness.push.live_subscriptions(), 0);
}
