//! Session gate behavior wired to the auth provider's live stream.

use std::time::Duration;

use tokio::time::timeout;

use plateful_app::cart::Product;
use plateful_app::providers::{AuthProvider, SessionEvent};
use plateful_app::session::{ScreenGroup, SessionState};
use plateful_core::{ItemId, SessionToken};
use plateful_integration_tests::Harness;

/// Wait for the next gate transition, bounded so a wiring bug fails the
/// test instead of hanging it.
async fn next_state(
    watcher: &mut tokio::sync::watch::Receiver<SessionState>,
) -> SessionState {
    timeout(Duration::from_secs(1), watcher.changed())
        .await
        .expect("gate transition within a second")
        .expect("gate alive");
    watcher.borrow_and_update().clone()
}

#[tokio::test]
async fn test_cold_start_without_token_lands_on_auth_screens() {
    let harness = Harness::new();
    let gate = harness.state.gate();

    // Before the startup check completes no screen group is selected.
    assert_eq!(gate.screen_group(), None);

    gate.resolve().await;
    assert!(gate.is_resolved());
    assert_eq!(gate.screen_group(), Some(ScreenGroup::Auth));
}

#[tokio::test]
async fn test_cold_start_with_cached_token_lands_on_main_screens() {
    let harness = Harness::with_cached_token("tok-cached");
    let gate = harness.state.gate();

    gate.resolve().await;
    assert_eq!(
        gate.state(),
        SessionState::Authenticated(SessionToken::new("tok-cached"))
    );
    assert_eq!(gate.screen_group(), Some(ScreenGroup::Main));
}

#[tokio::test]
async fn test_sign_in_and_sign_out_drive_the_gate() {
    let harness = Harness::with_user("owner@diner.example", "hunter2");
    let state = harness.state.clone();

    state.gate().resolve().await;
    let mut watcher = state.gate().subscribe();
    watcher.borrow_and_update();

    // Drive the gate from the provider's live stream, as the app shell does.
    let events = state.auth_provider().subscribe_session_changes();
    let runner = state.clone();
    let gate_task = tokio::spawn(async move { runner.gate().run(events).await });

    state
        .auth_service()
        .sign_in("owner@diner.example", "hunter2")
        .await
        .expect("sign in");
    assert!(matches!(
        next_state(&mut watcher).await,
        SessionState::Authenticated(_)
    ));
    assert!(harness.storage.peek("token").is_some());

    state.auth_service().sign_out().await.expect("sign out");
    assert_eq!(next_state(&mut watcher).await, SessionState::Unauthenticated);
    assert_eq!(harness.storage.peek("token"), None);

    gate_task.abort();
}

#[tokio::test]
async fn test_established_then_cleared_ends_unauthenticated() {
    let harness = Harness::new();
    let gate = harness.state.gate();
    gate.resolve().await;

    let mut events = harness.auth.subscribe_session_changes();
    harness
        .auth
        .emit(SessionEvent::Established(SessionToken::new("tok-1")));
    harness.auth.emit(SessionEvent::Cleared);

    // Both events were already in flight; apply them in delivery order.
    while let Some(event) = events.try_recv() {
        gate.apply(event).await;
    }
    assert_eq!(gate.state(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn test_gate_run_releases_its_subscription_on_exit() {
    let harness = Harness::with_user("owner@diner.example", "hunter2");
    let state = harness.state.clone();
    state.gate().resolve().await;

    let events = state.auth_provider().subscribe_session_changes();
    assert_eq!(harness.auth.live_subscriptions(), 1);

    let runner = state.clone();
    let gate_task = tokio::spawn(async move { runner.gate().run(events).await });
    gate_task.abort();
    let _ = gate_task.await;

    // Abort is an error exit path; the subscription must still be released.
    assert_eq!(harness.auth.live_subscriptions(), 0);
}

#[tokio::test]
async fn test_cart_survives_sign_out() {
    let harness = Harness::with_user("owner@diner.example", "hunter2");
    let state = &harness.state;
    state.gate().resolve().await;

    state
        .auth_service()
        .sign_in("owner@diner.example", "hunter2")
        .await
        .expect("sign in");
    state.cart(|cart| {
        cart.add_item(Product {
            id: ItemId::new("A"),
            title: "Soup".to_owned(),
            price: "4.50".parse().expect("price"),
            presentation: serde_json::Value::Null,
        });
    });

    state.auth_service().sign_out().await.expect("sign out");

    // Reference behavior: sign-out does not clear the cart.
    assert_eq!(state.cart(|cart| cart.lines().len()), 1);
}
