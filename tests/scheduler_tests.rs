//! Refresh timer behavior on tokio's paused clock.

mod auth_support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use stanza::auth::RefreshScheduler;

use auth_support::jwt_expiring_in;

fn counting_callback(
    count: &Arc<AtomicUsize>,
) -> impl FnOnce() -> std::future::Ready<()> + Send + 'static {
    let count = count.clone();
    move || {
        count.fetch_add(1, Ordering::SeqCst);
        std::future::ready(())
    }
}

/// Let woken timer tasks run. Moves the paused clock by at most 1ms.
async fn settle() {
    for _ in 0..3 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(1)).await;
    for _ in 0..3 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn fires_five_minutes_before_expiry() {
    let scheduler = RefreshScheduler::new();
    let fired = Arc::new(AtomicUsize::new(0));

    assert!(scheduler.schedule_refresh(&jwt_expiring_in(600), counting_callback(&fired)));
    assert!(scheduler.is_armed());

    tokio::time::advance(Duration::from_secs(290)).await;
    settle().await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);

    tokio::time::advance(Duration::from_secs(15)).await;
    settle().await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!(!scheduler.is_armed());
}

#[tokio::test(start_paused = true)]
async fn token_inside_lead_window_fires_immediately() {
    let scheduler = RefreshScheduler::new();
    let fired = Arc::new(AtomicUsize::new(0));

    assert!(scheduler.schedule_refresh(&jwt_expiring_in(60), counting_callback(&fired)));
    settle().await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    let expired = Arc::new(AtomicUsize::new(0));
    assert!(scheduler.schedule_refresh(&jwt_expiring_in(-3600), counting_callback(&expired)));
    settle().await;
    assert_eq!(expired.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn rescheduling_replaces_the_pending_timer() {
    let scheduler = RefreshScheduler::new();
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));

    scheduler.schedule_refresh(&jwt_expiring_in(900), counting_callback(&first));
    scheduler.schedule_refresh(&jwt_expiring_in(900), counting_callback(&second));

    tokio::time::advance(Duration::from_secs(1200)).await;
    settle().await;
    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn cancel_is_idempotent_and_prevents_firing() {
    let scheduler = RefreshScheduler::new();
    let fired = Arc::new(AtomicUsize::new(0));

    scheduler.schedule_refresh(&jwt_expiring_in(600), counting_callback(&fired));
    scheduler.cancel();
    scheduler.cancel();
    assert!(!scheduler.is_armed());
    assert!(scheduler.deadline().is_none());

    tokio::time::advance(Duration::from_secs(3600)).await;
    settle().await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn malformed_token_cancels_previous_and_schedules_nothing() {
    let scheduler = RefreshScheduler::new();
    let fired = Arc::new(AtomicUsize::new(0));

    scheduler.schedule_refresh(&jwt_expiring_in(600), counting_callback(&fired));
    assert!(!scheduler.schedule_refresh("not.a-jwt", counting_callback(&fired)));
    assert!(!scheduler.is_armed());

    tokio::time::advance(Duration::from_secs(3600)).await;
    settle().await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn callback_may_reschedule_itself() {
    let scheduler = Arc::new(RefreshScheduler::new());
    let fired = Arc::new(AtomicUsize::new(0));

    let inner = scheduler.clone();
    let count = fired.clone();
    scheduler.schedule_refresh(&jwt_expiring_in(60), move || async move {
        count.fetch_add(1, Ordering::SeqCst);
        inner.schedule_refresh(&jwt_expiring_in(900), || async {});
    });
    settle().await;

    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!(scheduler.is_armed());
}

#[tokio::test(start_paused = true)]
async fn dropping_scheduler_aborts_pending_timer() {
    let fired = Arc::new(AtomicUsize::new(0));
    {
        let scheduler = RefreshScheduler::new();
        scheduler.schedule_refresh(&jwt_expiring_in(600), counting_callback(&fired));
    }
    tokio::time::advance(Duration::from_secs(3600)).await;
    settle().await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}
