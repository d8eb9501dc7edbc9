// Unit tests for the unauthenticated escape hatch
// Tests once-per-event firing, return-location memory, and re-arming

use crate::api::redirect::{NavigationSignal, SigninRedirect, is_auth_entry};

/// **VALUE**: Verifies the hatch fires at most once until re-armed.
///
/// **WHY THIS MATTERS**: Two in-flight calls returning 401 concurrently must
/// produce one navigation signal, not a redirect loop.
///
/// **BUG THIS CATCHES**: Would catch the pending flag being checked and set
/// non-atomically.
#[test]
fn given_fired_hatch_when_triggering_again_then_no_second_fire() {
    let redirect = SigninRedirect::new();

    assert!(redirect.trigger());
    assert!(!redirect.trigger());
    assert!(redirect.is_pending());
}

/// **VALUE**: Verifies subscribers observe the signal.
#[tokio::test]
async fn given_subscriber_when_hatch_fires_then_signal_received() {
    let redirect = SigninRedirect::new();
    let mut rx = redirect.subscribe();

    assert_eq!(*rx.borrow(), NavigationSignal::Idle);
    redirect.trigger();

    rx.changed().await.expect("sender should be alive");
    assert_eq!(*rx.borrow(), NavigationSignal::SigninRequired);
}

/// **VALUE**: Verifies the interrupted location is remembered for one
/// round-trip.
///
/// **WHY THIS MATTERS**: After re-authenticating, the user lands back where
/// the session died instead of at the dashboard.
#[test]
fn given_protected_location_when_hatch_fires_then_location_remembered_once() {
    let redirect = SigninRedirect::new();
    redirect.set_location("/chat");

    redirect.trigger();

    assert_eq!(redirect.take_return_location().as_deref(), Some("/chat"));
    // Consumed - a second take finds nothing.
    assert!(redirect.take_return_location().is_none());
}

/// **VALUE**: Verifies auth entry pages are never remembered.
///
/// **WHY THIS MATTERS**: Remembering /signin as the return location would
/// bounce a freshly signed-in user straight back to the sign-in form.
#[test]
fn given_auth_entry_location_when_hatch_fires_then_nothing_remembered() {
    let redirect = SigninRedirect::new();
    redirect.set_location("/signin");

    redirect.trigger();

    assert!(redirect.take_return_location().is_none());
}

/// **VALUE**: Verifies re-arming permits the next redirect-worthy event.
#[test]
fn given_rearmed_hatch_when_triggering_then_fires_again() {
    let redirect = SigninRedirect::new();

    assert!(redirect.trigger());
    redirect.rearm();
    assert!(!redirect.is_pending());
    assert!(redirect.trigger());
}

/// **VALUE**: Verifies explicit sign-out navigation drops any stale return
/// location.
#[test]
fn given_remembered_location_when_requesting_signin_then_return_dropped() {
    let redirect = SigninRedirect::new();
    redirect.set_location("/dashboard");
    redirect.trigger();

    redirect.request_signin();

    assert!(redirect.take_return_location().is_none());
}

/// **VALUE**: Verifies the auth-entry predicate covers exactly both entry
/// pages.
#[test]
fn given_paths_when_checking_auth_entry_then_only_entry_pages_match() {
    assert!(is_auth_entry("/signin"));
    assert!(is_auth_entry("/signup"));
    assert!(!is_auth_entry("/dashboard"));
    assert!(!is_auth_entry("/"));
}
