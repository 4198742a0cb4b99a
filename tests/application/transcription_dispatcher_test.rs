use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use whisperdesk::application::ports::{ProviderError, ProviderErrorKind};
use whisperdesk::application::services::TranscriptionDispatcher;
use whisperdesk::domain::{LanguageHint, MediaExtension, UploadId, UploadedMedia};

use crate::support::{Behavior, ScriptedProvider, sample_result};

fn media() -> UploadedMedia {
    UploadedMedia {
        id: UploadId::new(),
        raw_filename: "talk.mp3".to_string(),
        sanitized_filename: "talk.mp3".to_string(),
        extension: MediaExtension::new("mp3"),
        size_bytes: 4,
        storage_path: PathBuf::from("/nonexistent/talk.mp3"),
    }
}

#[tokio::test]
async fn given_remote_success_when_dispatching_then_local_is_never_called() {
    let remote = ScriptedProvider::new("remote", Behavior::Succeed(sample_result("remote")));
    let local = ScriptedProvider::new("local", Behavior::Succeed(sample_result("local")));
    let local_calls = local.calls();
    let dispatcher =
        TranscriptionDispatcher::new(Some(Arc::new(remote)), Arc::new(local), Duration::from_secs(5));

    let result = dispatcher.dispatch(&media(), &LanguageHint::Auto).await.unwrap();

    assert_eq!(result.full_text, "remote");
    assert_eq!(local_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn given_remote_payload_too_large_when_dispatching_then_falls_back_to_local() {
    let remote = ScriptedProvider::new(
        "remote",
        Behavior::Fail(ProviderError::payload_too_large("too big")),
    );
    let local = ScriptedProvider::new("local", Behavior::Succeed(sample_result("local")));
    let local_calls = local.calls();
    let dispatcher =
        TranscriptionDispatcher::new(Some(Arc::new(remote)), Arc::new(local), Duration::from_secs(5));

    let result = dispatcher.dispatch(&media(), &LanguageHint::Auto).await.unwrap();

    assert_eq!(result.full_text, "local");
    assert_eq!(local_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn given_both_providers_fail_when_dispatching_then_local_error_is_surfaced() {
    let remote = ScriptedProvider::new("remote", Behavior::Fail(ProviderError::upstream("remote down")));
    let local = ScriptedProvider::new("local", Behavior::Fail(ProviderError::upstream("local broke")));
    let dispatcher =
        TranscriptionDispatcher::new(Some(Arc::new(remote)), Arc::new(local), Duration::from_secs(5));

    let err = dispatcher
        .dispatch(&media(), &LanguageHint::Auto)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ProviderErrorKind::Upstream);
    assert_eq!(err.message, "local broke");
}

#[tokio::test]
async fn given_remote_disabled_when_dispatching_then_goes_straight_to_local() {
    let local = ScriptedProvider::new("local", Behavior::Succeed(sample_result("local")));
    let local_calls = local.calls();
    let dispatcher = TranscriptionDispatcher::new(None, Arc::new(local), Duration::from_secs(5));

    let result = dispatcher.dispatch(&media(), &LanguageHint::Auto).await;

    assert!(result.is_ok());
    assert!(!dispatcher.remote_enabled());
    assert_eq!(local_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn given_hanging_providers_when_dispatching_then_times_out_within_budget() {
    let remote = ScriptedProvider::new("remote", Behavior::Hang);
    let local = ScriptedProvider::new("local", Behavior::Hang);
    let dispatcher = TranscriptionDispatcher::new(
        Some(Arc::new(remote)),
        Arc::new(local),
        Duration::from_millis(200),
    );

    let started = Instant::now();
    let err = dispatcher
        .dispatch(&media(), &LanguageHint::Auto)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ProviderErrorKind::Timeout);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn given_remote_hangs_when_dispatching_then_timeout_does_not_trigger_fallback() {
    let remote = ScriptedProvider::new("remote", Behavior::Hang);
    let local = ScriptedProvider::new("local", Behavior::Succeed(sample_result("local")));
    let local_calls = local.calls();
    let dispatcher = TranscriptionDispatcher::new(
        Some(Arc::new(remote)),
        Arc::new(local),
        Duration::from_millis(100),
    );

    let err = dispatcher
        .dispatch(&media(), &LanguageHint::Auto)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ProviderErrorKind::Timeout);
    assert_eq!(local_calls.load(Ordering::SeqCst), 0);
}
