//! End-to-end broker behavior over real storage and surface adapters.

use std::sync::Arc;

use bridge_desktop::{ChannelSurfaceHost, MemorySessionStore, SqliteSettingsStore};
use bridge_traits::time::SystemClock;
use bridge_traits::SurfaceHost;
use core_broker::{BrokerError, BrokerHandle, PageId, SyncBroker};
use core_classifier::Observation;
use core_playlist::PlaylistStore;
use core_runtime::events::{CoreEvent, EventBus, QueueEvent, Receiver};

struct Harness {
    handle: BrokerHandle,
    surfaces: Arc<ChannelSurfaceHost>,
    bus: EventBus,
}

async fn harness() -> Harness {
    harness_with_cap(50).await
}

async fn harness_with_cap(max_len: usize) -> Harness {
    let store = PlaylistStore::new(
        Arc::new(MemorySessionStore::new()),
        Arc::new(SqliteSettingsStore::in_memory().await.unwrap()),
        max_len,
    );
    let surfaces = Arc::new(ChannelSurfaceHost::new());
    let bus = EventBus::new(64);
    let handle = SyncBroker::spawn(
        store,
        surfaces.clone(),
        Arc::new(SystemClock),
        bus.clone(),
        16,
    );
    Harness {
        handle,
        surfaces,
        bus,
    }
}

fn manifest_observation(url: &str) -> Observation {
    Observation::network(url, Some("application/x-mpegurl".to_string()))
}

async fn next_queue_event(rx: &mut Receiver<CoreEvent>) -> QueueEvent {
    loop {
        match rx.recv().await.unwrap() {
            CoreEvent::Queue(event) => return event,
            _ => continue,
        }
    }
}

#[tokio::test]
async fn observed_stream_is_addable_by_page() {
    let h = harness().await;
    let page = PageId::from("tab-1");

    h.handle
        .observe_response(
            page.clone(),
            manifest_observation("https://cdn.e.com/live.m3u8"),
            200,
        )
        .await
        .unwrap();

    let outcome = h.handle.add_to_queue(None, Some(page.clone())).await.unwrap();
    assert!(outcome.added);
    assert_eq!(outcome.entry.url, "https://cdn.e.com/live.m3u8");

    let snapshot = h.handle.snapshot(Some(page)).await.unwrap();
    assert_eq!(snapshot.count, 1);
    assert!(snapshot.candidate.is_some());
}

#[tokio::test]
async fn add_without_observation_is_rejected() {
    let h = harness().await;
    let err = h
        .handle
        .add_to_queue(None, Some(PageId::from("tab-9")))
        .await
        .unwrap_err();
    assert!(matches!(err, BrokerError::Rejected(_)));
}

#[tokio::test]
async fn non_success_responses_are_ignored() {
    let h = harness().await;
    let page = PageId::from("tab-1");

    h.handle
        .observe_response(
            page.clone(),
            manifest_observation("https://cdn.e.com/gone.m3u8"),
            404,
        )
        .await
        .unwrap();

    let err = h.handle.add_to_queue(None, Some(page)).await.unwrap_err();
    assert!(matches!(err, BrokerError::Rejected(_)));
}

#[tokio::test]
async fn last_observation_wins_per_page() {
    let h = harness().await;
    let page = PageId::from("tab-1");

    for url in ["https://cdn.e.com/a.m3u8", "https://cdn.e.com/b.m3u8"] {
        h.handle
            .observe_response(page.clone(), manifest_observation(url), 200)
            .await
            .unwrap();
    }

    let outcome = h.handle.add_to_queue(None, Some(page)).await.unwrap();
    assert_eq!(outcome.entry.url, "https://cdn.e.com/b.m3u8");
}

#[tokio::test]
async fn page_close_evicts_the_cached_candidate() {
    let h = harness().await;
    let page = PageId::from("tab-1");

    h.handle
        .observe_response(
            page.clone(),
            manifest_observation("https://cdn.e.com/live.m3u8"),
            200,
        )
        .await
        .unwrap();
    h.handle.page_closed(page.clone()).await.unwrap();

    let err = h.handle.add_to_queue(None, Some(page)).await.unwrap_err();
    assert!(matches!(err, BrokerError::Rejected(_)));
}

#[tokio::test]
async fn duplicate_add_reports_the_existing_entry() {
    let h = harness().await;
    let page = PageId::from("tab-1");

    h.handle
        .observe_response(
            page.clone(),
            manifest_observation("https://cdn.e.com/live.m3u8"),
            200,
        )
        .await
        .unwrap();

    let first = h.handle.add_to_queue(None, Some(page.clone())).await.unwrap();
    let second = h.handle.add_to_queue(None, Some(page)).await.unwrap();

    assert!(first.added);
    assert!(!second.added);
    assert_eq!(second.entry.id, first.entry.id);
}

#[tokio::test]
async fn play_now_prepends_selects_and_surfaces() {
    let h = harness().await;
    let page_a = PageId::from("tab-1");
    let page_b = PageId::from("tab-2");

    h.handle
        .observe_response(
            page_a.clone(),
            manifest_observation("https://cdn.e.com/a.m3u8"),
            200,
        )
        .await
        .unwrap();
    h.handle
        .observe_response(
            page_b.clone(),
            manifest_observation("https://cdn.e.com/b.m3u8"),
            200,
        )
        .await
        .unwrap();

    h.handle.add_to_queue(None, Some(page_a)).await.unwrap();
    let outcome = h.handle.play_now(None, Some(page_b)).await.unwrap();
    assert!(outcome.added);

    let snapshot = h.handle.snapshot(None).await.unwrap();
    assert_eq!(snapshot.current_index, 0);
    assert_eq!(snapshot.entries[0].url, "https://cdn.e.com/b.m3u8");

    // A surface was opened and got the play_now push.
    let id = h.surfaces.focused().expect("surface opened");
    let mut rx = h.surfaces.take_receiver(id).unwrap();
    let push = rx.recv().await.unwrap();
    assert_eq!(push.command, "play_now");
}

#[tokio::test]
async fn play_now_of_a_duplicate_selects_it() {
    let h = harness().await;
    let page = PageId::from("tab-1");

    h.handle
        .observe_response(
            page.clone(),
            manifest_observation("https://cdn.e.com/a.m3u8"),
            200,
        )
        .await
        .unwrap();
    h.handle.add_to_queue(None, Some(page.clone())).await.unwrap();

    h.handle
        .observe_response(
            page.clone(),
            manifest_observation("https://cdn.e.com/b.m3u8"),
            200,
        )
        .await
        .unwrap();
    h.handle.add_to_queue(None, Some(page.clone())).await.unwrap();

    // Re-observe the first stream and queue-jump it.
    h.handle
        .observe_response(
            page.clone(),
            manifest_observation("https://cdn.e.com/a.m3u8"),
            200,
        )
        .await
        .unwrap();
    let outcome = h.handle.play_now(None, Some(page)).await.unwrap();
    assert!(!outcome.added);

    let snapshot = h.handle.snapshot(None).await.unwrap();
    assert_eq!(snapshot.count, 2);
    assert_eq!(snapshot.current_index, 0);
}

#[tokio::test]
async fn remove_reclamps_the_current_index() {
    let h = harness().await;
    let page = PageId::from("tab-1");

    for url in [
        "https://cdn.e.com/a.m3u8",
        "https://cdn.e.com/b.m3u8",
        "https://cdn.e.com/c.m3u8",
    ] {
        h.handle
            .observe_response(page.clone(), manifest_observation(url), 200)
            .await
            .unwrap();
        h.handle.add_to_queue(None, Some(page.clone())).await.unwrap();
    }
    h.handle.set_current_index(2).await.unwrap();

    let snapshot = h.handle.snapshot(None).await.unwrap();
    let last = snapshot.entries[2].id;
    let outcome = h.handle.remove_by_id(last).await.unwrap();

    assert!(outcome.removed);
    assert_eq!(outcome.remaining.len(), 2);
    assert_eq!(outcome.current_index, 1);
}

#[tokio::test]
async fn remove_absent_id_succeeds_unchanged() {
    let h = harness().await;
    let outcome = h
        .handle
        .remove_by_id(core_playlist::EntryId::new())
        .await
        .unwrap();
    assert!(!outcome.removed);
    assert!(outcome.remaining.is_empty());
}

#[tokio::test]
async fn set_index_out_of_range_is_rejected() {
    let h = harness().await;
    let err = h.handle.set_current_index(0).await.unwrap_err();
    assert!(matches!(err, BrokerError::Rejected(_)));
}

#[tokio::test]
async fn badge_count_follows_committed_mutations() {
    let h = harness().await;
    let mut events = h.bus.subscribe();
    let page = PageId::from("tab-1");

    h.handle
        .observe_response(
            page.clone(),
            manifest_observation("https://cdn.e.com/a.m3u8"),
            200,
        )
        .await
        .unwrap();
    h.handle.add_to_queue(None, Some(page)).await.unwrap();

    loop {
        if let QueueEvent::BadgeChanged { count } = next_queue_event(&mut events).await {
            assert_eq!(count, 1);
            break;
        }
    }

    h.handle.clear_queue().await.unwrap();
    loop {
        if let QueueEvent::BadgeChanged { count } = next_queue_event(&mut events).await {
            assert_eq!(count, 0);
            break;
        }
    }
}

#[tokio::test]
async fn queue_cap_is_surfaced_as_rejection() {
    let h = harness_with_cap(1).await;
    let page = PageId::from("tab-1");

    h.handle
        .observe_response(
            page.clone(),
            manifest_observation("https://cdn.e.com/a.m3u8"),
            200,
        )
        .await
        .unwrap();
    h.handle.add_to_queue(None, Some(page.clone())).await.unwrap();

    h.handle
        .observe_response(
            page.clone(),
            manifest_observation("https://cdn.e.com/b.m3u8"),
            200,
        )
        .await
        .unwrap();
    let err = h.handle.add_to_queue(None, Some(page)).await.unwrap_err();
    assert!(matches!(err, BrokerError::Rejected(m) if m.contains("full")));
}

#[tokio::test]
async fn dead_surface_reference_is_dropped_silently() {
    let h = harness().await;
    let page = PageId::from("tab-1");

    h.handle
        .observe_response(
            page.clone(),
            manifest_observation("https://cdn.e.com/a.m3u8"),
            200,
        )
        .await
        .unwrap();
    h.handle.play_now(None, Some(page.clone())).await.unwrap();

    // Close the surface by dropping its receiver.
    let id = h.surfaces.focused().unwrap();
    drop(h.surfaces.take_receiver(id));

    // The next mutation still succeeds; the failed push is swallowed.
    h.handle
        .observe_response(
            page.clone(),
            manifest_observation("https://cdn.e.com/b.m3u8"),
            200,
        )
        .await
        .unwrap();
    let outcome = h.handle.add_to_queue(None, Some(page.clone())).await.unwrap();
    assert!(outcome.added);

    // And a later play_now opens a fresh surface.
    h.handle
        .observe_response(
            page.clone(),
            manifest_observation("https://cdn.e.com/c.m3u8"),
            200,
        )
        .await
        .unwrap();
    h.handle.play_now(None, Some(page)).await.unwrap();
    let fresh = h.surfaces.focused().expect("new surface opened");
    assert_ne!(fresh, id);
    assert!(h.surfaces.is_alive(fresh).await);
}

#[tokio::test]
async fn registered_surface_receives_notifications() {
    let h = harness().await;
    let id = {
        use bridge_traits::surface::SurfaceHost;
        h.surfaces.open().await.unwrap()
    };
    let mut rx = h.surfaces.take_receiver(id).unwrap();
    h.handle.register_surface(id).await.unwrap();

    let page = PageId::from("tab-1");
    h.handle
        .observe_response(
            page.clone(),
            manifest_observation("https://cdn.e.com/a.m3u8"),
            200,
        )
        .await
        .unwrap();
    h.handle.add_to_queue(None, Some(page)).await.unwrap();

    let push = rx.recv().await.unwrap();
    assert_eq!(push.command, "added");
}

#[tokio::test]
async fn segment_capture_is_refused() {
    let h = harness().await;
    let err = h
        .handle
        .capture_segment(PageId::from("tab-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, BrokerError::Rejected(m) if m.contains("disabled")));
}

#[tokio::test]
async fn media_element_observation_classifies_too() {
    let h = harness().await;
    let page = PageId::from("tab-1");

    h.handle
        .observe_media(
            page.clone(),
            Observation::media_element(
                "https://cdn.e.com/clip.mp4",
                Some("Cats at play".to_string()),
            ),
        )
        .await
        .unwrap();

    let outcome = h.handle.add_to_queue(None, Some(page)).await.unwrap();
    assert!(outcome.added);
    assert_eq!(outcome.entry.title, "Cats at play");
}
