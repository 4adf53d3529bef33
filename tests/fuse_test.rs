use spotifuse::fuse::{plan_batches, validate, FuseError};
use spotifuse::spotify::client::{UnauthorizedAction, on_unauthorized};
use spotifuse::types::{Album, AlbumArtist, AlbumSelection, PlaylistDraft, Session};

// Helper function to create a test album
fn create_test_album(id: &str, name: &str, artist_name: &str) -> Album {
    Album {
        id: id.to_string(),
        name: name.to_string(),
        artists: vec![AlbumArtist {
            name: artist_name.to_string(),
        }],
        images: vec![],
    }
}

fn create_test_draft(name: &str) -> PlaylistDraft {
    PlaylistDraft {
        name: name.to_string(),
        description: "a test playlist".to_string(),
        is_public: false,
    }
}

fn uris(prefix: &str, count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("spotify:track:{}{}", prefix, i))
        .collect()
}

#[test]
fn test_selection_deduplicates_by_id() {
    let mut selection = AlbumSelection::new();

    assert!(selection.insert(create_test_album("id1", "Album 1", "Artist A")));
    assert!(!selection.insert(create_test_album("id1", "Album 1 Duplicate", "Artist A")));

    // Same id twice results in a set of size 1
    assert_eq!(selection.len(), 1);

    // The first occurrence keeps its place and its data
    let names: Vec<&str> = selection.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Album 1"]);
}

#[test]
fn test_selection_preserves_insertion_order() {
    let mut selection = AlbumSelection::new();
    selection.insert(create_test_album("id2", "Second Pick", "Artist B"));
    selection.insert(create_test_album("id1", "First Pick", "Artist A"));
    selection.insert(create_test_album("id3", "Third Pick", "Artist C"));

    let ids: Vec<&str> = selection.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["id2", "id1", "id3"]);
}

#[test]
fn test_selection_remove() {
    let mut selection = AlbumSelection::new();
    selection.insert(create_test_album("id1", "Album 1", "Artist A"));
    selection.insert(create_test_album("id2", "Album 2", "Artist B"));

    assert!(selection.remove("id1"));
    assert!(!selection.remove("id1"));
    assert_eq!(selection.len(), 1);

    // A removed id can be selected again
    assert!(selection.insert(create_test_album("id1", "Album 1", "Artist A")));
}

#[test]
fn test_validate_rejects_fewer_than_two_albums() {
    let draft = create_test_draft("Mix");
    let mut selection = AlbumSelection::new();
    selection.insert(create_test_album("id1", "Album 1", "Artist A"));

    let result = validate(&draft, &selection);
    assert!(matches!(result, Err(FuseError::Validation(_))));

    // Two albums pass
    selection.insert(create_test_album("id2", "Album 2", "Artist B"));
    assert!(validate(&draft, &selection).is_ok());
}

#[test]
fn test_validate_rejects_empty_name() {
    let mut selection = AlbumSelection::new();
    selection.insert(create_test_album("id1", "Album 1", "Artist A"));
    selection.insert(create_test_album("id2", "Album 2", "Artist B"));

    let result = validate(&create_test_draft("   "), &selection);
    assert!(matches!(result, Err(FuseError::Validation(_))));
}

#[test]
fn test_plan_batches_respects_provider_ceiling() {
    // 3 albums with 40, 60 and 30 tracks: 130 URIs total
    let mut all: Vec<String> = Vec::new();
    all.extend(uris("a", 40));
    all.extend(uris("b", 60));
    all.extend(uris("c", 30));

    let batches = plan_batches(&all);

    // Exactly 2 batch calls: 100 + 30
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].len(), 100);
    assert_eq!(batches[1].len(), 30);

    // No reordering: the batches are the concatenation, split
    let rejoined: Vec<String> = batches.concat();
    assert_eq!(rejoined, all);
}

#[test]
fn test_plan_batches_edge_sizes() {
    assert_eq!(plan_batches(&[]).len(), 0);
    assert_eq!(plan_batches(&uris("a", 100)).len(), 1);
    assert_eq!(plan_batches(&uris("a", 101)).len(), 2);
}

#[test]
fn test_concatenation_keeps_album_then_track_order() {
    // Albums A (2 tracks) and B (3 tracks) fuse to [A1,A2,B1,B2,B3]
    let mut all: Vec<String> = Vec::new();
    all.extend(uris("A", 2));
    all.extend(uris("B", 3));

    let batches = plan_batches(&all);
    assert_eq!(batches.len(), 1);
    assert_eq!(
        batches[0],
        &[
            "spotify:track:A0",
            "spotify:track:A1",
            "spotify:track:B0",
            "spotify:track:B1",
            "spotify:track:B2",
        ]
    );
}

#[test]
fn test_unauthorized_first_failure_with_refresh_token_refreshes() {
    assert_eq!(
        on_unauthorized(0, true),
        UnauthorizedAction::AttemptRefresh
    );
}

#[test]
fn test_unauthorized_never_refreshes_twice() {
    // Even if the retried request fails again, the refresh cycle is spent
    assert_eq!(on_unauthorized(1, true), UnauthorizedAction::ClearSession);
    assert_eq!(on_unauthorized(2, true), UnauthorizedAction::ClearSession);
}

#[test]
fn test_unauthorized_without_refresh_token_clears_session() {
    assert_eq!(on_unauthorized(0, false), UnauthorizedAction::ClearSession);
}

#[test]
fn test_session_lifecycle_states() {
    let empty = Session::default();
    assert!(!empty.is_authenticated());
    assert!(empty.access_token.is_none());

    let session = Session::authenticated("access".to_string(), Some("refresh".to_string()));
    assert!(session.is_authenticated());

    // Refresh is impossible without a refresh token, but the session is
    // still authenticated for as long as the access token works
    let no_refresh = Session::authenticated("access".to_string(), None);
    assert!(no_refresh.is_authenticated());
    assert!(no_refresh.refresh_token.is_none());
}
