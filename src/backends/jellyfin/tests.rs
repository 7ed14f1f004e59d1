use super::*;
use crate::backends::traits::{PlayMethod, PlaybackBackend, PlaybackReport};
use crate::models::{Credentials, DeviceId, ItemId, MediaType, PlaySessionId, UserId};
use crate::utils::PlaybackError;
use mockito::{Matcher, Server};
use serde_json::json;

fn create_test_api(server: &Server) -> JellyfinApi {
    let credentials = Credentials {
        server_url: server.url(),
        access_token: "test_token".to_string(),
        user_id: UserId::new("test_user_id"),
    };
    JellyfinApi::new(&credentials, DeviceId::new("test_device")).unwrap()
}

fn report(position_ticks: i64, is_paused: bool) -> PlaybackReport {
    PlaybackReport {
        item_id: ItemId::new("episode-1"),
        play_session_id: PlaySessionId::new("play-session-1"),
        position_ticks,
        is_paused,
        is_muted: false,
        play_method: PlayMethod::Transcode,
    }
}

fn auth_matcher() -> Matcher {
    Matcher::Regex(r#".*Token="test_token".*"#.to_string())
}

#[tokio::test]
async fn test_playback_start_reporting() {
    let mut server = Server::new_async().await;
    let api = create_test_api(&server);

    let mock = server
        .mock("POST", "/Sessions/Playing")
        .match_header("X-Emby-Authorization", auth_matcher())
        .match_body(Matcher::PartialJson(json!({
            "ItemId": "episode-1",
            "SessionId": "play-session-1",
            "PositionTicks": 900000000,
            "IsPaused": false,
            "IsMuted": false,
            "PlayMethod": "Transcode"
        })))
        .with_status(204)
        .create_async()
        .await;

    api.report_playback_start(&report(900_000_000, false))
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_playback_progress_reporting() {
    let mut server = Server::new_async().await;
    let api = create_test_api(&server);

    let mock = server
        .mock("POST", "/Sessions/Playing/Progress")
        .match_body(Matcher::PartialJson(json!({
            "ItemId": "episode-1",
            "PositionTicks": 1200000000,
            "IsPaused": true
        })))
        .with_status(204)
        .create_async()
        .await;

    api.report_playback_progress(&report(1_200_000_000, true))
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_playback_stopped_reporting() {
    let mut server = Server::new_async().await;
    let api = create_test_api(&server);

    let mock = server
        .mock("POST", "/Sessions/Playing/Stopped")
        .match_body(Matcher::PartialJson(json!({
            "ItemId": "episode-1",
            "PositionTicks": 33000000000i64,
            "PlayMethod": "Transcode"
        })))
        .with_status(204)
        .create_async()
        .await;

    api.report_playback_stopped(&report(33_000_000_000, false))
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_report_failure_surfaces_status() {
    let mut server = Server::new_async().await;
    let api = create_test_api(&server);

    let _m = server
        .mock("POST", "/Sessions/Playing/Progress")
        .with_status(503)
        .with_body("maintenance")
        .create_async()
        .await;

    let err = api
        .report_playback_progress(&report(0, false))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        PlaybackError::Server {
            status: 503,
            message: "maintenance".to_string()
        }
    );
}

#[tokio::test]
async fn test_mark_watched() {
    let mut server = Server::new_async().await;
    let api = create_test_api(&server);

    let mock = server
        .mock("POST", "/Users/test_user_id/PlayedItems/episode-1")
        .match_header("X-Emby-Authorization", auth_matcher())
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    api.mark_watched(&ItemId::new("episode-1")).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_skip_markers_fetch() {
    let mut server = Server::new_async().await;
    let api = create_test_api(&server);

    let _m = server
        .mock("GET", "/Shows/episode-1/IntroTimestamps")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "Introduction": {"IntroStart": 10.0, "IntroEnd": 40.0},
                "Credits": {"IntroStart": 1250.0, "IntroEnd": 1320.0}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let markers = api
        .fetch_skip_markers(&ItemId::new("episode-1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(markers.intro_start, 10.0);
    assert_eq!(markers.intro_end, 40.0);
    assert_eq!(markers.credits_start, Some(1250.0));
}

#[tokio::test]
async fn test_skip_markers_404_means_none() {
    let mut server = Server::new_async().await;
    let api = create_test_api(&server);

    let _m = server
        .mock("GET", "/Shows/movie-1/IntroTimestamps")
        .with_status(404)
        .create_async()
        .await;

    let markers = api.fetch_skip_markers(&ItemId::new("movie-1")).await.unwrap();
    assert!(markers.is_none());
}

#[tokio::test]
async fn test_skip_markers_server_error_is_error() {
    let mut server = Server::new_async().await;
    let api = create_test_api(&server);

    let _m = server
        .mock("GET", "/Shows/movie-1/IntroTimestamps")
        .with_status(500)
        .create_async()
        .await;

    let err = api
        .fetch_skip_markers(&ItemId::new("movie-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, PlaybackError::Server { status: 500, .. }));
}

#[tokio::test]
async fn test_get_item() {
    let mut server = Server::new_async().await;
    let api = create_test_api(&server);

    let _m = server
        .mock("GET", "/Users/test_user_id/Items/episode-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "Id": "episode-1",
                "Name": "Pilot",
                "Type": "Episode",
                "RunTimeTicks": 36000000000i64,
                "UserData": {
                    "PlaybackPositionTicks": 900000000,
                    "IsFavorite": true,
                    "Played": false
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let item = api.get_item(&ItemId::new("episode-1")).await.unwrap();
    assert_eq!(item.name, "Pilot");
    assert_eq!(item.media_type, MediaType::Episode);
    assert_eq!(item.duration_seconds(), 3600.0);
    assert_eq!(item.playback_position_ticks(), Some(900_000_000));
    assert!(item.user_data.unwrap().is_favorite);
}

#[tokio::test]
async fn test_get_item_rejects_unplayable_type() {
    let mut server = Server::new_async().await;
    let api = create_test_api(&server);

    let _m = server
        .mock("GET", "/Users/test_user_id/Items/folder-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"Id": "folder-1", "Name": "Stuff", "Type": "Folder"}).to_string())
        .create_async()
        .await;

    let err = api.get_item(&ItemId::new("folder-1")).await.unwrap_err();
    assert!(matches!(err, PlaybackError::Parse(_)));
}

#[tokio::test]
async fn test_probe_stream() {
    let mut server = Server::new_async().await;
    let api = create_test_api(&server);

    let _ok = server
        .mock("HEAD", "/Videos/movie-1/master.m3u8")
        .with_status(200)
        .create_async()
        .await;
    let _missing = server
        .mock("HEAD", "/Videos/gone/master.m3u8")
        .with_status(404)
        .create_async()
        .await;

    let ok = url::Url::parse(&format!("{}/Videos/movie-1/master.m3u8", server.url())).unwrap();
    api.probe_stream(&ok).await.unwrap();

    let missing = url::Url::parse(&format!("{}/Videos/gone/master.m3u8", server.url())).unwrap();
    assert!(api.probe_stream(&missing).await.is_err());
}

#[test]
fn test_invalid_server_address_is_rejected() {
    let credentials = Credentials {
        server_url: "jellyfin.local".to_string(),
        access_token: "t".to_string(),
        user_id: UserId::new("u"),
    };
    let err = JellyfinApi::new(&credentials, DeviceId::new("d")).unwrap_err();
    assert!(matches!(err, PlaybackError::Configuration(_)));
}
