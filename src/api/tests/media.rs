use super::*;
use crate::types::{FormatInfo, MediaInfo};
use serde_json::json;

#[tokio::test]
async fn get_info_returns_metadata() {
    let app = create_test_app().await;
    app.engine.set_info(Ok(MediaInfo {
        title: "Clip".into(),
        thumbnail: Some("https://img.example/1.jpg".into()),
        duration: Some(61.0),
        uploader: Some("someone".into()),
        platform: "Youtube".into(),
        formats: vec![FormatInfo {
            format_id: Some("18".into()),
            ext: Some("mp4".into()),
            quality: "360p".into(),
            filesize: Some(2048),
            vcodec: Some("avc1".into()),
            acodec: Some("mp4a".into()),
        }],
    }));

    let response = send(
        &app.router,
        post_json("/get_info", json!({"url": "https://youtube.com/watch?v=1"})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["title"], "Clip");
    assert_eq!(json["platform"], "Youtube");
    assert_eq!(json["duration"], 61.0);
    assert_eq!(json["formats"][0]["format_id"], "18");
    assert_eq!(json["formats"][0]["quality"], "360p");
    assert_eq!(json["formats"][0]["filesize"], 2048);
}

#[tokio::test]
async fn get_info_invalid_url_is_400() {
    let app = create_test_app().await;

    for body in [json!({"url": ""}), json!({}), json!({"url": "youtube.com/watch"})] {
        let response = send(&app.router, post_json("/get_info", body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "invalid_request");
    }
}

#[tokio::test]
async fn get_info_extraction_failure_is_400() {
    let app = create_test_app().await;
    app.engine.set_info(Err("Unsupported URL: https://example.com/".into()));

    let response = send(
        &app.router,
        post_json("/get_info", json!({"url": "https://example.com/"})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "extraction_failed");
    assert!(
        json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Unsupported URL")
    );
}

#[tokio::test]
async fn supported_sites_lists_curated_names() {
    let app = create_test_app().await;
    app.engine.set_extractors(Ok(vec![
        "9gag".into(),
        "Dailymotion".into(),
        "Instagram:story".into(),
    ]));

    let response = send(&app.router, get("/supported_sites")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"sites": ["Dailymotion", "Instagram:story"]})
    );
}

#[tokio::test]
async fn supported_sites_falls_back_to_popular_list() {
    let app = create_test_app().await;

    let response = send(&app.router, get("/supported_sites")).await;

    let json = body_json(response).await;
    let sites = json["sites"].as_array().unwrap();
    assert_eq!(sites.len(), 10);
    assert_eq!(sites[0], "YouTube");
}
