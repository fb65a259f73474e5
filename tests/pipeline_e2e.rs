//! End-to-end pipeline tests against a mock Leonardo.ai server.
//!
//! Exercises the full workflow: prompt file -> image job -> image download ->
//! motion job -> video download -> intermediate image cleanup.

use std::time::Duration;

use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use anime_motion::leonardo::{LeonardoClient, LeonardoError, PollConfig};
use anime_motion::pipeline::{self, PipelineError, PipelineOptions};

fn test_client(mock_server: &MockServer) -> LeonardoClient {
    LeonardoClient::with_base_url("test-api-key".to_string(), mock_server.uri()).unwrap()
}

fn test_options(dir: &std::path::Path) -> PipelineOptions {
    PipelineOptions {
        prompt_file: dir.join("prompt.txt"),
        image_output: dir.join("generated_anime.png"),
        video_output: dir.join("anime_motion_video.mp4"),
        poll: PollConfig {
            interval: Duration::from_millis(10),
            timeout: Duration::from_secs(2),
        },
        ..PipelineOptions::default()
    }
}

#[tokio::test]
async fn test_full_pipeline_produces_video_and_removes_image() {
    let mock_server = MockServer::start().await;
    let image_url = format!("{}/assets/img.png", mock_server.uri());
    let video_url = format!("{}/assets/vid.mp4", mock_server.uri());

    // Image job: submit, one pending poll, then succeeded.
    Mock::given(method("POST"))
        .and(path("/v1/images/generations"))
        .and(body_partial_json(serde_json::json!({
            "prompt": "a fox in the forest"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "img1"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/images/generations/img1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "pending"})),
        )
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/images/generations/img1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "succeeded",
            "result": [{"url": image_url.clone()}]
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/assets/img.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fake png bytes".to_vec()))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Motion job fed with the image URL from stage 1.
    Mock::given(method("POST"))
        .and(path("/v1/videos/motion-generations"))
        .and(body_partial_json(serde_json::json!({
            "image_url": image_url.clone(),
            "motion_type": "pan_left",
            "duration_seconds": 30
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "vid1"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/videos/motion-generations/vid1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "succeeded",
            "result": [{"url": video_url}]
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/assets/vid.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fake mp4 bytes".to_vec()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("prompt.txt"), "a fox in the forest\n").unwrap();

    let client = test_client(&mock_server);
    let options = test_options(dir.path());
    let video_path = pipeline::run(&client, &options).await.unwrap();

    assert_eq!(video_path, options.video_output);
    assert_eq!(std::fs::read(&video_path).unwrap(), b"fake mp4 bytes");
    assert!(
        !options.image_output.exists(),
        "Intermediate image should be deleted after the video is downloaded"
    );
}

#[tokio::test]
async fn test_missing_prompt_file_fails_before_any_network_call() {
    let mock_server = MockServer::start().await;

    let dir = tempfile::tempdir().unwrap();
    // No prompt.txt written.
    let client = test_client(&mock_server);
    let options = test_options(dir.path());

    let result = pipeline::run(&client, &options).await;

    match result {
        Err(PipelineError::PromptFile { path, .. }) => {
            assert_eq!(path, options.prompt_file);
        }
        other => panic!("Expected PromptFile error, got: {:?}", other.map(|_| ())),
    }
    assert!(
        mock_server.received_requests().await.unwrap().is_empty(),
        "No network call should be made when the prompt file is missing"
    );
}

#[tokio::test]
async fn test_empty_prompt_file_fails_before_any_network_call() {
    let mock_server = MockServer::start().await;

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("prompt.txt"), "   \n").unwrap();

    let client = test_client(&mock_server);
    let options = test_options(dir.path());

    let result = pipeline::run(&client, &options).await;

    assert!(matches!(
        result,
        Err(PipelineError::Leonardo(LeonardoError::EmptyPrompt))
    ));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_image_job_aborts_the_run() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/images/generations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "img1"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/images/generations/img1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "failed"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("prompt.txt"), "a fox in the forest").unwrap();

    let client = test_client(&mock_server);
    let options = test_options(dir.path());
    let result = pipeline::run(&client, &options).await;

    match result {
        Err(PipelineError::Leonardo(LeonardoError::JobFailed { job_id })) => {
            assert_eq!(job_id, "img1");
        }
        other => panic!("Expected JobFailed, got: {:?}", other.map(|_| ())),
    }
    assert!(!options.image_output.exists());
    assert!(!options.video_output.exists());
}

#[tokio::test]
async fn test_succeeded_job_without_result_url_aborts_the_run() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/images/generations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "img1"})))
        .mount(&mock_server)
        .await;

    // Succeeded, but with an empty result list. Must read the same as a
    // missing result key: no URL, hard failure.
    Mock::given(method("GET"))
        .and(path("/v1/images/generations/img1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "succeeded",
            "result": []
        })))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("prompt.txt"), "a fox in the forest").unwrap();

    let client = test_client(&mock_server);
    let options = test_options(dir.path());
    let result = pipeline::run(&client, &options).await;

    assert!(matches!(
        result,
        Err(PipelineError::Leonardo(LeonardoError::MissingResultUrl))
    ));
    assert!(!options.video_output.exists());
}
