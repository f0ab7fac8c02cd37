mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{app_with, build_zip, get_request, send, test_config, upload_request};
use server::ServerConfig;

fn leftover_workspaces(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

#[tokio::test]
async fn api_info_lists_endpoints() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app_with(test_config(dir.path()));

    let res = send(&app, get_request("/")).await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["name"], "locstat");
    assert!(body["endpoints"]
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e == "/api/v1/count"));
}

#[tokio::test]
async fn health_and_ready() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app_with(test_config(dir.path()));

    let res = send(&app, get_request("/health")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["status"], "healthy");

    let res = send(&app, get_request("/ready")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["components"]["workspace"], "ready");
    assert_eq!(leftover_workspaces(dir.path()), 0);
}

#[tokio::test]
async fn request_id_is_generated_or_echoed() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app_with(test_config(dir.path()));

    let res = send(&app, get_request("/health")).await;
    let generated = res.headers.get("x-request-id").expect("request id header");
    assert_eq!(generated.to_str().unwrap().len(), 36);

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "trace-abc-123")
        .body(Body::empty())
        .unwrap();
    let res = send(&app, request).await;
    assert_eq!(res.headers.get("x-request-id").unwrap(), "trace-abc-123");
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app_with(test_config(dir.path()));

    let res = send(&app, get_request("/api/v1/nope")).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json()["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn scan_returns_text_extensions() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app_with(test_config(dir.path()));
    let archive = build_zip(&[("a.txt", b"hello\n"), ("b.bin", &[0x00, 0x01])]);

    let res = send(&app, upload_request("/api/v1/scan", &[("archive", &archive)])).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.text, r#"{"extensions":[".txt"]}"#);
    assert_eq!(leftover_workspaces(dir.path()), 0);
}

#[tokio::test]
async fn count_returns_ranked_report() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app_with(test_config(dir.path()));
    let archive = build_zip(&[
        ("a.py", b"1\n2\n3"),
        ("b.js", b"1\n2\n3"),
        ("c.rs", b"1"),
        ("d.md", b"ignored"),
    ]);

    let res = send(
        &app,
        upload_request(
            "/api/v1/count",
            &[
                ("archive", &archive),
                ("extensions", b".PY, js"),
                ("extensions", b"rs"),
            ],
        ),
    )
    .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        res.text,
        concat!(
            r#"{"total_files":3,"total_lines":7,"#,
            r#""line_counts_by_ext":{".js":3,".py":3,".rs":1},"#,
            r#""file_counts_by_ext":{".js":1,".py":1,".rs":1},"#,
            r#""top_files":[{"path":"a.py","lines":3},{"path":"b.js","lines":3},{"path":"c.rs","lines":1}]}"#
        )
    );
    assert_eq!(leftover_workspaces(dir.path()), 0);
}

#[tokio::test]
async fn count_without_selection_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app_with(test_config(dir.path()));
    let archive = build_zip(&[("a.py", b"x=1")]);

    let res = send(&app, upload_request("/api/v1/count", &[("archive", &archive)])).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    let body = res.json();
    assert_eq!(body["error"]["code"], "NO_EXTENSIONS_SELECTED");
    assert_eq!(body["error"]["message"], "no extensions selected");
}

#[tokio::test]
async fn missing_archive_is_empty_archive() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app_with(test_config(dir.path()));

    let res = send(&app, upload_request("/api/v1/scan", &[("note", b"hi")])).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["error"]["code"], "EMPTY_ARCHIVE");
    assert_eq!(res.json()["error"]["message"], "empty archive");
}

#[tokio::test]
async fn traversal_entry_is_rejected_and_cleaned_up() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app_with(test_config(dir.path()));
    let archive = build_zip(&[("ok.txt", b"ok"), ("../evil.txt", b"pwned")]);

    let res = send(
        &app,
        upload_request(
            "/api/v1/count",
            &[("archive", &archive), ("extensions", b".txt")],
        ),
    )
    .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["error"]["code"], "UNSAFE_PATH");
    assert_eq!(leftover_workspaces(dir.path()), 0);
    assert!(!dir.path().parent().unwrap().join("evil.txt").exists());
}

#[tokio::test]
async fn corrupt_archive_is_generic_internal_error() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app_with(test_config(dir.path()));

    let res = send(
        &app,
        upload_request("/api/v1/scan", &[("archive", b"PK\x03\x04 definitely not a zip")]),
    )
    .await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = res.json();
    assert_eq!(body["error"]["code"], "INTERNAL_FAULT");
    assert_eq!(body["error"]["message"], locstat::INTERNAL_FAULT_MESSAGE);
    assert!(!res.text.contains(dir.path().to_str().unwrap()));
    assert_eq!(leftover_workspaces(dir.path()), 0);
}

#[tokio::test]
async fn non_multipart_body_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app_with(test_config(dir.path()));

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/scan")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"archive":"nope"}"#))
        .unwrap();
    let res = send(&app, request).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn body_over_limit_is_payload_too_large() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        max_body_size_mb: 1,
        ..test_config(dir.path())
    };
    let (app, _) = app_with(config);
    let oversized = vec![b'x'; 2 * 1024 * 1024];

    let res = send(&app, upload_request("/api/v1/scan", &[("archive", &oversized)])).await;
    assert_eq!(res.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(res.json()["error"]["code"], "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn archive_expanding_past_cap_is_too_large() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        max_uncompressed_size_mb: Some(1),
        ..test_config(dir.path())
    };
    let (app, _) = app_with(config);
    let body = "x\n".repeat(1024 * 1024);
    let archive = build_zip(&[("big.txt", body.as_bytes())]);
    assert!(archive.len() < 1024 * 1024);

    let res = send(
        &app,
        upload_request(
            "/api/v1/count",
            &[("archive", &archive), ("extensions", b".txt")],
        ),
    )
    .await;
    assert_eq!(res.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(res.json()["error"]["code"], "ARCHIVE_TOO_LARGE");
    assert_eq!(leftover_workspaces(dir.path()), 0);
}

#[tokio::test]
async fn metrics_can_be_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        metrics_enabled: false,
        ..test_config(dir.path())
    };
    let (app, _) = app_with(config);

    let res = send(&app, get_request("/metrics")).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn concurrent_uploads_do_not_interfere() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app_with(test_config(dir.path()));

    let mut handles = Vec::new();
    for i in 1..=6usize {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let body = "x\n".repeat(i);
            let archive = build_zip(&[("same/path.rs", body.as_bytes())]);
            let res = send(
                &app,
                upload_request(
                    "/api/v1/count",
                    &[("archive", &archive), ("extensions", b"rs")],
                ),
            )
            .await;
            (i, res.json())
        }));
    }

    for handle in handles {
        let (i, body) = handle.await.unwrap();
        assert_eq!(body["total_lines"], (i + 1) as u64);
    }
    assert_eq!(leftover_workspaces(dir.path()), 0);
}
