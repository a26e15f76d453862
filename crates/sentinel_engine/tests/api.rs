use std::time::Duration;

use pretty_assertions::assert_eq;
use sentinel_engine::{
    AgentApi, AnalyzeRequest, ApiSettings, EntryKind, FailureKind, ReqwestAgentApi, ScanStats,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ReqwestAgentApi {
    ReqwestAgentApi::new(ApiSettings {
        base_url: server.uri(),
        ..ApiSettings::default()
    })
    .expect("valid base url")
}

#[tokio::test]
async fn scan_posts_path_and_parses_tree() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/project/scan"))
        .and(body_json(json!({ "path": "./my-app" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tree": [
                { "name": "src", "type": "folder", "children": [
                    { "name": "main.py", "type": "file" }
                ]},
                { "name": "README.md", "type": "file" }
            ],
            "stats": { "scanned": 2, "ignored": 5, "issues": 1 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server).scan_project("./my-app").await.unwrap();

    assert_eq!(response.tree.len(), 2);
    assert_eq!(response.tree[0].kind, EntryKind::Folder);
    let children = response.tree[0].children.as_ref().unwrap();
    assert_eq!(children[0].name, "main.py");
    assert_eq!(response.tree[1].children, None);
    assert_eq!(
        response.stats,
        Some(ScanStats {
            scanned: 2,
            ignored: 5,
            issues: 1
        })
    );
}

#[tokio::test]
async fn fix_project_sends_camel_case_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/fix-project"))
        .and(body_json(json!({
            "folderPath": ".",
            "instruction": "add type hints"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "changes": [{
                "fileName": "app.py",
                "originalCode": "def f(x): return x",
                "fixedCode": "def f(x: int) -> int: return x",
                "status": "MODIFIED"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server)
        .fix_project(".", "add type hints")
        .await
        .unwrap();

    assert_eq!(response.changes.len(), 1);
    assert_eq!(response.changes[0].file_name, "app.py");
    assert_eq!(response.changes[0].status, "MODIFIED");
}

#[tokio::test]
async fn analyze_sends_null_image_when_absent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .and(body_json(json!({
            "code": "print('hi')",
            "fileName": "script.py",
            "image": null
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "explanations": "Looks fine.",
            "fixedCode": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = AnalyzeRequest {
        code: "print('hi')".to_string(),
        file_name: "script.py".to_string(),
        image: None,
    };
    let response = client_for(&server).analyze(&request).await.unwrap();

    assert_eq!(response.explanations, "Looks fine.");
    assert_eq!(response.fixed_code, None);
}

#[tokio::test]
async fn save_file_posts_path_and_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/save-file"))
        .and(body_json(json!({
            "path": "src/app/page.tsx",
            "content": "export default 1;"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "message": "saved"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server)
        .save_file("src/app/page.tsx", "export default 1;")
        .await
        .unwrap();

    assert_eq!(response.status, "success");
}

#[tokio::test]
async fn base_url_path_prefix_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/agent/api/project/scan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "tree": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let api = ReqwestAgentApi::new(ApiSettings {
        base_url: format!("{}/agent", server.uri()),
        ..ApiSettings::default()
    })
    .unwrap();
    let response = api.scan_project(".").await.unwrap();

    assert!(response.tree.is_empty());
    assert_eq!(response.stats, None);
}

#[tokio::test]
async fn http_error_status_carries_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model overloaded"))
        .mount(&server)
        .await;

    let request = AnalyzeRequest {
        code: String::new(),
        file_name: "x.ts".to_string(),
        image: None,
    };
    let err = client_for(&server).analyze(&request).await.unwrap_err();

    assert_eq!(err.kind, FailureKind::HttpStatus(500));
    assert_eq!(err.message, "model overloaded");
}

#[tokio::test]
async fn missing_route_is_http_404() {
    let server = MockServer::start().await;

    let err = client_for(&server).scan_project(".").await.unwrap_err();

    assert_eq!(err.kind, FailureKind::HttpStatus(404));
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/save-file"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .save_file("a.txt", "b")
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn slow_service_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/project/scan"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "tree": [] }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let api = ReqwestAgentApi::new(ApiSettings {
        base_url: server.uri(),
        request_timeout: Duration::from_millis(200),
        ..ApiSettings::default()
    })
    .unwrap();
    let err = api.scan_project(".").await.unwrap_err();

    assert_eq!(err.kind, FailureKind::Timeout);
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = ReqwestAgentApi::new(ApiSettings {
        base_url: "not a url".to_string(),
        ..ApiSettings::default()
    })
    .unwrap_err();

    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
