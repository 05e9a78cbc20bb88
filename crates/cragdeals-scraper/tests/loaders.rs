//! Integration tests for the network loaders.
//!
//! Uses `wiremock` to stand up a local HTTP server per test so no real
//! network traffic is made.

use cragdeals_scraper::{ContentLoader, FetchError, HttpLoader, RenderedLoader};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_http_loader() -> HttpLoader {
    HttpLoader::new(5, "cragdeals-test/0.1").expect("failed to build test HttpLoader")
}

fn page_url(server: &MockServer, p: &str) -> Url {
    Url::parse(&format!("{}{p}", server.uri())).unwrap()
}

// ---------------------------------------------------------------------------
// HttpLoader
// ---------------------------------------------------------------------------

#[tokio::test]
async fn http_loader_parses_successful_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/climbing-ropes/"))
        .and(header("user-agent", "cragdeals-test/0.1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><a href='boa/'>Boa</a></body></html>"),
        )
        .mount(&server)
        .await;

    let url = page_url(&server, "/climbing-ropes/");
    let document = test_http_loader().load(&url).await.unwrap();

    assert_eq!(document.url(), &url);
    assert!(document.has_body_content());
    assert_eq!(
        document.resolve("boa/"),
        Some(format!("{}/climbing-ropes/boa/", server.uri()))
    );
}

#[tokio::test]
async fn http_loader_reports_non_success_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = test_http_loader()
        .load(&page_url(&server, "/gone"))
        .await
        .unwrap_err();

    assert!(
        matches!(err, FetchError::UnexpectedStatus { status: 404, .. }),
        "expected UnexpectedStatus(404), got: {err:?}"
    );
}

#[tokio::test]
async fn http_loader_follows_redirects_and_resolves_against_final_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old-ropes"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", format!("{}/new/ropes/", server.uri()).as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new/ropes/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>listing</p>"))
        .mount(&server)
        .await;

    let document = test_http_loader()
        .load(&page_url(&server, "/old-ropes"))
        .await
        .unwrap();

    assert_eq!(
        document.resolve("x"),
        Some(format!("{}/new/ropes/x", server.uri()))
    );
}

#[tokio::test]
async fn http_loader_rejects_blank_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blank"))
        .respond_with(ResponseTemplate::new(200).set_body_string("   "))
        .mount(&server)
        .await;

    let err = test_http_loader()
        .load(&page_url(&server, "/blank"))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::EmptyDocument { .. }));
}

// ---------------------------------------------------------------------------
// RenderedLoader
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rendered_loader_posts_url_and_settle_delay_with_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/content"))
        .and(query_param("token", "s3cret"))
        .and(body_json(json!({
            "url": "https://www.mountex.hu/sziklamaszas-hegymaszas/kotelek",
            "waitForTimeout": 250
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<div class='bg-white rounded-16'>rendered</div>"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let loader = RenderedLoader::new(&format!("{}/", server.uri()), Some("s3cret"), 250, 5)
        .expect("failed to build RenderedLoader");
    let target = Url::parse("https://www.mountex.hu/sziklamaszas-hegymaszas/kotelek").unwrap();
    let document = loader.load(&target).await.unwrap();

    // The document belongs to the rendered page, not the render service.
    assert_eq!(document.url(), &target);
    assert_eq!(
        document.resolve("/p/1").as_deref(),
        Some("https://www.mountex.hu/p/1")
    );
}

#[tokio::test]
async fn rendered_loader_surfaces_service_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/content"))
        .respond_with(ResponseTemplate::new(429).set_body_string("too many sessions"))
        .mount(&server)
        .await;

    let loader = RenderedLoader::new(&server.uri(), None, 0, 5).unwrap();
    let err = loader
        .load(&Url::parse("https://www.mountex.hu/").unwrap())
        .await
        .unwrap_err();

    match err {
        FetchError::Render {
            status, message, ..
        } => {
            assert_eq!(status, 429);
            assert_eq!(message, "too many sessions");
        }
        other => panic!("expected Render error, got: {other:?}"),
    }
}
