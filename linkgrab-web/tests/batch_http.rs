//! Batch loop against a real HTTP session and a mock file server.

mod common;

use common::{FakeNavigator, NavLog, config_for, lines, read_archive};
use linkgrab_common::SessionCookie;
use linkgrab_config::HttpConfig;
use linkgrab_http::HttpClient;
use linkgrab_web::{BatchDownloader, DownloadResult};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn downloads_with_browser_cookies_and_names_by_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dl/pack"))
        .and(header("cookie", "sid=abc"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/zip")
                .set_body_bytes(b"PK\x03\x04pack".to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dl/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let cfg = config_for(tmp.path());
    let log = NavLog::default();

    let first = "https://site.example/en/mods/maps/pack";
    let second = "https://site.example/en/mods/maps/gone";
    let navigator = FakeNavigator::new(&log)
        .anchor(first, &format!("{}/dl/pack", server.uri()))
        .anchor(second, &format!("{}/dl/gone", server.uri()))
        .cookies(vec![SessionCookie::new("sid", "abc")]);
    let http = HttpClient::new(&HttpConfig::default()).expect("client builds");

    let report = BatchDownloader::new(&cfg, navigator, http)
        .run(&lines(&[first, second]))
        .await
        .expect("batch completes");

    assert_eq!(report.entry_names(), vec!["[1]. pack.rar"]);
    assert!(matches!(report.links[1].result, DownloadResult::FetchFailed(_)));

    let entries = read_archive(&cfg.archive_path());
    assert_eq!(
        entries,
        vec![("[1]. pack.rar".to_string(), b"PK\x03\x04pack".to_vec())]
    );
    let on_disk = std::fs::metadata(&report.archive_path).unwrap().len();
    assert_eq!(report.archive_size as u64, on_disk);
}
