use std::fs;
use std::io::{Cursor, Write};

use locale_sync::{ProjectDirectory, SyncError, TranslationProject};
use locale_sync_crowdin::{CrowdinClient, CrowdinConfig};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::write::SimpleFileOptions;

const DIR: &str = "Factorio Mod Example (dima74)";

fn client_for(server: &MockServer) -> CrowdinClient {
    CrowdinClient::new(CrowdinConfig {
        project_id: "test-project".into(),
        api_key: "secret".into(),
        api_base_url: Some(server.uri()),
        allowed_owners: vec![],
    })
}

fn build_zip(entries: &[(String, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer.start_file(name.as_str(), SimpleFileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

async fn mount_export(server: &MockServer, status: &str) {
    Mock::given(method("GET"))
        .and(path("/api/project/test-project/export"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": {"status": status}})))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_download(server: &MockServer, bytes: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path("/api/project/test-project/download/all.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(bytes, "application/zip"))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn downloads_and_prunes_translations() {
    let server = MockServer::start().await;
    mount_export(&server, "built").await;
    mount_download(
        &server,
        build_zip(&[
            (format!("fr/{DIR}/a.ini"), "[s]\nkey=Clé\n"),
            (format!("fr/{DIR}/b.ini"), "[s]\n\n"),
            (format!("de/{DIR}/a.ini"), "; empty"),
        ]),
    )
    .await;

    let archive = client_for(&server).export_and_download_all().await.unwrap();

    assert_eq!(archive.languages().unwrap(), vec!["de", "fr"]);
    let french = archive.files("fr", &ProjectDirectory::new(DIR)).unwrap();
    assert_eq!(french.len(), 1);
    assert_eq!(fs::read_to_string(&french[0]).unwrap(), "[s]\nkey=Clé\n");
    assert!(archive.files("de", &ProjectDirectory::new(DIR)).unwrap().is_empty());
}

#[tokio::test]
async fn unchanged_export_still_downloads() {
    let server = MockServer::start().await;
    mount_export(&server, "skipped").await;
    mount_download(&server, build_zip(&[(format!("fr/{DIR}/a.ini"), "k=v")])).await;

    let archive = client_for(&server).export_and_download_all().await.unwrap();

    assert_eq!(archive.files("fr", &ProjectDirectory::new(DIR)).unwrap().len(), 1);
}

#[tokio::test]
async fn failed_download_is_transport_error() {
    let server = MockServer::start().await;
    mount_export(&server, "built").await;
    Mock::given(method("GET"))
        .and(path("/api/project/test-project/download/all.zip"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = client_for(&server).export_and_download_all().await;
    assert!(matches!(result, Err(SyncError::Transport(_))));
}

#[tokio::test]
async fn corrupt_archive_is_reported() {
    let server = MockServer::start().await;
    mount_export(&server, "built").await;
    mount_download(&server, b"definitely not a zip".to_vec()).await;

    let result = client_for(&server).export_and_download_all().await;
    assert!(matches!(result, Err(SyncError::Archive(_))));
}
