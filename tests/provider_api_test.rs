//! End-to-end tests for the template provider against a mock HTTP server.

use flate2::write::GzEncoder;
use flate2::Compression;
use httpmock::prelude::*;
use sprout::cache::{CacheOptions, CacheStore};
use sprout::template::{RemoteFetcher, TemplateProvider};
use sprout::SproutError;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

const ARCHIVE_PATH: &str = "/acme/starters/archive/refs/heads/main.tar.gz";

fn tarball(files: &[(&str, &str)]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for (path, contents) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        builder
            .append_data(&mut header, path, contents.as_bytes())
            .unwrap();
    }

    builder.into_inner().unwrap().finish().unwrap()
}

fn starters() -> Vec<u8> {
    tarball(&[
        ("starters-main/README.md", "# starters"),
        ("starters-main/templates/react/package.json", "{\"name\": \"{{project_name}}\"}"),
        ("starters-main/templates/react/src/main.jsx", "render()"),
        ("starters-main/templates/vue/package.json", "{}"),
    ])
}

fn provider(temp: &TempDir) -> TemplateProvider {
    TemplateProvider::new(
        CacheStore::new(temp.path().join("cache"), Duration::from_secs(3600)),
        RemoteFetcher::with_timeout(Duration::from_secs(10)).unwrap(),
    )
}

#[test]
fn second_request_is_served_from_cache() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path(ARCHIVE_PATH);
        then.status(200).body(starters());
    });
    let temp = TempDir::new().unwrap();
    let provider = provider(&temp);
    let reference = format!("direct:{}", server.url(ARCHIVE_PATH));

    let first = provider.get_template(&reference, &CacheOptions::new()).unwrap();
    let second = provider.get_template(&reference, &CacheOptions::new()).unwrap();

    mock.assert_calls(1);
    assert_eq!(first, second);
    assert!(first.join("README.md").exists());
    assert!(first.join("templates/react/src/main.jsx").exists());
}

#[test]
fn no_cache_always_fetches() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path(ARCHIVE_PATH);
        then.status(200).body(starters());
    });
    let temp = TempDir::new().unwrap();
    let provider = provider(&temp).with_cache_enabled(false);
    let reference = format!("direct:{}", server.url(ARCHIVE_PATH));

    provider.get_template(&reference, &CacheOptions::new()).unwrap();
    provider.get_template(&reference, &CacheOptions::new()).unwrap();

    mock.assert_calls(2);
}

#[test]
fn subdirectory_becomes_template_root() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(ARCHIVE_PATH);
        then.status(200).body(starters());
    });
    let temp = TempDir::new().unwrap();
    let provider = provider(&temp);

    let reference = format!("direct:{}", server.url(ARCHIVE_PATH));
    let dir = provider.get_template(&reference, &CacheOptions::new()).unwrap();
    sprout::template::extract_subdirectory(&dir, "templates/react").unwrap();

    assert!(dir.join("package.json").exists());
    assert!(dir.join("src/main.jsx").exists());
    assert!(!dir.join("README.md").exists());
    assert!(!dir.join("templates").exists());
}

#[test]
fn missing_archive_leaves_no_entry() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(ARCHIVE_PATH);
        then.status(404).body("Not Found");
    });
    let temp = TempDir::new().unwrap();
    let provider = provider(&temp);
    let reference = format!("direct:{}", server.url(ARCHIVE_PATH));

    let err = provider
        .get_template(&reference, &CacheOptions::new())
        .unwrap_err();

    match err {
        SproutError::TemplateUnavailable { source, .. } => {
            assert!(matches!(*source, SproutError::FetchFailed { .. }))
        }
        other => panic!("Expected TemplateUnavailable, got {:?}", other),
    }
    assert_eq!(provider.cache_stats().unwrap().total_items, 0);
    assert!(provider.cache().list().unwrap().is_empty());
}

#[test]
fn clear_and_stats_reflect_fetched_entries() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(ARCHIVE_PATH);
        then.status(200).body(starters());
    });
    let temp = TempDir::new().unwrap();
    let provider = provider(&temp);
    let reference = format!("direct:{}", server.url(ARCHIVE_PATH));

    provider.get_template(&reference, &CacheOptions::new()).unwrap();

    let stats = provider.cache_stats().unwrap();
    assert_eq!(stats.total_items, 1);
    assert_eq!(stats.expired_items, 0);
    assert!(stats.total_size_bytes > 0);
    assert_eq!(provider.clean_expired_cache().unwrap(), 0);

    assert!(provider.clear_all_cache().unwrap());
    assert!(!provider.clear_all_cache().unwrap());
    assert!(!fs::exists(temp.path().join("cache")).unwrap());
}
