//! Integration tests for the archive-and-upload walk.
//!
//! These tests run the walker against an in-memory object store that records
//! every key and the bytes uploaded to it, so no network access is needed.

use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use flate2::read::GzDecoder;
use tar::Archive;
use tempfile::TempDir;

use artifact_uploader::cloud::s3::ObjectStore;
use artifact_uploader::config::UploadConfig;
use artifact_uploader::walker::Walker;

/// Object store that keeps uploaded objects in memory
#[derive(Default)]
struct RecordingStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    puts: Mutex<Vec<String>>,
}

impl RecordingStore {
    fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    fn puts(&self) -> Vec<String> {
        self.puts.lock().unwrap().clone()
    }

    fn object(&self, key: &str) -> Vec<u8> {
        self.objects.lock().unwrap().get(key).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn upload_file(&self, local_path: &Path, key: &str) -> Result<()> {
        let bytes = fs::read(local_path)?;
        self.objects.lock().unwrap().insert(key.to_string(), bytes);
        self.puts.lock().unwrap().push(key.to_string());
        Ok(())
    }
}

fn test_config(dirs: Vec<PathBuf>, work_dir: &Path, tar: &[&str], plain: &[&str]) -> UploadConfig {
    UploadConfig {
        bucket: "test-bucket".to_string(),
        tar_prefixes: tar.iter().map(|p| p.to_string()).collect(),
        plain_prefixes: plain.iter().map(|p| p.to_string()).collect(),
        dirs,
        upload_dir: "v1".to_string(),
        work_dir: Some(work_dir.to_path_buf()),
        ..Default::default()
    }
}

/// The zkey gets three objects, the wasm one, nothing else is touched
#[tokio::test]
async fn test_zkey_and_wasm_scenario() -> Result<()> {
    let source_dir = TempDir::new()?;
    let work_dir = TempDir::new()?;
    fs::write(source_dir.path().join("venmo_send.zkey"), b"0123456789")?;
    fs::write(source_dir.path().join("venmo_send.wasm"), b"wasm!")?;
    fs::write(source_dir.path().join("venmo_send.r1cs"), b"constraints")?;

    let config = test_config(
        vec![source_dir.path().to_path_buf()],
        work_dir.path(),
        &["venmo_send.zkey"],
        &["venmo_send.wasm"],
    );
    let store = RecordingStore::default();

    let report = Walker::new(&config, &store).run().await?;

    assert_eq!(
        store.keys(),
        vec![
            "v1/venmo_send.wasm",
            "v1/venmo_send.zkey",
            "v1/venmo_send.zkey.gz",
            "v1/venmo_send.zkey.tar.gz",
        ]
    );
    assert_eq!(store.object("v1/venmo_send.zkey"), b"0123456789");
    assert_eq!(store.object("v1/venmo_send.wasm"), b"wasm!");
    assert_eq!(report.directories, 1);
    assert_eq!(report.entries, 3);
    assert_eq!(report.tar_candidates, 1);
    assert_eq!(report.plain_candidates, 1);
    assert_eq!(report.uploads, 4);

    Ok(())
}

/// Upload order for a tar candidate is original, .gz, .tar.gz
#[tokio::test]
async fn test_tar_candidate_upload_order() -> Result<()> {
    let source_dir = TempDir::new()?;
    let work_dir = TempDir::new()?;
    fs::write(source_dir.path().join("hdfc_send.zkey"), b"key")?;

    let config = test_config(vec![source_dir.path().to_path_buf()], work_dir.path(), &["hdfc_send"], &[]);
    let store = RecordingStore::default();
    Walker::new(&config, &store).run().await?;

    assert_eq!(
        store.puts(),
        vec!["v1/hdfc_send.zkey", "v1/hdfc_send.zkey.gz", "v1/hdfc_send.zkey.tar.gz"]
    );

    Ok(())
}

/// Decompressing the uploaded artifacts gives back the source bytes
#[tokio::test]
async fn test_derived_artifact_contents() -> Result<()> {
    let source_dir = TempDir::new()?;
    let work_dir = TempDir::new()?;
    let content: Vec<u8> = (0..50_000).map(|i| (i * 7 % 256) as u8).collect();
    fs::write(source_dir.path().join("venmo_registration.zkey"), &content)?;

    let config = test_config(
        vec![source_dir.path().to_path_buf()],
        work_dir.path(),
        &["venmo_registration.zkey"],
        &[],
    );
    let store = RecordingStore::default();
    Walker::new(&config, &store).run().await?;

    let gz = store.object("v1/venmo_registration.zkey.gz");
    let mut decoded = Vec::new();
    GzDecoder::new(gz.as_slice()).read_to_end(&mut decoded)?;
    assert_eq!(decoded, content);

    let tar_gz = store.object("v1/venmo_registration.zkey.tar.gz");
    let mut archive = Archive::new(GzDecoder::new(tar_gz.as_slice()));
    let mut members = Vec::new();
    for entry in archive.entries()? {
        let mut entry = entry?;
        let name = entry.path()?.to_string_lossy().to_string();
        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;
        members.push((name, data));
    }

    assert_eq!(members.len(), 1);
    assert_eq!(members[0].0, "venmo_registration.zkey");
    assert_eq!(members[0].1, content);

    Ok(())
}

/// No derived artifacts are left behind and sources are untouched
#[tokio::test]
async fn test_cleanup_after_success() -> Result<()> {
    let source_dir = TempDir::new()?;
    let work_dir = TempDir::new()?;
    fs::write(source_dir.path().join("hdfc_registration.zkey"), b"abc")?;

    let config = test_config(
        vec![source_dir.path().to_path_buf()],
        work_dir.path(),
        &["hdfc_registration.zkey"],
        &[],
    );
    let store = RecordingStore::default();
    Walker::new(&config, &store).run().await?;

    assert_eq!(fs::read_dir(work_dir.path())?.count(), 0);
    let remaining: Vec<_> = fs::read_dir(source_dir.path())?
        .map(|e| e.map(|e| e.file_name().to_string_lossy().to_string()))
        .collect::<std::io::Result<_>>()?;
    assert_eq!(remaining, vec!["hdfc_registration.zkey".to_string()]);
    assert_eq!(fs::read(source_dir.path().join("hdfc_registration.zkey"))?, b"abc");

    Ok(())
}

/// A file matching both sets is uploaded four times
#[tokio::test]
async fn test_overlapping_prefixes_upload_twice() -> Result<()> {
    let source_dir = TempDir::new()?;
    let work_dir = TempDir::new()?;
    fs::write(source_dir.path().join("venmo_send.zkey"), b"both")?;

    let config = test_config(vec![source_dir.path().to_path_buf()], work_dir.path(), &["venmo"], &["venmo_send"]);
    let store = RecordingStore::default();
    let report = Walker::new(&config, &store).run().await?;

    assert_eq!(
        store.puts(),
        vec![
            "v1/venmo_send.zkey",
            "v1/venmo_send.zkey.gz",
            "v1/venmo_send.zkey.tar.gz",
            "v1/venmo_send.zkey",
        ]
    );
    assert_eq!(report.uploads, 4);

    Ok(())
}

/// Directories are processed in configured order, each once
#[tokio::test]
async fn test_directories_in_order() -> Result<()> {
    let first = TempDir::new()?;
    let second = TempDir::new()?;
    let work_dir = TempDir::new()?;
    fs::write(first.path().join("a_vkey.json"), b"{}")?;
    fs::write(second.path().join("b_vkey.json"), b"{}")?;

    let config = test_config(
        vec![second.path().to_path_buf(), first.path().to_path_buf()],
        work_dir.path(),
        &[],
        &["a_vkey", "b_vkey"],
    );
    let store = RecordingStore::default();
    let report = Walker::new(&config, &store).run().await?;

    assert_eq!(store.puts(), vec!["v1/b_vkey.json", "v1/a_vkey.json"]);
    assert_eq!(report.directories, 2);

    Ok(())
}

/// Running twice writes the same keys again without error
#[tokio::test]
async fn test_rerun_overwrites_same_keys() -> Result<()> {
    let source_dir = TempDir::new()?;
    let work_dir = TempDir::new()?;
    fs::write(source_dir.path().join("venmo_send.zkey"), b"v1")?;

    let config = test_config(vec![source_dir.path().to_path_buf()], work_dir.path(), &["venmo_send.zkey"], &[]);
    let store = RecordingStore::default();

    Walker::new(&config, &store).run().await?;
    fs::write(source_dir.path().join("venmo_send.zkey"), b"v2")?;
    Walker::new(&config, &store).run().await?;

    assert_eq!(store.keys().len(), 3);
    assert_eq!(store.puts().len(), 6);
    assert_eq!(store.object("v1/venmo_send.zkey"), b"v2");

    Ok(())
}

/// Nothing configured, nothing uploaded
#[tokio::test]
async fn test_no_matches() -> Result<()> {
    let source_dir = TempDir::new()?;
    let work_dir = TempDir::new()?;
    fs::write(source_dir.path().join("README.md"), b"docs")?;

    let config = test_config(vec![source_dir.path().to_path_buf()], work_dir.path(), &["venmo"], &["hdfc"]);
    let store = RecordingStore::default();
    let report = Walker::new(&config, &store).run().await?;

    assert!(store.puts().is_empty());
    assert_eq!(report.entries, 1);

    let empty = UploadConfig { dirs: Vec::new(), ..config.clone() };
    let report = Walker::new(&empty, &store).run().await?;
    assert_eq!(report.directories, 0);

    Ok(())
}

/// Empty upload dir still joins with a slash
#[tokio::test]
async fn test_empty_upload_dir() -> Result<()> {
    let source_dir = TempDir::new()?;
    let work_dir = TempDir::new()?;
    fs::write(source_dir.path().join("hdfc_send.wasm"), b"wasm")?;
    fs::write(source_dir.path().join("hdfc_send.zkey"), b"zkey")?;

    let mut config = test_config(
        vec![source_dir.path().to_path_buf()],
        work_dir.path(),
        &["hdfc_send.zkey"],
        &["hdfc_send.wasm"],
    );
    config.upload_dir = String::new();

    let store = RecordingStore::default();
    Walker::new(&config, &store).run().await?;

    assert_eq!(
        store.keys(),
        vec!["/hdfc_send.wasm", "/hdfc_send.zkey", "/hdfc_send.zkey.gz", "/hdfc_send.zkey.tar.gz"]
    );

    Ok(())
}

/// A trailing slash on the upload dir is kept as given
#[tokio::test]
async fn test_upload_dir_trailing_slash_kept() -> Result<()> {
    let source_dir = TempDir::new()?;
    let work_dir = TempDir::new()?;
    fs::write(source_dir.path().join("venmo_send.wasm"), b"wasm")?;

    let mut config = test_config(vec![source_dir.path().to_path_buf()], work_dir.path(), &[], &["venmo_send.wasm"]);
    config.upload_dir = "v1/".to_string();

    let store = RecordingStore::default();
    Walker::new(&config, &store).run().await?;

    assert_eq!(store.keys(), vec!["v1//venmo_send.wasm"]);

    Ok(())
}
