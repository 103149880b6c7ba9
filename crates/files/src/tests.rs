//! Tests for the files crate.

#[cfg(test)]
mod integration_tests {
    use crate::announce::ContentAnnouncer;
    use crate::descriptor::{ContentDescriptor, ContentHash};
    use crate::error::FilesError;
    use crate::pipeline::{lookup, AddPipeline, ContentSettings, ADD_FAILED};
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;
    use zetanet_crypto::HashAlgorithm;
    use zetanet_storage::ContentStore;
    use zetanet_types::{NodeConfig, Port, TransportType};

    #[derive(Default)]
    struct RecordingAnnouncer {
        sent: Mutex<Vec<(ContentHash, Vec<u8>)>>,
    }

    #[async_trait]
    impl ContentAnnouncer for RecordingAnnouncer {
        async fn announce(&self, hash: &ContentHash, descriptor: &[u8]) -> Result<()> {
            self.sent.lock().push((*hash, descriptor.to_vec()));
            Ok(())
        }
    }

    struct UnreachableAnnouncer;

    #[async_trait]
    impl ContentAnnouncer for UnreachableAnnouncer {
        async fn announce(&self, _hash: &ContentHash, _descriptor: &[u8]) -> Result<()> {
            Err(anyhow!("connection refused"))
        }
    }

    fn storage_node() -> NodeConfig {
        NodeConfig {
            host: "127.0.0.1".to_string(),
            port: Port(7700),
            transport: TransportType::Tcp,
            country: "JP".to_string(),
            name: "storage".to_string(),
            path: "/srv/zetanet".to_string(),
            key: None,
        }
    }

    fn settings(root: &Path) -> ContentSettings {
        ContentSettings {
            data_dir: root.join("data"),
            universe_dir: root.join("bin").join("universe"),
            algorithm: HashAlgorithm::Blake3,
        }
    }

    fn write_report(root: &Path, bytes: &[u8]) -> PathBuf {
        let path = root.join("report.pdf");
        fs::write(&path, bytes).unwrap();
        path
    }

    #[tokio::test]
    async fn test_add_with_push_returns_hash() {
        let root = TempDir::new().unwrap();
        let file = write_report(root.path(), b"quarterly numbers");
        let announcer = RecordingAnnouncer::default();
        let pipeline = AddPipeline::new(settings(root.path()), storage_node(), &announcer);

        let outcome = pipeline.add(&file, true).await.unwrap();

        let expected = ContentHash::from_data(HashAlgorithm::Blake3, b"quarterly numbers");
        assert!(outcome.announced);
        assert_eq!(outcome.hash, expected);
        assert_eq!(outcome.reply(), expected.to_hex());

        let sent = announcer.sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, expected);
        assert_eq!(
            ContentDescriptor::from_slice(&sent[0].1).unwrap(),
            outcome.descriptor
        );

        let store = ContentStore::open(root.path().join("data")).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.contains(&expected.to_hex()).unwrap());
    }

    #[tokio::test]
    async fn test_add_without_push_records_but_replies_failure() {
        let root = TempDir::new().unwrap();
        let file = write_report(root.path(), b"draft");
        let announcer = RecordingAnnouncer::default();
        let pipeline = AddPipeline::new(settings(root.path()), storage_node(), &announcer);

        let outcome = pipeline.add(&file, false).await.unwrap();

        assert!(!outcome.announced);
        assert_eq!(outcome.reply(), ADD_FAILED);
        assert!(announcer.sent.lock().is_empty());

        let found = lookup(&root.path().join("data"), &outcome.hash).unwrap();
        assert_eq!(found, Some(outcome.descriptor.clone()));
        assert_eq!(outcome.descriptor.length, 5);
        assert_eq!(outcome.descriptor.endpoint, "127.0.0.1:7700");
        assert!(outcome.universe_path.exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_recorded_hash_and_length_match_universe_copy() {
        let root = TempDir::new().unwrap();
        let bytes = vec![42u8; 300_000];
        let file = write_report(root.path(), &bytes);
        let pipeline =
            AddPipeline::new(settings(root.path()), storage_node(), RecordingAnnouncer::default());

        let outcome = pipeline.add(&file, false).await.unwrap();

        assert_eq!(outcome.descriptor.length, bytes.len() as u64);
        assert_eq!(outcome.descriptor.path, file.display().to_string());
        assert_eq!(
            ContentHash::of_file(HashAlgorithm::Blake3, &outcome.universe_path).unwrap(),
            outcome.hash
        );
    }

    #[tokio::test]
    async fn test_repeated_add_leaves_one_entry() {
        let root = TempDir::new().unwrap();
        let file = write_report(root.path(), b"same bytes");
        let pipeline =
            AddPipeline::new(settings(root.path()), storage_node(), RecordingAnnouncer::default());

        let first = pipeline.add(&file, false).await.unwrap();
        let second = pipeline.add(&file, false).await.unwrap();
        assert_eq!(first.hash, second.hash);

        let store = ContentStore::open(root.path().join("data")).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_announcer_keeps_local_entry() {
        let root = TempDir::new().unwrap();
        let file = write_report(root.path(), b"offline");
        let pipeline = AddPipeline::new(settings(root.path()), storage_node(), UnreachableAnnouncer);

        let outcome = pipeline.add(&file, true).await.unwrap();
        assert!(!outcome.announced);
        assert_eq!(outcome.reply(), ADD_FAILED);
        assert!(lookup(&root.path().join("data"), &outcome.hash)
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_missing_file_is_fatal() {
        let root = TempDir::new().unwrap();
        let pipeline = AddPipeline::new(settings(root.path()), storage_node(), UnreachableAnnouncer);

        let err = pipeline
            .add(&root.path().join("absent.pdf"), true)
            .await
            .unwrap_err();
        assert!(matches!(err, FilesError::NotFound(_)));
        assert!(!root.path().join("data").join("db.contents").exists());
    }

    #[tokio::test]
    async fn test_distinct_content_gets_distinct_entries() {
        let root = TempDir::new().unwrap();
        let pipeline =
            AddPipeline::new(settings(root.path()), storage_node(), RecordingAnnouncer::default());

        let a = root.path().join("a.txt");
        let b = root.path().join("b.txt");
        fs::write(&a, b"alpha").unwrap();
        fs::write(&b, b"alphb").unwrap();

        let ha = pipeline.add(&a, false).await.unwrap().hash;
        let hb = pipeline.add(&b, false).await.unwrap().hash;
        assert_ne!(ha, hb);

        let store = ContentStore::open(root.path().join("data")).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_lookup_unknown_hash() {
        let root = TempDir::new().unwrap();
        let hash = ContentHash::from_data(HashAlgorithm::Blake3, b"never added");
        assert_eq!(lookup(root.path(), &hash).unwrap(), None);
    }
}
