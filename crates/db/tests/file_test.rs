//! Integration tests for file records and their content.

use std::sync::Arc;

use boxmock_core::folder::ROOT_FOLDER_ID;
use boxmock_db::repositories::{
    CopyFileInput, CreateFolderInput, FileError, UploadFileInput,
};
use boxmock_db::{ConnectionSettings, TenantConnection, TenantRegistry};
use boxmock_shared::Identity;
use bytes::Bytes;
use futures::future::join_all;
use tempfile::TempDir;

async fn connect() -> (TempDir, Arc<TenantRegistry>, TenantConnection) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let registry = Arc::new(TenantRegistry::new(dir.path(), ConnectionSettings::default()));
    let handle = registry
        .get_or_create(&Identity::new("files"))
        .await
        .expect("Failed to create tenant");
    let conn = handle.connect().await.expect("Failed to connect");
    (dir, registry, conn)
}

fn upload(name: &str, content: &'static [u8]) -> UploadFileInput {
    UploadFileInput {
        name: name.to_string(),
        folder_id: ROOT_FOLDER_ID.to_string(),
        content: Bytes::from_static(content),
    }
}

#[tokio::test]
async fn test_upload_stores_record_and_blob() {
    let (dir, _registry, conn) = connect().await;

    let file = conn.files().upload(upload("hello.txt", b"hello")).await.unwrap();
    assert_eq!(file.version, 1);
    assert_eq!(file.size, 5);
    assert_eq!(file.folder_id, ROOT_FOLDER_ID);

    let blob = dir.path().join("files").join("files").join(&file.id);
    assert_eq!(std::fs::read(blob).unwrap(), b"hello");

    let (record, content) = conn.files().content(&file.id).await.unwrap();
    assert_eq!(record.name, "hello.txt");
    assert_eq!(content, Bytes::from_static(b"hello"));
    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_upload_rejects_empty_content_and_missing_folder() {
    let (_dir, _registry, conn) = connect().await;

    let err = conn.files().upload(upload("empty", b"")).await.unwrap_err();
    assert!(matches!(err, FileError::EmptyContent));

    let mut input = upload("orphan", b"x");
    input.folder_id = "missing".to_string();
    let err = conn.files().upload(input).await.unwrap_err();
    assert!(matches!(err, FileError::FolderNotFound(_)));

    assert_eq!(conn.files().count().await.unwrap(), 0);
    assert_eq!(conn.blobs().count().await.unwrap(), 0);
    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_new_version_overwrites_content() {
    let (_dir, _registry, conn) = connect().await;
    let file = conn.files().upload(upload("doc.txt", b"v1")).await.unwrap();

    let updated = conn
        .files()
        .upload_version(&file.id, Bytes::from_static(b"v2"))
        .await
        .unwrap();

    assert_eq!(updated.id, file.id);
    assert_eq!(updated.version, 2);
    assert_eq!(updated.size, 2);
    let (_, content) = conn.files().content(&file.id).await.unwrap();
    assert_eq!(content, Bytes::from_static(b"v2"));
    assert_eq!(conn.blobs().count().await.unwrap(), 1);
    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_shorter_version_leaves_no_trailing_bytes() {
    let (_dir, _registry, conn) = connect().await;
    let file = conn
        .files()
        .upload(upload("long.txt", b"a considerably longer first version"))
        .await
        .unwrap();

    conn.files()
        .upload_version(&file.id, Bytes::from_static(b"short"))
        .await
        .unwrap();

    let (record, content) = conn.files().content(&file.id).await.unwrap();
    assert_eq!(content, Bytes::from_static(b"short"));
    assert_eq!(record.size, 5);
    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_new_version_of_missing_file_is_not_found() {
    let (_dir, _registry, conn) = connect().await;
    let err = conn
        .files()
        .upload_version("missing", Bytes::from_static(b"v2"))
        .await
        .unwrap_err();
    assert!(matches!(err, FileError::NotFound(_)));
    assert!(!conn.blobs().exists("missing").await);
    conn.close().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_versions_are_last_writer_wins() {
    let (dir, registry, conn) = connect().await;
    let file = conn.files().upload(upload("race.txt", b"v0")).await.unwrap();
    conn.close().await.unwrap();

    let handle = registry.get(&Identity::new("files")).unwrap();
    let tasks = (1..=6).map(|i| {
        let handle = Arc::clone(&handle);
        let id = file.id.clone();
        tokio::spawn(async move {
            let conn = handle.connect().await.unwrap();
            let result = conn
                .files()
                .upload_version(&id, Bytes::from(format!("version-{i}")))
                .await;
            conn.close().await.unwrap();
            result
        })
    });
    for joined in join_all(tasks).await {
        joined.unwrap().unwrap();
    }

    let conn = handle.connect().await.unwrap();
    let (record, content) = conn.files().content(&file.id).await.unwrap();
    assert_eq!(record.version, 7);
    let text = String::from_utf8(content.to_vec()).unwrap();
    assert!(text.starts_with("version-"));
    assert_eq!(record.size, i64::try_from(text.len()).unwrap());
    conn.close().await.unwrap();
    drop(dir);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_versions_report_their_own_write() {
    let (dir, registry, conn) = connect().await;
    let file = conn.files().upload(upload("own.txt", b"v0")).await.unwrap();
    conn.close().await.unwrap();

    let handle = registry.get(&Identity::new("files")).unwrap();
    let tasks = (1..=6usize).map(|i| {
        let handle = Arc::clone(&handle);
        let id = file.id.clone();
        tokio::spawn(async move {
            let conn = handle.connect().await.unwrap();
            let result = conn
                .files()
                .upload_version(&id, Bytes::from(vec![b'x'; i]))
                .await;
            conn.close().await.unwrap();
            (i, result)
        })
    });

    let mut versions = Vec::new();
    for joined in join_all(tasks).await {
        let (len, result) = joined.unwrap();
        let record = result.unwrap();
        assert_eq!(record.size, i64::try_from(len).unwrap());
        versions.push(record.version);
    }
    versions.sort_unstable();
    assert_eq!(versions, (2..=7).collect::<Vec<i32>>());
    drop(dir);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_upload_racing_folder_delete_is_not_a_database_error() {
    let (dir, registry, conn) = connect().await;
    let handle = registry.get(&Identity::new("files")).unwrap();

    for round in 0..8 {
        let target = conn
            .folders()
            .create(CreateFolderInput {
                name: format!("Doomed {round}"),
                parent_id: ROOT_FOLDER_ID.to_string(),
            })
            .await
            .unwrap();

        let uploader = handle.connect().await.unwrap();
        let deleter = handle.connect().await.unwrap();
        let input = UploadFileInput {
            name: "late.txt".to_string(),
            folder_id: target.id.clone(),
            content: Bytes::from_static(b"late"),
        };
        let uploader_files = uploader.files();
        let deleter_folders = deleter.folders();
        let (uploaded, deleted) = tokio::join!(
            uploader_files.upload(input),
            deleter_folders.delete(&target.id),
        );
        deleted.unwrap();
        match uploaded {
            Ok(file) => assert!(conn.files().find_by_id(&file.id).await.unwrap().is_none()),
            Err(FileError::FolderNotFound(id)) => assert_eq!(id, target.id),
            Err(e) => panic!("unexpected upload error: {e}"),
        }
        uploader.close().await.unwrap();
        deleter.close().await.unwrap();
    }

    conn.close().await.unwrap();
    drop(dir);
}

#[tokio::test]
async fn test_copy_duplicates_record_and_blob() {
    let (_dir, _registry, conn) = connect().await;
    let target = conn
        .folders()
        .create(CreateFolderInput {
            name: "Copies".to_string(),
            parent_id: ROOT_FOLDER_ID.to_string(),
        })
        .await
        .unwrap();
    let source = conn.files().upload(upload("orig.txt", b"payload")).await.unwrap();

    let copy = conn
        .files()
        .copy(
            &source.id,
            CopyFileInput {
                folder_id: Some(target.id.clone()),
                name: None,
            },
        )
        .await
        .unwrap();

    assert_ne!(copy.id, source.id);
    assert_eq!(copy.name, "orig.txt");
    assert_eq!(copy.folder_id, target.id);
    assert_eq!(copy.size, 7);
    let (_, content) = conn.files().content(&copy.id).await.unwrap();
    assert_eq!(content, Bytes::from_static(b"payload"));
    assert_eq!(conn.blobs().count().await.unwrap(), 2);
    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_copy_without_blob_rolls_back() {
    let (_dir, _registry, conn) = connect().await;
    let source = conn.files().upload(upload("gone.txt", b"data")).await.unwrap();
    conn.blobs().delete(&source.id).await.unwrap();

    let err = conn
        .files()
        .copy(&source.id, CopyFileInput::default())
        .await
        .unwrap_err();

    assert!(matches!(err, FileError::ContentNotFound(_)));
    assert_eq!(conn.files().count().await.unwrap(), 1);
    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_delete_removes_record_and_blob() {
    let (_dir, _registry, conn) = connect().await;
    let file = conn.files().upload(upload("bye.txt", b"bye")).await.unwrap();

    conn.files().delete(&file.id).await.unwrap();

    assert!(conn.files().find_by_id(&file.id).await.unwrap().is_none());
    assert!(!conn.blobs().exists(&file.id).await);
    let err = conn.files().delete(&file.id).await.unwrap_err();
    assert!(matches!(err, FileError::NotFound(_)));
    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_missing_blob_is_content_not_found() {
    let (_dir, _registry, conn) = connect().await;
    let file = conn.files().upload(upload("lost.txt", b"lost")).await.unwrap();
    conn.blobs().delete(&file.id).await.unwrap();

    let err = conn.files().content(&file.id).await.unwrap_err();
    assert!(matches!(err, FileError::ContentNotFound(_)));
    let err = conn.files().content("missing").await.unwrap_err();
    assert!(matches!(err, FileError::NotFound(_)));
    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_rename_and_preflight() {
    let (_dir, _registry, conn) = connect().await;
    let file = conn.files().upload(upload("draft.txt", b"x")).await.unwrap();

    let renamed = conn
        .files()
        .rename(&file.id, "final.txt".to_string())
        .await
        .unwrap();
    assert_eq!(renamed.name, "final.txt");

    conn.files().preflight("draft.txt", ROOT_FOLDER_ID).await.unwrap();
    let err = conn
        .files()
        .preflight("final.txt", ROOT_FOLDER_ID)
        .await
        .unwrap_err();
    match err {
        FileError::NameInUse { id, name } => {
            assert_eq!(id, file.id);
            assert_eq!(name, "final.txt");
        }
        other => panic!("expected NameInUse, got {other:?}"),
    }
    conn.close().await.unwrap();
}
