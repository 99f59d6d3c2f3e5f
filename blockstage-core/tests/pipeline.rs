//! End-to-end download → stage → merge over a directory-backed source.

use std::path::PathBuf;

use blockstage_core::seed::{block_content, seed_demo};
use blockstage_core::{
    BlockId, BlockStore, Config, MergeError, NotificationKind, Pipeline, StageError, StatusClass,
};
use tempfile::TempDir;

struct Sim {
    _tmp: TempDir,
    pipeline: Pipeline,
    staging_dir: PathBuf,
}

fn sim() -> Sim {
    let tmp = tempfile::tempdir().unwrap();
    let config = Config {
        source_dir: tmp.path().join("api"),
        staging_dir: tmp.path().join("temp"),
        ..Config::default()
    };
    let pipeline = Pipeline::from_config(&config);
    seed_demo(pipeline.store()).unwrap();
    pipeline.staging().reset().unwrap();
    Sim {
        staging_dir: config.staging_dir.clone(),
        _tmp: tmp,
        pipeline,
    }
}

fn corrupt(sim: &Sim, file_id: &str, ordinal: u64) {
    let body = format!("{} corrupt", block_content(file_id, ordinal));
    sim.pipeline
        .store()
        .put_block(file_id, BlockId { ordinal }, &body)
        .unwrap();
}

#[test]
fn all_valid_blocks_download_without_notifications() {
    let s = sim();
    let r = s.pipeline.download_file("Math").unwrap();

    assert!(r.success);
    assert_eq!(r.status_class, StatusClass::Ok);
    assert_eq!(r.message, "all 5 blocks for Math were downloaded and staged");
    assert_eq!(r.succeeded.len(), 5);
    assert!(r.failed.is_empty());
    assert!(s.pipeline.notifications().is_empty());

    for i in 1..=5 {
        let path = s.staging_dir.join("Math").join(i.to_string());
        let staged = std::fs::read_to_string(path).unwrap();
        assert_eq!(staged, format!("Content of Math block {i}"));
    }
}

#[test]
fn partial_corruption_is_partial_success() {
    let s = sim();
    corrupt(&s, "History", 2);
    corrupt(&s, "History", 5);

    let r = s.pipeline.download_file("History").unwrap();
    assert!(!r.success);
    assert_eq!(r.status_class, StatusClass::PartialSuccess);
    assert_eq!(r.succeeded.len(), 5);
    assert_eq!(r.failed.len(), 2);
    assert_eq!(r.attempted(), 7);

    let invalid = s.pipeline.notifications().of_kind(NotificationKind::InvalidBlock);
    assert_eq!(invalid.len(), 2);
    assert_eq!(invalid[0].data["blockId"], 2);
    assert_eq!(invalid[1].data["blockId"], 5);
    assert_eq!(s.pipeline.notifications().len(), 2);
}

#[test]
fn merge_joins_with_single_newlines() {
    let s = sim();
    s.pipeline.download_file("History").unwrap();
    let m = s.pipeline.merge_file("History").unwrap();

    let expected = (1..=7)
        .map(|i| block_content("History", i))
        .collect::<Vec<_>>()
        .join("\n");
    assert_eq!(m.content, expected);
    assert!(!m.content.ends_with('\n'));
    assert_eq!(std::fs::read_to_string(&m.artifact).unwrap(), expected);
}

#[test]
fn repeated_download_is_idempotent() {
    let s = sim();
    let first = s.pipeline.download_file("Language").unwrap();
    let snapshot: Vec<_> = s
        .pipeline
        .staging()
        .staged_blocks("Language")
        .unwrap()
        .into_iter()
        .map(|(b, p)| (b, std::fs::read_to_string(p).unwrap()))
        .collect();

    let second = s.pipeline.download_file("Language").unwrap();
    let again: Vec<_> = s
        .pipeline
        .staging()
        .staged_blocks("Language")
        .unwrap()
        .into_iter()
        .map(|(b, p)| (b, std::fs::read_to_string(p).unwrap()))
        .collect();

    assert_eq!(first, second);
    assert_eq!(snapshot, again);
    assert_eq!(again.len(), 3);
}

#[test]
fn merge_without_staging_names_path_and_file() {
    let s = sim();
    let err = s.pipeline.merge_file("Math").unwrap_err();

    let missing = s.staging_dir.join("Math");
    assert!(matches!(&err, MergeError::MissingStaging { path, file_id }
        if *path == missing && file_id == "Math"));
    let msg = err.to_string();
    assert!(msg.contains(&missing.display().to_string()), "{msg}");
    assert!(msg.contains("Math"), "{msg}");
    assert!(!s.staging_dir.join("Math_merged").exists());
    assert!(s.pipeline.notifications().is_empty());
}

#[test]
fn empty_block_leaves_empty_artifact_behind() {
    let s = sim();
    s.pipeline
        .staging()
        .write_block("Blank", BlockId { ordinal: 1 }, "")
        .unwrap();

    let err = s.pipeline.merge_file("Blank").unwrap_err();
    assert!(matches!(err, MergeError::ArtifactInvalid { .. }));
    assert_eq!(err.to_string(), "merged artifact invalid or empty");

    let artifact = s.staging_dir.join("Blank_merged");
    assert!(artifact.exists());
    assert_eq!(std::fs::metadata(artifact).unwrap().len(), 0);
    assert!(s.pipeline.notifications().is_empty());
}

#[test]
fn math_downloads_and_merges() {
    let s = sim();
    let r = s.pipeline.download_file("Math").unwrap();
    assert!(r.success);
    assert_eq!(r.succeeded.len(), 5);

    let m = s.pipeline.merge_file("Math").unwrap();
    assert_eq!(
        m.content,
        "Content of Math block 1\nContent of Math block 2\nContent of Math block 3\n\
         Content of Math block 4\nContent of Math block 5"
    );
    assert_eq!(m.artifact, s.staging_dir.join("Math_merged"));
}

#[test]
fn corrupt_language_block_is_skipped_by_merge() {
    let s = sim();
    corrupt(&s, "Language", 2);

    let r = s.pipeline.download_file("Language").unwrap();
    assert!(!r.success);
    assert_eq!(
        r.message,
        "2 of 3 blocks downloaded for Language. Check notifications for errors."
    );
    assert_eq!(r.failed.len(), 1);
    assert_eq!(r.failed[0].block, BlockId { ordinal: 2 });
    assert_eq!(r.failed[0].error, "block content invalid");

    let notes = s.pipeline.notifications().list();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].kind, NotificationKind::InvalidBlock);
    assert_eq!(notes[0].file_id(), Some("Language"));

    let m = s.pipeline.merge_file("Language").unwrap();
    assert_eq!(
        m.content,
        "Content of Language block 1\nContent of Language block 3"
    );
}

#[test]
fn unknown_and_empty_files_short_circuit() {
    let s = sim();
    let r = s.pipeline.download_file("Geography").unwrap();
    assert_eq!(r.status_class, StatusClass::ServerError);
    assert!(r.message.starts_with("error obtaining listing for Geography: "));

    std::fs::create_dir_all(s._tmp.path().join("api").join("Blank")).unwrap();
    let r = s.pipeline.download_file("Blank").unwrap();
    assert_eq!(r.status_class, StatusClass::NotFound);

    let kinds: Vec<_> = s.pipeline.notifications().list().iter().map(|n| n.kind).collect();
    assert_eq!(kinds, [NotificationKind::ApiFileError, NotificationKind::FileEmpty]);

    let err = s.pipeline.merge_file("Geography").unwrap_err();
    assert_eq!(err.to_string(), "no blocks found to merge for Geography");
}

#[test]
fn distinct_files_download_concurrently() {
    let s = sim();
    std::thread::scope(|scope| {
        let handles: Vec<_> = ["Math", "Language", "History"]
            .into_iter()
            .map(|f| {
                let p = &s.pipeline;
                scope.spawn(move || p.download_file(f).unwrap())
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap().success);
        }
    });
    assert_eq!(s.pipeline.staging().staged_blocks("History").unwrap().len(), 7);
}

#[test]
fn same_file_downloads_serialize() {
    let s = sim();
    std::thread::scope(|scope| {
        for _ in 0..4 {
            let p = &s.pipeline;
            scope.spawn(move || assert!(p.download_file("History").unwrap().success));
        }
    });
    let m = s.pipeline.merge_file("History").unwrap();
    assert_eq!(m.content.lines().count(), 7);
}

#[test]
fn artifact_name_is_not_a_downloadable_file_id() {
    let s = sim();
    s.pipeline.download_file("Math").unwrap();
    s.pipeline.merge_file("Math").unwrap();

    assert!(matches!(
        s.pipeline.download_file("Math_merged"),
        Err(StageError::InvalidFileId(id)) if id == "Math_merged"
    ));
    assert!(matches!(
        s.pipeline.merge_file("Math_merged"),
        Err(MergeError::Stage(StageError::InvalidFileId(_)))
    ));
    assert!(s.staging_dir.join("Math_merged").is_file());
    assert!(s.pipeline.notifications().is_empty());
}
