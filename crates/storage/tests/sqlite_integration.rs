use quiz_core::model::{Choice, ExamId, QuestionStatus, SessionSnapshot};
use quiz_core::time::fixed_now;
use storage::repository::{SelectionStore, SessionStore, Storage, StorageError};
use storage::sqlite::SqliteRepository;

fn snapshot() -> SessionSnapshot {
    let mut statuses = vec![QuestionStatus::default(); 3];
    statuses[0] = QuestionStatus {
        answered: true,
        marked: false,
        selected: Some(Choice::from_letter('B').unwrap()),
        credited: true,
    };
    statuses[2].marked = true;
    SessionSnapshot {
        current_index: 2,
        selected: None,
        mark_question: true,
        question_status: statuses,
        score: 1,
        remaining_seconds: 4321,
        saved_at: Some(fixed_now()),
    }
}

async fn repo(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_snapshot_roundtrip_and_clear() {
    let repo = repo("memdb_snapshots").await;
    let exam = ExamId::numbered(3);

    assert_eq!(repo.load_snapshot(&exam).await.unwrap(), None);

    repo.save_snapshot(&exam, &snapshot()).await.unwrap();
    assert_eq!(repo.load_snapshot(&exam).await.unwrap(), Some(snapshot()));

    let mut updated = snapshot();
    updated.current_index = 0;
    updated.remaining_seconds = 10;
    repo.save_snapshot(&exam, &updated).await.unwrap();
    assert_eq!(repo.load_snapshot(&exam).await.unwrap(), Some(updated));

    repo.clear_snapshot(&exam).await.unwrap();
    assert_eq!(repo.load_snapshot(&exam).await.unwrap(), None);
}

#[tokio::test]
async fn sqlite_snapshots_do_not_leak_between_exams() {
    let repo = repo("memdb_keyed").await;
    let first = ExamId::numbered(1);
    let second = ExamId::numbered(2);

    repo.save_snapshot(&first, &snapshot()).await.unwrap();
    assert_eq!(repo.load_snapshot(&second).await.unwrap(), None);

    repo.clear_snapshot(&second).await.unwrap();
    assert!(repo.load_snapshot(&first).await.unwrap().is_some());
}

#[tokio::test]
async fn sqlite_corrupt_payload_is_a_serialization_error() {
    let repo = repo("memdb_corrupt").await;
    let exam = ExamId::numbered(5);
    repo.insert_raw_snapshot(&exam, "[\"not\", \"an\", \"object\"]")
        .await
        .unwrap();

    let err = repo.load_snapshot(&exam).await.unwrap_err();
    assert!(matches!(err, StorageError::Serialization(_)));
}

#[tokio::test]
async fn sqlite_selected_exam_roundtrip() {
    let repo = repo("memdb_selection").await;
    assert_eq!(repo.selected_exam().await.unwrap(), None);

    let exam = ExamId::numbered(17);
    repo.set_selected_exam(Some(&exam)).await.unwrap();
    assert_eq!(repo.selected_exam().await.unwrap(), Some(exam));

    repo.set_selected_exam(None).await.unwrap();
    assert_eq!(repo.selected_exam().await.unwrap(), None);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = repo("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
}

#[tokio::test]
async fn storage_sqlite_wires_both_stores() {
    let storage = Storage::sqlite("sqlite:file:memdb_storage?mode=memory&cache=shared")
        .await
        .expect("storage");
    let exam = ExamId::numbered(8);

    storage.sessions.save_snapshot(&exam, &snapshot()).await.unwrap();
    storage.selection.set_selected_exam(Some(&exam)).await.unwrap();

    assert!(storage.sessions.load_snapshot(&exam).await.unwrap().is_some());
    assert_eq!(storage.selection.selected_exam().await.unwrap(), Some(exam));
}
