//! Commission review flow: note editing, pre-flight validation, full-replace
//! saves, and abortable document previews.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;

use avancement_client::api::ReviewApi;
use avancement_client::documents::DocumentPreviewer;
use avancement_client::error::ApiError;
use avancement_client::evaluation::NotesEditor;
use avancement_core::evaluation::{EvaluationNote, NoteRow, TemplateOutcome};

use common::{FakeBackend, CANDIDATURE_ID};

fn editor(backend: &Arc<FakeBackend>) -> NotesEditor {
    common::init_tracing();
    let api: Arc<dyn ReviewApi> = backend.clone();
    NotesEditor::new(api, CANDIDATURE_ID)
}

fn row(criterion: &str, score: &str, comment: &str) -> NoteRow {
    NoteRow {
        criterion: criterion.to_string(),
        score: score.to_string(),
        comment: comment.to_string(),
    }
}

#[tokio::test]
async fn empty_note_set_loads_as_single_blank_row() {
    let backend = Arc::new(FakeBackend::new());
    let editor = editor(&backend);
    editor.load().await.unwrap();

    let rows = editor.rows();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].is_blank());
}

#[tokio::test]
async fn out_of_range_score_blocks_before_network() {
    let backend = Arc::new(FakeBackend::new());
    let editor = editor(&backend);
    editor.load().await.unwrap();
    editor.set_row(0, row("Dossier scientifique", "101", ""));

    let err = editor.save().await.unwrap_err();
    assert_matches!(err, ApiError::Core(_));
    assert_eq!(backend.notes_saves.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_criterion_blocks_before_network() {
    let backend = Arc::new(FakeBackend::new());
    let editor = editor(&backend);
    editor.load().await.unwrap();
    editor.set_row(0, row("", "80", "bon dossier"));

    assert!(editor.save().await.is_err());
    assert_eq!(backend.notes_saves.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn save_replaces_full_note_set() {
    let backend = Arc::new(FakeBackend::new());
    *backend.notes.lock().unwrap() = vec![EvaluationNote {
        criterion: "Ancien critère".to_string(),
        score: Some(10.0),
        comment: None,
    }];

    let editor = editor(&backend);
    editor.load().await.unwrap();
    editor.set_row(0, row("Dossier scientifique", "85", ""));
    editor.push_row();
    editor.set_row(1, row("Encadrement", "", "à discuter"));

    editor.save().await.unwrap();

    let notes = backend.notes.lock().unwrap().clone();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].criterion, "Dossier scientifique");
    assert_eq!(notes[0].score, Some(85.0));
    assert_eq!(notes[1].score, None);
    assert_eq!(notes[1].comment.as_deref(), Some("à discuter"));
}

#[tokio::test]
async fn boundary_scores_are_accepted() {
    let backend = Arc::new(FakeBackend::new());
    let editor = editor(&backend);
    editor.load().await.unwrap();
    editor.set_row(0, row("Minimum", "0", ""));
    editor.push_row();
    editor.set_row(1, row("Maximum", "100", ""));

    editor.save().await.unwrap();
    assert_eq!(backend.notes_saves.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn duplicate_template_is_informational_not_fatal() {
    let backend = Arc::new(FakeBackend::new());
    let editor = editor(&backend);
    editor.load().await.unwrap();

    assert_eq!(
        editor.add_template("Dossier scientifique"),
        TemplateOutcome::Added
    );
    assert_eq!(
        editor.add_template("DOSSIER SCIENTIFIQUE"),
        TemplateOutcome::Duplicate
    );
    assert_eq!(editor.rows().len(), 1);
}

#[tokio::test]
async fn stats_cover_loaded_rows_only() {
    let backend = Arc::new(FakeBackend::new());
    let editor = editor(&backend);
    editor.load().await.unwrap();
    editor.set_row(0, row("A", "80", ""));
    editor.push_row();
    editor.set_row(1, row("B", "60", ""));
    editor.push_row();
    editor.set_row(2, row("C", "", "pas encore noté"));

    let stats = editor.stats();
    assert_eq!(stats.count, 2);
    assert_eq!(stats.avg, 70.0);
    assert_eq!(stats.total, 140.0);
    assert_eq!(stats.unscored, 1);
}

#[tokio::test]
async fn editor_always_keeps_one_row() {
    let backend = Arc::new(FakeBackend::new());
    let editor = editor(&backend);
    editor.load().await.unwrap();

    editor.remove_row(0);
    assert_eq!(editor.rows().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn superseded_preview_fetch_is_aborted() {
    let backend = Arc::new(FakeBackend::new());
    backend.store_document(1, b"premier".to_vec(), Duration::from_millis(200));
    backend.store_document(2, b"second".to_vec(), Duration::from_millis(50));

    let api: Arc<dyn ReviewApi> = backend.clone();
    let previewer = Arc::new(DocumentPreviewer::new(api));

    let first = {
        let previewer = Arc::clone(&previewer);
        tokio::spawn(async move { previewer.select(1).await })
    };
    // Let the first fetch get in flight before switching documents.
    tokio::task::yield_now().await;

    let second = previewer.select(2).await.unwrap();
    assert_eq!(second, b"second");
    assert_eq!(previewer.selected(), Some(2));

    let first = first.await.unwrap();
    assert_matches!(first, Err(ApiError::Cancelled));
}
