use super::*;
use chrono::{TimeZone, Utc};
use shared::domain::{Document, RecordId};

fn sample_record() -> QaRecord {
    QaRecord {
        id: RecordId("a1".to_string()),
        question: "What is X?".to_string(),
        answer: "X is Y".to_string(),
        timestamp: Utc
            .with_ymd_and_hms(2024, 5, 1, 10, 0, 0)
            .single()
            .expect("timestamp"),
        source_files: vec!["doc1.pdf".to_string()],
    }
}

#[test]
fn empty_session_renders_placeholders() {
    let state = SessionState::default();
    assert_eq!(render(&state), "No documents uploaded.\n");
    assert_eq!(render_history(&state), "No questions asked yet.\n");
}

#[test]
fn renders_documents_answer_and_error() {
    let state = SessionState {
        documents: vec![Document::new("doc1.pdf"), Document::new("doc2.pdf")],
        pending_question: "What is X?".to_string(),
        last_answer: "X is Y".to_string(),
        last_sources: vec!["doc1.pdf".to_string()],
        error: "disk full".to_string(),
        ..SessionState::default()
    };

    let rendered = render(&state);
    assert!(rendered.starts_with("Documents (2):\n  - doc1.pdf\n  - doc2.pdf\n"));
    assert!(rendered.contains("Question: What is X?\n"));
    assert!(rendered.contains("Answer:\n  X is Y\n  Sources: doc1.pdf\n"));
    assert!(rendered.ends_with("Error: disk full\n"));
    assert!(!rendered.contains("[working...]"));
}

#[test]
fn loading_is_shown_in_status() {
    let state = SessionState {
        loading: true,
        ..SessionState::default()
    };
    assert_eq!(render_status(&state), "[working...]\n");
}

#[test]
fn history_lists_records_with_timestamps() {
    let state = SessionState {
        history: vec![sample_record()],
        ..SessionState::default()
    };
    assert_eq!(
        render_history(&state),
        concat!(
            "History (1):\n",
            "  [2024-05-01 10:00 UTC] Q: What is X?\n",
            "      A: X is Y\n",
            "      Sources: doc1.pdf\n",
        )
    );
}

#[test]
fn ask_hint_follows_whether_asking_is_allowed() {
    let mut state = SessionState {
        pending_question: "What is X?".to_string(),
        ..SessionState::default()
    };
    assert_eq!(render_ask_hint(&state), "Upload a document before asking.\n");

    state.documents = vec![Document::new("doc1.pdf")];
    assert_eq!(render_ask_hint(&state), "Type 'ask' to submit the question.\n");

    state.loading = true;
    assert_eq!(
        render_ask_hint(&state),
        "Wait for the current operation to finish before asking.\n"
    );

    state.loading = false;
    state.pending_question = "  ".to_string();
    assert_eq!(render_ask_hint(&state), "Enter a question first.\n");
}
