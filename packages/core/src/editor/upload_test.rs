//! Placeholder state machine tests: every transition of the lifecycle plus
//! the validation boundaries from the drop zone.

use super::*;

fn png(bytes: usize) -> FileUpload {
    FileUpload::new("photo.png", "image/png", vec![0u8; bytes])
}

#[test]
fn test_drag_enter_and_leave() {
    let (state, effects) = transition(PlaceholderState::new(), UploadEvent::DragEnter);
    assert_eq!(state.state, UploadState::Dragging);
    assert!(effects.is_empty());

    let (state, effects) = transition(state, UploadEvent::DragLeave);
    assert_eq!(state.state, UploadState::idle());
    assert!(effects.is_empty());
}

#[test]
fn test_drop_valid_file_starts_upload() {
    let (state, effects) = transition(PlaceholderState::new(), UploadEvent::Drop(png(1024)));
    assert_eq!(state.state, UploadState::Uploading);
    assert_eq!(effects, vec![UploadEffect::StartUpload(png(1024))]);
}

#[test]
fn test_upload_success_replaces_block() {
    let (state, _) = transition(PlaceholderState::new(), UploadEvent::Drop(png(10)));
    let (state, effects) = transition(
        state,
        UploadEvent::UploadSucceeded {
            url: "https://cdn.example.com/photo.png".into(),
        },
    );
    assert_eq!(state.state, UploadState::idle());
    assert_eq!(
        effects,
        vec![UploadEffect::ReplaceWithImage {
            src: "https://cdn.example.com/photo.png".into()
        }]
    );
}

#[test]
fn test_upload_failure_returns_to_idle_with_error() {
    let (state, _) = transition(PlaceholderState::new(), UploadEvent::Drop(png(10)));
    let (state, effects) = transition(
        state,
        UploadEvent::UploadFailed {
            message: "bucket unavailable".into(),
        },
    );
    assert_eq!(
        state.state,
        UploadState::Idle {
            error: Some("bucket unavailable".into())
        }
    );
    assert!(effects.is_empty());

    // retry is a fresh attempt
    let (state, effects) = transition(state, UploadEvent::Drop(png(10)));
    assert_eq!(state.state, UploadState::Uploading);
    assert_eq!(effects.len(), 1);
}

#[test]
fn test_second_drop_while_uploading_is_ignored() {
    let (state, _) = transition(PlaceholderState::new(), UploadEvent::Drop(png(10)));
    let (state, effects) = transition(state, UploadEvent::Drop(png(20)));
    assert_eq!(state.state, UploadState::Uploading);
    assert!(effects.is_empty());

    let (state, effects) = transition(state, UploadEvent::PickFile(png(30)));
    assert_eq!(state.state, UploadState::Uploading);
    assert!(effects.is_empty());
}

#[test]
fn test_non_image_file_rejected_before_io() {
    let file = FileUpload::new("notes.pdf", "application/pdf", vec![0u8; 128]);
    let (state, effects) = transition(PlaceholderState::new(), UploadEvent::Drop(file));
    assert!(effects.is_empty());
    match state.state {
        UploadState::Idle { error: Some(msg) } => assert!(msg.contains("application/pdf")),
        other => panic!("expected idle with error, got {other:?}"),
    }
}

#[test]
fn test_size_boundary_exactly_5_mib_accepted() {
    assert!(validate_file(&png(MAX_UPLOAD_BYTES)).is_ok());
    assert_eq!(
        validate_file(&png(MAX_UPLOAD_BYTES + 1)),
        Err(UploadError::TooLarge {
            size: MAX_UPLOAD_BYTES + 1,
            max: MAX_UPLOAD_BYTES,
        })
    );
}

#[test]
fn test_disallowed_mime_rejected_regardless_of_size() {
    let tiny = FileUpload::new("a.txt", "text/plain", vec![0u8; 1]);
    assert!(matches!(
        validate_file(&tiny),
        Err(UploadError::NotAnImage { .. })
    ));
}

#[test]
fn test_submit_invalid_url_keeps_entry_open() {
    let (state, _) = transition(PlaceholderState::new(), UploadEvent::ToggleUrlEntry);
    assert!(state.url_entry_open);

    let (state, effects) = transition(state, UploadEvent::SubmitUrl("not a url".into()));
    assert!(effects.is_empty());
    assert!(state.url_entry_open);
    assert!(state.url_error.is_some());
}

#[test]
fn test_submit_valid_url_replaces_immediately() {
    let (state, _) = transition(PlaceholderState::new(), UploadEvent::ToggleUrlEntry);
    let (state, effects) = transition(
        state,
        UploadEvent::SubmitUrl("https://example.com/a.png".into()),
    );
    assert_eq!(
        effects,
        vec![UploadEffect::ReplaceWithImage {
            src: "https://example.com/a.png".into()
        }]
    );
    assert!(state.url_error.is_none());
}

#[test]
fn test_closing_url_entry_clears_inline_error() {
    let (state, _) = transition(PlaceholderState::new(), UploadEvent::ToggleUrlEntry);
    let (state, _) = transition(state, UploadEvent::SubmitUrl("nope".into()));
    assert!(state.url_error.is_some());

    let (state, _) = transition(state, UploadEvent::ToggleUrlEntry);
    assert!(!state.url_entry_open);
    assert!(state.url_error.is_none());
}

#[test]
fn test_delete_emits_remove_even_while_uploading() {
    let (state, _) = transition(PlaceholderState::new(), UploadEvent::Drop(png(10)));
    let (_, effects) = transition(state, UploadEvent::Delete);
    assert_eq!(effects, vec![UploadEffect::RemoveBlock]);
}

#[test]
fn test_transition_is_deterministic() {
    let a = transition(PlaceholderState::new(), UploadEvent::Drop(png(5)));
    let b = transition(PlaceholderState::new(), UploadEvent::Drop(png(5)));
    assert_eq!(a, b);
}

#[test]
fn test_url_validation() {
    assert!(validate_absolute_url("https://example.com/a.png").is_ok());
    assert!(validate_absolute_url("http://cdn.example.com/images/1").is_ok());
    assert!(validate_absolute_url("not a url").is_err());
    assert!(validate_absolute_url("ftp://example.com/a.png").is_err());
    assert!(validate_absolute_url("/relative/path.png").is_err());
    assert!(validate_absolute_url("").is_err());
}
