//! The interactive state behind the editor window, without any widgets.
//!
//! A [`Session`] only changes in response to a user action or to one of the two
//! asynchronous outcomes (preview ready, edit finished). The GUI owns one and
//! renders from it; the async work itself happens in [`perform_edit`] and
//! [`crate::encoder::read_as_data_url`].

use base64::{Engine, engine::general_purpose::STANDARD};
use log::{debug, error, warn};

use crate::{
    EditError, EditorBox,
    encoder::{self, ImageFile},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Missing image or instruction
    Idle,
    Ready,
    Submitting,
}

/// Identifies one pick of an image, so late previews of earlier picks can be dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectionId(u64);

/// What a validated submit hands to [`perform_edit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    pub file: ImageFile,
    pub instruction: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditedImage {
    pub data: String,
    pub media_type: String,
}

impl EditedImage {
    pub fn data_url(&self) -> String {
        encoder::data_url(&self.media_type, &self.data)
    }
}

pub type EditResult = Result<EditedImage, EditError>;

#[derive(Debug, Default)]
pub struct Session {
    selected_image: Option<ImageFile>,
    selection: u64,
    preview_url: Option<String>,
    result_url: Option<String>,
    instruction: String,
    busy: bool,
    error_message: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_image(&self) -> Option<&ImageFile> {
        self.selected_image.as_ref()
    }

    pub fn preview_url(&self) -> Option<&str> {
        self.preview_url.as_deref()
    }

    pub fn result_url(&self) -> Option<&str> {
        self.result_url.as_deref()
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn phase(&self) -> Phase {
        if self.busy {
            Phase::Submitting
        } else if self.selected_image.is_some() && !self.instruction.trim().is_empty() {
            Phase::Ready
        } else {
            Phase::Idle
        }
    }

    pub fn can_submit(&self) -> bool {
        self.phase() == Phase::Ready
    }

    /// Always allowed, even while an edit is in flight. The old preview stays
    /// visible until the new one arrives.
    pub fn select_image(&mut self, file: ImageFile) -> SelectionId {
        debug!("Selected {:?} ({})", file.path, file.media_type);
        self.selected_image = Some(file);
        self.result_url = None;
        self.error_message = None;
        self.selection += 1;
        SelectionId(self.selection)
    }

    /// Returns whether the preview changed
    pub fn preview_ready(&mut self, id: SelectionId, preview: Result<String, EditError>) -> bool {
        if id != SelectionId(self.selection) {
            debug!("Dropping preview of superseded selection {id:?}");
            return false;
        }

        match preview {
            Ok(url) => {
                self.preview_url = Some(url);
                true
            }
            Err(e) => {
                warn!("Couldn't produce preview: {e}");
                if self.result_url.is_none() {
                    self.error_message = Some(e.to_string());
                }
                false
            }
        }
    }

    /// Returns whether the text was taken. Edits are refused while submitting.
    pub fn set_instruction(&mut self, text: impl Into<String>) -> bool {
        if self.busy {
            return false;
        }
        self.instruction = text.into();
        true
    }

    /// Starts a submission if the input is complete.
    ///
    /// Inert while busy. Incomplete input only sets the validation message.
    pub fn begin_submit(&mut self) -> Option<PendingEdit> {
        if self.busy {
            return None;
        }

        let blank = self.instruction.trim().is_empty();
        let Some(file) = self.selected_image.clone().filter(|_| !blank) else {
            self.result_url = None;
            self.error_message = Some(EditError::Validation.to_string());
            return None;
        };

        let pending = PendingEdit {
            file,
            instruction: self.instruction.clone(),
        };
        self.error_message = None;
        self.result_url = None;
        self.busy = true;
        Some(pending)
    }

    pub fn finish_submit(&mut self, result: EditResult) {
        if !self.busy {
            warn!("Edit finished while no submission was running, ignoring it");
            return;
        }

        self.busy = false;
        match result {
            Ok(image) => {
                self.result_url = Some(image.data_url());
                self.error_message = None;
            }
            Err(e) => {
                error!("Edit failed: {e}");
                self.result_url = None;
                self.error_message = Some(e.to_string());
            }
        }
    }
}

/// Encodes the file, then asks the editor. Strictly in that order.
///
/// Data that isn't valid base64 counts as a failed edit, so it never reaches the
/// result area.
pub async fn perform_edit(pending: PendingEdit, editor: EditorBox) -> EditResult {
    let payload = encoder::encode(&pending.file).await?;
    let data = editor.edit_image(&payload, &pending.instruction).await?;
    STANDARD
        .decode(&data)
        .map_err(|e| EditError::service(format!("Malformed image data in response: {e}")))?;
    Ok(EditedImage {
        data,
        media_type: payload.media_type,
    })
}

#[cfg(test)]
mod tests {
    use std::{
        io::Write,
        pin::Pin,
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use tempfile::NamedTempFile;

    use super::*;
    use crate::{
        encoder::EncodedPayload,
        image_model::{ImageEditor, Model},
    };

    #[derive(Clone)]
    struct FakeEditor {
        answer: Result<String, EditError>,
        calls: Arc<AtomicUsize>,
        seen: Arc<std::sync::Mutex<Vec<(EncodedPayload, String)>>>,
    }

    impl FakeEditor {
        fn answering(answer: Result<String, EditError>) -> Self {
            Self {
                answer,
                calls: Arc::default(),
                seen: Arc::default(),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ImageEditor for FakeEditor {
        fn edit_image<'a>(
            &'a self,
            payload: &'a EncodedPayload,
            instruction: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<String, EditError>> + Send + 'a>> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                self.seen
                    .lock()
                    .unwrap()
                    .push((payload.clone(), instruction.to_string()));
                self.answer.clone()
            })
        }

        fn clone(&self) -> EditorBox {
            Box::new(Clone::clone(self))
        }

        fn model(&self) -> Model {
            Model::default()
        }
    }

    // 10x10 red PNG; nothing here decodes it
    const RED_PNG: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x0A, 0x00, 0x00, 0x00, 0x0A, 0x08, 0x02, 0x00, 0x00, 0x00, 0x02,
        0x50, 0x58, 0xEA, 0x00, 0x00, 0x00, 0x12, 0x49, 0x44, 0x41, 0x54, 0x78, 0xDA, 0x63, 0xF8,
        0xCF, 0xC0, 0x80, 0x07, 0x31, 0x8C, 0x4A, 0x63, 0x01, 0x00, 0x41, 0x2C, 0x71, 0x01, 0xA4,
        0xAC, 0x5F, 0x5B, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    fn red_png() -> (NamedTempFile, ImageFile) {
        let mut tmp = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        tmp.write_all(RED_PNG).unwrap();
        let file = ImageFile::from_path(tmp.path());
        (tmp, file)
    }

    fn ready_session(file: ImageFile, instruction: &str) -> Session {
        let mut session = Session::new();
        session.select_image(file);
        session.set_instruction(instruction);
        session
    }

    /// Runs one submission through the given editor, checking busy along the way
    async fn submit(session: &mut Session, editor: &FakeEditor) {
        let pending = session.begin_submit().expect("submission should start");
        assert!(session.is_busy());
        assert_eq!(session.phase(), Phase::Submitting);
        assert!(session.result_url().is_none());
        assert!(session.error_message().is_none());

        let result = perform_edit(pending, ImageEditor::clone(editor)).await;
        assert!(session.is_busy());
        session.finish_submit(result);
        assert!(!session.is_busy());
    }

    #[test]
    fn starts_empty() {
        let session = Session::new();
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.selected_image().is_none());
        assert!(session.preview_url().is_none());
        assert!(session.result_url().is_none());
        assert!(session.error_message().is_none());
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn successful_edit_shows_result() {
        let (_tmp, file) = red_png();
        let editor = FakeEditor::answering(Ok("Ymx1ZQ==".into()));
        let mut session = ready_session(file, "make it blue");
        assert_eq!(session.phase(), Phase::Ready);

        submit(&mut session, &editor).await;

        assert_eq!(session.result_url(), Some("data:image/png;base64,Ymx1ZQ=="));
        assert!(session.error_message().is_none());
        assert_eq!(editor.calls(), 1);

        let seen = editor.seen.lock().unwrap();
        let (payload, instruction) = &seen[0];
        assert_eq!(payload.media_type, "image/png");
        assert_eq!(
            encoder::decode_data_url(&encoder::data_url("image/png", &payload.data)).unwrap(),
            RED_PNG
        );
        assert_eq!(instruction, "make it blue");
    }

    #[test]
    fn submit_without_image_is_a_validation_error() {
        let mut session = Session::new();
        session.set_instruction("make it blue");

        assert!(session.begin_submit().is_none());
        assert!(!session.is_busy());
        assert_eq!(
            session.error_message(),
            Some("Please upload an image and enter a prompt.")
        );
    }

    #[test]
    fn blank_instruction_is_a_validation_error() {
        let (_tmp, file) = red_png();
        let mut session = ready_session(file, " \n");
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.begin_submit().is_none());
        assert_eq!(
            session.error_message(),
            Some(EditError::Validation.to_string().as_str())
        );
    }

    #[tokio::test]
    async fn text_only_response_shows_no_image_error() {
        let (_tmp, file) = red_png();
        let editor = FakeEditor::answering(Err(EditError::NoImageProduced));
        let mut session = ready_session(file, "make it blue");

        submit(&mut session, &editor).await;

        assert!(session.result_url().is_none());
        assert!(
            session
                .error_message()
                .unwrap()
                .starts_with("No image data was found")
        );
    }

    #[tokio::test]
    async fn auth_failure_is_prefixed() {
        let (_tmp, file) = red_png();
        let editor = FakeEditor::answering(Err(EditError::service(
            "Authentication error (401): API key not valid",
        )));
        let mut session = ready_session(file, "make it blue");

        submit(&mut session, &editor).await;

        assert_eq!(
            session.error_message(),
            Some("Failed to edit image: Authentication error (401): API key not valid")
        );
        assert!(session.result_url().is_none());
    }

    #[tokio::test]
    async fn unreadable_file_never_reaches_the_editor() {
        let (tmp, file) = red_png();
        let editor = FakeEditor::answering(Ok("Ymx1ZQ==".into()));
        let mut session = ready_session(file, "make it blue");
        drop(tmp);

        submit(&mut session, &editor).await;

        assert_eq!(editor.calls(), 0);
        assert!(session.error_message().unwrap().starts_with("Failed to read"));
        assert!(session.result_url().is_none());
    }

    #[tokio::test]
    async fn undecodable_image_data_is_an_error() {
        let (_tmp, file) = red_png();
        let editor = FakeEditor::answering(Ok("not base64 at all!!".into()));
        let mut session = ready_session(file, "make it blue");

        submit(&mut session, &editor).await;

        assert!(session.result_url().is_none());
        assert!(
            session
                .error_message()
                .unwrap()
                .starts_with("Failed to edit image: Malformed image data in response")
        );
    }

    #[tokio::test]
    async fn instruction_is_sent_as_typed() {
        let (_tmp, file) = red_png();
        let editor = FakeEditor::answering(Ok("Ymx1ZQ==".into()));
        let mut session = ready_session(file, "  make it blue\n");

        submit(&mut session, &editor).await;

        assert_eq!(editor.seen.lock().unwrap()[0].1, "  make it blue\n");
    }

    #[tokio::test]
    async fn new_submission_clears_previous_outcome() {
        let (_tmp, file) = red_png();
        let ok = FakeEditor::answering(Ok("Ymx1ZQ==".into()));
        let failing = FakeEditor::answering(Err(EditError::NoImageProduced));
        let mut session = ready_session(file, "make it blue");

        submit(&mut session, &ok).await;
        assert!(session.result_url().is_some());

        // the previous result must not come back after a failure
        submit(&mut session, &failing).await;
        assert!(session.result_url().is_none());
        assert!(session.error_message().is_some());

        submit(&mut session, &ok).await;
        assert!(session.error_message().is_none());
        assert!(session.result_url().is_some());
    }

    #[test]
    fn submit_is_inert_while_busy() {
        let (_tmp, file) = red_png();
        let mut session = ready_session(file, "make it blue");
        assert!(session.begin_submit().is_some());

        assert!(session.begin_submit().is_none());
        assert!(session.is_busy());
        assert!(session.error_message().is_none());
    }

    #[test]
    fn instruction_is_frozen_while_busy() {
        let (_tmp, file) = red_png();
        let mut session = ready_session(file, "make it blue");
        session.begin_submit().unwrap();

        assert!(!session.set_instruction("make it green"));
        assert_eq!(session.instruction(), "make it blue");

        session.finish_submit(Err(EditError::NoImageProduced));
        assert!(session.set_instruction("make it green"));
        assert_eq!(session.instruction(), "make it green");
    }

    #[test]
    fn validation_error_clears_shown_result() {
        let (_tmp, file) = red_png();
        let mut session = ready_session(file, "make it blue");
        session.begin_submit().unwrap();
        session.finish_submit(Ok(EditedImage {
            data: "Ymx1ZQ==".into(),
            media_type: "image/png".into(),
        }));

        session.set_instruction("");
        assert!(session.begin_submit().is_none());
        assert!(session.result_url().is_none());
        assert!(session.error_message().is_some());
    }

    #[test]
    fn selecting_clears_result_and_error() {
        let (_tmp, file) = red_png();
        let mut session = Session::new();
        session.begin_submit();
        assert!(session.error_message().is_some());

        session.select_image(file);
        assert!(session.error_message().is_none());
        assert!(session.result_url().is_none());
    }

    #[test]
    fn stale_preview_is_dropped() {
        let (_tmp, file) = red_png();
        let mut session = Session::new();
        let first = session.select_image(file.clone());
        let second = session.select_image(file);

        assert!(!session.preview_ready(first, Ok("data:image/png;base64,Zmlyc3Q=".into())));
        assert!(session.preview_url().is_none());

        assert!(session.preview_ready(second, Ok("data:image/png;base64,c2Vjb25k".into())));
        assert_eq!(session.preview_url(), Some("data:image/png;base64,c2Vjb25k"));
    }

    #[test]
    fn failed_preview_is_reported() {
        let (_tmp, file) = red_png();
        let mut session = Session::new();
        let id = session.select_image(file);

        assert!(!session.preview_ready(id, Err(EditError::Format)));
        assert_eq!(
            session.error_message(),
            Some("Could not extract base64 string from file data URL.")
        );
    }

    #[test]
    fn late_finish_without_submission_is_ignored() {
        let mut session = Session::new();
        session.finish_submit(Err(EditError::NoImageProduced));
        assert!(session.error_message().is_none());
    }
}
