use derive_more::{From, TryInto};
use engine::{
    EditError,
    session::{EditResult, SelectionId},
};

#[derive(Debug, Clone, From, TryInto)]
pub enum Message {
    Ui(UiMessage),
    Context(ContextMessage),
}

#[derive(Debug, Clone, From, TryInto)]
pub enum UiMessage {
    Editor(ui_messages::Editor),
    MessageDialog(ui_messages::MessageDialog),
}

/// Results of async work, handled by the context regardless of the active state
#[derive(Debug, Clone)]
pub enum ContextMessage {
    PreviewReady(SelectionId, Result<String, EditError>),
    EditFinished(EditResult),
}

impl From<ui_messages::Editor> for Message {
    fn from(m: ui_messages::Editor) -> Self {
        Message::Ui(m.into())
    }
}

pub mod ui_messages {
    use std::path::PathBuf;

    use iced::widget::text_editor;

    #[derive(Debug, Clone)]
    pub enum Editor {
        PickImage,
        ImagePicked(Option<PathBuf>),
        UpdateInstruction(text_editor::Action),
        Submit,
    }

    #[derive(Debug, Clone)]
    pub enum MessageDialog {
        Confirm,
        CopyDetails,
    }
}
