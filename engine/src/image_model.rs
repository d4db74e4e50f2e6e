use std::pin::Pin;

use strum::Display;

pub mod gemini;
pub use gemini::Gemini;

use crate::{EditError, EditorBox, encoder::EncodedPayload};

#[derive(Debug, Clone, Copy, Display, clap::ValueEnum, Hash, PartialEq, Eq, Default)]
pub enum Model {
    #[default]
    #[strum(to_string = "Gemini 2.5 Flash Image")]
    FlashImage,
    #[strum(to_string = "Gemini 3 Pro Image")]
    ProImage,
}

impl Model {
    pub fn make(&self, key: String) -> EditorBox {
        Box::new(Gemini::new(key, *self))
    }

    /// Identifier used in the endpoint path
    pub fn api_name(&self) -> &'static str {
        match self {
            Model::FlashImage => "gemini-2.5-flash-image",
            Model::ProImage => "gemini-3-pro-image-preview",
        }
    }
}

/// Something that can apply a text instruction to an encoded image.
///
/// Resolves to the base64 data of the edited image. Exactly one remote request
/// is made per call; callers are responsible for not overlapping calls.
pub trait ImageEditor: Send + Sync {
    fn edit_image<'a>(
        &'a self,
        payload: &'a EncodedPayload,
        instruction: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, EditError>> + Send + 'a>>;

    fn clone(&self) -> EditorBox;
    fn model(&self) -> Model;
}
