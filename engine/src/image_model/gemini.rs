use std::pin::Pin;

use log::{debug, warn};

use crate::{
    EditError, EditorBox,
    encoder::EncodedPayload,
    image_model::{ImageEditor, Model},
};

pub mod gemini_api;

#[derive(Clone)]
pub struct Gemini {
    api_key: String,
    model: Model,
    client: reqwest::Client,
}

impl Gemini {
    pub fn new(api_key: String, model: Model) -> Self {
        Self {
            api_key,
            model,
            client: reqwest::Client::new(),
        }
    }
}

impl ImageEditor for Gemini {
    fn edit_image<'a>(
        &'a self,
        payload: &'a EncodedPayload,
        instruction: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, EditError>> + Send + 'a>> {
        Box::pin(async move {
            let body = gemini_api::RequestBody::edit(payload, instruction);
            let response =
                gemini_api::generate_content(&body, self.model, &self.api_key, &self.client)
                    .await?;
            debug!("{} candidate(s) in response", response.candidates.len());

            let reason = response.refusal_reason();
            let Some(image) = gemini_api::first_inline_image(response) else {
                warn!(
                    "No image in response: {}",
                    reason.as_deref().unwrap_or("no reason given")
                );
                return Err(EditError::NoImageProduced);
            };

            // The result is labelled with the input's media type regardless.
            if let Some(mime_type) = image.mismatched_media_type(&payload.media_type) {
                warn!(
                    "Response image is {mime_type}, but will be shown as {}",
                    payload.media_type
                );
            }

            Ok(image.data)
        })
    }

    fn clone(&self) -> EditorBox {
        Box::new(Clone::clone(self))
    }

    fn model(&self) -> Model {
        self.model
    }
}
