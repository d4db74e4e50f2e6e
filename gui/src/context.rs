use std::path::PathBuf;

use color_eyre::Result;
use engine::{
    EditorBox,
    config::Config,
    encoder::{self, ImageFile},
    image_model::ImageEditor,
    session::{self, Session},
};
use iced::{Task, advanced::image::Handle as ImgHandle};
use log::debug;

use crate::message::{ContextMessage, Message};

pub struct Context {
    pub config: Config,
    pub session: Session,
    pub preview: Option<ImgHandle>,
    pub result: Option<ImgHandle>,
    editor: EditorBox,
}

impl Context {
    pub fn from_config(config: Config) -> Self {
        Self {
            editor: config.make_editor(),
            config,
            session: Session::new(),
            preview: None,
            result: None,
        }
    }

    pub fn select_image(&mut self, path: PathBuf) -> Task<Message> {
        let file = ImageFile::from_path(path);
        let id = self.session.select_image(file.clone());
        self.result = None;

        Task::perform(
            async move { encoder::read_as_data_url(&file).await },
            move |res| ContextMessage::PreviewReady(id, res).into(),
        )
    }

    /// Starts an edit if the session agrees, otherwise does nothing async
    pub fn submit(&mut self) -> Task<Message> {
        let pending = self.session.begin_submit();
        if self.session.result_url().is_none() {
            self.result = None;
        }

        match pending {
            Some(pending) => {
                debug!("Submitting {:?}", pending.file.path);
                Task::perform(
                    session::perform_edit(pending, ImageEditor::clone(&*self.editor)),
                    |res| ContextMessage::EditFinished(res).into(),
                )
            }
            None => Task::none(),
        }
    }

    pub fn update(&mut self, message: ContextMessage) -> Result<Task<Message>> {
        use ContextMessage::*;
        match message {
            PreviewReady(id, preview) => {
                if self.session.preview_ready(id, preview) {
                    self.preview = self.session.preview_url().map(handle_from_url).transpose()?;
                }
            }
            EditFinished(result) => {
                self.session.finish_submit(result);
                self.result = self.session.result_url().map(handle_from_url).transpose()?;
            }
        }
        Ok(Task::none())
    }
}

fn handle_from_url(url: &str) -> Result<ImgHandle> {
    Ok(ImgHandle::from_bytes(encoder::decode_data_url(url)?))
}
