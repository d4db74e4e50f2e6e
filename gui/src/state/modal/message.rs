use crate::{
    TryIntoExt, bold_text,
    context::Context,
    message::{Message, UiMessage, ui_messages::MessageDialog as MyMessage},
};

use color_eyre::Result;
use iced::{
    Border, Color, Element, Length,
    widget::{button, column, container, row, scrollable, space, text},
};

use super::DialogResult;

/// Title, scrollable text and an Ok button. Used for failures outside the edit flow.
#[derive(Debug, Clone)]
pub struct MessageDialog {
    pub title: String,
    pub message: String,
}

impl MessageDialog {
    pub fn new(title: String, message: &str) -> Self {
        Self {
            title,
            message: message.to_string(),
        }
    }
}

impl super::Dialog for MessageDialog {
    fn update(&mut self, event: UiMessage, _ctx: &mut Context) -> Result<DialogResult> {
        use MyMessage::*;

        match event.try_into_ex()? {
            Confirm => Ok(DialogResult::Close(iced::Task::none())),
            CopyDetails => Ok(DialogResult::Close(iced::clipboard::write::<Message>(
                self.message.clone(),
            ))),
        }
    }

    fn view<'a>(&'a self, _ctx: &'a Context) -> Element<'a, UiMessage> {
        container(
            column![
                bold_text(&self.title).size(20),
                container(scrollable(text(&self.message)).height(Length::Shrink))
                    .style(|_theme| container::background(Color::from_rgb(0.95, 0.95, 0.95)))
                    .padding(20),
                row![
                    space::horizontal(),
                    button("Copy & close").on_press(MyMessage::CopyDetails.into()),
                    button("Ok").on_press(MyMessage::Confirm.into()),
                ]
                .spacing(10)
            ]
            .spacing(10),
        )
        .padding(20)
        .max_width(700)
        .max_height(500)
        .style(|_theme| container::background(Color::WHITE).border(Border::default().rounded(10)))
        .into()
    }
}
