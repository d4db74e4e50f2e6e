use std::path::PathBuf;

use color_eyre::Result;
use engine::encoder::IMAGE_EXTENSIONS;
use iced::{
    Border, Color, Element, Length, Task,
    alignment::Horizontal,
    widget::{
        self, Column, button, column, container, row, text,
        text_editor::{self, Edit},
    },
};

use crate::{
    APP_NAME, ElemHelper, TryIntoExt, bold_default_font, bold_text,
    context::Context,
    elem_list,
    message::{UiMessage, ui_messages::Editor as MyMessage},
    state::{State, StateCommand, cmd},
};

const SUBTITLE: &str = indoc::indoc! {"
    Edit your images with the power of AI. Just upload an image, describe your change,
    and let Gemini work its magic.
"};

const RESULT_SIZE: f32 = 420.;

/// The one screen of the application: upload, instruction, result
#[derive(Debug, Clone)]
pub struct Editor {
    instruction: text_editor::Content,
}

impl Editor {
    pub fn new() -> Self {
        Self {
            instruction: text_editor::Content::default(),
        }
    }

    fn update_instruction(
        &mut self,
        action: text_editor::Action,
        ctx: &mut Context,
    ) -> Result<StateCommand> {
        if let text_editor::Action::Edit(Edit::Enter) = action {
            return cmd::task(Task::done(MyMessage::Submit.into()));
        }

        if matches!(action, text_editor::Action::Edit(_)) && ctx.session.is_busy() {
            return cmd::none();
        }

        self.instruction.perform(action);
        ctx.session.set_instruction(self.instruction.text());
        cmd::none()
    }
}

impl State for Editor {
    fn update(&mut self, event: UiMessage, ctx: &mut Context) -> Result<StateCommand> {
        use MyMessage::*;
        match event.try_into_ex()? {
            PickImage => cmd::task(Task::perform(pick_image_file(), |p| ImagePicked(p).into())),
            ImagePicked(None) => cmd::none(),
            ImagePicked(Some(path)) => cmd::task(ctx.select_image(path)),
            UpdateInstruction(action) => self.update_instruction(action, ctx),
            Submit => cmd::task(ctx.submit()),
        }
    }

    fn view<'a>(&'a self, ctx: &'a Context) -> Element<'a, UiMessage> {
        let session = &ctx.session;
        let busy = session.is_busy();

        let header: Column<'_, UiMessage> = column![
            text(APP_NAME).font(bold_default_font()).size(36),
            text(SUBTITLE.trim_end()).size(16).width(Length::Fill).center(),
        ]
        .spacing(8)
        .align_x(Horizontal::Center)
        .width(Length::Fill);

        let mut instruction_editor = widget::text_editor(&self.instruction)
            .placeholder("e.g., 'Add a retro filter', 'Make the sky purple'")
            .height(112);
        if !busy {
            instruction_editor =
                instruction_editor.on_action(|a| UiMessage::from(MyMessage::UpdateInstruction(a)));
        }

        let inputs: Column<'_, UiMessage> = column(elem_list![
            bold_text("1. Upload Image").size(20),
            button(upload_area(ctx))
                .on_press(MyMessage::PickImage.into())
                .style(button::secondary)
                .width(Length::Fill),
            bold_text("2. Describe Your Edit").size(20),
            instruction_editor,
            button(
                text(if busy { "Generating..." } else { "Generate Edit" })
                    .width(Length::Fill)
                    .center()
            )
            .on_press_maybe(session.can_submit().then(|| MyMessage::Submit.into()))
            .padding(12)
            .width(Length::Fill),
        ])
        .spacing(16)
        .width(Length::FillPortion(1));

        let results: Column<'_, UiMessage> = column![
            bold_text("3. Result").size(20),
            container(result_area(ctx))
                .center(Length::Fixed(RESULT_SIZE))
                .style(|_theme| container::background(Color::from_rgb(0.95, 0.95, 0.95))
                    .border(Border::default().rounded(6))),
        ]
        .spacing(16)
        .width(Length::FillPortion(1));

        let mut main_col = Vec::from(elem_list![
            header,
            row![inputs, results].spacing(32),
        ]);

        if let Some(error) = session.error_message() {
            main_col.push(error_banner(error).into());
        }

        main_col.push(
            widget::text!("Powered by Google {}", ctx.config.model)
                .size(12)
                .width(Length::Fill)
                .center()
                .into(),
        );

        container(
            container(widget::scrollable(
                container(column(main_col).spacing(24)).padding(20),
            ))
            .max_width(1000),
        )
        .center_x(Length::Fill)
        .into()
    }

    fn clone(&self) -> Box<dyn State> {
        Box::new(Clone::clone(self))
    }
}

async fn pick_image_file() -> Option<PathBuf> {
    rfd::AsyncFileDialog::new()
        .set_title("Select an image")
        .add_filter("Images", IMAGE_EXTENSIONS)
        .pick_file()
        .await
        .map(|handle| handle.path().to_path_buf())
}

fn upload_area(ctx: &Context) -> Element<'_, UiMessage> {
    let content = match &ctx.preview {
        Some(handle) => widget::image(handle.clone()).height(160).into_elem(),
        None => column![text("Upload an image"), text("PNG, JPG, WEBP").size(12)]
            .spacing(4)
            .align_x(Horizontal::Center)
            .into_elem(),
    };
    container(content).center_x(Length::Fill).height(180).into()
}

fn result_area(ctx: &Context) -> Element<'_, UiMessage> {
    if ctx.session.is_busy() {
        text("Editing your image...").into()
    } else if let Some(handle) = &ctx.result {
        widget::image(handle.clone())
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    } else {
        text("Your generated image will appear here.").into()
    }
}

fn error_banner(error: &str) -> container::Container<'_, UiMessage> {
    let red = Color::from_rgb(0.73, 0.11, 0.11);
    container(row![bold_text("Error: ").color(red), text(error).color(red)])
        .padding(12)
        .width(Length::Fill)
        .style(|_theme| {
            container::background(Color::from_rgb(1.0, 0.89, 0.89)).border(
                Border::default()
                    .rounded(6)
                    .width(1)
                    .color(Color::from_rgb(0.97, 0.44, 0.44)),
            )
        })
}
