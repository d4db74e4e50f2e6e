use clap::Parser;
use color_eyre::Result;
use engine::config::Config;
use image_editor::{APP_NAME, Gui, cli::Cli};

pub fn main() -> Result<()> {
    color_eyre::install()?;
    pretty_env_logger::init();
    let cli = Cli::parse();
    let cfg = Config::new(cli.api_key, cli.model)?;
    iced::application(move || Gui::new(cfg.clone()), Gui::update, Gui::view)
        .title(APP_NAME)
        .theme(Gui::theme)
        .run()?;
    Ok(())
}
