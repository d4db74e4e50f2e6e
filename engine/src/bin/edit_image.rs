use std::path::PathBuf;

use base64::{Engine, engine::general_purpose::STANDARD};
use clap::Parser;
use color_eyre::{Result, eyre::ensure};
use engine::{
    config::Config,
    encoder::ImageFile,
    image_model::Model,
    session::{PendingEdit, perform_edit},
};

/// Applies a text instruction to an image, without the GUI. Reads the key from API_KEY.
#[derive(clap::Parser)]
struct Arg {
    image: PathBuf,
    instruction: String,

    #[arg(short, long, default_value = "edited.png")]
    output: PathBuf,

    #[arg(short, long, value_enum, default_value_t)]
    model: Model,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    pretty_env_logger::init();
    let Arg {
        image,
        instruction,
        output,
        model,
    } = Arg::parse();
    let cfg = Config::from_env(model)?;
    ensure!(!instruction.trim().is_empty(), "The instruction must not be empty");

    let pending = PendingEdit {
        file: ImageFile::from_path(image),
        instruction,
    };
    let edited = perform_edit(pending, cfg.make_editor()).await?;
    let bytes = STANDARD.decode(&edited.data)?;
    std::fs::write(&output, &bytes)?;
    println!(
        "Saved {} ({}), {} bytes",
        output.display(),
        edited.media_type,
        bytes.len()
    );

    Ok(())
}
