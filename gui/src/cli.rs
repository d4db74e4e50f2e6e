use engine::image_model::Model;

#[derive(Debug, clap::Parser)]
#[command(version, about = "Edit images with a text instruction, powered by Gemini")]
pub struct Cli {
    /// Gemini API key
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(short, long, value_enum, default_value_t)]
    pub model: Model,
}
