pub mod config;
pub mod encoder;
mod error;
pub mod image_model;
pub mod session;

pub use error::EditError;

pub type EditorBox = Box<dyn image_model::ImageEditor>;
