pub mod text_loader;

pub use text_loader::{load_prompt_template, load_titles};
