pub mod article;
pub mod chat;
pub mod loaders;
pub mod provider;

pub use article::{parse_titles, GenerationResult, PromptTemplate, TitleItem, DEFAULT_PROMPT_TEMPLATE};
pub use chat::{ChatMessage, ChatRequest, ChatRole};
pub use loaders::{load_prompt_template, load_titles};
pub use provider::{Credential, ProviderSelection};
