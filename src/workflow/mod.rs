pub mod article_flow;
pub mod title_ctx;

pub use article_flow::{ArticleFlow, ArticleOutcome};
pub use title_ctx::TitleCtx;
