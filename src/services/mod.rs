pub mod article_generator;
pub mod artifact_writer;
pub mod document_renderer;
pub mod key_verifier;
pub mod notifier;
pub mod retry;
pub mod title_rewriter;

pub use article_generator::{ArticleDraft, ArticleGenerator};
pub use artifact_writer::{ArtifactSink, ArtifactWriter, DiscardArtifacts};
pub use document_renderer::{render_artifacts, render_html, render_markdown, Artifact};
pub use key_verifier::KeyVerifier;
pub use notifier::{CollectingNotifier, LogNotifier, Notice, Notifier};
pub use retry::RetryPolicy;
pub use title_rewriter::TitleRewriter;
