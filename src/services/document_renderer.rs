//! 文档渲染 - 业务能力层
//!
//! 纯函数：相同的 (标题, 正文) 总是得到完全相同的输出。
//!
//! 注意：标题和正文按原样插入 HTML，不做转义。正文本身就带有模型生成的
//! `<h2>`、`<ul>`、`<table>` 等标签，转义会破坏排版；代价是模型返回的任何
//! 标签（包括脚本）都会出现在文档里。

use serde::Serialize;

/// 文末固定的行动号召
pub const CALL_TO_ACTION: &str =
    "<p>No olvides dejar tu comentario y leer más en nuestro blog.</p>";

pub const HTML_MIME: &str = "text/html";
pub const MARKDOWN_MIME: &str = "text/markdown";

const STYLE: &str = "        body { font-family: Arial, sans-serif; line-height: 1.6; padding: 20px; }
        h1 { color: #333; }
        h2 { color: #444; margin-top: 30px; }
        p { margin-bottom: 15px; }";

/// 可下载的产物
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub file_name: String,
    pub mime: &'static str,
    pub content: String,
}

/// 渲染完整的 HTML 文档
pub fn render_html(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
{style}
    </style>
</head>
<body>
    <h1>{title}</h1>
    {body}
    {cta}
</body>
</html>
"#,
        title = title,
        style = STYLE,
        body = body,
        cta = CALL_TO_ACTION,
    )
}

/// Markdown 产物：正文 + 行动号召
pub fn render_markdown(body: &str) -> String {
    format!("{}\n\n{}", body, CALL_TO_ACTION)
}

/// 文件名主干的最大字节数，给重名后缀和扩展名留出余量（常见文件系统上限 255 字节）
pub const MAX_FILE_STEM_BYTES: usize = 150;

/// 文件名：标题中的空格替换为下划线，过长时按字符边界截断
pub fn artifact_file_stem(title: &str) -> String {
    let stem = title.replace(' ', "_");
    if stem.len() <= MAX_FILE_STEM_BYTES {
        return stem;
    }

    let mut end = MAX_FILE_STEM_BYTES;
    while !stem.is_char_boundary(end) {
        end -= 1;
    }
    stem[..end].to_string()
}

/// 同一篇文章的 HTML 和 Markdown 两个产物
pub fn render_artifacts(title: &str, body: &str) -> [Artifact; 2] {
    let stem = artifact_file_stem(title);
    [
        Artifact {
            file_name: format!("{}.html", stem),
            mime: HTML_MIME,
            content: render_html(title, body),
        },
        Artifact {
            file_name: format!("{}.md", stem),
            mime: MARKDOWN_MIME,
            content: render_markdown(body),
        },
    ]
}
