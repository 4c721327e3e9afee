//! 文章相关数据模型：标题、提示词模板、生成结果

use serde::Serialize;
use std::fmt;

/// 默认提示词
pub const DEFAULT_PROMPT_TEMPLATE: &str = "\
Eres un redactor nativo en español y escribes de manera neutral solo en español. Para el título H1 proporcionado, crea un artículo orientado al SEO siguiendo estas instrucciones:

1. Escribe una introducción de 2-3 párrafos basada en el título H1, respondiendo a la intención de búsqueda implícita (NO USAR LA PALABRA INTRODUCCION).
2. Genera 5 subtítulos H2 relacionados con el tema principal. Coloca cada subtítulo en etiquetas HTML <h2></h2>.
3. Desarrolla cada subtítulo H2 con 5 párrafos de contenido detallado, asegurándote de que cada sección esté completa.
4. Utiliza etiquetas HTML <strong></strong> para resaltar las frases más características o importantes en cada sección.
5. Incluye al menos una lista con viñetas <ul><li> y una tabla <table> para hacer el contenido más dinámico.
6. Crea 7 Preguntas Frecuentes en español (no usar otro idioma) relacionadas con el tema. Formatea cada pregunta como subtítulo H3 en HTML <h3></h3> y responde inmediatamente después con al menos 5 párrafos extensos y detallados.
7. No incluyas saludos, conclusiones o texto adicional fuera de lo solicitado.
8. Escribe todo el contenido en español, sin usar otros idiomas.
9. Asegúrate de que el artículo tenga una longitud total de 1800 a 2100 palabras.

Asegúrate de que el contenido sea informativo, bien estructurado y optimizado para SEO.";

/// 一行有效标题（已去除首尾空白，且不为空）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TitleItem(String);

impl TitleItem {
    /// 空白行返回 None
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TitleItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 按行拆分用户输入，保留顺序和重复项，过滤空白行
pub fn parse_titles(text: &str) -> Vec<TitleItem> {
    text.lines().filter_map(TitleItem::new).collect()
}

/// 提示词模板
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PromptTemplate {
    #[default]
    Default,
    /// 用户自定义提示词
    Custom(String),
}

impl PromptTemplate {
    pub fn text(&self) -> &str {
        match self {
            PromptTemplate::Default => DEFAULT_PROMPT_TEMPLATE,
            PromptTemplate::Custom(text) => text,
        }
    }
}

/// 单个标题的生成结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResult {
    /// 原始标题
    pub source_title: String,
    /// 最终使用的标题（可能已被改写）
    pub title: String,
    /// 文章正文（可能是错误说明文本）
    pub article_body: String,
    pub html_document: String,
    pub markdown_document: String,
    /// 该条目失败时的错误信息
    pub error: Option<String>,
}

impl GenerationResult {
    /// 整个条目处理失败时的占位结果
    pub fn failed(source_title: &str, error: impl Into<String>) -> Self {
        Self {
            source_title: source_title.to_string(),
            title: source_title.to_string(),
            article_body: String::new(),
            html_document: String::new(),
            markdown_document: String::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_titles_filters_blank_lines() {
        let titles = parse_titles("  Cómo ahorrar dinero \n\n   \nMejores plantas\r\nCómo ahorrar dinero\n");
        let titles: Vec<&str> = titles.iter().map(TitleItem::as_str).collect();
        assert_eq!(
            titles,
            vec!["Cómo ahorrar dinero", "Mejores plantas", "Cómo ahorrar dinero"]
        );
    }

    #[test]
    fn test_parse_titles_only_whitespace() {
        assert!(parse_titles("   \n\t\n").is_empty());
        assert!(parse_titles("").is_empty());
    }

    #[test]
    fn test_prompt_template_text() {
        assert!(PromptTemplate::Default.text().starts_with("Eres un redactor nativo"));
        assert_eq!(PromptTemplate::Custom("Hola".into()).text(), "Hola");
    }

    #[test]
    fn test_failed_result_keeps_original_title() {
        let result = GenerationResult::failed("Título", "boom");
        assert_eq!(result.title, "Título");
        assert!(!result.is_success());
    }
}
