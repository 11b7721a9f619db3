//! 提示词模板模块
//!
//! 所有生成调用使用的西语提示词模板。模板只负责拼出自然语言
//! 指令，参数校验与字数核算由组装器完成。

/// 单次成稿模式的文章提示词
pub fn article(title: &str) -> String {
    format!(
        r#"Genera un artículo académico de más de 3000 palabras sobre el tema: "{title}".
El artículo debe incluir:
1. Introducción
2. Desarrollo del tema (con subtemas)
3. Conclusión
4. Referencias (cita al menos 5 fuentes académicas)

Usa un estilo académico y formal. Asegúrate de que el artículo tenga coherencia y esté bien estructurado."#
    )
}

/// 索引提示词
///
/// 要求模型只输出编号的 Markdown 链接列表，与索引解析器约定的
/// 行格式保持一致。
pub fn index(title: &str) -> String {
    format!(
        r#"Genera el índice de un artículo académico extenso sobre el tema: "{title}".
Devuelve únicamente una lista numerada en formato Markdown, una línea por sección, con este formato exacto:
1. [Título de la sección](#ancla-de-la-seccion)
No incluyas texto adicional antes ni después de la lista."#
    )
}

/// 单章节提示词
pub fn section(title: &str, section_title: &str, target_words: usize) -> String {
    format!(
        r#"Escribe la sección "{section_title}" de un artículo académico sobre el tema: "{title}".
La sección debe tener aproximadamente {target_words} palabras, en estilo académico y formal.
Desarrolla solo esta sección, sin repetir el contenido de otras secciones y sin incluir el título."#
    )
}

/// 补充内容提示词
pub fn filler(title: &str, deficit_words: usize) -> String {
    format!(
        r#"Escribe información adicional complementaria para un artículo académico sobre el tema: "{title}".
Aporta aproximadamente {deficit_words} palabras con datos, ejemplos o referencias que no se hayan tratado antes.
Usa un estilo académico y formal."#
    )
}

/// 两段式流程第一步：固定语域的短篇小说
pub fn story() -> String {
    "Escribí un cuento corto de unas 300 palabras en castellano rioplatense, usando el voseo. \
El cuento debe ser original, de tono cotidiano, con diálogos breves."
        .to_string()
}

/// 两段式流程第二步：对第一步结果的语法分析
pub fn analysis(text: &str) -> String {
    format!(
        r#"Analizá gramaticalmente el siguiente texto. Identificá los tiempos verbales, el uso del voseo y las estructuras sintácticas más relevantes. Presenta el análisis como una lista estructurada.

Texto:
{text}"#
    )
}
