//! 索引解析模块
//!
//! 索引是一份 Markdown 编号链接列表，每行一个章节：
//!
//! ```text
//! 1. [Introducción](#introduccion)
//! 2. [Desarrollo](#desarrollo)
//! ```
//!
//! 行格式约定为 `N. [标题](#锚点)`，允许行首缩进以表示嵌套层级。
//! 不符合约定的行会被显式拒绝并记录日志，便于排查索引为空的问题。

use crate::error::{ArtigenError, Result};
use crate::types::SectionSpec;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

/// 章节行模式：`N. [标题](#锚点)`
static SECTION_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+\.\s*\[([^\]]+)\]\(#([^\s)]+)\)\s*$").expect("valid section pattern"));

/// 把索引文本解析为有序的章节列表
///
/// 标题行、空行与其他不符合格式的行被拒绝并跳过；一个章节都
/// 解析不出来时返回 [`ArtigenError::IndexEmpty`]，避免下游按
/// 章节数均摊字数时出现除零。
pub fn parse_index(index_text: &str) -> Result<Vec<SectionSpec>> {
    let mut sections = Vec::new();

    for line in index_text.lines() {
        match SECTION_LINE.captures(line) {
            Some(caps) => sections.push(SectionSpec {
                title: caps[1].to_string(),
                anchor_id: caps[2].to_string(),
                target_words: None,
            }),
            None => {
                if !line.trim().is_empty() {
                    debug!("Rejected index line: '{}'", line);
                }
            }
        }
    }

    if sections.is_empty() {
        return Err(ArtigenError::IndexEmpty);
    }
    Ok(sections)
}
