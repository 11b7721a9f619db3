//! 工具函数模块
use crate::types::{Message, Role};
use once_cell::sync::Lazy;
use regex::Regex;

/// 词的匹配模式：包含至少一个字母/数字/下划线的连续非空白片段
///
/// `foo-bar` 计为一个词，纯标点片段（如 `##`）不计。补充生成循环的
/// 终止判断完全依赖这一计数，定义必须保持精确、可复现，不做任何
/// 按语言环境的分词。
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S*\w\S*").expect("valid word pattern"));

/// 创建消息的便捷函数
///
/// # 参数
///
/// * `role` - 消息角色
/// * `content` - 消息内容
///
/// # 返回
///
/// 新创建的消息实例
pub fn message(role: Role, content: &str) -> Message {
    Message {
        role,
        content: content.to_string(),
    }
}

/// 统计文本的字数
///
/// 空白分隔、且含有词字符的片段才算词。
pub fn count_words(text: &str) -> usize {
    WORD.find_iter(text).count()
}

/// 计算单个章节的目标字数
///
/// 按剩余缺口均摊到剩余章节，同时不低于 `floor`。
/// 调用方必须保证 `remaining_sections > 0`。
pub fn section_target_words(
    min_total: usize,
    current_words: usize,
    remaining_sections: usize,
    floor: usize,
) -> usize {
    let deficit = min_total.saturating_sub(current_words);
    floor.max(deficit / remaining_sections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[test]
    fn test_message_creation() {
        let msg = message(Role::User, "Hola");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hola");
    }

    #[test]
    fn test_count_words_empty() {
        assert_eq!(count_words(""), 0);
    }

    #[test]
    fn test_count_words_basic() {
        assert_eq!(count_words("one two three"), 3);
    }

    #[test]
    fn test_count_words_hyphenated_is_one() {
        assert_eq!(count_words("foo-bar baz"), 2);
    }

    #[test]
    fn test_count_words_punctuation_only_ignored() {
        assert_eq!(count_words("## -- ***"), 0);
    }

    #[test]
    fn test_count_words_markup() {
        assert_eq!(count_words("## Introducción\n\nLorem ipsum."), 3);
    }

    #[test]
    fn test_section_target_from_deficit() {
        assert_eq!(section_target_words(3000, 500, 5, 300), 500);
    }

    #[test]
    fn test_section_target_floor_applies() {
        assert_eq!(section_target_words(3000, 2900, 4, 300), 300);
    }

    #[test]
    fn test_section_target_past_minimum() {
        assert_eq!(section_target_words(3000, 3200, 2, 300), 300);
    }
}
