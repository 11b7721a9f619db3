//! API 数据结构与文档模型模块

use crate::config::Config;
use crate::utils::count_words;
use serde::{Deserialize, Serialize};

// ================================================================================================
// API 请求结构
// ================================================================================================

/// 对话消息
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Message {
    /// 角色
    pub role: Role,
    /// 内容
    pub content: String,
}

/// 角色枚举
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 系统
    System,
    /// 用户
    #[default]
    User,
    /// 机器人
    Assistant,
}

/// 单次补全请求体
///
/// 按 chat/completions 接口的请求格式序列化。构建后不可变，
/// 参数来源于 [`Config`]，消息列表由调用方提供。
#[derive(Debug, Serialize, Clone)]
pub struct PromptRequest {
    /// 模型名称
    pub model: String,
    /// 消息列表
    pub messages: Vec<Message>,
    /// 最大生成 token 数
    pub max_tokens: u32,
    /// 温度参数
    pub temperature: f32,
    /// Top-p 参数
    pub top_p: f32,
    /// Top-k 参数
    pub top_k: u32,
    /// 重复惩罚系数
    pub repetition_penalty: f32,
    /// 停止序列
    pub stop: Vec<String>,
    /// 是否流式返回
    pub stream: bool,
}

impl PromptRequest {
    /// 从配置和消息列表构建请求体
    pub fn new(config: &Config, messages: Vec<Message>, stream: bool) -> Self {
        Self {
            model: config.model().to_string(),
            messages,
            max_tokens: config.max_tokens(),
            temperature: config.temperature(),
            top_p: config.top_p(),
            top_k: config.top_k(),
            repetition_penalty: config.repetition_penalty(),
            stop: config.stop().to_vec(),
            stream,
        }
    }
}

// ================================================================================================
// 流式 API 响应结构
// ================================================================================================

/// 流式 API 响应增量
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Delta {
    /// 角色
    #[serde(default)]
    pub role: Option<Role>,
    /// 内容
    #[serde(default)]
    pub content: Option<String>,
}

/// 流式 API 响应体
///
/// 即 `{ choices: [ { delta: { content } } ] }` 形式的事件记录。
/// 所有字段均带默认值，以兼容不同服务端省略字段的情况。
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct StreamCompletionResponse {
    /// 响应 ID
    #[serde(default)]
    pub id: String,
    /// 对话选择
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
    /// 创建时间
    #[serde(default)]
    pub created: u64,
    /// 使用模型
    #[serde(default)]
    pub model: String,
    /// 对象类型
    #[serde(default)]
    pub object: String,
}

impl StreamCompletionResponse {
    /// 提取首个选择的增量内容
    ///
    /// 增量可能为空字符串，顺序拼接所有增量即可还原完整响应。
    pub fn delta_content(&self) -> &str {
        self.choices
            .first()
            .and_then(|c| c.delta.content.as_deref())
            .unwrap_or_default()
    }
}

/// 流式对话选择
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct StreamChoice {
    /// 增量内容
    #[serde(default)]
    pub delta: Delta,
    /// 结束原因
    #[serde(default)]
    pub finish_reason: Option<String>,
    /// 索引
    #[serde(default)]
    pub index: u32,
}

// ================================================================================================
// 文档数据模型
// ================================================================================================

/// 索引中解析出的章节说明
///
/// 由索引解析器按行产生，驱动每个章节的一次生成调用。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSpec {
    /// 章节标题
    pub title: String,
    /// 锚点 ID
    pub anchor_id: String,
    /// 目标字数，组装阶段按剩余缺口计算后填入
    pub target_words: Option<usize>,
}

/// 组装中的文档
///
/// 一个只增不减的字符串：可选的索引头部，随后是按顺序追加的
/// 章节正文，每个章节前带一行标题。
#[derive(Debug, Clone, Default)]
pub struct Document {
    content: String,
}

impl Document {
    /// 创建空文档
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个流式片段
    pub fn push_fragment(&mut self, fragment: &str) {
        self.content.push_str(fragment);
    }

    /// 追加一个 Markdown 二级标题
    pub fn push_heading(&mut self, title: &str) {
        if !self.content.is_empty() {
            self.content.push_str("\n\n");
        }
        self.content.push_str("## ");
        self.content.push_str(title);
        self.content.push_str("\n\n");
    }

    /// 当前文档内容
    pub fn as_str(&self) -> &str {
        &self.content
    }

    /// 文档是否为空
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// 当前字符数
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    /// 当前字数
    ///
    /// 词的定义与补充生成循环的终止条件一致，见 [`count_words`]。
    pub fn word_count(&self) -> usize {
        count_words(&self.content)
    }

    /// 取出文档内容
    pub fn into_string(self) -> String {
        self.content
    }
}

/// 进度跟踪器
///
/// 保证上报给 UI 的进度在单次生成内单调不减，并收敛在 [0, 1] 区间。
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressTracker {
    last: f64,
}

impl ProgressTracker {
    /// 创建初始进度为 0 的跟踪器
    pub fn new() -> Self {
        Self::default()
    }

    /// 用原始估算值更新进度，返回修正后的进度
    pub fn update(&mut self, raw: f64) -> f64 {
        let clamped = raw.clamp(0.0, 1.0);
        if clamped > self.last {
            self.last = clamped;
        }
        self.last
    }

    /// 当前进度
    pub fn current(&self) -> f64 {
        self.last
    }
}
