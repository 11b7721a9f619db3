//! 错误处理模块

use thiserror::Error;

/// Artigen 库的统一错误类型
///
/// 提供了完整的错误分类，便于上层应用进行精确的错误处理。
/// 生成过程中的错误一律通过 `Result` 返回，绝不混入文档内容。
#[derive(Debug, Error)]
pub enum ArtigenError {
    /// HTTP 请求相关错误
    #[error("HTTP请求失败: {0}")]
    Http(#[from] reqwest::Error),

    /// API 服务端返回非成功状态码
    #[error("API错误: 状态码 {status}, 响应: {body}")]
    Api {
        /// HTTP 状态码
        status: u16,
        /// 响应正文
        body: String,
    },

    /// 流式响应结束后内容为空
    #[error("响应内容为空")]
    EmptyResult,

    /// 索引解析未产生任何章节
    #[error("索引解析结果为空，未匹配到任何章节行")]
    IndexEmpty,

    /// 补充生成达到轮数上限仍未满足最小字数
    #[error("已生成 {rounds} 轮补充内容，字数 {words} 仍未达到目标 {target}")]
    TargetUnreachable {
        /// 当前文档字数
        words: usize,
        /// 目标最小字数
        target: usize,
        /// 已执行的补充轮数
        rounds: usize,
    },

    /// 生成过程被取消
    #[error("生成已取消")]
    Cancelled,

    /// 请求参数无效
    #[error("请求参数无效: {0}")]
    InvalidRequest(String),

    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(String),
}

/// Artigen 库的 Result 类型别名
pub type Result<T> = std::result::Result<T, ArtigenError>;
