//! # Artigen - 流式文章生成库
//!
//! Artigen 是一个围绕 chat/completions 接口设计的轻量级 Rust 库，
//! 把流式的模型响应逐片段聚合成结构化的长文档。
//!
//! ## 主要特性
//!
//! - 🚀 **异步支持**：基于 `tokio` 的完全异步实现，性能卓越。
//! - 🔄 **流式响应**：片段到达即渲染，并实时上报 [0, 1] 区间的进度。
//! - 📑 **索引展开**：先生成索引再逐章节展开，按剩余缺口均摊目标字数。
//! - 🔧 **灵活配置**：支持环境变量和 Builder 模式，轻松定制客户端。
//! - 🛡️ **错误处理**：完善的错误类型，补充循环有显式的轮数上限。
//! - ⏹️ **可取消**：基于取消令牌，在请求前与片段之间均可中断。
//!
//! ## 快速开始
//!
//! ```rust,no_run
//! use artigen::client::StreamClient;
//! use artigen::config::Config;
//! use artigen::error::Result;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // 从环境变量加载配置 (需要设置 TOGETHER_API_KEY)
//!     let config = Config::from_env()?;
//!     let client = StreamClient::new(config);
//!
//!     // 生成一篇完整文章
//!     let document = artigen::write_article(&client, "La historia del ajedrez").await?;
//!     println!("{}", document.as_str());
//!
//!     Ok(())
//! }
//! ```

// 模块定义
pub mod assembler;
pub mod client;
pub mod config;
pub mod error;
pub mod index;
pub mod prompt;
pub mod stream;
pub mod types;
pub mod utils;

pub use assembler::{AssembleOptions, DocumentAssembler, Generator, NullSink, ProgressSink};
pub use client::StreamClient;
pub use config::Config;
pub use error::{ArtigenError, Result};
pub use types::{Document, Message, PromptRequest, Role, SectionSpec};

// ================================================================================================
//  便捷入口函数
// ================================================================================================

/// 单次成稿：为标题生成一篇完整文章
///
/// 非交互调用的便捷包装，不上报进度。组装参数取自客户端配置。
///
/// # 参数
///
/// * `client` - `StreamClient` 实例的引用。
/// * `title` - 文章标题。
///
/// # 返回
///
/// 组装完成的文档 (`Result<Document>`)。
pub async fn write_article(client: &StreamClient, title: &str) -> Result<Document> {
    let options = AssembleOptions::from_config(client.config());
    DocumentAssembler::with_options(client.clone(), options)
        .article(title, &mut NullSink)
        .await
}

/// 索引展开：生成索引后逐章节展开，直到达到最小字数
///
/// 非交互调用的便捷包装，不上报进度。组装参数取自客户端配置。
pub async fn write_outline_article(client: &StreamClient, title: &str) -> Result<Document> {
    let options = AssembleOptions::from_config(client.config());
    DocumentAssembler::with_options(client.clone(), options)
        .outline_article(title, &mut NullSink)
        .await
}

/// 两段式：生成短篇小说并做语法分析
///
/// 非交互调用的便捷包装，不上报进度。
pub async fn write_story_with_analysis(client: &StreamClient) -> Result<Document> {
    let options = AssembleOptions::from_config(client.config());
    DocumentAssembler::with_options(client.clone(), options)
        .story_with_analysis(&mut NullSink)
        .await
}
