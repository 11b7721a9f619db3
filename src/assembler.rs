//! 文档组装模块
//!
//! 组装器负责把一次或多次生成调用编排为一份结构化文档：
//! 单次成稿、两段式（小说 + 语法分析）、或索引展开模式。
//! 所有调用严格串行，片段到达后立即追加进文档并向 UI 边界
//! 推送当前内容与进度。

use crate::{
    config::Config,
    error::{ArtigenError, Result},
    index::parse_index,
    prompt,
    stream::FragmentStream,
    types::{Document, ProgressTracker},
    utils::section_target_words,
};
use async_trait::async_trait;
use futures::StreamExt;
use log::warn;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

// ================================================================================================
// 生成接口与 UI 边界
// ================================================================================================

/// 生成接口
///
/// 把一段提示词变成一个惰性的片段流。由 [`crate::client::StreamClient`]
/// 实现，测试中可用脚本化的假实现替换。
#[async_trait]
pub trait Generator: Send + Sync {
    /// 为提示词打开一个片段流
    async fn stream(&self, prompt: &str) -> Result<FragmentStream>;
}

/// UI 边界
///
/// 组装器只向外推送两样东西：当前文档内容与 [0, 1] 区间的进度。
/// `throttle` 是片段渲染之间的可选限速钩子，默认不限速；交互式
/// 宿主可以返回一个短暂的停顿以免刷新过快。
pub trait ProgressSink {
    /// 推送当前文档内容与进度
    fn update(&mut self, document: &str, progress: f64);

    /// 两次片段渲染之间的停顿时长
    fn throttle(&self) -> Option<Duration> {
        None
    }
}

/// 不做任何事的 UI 边界实现，供非交互调用使用
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn update(&mut self, _document: &str, _progress: f64) {}
}

// ================================================================================================
// 组装选项
// ================================================================================================

/// 组装选项
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    /// 成稿的最小总字数
    pub min_total_words: usize,
    /// 单章节目标字数下限
    pub section_word_floor: usize,
    /// 补充生成的最大轮数，超过后以 `TargetUnreachable` 终止
    pub max_filler_rounds: usize,
    /// 单次成稿的目标字符数，用于进度估算
    pub article_char_goal: usize,
    /// 取消令牌，在每次请求前和片段之间检查
    pub cancel: CancellationToken,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            min_total_words: 3000,
            section_word_floor: 300,
            max_filler_rounds: 8,
            article_char_goal: 18000,
            cancel: CancellationToken::new(),
        }
    }
}

impl AssembleOptions {
    /// 从配置中取组装相关的参数
    pub fn from_config(config: &Config) -> Self {
        Self {
            min_total_words: config.min_total_words(),
            section_word_floor: config.section_word_floor(),
            max_filler_rounds: config.max_filler_rounds(),
            article_char_goal: config.article_char_goal(),
            cancel: CancellationToken::new(),
        }
    }

    /// 设置 `min_total_words`
    pub fn with_min_total_words(mut self, words: usize) -> Self {
        self.min_total_words = words;
        self
    }

    /// 设置 `max_filler_rounds`
    pub fn with_max_filler_rounds(mut self, rounds: usize) -> Self {
        self.max_filler_rounds = rounds;
        self
    }

    /// 设置 `article_char_goal`
    pub fn with_article_char_goal(mut self, chars: usize) -> Self {
        self.article_char_goal = chars;
        self
    }

    /// 设置取消令牌
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

// ================================================================================================
// 文档组装器
// ================================================================================================

/// 文档组装器
///
/// 持有一个生成接口与组装选项，按模式编排生成调用。
#[derive(Debug, Clone)]
pub struct DocumentAssembler<G> {
    generator: G,
    options: AssembleOptions,
}

impl<G: Generator> DocumentAssembler<G> {
    /// 用默认选项创建组装器
    pub fn new(generator: G) -> Self {
        Self::with_options(generator, AssembleOptions::default())
    }

    /// 用指定选项创建组装器
    pub fn with_options(generator: G, options: AssembleOptions) -> Self {
        Self { generator, options }
    }

    /// 当前生效的组装选项
    pub fn options(&self) -> &AssembleOptions {
        &self.options
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.options.cancel.is_cancelled() {
            Err(ArtigenError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// 把一段提示词的流式结果追加进文档
    ///
    /// 每个片段到达后立即更新 UI 边界，进度经 [`ProgressTracker`]
    /// 修正为单调不减。返回本次追加的字符数。
    async fn stream_into<S, F>(
        &self,
        prompt: &str,
        doc: &mut Document,
        sink: &mut S,
        tracker: &mut ProgressTracker,
        estimate: F,
    ) -> Result<usize>
    where
        S: ProgressSink,
        F: Fn(&Document) -> f64,
    {
        self.check_cancelled()?;
        let mut stream = self.generator.stream(prompt).await?;
        let mut chars = 0usize;

        while let Some(fragment) = stream.next().await {
            self.check_cancelled()?;
            let fragment = fragment?;
            chars += fragment.chars().count();
            doc.push_fragment(&fragment);

            let progress = tracker.update(estimate(doc));
            sink.update(doc.as_str(), progress);
            if let Some(pause) = sink.throttle() {
                tokio::time::sleep(pause).await;
            }
        }

        Ok(chars)
    }

    /// 完整排空一段提示词的流式结果
    async fn drain(&self, prompt: &str) -> Result<String> {
        self.check_cancelled()?;
        let stream = self.generator.stream(prompt).await?;
        stream.drain().await
    }

    /// 单次成稿模式
    ///
    /// 一次调用生成整篇文章，边到达边渲染。进度按字符数对
    /// `article_char_goal` 的比值估算（约 3000 词 ≈ 18000 字符）。
    pub async fn article<S: ProgressSink>(&self, title: &str, sink: &mut S) -> Result<Document> {
        let mut doc = Document::new();
        let mut tracker = ProgressTracker::new();
        let goal = self.options.article_char_goal.max(1) as f64;

        self.stream_into(&prompt::article(title), &mut doc, sink, &mut tracker, |d| {
            d.char_count() as f64 / goal
        })
        .await?;

        if doc.is_empty() {
            return Err(ArtigenError::EmptyResult);
        }
        sink.update(doc.as_str(), tracker.update(1.0));
        Ok(doc)
    }

    /// 两段式模式：先生成短篇小说，再对其做语法分析
    ///
    /// 两个阶段各自完整排空后才追加进文档，进度只有 0.5 和 1.0
    /// 两个粗粒度检查点。
    pub async fn story_with_analysis<S: ProgressSink>(&self, sink: &mut S) -> Result<Document> {
        let mut doc = Document::new();
        let mut tracker = ProgressTracker::new();

        let story = self.drain(&prompt::story()).await?;
        doc.push_heading("Cuento");
        doc.push_fragment(&story);
        sink.update(doc.as_str(), tracker.update(0.5));

        let analysis = self.drain(&prompt::analysis(&story)).await?;
        doc.push_heading("Análisis gramatical");
        doc.push_fragment(&analysis);
        sink.update(doc.as_str(), tracker.update(1.0));

        Ok(doc)
    }

    /// 索引展开模式
    ///
    /// 先生成索引并解析出章节列表，再逐章节串行生成，最后在
    /// 字数不足时进入补充循环，直到达到最小字数或轮数上限。
    /// 结束时文档字数不低于 `min_total_words`，否则返回
    /// [`ArtigenError::TargetUnreachable`]。
    pub async fn outline_article<S: ProgressSink>(
        &self,
        title: &str,
        sink: &mut S,
    ) -> Result<Document> {
        let mut doc = Document::new();
        let mut tracker = ProgressTracker::new();
        let min_total = self.options.min_total_words;

        let index_text = self.drain(&prompt::index(title)).await?;
        doc.push_fragment(&index_text);
        sink.update(doc.as_str(), tracker.update(words_progress(&doc, min_total)));

        let sections = parse_index(&index_text)?;
        let total_sections = sections.len();

        for (position, mut section) in sections.into_iter().enumerate() {
            let remaining = total_sections - position;
            let target = section_target_words(
                min_total,
                doc.word_count(),
                remaining,
                self.options.section_word_floor,
            );
            section.target_words = Some(target);

            doc.push_heading(&section.title);
            let body_prompt = prompt::section(title, &section.title, target);
            let chars = self
                .stream_into(&body_prompt, &mut doc, sink, &mut tracker, |d| {
                    words_progress(d, min_total)
                })
                .await?;
            if chars == 0 {
                warn!("Section '{}' produced no content", section.title);
            }
        }

        let mut rounds = 0;
        while doc.word_count() < min_total {
            if rounds == self.options.max_filler_rounds {
                return Err(ArtigenError::TargetUnreachable {
                    words: doc.word_count(),
                    target: min_total,
                    rounds,
                });
            }

            let deficit = min_total - doc.word_count();
            doc.push_heading("Información adicional");
            self.stream_into(
                &prompt::filler(title, deficit),
                &mut doc,
                sink,
                &mut tracker,
                |d| words_progress(d, min_total),
            )
            .await?;
            rounds += 1;
        }

        sink.update(doc.as_str(), tracker.update(1.0));
        Ok(doc)
    }
}

fn words_progress(doc: &Document, min_total: usize) -> f64 {
    if min_total == 0 {
        return 1.0;
    }
    doc.word_count() as f64 / min_total as f64
}
