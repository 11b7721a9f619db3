//! 流式响应处理模块
use crate::{
    error::{ArtigenError, Result},
    types::StreamCompletionResponse,
};
use async_stream::try_stream;
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use log::debug;
use std::{
    pin::Pin,
    task::{Context, Poll},
};

// ================================================================================================
// 流式响应包装器
// ================================================================================================

const DONE_CHUNK: &str = "[DONE]";

/// 一个无状态的流处理器，用于解析按行分隔的 JSON 事件流
///
/// 每行事件可带 `data: ` 前缀；无法解析的行记录日志后跳过，
/// 绝不中断整个流。
#[derive(Debug, Clone, Default)]
pub struct StreamWrapper;

impl StreamWrapper {
    /// 创建一个新的 `StreamWrapper` 实例
    ///
    /// 这是一个无状态的结构体，所以 `new` 只是 `default` 的别名
    pub fn new() -> Self {
        StreamWrapper
    }

    /// 将一个字节流转换为逐片段产出增量内容的流
    ///
    /// 片段按到达顺序产出，顺序拼接即可还原完整响应。流在底层
    /// 连接关闭时结束；结尾未带换行的最后一行同样会被解析。
    pub fn fragments<S, E>(
        &self,
        mut bytes_stream: S,
    ) -> impl Stream<Item = Result<String>> + Send + 'static
    where
        S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static + Unpin,
        E: Into<ArtigenError> + Send + 'static,
    {
        try_stream! {
            let mut buffer = BytesMut::new();
            while let Some(bytes_res) = bytes_stream.next().await {
                let bytes = bytes_res.map_err(Into::<ArtigenError>::into)?;
                buffer.extend_from_slice(&bytes);

                while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
                    let line_bytes = buffer.split_to(pos + 1);
                    let line = String::from_utf8_lossy(&line_bytes);
                    if let Some(content) = parse_event_line(&line) {
                        yield content;
                    }
                }
            }

            if !buffer.is_empty() {
                let line = String::from_utf8_lossy(&buffer);
                if let Some(content) = parse_event_line(&line) {
                    yield content;
                }
            }
        }
    }
}

/// 解析单行事件，返回其中的增量内容
///
/// 空行、注释行、`[DONE]` 哨兵与无法解析的行均返回 `None`。
/// 合法记录即使增量为空字符串也会返回 `Some("")`，保证拼接保真。
fn parse_event_line(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(':') {
        return None;
    }

    let payload = trimmed
        .strip_prefix("data:")
        .map(str::trim_start)
        .unwrap_or(trimmed);
    if payload == DONE_CHUNK {
        return None;
    }

    match serde_json::from_str::<StreamCompletionResponse>(payload) {
        Ok(record) => Some(record.delta_content().to_string()),
        Err(e) => {
            debug!("Skipping malformed stream line: '{}', error: {}", payload, e);
            None
        }
    }
}

/// `Stream<Item = Result<String>>` 的简单包装
///
/// 作为生成接口的具体返回类型，惰性、有限、不可重放。
pub struct FragmentStream {
    inner: Pin<Box<dyn Stream<Item = Result<String>> + Send>>,
}

impl FragmentStream {
    /// 创建一个新的 `FragmentStream`
    pub fn new(stream: impl Stream<Item = Result<String>> + Send + 'static) -> Self {
        Self {
            inner: Box::pin(stream),
        }
    }

    /// 消费整个流，把所有片段拼接为一个字符串
    ///
    /// 流结束后若未产出任何字符，返回 [`ArtigenError::EmptyResult`]。
    pub async fn drain(mut self) -> Result<String> {
        let mut out = String::new();
        while let Some(fragment) = self.inner.next().await {
            out.push_str(&fragment?);
        }
        if out.is_empty() {
            return Err(ArtigenError::EmptyResult);
        }
        Ok(out)
    }
}

impl Stream for FragmentStream {
    type Item = Result<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_stream(
        chunks: Vec<&str>,
    ) -> impl Stream<Item = std::result::Result<Bytes, ArtigenError>> + Send + Unpin + 'static {
        futures::stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok(Bytes::from(c.to_string())))
                .collect::<Vec<_>>(),
        )
    }

    async fn collect_fragments(chunks: Vec<&str>) -> Vec<String> {
        let wrapper = StreamWrapper::new();
        let fragments: Vec<Result<String>> =
            wrapper.fragments(chunk_stream(chunks)).collect().await;
        fragments.into_iter().map(|f| f.unwrap()).collect()
    }

    fn data_line(content: &str) -> String {
        format!(
            "data: {{\"choices\":[{{\"delta\":{{\"content\":\"{}\"}}}}]}}\n",
            content
        )
    }

    /// Fragments must reproduce every delta in arrival order.
    #[tokio::test]
    async fn test_fragments_concatenate_in_order() {
        let line1 = data_line("Hola ");
        let line2 = data_line("mundo");
        let fragments = collect_fragments(vec![&line1, &line2, "data: [DONE]\n"]).await;
        assert_eq!(fragments.concat(), "Hola mundo");
    }

    /// Malformed and keep-alive lines are skipped without ending the stream.
    #[tokio::test]
    async fn test_malformed_lines_are_skipped() {
        let line1 = data_line("uno");
        let line2 = data_line("dos");
        let fragments = collect_fragments(vec![
            &line1,
            "data: {not json at all\n",
            ": keep-alive\n",
            "\n",
            &line2,
        ])
        .await;
        assert_eq!(fragments, vec!["uno".to_string(), "dos".to_string()]);
    }

    /// A record split across several network chunks is reassembled.
    #[tokio::test]
    async fn test_line_split_across_chunks() {
        let fragments = collect_fragments(vec![
            "data: {\"choices\":[{\"del",
            "ta\":{\"content\":\"parcial\"}",
            "}]}\n",
        ])
        .await;
        assert_eq!(fragments, vec!["parcial".to_string()]);
    }

    /// The final line is parsed even without a trailing newline.
    #[tokio::test]
    async fn test_final_line_without_newline() {
        let line = data_line("final");
        let fragments = collect_fragments(vec![line.trim_end()]).await;
        assert_eq!(fragments, vec!["final".to_string()]);
    }

    /// A valid record with no content still yields an empty fragment.
    #[tokio::test]
    async fn test_empty_delta_yields_empty_fragment() {
        let fragments =
            collect_fragments(vec!["data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n"])
                .await;
        assert_eq!(fragments, vec!["".to_string()]);
    }

    /// Zero valid records produce an empty sequence, and draining it
    /// reports an empty result.
    #[tokio::test]
    async fn test_no_valid_records_is_empty_result() {
        let wrapper = StreamWrapper::new();
        let stream = wrapper.fragments(chunk_stream(vec!["garbage\n", ": ping\n"]));
        let result = FragmentStream::new(stream).drain().await;
        assert!(matches!(result, Err(ArtigenError::EmptyResult)));
    }

    /// A transport error surfaces as a stream item and ends the stream.
    #[tokio::test]
    async fn test_transport_error_propagates() {
        let line = data_line("antes");
        let chunks: Vec<std::result::Result<Bytes, ArtigenError>> = vec![
            Ok(Bytes::from(line)),
            Err(ArtigenError::Config("connection reset".into())),
        ];
        let wrapper = StreamWrapper::new();
        let items: Vec<Result<String>> = wrapper
            .fragments(futures::stream::iter(chunks))
            .collect()
            .await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), "antes");
        assert!(items[1].is_err());
    }

    #[test]
    fn test_parse_event_line_prefix_optional() {
        let with_prefix = parse_event_line("data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n");
        let without_prefix = parse_event_line("{\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n");
        assert_eq!(with_prefix.as_deref(), Some("a"));
        assert_eq!(without_prefix.as_deref(), Some("a"));
    }

    #[test]
    fn test_parse_event_line_done_sentinel() {
        assert_eq!(parse_event_line("data: [DONE]\n"), None);
    }
}
