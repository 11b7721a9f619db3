//! # 流式成稿示例
//!
//! 这个示例展示了单次成稿模式的流式用法：
//! - 从环境变量加载配置
//! - 创建 StreamClient 实例
//! - 发起单次成稿请求
//! - 片段到达时实时打印文章与进度

use artigen::assembler::{AssembleOptions, DocumentAssembler, ProgressSink};
use artigen::client::StreamClient;
use artigen::config::Config;
use artigen::error::Result;
use std::io::Write;
use std::time::Duration;

/// 把片段打印到终端，并在行首刷新进度百分比
struct ConsoleSink {
    printed: usize,
}

impl ProgressSink for ConsoleSink {
    fn update(&mut self, document: &str, progress: f64) {
        let new_part = &document[self.printed..];
        print!("{}", new_part);
        self.printed = document.len();
        let _ = std::io::stdout().flush();
        eprint!("\r[{:>5.1}%]", progress * 100.0);
    }

    // 避免刷新过快
    fn throttle(&self) -> Option<Duration> {
        Some(Duration::from_millis(50))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    // 从环境变量加载配置
    let config = Config::from_env()?;
    let client = StreamClient::new(config);

    // 创建组装器
    let options = AssembleOptions::from_config(client.config());
    let assembler = DocumentAssembler::with_options(client, options);

    // 生成文章并实时渲染
    let mut sink = ConsoleSink { printed: 0 };
    let document = assembler
        .article("La historia de la imprenta", &mut sink)
        .await?;

    eprintln!();
    println!("\n--- listo: {} palabras ---", document.word_count());

    Ok(())
}
