//! # 索引展开示例
//!
//! 这个示例展示了索引展开模式：
//! - 先生成文章索引并解析出章节
//! - 逐章节串行生成，按剩余缺口均摊目标字数
//! - 字数不足时进入补充循环，直到达到最小字数

use artigen::assembler::{AssembleOptions, DocumentAssembler, ProgressSink};
use artigen::client::StreamClient;
use artigen::config::Config;
use artigen::error::{ArtigenError, Result};

/// 只打印进度，生成结束后一次性输出全文
#[derive(Default)]
struct ProgressOnly {
    last_percent: u32,
}

impl ProgressSink for ProgressOnly {
    fn update(&mut self, _document: &str, progress: f64) {
        let percent = (progress * 100.0) as u32;
        if percent != self.last_percent {
            self.last_percent = percent;
            eprint!("\rGenerando... {:>3}%", percent);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = Config::from_env()?;
    let client = StreamClient::new(config);

    let options = AssembleOptions::from_config(client.config()).with_min_total_words(3000);
    let assembler = DocumentAssembler::with_options(client, options);

    let mut sink = ProgressOnly::default();
    match assembler
        .outline_article("El impacto de la inteligencia artificial en la educación", &mut sink)
        .await
    {
        Ok(document) => {
            eprintln!();
            println!("{}", document.as_str());
            println!("\n--- {} palabras ---", document.word_count());
        }
        Err(ArtigenError::TargetUnreachable { words, target, rounds }) => {
            eprintln!();
            eprintln!(
                "No se alcanzó el mínimo: {} de {} palabras tras {} rondas",
                words, target, rounds
            );
        }
        Err(e) => return Err(e),
    }

    Ok(())
}
