//! # 两段式示例
//!
//! 先生成一篇固定语域的短篇小说，再把结果送回模型做语法分析。
//! 进度只有 50% 和 100% 两个检查点。

use artigen::client::StreamClient;
use artigen::config::Config;
use artigen::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = Config::from_env()?;
    let client = StreamClient::new(config);

    let document = artigen::write_story_with_analysis(&client).await?;
    println!("{}", document.as_str());

    Ok(())
}
