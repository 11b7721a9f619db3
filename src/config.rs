//! 配置模块
use crate::error::{ArtigenError, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

// ===============================================================================================
// 配置模块
// ===============================================================================================

/// 生成客户端配置
///
/// 包含所有必要的配置参数，支持 Builder 模式和环境变量配置。
/// 配置在构建客户端时显式传入，不使用任何全局状态。
#[derive(Debug, Clone)]
pub struct Config {
    /// 模型名称
    pub(crate) model: String,
    /// 温度参数 (0.0-2.0)
    pub(crate) temperature: f32,
    /// Top-p 参数 (0.0-1.0)
    pub(crate) top_p: f32,
    /// Top-k 参数
    pub(crate) top_k: u32,
    /// 重复惩罚系数
    pub(crate) repetition_penalty: f32,
    /// 最大生成 token 数
    pub(crate) max_tokens: u32,
    /// 停止序列
    pub(crate) stop: Vec<String>,
    /// 请求超时时间
    pub(crate) timeout: Duration,
    /// API 基础 URL
    pub(crate) api_base: String,
    /// API 密钥
    pub(crate) api_key: String,
    /// 成稿的最小总字数
    pub(crate) min_total_words: usize,
    /// 单章节目标字数下限
    pub(crate) section_word_floor: usize,
    /// 补充生成的最大轮数
    pub(crate) max_filler_rounds: usize,
    /// 单次成稿的目标字符数，用于估算进度（约 3000 词 ≈ 18000 字符）
    pub(crate) article_char_goal: usize,
    /// 最大并发请求数
    pub(crate) max_concurrent_requests: Option<usize>,
    /// 连接池空闲超时时间
    pub(crate) pool_idle_timeout: Duration,
    /// 每个主机的最大空闲连接数
    pub(crate) pool_max_idle_per_host: usize,
    /// TCP Keepalive
    pub(crate) tcp_keepalive: Duration,
    /// TCP Nodelay
    pub(crate) tcp_nodelay: bool,
}

impl Default for Config {
    /// 创建默认配置
    ///
    /// 默认指向 Together 的 chat/completions 接口
    fn default() -> Self {
        Self {
            model: "meta-llama/Meta-Llama-3.1-405B-Instruct-Turbo".into(),
            temperature: 0.7,
            top_p: 0.7,
            top_k: 50,
            repetition_penalty: 1.0,
            max_tokens: 2512,
            stop: vec!["<|eot_id|>".into()],
            timeout: Duration::from_secs(120),
            api_base: "https://api.together.xyz/v1".into(),
            api_key: String::new(),
            min_total_words: 3000,
            section_word_floor: 300,
            max_filler_rounds: 8,
            article_char_goal: 18000,
            max_concurrent_requests: Some(64),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 16,
            tcp_keepalive: Duration::from_secs(60),
            tcp_nodelay: true,
        }
    }
}

/// 生成 Config Builder 方法的宏
///
/// 自动生成 `with_field_name` 形式的 builder 方法
macro_rules! config_builder {
    ($field:ident, $type:ty) => {
        paste::paste! {
            #[doc = "设置 `"]
            #[doc = stringify!($field)]
            #[doc = "`"]
            pub fn [<with_ $field>](mut self, $field: $type) -> Self {
                self.$field = $field;
                self
            }
        }
    };
    ($field:ident, $type:ty, option) => {
        paste::paste! {
            #[doc = "设置 `"]
            #[doc = stringify!($field)]
            #[doc = "`"]
            pub fn [<with_ $field>](mut self, $field: $type) -> Self {
                self.$field = Some($field);
                self
            }
        }
    };
}

impl Config {
    pub fn model(&self) -> &str { &self.model }
    pub fn temperature(&self) -> f32 { self.temperature }
    pub fn top_p(&self) -> f32 { self.top_p }
    pub fn top_k(&self) -> u32 { self.top_k }
    pub fn repetition_penalty(&self) -> f32 { self.repetition_penalty }
    pub fn max_tokens(&self) -> u32 { self.max_tokens }
    pub fn stop(&self) -> &[String] { &self.stop }
    pub fn timeout(&self) -> Duration { self.timeout }
    pub fn api_base(&self) -> &str { &self.api_base }
    pub fn api_key(&self) -> &str { &self.api_key }
    pub fn min_total_words(&self) -> usize { self.min_total_words }
    pub fn section_word_floor(&self) -> usize { self.section_word_floor }
    pub fn max_filler_rounds(&self) -> usize { self.max_filler_rounds }
    pub fn article_char_goal(&self) -> usize { self.article_char_goal }

    /// 从环境变量和 `.env` 文件加载配置
    ///
    /// 环境变量会覆盖 `.env` 文件中的设置
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        let api_key = env::var("TOGETHER_API_KEY")
            .map_err(|_| ArtigenError::Config("TOGETHER_API_KEY not found".into()))?;

        let model = env::var("TOGETHER_MODEL")
            .unwrap_or_else(|_| Config::default().model);
        let api_base = env::var("API_BASE")
            .unwrap_or_else(|_| "https://api.together.xyz/v1".to_string());

        let config = Config {
            api_key,
            model,
            api_base,
            ..Default::default()
        };

        Ok(config)
    }

    // 使用宏生成 builder 方法
    config_builder!(api_base, String);
    config_builder!(model, String);
    config_builder!(api_key, String);
    config_builder!(temperature, f32);
    config_builder!(top_p, f32);
    config_builder!(top_k, u32);
    config_builder!(repetition_penalty, f32);
    config_builder!(max_tokens, u32);
    config_builder!(stop, Vec<String>);
    config_builder!(timeout, Duration);
    config_builder!(min_total_words, usize);
    config_builder!(section_word_floor, usize);
    config_builder!(max_filler_rounds, usize);
    config_builder!(article_char_goal, usize);
    config_builder!(max_concurrent_requests, usize, option);
    config_builder!(pool_idle_timeout, Duration);
    config_builder!(pool_max_idle_per_host, usize);
    config_builder!(tcp_keepalive, Duration);
    config_builder!(tcp_nodelay, bool);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to protect environment variable tests from running in parallel
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Tests that the default configuration is created correctly.
    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.model, "meta-llama/Meta-Llama-3.1-405B-Instruct-Turbo");
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.top_p, 0.7);
        assert_eq!(config.top_k, 50);
        assert_eq!(config.max_tokens, 2512);
        assert_eq!(config.stop, vec!["<|eot_id|>".to_string()]);
        assert_eq!(config.api_key, "");
        assert_eq!(config.min_total_words, 3000);
        assert_eq!(config.section_word_floor, 300);
        assert_eq!(config.max_filler_rounds, 8);
        assert_eq!(config.article_char_goal, 18000);
    }

    /// Tests the builder methods for setting configuration fields.
    #[test]
    fn test_config_builder_methods() {
        let config = Config::default()
            .with_model("test_model".to_string())
            .with_api_key("test_key".to_string())
            .with_temperature(0.9)
            .with_min_total_words(500)
            .with_max_filler_rounds(3);

        assert_eq!(config.model, "test_model");
        assert_eq!(config.api_key, "test_key");
        assert_eq!(config.temperature, 0.9);
        assert_eq!(config.min_total_words, 500);
        assert_eq!(config.max_filler_rounds, 3);
    }

    /// Tests loading configuration from environment variables.
    #[test]
    fn test_from_env_with_env_vars() {
        let _lock = ENV_LOCK.lock().unwrap();

        env::set_var("TOGETHER_API_KEY", "env_var_key");
        env::set_var("TOGETHER_MODEL", "env_var_model");

        let config = Config::from_env().unwrap();
        assert_eq!(config.api_key, "env_var_key");
        assert_eq!(config.model, "env_var_model");

        env::remove_var("TOGETHER_API_KEY");
        env::remove_var("TOGETHER_MODEL");
    }

    /// Tests that an error is returned if the API key is not found.
    #[test]
    fn test_from_env_missing_api_key() {
        let _lock = ENV_LOCK.lock().unwrap();
        env::remove_var("TOGETHER_API_KEY");

        let result = Config::from_env();
        assert!(matches!(result, Err(ArtigenError::Config(_))));
    }

    /// Tests that default values are used when no model is set in the environment.
    #[test]
    fn test_from_env_uses_defaults_for_model() {
        let _lock = ENV_LOCK.lock().unwrap();
        env::set_var("TOGETHER_API_KEY", "some_key");
        env::remove_var("TOGETHER_MODEL");

        let config = Config::from_env().unwrap();
        assert_eq!(config.model, Config::default().model);

        env::remove_var("TOGETHER_API_KEY");
    }
}
