//! 外观构建选项（CaptureOptions）
//!
//! 可由 builder 构建，也可从 JSON 配置反序列化。
//!
use bon::Builder;
use serde::{Deserialize, Serialize};

/// 外观构建选项
///
/// - `execute_immediately`：为 true 时每次拦截的操作既入队又同步执行并返回结果；
///   默认 false，仅记录，待 `execute_all` 时统一执行。
///
/// 支持从配置反序列化，键名兼容 `execute_immediately` 与 `executeImmediately`：
///
/// ```
/// use capture_core::options::CaptureOptions;
///
/// let opts: CaptureOptions = serde_json::from_str(r#"{"executeImmediately": true}"#).unwrap();
/// assert!(opts.execute_immediately());
///
/// let opts = CaptureOptions::builder().build();
/// assert!(!opts.execute_immediately());
/// ```
#[derive(Builder, Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureOptions {
    #[builder(default)]
    #[serde(alias = "executeImmediately")]
    execute_immediately: bool,
}

impl CaptureOptions {
    /// 立即执行模式（记录并透传）
    pub fn immediate() -> Self {
        Self {
            execute_immediately: true,
        }
    }

    pub fn execute_immediately(&self) -> bool {
        self.execute_immediately
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_deferred_execution() {
        let opts: CaptureOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, CaptureOptions::default());
        assert!(!opts.execute_immediately());
    }

    #[test]
    fn builder_and_snake_case_key() {
        let built = CaptureOptions::builder().execute_immediately(true).build();
        let parsed: CaptureOptions =
            serde_json::from_str(r#"{"execute_immediately": true}"#).unwrap();
        assert_eq!(built, parsed);
        assert_eq!(built, CaptureOptions::immediate());
    }
}
