//! 值与参数列表
//!
//! 被捕获的赋值与调用参数均以不透明的 [`Value`] 表示（即 `serde_json::Value`），
//! 参数列表 [`Args`] 保持任意元数与原始顺序，原样转发给底层调用。
//!
use crate::error::{CaptureError, CaptureResult};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::ops::Index;

pub use serde_json::Value;

/// 将任意可序列化值转换为 `Value`，失败时归因到成员名
pub fn to_value<V: Serialize>(member: &str, value: V) -> CaptureResult<Value> {
    serde_json::to_value(value).map_err(|e| CaptureError::InvalidValue {
        member: member.to_string(),
        reason: e.to_string(),
    })
}

/// 将 `Value` 解码为目标类型，失败时归因到成员名
pub fn from_value<V: DeserializeOwned>(member: &str, value: Value) -> CaptureResult<V> {
    serde_json::from_value(value).map_err(|e| CaptureError::InvalidValue {
        member: member.to_string(),
        reason: e.to_string(),
    })
}

/// 有序参数列表
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Args(Vec<Value>);

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    pub fn push(&mut self, value: Value) {
        self.0.push(value);
    }

    pub fn into_inner(self) -> Vec<Value> {
        self.0
    }

    /// 校验参数个数
    pub fn expect_len(&self, member: &str, expected: usize) -> CaptureResult<()> {
        if self.0.len() != expected {
            return Err(CaptureError::ArgumentCount {
                member: member.to_string(),
                expected,
                found: self.0.len(),
            });
        }
        Ok(())
    }

    /// 按位置解码参数；缺失的位置按 `null` 解码（便于 `Option<T>` 形参）
    pub fn decode<V: DeserializeOwned>(&self, member: &str, index: usize) -> CaptureResult<V> {
        let raw = self.0.get(index).cloned().unwrap_or(Value::Null);
        serde_json::from_value(raw).map_err(|e| CaptureError::InvalidArgument {
            member: member.to_string(),
            index,
            reason: e.to_string(),
        })
    }
}

impl From<Vec<Value>> for Args {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl From<()> for Args {
    fn from(_: ()) -> Self {
        Self::new()
    }
}

impl FromIterator<Value> for Args {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Args {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl Index<usize> for Args {
    type Output = Value;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

/// 构造参数列表：`args![5, "a", {"k": 1}]`
#[macro_export]
macro_rules! args {
    () => {
        $crate::value::Args::new()
    };
    ($($arg:tt)+) => {{
        let list: ::std::vec::Vec<$crate::value::Value> =
            match $crate::__private::serde_json::json!([$($arg)+]) {
                $crate::value::Value::Array(items) => items,
                _ => ::std::unreachable!(),
            };
        $crate::value::Args::from(list)
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn args_macro_keeps_order_and_arity() {
        let a = args![1, "two", { "three": 3 }];
        assert_eq!(a.len(), 3);
        assert_eq!(a[0], json!(1));
        assert_eq!(a[1], json!("two"));
        assert_eq!(a[2], json!({ "three": 3 }));

        assert!(args![].is_empty());
    }

    #[test]
    fn decode_reports_index_on_type_error() {
        let a = args![1, "x"];
        let n: i64 = a.decode("inc", 0).unwrap();
        assert_eq!(n, 1);

        let err = a.decode::<i64>("inc", 1).unwrap_err();
        match err {
            CaptureError::InvalidArgument { member, index, .. } => {
                assert_eq!(member, "inc");
                assert_eq!(index, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_argument_decodes_as_none() {
        let a = args![1];
        let missing: Option<String> = a.decode("f", 3).unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn expect_len_mismatch() {
        let err = args![1, 2].expect_len("inc", 1).unwrap_err();
        assert!(matches!(
            err,
            CaptureError::ArgumentCount {
                expected: 1,
                found: 2,
                ..
            }
        ));
    }
}
