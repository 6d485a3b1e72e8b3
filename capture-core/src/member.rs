//! 成员描述
//!
//! 反射阶段产出的 (名称, 种类) 对，构建外观时一次性读取并冻结。
//!
use serde::{Deserialize, Serialize};
use std::fmt;

/// 成员种类：可调用 / 数据成员
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Method,
    Data { writable: bool },
}

impl MemberKind {
    pub const fn field() -> Self {
        Self::Data { writable: true }
    }

    pub const fn readonly() -> Self {
        Self::Data { writable: false }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Method)
    }

    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data { .. })
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Method => f.write_str("method"),
            Self::Data { writable: true } => f.write_str("field"),
            Self::Data { writable: false } => f.write_str("readonly field"),
        }
    }
}

/// 成员描述：`depth` 为 0 表示自身成员，每沿原型/基对象链上溯一层加 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDescriptor {
    pub name: String,
    pub kind: MemberKind,
    pub depth: usize,
}

impl MemberDescriptor {
    pub fn new(name: impl Into<String>, kind: MemberKind) -> Self {
        Self {
            name: name.into(),
            kind,
            depth: 0,
        }
    }

    pub fn method(name: impl Into<String>) -> Self {
        Self::new(name, MemberKind::Method)
    }

    pub fn field(name: impl Into<String>) -> Self {
        Self::new(name, MemberKind::field())
    }

    pub fn readonly(name: impl Into<String>) -> Self {
        Self::new(name, MemberKind::readonly())
    }

    /// 作为上一层（继承）成员返回
    pub fn inherited(mut self) -> Self {
        self.depth += 1;
        self
    }
}

/// 合并自身成员与继承成员：同名时距离最近的定义胜出，保持首次出现的顺序
pub fn merge_inherited(
    own: Vec<MemberDescriptor>,
    inherited: impl IntoIterator<Item = MemberDescriptor>,
) -> Vec<MemberDescriptor> {
    let mut out = own;
    for desc in inherited {
        if !out.iter().any(|d| d.name == desc.name) {
            out.push(desc.inherited());
        }
    }
    out
}
