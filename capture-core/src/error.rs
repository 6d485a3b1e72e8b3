//! 捕获层统一错误定义
//!
//! 分为两类：
//! - 成员安装失败（`InstallError`）：构建外观时逐成员记录，不中断构建；
//! - 执行/访问失败（`CaptureError`）：命令应用、外观访问时同步向调用方传播。
//!
use thiserror::Error;

/// 统一错误类型
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CaptureError {
    // --- 成员访问 ---
    #[error("unknown member: {member}")]
    UnknownMember { member: String },
    #[error("member is not callable: {member}")]
    NotCallable { member: String },
    #[error("not a data member: {member}")]
    NotData { member: String },
    #[error("read-only member: {member}")]
    ReadOnly { member: String },

    // --- 参数与取值 ---
    #[error("argument count mismatch: member={member}, expected={expected}, found={found}")]
    ArgumentCount {
        member: String,
        expected: usize,
        found: usize,
    },
    #[error("invalid argument: member={member}, index={index}, reason={reason}")]
    InvalidArgument {
        member: String,
        index: usize,
        reason: String,
    },
    #[error("invalid value: member={member}, reason={reason}")]
    InvalidValue { member: String, reason: String },
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },

    // --- 命令执行 ---
    #[error("invocation failed: member={member}, reason={reason}")]
    Invocation { member: String, reason: String },
    #[error("owner dropped before applying command on member: {member}")]
    OwnerDropped { member: String },
    #[error("owner lock poisoned")]
    Poisoned,
    #[error("replay aborted at position {position} (member={member}): {source}")]
    Replay {
        position: usize,
        member: String,
        #[source]
        source: Box<CaptureError>,
    },
}

impl CaptureError {
    pub fn unknown_member(member: impl Into<String>) -> Self {
        Self::UnknownMember {
            member: member.into(),
        }
    }

    pub fn not_callable(member: impl Into<String>) -> Self {
        Self::NotCallable {
            member: member.into(),
        }
    }

    pub fn invocation(member: impl Into<String>, reason: impl ToString) -> Self {
        Self::Invocation {
            member: member.into(),
            reason: reason.to_string(),
        }
    }

    /// 若为回放中止，返回最内层的原始错误；否则返回自身
    pub fn root_cause(&self) -> &CaptureError {
        match self {
            Self::Replay { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// 统一 Result 类型别名
pub type CaptureResult<T> = Result<T, CaptureError>;

/// 成员安装失败的原因
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstallErrorKind {
    /// 与外观自身的队列管理操作重名
    #[error("name is reserved by the facade")]
    ReservedName,
    /// 空名或包含空白等无法作为成员名使用
    #[error("invalid member name")]
    InvalidName,
    /// 构建时读取成员当前值失败
    #[error("member could not be read: {reason}")]
    Inaccessible { reason: String },
}

/// 单个成员安装失败的记录（构建过程不因此中断）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot install member `{member}`: {reason}")]
pub struct InstallError {
    pub member: String,
    pub reason: InstallErrorKind,
}

impl InstallError {
    pub fn new(member: impl Into<String>, reason: InstallErrorKind) -> Self {
        Self {
            member: member.into(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_cause_unwraps_nested_replay() {
        let err = CaptureError::Replay {
            position: 2,
            member: "inc".into(),
            source: Box::new(CaptureError::ReadOnly {
                member: "inc".into(),
            }),
        };
        assert!(matches!(err.root_cause(), CaptureError::ReadOnly { .. }));
        assert!(err.to_string().contains("position 2"));
    }

    #[test]
    fn install_error_display_names_member() {
        let err = InstallError::new("queue", InstallErrorKind::ReservedName);
        assert_eq!(
            err.to_string(),
            "cannot install member `queue`: name is reserved by the facade"
        );
    }
}
