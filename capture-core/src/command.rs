//! 命令（Command）
//!
//! 将一次“赋值”或“调用”具体化为可延后执行的对象：
//! - `SetCommand`：执行 `owner.member = value`，返回被赋的值；
//! - `CallCommand`：以 owner 为接收者执行 `owner.member(args...)`，返回调用结果。
//!
//! 命令只持有 owner 的弱引用；owner 先于命令被释放时，应用失败并返回 `OwnerDropped`。
//! 命令层不保证幂等：重复应用会重复产生副作用。
//!
use crate::error::{CaptureError, CaptureResult};
use crate::target::Target;
use crate::value::{Args, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{RwLock, Weak};

/// 赋值命令
pub struct SetCommand<T> {
    owner: Weak<RwLock<T>>,
    member: String,
    value: Value,
}

impl<T> SetCommand<T> {
    pub fn new(owner: Weak<RwLock<T>>, member: impl Into<String>, value: Value) -> Self {
        Self {
            owner,
            member: member.into(),
            value,
        }
    }

    pub fn member(&self) -> &str {
        &self.member
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl<T: Target> SetCommand<T> {
    pub fn apply(&self) -> CaptureResult<Value> {
        with_owner(&self.owner, &self.member, |owner| {
            owner.set(&self.member, self.value.clone())
        })
    }
}

/// 调用命令
pub struct CallCommand<T> {
    owner: Weak<RwLock<T>>,
    member: String,
    args: Args,
}

impl<T> CallCommand<T> {
    pub fn new(owner: Weak<RwLock<T>>, member: impl Into<String>, args: Args) -> Self {
        Self {
            owner,
            member: member.into(),
            args,
        }
    }

    pub fn member(&self) -> &str {
        &self.member
    }

    pub fn args(&self) -> &Args {
        &self.args
    }
}

impl<T: Target> CallCommand<T> {
    pub fn apply(&self) -> CaptureResult<Value> {
        with_owner(&self.owner, &self.member, |owner| {
            owner.call(&self.member, self.args.clone())
        })
    }
}

fn with_owner<T, R>(
    owner: &Weak<RwLock<T>>,
    member: &str,
    f: impl FnOnce(&mut T) -> CaptureResult<R>,
) -> CaptureResult<R> {
    let owner = owner.upgrade().ok_or_else(|| CaptureError::OwnerDropped {
        member: member.to_string(),
    })?;
    let mut guard = owner.write().map_err(|_| CaptureError::Poisoned)?;
    f(&mut *guard)
}

/// 待执行的命令
pub enum Command<T> {
    Set(SetCommand<T>),
    Call(CallCommand<T>),
}

impl<T> Command<T> {
    pub fn set(owner: Weak<RwLock<T>>, member: impl Into<String>, value: Value) -> Self {
        Self::Set(SetCommand::new(owner, member, value))
    }

    pub fn call(owner: Weak<RwLock<T>>, member: impl Into<String>, args: Args) -> Self {
        Self::Call(CallCommand::new(owner, member, args))
    }

    pub fn member(&self) -> &str {
        match self {
            Self::Set(c) => c.member(),
            Self::Call(c) => c.member(),
        }
    }

    /// 只读快照（可序列化，用于审计/排查）
    pub fn record(&self) -> CommandRecord {
        match self {
            Self::Set(c) => CommandRecord::Set {
                member: c.member.clone(),
                value: c.value.clone(),
            },
            Self::Call(c) => CommandRecord::Call {
                member: c.member.clone(),
                args: c.args.clone(),
            },
        }
    }
}

impl<T: Target> Command<T> {
    /// 应用命令并返回结果；失败原样传播
    pub fn apply(&self) -> CaptureResult<Value> {
        match self {
            Self::Set(c) => c.apply(),
            Self::Call(c) => c.apply(),
        }
    }
}

// 手写 Clone/Debug：不对 T 施加约束
impl<T> Clone for SetCommand<T> {
    fn clone(&self) -> Self {
        Self {
            owner: self.owner.clone(),
            member: self.member.clone(),
            value: self.value.clone(),
        }
    }
}

impl<T> Clone for CallCommand<T> {
    fn clone(&self) -> Self {
        Self {
            owner: self.owner.clone(),
            member: self.member.clone(),
            args: self.args.clone(),
        }
    }
}

impl<T> Clone for Command<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Set(c) => Self::Set(c.clone()),
            Self::Call(c) => Self::Call(c.clone()),
        }
    }
}

impl<T> fmt::Debug for Command<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set(c) => f
                .debug_struct("SetCommand")
                .field("member", &c.member)
                .field("value", &c.value)
                .finish(),
            Self::Call(c) => f
                .debug_struct("CallCommand")
                .field("member", &c.member)
                .field("args", &c.args)
                .finish(),
        }
    }
}

/// 命令快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandRecord {
    Set { member: String, value: Value },
    Call { member: String, args: Args },
}

impl CommandRecord {
    pub fn member(&self) -> &str {
        match self {
            Self::Set { member, .. } | Self::Call { member, .. } => member,
        }
    }
}
