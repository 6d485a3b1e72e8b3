//! 命令捕获基础库（capture-core）
//!
//! 包装任意目标对象，将对其成员的赋值与方法调用记录为可回放的命令，而非立即生效：
//! - 命令（`command`）：`SetCommand` / `CallCommand`，持有 owner 的弱引用，可延后应用
//! - 队列（`queue`）：按调用顺序保存命令，支持整体回放与清空
//! - 外观（`facade`）：`capture`（支持暂停/恢复）与 `deferred`（纯批量）两种变体
//! - 反射（`target`）：以显式的成员枚举与按名访问替代动态属性遮蔽
//! - 动态对象（`object`）：带原型链的运行时对象，可直接作为捕获目标
//!
//! 典型用法：
//! 1. 以 `#[capturable]`/`#[capturable_methods]` 标注结构体，或构造 `DynObject`；
//! 2. 用 `shared` 包装为共享句柄，交给 `capture`/`deferred` 构建外观；
//! 3. 通过外观 `set/call` 记录操作，稍后 `execute_all` 统一回放。
//!
//! ```
//! use capture_core::{args, deferred, shared, CaptureOptions, DynObject, Target};
//! use serde_json::json;
//!
//! let source = shared(DynObject::new().with_value("x", 1).with_method("inc", |this, args| {
//!     let n: i64 = args.decode("inc", 0)?;
//!     let x = this.get("x")?.as_i64().unwrap_or_default();
//!     this.set("x", json!(x + n))
//! }));
//!
//! let facade = deferred(source.clone(), CaptureOptions::default());
//! facade.call("inc", args![5]).unwrap();
//! facade.set("x", 100).unwrap();
//! assert_eq!(facade.get("x").unwrap(), json!(1));
//!
//! facade.execute_all().unwrap();
//! assert_eq!(source.read().unwrap().get("x").unwrap(), json!(100));
//! ```
//!
pub mod command;
pub mod error;
pub mod facade;
pub mod member;
pub mod object;
pub mod options;
pub mod queue;
pub mod target;
pub mod value;

pub use command::{CallCommand, Command, CommandRecord, SetCommand};
pub use error::{CaptureError, CaptureResult, InstallError, InstallErrorKind};
pub use facade::{Capture, Deferred, Facade, Shared, capture, deferred, shared};
pub use member::{MemberDescriptor, MemberKind};
pub use object::DynObject;
pub use options::CaptureOptions;
pub use queue::CommandQueue;
pub use target::{MethodTable, Target};
pub use value::{Args, Value};

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}

// 允许在本 crate 内部通过 ::capture_core 进行自引用，
// 以便过程宏在本 crate 的单元测试中也能解析到 ::capture_core 路径。
extern crate self as capture_core;
