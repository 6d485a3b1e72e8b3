//! 可被捕获的目标对象（Target）抽象
//!
//! 以显式反射接口替代动态属性遮蔽：
//! - `members` 列出自身及沿基对象链可达的全部成员；
//! - `get/set/call` 按名称读取、赋值与调用，接收者始终为目标自身。
//!
//! 普通结构体可通过 `capture_macros::capturable` / `capturable_methods` 自动实现，
//! 动态对象见 [`DynObject`](crate::object::DynObject)。
//!
use crate::error::CaptureResult;
use crate::member::MemberDescriptor;
use crate::value::{Args, Value};

pub trait Target: Send + Sync {
    /// 全部可达成员（自身成员在前，继承成员在后）
    fn members(&self) -> Vec<MemberDescriptor>;

    /// 读取数据成员当前值
    fn get(&self, name: &str) -> CaptureResult<Value>;

    /// 赋值数据成员，返回被赋的值
    fn set(&mut self, name: &str, value: Value) -> CaptureResult<Value>;

    /// 以自身为接收者调用方法成员，返回调用结果
    fn call(&mut self, name: &str, args: Args) -> CaptureResult<Value>;
}

/// 方法表：由 `#[capturable_methods]` 为固有 impl 块生成
pub trait MethodTable {
    /// 可调用成员名（声明顺序）
    fn method_names() -> &'static [&'static str];

    /// 按名称分发调用；未知名称返回 `UnknownMember`
    fn call_method(&mut self, name: &str, args: Args) -> CaptureResult<Value>;
}

impl<T: Target + ?Sized> Target for Box<T> {
    fn members(&self) -> Vec<MemberDescriptor> {
        (**self).members()
    }

    fn get(&self, name: &str) -> CaptureResult<Value> {
        (**self).get(name)
    }

    fn set(&mut self, name: &str, value: Value) -> CaptureResult<Value> {
        (**self).set(name, value)
    }

    fn call(&mut self, name: &str, args: Args) -> CaptureResult<Value> {
        (**self).call(name, args)
    }
}
