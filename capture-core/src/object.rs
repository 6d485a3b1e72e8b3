//! 动态对象（DynObject）
//!
//! 成员集合在运行时定义的对象：数据槽、只读数据槽与方法闭包，
//! 并可挂接一个原型对象，成员查找沿原型链进行。
//!
//! 语义约定：
//! - 赋值总是写入自身槽位（遮蔽原型上的同名成员）；
//! - 链上任意位置的只读槽都会拒绝赋值；
//! - 方法调用的接收者为被调用的对象本身，而非定义该方法的原型。
//!
use crate::error::{CaptureError, CaptureResult};
use crate::member::{MemberDescriptor, MemberKind, merge_inherited};
use crate::target::Target;
use crate::value::{Args, Value};
use std::fmt;
use std::sync::Arc;

/// 方法闭包：第一个参数为接收者
pub type MethodFn = Arc<dyn Fn(&mut DynObject, Args) -> CaptureResult<Value> + Send + Sync>;

#[derive(Clone)]
enum Slot {
    Data { value: Value, writable: bool },
    Method(MethodFn),
}

impl Slot {
    fn kind(&self) -> MemberKind {
        match self {
            Slot::Data { writable, .. } => MemberKind::Data {
                writable: *writable,
            },
            Slot::Method(_) => MemberKind::Method,
        }
    }
}

#[derive(Clone, Default)]
pub struct DynObject {
    // 保持定义顺序
    slots: Vec<(String, Slot)>,
    prototype: Option<Box<DynObject>>,
}

impl DynObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prototype(mut self, prototype: DynObject) -> Self {
        self.prototype = Some(Box::new(prototype));
        self
    }

    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.define_value(name, value);
        self
    }

    pub fn with_readonly(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.put(
            name.into(),
            Slot::Data {
                value: value.into(),
                writable: false,
            },
        );
        self
    }

    pub fn with_method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut DynObject, Args) -> CaptureResult<Value> + Send + Sync + 'static,
    {
        self.define_method(name, f);
        self
    }

    pub fn define_value(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.put(
            name.into(),
            Slot::Data {
                value: value.into(),
                writable: true,
            },
        );
    }

    pub fn define_method<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&mut DynObject, Args) -> CaptureResult<Value> + Send + Sync + 'static,
    {
        self.put(name.into(), Slot::Method(Arc::new(f)));
    }

    /// 删除自身槽位（不影响原型），返回是否存在
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.slots.len();
        self.slots.retain(|(n, _)| n != name);
        self.slots.len() != before
    }

    /// 沿原型链读取数据成员
    pub fn value(&self, name: &str) -> Option<&Value> {
        match self.lookup(name)? {
            Slot::Data { value, .. } => Some(value),
            Slot::Method(_) => None,
        }
    }

    pub fn prototype(&self) -> Option<&DynObject> {
        self.prototype.as_deref()
    }

    fn own(&self, name: &str) -> Option<&Slot> {
        self.slots.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    fn lookup(&self, name: &str) -> Option<&Slot> {
        self.own(name)
            .or_else(|| self.prototype.as_deref().and_then(|p| p.lookup(name)))
    }

    fn put(&mut self, name: String, slot: Slot) {
        match self.slots.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = slot,
            None => self.slots.push((name, slot)),
        }
    }
}

impl Target for DynObject {
    fn members(&self) -> Vec<MemberDescriptor> {
        let own = self
            .slots
            .iter()
            .map(|(n, s)| MemberDescriptor::new(n.clone(), s.kind()))
            .collect();
        match self.prototype.as_deref() {
            Some(proto) => merge_inherited(own, proto.members()),
            None => own,
        }
    }

    fn get(&self, name: &str) -> CaptureResult<Value> {
        match self.lookup(name) {
            Some(Slot::Data { value, .. }) => Ok(value.clone()),
            Some(Slot::Method(_)) => Err(CaptureError::NotData {
                member: name.to_string(),
            }),
            None => Err(CaptureError::unknown_member(name)),
        }
    }

    fn set(&mut self, name: &str, value: Value) -> CaptureResult<Value> {
        if let Some(Slot::Data {
            writable: false, ..
        }) = self.lookup(name)
        {
            return Err(CaptureError::ReadOnly {
                member: name.to_string(),
            });
        }
        self.put(
            name.to_string(),
            Slot::Data {
                value: value.clone(),
                writable: true,
            },
        );
        Ok(value)
    }

    fn call(&mut self, name: &str, args: Args) -> CaptureResult<Value> {
        let f = match self.lookup(name) {
            Some(Slot::Method(f)) => f.clone(),
            Some(Slot::Data { .. }) => return Err(CaptureError::not_callable(name)),
            None => return Err(CaptureError::unknown_member(name)),
        };
        f(self, args)
    }
}

impl fmt::Debug for DynObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, slot) in &self.slots {
            match slot {
                Slot::Data { value, .. } => map.entry(name, value),
                Slot::Method(_) => map.entry(name, &"<method>"),
            };
        }
        map.finish()?;
        if let Some(proto) = &self.prototype {
            write!(f, " <- {proto:?}")?;
        }
        Ok(())
    }
}
