//! 外观（Facade）与构建器
//!
//! 构建时对源对象做一次反射遍历，得到冻结的 (成员名, 种类) 集合；
//! 之后通过外观进行的赋值与调用不会直接作用于源对象，而是生成命令入队：
//! - 数据成员：读取总是实时穿透到源对象，只有写入会被记录；
//! - 方法成员：调用被记录为 `CallCommand`；
//! - `execute_immediately` 选项下，记录的同时立即执行并返回结果；
//! - `Capture` 变体额外支持暂停：暂停期间的操作直接执行，不入队。
//!
//! 两个变体共用同一实现，通过类型参数 `M: Mode` 区分是否具备暂停能力。
//!
use crate::command::{Command, CommandRecord};
use crate::error::{CaptureError, CaptureResult, InstallError, InstallErrorKind};
use crate::member::{MemberDescriptor, MemberKind};
use crate::options::CaptureOptions;
use crate::queue::CommandQueue;
use crate::target::Target;
use crate::value::{self, Args, Value};
use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tracing::{debug, warn};

/// 外观与调用方共享的源对象句柄
pub type Shared<T> = Arc<RwLock<T>>;

pub fn shared<T>(value: T) -> Shared<T> {
    Arc::new(RwLock::new(value))
}

mod sealed {
    pub trait Sealed {}
}

/// 外观变体标记
pub trait Mode: sealed::Sealed + Send + Sync + 'static {
    const NAME: &'static str;
    const PAUSABLE: bool;

    /// 名称是否被外观自身占用、不可被源成员使用
    fn is_reserved(name: &str) -> bool {
        QUEUE_MANAGEMENT.contains(&name) || (Self::PAUSABLE && PAUSE_CONTROL.contains(&name))
    }
}

const QUEUE_MANAGEMENT: &[&str] = &[
    "queue",
    "opts",
    "options",
    "source",
    "executeAll",
    "execute_all",
    "clearQueue",
    "clear_queue",
];

// 仅 capture 变体额外占用
const PAUSE_CONTROL: &[&str] = &[
    "paused",
    "pauseCapture",
    "pause_capture",
    "resumeCapture",
    "resume_capture",
];

/// capture 变体：立即执行 + 暂停/恢复
pub struct Pausable;

/// deferred 变体：仅立即执行选项
pub struct Batched;

impl sealed::Sealed for Pausable {}
impl sealed::Sealed for Batched {}

impl Mode for Pausable {
    const NAME: &'static str = "capture";
    const PAUSABLE: bool = true;
}

impl Mode for Batched {
    const NAME: &'static str = "deferred";
    const PAUSABLE: bool = false;
}

pub type Capture<T> = Facade<T, Pausable>;
pub type Deferred<T> = Facade<T, Batched>;

/// 构建 capture 外观
pub fn capture<T: Target>(source: Shared<T>, options: CaptureOptions) -> Capture<T> {
    Facade::new(source, options)
}

/// 构建 deferred 外观
pub fn deferred<T: Target>(source: Shared<T>, options: CaptureOptions) -> Deferred<T> {
    Facade::new(source, options)
}

pub struct Facade<T, M: Mode> {
    source: Shared<T>,
    members: Vec<(String, MemberKind)>,
    failures: Vec<InstallError>,
    queue: Mutex<CommandQueue<T>>,
    options: CaptureOptions,
    paused: AtomicBool,
    _mode: PhantomData<M>,
}

impl<T: Target, M: Mode> Facade<T, M> {
    /// 遍历源对象成员并安装影子成员；单个成员失败仅记录，不影响其余成员
    pub fn new(source: Shared<T>, options: CaptureOptions) -> Self {
        let mut members: Vec<(String, MemberKind)> = Vec::new();
        let mut failures = Vec::new();

        {
            // 反射只读取，不依赖锁内数据的一致性
            let target = source.read().unwrap_or_else(PoisonError::into_inner);
            let mut seen = HashSet::new();

            for desc in target.members() {
                if !seen.insert(desc.name.clone()) {
                    continue;
                }
                match classify::<T, M>(&*target, &desc) {
                    Ok(kind) => members.push((desc.name, kind)),
                    Err(reason) => {
                        warn!(
                            target: "capture_core",
                            mode = M::NAME,
                            member = %desc.name,
                            %reason,
                            "member installation failed"
                        );
                        failures.push(InstallError::new(desc.name, reason));
                    }
                }
            }
        }

        debug!(
            target: "capture_core",
            mode = M::NAME,
            members = members.len(),
            failures = failures.len(),
            immediate = options.execute_immediately(),
            "facade built"
        );

        Self {
            source,
            members,
            failures,
            queue: Mutex::new(CommandQueue::new()),
            options,
            paused: AtomicBool::new(false),
            _mode: PhantomData,
        }
    }

    /// 调用方法成员
    ///
    /// 返回 `Some(result)` 表示已同步执行（立即模式或暂停中），`None` 表示仅记录。
    pub fn call(&self, name: &str, args: impl Into<Args>) -> CaptureResult<Option<Value>> {
        if !self.kind_of(name)?.is_callable() {
            return Err(CaptureError::not_callable(name));
        }
        let weak = Arc::downgrade(&self.source);
        self.intercept(Command::call(weak, name, args.into()))
    }

    /// 赋值数据成员；只读成员照常入队，拒绝发生在执行时
    pub fn set<V: Serialize>(&self, name: &str, value: V) -> CaptureResult<Option<Value>> {
        if !self.kind_of(name)?.is_data() {
            return Err(CaptureError::NotData {
                member: name.to_string(),
            });
        }
        let value = serde_json::to_value(value)?;
        let weak = Arc::downgrade(&self.source);
        self.intercept(Command::set(weak, name, value))
    }

    /// 实时读取数据成员（不受队列中未执行写入的影响）
    pub fn get(&self, name: &str) -> CaptureResult<Value> {
        if !self.kind_of(name)?.is_data() {
            return Err(CaptureError::NotData {
                member: name.to_string(),
            });
        }
        let target = self.source.read().map_err(|_| CaptureError::Poisoned)?;
        target.get(name)
    }

    pub fn get_as<V: DeserializeOwned>(&self, name: &str) -> CaptureResult<V> {
        value::from_value(name, self.get(name)?)
    }

    /// 依 FIFO 顺序执行全部已记录命令；队列保留，失败时已执行部分不回滚
    pub fn execute_all(&self) -> CaptureResult<Vec<Value>> {
        let queue = self.queue();
        debug!(target: "capture_core", mode = M::NAME, count = queue.len(), "executing queue");
        queue.apply_all()
    }

    /// 丢弃全部已记录命令（不执行）
    pub fn clear_queue(&self) {
        let mut queue = self.queue();
        if !queue.is_empty() {
            debug!(target: "capture_core", mode = M::NAME, dropped = queue.len(), "queue cleared");
        }
        queue.clear();
    }

    pub fn queue_len(&self) -> usize {
        self.queue().len()
    }

    pub fn is_queue_empty(&self) -> bool {
        self.queue().is_empty()
    }

    /// 队列中命令的快照
    pub fn pending(&self) -> Vec<CommandRecord> {
        self.queue().records()
    }

    pub fn members(&self) -> impl Iterator<Item = (&str, MemberKind)> + '_ {
        self.members.iter().map(|(n, k)| (n.as_str(), *k))
    }

    pub fn member_kind(&self, name: &str) -> Option<MemberKind> {
        self.members.iter().find(|(n, _)| n == name).map(|(_, k)| *k)
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.member_kind(name).is_some()
    }

    pub fn options(&self) -> &CaptureOptions {
        &self.options
    }

    pub fn source(&self) -> &Shared<T> {
        &self.source
    }

    /// 构建期间安装失败的成员
    pub fn install_failures(&self) -> &[InstallError] {
        &self.failures
    }

    fn kind_of(&self, name: &str) -> CaptureResult<MemberKind> {
        self.member_kind(name)
            .ok_or_else(|| CaptureError::unknown_member(name))
    }

    fn intercept(&self, command: Command<T>) -> CaptureResult<Option<Value>> {
        if M::PAUSABLE && self.paused.load(Ordering::Acquire) {
            debug!(target: "capture_core", member = command.member(), "paused, applying directly");
            return command.apply().map(Some);
        }

        let immediate = self.options.execute_immediately().then(|| command.clone());
        {
            let mut queue = self.queue();
            debug!(
                target: "capture_core",
                mode = M::NAME,
                member = command.member(),
                position = queue.len(),
                "command captured"
            );
            queue.push(command);
        }

        match immediate {
            Some(command) => command.apply().map(Some),
            None => Ok(None),
        }
    }

    // 队列本身在任何时刻都是完整的 Vec，锁中毒后继续使用是安全的
    fn queue(&self) -> MutexGuard<'_, CommandQueue<T>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Target> Facade<T, Pausable> {
    /// 进入暂停：此后的操作直接执行，不记录
    pub fn pause_capture(&self) {
        if !self.paused.swap(true, Ordering::AcqRel) {
            debug!(target: "capture_core", "capture paused");
        }
    }

    /// 恢复记录
    pub fn resume_capture(&self) {
        if self.paused.swap(false, Ordering::AcqRel) {
            debug!(target: "capture_core", "capture resumed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }
}

fn classify<T: Target, M: Mode>(
    target: &T,
    desc: &MemberDescriptor,
) -> Result<MemberKind, InstallErrorKind> {
    let name = desc.name.as_str();
    if name.is_empty() || name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(InstallErrorKind::InvalidName);
    }
    if M::is_reserved(name) {
        return Err(InstallErrorKind::ReservedName);
    }
    if desc.kind.is_data() {
        target
            .get(name)
            .map_err(|e| InstallErrorKind::Inaccessible {
                reason: e.to_string(),
            })?;
    }
    Ok(desc.kind)
}

impl<T, M: Mode> fmt::Debug for Facade<T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let queued = self
            .queue
            .lock()
            .map(|q| q.len())
            .unwrap_or_else(|e| e.into_inner().len());
        f.debug_struct("Facade")
            .field("mode", &M::NAME)
            .field("members", &self.members)
            .field("queued", &queued)
            .field("options", &self.options)
            .field("paused", &self.paused.load(Ordering::Relaxed))
            .field("failures", &self.failures)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::object::DynObject;
    use serde_json::json;

    fn counter() -> Shared<DynObject> {
        shared(
            DynObject::new()
                .with_value("x", 1)
                .with_method("inc", |this, args| {
                    let n: i64 = args.decode("inc", 0)?;
                    let x = this.get("x")?.as_i64().unwrap_or_default();
                    this.set("x", json!(x + n))
                }),
        )
    }

    fn x_of(source: &Shared<DynObject>) -> Value {
        source.read().unwrap().get("x").unwrap()
    }

    #[test]
    fn example_scenario_replays_in_call_order() {
        let source = counter();
        let facade = deferred(source.clone(), CaptureOptions::default());

        assert_eq!(facade.call("inc", args![5]).unwrap(), None);
        assert_eq!(facade.call("inc", args![5]).unwrap(), None);
        assert_eq!(facade.set("x", 100).unwrap(), None);
        assert_eq!(x_of(&source), json!(1));

        let results = facade.execute_all().unwrap();
        assert_eq!(results, vec![json!(6), json!(11), json!(100)]);
        assert_eq!(x_of(&source), json!(100));
    }

    #[test]
    fn reads_pass_through_pending_writes() {
        let source = counter();
        let facade = capture(source.clone(), CaptureOptions::default());
        facade.set("x", 7).unwrap();
        assert_eq!(facade.get("x").unwrap(), json!(1));
        source.write().unwrap().set("x", json!(3)).unwrap();
        assert_eq!(facade.get_as::<i64>("x").unwrap(), 3);
    }

    #[test]
    fn immediate_mode_records_and_returns() {
        let source = counter();
        let facade = deferred(source.clone(), CaptureOptions::immediate());

        assert_eq!(facade.call("inc", args![2]).unwrap(), Some(json!(3)));
        assert_eq!(facade.set("x", 10).unwrap(), Some(json!(10)));
        assert_eq!(x_of(&source), json!(10));
        assert_eq!(facade.queue_len(), 2);
    }

    #[test]
    fn pause_bypasses_queue_and_resume_restores_it() {
        let source = counter();
        let facade = capture(source.clone(), CaptureOptions::default());

        facade.call("inc", args![1]).unwrap();
        facade.pause_capture();
        assert!(facade.is_paused());
        assert_eq!(facade.call("inc", args![10]).unwrap(), Some(json!(11)));
        assert_eq!(facade.queue_len(), 1);

        facade.clear_queue();
        assert_eq!(x_of(&source), json!(11));

        facade.resume_capture();
        assert_eq!(facade.call("inc", args![1]).unwrap(), None);
        assert_eq!(facade.queue_len(), 1);
        assert_eq!(x_of(&source), json!(11));
    }

    #[test]
    fn reserved_names_are_recorded_not_fatal() {
        let source = shared(
            DynObject::new()
                .with_value("queue", json!([]))
                .with_value("paused", false)
                .with_value("", 0)
                .with_value("ok", 1),
        );

        let c = capture(source.clone(), CaptureOptions::default());
        let failed: Vec<_> = c.install_failures().iter().map(|f| f.member.as_str()).collect();
        assert_eq!(failed, vec!["queue", "paused", ""]);
        assert!(c.has_member("ok"));
        assert!(!c.has_member("queue"));

        // deferred 不保留 pause 相关名称
        let d = deferred(source, CaptureOptions::default());
        assert!(d.has_member("paused"));
        assert_eq!(d.install_failures().len(), 2);
    }

    #[test]
    fn unknown_and_mismatched_members_are_rejected() {
        let facade = deferred(counter(), CaptureOptions::default());
        assert!(matches!(
            facade.call("nope", args![]).unwrap_err(),
            CaptureError::UnknownMember { .. }
        ));
        assert!(matches!(
            facade.call("x", args![]).unwrap_err(),
            CaptureError::NotCallable { .. }
        ));
        assert!(matches!(
            facade.set("inc", 1).unwrap_err(),
            CaptureError::NotData { .. }
        ));
        assert!(facade.is_queue_empty());
    }

    #[test]
    fn members_added_after_build_are_not_masked() {
        let source = counter();
        let facade = deferred(source.clone(), CaptureOptions::default());
        source.write().unwrap().define_value("late", 1);
        assert!(!facade.has_member("late"));
        assert!(matches!(
            facade.set("late", 2).unwrap_err(),
            CaptureError::UnknownMember { .. }
        ));
    }

    #[test]
    fn pause_names_reserved_only_for_capture() {
        for name in QUEUE_MANAGEMENT {
            assert!(Pausable::is_reserved(name));
            assert!(Batched::is_reserved(name));
        }
        for name in PAUSE_CONTROL {
            assert!(Pausable::is_reserved(name));
            assert!(!Batched::is_reserved(name));
        }
        assert!(!Pausable::is_reserved("x"));
    }
}
