//! 命令队列（CommandQueue）
//!
//! 插入顺序即调用顺序，也即回放顺序。回放不清空队列；
//! 中途失败时已应用的命令保持已应用，队列保持原样，由调用方决定重试或清空。
//!
use crate::command::{Command, CommandRecord};
use crate::error::{CaptureError, CaptureResult};
use crate::target::Target;
use crate::value::Value;

pub struct CommandQueue<T> {
    commands: Vec<Command<T>>,
}

impl<T> Default for CommandQueue<T> {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
        }
    }
}

impl<T> CommandQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command<T>) {
        self.commands.push(command);
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn records(&self) -> Vec<CommandRecord> {
        self.commands.iter().map(Command::record).collect()
    }
}

impl<T: Target> CommandQueue<T> {
    /// 按 FIFO 顺序依次应用全部命令，返回各命令结果
    pub fn apply_all(&self) -> CaptureResult<Vec<Value>> {
        let mut results = Vec::with_capacity(self.commands.len());
        for (position, command) in self.commands.iter().enumerate() {
            match command.apply() {
                Ok(v) => results.push(v),
                Err(source) => {
                    return Err(CaptureError::Replay {
                        position,
                        member: command.member().to_string(),
                        source: Box::new(source),
                    });
                }
            }
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::object::DynObject;
    use serde_json::json;
    use std::sync::{Arc, RwLock};

    fn log_owner() -> Arc<RwLock<DynObject>> {
        Arc::new(RwLock::new(
            DynObject::new()
                .with_value("log", json!([]))
                .with_readonly("frozen", true)
                .with_method("push", |this, args| {
                    let item: String = args.decode("push", 0)?;
                    let mut log: Vec<String> = serde_json::from_value(this.get("log")?)?;
                    log.push(item);
                    this.set("log", json!(log))
                }),
        ))
    }

    #[test]
    fn apply_all_preserves_insertion_order() {
        let o = log_owner();
        let mut q = CommandQueue::new();
        for s in ["a", "b", "c"] {
            q.push(Command::call(Arc::downgrade(&o), "push", args![s]));
        }

        q.apply_all().unwrap();
        assert_eq!(o.read().unwrap().value("log"), Some(&json!(["a", "b", "c"])));
        // 回放后队列保留
        assert_eq!(q.len(), 3);
    }

    #[test]
    fn failure_stops_replay_and_keeps_earlier_effects() {
        let o = log_owner();
        let mut q = CommandQueue::new();
        q.push(Command::call(Arc::downgrade(&o), "push", args!["a"]));
        q.push(Command::set(Arc::downgrade(&o), "frozen", json!(false)));
        q.push(Command::call(Arc::downgrade(&o), "push", args!["b"]));

        let err = q.apply_all().unwrap_err();
        match &err {
            CaptureError::Replay {
                position, member, ..
            } => {
                assert_eq!(*position, 1);
                assert_eq!(member, "frozen");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(err.root_cause(), CaptureError::ReadOnly { .. }));
        assert_eq!(o.read().unwrap().value("log"), Some(&json!(["a"])));
        assert_eq!(q.len(), 3);
    }

    #[test]
    fn clear_is_idempotent() {
        let o = log_owner();
        let mut q: CommandQueue<DynObject> = CommandQueue::new();
        q.clear();
        assert!(q.is_empty());

        q.push(Command::call(Arc::downgrade(&o), "push", args!["a"]));
        q.clear();
        q.clear();
        assert!(q.apply_all().unwrap().is_empty());
        assert_eq!(o.read().unwrap().value("log"), Some(&json!([])));
    }
}
