//! 一次性完成信号：`Promise` 写入结果，`TaskFuture` 阻塞等待。
//!
//! # 模块定位（Why）
//! - 同步执行设施的 `submit` 需要把“稍后才会产生的结果”交还调用方；
//!   线程池只接收 [`Runnable`](super::task::Runnable)，因此结果通过共享槽位回传；
//! - 槽位由 `parking_lot::Mutex` 与 `Condvar` 守护，等待方不自旋。
//!
//! # 使用契约（What）
//! - 每个槽位只会从 `Pending` 迁移一次：完成、取消或设施终止三者择一；
//! - `Promise` 被丢弃而未写入结果时，等待方收到 [`TaskError::ExecutorTerminated`]。

use std::{
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    time::{Duration, Instant},
};

use parking_lot::{Condvar, Mutex};

use super::task::Callable;
use crate::error::{TaskError, TaskResult};

enum Slot<T> {
    Pending,
    Ready(TaskResult<T>),
    Taken,
}

struct Shared<T> {
    slot: Mutex<Slot<T>>,
    cancelled: Mutex<bool>,
    ready: Condvar,
}

impl<T> Shared<T> {
    /// 仅当槽位仍处于 `Pending` 时写入，返回是否写入成功。
    fn fulfil(&self, outcome: TaskResult<T>) -> bool {
        let mut slot = self.slot.lock();
        if !matches!(*slot, Slot::Pending) {
            return false;
        }
        *slot = Slot::Ready(outcome);
        self.ready.notify_all();
        true
    }
}

/// 等待方持有的结果句柄。
///
/// # 契约说明（What）
/// - `is_done`：结果（含取消与终止）已经落定；
/// - `cancel`：仅对尚未完成的任务生效，成功后任务不会再被执行，`get` 返回 [`TaskError::Cancelled`]；
/// - `get` 消费句柄并阻塞到结果落定。
pub struct TaskFuture<T> {
    shared: Arc<Shared<T>>,
}

impl<T> TaskFuture<T> {
    /// 创建一对相互关联的写入端与等待端。
    pub fn pair() -> (Promise<T>, TaskFuture<T>) {
        let shared = Arc::new(Shared {
            slot: Mutex::new(Slot::Pending),
            cancelled: Mutex::new(false),
            ready: Condvar::new(),
        });
        (
            Promise {
                shared: Some(Arc::clone(&shared)),
            },
            TaskFuture { shared },
        )
    }

    /// 构造一个已经完成的句柄。
    pub fn ready(outcome: TaskResult<T>) -> Self {
        let (promise, future) = Self::pair();
        promise.complete(outcome);
        future
    }

    /// 结果是否已经落定。
    pub fn is_done(&self) -> bool {
        !matches!(*self.shared.slot.lock(), Slot::Pending)
    }

    /// 任务是否在完成前被取消。
    pub fn is_cancelled(&self) -> bool {
        *self.shared.cancelled.lock()
    }

    /// 请求取消尚未完成的任务，返回本次调用是否生效。
    pub fn cancel(&self) -> bool {
        let mut cancelled = self.shared.cancelled.lock();
        let applied = self.shared.fulfil(Err(TaskError::Cancelled));
        if applied {
            *cancelled = true;
        }
        applied
    }

    /// 阻塞直到结果落定。
    pub fn wait(&self) {
        let mut slot = self.shared.slot.lock();
        while matches!(*slot, Slot::Pending) {
            self.shared.ready.wait(&mut slot);
        }
    }

    /// 最多阻塞 `timeout`，返回结果是否已经落定。
    ///
    /// 截止时刻超出 `Instant` 的表示范围（如 `Duration::MAX`）时等价于 [`wait`](Self::wait)。
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            self.wait();
            return true;
        };
        let mut slot = self.shared.slot.lock();
        while matches!(*slot, Slot::Pending) {
            if self.shared.ready.wait_until(&mut slot, deadline).timed_out() {
                return !matches!(*slot, Slot::Pending);
            }
        }
        true
    }

    /// 阻塞直到结果落定并取出结果。
    pub fn get(self) -> TaskResult<T> {
        self.wait();
        let mut slot = self.shared.slot.lock();
        match std::mem::replace(&mut *slot, Slot::Taken) {
            Slot::Ready(outcome) => outcome,
            Slot::Pending | Slot::Taken => Err(TaskError::ExecutorTerminated),
        }
    }
}

impl<T> fmt::Debug for TaskFuture<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskFuture")
            .field("done", &self.is_done())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// 执行侧持有的写入端。
pub struct Promise<T> {
    shared: Option<Arc<Shared<T>>>,
}

impl<T> Promise<T> {
    /// 等待方是否已经取消。
    pub fn is_cancelled(&self) -> bool {
        self.shared
            .as_ref()
            .is_some_and(|shared| *shared.cancelled.lock())
    }

    /// 写入结果；若等待方已取消则丢弃结果并返回 `false`。
    pub fn complete(mut self, outcome: TaskResult<T>) -> bool {
        self.shared
            .take()
            .is_some_and(|shared| shared.fulfil(outcome))
    }

    /// 在当前线程执行 `task` 并写入其结果。
    ///
    /// - 已取消的任务直接丢弃，不会执行；
    /// - 任务 panic 时写入 [`TaskError::Panicked`]，panic 不会继续向执行线程传播。
    pub fn run(self, task: Callable<T>) {
        if self.is_cancelled() {
            return;
        }
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| task.call()))
            .unwrap_or_else(|payload| Err(TaskError::from_panic(payload)));
        self.complete(outcome);
    }
}

impl<T> Drop for Promise<T> {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.take() {
            shared.fulfil(Err(TaskError::ExecutorTerminated));
        }
    }
}

impl<T> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}
