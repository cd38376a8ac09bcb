//! 任务执行设施接收的两种工作单元。
//!
//! - [`Runnable`]：无返回值、即发即弃；失败只能表现为 panic；
//! - [`Callable`]：产生 [`TaskResult<T>`]，失败既可以是 `Err(TaskError)` 也可以是 panic。
//!
//! 二者都以 `FnOnce` 装箱，保证“恰好执行一次”由类型系统约束。

use core::fmt;

use crate::error::TaskResult;

/// 无返回值的工作单元。
pub struct Runnable {
    operation: Box<dyn FnOnce() + Send + 'static>,
}

impl Runnable {
    /// 封装任意一次性闭包。
    pub fn new<F>(operation: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            operation: Box::new(operation),
        }
    }

    /// 在当前线程执行任务，消费自身。
    pub fn run(self) {
        (self.operation)()
    }
}

impl fmt::Debug for Runnable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runnable").finish_non_exhaustive()
    }
}

/// 产生结果的工作单元。
///
/// # 契约说明（What）
/// - `call` 消费自身并返回闭包给出的 [`TaskResult<T>`]，不做任何转换；
/// - [`Callable::from_runnable`] 把 [`Runnable`] 与预先给定的结果值组合，
///   对应“提交 runnable 并附带结果”的入口。
pub struct Callable<T> {
    operation: Box<dyn FnOnce() -> TaskResult<T> + Send + 'static>,
}

impl<T> Callable<T> {
    /// 封装返回 [`TaskResult<T>`] 的一次性闭包。
    pub fn new<F>(operation: F) -> Self
    where
        F: FnOnce() -> TaskResult<T> + Send + 'static,
    {
        Self {
            operation: Box::new(operation),
        }
    }

    /// 在当前线程执行任务，消费自身。
    pub fn call(self) -> TaskResult<T> {
        (self.operation)()
    }
}

impl<T> Callable<T>
where
    T: Send + 'static,
{
    /// 运行 `runnable` 后返回 `result`。
    pub fn from_runnable(runnable: Runnable, result: T) -> Self {
        Callable::new(move || {
            runnable.run();
            Ok(result)
        })
    }
}

impl<T> fmt::Debug for Callable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable").finish_non_exhaustive()
    }
}
