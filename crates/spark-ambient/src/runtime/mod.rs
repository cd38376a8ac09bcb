//! 任务执行设施契约。
//!
//! 上下文装饰器包装的对象都通过本模块的 trait 描述：同步的 [`Executor`] / [`ExecutorService`]
//! 与异步的 [`TaskExecutor`]。本 crate 不提供任何线程池实现。

mod completion;
mod executor;
mod spawn;
mod task;

pub use completion::{Promise, TaskFuture};
pub use executor::{Executor, ExecutorService};
pub use spawn::{ErasedOutput, JoinHandle, TaskExecutor, TaskHandle};
pub use task::{Callable, Runnable};

pub use crate::error::TaskResult;
