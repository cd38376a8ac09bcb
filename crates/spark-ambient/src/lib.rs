#![deny(unsafe_code)]
#![doc = "spark-ambient: 跨执行器线程边界传播环境上下文（ambient context）的装饰器契约。"]
#![doc = ""]
#![doc = "== 问题域 =="]
#![doc = "线程池等任务执行设施会丢失提交线程上的环境上下文（租户、追踪标签等），因为真正运行任务的工作线程并不是提交任务的线程。"]
#![doc = "本 Crate 在任务提交点捕获上下文，在执行线程上运行任务前安装，并在任务结束后（无论成功、返回错误还是 panic）无条件恢复执行线程原有的值。"]
#![doc = ""]
#![doc = "== 边界 =="]
#![doc = "1. 执行设施本身（线程数、排队、关停语义）由调用方提供，通过 [`runtime::Executor`]、[`runtime::ExecutorService`]、[`runtime::TaskExecutor`] 契约接入。"]
#![doc = "2. 上下文存储机制同样由调用方提供，核心仅通过 [`ContextCoordinator`] 的 `get`/`set` 读写。"]
#![doc = "3. 库代码从不创建线程，也不引入新的调度、重试或跨任务协调策略。"]

//! # 快速上手
//!
//! ```
//! use spark_ambient::{ContextCoordinator, ContextPreserving, runtime::Runnable};
//!
//! spark_ambient::thread_local_coordinator!(Tenant: String);
//!
//! Tenant.set(Some("tenant-42".to_owned()));
//! let task = ContextPreserving::wrap(
//!     Runnable::new(|| assert_eq!(Tenant.get().as_deref(), Some("tenant-42"))),
//!     Tenant,
//! );
//!
//! // 模拟工作线程：其环境值与提交线程不同。
//! std::thread::spawn(move || {
//!     Tenant.set(Some("worker".to_owned()));
//!     task.run();
//!     assert_eq!(Tenant.get().as_deref(), Some("worker"));
//! })
//! .join()
//! .unwrap();
//! ```

mod macros;

pub mod config;
pub mod coordinator;
pub mod decorator;
pub mod error;
pub mod future;
pub mod preserving;
pub mod runtime;
pub mod scope;

pub use async_trait::async_trait;

pub use config::{CaptureMode, PropagationOptions};
pub use coordinator::ContextCoordinator;
pub use decorator::{ContextExecutor, DecoratorBuilder};
pub use error::{ExecutorError, PropagationError, TaskError};
pub use future::{BoxFuture, ContextPreservingFuture};
pub use preserving::{ContextPreserving, ContextPreservingBuilder};
pub use runtime::{
    Callable, Executor, ExecutorService, JoinHandle, Promise, Runnable, TaskExecutor, TaskFuture,
    TaskHandle, TaskResult,
};
pub use scope::{ContextScope, with_context};

/// `Result` 别名，默认错误类型为 [`PropagationError`]，与构造器的失败语义对齐。
pub type Result<T, E = PropagationError> = core::result::Result<T, E>;
