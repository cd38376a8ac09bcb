//! 异步任务执行设施契约。
//!
//! # 模块定位（Why）
//! - 同步线程池之外，另一类常见设施是“接收 `Future` 并在某个运行时上驱动它”；
//!   环境上下文在这里同样会在跨线程调度时丢失；
//! - 本模块只定义对象安全的提交入口与结果句柄，具体运行时由宿主在独立 crate 中提供。
//!
//! # 使用契约（What）
//! - [`TaskExecutor::spawn_dyn`] 是唯一必选方法，输出以 `Box<dyn Any + Send>` 擦除类型；
//! - [`TaskExecutor::spawn`] 默认实现负责擦除与还原类型，调用方通常只使用它。

use core::{any::Any, future::Future};
use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::{TaskError, TaskResult},
    future::BoxFuture,
};

/// 类型擦除后的任务输出。
pub type ErasedOutput = Box<dyn Any + Send>;

/// 接收 `Future` 的执行设施。
///
/// 设施只需实现类型擦除的 [`spawn_dyn`](Self::spawn_dyn)；上下文装饰器也只覆写这一个入口，
/// 因此经 [`spawn`](Self::spawn) 派发的 future 无论输出类型如何都会被包装。
/// 输出在 `join` 时按原类型取回，类型不符时得到 `TaskError::Failed`。
pub trait TaskExecutor: Send + Sync + 'static {
    fn spawn_dyn(
        &self,
        fut: BoxFuture<'static, TaskResult<ErasedOutput>>,
    ) -> JoinHandle<ErasedOutput>;

    /// 派发 `fut`，返回类型化句柄。
    fn spawn<F>(&self, fut: F) -> JoinHandle<F::Output>
    where
        Self: Sized,
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let erased = async move {
            let value = fut.await;
            Ok::<ErasedOutput, TaskError>(Box::new(value))
        };
        let handle = self.spawn_dyn(Box::pin(erased));
        handle.map(|result| {
            result.and_then(|boxed| {
                boxed
                    .downcast::<F::Output>()
                    .map(|value| *value)
                    .map_err(|_| TaskError::failed("join handle type mismatch"))
            })
        })
    }
}

impl<E> TaskExecutor for Arc<E>
where
    E: TaskExecutor + ?Sized,
{
    fn spawn_dyn(
        &self,
        fut: BoxFuture<'static, TaskResult<ErasedOutput>>,
    ) -> JoinHandle<ErasedOutput> {
        (**self).spawn_dyn(fut)
    }
}

/// 异步设施为每个已派发任务返回的控制端。
///
/// 上下文装饰器只转发句柄，从不自行实现；控制语义（能否真正中止、标识格式）完全由设施决定。
#[async_trait]
pub trait TaskHandle: Send + Sync {
    type Output: Send + 'static;

    /// 请求取消；设施可以忽略该请求，已在运行的任务不保证停止。
    fn cancel(&self);

    fn is_finished(&self) -> bool;

    /// 是否收到过取消请求。
    fn is_cancelled(&self) -> bool;

    /// 设施分配的标识，仅用于日志与断言。
    fn id(&self) -> Option<&str>;

    /// 消费句柄，等待任务输出。
    async fn join(self: Box<Self>) -> TaskResult<Self::Output>;
}

/// [`TaskExecutor::spawn`] 返回的类型化句柄。
///
/// 装饰后的设施返回的句柄就是委托设施给出的那一个，经 [`map`](Self::map) 还原输出类型后交给调用方。
pub struct JoinHandle<T> {
    inner: Box<dyn TaskHandle<Output = T>>,
}

impl<T: Send + 'static> JoinHandle<T> {
    pub fn from_task_handle(inner: Box<dyn TaskHandle<Output = T>>) -> Self {
        Self { inner }
    }

    pub fn cancel(&self) {
        self.inner.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    pub fn id(&self) -> Option<&str> {
        self.inner.id()
    }

    /// 等待任务结束；失败原因与 panic 信息来自设施。
    pub async fn join(self) -> TaskResult<T> {
        self.inner.join().await
    }

    /// 在 `join` 时以 `convert` 转换输出，控制面保持不变。
    pub fn map<U, F>(self, convert: F) -> JoinHandle<U>
    where
        U: Send + 'static,
        F: FnOnce(TaskResult<T>) -> TaskResult<U> + Send + Sync + 'static,
    {
        JoinHandle::from_task_handle(Box::new(Converted {
            source: self.inner,
            convert,
        }))
    }
}

impl<T: Send + 'static> core::fmt::Debug for JoinHandle<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("JoinHandle")
            .field("id", &self.inner.id())
            .field("finished", &self.inner.is_finished())
            .finish()
    }
}

/// 输出转换层：控制调用透传给 `source`，`join` 的结果经 `convert` 处理。
struct Converted<T, F> {
    source: Box<dyn TaskHandle<Output = T>>,
    convert: F,
}

#[async_trait]
impl<T, U, F> TaskHandle for Converted<T, F>
where
    T: Send + 'static,
    U: Send + 'static,
    F: FnOnce(TaskResult<T>) -> TaskResult<U> + Send + Sync + 'static,
{
    type Output = U;

    fn cancel(&self) {
        self.source.cancel();
    }

    fn is_finished(&self) -> bool {
        self.source.is_finished()
    }

    fn is_cancelled(&self) -> bool {
        self.source.is_cancelled()
    }

    fn id(&self) -> Option<&str> {
        self.source.id()
    }

    async fn join(self: Box<Self>) -> TaskResult<U> {
        let Converted { source, convert } = *self;
        convert(source.join().await)
    }
}
