//! 异步任务的上下文保持。
//!
//! # 设计背景（Why）
//! - 一个 `Future` 可能在多个工作线程上被轮询，每次 `poll` 都相当于一次“在别的线程上运行任务”；
//! - 因此安装与恢复以单次 `poll` 为粒度，而不是覆盖整个任务生命周期。
//!
//! # 契约说明（What）
//! - 每次 `poll` 前安装快照，`poll` 返回（或 panic 展开）时恢复工作线程原值；
//! - 两次 `poll` 之间工作线程上的上下文与本任务无关。

use core::{
    fmt,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::{coordinator::ContextCoordinator, scope::ContextScope};

/// 可跨线程发送的装箱 `Future`。
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// 每次轮询都在上下文快照下运行的 `Future` 包装。
pub struct ContextPreservingFuture<F, K>
where
    F: ?Sized,
    K: ContextCoordinator,
{
    coordinator: K,
    captured: Option<K::Context>,
    future: Pin<Box<F>>,
}

impl<F, K> ContextPreservingFuture<F, K>
where
    F: Future,
    K: ContextCoordinator,
{
    /// 包装 `future`，快照取自调用线程的当前上下文。
    pub fn wrap(future: F, coordinator: K) -> Self {
        let captured = coordinator.get();
        Self::with_context(Box::pin(future), coordinator, captured)
    }
}

impl<F, K> ContextPreservingFuture<F, K>
where
    F: Future + ?Sized,
    K: ContextCoordinator,
{
    /// 包装已经固定在堆上的 `future`，使用给定快照。
    pub fn with_context(future: Pin<Box<F>>, coordinator: K, context: Option<K::Context>) -> Self {
        Self {
            coordinator,
            captured: context,
            future,
        }
    }

    /// 包装对象携带的上下文快照。
    pub fn captured(&self) -> Option<&K::Context> {
        self.captured.as_ref()
    }
}

// 内部 future 已经装箱固定，外层移动不影响其地址。
impl<F, K> Unpin for ContextPreservingFuture<F, K>
where
    F: ?Sized,
    K: ContextCoordinator,
{
}

impl<F, K> Future for ContextPreservingFuture<F, K>
where
    F: Future + ?Sized,
    K: ContextCoordinator,
{
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let _scope = ContextScope::enter(&this.coordinator, this.captured.clone());
        this.future.as_mut().poll(cx)
    }
}

impl<F, K> fmt::Debug for ContextPreservingFuture<F, K>
where
    F: ?Sized,
    K: ContextCoordinator,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextPreservingFuture")
            .field("has_context", &self.captured.is_some())
            .finish_non_exhaustive()
    }
}
