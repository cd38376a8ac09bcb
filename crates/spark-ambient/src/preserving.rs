//! 携带上下文快照的任务包装。
//!
//! # 模块定位（Why）
//! - 任务在提交线程上被包装：此刻读取（或由调用方显式给出）环境上下文并保存在包装对象中；
//! - 任务在执行线程上运行：先安装快照，运行原任务，再恢复执行线程原有的值；
//! - 恢复依赖 [`ContextScope`] 的析构，因此在正常返回、返回错误与 panic 展开三条路径上都会发生。
//!
//! # 使用契约（What）
//! - 包装对象只运行一次（按值消费），运行结果与 panic 原样向外传递；
//! - 快照可以是 `None`：此时任务运行期间执行线程的上下文被清空。

use core::fmt;

use crate::{
    coordinator::ContextCoordinator,
    error::{PropagationError, TaskResult},
    runtime::{Callable, Runnable},
    scope::ContextScope,
};

/// `ContextPreserving` 把任务与其上下文快照绑定在一起。
///
/// # 逻辑解析（How）
/// 1. [`wrap`](Self::wrap) 在调用线程读取 `coordinator.get()` 作为快照；
///    [`with_context`](Self::with_context) 则直接使用给定值，不读取协调器；
/// 2. [`execute_with`](Self::execute_with) 在执行线程上进入 [`ContextScope`] 后调用原任务；
/// 3. 作用域析构时写回执行线程此前的值。
///
/// # 契约说明（What）
/// - **前置条件**：`coordinator` 描述的存储在执行线程上同样可用；
/// - **后置条件**：运行结束后执行线程的环境值与运行前相同；任务内部对协调器的写入不会泄漏。
pub struct ContextPreserving<T, K>
where
    K: ContextCoordinator,
{
    task: T,
    coordinator: K,
    captured: Option<K::Context>,
}

impl<T, K> ContextPreserving<T, K>
where
    K: ContextCoordinator,
{
    /// 包装 `task`，快照取自调用线程的当前上下文。
    pub fn wrap(task: T, coordinator: K) -> Self {
        let captured = coordinator.get();
        Self {
            task,
            coordinator,
            captured,
        }
    }

    /// 包装 `task`，使用调用方给定的上下文，不读取协调器。
    pub fn with_context(task: T, coordinator: K, context: Option<K::Context>) -> Self {
        Self {
            task,
            coordinator,
            captured: context,
        }
    }

    /// 分步装配，缺失任务或协调器时返回 [`PropagationError::MissingArgument`]。
    pub fn builder() -> ContextPreservingBuilder<T, K> {
        ContextPreservingBuilder::default()
    }

    /// 包装对象携带的上下文快照。
    pub fn captured(&self) -> Option<&K::Context> {
        self.captured.as_ref()
    }

    /// 在快照生效期间以 `operation` 消费原任务。
    pub fn execute_with<R>(self, operation: impl FnOnce(T) -> R) -> R {
        let Self {
            task,
            coordinator,
            captured,
        } = self;
        let _scope = ContextScope::enter(&coordinator, captured);
        operation(task)
    }
}

impl<K> ContextPreserving<Runnable, K>
where
    K: ContextCoordinator,
{
    /// 在快照生效期间运行任务。
    pub fn run(self) {
        self.execute_with(Runnable::run)
    }

    /// 转换为普通 [`Runnable`]，以便交给任意执行设施。
    pub fn into_runnable(self) -> Runnable
    where
        K: 'static,
    {
        Runnable::new(move || self.run())
    }
}

impl<V, K> ContextPreserving<Callable<V>, K>
where
    K: ContextCoordinator,
{
    /// 在快照生效期间调用任务并返回其结果。
    pub fn call(self) -> TaskResult<V> {
        self.execute_with(Callable::call)
    }

    /// 转换为普通 [`Callable`]，以便交给任意执行设施。
    pub fn into_callable(self) -> Callable<V>
    where
        V: Send + 'static,
        K: 'static,
    {
        Callable::new(move || self.call())
    }
}

impl<K> From<ContextPreserving<Runnable, K>> for Runnable
where
    K: ContextCoordinator + 'static,
{
    fn from(value: ContextPreserving<Runnable, K>) -> Self {
        value.into_runnable()
    }
}

impl<V, K> From<ContextPreserving<Callable<V>, K>> for Callable<V>
where
    V: Send + 'static,
    K: ContextCoordinator + 'static,
{
    fn from(value: ContextPreserving<Callable<V>, K>) -> Self {
        value.into_callable()
    }
}

impl<T, K> fmt::Debug for ContextPreserving<T, K>
where
    T: fmt::Debug,
    K: ContextCoordinator,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextPreserving")
            .field("task", &self.task)
            .field("has_context", &self.captured.is_some())
            .finish_non_exhaustive()
    }
}

/// [`ContextPreserving`] 的分步构造器。
///
/// 未调用 [`context`](Self::context) 时，`build` 在调用线程上读取协调器。
pub struct ContextPreservingBuilder<T, K>
where
    K: ContextCoordinator,
{
    task: Option<T>,
    coordinator: Option<K>,
    context: Option<Option<K::Context>>,
}

impl<T, K> Default for ContextPreservingBuilder<T, K>
where
    K: ContextCoordinator,
{
    fn default() -> Self {
        Self {
            task: None,
            coordinator: None,
            context: None,
        }
    }
}

impl<T, K> ContextPreservingBuilder<T, K>
where
    K: ContextCoordinator,
{
    pub fn task(mut self, task: T) -> Self {
        self.task = Some(task);
        self
    }

    pub fn coordinator(mut self, coordinator: K) -> Self {
        self.coordinator = Some(coordinator);
        self
    }

    /// 显式给定快照；`None` 表示运行期间清空上下文。
    pub fn context(mut self, context: Option<K::Context>) -> Self {
        self.context = Some(context);
        self
    }

    /// 校验并构造包装对象。
    pub fn build(self) -> crate::Result<ContextPreserving<T, K>> {
        let task = self.task.ok_or(PropagationError::missing("task"))?;
        let coordinator = self
            .coordinator
            .ok_or(PropagationError::missing("coordinator"))?;
        Ok(match self.context {
            Some(context) => ContextPreserving::with_context(task, coordinator, context),
            None => ContextPreserving::wrap(task, coordinator),
        })
    }
}
