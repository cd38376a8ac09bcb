//! 为任务执行设施增加上下文传播能力的装饰器。
//!
//! # 模块定位（Why）
//! - 调用方不希望在每个提交点手动包装任务；装饰器在设施边界统一完成“捕获 → 包装 → 转发”；
//! - 同一个 [`ContextExecutor`] 类型按委托设施的能力集合分别实现 [`Executor`](crate::runtime::Executor)、
//!   [`ExecutorService`](crate::runtime::ExecutorService) 与 [`TaskExecutor`](crate::runtime::TaskExecutor)，
//!   因此装饰后的对象可以替换原设施出现在任何位置。
//!
//! # 执行逻辑（How）
//! - 动态捕获：每次提交时在调用线程上读取协调器；
//! - 固定捕获：构造时读取一次（或使用显式给定的值），之后每个任务共享该快照；
//! - 批量操作只捕获一次，批内每个任务得到同一快照的克隆；
//! - 装饰器从不直接运行任务，结果、错误与句柄全部来自委托设施。
//!
//! # 契约说明（What）
//! - 生命周期方法（`shutdown`、`await_termination` 等）原样转发，不涉及上下文；
//! - 构造本身不会失败；经由 [`DecoratorBuilder`] 分步装配时，缺失参数返回
//!   [`PropagationError::MissingArgument`](crate::PropagationError::MissingArgument)。

mod builder;
mod executor;
mod service;
mod spawn;

pub use builder::DecoratorBuilder;

use std::{borrow::Cow, fmt};

use tracing::debug;

use crate::{
    config::CaptureMode, coordinator::ContextCoordinator, preserving::ContextPreserving,
};

const ANONYMOUS: &str = "anonymous";

/// 上下文的捕获策略与固定快照。
#[derive(Clone)]
pub(crate) enum Capture<C> {
    Dynamic,
    Fixed(Option<C>),
}

impl<C> Capture<C>
where
    C: Clone,
{
    fn snapshot<K>(&self, coordinator: &K) -> Option<C>
    where
        K: ContextCoordinator<Context = C> + ?Sized,
    {
        match self {
            Capture::Dynamic => coordinator.get(),
            Capture::Fixed(context) => context.clone(),
        }
    }

    fn mode(&self) -> CaptureMode {
        match self {
            Capture::Dynamic => CaptureMode::Dynamic,
            Capture::Fixed(_) => CaptureMode::Fixed,
        }
    }
}

/// `ContextExecutor` 把任意任务执行设施包装为上下文感知的同类设施。
///
/// # 教案式注释
/// - **意图 (Why)**：任务被搬到工作线程后，提交线程上的环境上下文随之丢失；
///   装饰器在转发前为每个任务附加快照，使任务在工作线程上看到提交时的上下文；
/// - **执行逻辑 (How)**：`snapshot` 按捕获策略给出快照，`preserve` 把任务包装为
///   [`ContextPreserving`]，再以委托设施的同名方法提交；
/// - **契约 (What)**：
///   - **输入**：委托设施 `E`、协调器 `K`、捕获策略；
///   - **前置条件**：`K` 可克隆，且其存储在工作线程上同样可用；
///   - **后置条件**：每个经由本装饰器提交的任务运行结束后，工作线程的上下文与运行前相同；
/// - **风险与权衡 (Trade-offs)**：固定捕获的快照在装饰器生命周期内不会刷新，
///   适用于“一个线程池服务一个租户”之类的场景。
#[derive(Clone)]
pub struct ContextExecutor<E, K>
where
    K: ContextCoordinator,
{
    delegate: E,
    coordinator: K,
    capture: Capture<K::Context>,
    name: Cow<'static, str>,
}

impl<E, K> ContextExecutor<E, K>
where
    K: ContextCoordinator,
{
    /// 每次提交时捕获调用线程的上下文。
    pub fn dynamic(delegate: E, coordinator: K) -> Self {
        Self::assemble(delegate, coordinator, Capture::Dynamic, None)
    }

    /// 在构造线程上捕获一次上下文，此后所有任务共享该快照。
    pub fn fixed(delegate: E, coordinator: K) -> Self {
        let context = coordinator.get();
        Self::assemble(delegate, coordinator, Capture::Fixed(context), None)
    }

    /// 使用显式给定的快照，不读取协调器。
    pub fn fixed_with(delegate: E, coordinator: K, context: Option<K::Context>) -> Self {
        Self::assemble(delegate, coordinator, Capture::Fixed(context), None)
    }

    /// 分步装配装饰器。
    pub fn builder() -> DecoratorBuilder<E, K> {
        DecoratorBuilder::default()
    }

    pub(crate) fn assemble(
        delegate: E,
        coordinator: K,
        capture: Capture<K::Context>,
        name: Option<Cow<'static, str>>,
    ) -> Self {
        let name = name.unwrap_or(Cow::Borrowed(ANONYMOUS));
        debug!(
            decorator = %name,
            mode = capture.mode().as_str(),
            "context decorator constructed"
        );
        Self {
            delegate,
            coordinator,
            capture,
            name,
        }
    }

    /// 当前的捕获策略。
    pub fn capture_mode(&self) -> CaptureMode {
        self.capture.mode()
    }

    /// 日志中使用的装饰器名称。
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn delegate(&self) -> &E {
        &self.delegate
    }

    pub fn coordinator(&self) -> &K {
        &self.coordinator
    }

    /// 拆除装饰器，取回委托设施。
    pub fn into_inner(self) -> E {
        self.delegate
    }

    /// 按捕获策略给出本次提交使用的快照。
    pub(crate) fn snapshot(&self) -> Option<K::Context> {
        self.capture.snapshot(&self.coordinator)
    }
}

impl<E, K> ContextExecutor<E, K>
where
    K: ContextCoordinator + Clone,
{
    pub(crate) fn preserve<T>(&self, task: T) -> ContextPreserving<T, K> {
        self.preserve_with(task, self.snapshot())
    }

    pub(crate) fn preserve_with<T>(
        &self,
        task: T,
        captured: Option<K::Context>,
    ) -> ContextPreserving<T, K> {
        ContextPreserving::with_context(task, self.coordinator.clone(), captured)
    }
}

impl<E, K> fmt::Debug for ContextExecutor<E, K>
where
    E: fmt::Debug,
    K: ContextCoordinator,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextExecutor")
            .field("name", &self.name)
            .field("mode", &self.capture.mode())
            .field("delegate", &self.delegate)
            .finish_non_exhaustive()
    }
}
