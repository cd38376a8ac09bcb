use std::borrow::Cow;

use super::{Capture, ContextExecutor};
use crate::{
    config::{CaptureMode, PropagationOptions},
    coordinator::ContextCoordinator,
    error::PropagationError,
};

/// [`ContextExecutor`] 的分步构造器。
///
/// # 契约说明（What）
/// - `delegate` 与 `coordinator` 必填，缺失时 `build` 依次报告 `"delegate"`、`"coordinator"`；
/// - 捕获策略的优先级：[`fixed_context`](Self::fixed_context) 给出的显式快照 >
///   `options.capture == Fixed`（在 `build` 的调用线程上读取一次）> 动态捕获。
pub struct DecoratorBuilder<E, K>
where
    K: ContextCoordinator,
{
    delegate: Option<E>,
    coordinator: Option<K>,
    options: PropagationOptions,
    fixed_context: Option<Option<K::Context>>,
}

impl<E, K> Default for DecoratorBuilder<E, K>
where
    K: ContextCoordinator,
{
    fn default() -> Self {
        Self {
            delegate: None,
            coordinator: None,
            options: PropagationOptions::default(),
            fixed_context: None,
        }
    }
}

impl<E, K> DecoratorBuilder<E, K>
where
    K: ContextCoordinator,
{
    pub fn delegate(mut self, delegate: E) -> Self {
        self.delegate = Some(delegate);
        self
    }

    pub fn coordinator(mut self, coordinator: K) -> Self {
        self.coordinator = Some(coordinator);
        self
    }

    /// 应用声明式配置，覆盖此前设置的名称与捕获时机。
    pub fn options(mut self, options: PropagationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.options.name = Some(name.into());
        self
    }

    pub fn capture(mut self, capture: CaptureMode) -> Self {
        self.options.capture = capture;
        self
    }

    /// 以显式快照固定捕获，`build` 时不再读取协调器。
    pub fn fixed_context(mut self, context: Option<K::Context>) -> Self {
        self.fixed_context = Some(context);
        self
    }

    /// 校验参数并构造装饰器。
    pub fn build(self) -> crate::Result<ContextExecutor<E, K>> {
        let delegate = self
            .delegate
            .ok_or(PropagationError::missing("delegate"))?;
        let coordinator = self
            .coordinator
            .ok_or(PropagationError::missing("coordinator"))?;
        let capture = match (self.fixed_context, self.options.capture) {
            (Some(context), _) => Capture::Fixed(context),
            (None, CaptureMode::Fixed) => Capture::Fixed(coordinator.get()),
            (None, CaptureMode::Dynamic) => Capture::Dynamic,
        };
        Ok(ContextExecutor::assemble(
            delegate,
            coordinator,
            capture,
            self.options.name,
        ))
    }
}
