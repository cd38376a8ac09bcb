//! 作用域化的上下文安装与恢复。
//!
//! # 模块定位（Why）
//! - “安装 → 运行 → 恢复”是一次资源获取与保证释放：安装即获取，恢复即释放；
//! - 释放必须在每一条退出路径上发生，包括委托返回错误与 panic 展开，因此以 `Drop` 守卫实现，
//!   而不是在调用点手写成对的 `set`。
//!
//! # 使用契约（What）
//! - [`ContextScope::enter`] 读取旧值并安装新值；守卫析构时把旧值写回；
//! - 守卫不实现 `Send`：旧值保存在执行线程的栈帧上，只能在同一线程恢复；
//! - 嵌套作用域按后进先出顺序恢复。

use core::{fmt, marker::PhantomData};

use tracing::trace;

use crate::coordinator::ContextCoordinator;

/// `ContextScope` 是一次上下文安装的守卫。
///
/// # 逻辑解析（How）
/// 1. `enter` 通过 [`ContextCoordinator::replace`] 读取旧值并写入新值；
/// 2. 守卫持有旧值直到析构；
/// 3. `Drop` 无条件调用 `set(旧值)`，在正常返回与展开路径上都会执行。
///
/// # 契约说明（What）
/// - **前置条件**：`coordinator` 的生命周期覆盖守卫；
/// - **后置条件**：守卫析构后，协调器在本线程上的值等于 `enter` 之前的值。
#[must_use = "守卫一旦被丢弃，上下文会立即恢复"]
pub struct ContextScope<'a, K>
where
    K: ContextCoordinator + ?Sized,
{
    coordinator: &'a K,
    previous: Option<Option<K::Context>>,
    _not_send: PhantomData<*const ()>,
}

impl<'a, K> ContextScope<'a, K>
where
    K: ContextCoordinator + ?Sized,
{
    /// 在当前线程安装 `context`，返回负责恢复的守卫。
    pub fn enter(coordinator: &'a K, context: Option<K::Context>) -> Self {
        let installed = context.is_some();
        let previous = coordinator.replace(context);
        trace!(installed, had_previous = previous.is_some(), "ambient context installed");
        Self {
            coordinator,
            previous: Some(previous),
            _not_send: PhantomData,
        }
    }
}

impl<K> Drop for ContextScope<'_, K>
where
    K: ContextCoordinator + ?Sized,
{
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            let restored = previous.is_some();
            self.coordinator.set(previous);
            trace!(restored, "ambient context restored");
        }
    }
}

impl<K> fmt::Debug for ContextScope<'_, K>
where
    K: ContextCoordinator + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextScope")
            .field(
                "had_previous",
                &self.previous.as_ref().is_some_and(Option::is_some),
            )
            .finish_non_exhaustive()
    }
}

/// 在 `context` 生效期间执行 `operation`，结束后恢复原值。
///
/// 返回值与 panic 都原样向外传递；恢复发生在二者之前。
pub fn with_context<K, R>(
    coordinator: &K,
    context: Option<K::Context>,
    operation: impl FnOnce() -> R,
) -> R
where
    K: ContextCoordinator + ?Sized,
{
    let _scope = ContextScope::enter(coordinator, context);
    operation()
}
