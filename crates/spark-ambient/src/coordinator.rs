//! 环境上下文协调器契约。
//!
//! # 模块定位（Why）
//! - “当前线程的环境上下文”究竟存放在 `thread_local!`、执行局部映射还是其它按执行帧划分的存储中，
//!   由调用方决定；核心只通过本模块的 [`ContextCoordinator`] 读写，从不直接触碰存储；
//! - 协调器通常被多个装饰器共享，因此以 `Clone` 句柄（零尺寸结构体或 `Arc<K>`）的形式传递。
//!
//! # 使用契约（What）
//! - `get` 返回调用线程当前的环境值，缺省时返回 `None`；
//! - `set(None)` 清空当前值；
//! - 接口本身不承诺并发语义，作用域划分（通常是一线程一槽位）由实现自行保证。

use std::sync::Arc;

/// `ContextCoordinator` 抽象“当前执行线程上的环境上下文”的读写能力。
///
/// # 设计背景（Why）
/// - 任务执行设施会把任务搬到另一条线程，线程局部存储随之失效；
///   包装层需要一个与存储机制无关的 `get`/`set` 能力来完成捕获、安装与恢复。
///
/// # 契约说明（What）
/// - **关联类型**：`Context` 为调用方定义的不透明值，包装层只对其做存取与克隆；
/// - **前置条件**：实现必须满足 `Send + Sync`，以便装饰器在多线程间共享；
/// - **后置条件**：`set(value)` 之后同一执行帧上的 `get()` 返回 `value`。
///
/// # 风险提示（Trade-offs）
/// - [`replace`](Self::replace) 默认等价于先 `get` 后 `set`，会多克隆一次上下文；
///   基于 `RefCell` 的实现可以覆写为一次交换。
pub trait ContextCoordinator: Send + Sync {
    /// 环境上下文的值类型。
    type Context: Clone + Send + Sync + 'static;

    /// 读取调用线程上的环境上下文。
    fn get(&self) -> Option<Self::Context>;

    /// 替换调用线程上的环境上下文，`None` 表示清空。
    fn set(&self, context: Option<Self::Context>);

    /// 安装新值并返回此前的值。
    fn replace(&self, context: Option<Self::Context>) -> Option<Self::Context> {
        let previous = self.get();
        self.set(context);
        previous
    }
}

impl<K> ContextCoordinator for &K
where
    K: ContextCoordinator + ?Sized,
{
    type Context = K::Context;

    fn get(&self) -> Option<Self::Context> {
        (**self).get()
    }

    fn set(&self, context: Option<Self::Context>) {
        (**self).set(context)
    }

    fn replace(&self, context: Option<Self::Context>) -> Option<Self::Context> {
        (**self).replace(context)
    }
}

impl<K> ContextCoordinator for Arc<K>
where
    K: ContextCoordinator + ?Sized,
{
    type Context = K::Context;

    fn get(&self) -> Option<Self::Context> {
        (**self).get()
    }

    fn set(&self, context: Option<Self::Context>) {
        (**self).set(context)
    }

    fn replace(&self, context: Option<Self::Context>) -> Option<Self::Context> {
        (**self).replace(context)
    }
}

impl<K> ContextCoordinator for Box<K>
where
    K: ContextCoordinator + ?Sized,
{
    type Context = K::Context;

    fn get(&self) -> Option<Self::Context> {
        (**self).get()
    }

    fn set(&self, context: Option<Self::Context>) {
        (**self).set(context)
    }

    fn replace(&self, context: Option<Self::Context>) -> Option<Self::Context> {
        (**self).replace(context)
    }
}
