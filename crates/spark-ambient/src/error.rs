//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 集中定义上下文传播链路上的三类错误：构造期参数缺失、执行设施拒绝/超时、单个任务失败；
//! - 装饰器自身从不制造执行期错误，只原样转发委托设施与任务给出的结果。
//!
//! ## 设计要求（What）
//! - 所有错误类型派生 `thiserror::Error`，兼容 `std::error::Error`；
//! - [`TaskError`] 实现 `Clone`，便于批量操作在多个句柄间共享同一失败原因；
//! - `Display` 文本保持英文小写、稳定，供日志与断言使用。

use std::{any::Any, borrow::Cow};

use thiserror::Error;

/// 构造期错误：在任何包装对象产生之前即拒绝。
///
/// - **意图 (Why)**：Rust 的所有权类型本身已排除“空引用”，但经由构造器分步装配时，
///   调用方仍可能遗漏任务、委托设施或协调器；此时必须立即失败且不留下半成品。
/// - **契约 (What)**：`argument` 为缺失参数的稳定名称（`"task"`、`"delegate"`、`"coordinator"`）。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum PropagationError {
    /// 必填参数缺失。
    #[error("invalid argument: `{argument}` cannot be absent")]
    MissingArgument { argument: &'static str },
}

impl PropagationError {
    pub(crate) const fn missing(argument: &'static str) -> Self {
        PropagationError::MissingArgument { argument }
    }
}

/// `TaskResult` 统一表示任务执行结果。
///
/// - `Ok(T)`：任务成功完成并返回值；
/// - `Err(TaskError)`：任务失败、被取消、panic 或执行设施终止。
pub type TaskResult<T = ()> = core::result::Result<T, TaskError>;

/// `TaskError` 枚举单个任务的失败原因。
///
/// # 设计背景（Why）
/// - 吸收线程池 `Future` 与 Tokio `JoinError` 的经验，区分取消、panic、设施终止与业务失败；
/// - 上下文包装层把任务返回的 `TaskError` 原样向上传递，不做重分类。
///
/// # 风险提示（Trade-offs）
/// - `Panicked` 仅保留 panic 负载中的字符串信息；非字符串负载统一记为 `"non-string panic payload"`。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum TaskError {
    #[error("task cancelled")]
    Cancelled,
    #[error("task panicked: {0}")]
    Panicked(Cow<'static, str>),
    #[error("executor terminated before the task completed")]
    ExecutorTerminated,
    #[error("task failed: {0}")]
    Failed(Cow<'static, str>),
}

impl TaskError {
    /// 以给定原因构造业务失败。
    pub fn failed(reason: impl Into<Cow<'static, str>>) -> Self {
        TaskError::Failed(reason.into())
    }

    /// 将 `catch_unwind` 得到的 panic 负载转换为 [`TaskError::Panicked`]。
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = match payload.downcast::<&'static str>() {
            Ok(message) => Cow::Borrowed(*message),
            Err(payload) => match payload.downcast::<String>() {
                Ok(message) => Cow::Owned(*message),
                Err(_) => Cow::Borrowed("non-string panic payload"),
            },
        };
        TaskError::Panicked(message)
    }
}

/// 执行设施层面的错误。
///
/// # 教案式说明
/// - **意图 (Why)**：描述任务提交被拒、设施已关停、批量操作超时等情况；
/// - **契约 (What)**：这些错误只由执行设施产生，装饰器原样透传，不吸收、不重试；
/// - **风险 (Trade-offs)**：`AllTasksFailed` 只保留最后一次失败原因，调用方若需完整列表应改用 `invoke_all`。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum ExecutorError {
    /// 设施拒绝接收任务（队列满、策略拒绝等）。
    #[error("task rejected: {reason}")]
    Rejected { reason: Cow<'static, str> },

    /// 设施已进入关停流程，不再接收新任务。
    #[error("executor has been shut down")]
    Shutdown,

    /// 带截止时间的批量操作在截止前未完成。
    #[error("bulk operation timed out")]
    TimedOut,

    /// `invoke_any` 收到空任务集合。
    #[error("no tasks supplied to invoke_any")]
    EmptyTaskSet,

    /// `invoke_any` 中没有任何任务成功完成。
    #[error("every task failed; last failure: {0}")]
    AllTasksFailed(#[source] TaskError),
}

impl ExecutorError {
    /// 以给定原因构造拒绝错误。
    pub fn rejected(reason: impl Into<Cow<'static, str>>) -> Self {
        ExecutorError::Rejected {
            reason: reason.into(),
        }
    }
}
