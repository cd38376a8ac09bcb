//! 同步任务执行设施契约。
//!
//! # 模块定位（Why）
//! - [`Executor`] 描述“接收一个 runnable 并安排执行”的最小能力；
//! - [`ExecutorService`] 在其上补充结果句柄、批量调用与生命周期管理；
//! - 二者只定义契约，线程数、排队与关停策略全部由实现方决定。
//!
//! # 默认实现（How）
//! - `submit` 系列基于 `execute` 与 [`TaskFuture::pair`] 组合；
//! - `invoke_all*` 先全部提交再逐个等待；`invoke_any*` 通过通道收集首个成功结果并取消其余任务；
//! - 生命周期方法没有默认实现，必须由设施自行给出。

use std::{
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc,
        mpsc::{self, RecvTimeoutError},
    },
    time::{Duration, Instant},
};

use super::{
    completion::TaskFuture,
    task::{Callable, Runnable},
};
use crate::error::{ExecutorError, TaskError, TaskResult};

/// 接收 runnable 的最小执行设施。
///
/// # 契约说明（What）
/// - **前置条件**：实现必须 `Send + Sync`，允许多个线程同时提交；
/// - **后置条件**：返回 `Ok(())` 表示设施已接收任务，之后恰好执行一次（除非设施被强制关停）；
///   返回 `Err` 时任务已被丢弃。
pub trait Executor: Send + Sync {
    /// 安排 `task` 在未来某个时刻执行。
    fn execute(&self, task: Runnable) -> Result<(), ExecutorError>;
}

impl<E> Executor for &E
where
    E: Executor + ?Sized,
{
    fn execute(&self, task: Runnable) -> Result<(), ExecutorError> {
        (**self).execute(task)
    }
}

impl<E> Executor for Arc<E>
where
    E: Executor + ?Sized,
{
    fn execute(&self, task: Runnable) -> Result<(), ExecutorError> {
        (**self).execute(task)
    }
}

impl<E> Executor for Box<E>
where
    E: Executor + ?Sized,
{
    fn execute(&self, task: Runnable) -> Result<(), ExecutorError> {
        (**self).execute(task)
    }
}

/// 带结果句柄、批量调用与生命周期管理的执行设施。
///
/// # 设计背景（Why）
/// - 调用方既需要即发即弃的 `execute`，也需要等待单个或一批任务的结果；
/// - 批量操作的语义（全部等待 / 首个成功）与线程池实现无关，因此给出基于 `submit` 的默认实现，
///   设施可按需覆写以获得更高效的调度。
///
/// # 契约说明（What）
/// - `invoke_all`：等待每个任务完成，按输入顺序返回句柄；
/// - `invoke_all_timeout`：截止时仍未完成的任务会被取消，依旧返回全部句柄；
/// - `invoke_any`：返回任一成功任务的结果并取消其余任务；空集合返回 [`ExecutorError::EmptyTaskSet`]，
///   全部失败返回 [`ExecutorError::AllTasksFailed`]；
/// - `invoke_any_timeout`：截止前没有成功结果则返回 [`ExecutorError::TimedOut`]。
///
/// # 风险提示（Trade-offs）
/// - 方法以泛型承载任务结果类型，因此本 trait 不是对象安全的；需要动态分发时请以 `Arc<S>` 共享具体类型。
pub trait ExecutorService: Executor {
    /// 提交产生结果的任务。
    fn submit<T>(&self, task: Callable<T>) -> Result<TaskFuture<T>, ExecutorError>
    where
        T: Send + 'static,
    {
        let (promise, future) = TaskFuture::pair();
        self.execute(Runnable::new(move || promise.run(task)))?;
        Ok(future)
    }

    /// 提交 runnable，完成时结果为 `()`。
    fn submit_runnable(&self, task: Runnable) -> Result<TaskFuture<()>, ExecutorError> {
        self.submit(Callable::from_runnable(task, ()))
    }

    /// 提交 runnable，完成时结果为调用方给定的 `result`。
    fn submit_with_result<T>(
        &self,
        task: Runnable,
        result: T,
    ) -> Result<TaskFuture<T>, ExecutorError>
    where
        T: Send + 'static,
    {
        self.submit(Callable::from_runnable(task, result))
    }

    /// 执行全部任务并等待它们完成。
    fn invoke_all<T>(&self, tasks: Vec<Callable<T>>) -> Result<Vec<TaskFuture<T>>, ExecutorError>
    where
        T: Send + 'static,
    {
        let futures = submit_all(self, tasks)?;
        for future in &futures {
            future.wait();
        }
        Ok(futures)
    }

    /// 执行全部任务，最多等待 `timeout`；截止时未完成的任务被取消。
    ///
    /// 截止时刻无法表示（如 `Duration::MAX`）时视为不设截止，等价于 [`invoke_all`](Self::invoke_all)。
    fn invoke_all_timeout<T>(
        &self,
        tasks: Vec<Callable<T>>,
        timeout: Duration,
    ) -> Result<Vec<TaskFuture<T>>, ExecutorError>
    where
        T: Send + 'static,
    {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self.invoke_all(tasks);
        };
        let futures = submit_all(self, tasks)?;
        for future in &futures {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if !future.wait_timeout(remaining) {
                cancel_all(&futures);
                break;
            }
        }
        Ok(futures)
    }

    /// 执行全部任务，返回任一成功任务的结果。
    fn invoke_any<T>(&self, tasks: Vec<Callable<T>>) -> Result<T, ExecutorError>
    where
        T: Send + 'static,
    {
        first_success(self, tasks, None)
    }

    /// 执行全部任务，返回截止前任一成功任务的结果；截止时刻无法表示时不设截止。
    fn invoke_any_timeout<T>(
        &self,
        tasks: Vec<Callable<T>>,
        timeout: Duration,
    ) -> Result<T, ExecutorError>
    where
        T: Send + 'static,
    {
        first_success(self, tasks, Instant::now().checked_add(timeout))
    }

    /// 停止接收新任务，已排队的任务继续执行。
    fn shutdown(&self);

    /// 停止接收新任务并尝试中止执行，返回尚未开始的任务。
    fn shutdown_now(&self) -> Vec<Runnable>;

    /// 是否已进入关停流程。
    fn is_shutdown(&self) -> bool;

    /// 关停后所有任务是否均已结束。
    fn is_terminated(&self) -> bool;

    /// 最多阻塞 `timeout` 等待设施终止，返回是否已终止。
    fn await_termination(&self, timeout: Duration) -> bool;
}

impl<S> ExecutorService for Arc<S>
where
    S: ExecutorService,
{
    fn submit<T>(&self, task: Callable<T>) -> Result<TaskFuture<T>, ExecutorError>
    where
        T: Send + 'static,
    {
        (**self).submit(task)
    }

    fn submit_runnable(&self, task: Runnable) -> Result<TaskFuture<()>, ExecutorError> {
        (**self).submit_runnable(task)
    }

    fn submit_with_result<T>(
        &self,
        task: Runnable,
        result: T,
    ) -> Result<TaskFuture<T>, ExecutorError>
    where
        T: Send + 'static,
    {
        (**self).submit_with_result(task, result)
    }

    fn invoke_all<T>(&self, tasks: Vec<Callable<T>>) -> Result<Vec<TaskFuture<T>>, ExecutorError>
    where
        T: Send + 'static,
    {
        (**self).invoke_all(tasks)
    }

    fn invoke_all_timeout<T>(
        &self,
        tasks: Vec<Callable<T>>,
        timeout: Duration,
    ) -> Result<Vec<TaskFuture<T>>, ExecutorError>
    where
        T: Send + 'static,
    {
        (**self).invoke_all_timeout(tasks, timeout)
    }

    fn invoke_any<T>(&self, tasks: Vec<Callable<T>>) -> Result<T, ExecutorError>
    where
        T: Send + 'static,
    {
        (**self).invoke_any(tasks)
    }

    fn invoke_any_timeout<T>(
        &self,
        tasks: Vec<Callable<T>>,
        timeout: Duration,
    ) -> Result<T, ExecutorError>
    where
        T: Send + 'static,
    {
        (**self).invoke_any_timeout(tasks, timeout)
    }

    fn shutdown(&self) {
        (**self).shutdown()
    }

    fn shutdown_now(&self) -> Vec<Runnable> {
        (**self).shutdown_now()
    }

    fn is_shutdown(&self) -> bool {
        (**self).is_shutdown()
    }

    fn is_terminated(&self) -> bool {
        (**self).is_terminated()
    }

    fn await_termination(&self, timeout: Duration) -> bool {
        (**self).await_termination(timeout)
    }
}

/// 逐个提交；任一提交失败时取消已提交的任务并返回该错误。
fn submit_all<S, T>(
    service: &S,
    tasks: Vec<Callable<T>>,
) -> Result<Vec<TaskFuture<T>>, ExecutorError>
where
    S: ExecutorService + ?Sized,
    T: Send + 'static,
{
    let mut futures = Vec::with_capacity(tasks.len());
    for task in tasks {
        match service.submit(task) {
            Ok(future) => futures.push(future),
            Err(error) => {
                cancel_all(&futures);
                return Err(error);
            }
        }
    }
    Ok(futures)
}

fn cancel_all<T>(futures: &[TaskFuture<T>]) {
    for future in futures {
        future.cancel();
    }
}

fn first_success<S, T>(
    service: &S,
    tasks: Vec<Callable<T>>,
    deadline: Option<Instant>,
) -> Result<T, ExecutorError>
where
    S: ExecutorService + ?Sized,
    T: Send + 'static,
{
    if tasks.is_empty() {
        return Err(ExecutorError::EmptyTaskSet);
    }

    let (sender, receiver) = mpsc::channel::<TaskResult<T>>();
    let relays: Vec<Callable<()>> = tasks
        .into_iter()
        .map(|task| {
            let sender = sender.clone();
            Callable::new(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| task.call()))
                    .unwrap_or_else(|payload| Err(TaskError::from_panic(payload)));
                // 接收端只在已得到结果或放弃等待后才会关闭。
                let _ = sender.send(outcome);
                Ok(())
            })
        })
        .collect();
    let futures = submit_all(service, relays)?;
    // 全部转发任务结束后通道断开，接收端据此判定“没有成功者”。
    drop(sender);

    let mut last_failure = None;
    let outcome = loop {
        let next = match deadline {
            Some(deadline) => {
                receiver.recv_timeout(deadline.saturating_duration_since(Instant::now()))
            }
            None => receiver.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        match next {
            Ok(Ok(value)) => break Ok(value),
            Ok(Err(failure)) => last_failure = Some(failure),
            Err(RecvTimeoutError::Timeout) => break Err(ExecutorError::TimedOut),
            Err(RecvTimeoutError::Disconnected) => {
                break Err(ExecutorError::AllTasksFailed(
                    last_failure.unwrap_or(TaskError::ExecutorTerminated),
                ));
            }
        }
    };
    cancel_all(&futures);
    outcome
}
