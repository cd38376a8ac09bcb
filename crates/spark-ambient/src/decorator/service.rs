//! 批量任务服务的装饰。
//!
//! 单个提交与 [`Executor`](crate::runtime::Executor) 装饰一致；批量提交在调用线程上只读取一次协调器，
//! 批内每个任务携带同一快照的克隆。所有调用都落到委托设施的同名方法上，不经过 trait 默认实现。

use std::time::Duration;

use tracing::{debug, trace};

use super::ContextExecutor;
use crate::{
    coordinator::ContextCoordinator,
    error::ExecutorError,
    runtime::{Callable, ExecutorService, Runnable, TaskFuture},
};

impl<E, K> ContextExecutor<E, K>
where
    K: ContextCoordinator + Clone + 'static,
{
    fn wrap_batch<T>(&self, operation: &'static str, tasks: Vec<Callable<T>>) -> Vec<Callable<T>>
    where
        T: Send + 'static,
    {
        let captured = self.snapshot();
        debug!(
            decorator = %self.name,
            operation,
            tasks = tasks.len(),
            "wrapping bulk submission"
        );
        tasks
            .into_iter()
            .map(|task| self.preserve_with(task, captured.clone()).into_callable())
            .collect()
    }
}

impl<E, K> ExecutorService for ContextExecutor<E, K>
where
    E: ExecutorService,
    K: ContextCoordinator + Clone + 'static,
{
    fn submit<T>(&self, task: Callable<T>) -> Result<TaskFuture<T>, ExecutorError>
    where
        T: Send + 'static,
    {
        trace!(decorator = %self.name, operation = "submit", "forwarding task");
        self.delegate.submit(self.preserve(task).into_callable())
    }

    fn submit_runnable(&self, task: Runnable) -> Result<TaskFuture<()>, ExecutorError> {
        trace!(decorator = %self.name, operation = "submit_runnable", "forwarding task");
        self.delegate
            .submit_runnable(self.preserve(task).into_runnable())
    }

    fn submit_with_result<T>(
        &self,
        task: Runnable,
        result: T,
    ) -> Result<TaskFuture<T>, ExecutorError>
    where
        T: Send + 'static,
    {
        trace!(decorator = %self.name, operation = "submit_with_result", "forwarding task");
        self.delegate
            .submit_with_result(self.preserve(task).into_runnable(), result)
    }

    fn invoke_all<T>(&self, tasks: Vec<Callable<T>>) -> Result<Vec<TaskFuture<T>>, ExecutorError>
    where
        T: Send + 'static,
    {
        self.delegate.invoke_all(self.wrap_batch("invoke_all", tasks))
    }

    fn invoke_all_timeout<T>(
        &self,
        tasks: Vec<Callable<T>>,
        timeout: Duration,
    ) -> Result<Vec<TaskFuture<T>>, ExecutorError>
    where
        T: Send + 'static,
    {
        self.delegate
            .invoke_all_timeout(self.wrap_batch("invoke_all_timeout", tasks), timeout)
    }

    fn invoke_any<T>(&self, tasks: Vec<Callable<T>>) -> Result<T, ExecutorError>
    where
        T: Send + 'static,
    {
        self.delegate.invoke_any(self.wrap_batch("invoke_any", tasks))
    }

    fn invoke_any_timeout<T>(
        &self,
        tasks: Vec<Callable<T>>,
        timeout: Duration,
    ) -> Result<T, ExecutorError>
    where
        T: Send + 'static,
    {
        self.delegate
            .invoke_any_timeout(self.wrap_batch("invoke_any_timeout", tasks), timeout)
    }

    fn shutdown(&self) {
        self.delegate.shutdown()
    }

    fn shutdown_now(&self) -> Vec<Runnable> {
        self.delegate.shutdown_now()
    }

    fn is_shutdown(&self) -> bool {
        self.delegate.is_shutdown()
    }

    fn is_terminated(&self) -> bool {
        self.delegate.is_terminated()
    }

    fn await_termination(&self, timeout: Duration) -> bool {
        self.delegate.await_termination(timeout)
    }
}
