use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use spark_ambient::{
    Callable, Executor, ExecutorError, ExecutorService, Runnable, TaskFuture,
};

use super::FixedThreadPool;

/// 记录每次调用的任务服务替身。
///
/// # 设计背景（Why）
/// - 装饰器必须把每个操作转发到委托设施的同名方法，而不是落到 trait 默认实现；
///   替身覆写全部方法并记录调用名，测试据此断言转发路径；
/// - 实际执行仍交给内部线程池，任务运行在真实的工作线程上。
pub(crate) struct RecordingService {
    inner: FixedThreadPool,
    calls: Arc<Mutex<Vec<String>>>,
}

impl RecordingService {
    pub(crate) fn new(inner: FixedThreadPool) -> Self {
        Self {
            inner,
            calls: Arc::default(),
        }
    }

    /// 取出目前为止的调用记录。
    pub(crate) fn take_calls(&self) -> Vec<String> {
        std::mem::take(&mut *self.calls.lock())
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().push(call.into());
    }
}

impl Executor for RecordingService {
    fn execute(&self, task: Runnable) -> Result<(), ExecutorError> {
        self.record("execute");
        self.inner.execute(task)
    }
}

impl ExecutorService for RecordingService {
    fn submit<T>(&self, task: Callable<T>) -> Result<TaskFuture<T>, ExecutorError>
    where
        T: Send + 'static,
    {
        self.record("submit");
        self.inner.submit(task)
    }

    fn submit_runnable(&self, task: Runnable) -> Result<TaskFuture<()>, ExecutorError> {
        self.record("submit_runnable");
        self.inner.submit_runnable(task)
    }

    fn submit_with_result<T>(
        &self,
        task: Runnable,
        result: T,
    ) -> Result<TaskFuture<T>, ExecutorError>
    where
        T: Send + 'static,
    {
        self.record("submit_with_result");
        self.inner.submit_with_result(task, result)
    }

    fn invoke_all<T>(&self, tasks: Vec<Callable<T>>) -> Result<Vec<TaskFuture<T>>, ExecutorError>
    where
        T: Send + 'static,
    {
        self.record(format!("invoke_all x{}", tasks.len()));
        self.inner.invoke_all(tasks)
    }

    fn invoke_all_timeout<T>(
        &self,
        tasks: Vec<Callable<T>>,
        timeout: Duration,
    ) -> Result<Vec<TaskFuture<T>>, ExecutorError>
    where
        T: Send + 'static,
    {
        self.record(format!("invoke_all_timeout x{} {timeout:?}", tasks.len()));
        self.inner.invoke_all_timeout(tasks, timeout)
    }

    fn invoke_any<T>(&self, tasks: Vec<Callable<T>>) -> Result<T, ExecutorError>
    where
        T: Send + 'static,
    {
        self.record(format!("invoke_any x{}", tasks.len()));
        self.inner.invoke_any(tasks)
    }

    fn invoke_any_timeout<T>(
        &self,
        tasks: Vec<Callable<T>>,
        timeout: Duration,
    ) -> Result<T, ExecutorError>
    where
        T: Send + 'static,
    {
        self.record(format!("invoke_any_timeout x{} {timeout:?}", tasks.len()));
        self.inner.invoke_any_timeout(tasks, timeout)
    }

    fn shutdown(&self) {
        self.record("shutdown");
        self.inner.shutdown()
    }

    fn shutdown_now(&self) -> Vec<Runnable> {
        self.record("shutdown_now");
        self.inner.shutdown_now()
    }

    fn is_shutdown(&self) -> bool {
        self.record("is_shutdown");
        self.inner.is_shutdown()
    }

    fn is_terminated(&self) -> bool {
        self.record("is_terminated");
        self.inner.is_terminated()
    }

    fn await_termination(&self, timeout: Duration) -> bool {
        self.record(format!("await_termination {timeout:?}"));
        self.inner.await_termination(timeout)
    }
}
