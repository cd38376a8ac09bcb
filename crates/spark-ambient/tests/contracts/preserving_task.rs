use spark_ambient::{
    Callable, ContextCoordinator, ContextPreserving, Executor, ExecutorService, Runnable,
    TaskError,
};
use std::sync::mpsc;

use super::support::{Tenant, init_tracing, probe_tenant, single_worker_pool};

/// 验证包装任务在工作线程上观察到提交线程的上下文，且工作线程原值在任务后恢复。
///
/// # 测试目标（Why）
/// - 覆盖“捕获正确性”与“恢复不变量”两条核心性质；
///
/// # 测试步骤（How）
/// 1. 工作线程预置租户 `worker`；提交线程设置租户 `A` 后包装任务；
/// 2. 任务在工作线程上读取租户并回传；
/// 3. 以未装饰探针读取工作线程租户。
///
/// # 输入/输出契约（What）
/// - **后置条件**：任务观察到 `A`，探针观察到 `worker`。
#[test]
fn wrapped_task_observes_captured_context_and_worker_is_restored() {
    init_tracing();
    let pool = single_worker_pool("worker");
    let (sender, receiver) = mpsc::channel();

    Tenant.set(Some("A".to_owned()));
    let task = ContextPreserving::wrap(
        Runnable::new(move || {
            sender.send(Tenant.get()).expect("测试线程仍在等待");
        }),
        Tenant,
    );
    Tenant.set(Some("changed-after-wrap".to_owned()));

    pool.execute(task.into_runnable()).expect("线程池应当接收任务");

    assert_eq!(receiver.recv().expect("任务应当回传观测值").as_deref(), Some("A"));
    assert_eq!(probe_tenant(&pool).as_deref(), Some("worker"));
}

/// 验证任务返回错误时结果原样透传，工作线程上下文依旧恢复。
#[test]
fn failing_task_propagates_error_and_restores() {
    init_tracing();
    let pool = single_worker_pool("worker");

    let task = ContextPreserving::with_context(
        Callable::<()>::new(|| {
            assert_eq!(Tenant.get().as_deref(), Some("A"));
            Err(TaskError::failed("downstream unavailable"))
        }),
        Tenant,
        Some("A".to_owned()),
    );

    let outcome = pool
        .submit(task.into_callable())
        .expect("线程池应当接收任务")
        .get();

    assert_eq!(outcome, Err(TaskError::failed("downstream unavailable")));
    assert_eq!(probe_tenant(&pool).as_deref(), Some("worker"));
}

/// 验证捕获到“缺省”上下文时，任务运行期间工作线程上下文被清空。
#[test]
fn absent_capture_clears_the_worker_during_the_task() {
    init_tracing();
    let pool = single_worker_pool("worker");

    Tenant.set(None);
    let task = ContextPreserving::wrap(Callable::new(|| Ok(Tenant.get())), Tenant);

    let seen = pool
        .submit(task.into_callable())
        .expect("线程池应当接收任务")
        .get();

    assert_eq!(seen, Ok(None));
    assert_eq!(probe_tenant(&pool).as_deref(), Some("worker"));
}

/// 验证任务内部对上下文的写入不会泄漏到工作线程后续的任务。
#[test]
fn writes_inside_the_task_do_not_leak() {
    init_tracing();
    let pool = single_worker_pool("worker");

    let task = ContextPreserving::with_context(
        Runnable::new(|| Tenant.set(Some("scribbled".to_owned()))),
        Tenant,
        Some("A".to_owned()),
    );
    pool.submit_runnable(task.into())
        .expect("线程池应当接收任务")
        .get()
        .expect("任务不会失败");

    assert_eq!(probe_tenant(&pool).as_deref(), Some("worker"));
}
