use std::{
    future::Future,
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    task::{Context, Poll},
    thread,
};

use futures::channel::oneshot;
use parking_lot::Mutex;
use spark_ambient::{
    BoxFuture, ContextCoordinator, JoinHandle, TaskError, TaskExecutor, TaskHandle, TaskResult,
    async_trait, runtime::ErasedOutput as Erased,
};

use super::Tenant;

/// 每个任务独占一条线程的异步执行设施。
///
/// 工作线程在驱动任务前把自己的租户设为 `worker_tenant`，任务结束后记录该线程上的租户值，
/// 供测试断言“工作线程的上下文已恢复”。
pub(crate) struct ThreadExecutor {
    worker_tenant: String,
    after_run: Arc<Mutex<Vec<Option<String>>>>,
    spawned: AtomicUsize,
}

impl ThreadExecutor {
    pub(crate) fn new(worker_tenant: impl Into<String>) -> Self {
        Self {
            worker_tenant: worker_tenant.into(),
            after_run: Arc::default(),
            spawned: AtomicUsize::new(0),
        }
    }

    /// 各任务结束后工作线程上的租户值。
    pub(crate) fn tenants_after_run(&self) -> Vec<Option<String>> {
        self.after_run.lock().clone()
    }
}

impl TaskExecutor for ThreadExecutor {
    fn spawn_dyn(&self, fut: BoxFuture<'static, TaskResult<Erased>>) -> JoinHandle<Erased> {
        let id = format!("thread-task-{}", self.spawned.fetch_add(1, Ordering::SeqCst));
        let (sender, receiver) = oneshot::channel();
        let finished = Arc::new(AtomicBool::new(false));
        let worker_tenant = self.worker_tenant.clone();
        let after_run = Arc::clone(&self.after_run);
        let done = Arc::clone(&finished);

        thread::spawn(move || {
            Tenant.set(Some(worker_tenant));
            let output = futures::executor::block_on(fut);
            after_run.lock().push(Tenant.get());
            done.store(true, Ordering::SeqCst);
            let _ = sender.send(output);
        });

        JoinHandle::from_task_handle(Box::new(ThreadHandle {
            id,
            finished,
            cancelled: AtomicBool::new(false),
            receiver: Mutex::new(receiver),
        }))
    }
}

struct ThreadHandle {
    id: String,
    finished: Arc<AtomicBool>,
    cancelled: AtomicBool,
    receiver: Mutex<oneshot::Receiver<TaskResult<Erased>>>,
}

#[async_trait]
impl TaskHandle for ThreadHandle {
    type Output = Erased;

    fn cancel(&self) {
        // 线程一旦启动便无法中止，仅记录取消请求。
        self.cancelled.store(true, Ordering::SeqCst);
    }

    fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }

    async fn join(self: Box<Self>) -> TaskResult<Self::Output> {
        let ThreadHandle { receiver, .. } = *self;
        receiver
            .into_inner()
            .await
            .unwrap_or(Err(TaskError::ExecutorTerminated))
    }
}

/// 第一次轮询返回 `Pending` 并立即唤醒自身的 future，用于制造多次轮询。
pub(crate) struct YieldOnce {
    yielded: bool,
}

pub(crate) fn yield_once() -> YieldOnce {
    YieldOnce { yielded: false }
}

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            Poll::Ready(())
        } else {
            self.yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}
