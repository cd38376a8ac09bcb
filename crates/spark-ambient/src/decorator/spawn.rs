use tracing::trace;

use super::ContextExecutor;
use crate::{
    coordinator::ContextCoordinator,
    error::TaskResult,
    future::{BoxFuture, ContextPreservingFuture},
    runtime::{ErasedOutput, JoinHandle, TaskExecutor},
};

/// 异步设施的装饰：快照在提交时确定，之后的每一次 `poll` 都在快照下进行。
impl<E, K> TaskExecutor for ContextExecutor<E, K>
where
    E: TaskExecutor,
    K: ContextCoordinator + Clone + 'static,
{
    fn spawn_dyn(
        &self,
        fut: BoxFuture<'static, TaskResult<ErasedOutput>>,
    ) -> JoinHandle<ErasedOutput> {
        trace!(decorator = %self.name, operation = "spawn", "forwarding future");
        let preserved =
            ContextPreservingFuture::with_context(fut, self.coordinator.clone(), self.snapshot());
        self.delegate.spawn_dyn(Box::pin(preserved))
    }
}
