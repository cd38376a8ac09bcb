use tracing::trace;

use super::ContextExecutor;
use crate::{
    coordinator::ContextCoordinator,
    error::ExecutorError,
    runtime::{Executor, Runnable},
};

impl<E, K> Executor for ContextExecutor<E, K>
where
    E: Executor,
    K: ContextCoordinator + Clone + 'static,
{
    fn execute(&self, task: Runnable) -> Result<(), ExecutorError> {
        trace!(decorator = %self.name, operation = "execute", "forwarding task");
        self.delegate.execute(self.preserve(task).into_runnable())
    }
}
