use std::{
    cell::Cell,
    sync::{
        Arc,
        atomic::{AtomicU64, AtomicUsize, Ordering},
    },
};

use spark_ambient::ContextCoordinator;

spark_ambient::thread_local_coordinator! {
    /// 合约测试统一使用的租户上下文。
    pub(crate) Tenant: String
}

/// 每次 `get` 都返回一个新序号的协调器。
///
/// # 设计背景（Why）
/// - 批量提交若对每个任务分别读取协调器，任务将观察到互不相同的序号；
///   只读取一次时，所有任务观察到同一个序号；
/// - `reads` 记录 `get` 的调用次数，用于直接断言捕获次数。
///
/// # 契约说明（What）
/// - `set`/`replace` 写入线程局部槽位，不计入读取次数；
/// - 任务内通过 [`SequenceCoordinator::installed`] 观察被安装的值。
#[derive(Clone, Debug, Default)]
pub(crate) struct SequenceCoordinator {
    next: Arc<AtomicU64>,
    reads: Arc<AtomicUsize>,
}

thread_local! {
    static INSTALLED: Cell<Option<u64>> = const { Cell::new(None) };
}

impl SequenceCoordinator {
    pub(crate) fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub(crate) fn installed() -> Option<u64> {
        INSTALLED.with(Cell::get)
    }
}

impl ContextCoordinator for SequenceCoordinator {
    type Context = u64;

    fn get(&self) -> Option<u64> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Some(self.next.fetch_add(1, Ordering::SeqCst))
    }

    fn set(&self, context: Option<u64>) {
        INSTALLED.with(|slot| slot.set(context));
    }

    fn replace(&self, context: Option<u64>) -> Option<u64> {
        INSTALLED.with(|slot| slot.replace(context))
    }
}
