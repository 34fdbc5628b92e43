use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::task::{Task, TaskSnapshot};

/// 当前活跃的下载任务，按远端文件 id 索引
///
/// 所有操作共用一把锁，临界区内只有 O(1) 的哈希表操作，不做任何 IO。
#[derive(Debug, Default)]
pub struct Tasks {
    inner: Mutex<HashMap<i64, Arc<Task>>>,
}

impl Tasks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<i64, Arc<Task>>> {
        // 表本身不会因为 panic 处于半更新状态，直接取回即可
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 添加任务；相同 id 的旧任务会被直接覆盖并返回
    pub fn add(&self, task: Arc<Task>) -> Option<Arc<Task>> {
        self.lock().insert(task.id(), task)
    }

    /// 移除任务，不存在时什么也不做
    pub fn remove(&self, task: &Task) {
        self.lock().remove(&task.id());
    }

    pub fn exists(&self, task: &Task) -> bool {
        self.lock().contains_key(&task.id())
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn get(&self, id: i64) -> Option<Arc<Task>> {
        self.lock().get(&id).cloned()
    }

    /// 所有任务的快照，按 id 排序
    pub fn snapshot(&self) -> Vec<TaskSnapshot> {
        let tasks: Vec<Arc<Task>> = self.lock().values().cloned().collect();
        let mut snapshots: Vec<TaskSnapshot> = tasks.iter().map(|t| t.snapshot()).collect();
        snapshots.sort_by_key(|s| s.id);
        snapshots
    }
}
