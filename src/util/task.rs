use std::collections::HashMap;
use tokio::task::JoinHandle;

#[derive(Default)]
pub struct TaskManager {
    tasks: HashMap<String, JoinHandle<()>>,
}

impl TaskManager {
    pub fn new() -> Self {
        Self {
            tasks: HashMap::new(),
        }
    }

    /// Replaces (and aborts) any task already registered under `key`.
    pub fn spawn(&mut self, key: &str, task: JoinHandle<()>) {
        self.tasks.retain(|_, h| !h.is_finished());
        if let Some(handle) = self.tasks.insert(key.to_string(), task) {
            handle.abort();
        }
    }

    pub fn abort(&mut self, key: &str) {
        if let Some(handle) = self.tasks.remove(key) {
            handle.abort();
        }
    }

    pub fn abort_all(&mut self) {
        for handle in self.tasks.values() {
            handle.abort();
        }
        self.tasks.clear();
    }

    pub fn is_running(&self, key: &str) -> bool {
        self.tasks.get(key).is_some_and(|h| !h.is_finished())
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        self.abort_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn spawning_same_key_aborts_previous() {
        let mut tasks = TaskManager::new();
        let first = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        });
        let abort_handle = first.abort_handle();
        tasks.spawn("fetch", first);
        tasks.spawn(
            "fetch",
            tokio::spawn(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }),
        );

        tokio::task::yield_now().await;
        assert!(abort_handle.is_finished());
        assert!(tasks.is_running("fetch"));

        tasks.abort("fetch");
        assert!(!tasks.is_running("fetch"));
    }

    #[tokio::test]
    async fn distinct_keys_run_side_by_side() {
        let mut tasks = TaskManager::new();
        let sleeper = || {
            tokio::spawn(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
            })
        };
        tasks.spawn("add_song:1", sleeper());
        tasks.spawn("add_song:2", sleeper());

        tokio::task::yield_now().await;
        assert!(tasks.is_running("add_song:1"));
        assert!(tasks.is_running("add_song:2"));
        tasks.abort_all();
    }
}
