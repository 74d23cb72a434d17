//! プレビュー参照の管理
//!
//! 受け付けた画像ごとに表示専用の参照（preview://id/name）を発行する。
//! 参照はDropで解放され、登録簿の生存数で解放漏れを確認できる。

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct RegistryInner {
    next_id: u64,
    live: HashSet<u64>,
}

/// プレビュー参照の登録簿
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        // 中身は単純なカウンタなので、poisonされても継続して問題ない
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 新しい参照を発行
    pub fn acquire(&self, file_name: &str) -> PreviewRef {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.live.insert(id);
        PreviewRef {
            id,
            url: format!("preview://{}/{}", id, file_name),
            registry: self.clone(),
        }
    }

    /// 未解放の参照数
    pub fn live_count(&self) -> usize {
        self.lock().live.len()
    }

    pub fn is_live(&self, id: u64) -> bool {
        self.lock().live.contains(&id)
    }

    fn release(&self, id: u64) {
        self.lock().live.remove(&id);
    }
}

/// 表示専用の画像参照
///
/// 複製不可。所有者（UploadedImage）が破棄されると解放される。
pub struct PreviewRef {
    id: u64,
    url: String,
    registry: PreviewRegistry,
}

impl PreviewRef {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Debug for PreviewRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewRef")
            .field("id", &self.id)
            .field("url", &self.url)
            .finish()
    }
}

impl Drop for PreviewRef {
    fn drop(&mut self) {
        self.registry.release(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_and_release() {
        let registry = PreviewRegistry::new();
        let first = registry.acquire("a.png");
        assert_eq!(registry.live_count(), 1);
        assert!(registry.is_live(first.id()));

        let first_id = first.id();
        drop(first);
        assert_eq!(registry.live_count(), 0);
        assert!(!registry.is_live(first_id));
    }

    #[test]
    fn test_ids_are_unique() {
        let registry = PreviewRegistry::new();
        let a = registry.acquire("same.jpg");
        let b = registry.acquire("same.jpg");
        assert_ne!(a.id(), b.id());
        assert_ne!(a.url(), b.url());
        assert_eq!(registry.live_count(), 2);
    }

    #[test]
    fn test_url_format() {
        let registry = PreviewRegistry::new();
        let preview = registry.acquire("cat.png");
        assert_eq!(preview.url(), "preview://1/cat.png");
    }
}
