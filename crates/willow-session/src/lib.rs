//! # Willow Session Storage
//!
//! Willow 的会话持久化存储：每个会话存为一个 JSON 文件，
//! 摘要索引常驻内存，列表接口按最近更新排序。
//!
//! 语义约定：
//! - 消息列表整体替换，没有部分追加；后写覆盖先写。
//! - 删除是幂等操作，删除不存在的会话同样成功。
//! - 标题与模型字段在创建时规范化（裁剪 / 默认值替换），
//!   规范化函数见 `willow_core::normalize`。

pub mod error;
pub mod json_store;
pub mod store;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use json_store::{JsonStore, JsonStoreConfig};
pub use store::SessionStore;
pub use types::{MessageDraft, SessionRecord, SessionSummary, StoredMessage};

/// 默认存储路径：`~/.willow`，无法定位 home 目录时退到相对路径
pub fn default_store_path() -> std::path::PathBuf {
    dirs::home_dir()
        .map(|p| p.join(".willow"))
        .unwrap_or_else(|| std::path::PathBuf::from("./willow_data"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use willow_core::{Role, DEFAULT_SESSION_TITLE};

    async fn new_store() -> (TempDir, JsonStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonStore::new(JsonStoreConfig::new(temp_dir.path()))
            .await
            .unwrap();
        (temp_dir, store)
    }

    fn user_message(id: &str, content: &str) -> StoredMessage {
        MessageDraft {
            id: id.to_string(),
            role: Role::User,
            content: content.to_string(),
            image_url: None,
            created_at: None,
        }
        .normalize()
    }

    #[test]
    fn test_default_store_path_targets_willow_dir() {
        let path = default_store_path();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap();
        assert!(name == ".willow" || name == "willow_data");
    }

    #[tokio::test]
    async fn test_create_and_get_session() {
        let (_dir, store) = new_store().await;

        let created = store.create("My chat", Some("gpt-4o")).await.unwrap();
        let loaded = store.get(&created.id).await.unwrap();

        assert_eq!(loaded.id, created.id);
        assert_eq!(loaded.title, "My chat");
        assert_eq!(loaded.model, "gpt-4o");
        assert!(loaded.messages.is_empty());
    }

    #[tokio::test]
    async fn test_create_truncates_long_title() {
        let (_dir, store) = new_store().await;

        let long = "Hello world, this is a very long opening message that exceeds fifty characters easily";
        let created = store.create(long, None).await.unwrap();

        assert_eq!(created.title, &long[..50]);
        assert_eq!(created.title.chars().count(), 50);
    }

    #[tokio::test]
    async fn test_create_defaults_empty_title() {
        let (_dir, store) = new_store().await;

        let created = store.create("", None).await.unwrap();
        assert_eq!(created.title, DEFAULT_SESSION_TITLE);
    }

    #[tokio::test]
    async fn test_get_unknown_session_is_not_found() {
        let (_dir, store) = new_store().await;

        let err = store.get("unknown-id").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (_dir, store) = new_store().await;

        let created = store.create("to delete", None).await.unwrap();
        store.delete(&created.id).await.unwrap();
        // 再删一次，以及删除从未存在的 id，都应成功
        store.delete(&created.id).await.unwrap();
        store.delete("never-existed").await.unwrap();

        assert!(store.get(&created.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_replace_messages_overwrites_wholesale() {
        let (_dir, store) = new_store().await;

        let created = store.create("chat", None).await.unwrap();
        store
            .replace_messages(
                &created.id,
                vec![user_message("m1", "hi"), user_message("m2", "there")],
            )
            .await
            .unwrap();

        let loaded = store.get(&created.id).await.unwrap();
        assert_eq!(loaded.messages.len(), 2);

        // 空数组同样是合法的整体替换
        store.replace_messages(&created.id, vec![]).await.unwrap();
        let loaded = store.get(&created.id).await.unwrap();
        assert!(loaded.messages.is_empty());
    }

    #[tokio::test]
    async fn test_replace_messages_unknown_session() {
        let (_dir, store) = new_store().await;

        let err = store
            .replace_messages("missing", vec![user_message("m1", "hi")])
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        // 绝不隐式创建会话
        assert!(store.list_summaries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_ordered_by_recency() {
        let (_dir, store) = new_store().await;

        let first = store.create("first", None).await.unwrap();
        let second = store.create("second", None).await.unwrap();

        // 更新 first，使其成为最近更新的会话
        store
            .replace_messages(&first.id, vec![user_message("m1", "bump")])
            .await
            .unwrap();

        let summaries = store.list_summaries().await.unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].id, first.id);
        assert_eq!(summaries[1].id, second.id);
    }

    #[tokio::test]
    async fn test_index_rebuilt_on_restart() {
        let temp_dir = TempDir::new().unwrap();

        let created = {
            let store = JsonStore::new(JsonStoreConfig::new(temp_dir.path()))
                .await
                .unwrap();
            store.create("survivor", None).await.unwrap()
        };

        let reopened = JsonStore::new(JsonStoreConfig::new(temp_dir.path()))
            .await
            .unwrap();
        let summaries = reopened.list_summaries().await.unwrap();

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, created.id);
        assert_eq!(summaries[0].title, "survivor");
    }
}
