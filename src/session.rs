use std::sync::Arc;

const ACCESS_TOKEN: &str = "accessToken";
const REFRESH_TOKEN: &str = "refreshToken";
const FIRST_NAME: &str = "firstName";
const LAST_NAME: &str = "lastName";
const AVATAR_URL: &str = "avatarUrl";

/// Shown in the navbar when the server did not provide an avatar.
const PLACEHOLDER_AVATAR: &str = "https://via.placeholder.com/40";

/// Persistent key-value storage behind the session store.
/// The browser build uses `localStorage`; tests use an in-memory map.
/// `Send + Sync` because view closures capturing the store must be.
pub trait TokenStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// `localStorage`-backed storage. Reads and writes are best-effort:
/// a browser with storage disabled behaves like an empty session.
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten())
    }
}

impl TokenStorage for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage().and_then(|s| s.get_item(key).ok().flatten())
    }

    fn set(&self, key: &str, value: &str) {
        if let Some(s) = Self::storage() {
            let _ = s.set_item(key, value);
        }
    }

    fn remove(&self, key: &str) {
        if let Some(s) = Self::storage() {
            let _ = s.remove_item(key);
        }
    }
}

/// The single access point for session state: tokens plus cached user
/// display fields. Cheap to clone; all clones share one backing store.
///
/// Token well-formedness is never checked here. Presence of an access
/// token is the sole authentication criterion; an expired token is
/// caught by the first authenticated request instead.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn TokenStorage>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_storage(Arc::new(LocalStorage))
    }

    pub fn with_storage(storage: Arc<dyn TokenStorage>) -> Self {
        Self { storage }
    }

    /// Persist a full session, as returned by login or registration.
    pub fn save(
        &self,
        access: &str,
        refresh: &str,
        first_name: &str,
        last_name: &str,
        avatar_url: &str,
    ) {
        self.storage.set(ACCESS_TOKEN, access);
        self.storage.set(REFRESH_TOKEN, refresh);
        self.storage.set(FIRST_NAME, first_name);
        self.storage.set(LAST_NAME, last_name);
        self.storage.set(AVATAR_URL, avatar_url);
    }

    /// Replace only the access token, keeping the rest of the session.
    /// Used after a successful refresh.
    pub fn set_access_token(&self, access: &str) {
        self.storage.set(ACCESS_TOKEN, access);
    }

    pub fn access_token(&self) -> Option<String> {
        self.storage.get(ACCESS_TOKEN).filter(|t| !t.is_empty())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.storage.get(REFRESH_TOKEN).filter(|t| !t.is_empty())
    }

    /// First and last name joined with a space; empty string when neither
    /// was saved.
    pub fn full_name(&self) -> String {
        let first = self.storage.get(FIRST_NAME).unwrap_or_default();
        let last = self.storage.get(LAST_NAME).unwrap_or_default();
        format!("{} {}", first, last).trim().to_string()
    }

    pub fn avatar_url(&self) -> String {
        self.storage
            .get(AVATAR_URL)
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| PLACEHOLDER_AVATAR.to_string())
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    /// Remove every session field. Called on logout; the request client
    /// never clears tokens on its own.
    pub fn clear(&self) {
        for key in [ACCESS_TOKEN, REFRESH_TOKEN, FIRST_NAME, LAST_NAME, AVATAR_URL] {
            self.storage.remove(key);
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub mod testing {
    use super::TokenStorage;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory stand-in for `localStorage`.
    #[derive(Default)]
    pub struct MemoryStorage {
        entries: Mutex<HashMap<String, String>>,
    }

    impl TokenStorage for MemoryStorage {
        fn get(&self, key: &str) -> Option<String> {
            self.entries.lock().unwrap().get(key).cloned()
        }

        fn set(&self, key: &str, value: &str) {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
        }

        fn remove(&self, key: &str) {
            self.entries.lock().unwrap().remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MemoryStorage;
    use super::*;

    fn store() -> SessionStore {
        SessionStore::with_storage(Arc::new(MemoryStorage::default()))
    }

    #[test]
    fn save_then_read_back() {
        let session = store();
        session.save("acc-1", "ref-1", "Ada", "Lovelace", "https://cdn/a.png");

        assert_eq!(session.access_token().as_deref(), Some("acc-1"));
        assert_eq!(session.refresh_token().as_deref(), Some("ref-1"));
        assert_eq!(session.full_name(), "Ada Lovelace");
        assert_eq!(session.avatar_url(), "https://cdn/a.png");
        assert!(session.is_authenticated());
    }

    #[test]
    fn empty_session_uses_fallbacks() {
        let session = store();
        assert_eq!(session.full_name(), "");
        assert_eq!(session.avatar_url(), PLACEHOLDER_AVATAR);
        assert!(!session.is_authenticated());
        assert!(session.access_token().is_none());
        assert!(session.refresh_token().is_none());
    }

    #[test]
    fn partial_name_is_trimmed() {
        let session = store();
        session.save("acc", "ref", "Ada", "", "");
        assert_eq!(session.full_name(), "Ada");
        assert_eq!(session.avatar_url(), PLACEHOLDER_AVATAR);
    }

    #[test]
    fn set_access_token_keeps_other_fields() {
        let session = store();
        session.save("old", "ref-1", "Ada", "Lovelace", "");
        session.set_access_token("new");

        assert_eq!(session.access_token().as_deref(), Some("new"));
        assert_eq!(session.refresh_token().as_deref(), Some("ref-1"));
        assert_eq!(session.full_name(), "Ada Lovelace");
    }

    #[test]
    fn clear_removes_everything() {
        let session = store();
        session.save("acc", "ref", "Ada", "Lovelace", "url");
        session.clear();

        assert!(!session.is_authenticated());
        assert!(session.refresh_token().is_none());
        assert_eq!(session.full_name(), "");
    }

    #[test]
    fn blank_access_token_is_not_authenticated() {
        let session = store();
        session.save("", "ref", "", "", "");
        assert!(!session.is_authenticated());
    }
}
