/// Persistent Store
///
/// The whole service state lives in one JSON document on disk. Every
/// operation works on the complete document:
/// - reads take the shared lock, load the file, release
/// - mutations take the exclusive lock, load, apply, write back, release
///
/// Writes go to a sibling temporary file that is renamed over the target, so
/// the file always holds either the previous snapshot or the new one.

mod models;

pub use models::{Chirp, ChirpId, Document, RefreshTokenRecord, Sequences, User, UserId};

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::error::StoreError;

/// Handle to the on-disk document. Clones share the same lock.
#[derive(Clone)]
pub struct Store {
    inner: Arc<Inner>,
}

struct Inner {
    path: PathBuf,
    lock: RwLock<()>,
}

impl Store {
    /// Open the store at `path`, creating an empty document if the file does
    /// not exist yet. An existing file must parse.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let store = Self {
            inner: Arc::new(Inner {
                path,
                lock: RwLock::new(()),
            }),
        };

        match fs::metadata(store.path()).await {
            Ok(_) => {
                store.load().await?;
                tracing::info!(path = %store.path().display(), "Opened existing store");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                store.save(&Document::default()).await?;
                tracing::info!(path = %store.path().display(), "Created empty store");
            }
            Err(e) => return Err(e.into()),
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Snapshot of the whole document.
    pub async fn load(&self) -> Result<Document, StoreError> {
        let _guard = self.inner.lock.read().await;
        self.read_document().await
    }

    /// Replace the whole document.
    pub async fn save(&self, document: &Document) -> Result<(), StoreError> {
        let _guard = self.inner.lock.write().await;
        self.write_document(document).await
    }

    // ===== Users =====

    pub async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let email = email.to_string();
        let password_hash = password_hash.to_string();

        self.mutate("create_user", move |doc| {
            if doc.user_by_email(&email).is_some() {
                return Err(StoreError::DuplicateEmail);
            }
            let user = User {
                id: doc.next_user_id(),
                email,
                password_hash,
                is_chirpy_red: false,
            };
            doc.users.insert(user.id, user.clone());
            Ok(user)
        })
        .await
    }

    pub async fn update_user(
        &self,
        id: UserId,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let email = email.to_string();
        let password_hash = password_hash.to_string();

        self.mutate("update_user", move |doc| {
            if doc.user_by_email(&email).is_some_and(|other| other.id != id) {
                return Err(StoreError::DuplicateEmail);
            }
            let user = doc
                .users
                .get_mut(&id)
                .ok_or_else(|| user_not_found(id))?;
            user.email = email;
            user.password_hash = password_hash;
            Ok(user.clone())
        })
        .await
    }

    /// Set the Chirpy Red flag on a user.
    pub async fn upgrade_user(&self, id: UserId) -> Result<User, StoreError> {
        self.mutate("upgrade_user", move |doc| {
            let user = doc
                .users
                .get_mut(&id)
                .ok_or_else(|| user_not_found(id))?;
            user.is_chirpy_red = true;
            Ok(user.clone())
        })
        .await
    }

    /// Remove a user. Their chirps stay behind with a dangling author id.
    pub async fn delete_user(&self, id: UserId) -> Result<(), StoreError> {
        self.mutate("delete_user", move |doc| {
            doc.users
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| user_not_found(id))
        })
        .await
    }

    pub async fn get_user(&self, id: UserId) -> Result<User, StoreError> {
        self.read(|doc| doc.users.get(&id).cloned().ok_or_else(|| user_not_found(id)))
            .await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        self.read(|doc| {
            doc.user_by_email(email)
                .cloned()
                .ok_or_else(|| StoreError::NotFound("user with that email".to_string()))
        })
        .await
    }

    // ===== Chirps =====

    pub async fn create_chirp(&self, author_id: UserId, body: &str) -> Result<Chirp, StoreError> {
        let body = body.to_string();

        self.mutate("create_chirp", move |doc| {
            let chirp = Chirp {
                id: doc.next_chirp_id(),
                author_id,
                body,
            };
            doc.chirps.insert(chirp.id, chirp.clone());
            Ok(chirp)
        })
        .await
    }

    pub async fn get_chirp(&self, id: ChirpId) -> Result<Chirp, StoreError> {
        self.read(|doc| doc.chirps.get(&id).cloned().ok_or_else(|| chirp_not_found(id)))
            .await
    }

    /// All chirps in ascending id order, optionally limited to one author.
    pub async fn list_chirps(&self, author_id: Option<UserId>) -> Result<Vec<Chirp>, StoreError> {
        self.read(|doc| {
            Ok(doc
                .chirps
                .values()
                .filter(|chirp| author_id.map_or(true, |author| chirp.author_id == author))
                .cloned()
                .collect())
        })
        .await
    }

    /// Delete a chirp on behalf of `requester`. The authorship check and the
    /// delete happen under the same exclusive lock.
    pub async fn delete_chirp(&self, id: ChirpId, requester: UserId) -> Result<(), StoreError> {
        self.mutate("delete_chirp", move |doc| {
            let chirp = doc.chirps.get(&id).ok_or_else(|| chirp_not_found(id))?;
            if chirp.author_id != requester {
                return Err(StoreError::NotAuthor);
            }
            doc.chirps.remove(&id);
            Ok(())
        })
        .await
    }

    // ===== Refresh tokens =====

    /// Record a freshly issued refresh token as not revoked.
    pub async fn add_refresh_token(&self, token: &str) -> Result<(), StoreError> {
        let token = token.to_string();
        self.mutate("add_refresh_token", move |doc| {
            doc.refresh_tokens.insert(token, RefreshTokenRecord::default());
            Ok(())
        })
        .await
    }

    /// Mark a refresh token revoked. Unknown tokens get a revoked record too.
    pub async fn revoke_refresh_token(&self, token: &str) -> Result<(), StoreError> {
        let token = token.to_string();
        self.mutate("revoke_refresh_token", move |doc| {
            let record = doc.refresh_tokens.entry(token).or_default();
            if !record.revoked {
                record.revoked = true;
                record.revoked_at = Some(Utc::now());
            }
            Ok(())
        })
        .await
    }

    /// Whether a refresh token has been revoked. A token with no record is
    /// reported as not revoked.
    pub async fn is_refresh_token_revoked(&self, token: &str) -> Result<bool, StoreError> {
        self.read(|doc| {
            Ok(doc
                .refresh_tokens
                .get(token)
                .is_some_and(|record| record.revoked))
        })
        .await
    }

    // ===== Internals =====

    async fn read<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Document) -> Result<T, StoreError>,
    {
        let document = self.load().await?;
        f(&document)
    }

    async fn mutate<T, F>(&self, operation: &'static str, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Document) -> Result<T, StoreError>,
    {
        let _guard = self.inner.lock.write().await;
        let mut document = self.read_document().await?;
        let output = f(&mut document)?;
        self.write_document(&document).await?;
        tracing::debug!(operation, "Store document written");
        Ok(output)
    }

    /// Caller must hold the lock.
    async fn read_document(&self) -> Result<Document, StoreError> {
        let bytes = fs::read(self.path()).await?;
        let mut document: Document = serde_json::from_slice(&bytes)?;
        document.reconcile_sequences();
        Ok(document)
    }

    /// Caller must hold the write lock. On failure the temporary file is
    /// removed and the previous document is left in place.
    async fn write_document(&self, document: &Document) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(document)?;
        let tmp = self.tmp_path();

        let result = self.replace_with(&tmp, &bytes).await;
        if result.is_err() {
            let _ = fs::remove_file(&tmp).await;
        }
        result
    }

    async fn replace_with(&self, tmp: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        let mut file = fs::File::create(tmp).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(tmp, std::fs::Permissions::from_mode(0o600)).await?;
        }
        fs::rename(tmp, self.path()).await?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path()
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("store"));
        name.push(".tmp");
        self.path().with_file_name(name)
    }
}

fn user_not_found(id: UserId) -> StoreError {
    StoreError::NotFound(format!("user {}", id))
}

fn chirp_not_found(id: ChirpId) -> StoreError {
    StoreError::NotFound(format!("chirp {}", id))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::path::PathBuf;

    use super::Store;

    /// Store backed by a uniquely named file in the temp dir, removed on drop.
    pub(crate) struct TempStore {
        pub store: Store,
        pub path: PathBuf,
    }

    impl Drop for TempStore {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.path);
        }
    }

    pub(crate) async fn temp_store() -> TempStore {
        let path = std::env::temp_dir().join(format!("chirpy-store-{}.json", uuid::Uuid::new_v4()));
        let store = Store::open(&path).await.expect("Failed to open store");
        TempStore { store, path }
    }
}
