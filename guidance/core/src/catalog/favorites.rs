//! Favorites
//!
//! Per-user bookmarks over catalog records. The store only keeps references
//! (kind + id); records themselves always come from the catalog.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::{CatalogKind, CatalogProvider};

/// Identifies a portal user
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user id
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A bookmarked catalog record
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FavoriteRef {
    /// Collection the record lives in
    pub kind: CatalogKind,
    /// Record id
    pub id: String,
}

impl FavoriteRef {
    /// Create a reference
    pub fn new(kind: CatalogKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

/// Errors from the favorites store
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FavoriteError {
    /// The referenced record is not in the catalog
    #[error("no {} with id {:?} in the catalog", .0.kind, .0.id)]
    UnknownItem(FavoriteRef),
}

/// Per-user favorites
pub trait FavoriteStore: Send + Sync {
    /// Bookmark a record; returns `false` if it already was
    ///
    /// # Errors
    ///
    /// Returns [`FavoriteError::UnknownItem`] if the catalog has no such record.
    fn add(&self, user: UserId, item: FavoriteRef) -> Result<bool, FavoriteError>;

    /// Remove a bookmark; returns `false` if it was not set
    fn remove(&self, user: UserId, item: &FavoriteRef) -> bool;

    /// Whether the record is bookmarked
    fn contains(&self, user: UserId, item: &FavoriteRef) -> bool;

    /// All bookmarks of a user, ordered by kind then id
    fn list(&self, user: UserId) -> Vec<FavoriteRef>;

    /// Flip a bookmark; returns whether it is now set
    ///
    /// # Errors
    ///
    /// Returns [`FavoriteError::UnknownItem`] when adding an unknown record.
    fn toggle(&self, user: UserId, item: FavoriteRef) -> Result<bool, FavoriteError> {
        if self.remove(user, &item) {
            Ok(false)
        } else {
            self.add(user, item)
        }
    }
}

/// Favorites held in process memory
pub struct InMemoryFavorites {
    catalog: Arc<dyn CatalogProvider>,
    entries: RwLock<HashMap<UserId, BTreeSet<FavoriteRef>>>,
}

impl InMemoryFavorites {
    /// Create an empty store validating against `catalog`
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogProvider>) -> Self {
        Self {
            catalog,
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl FavoriteStore for InMemoryFavorites {
    fn add(&self, user: UserId, item: FavoriteRef) -> Result<bool, FavoriteError> {
        if !self.catalog.contains(item.kind, &item.id) {
            return Err(FavoriteError::UnknownItem(item));
        }
        Ok(self.entries.write().entry(user).or_default().insert(item))
    }

    fn remove(&self, user: UserId, item: &FavoriteRef) -> bool {
        let mut entries = self.entries.write();
        let Some(set) = entries.get_mut(&user) else {
            return false;
        };
        let removed = set.remove(item);
        if set.is_empty() {
            entries.remove(&user);
        }
        removed
    }

    fn contains(&self, user: UserId, item: &FavoriteRef) -> bool {
        self.entries
            .read()
            .get(&user)
            .is_some_and(|set| set.contains(item))
    }

    fn list(&self, user: UserId) -> Vec<FavoriteRef> {
        self.entries
            .read()
            .get(&user)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;

    fn store() -> InMemoryFavorites {
        InMemoryFavorites::new(Arc::new(StaticCatalog::builtin().unwrap()))
    }

    #[test]
    fn test_add_and_list() {
        let store = store();
        let user = UserId::new();
        assert!(store
            .add(user, FavoriteRef::new(CatalogKind::College, "nlsiu"))
            .unwrap());
        assert!(store
            .add(user, FavoriteRef::new(CatalogKind::Career, "lawyer"))
            .unwrap());
        // second add is a no-op
        assert!(!store
            .add(user, FavoriteRef::new(CatalogKind::Career, "lawyer"))
            .unwrap());

        assert_eq!(
            store.list(user),
            vec![
                FavoriteRef::new(CatalogKind::Career, "lawyer"),
                FavoriteRef::new(CatalogKind::College, "nlsiu"),
            ]
        );
    }

    #[test]
    fn test_users_are_isolated() {
        let store = store();
        let alice = UserId::new();
        let bob = UserId::new();
        let item = FavoriteRef::new(CatalogKind::Course, "cs50");
        store.add(alice, item.clone()).unwrap();
        assert!(store.contains(alice, &item));
        assert!(!store.contains(bob, &item));
        assert!(store.list(bob).is_empty());
    }

    #[test]
    fn test_toggle() {
        let store = store();
        let user = UserId::new();
        let item = FavoriteRef::new(CatalogKind::Wellbeing, "box-breathing");
        assert!(store.toggle(user, item.clone()).unwrap());
        assert!(!store.toggle(user, item.clone()).unwrap());
        assert!(!store.contains(user, &item));
    }

    #[test]
    fn test_unknown_item_is_rejected() {
        let store = store();
        let user = UserId::new();
        let err = store
            .add(user, FavoriteRef::new(CatalogKind::Scholarship, "nope"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "no scholarship with id \"nope\" in the catalog"
        );
        assert!(store.list(user).is_empty());
    }
}
