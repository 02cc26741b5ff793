//! In-memory collection cache kept in step with the database.
//!
//! A [`CachedCollection`] holds the last fetched list of one entity. Readers
//! get the cached list (loading it on first use); writers run their mutation
//! through [`CachedCollection::mutate`], which re-fetches the list once the
//! write succeeds. There is no partial patching: every refresh is a full
//! re-read.

use crate::{
    core::{product, provider},
    entities::{product as product_entity, provider as provider_entity},
    errors::Result,
};
use sea_orm::DatabaseConnection;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// An entity list that can be fetched as a whole.
pub trait Collection: Clone {
    /// Name used in log lines
    const NAME: &'static str;

    /// Primary key of one row
    fn id(&self) -> i64;

    /// Fetches the full list from the database.
    fn fetch_all(db: &DatabaseConnection) -> impl Future<Output = Result<Vec<Self>>>;
}

impl Collection for provider_entity::Model {
    const NAME: &'static str = "providers";

    fn id(&self) -> i64 {
        self.id
    }

    fn fetch_all(db: &DatabaseConnection) -> impl Future<Output = Result<Vec<Self>>> {
        provider::get_all_active_providers(db)
    }
}

impl Collection for product_entity::Model {
    const NAME: &'static str = "products";

    fn id(&self) -> i64 {
        self.id
    }

    fn fetch_all(db: &DatabaseConnection) -> impl Future<Output = Result<Vec<Self>>> {
        product::get_all_active_products(db)
    }
}

/// Last fetched snapshot of a [`Collection`].
#[derive(Debug)]
pub struct CachedCollection<T> {
    items: Arc<RwLock<Option<Vec<T>>>>,
}

impl<T> Clone for CachedCollection<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<T> Default for CachedCollection<T> {
    fn default() -> Self {
        Self {
            items: Arc::new(RwLock::new(None)),
        }
    }
}

impl<T: Collection> CachedCollection<T> {
    /// Creates an empty, not yet loaded cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-fetches the collection, returning the number of rows loaded.
    pub async fn refresh(&self, db: &DatabaseConnection) -> Result<usize> {
        let fresh = T::fetch_all(db).await?;
        let count = fresh.len();
        *self.items.write().await = Some(fresh);
        info!("Refreshed {} cache with {} items", T::NAME, count);
        Ok(count)
    }

    /// Returns the cached rows, fetching them on first use.
    pub async fn get_or_load(&self, db: &DatabaseConnection) -> Result<Vec<T>> {
        if let Some(items) = self.items.read().await.as_ref() {
            return Ok(items.clone());
        }
        self.refresh(db).await?;
        Ok(self.snapshot().await.unwrap_or_default())
    }

    /// Returns the cached rows without touching the database.
    pub async fn snapshot(&self) -> Option<Vec<T>> {
        self.items.read().await.clone()
    }

    /// Looks a row up by id, loading the collection if needed.
    pub async fn find_by_id(&self, db: &DatabaseConnection, id: i64) -> Result<Option<T>> {
        Ok(self
            .get_or_load(db)
            .await?
            .into_iter()
            .find(|item| item.id() == id))
    }

    /// Drops the cached rows so the next read fetches again.
    pub async fn invalidate(&self) {
        *self.items.write().await = None;
        debug!("Invalidated {} cache", T::NAME);
    }

    /// Runs a write and refreshes the collection after it succeeds.
    ///
    /// A failed write leaves the cache untouched.
    pub async fn mutate<R, F>(&self, db: &DatabaseConnection, write: F) -> Result<R>
    where
        F: Future<Output = Result<R>>,
    {
        let result = write.await?;
        self.refresh(db).await?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::provider::{create_provider, delete_provider};
    use crate::entities::ProviderModel;
    use crate::errors::Error;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_get_or_load_fetches_once() -> Result<()> {
        init_test_tracing();
        let db = setup_test_db().await?;
        create_test_provider(&db, "Lechera").await?;

        let cache: CachedCollection<ProviderModel> = CachedCollection::new();
        assert!(cache.snapshot().await.is_none());

        let loaded = cache.get_or_load(&db).await?;
        assert_eq!(loaded.len(), 1);

        // Written behind the cache's back: not visible until refresh
        create_test_provider(&db, "Envases").await?;
        assert_eq!(cache.get_or_load(&db).await?.len(), 1);

        assert_eq!(cache.refresh(&db).await?, 2);
        assert_eq!(cache.snapshot().await.unwrap().len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_mutate_refreshes_after_write() -> Result<()> {
        let db = setup_test_db().await?;
        let cache: CachedCollection<ProviderModel> = CachedCollection::new();
        cache.refresh(&db).await?;

        let created = cache
            .mutate(&db, create_provider(&db, provider_input("Quesos", "76.555.555-5")))
            .await?;
        assert_eq!(
            cache.find_by_id(&db, created.id).await?.map(|p| p.name),
            Some("Quesos".to_string())
        );

        cache.mutate(&db, delete_provider(&db, created.id)).await?;
        assert!(cache.find_by_id(&db, created.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_mutation_keeps_cache() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_provider(&db, "Lechera").await?;
        let cache: CachedCollection<ProviderModel> = CachedCollection::new();
        cache.refresh(&db).await?;

        let result = cache
            .mutate(&db, create_provider(&db, provider_input("", "1-9")))
            .await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert_eq!(cache.snapshot().await.unwrap().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalidate_and_shared_clones() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "Leche", "LC-1").await?;
        let cache: CachedCollection<crate::entities::ProductModel> = CachedCollection::new();
        let shared = cache.clone();

        assert_eq!(shared.find_by_id(&db, product.id).await?.unwrap().code, "LC-1");
        assert!(cache.snapshot().await.is_some());

        cache.invalidate().await;
        assert!(shared.snapshot().await.is_none());
        Ok(())
    }
}
