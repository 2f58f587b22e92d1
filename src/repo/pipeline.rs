use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{Entity, Id, RepoError, Repository};

/// Middleware run by [`Repo`] on every write, after schema validation and
/// before the payload reaches storage.
#[async_trait]
pub trait WriteHook<E: Entity>: Send + Sync {
    async fn before_create(&self, _new: &mut E::New) -> Result<(), RepoError> {
        Ok(())
    }

    async fn before_update(&self, _patch: &mut E::Patch) -> Result<(), RepoError> {
        Ok(())
    }
}

/// A storage backend wrapped in the write pipeline.
///
/// Reads go straight to the store. Writes are validated against
/// `E::SCHEMA`, passed through each hook in registration order, then stored.
/// A failing step aborts the write.
pub struct Repo<E: Entity, S: ?Sized> {
    store: Arc<S>,
    hooks: Vec<Arc<dyn WriteHook<E>>>,
}

impl<E, S> Repo<E, S>
where
    E: Entity,
    S: Repository<E> + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            hooks: Vec::new(),
        }
    }

    pub fn with_hook(mut self, hook: impl WriteHook<E> + 'static) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Raw store access for entity-specific reads.
    pub fn store(&self) -> &S {
        &self.store
    }
}

#[async_trait]
impl<E, S> Repository<E> for Repo<E, S>
where
    E: Entity,
    S: Repository<E> + ?Sized + 'static,
{
    async fn find_all(&self) -> Result<Vec<E>, RepoError> {
        self.store.find_all().await
    }

    async fn find_by_id(&self, id: Id) -> Result<Option<E>, RepoError> {
        self.store.find_by_id(id).await
    }

    async fn create(&self, mut new: E::New) -> Result<E, RepoError> {
        E::validate_new(&new)?;
        debug!(table = E::SCHEMA.table, hooks = self.hooks.len(), "create");
        for hook in &self.hooks {
            hook.before_create(&mut new).await?;
        }
        self.store.create(new).await
    }

    async fn update(&self, id: Id, mut patch: E::Patch) -> Result<Option<E>, RepoError> {
        E::validate_patch(&patch)?;
        debug!(table = E::SCHEMA.table, id, hooks = self.hooks.len(), "update");
        for hook in &self.hooks {
            hook.before_update(&mut patch).await?;
        }
        self.store.update(id, patch).await
    }

    async fn destroy(&self, id: Id) -> Result<u64, RepoError> {
        self.store.destroy(id).await
    }
}
