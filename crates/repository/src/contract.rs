//! The repository contract shared by every backend.

use async_trait::async_trait;
use tracing::debug;

use common::RepoResult;
use domain::{Filter, ItemList};

/// Row selection used by update and delete.
#[derive(Debug, Clone, PartialEq)]
pub enum Criteria<Id, P> {
    /// A single identifier
    Id(Id),
    /// Any of the given identifiers
    Ids(Vec<Id>),
    /// Identifiers within an inclusive range
    Between(Id, Id),
    /// A backend-native predicate
    Where(P),
}

/// Result of an update.
///
/// Backends that can tell whether a record changed report `Modified`;
/// backends that overwrite in place hand the stored entity back.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome<T> {
    Modified(bool),
    Entity(T),
}

impl<T> UpdateOutcome<T> {
    pub fn is_modified(&self) -> bool {
        match self {
            UpdateOutcome::Modified(modified) => *modified,
            UpdateOutcome::Entity(_) => true,
        }
    }

    pub fn into_entity(self) -> Option<T> {
        match self {
            UpdateOutcome::Entity(entity) => Some(entity),
            UpdateOutcome::Modified(_) => None,
        }
    }
}

/// Uniform data-access contract over a single entity type.
///
/// Every failure surfaces as a typed error; lookups that find nothing
/// return `DataNotFound` rather than an empty value.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Domain entity handed to and returned from callers
    type Entity: Clone + Send + Sync + 'static;
    /// Identifier accepted by `get_one_by_id` and `Criteria`
    type Id: Send + Sync + 'static;
    /// Backend-native predicate accepted by `find_where` and `Criteria::Where`
    type Predicate: Send + Sync + 'static;

    /// One page of entities matching the filter, with the total match count.
    async fn get_all(&self, filter: &Filter) -> RepoResult<ItemList<Self::Entity>>;

    /// Every entity matching the filter's search term, unpaginated.
    async fn find_all(&self, filter: &Filter) -> RepoResult<Vec<Self::Entity>>;

    /// Every entity matching a backend-native predicate.
    async fn find_where(&self, predicate: Self::Predicate) -> RepoResult<Vec<Self::Entity>>;

    async fn get_one_by_id(&self, id: Self::Id) -> RepoResult<Self::Entity>;

    async fn create(&self, entity: Self::Entity) -> RepoResult<Self::Entity>;

    /// Persist an entity. Backends without a separate save path create it.
    async fn save(&self, entity: Self::Entity) -> RepoResult<Self::Entity> {
        self.create(entity).await
    }

    /// Update records matching `conditions`, or the entity's own identity when absent.
    async fn update(
        &self,
        entity: Self::Entity,
        conditions: Option<Criteria<Self::Id, Self::Predicate>>,
    ) -> RepoResult<UpdateOutcome<Self::Entity>>;

    /// Create the entity, falling back to a single update when creation fails.
    async fn create_or_update(
        &self,
        entity: Self::Entity,
        conditions: Option<Criteria<Self::Id, Self::Predicate>>,
    ) -> RepoResult<UpdateOutcome<Self::Entity>> {
        match self.create(entity.clone()).await {
            Ok(created) => Ok(UpdateOutcome::Entity(created)),
            Err(err) => {
                debug!(error = %err, "Create failed, falling back to update");
                self.update(entity, conditions).await
            }
        }
    }

    /// Remove matching records. Store failures are logged and reported as `false`.
    async fn delete(&self, conditions: Criteria<Self::Id, Self::Predicate>) -> bool;
}
