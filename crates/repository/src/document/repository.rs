//! MongoDB-backed repository.

use async_trait::async_trait;
use mongodb::bson::{self, doc, Bson, Document};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use common::{OptionExt, RepoResult, RepositoryError};
use domain::{EntityDataMapper, Filter, ItemList};

use super::collection::DocumentCollection;
use super::query::{criteria_document, DocumentComposer};
use crate::compose::compose;
use crate::contract::{Criteria, Repository, UpdateOutcome};

/// Repository over one document collection.
///
/// Store entities are (de)serialized with serde; `_id` is their identity.
pub struct DocumentRepository<C, M> {
    collection: C,
    mapper: M,
    search_fields: Vec<String>,
    scope: Option<Document>,
}

impl<C, M> DocumentRepository<C, M>
where
    C: DocumentCollection,
    M: EntityDataMapper,
    M::Store: Serialize + DeserializeOwned,
{
    pub fn new(collection: C, mapper: M) -> Self {
        Self {
            collection,
            mapper,
            search_fields: Vec::new(),
            scope: None,
        }
    }

    /// Dotted field paths matched by the filter's search term.
    pub fn with_search_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_scope(mut self, scope: Document) -> Self {
        self.scope = Some(scope);
        self
    }

    fn predicate(&self, filter: &Filter) -> Document {
        compose(&DocumentComposer, self.scope.clone(), filter, &self.search_fields)
            .unwrap_or_default()
    }

    fn scoped(&self, filter: Document) -> Document {
        match &self.scope {
            Some(scope) if !scope.is_empty() => doc! { "$and": [scope.clone(), filter] },
            _ => filter,
        }
    }

    fn decode(&self, document: Document) -> RepoResult<M::Domain> {
        let entity = bson::from_document::<M::Store>(document)
            .map_err(RepositoryError::serialization)?;
        Ok(self.mapper.to_domain(entity))
    }

    fn decode_many(&self, documents: Vec<Document>) -> RepoResult<Vec<M::Domain>> {
        documents.into_iter().map(|doc| self.decode(doc)).collect()
    }

    fn encode(&self, entity: M::Domain) -> RepoResult<Document> {
        bson::to_document(&self.mapper.to_dao_entity(entity)).map_err(RepositoryError::serialization)
    }
}

#[async_trait]
impl<C, M> Repository for DocumentRepository<C, M>
where
    C: DocumentCollection,
    M: EntityDataMapper,
    M::Store: Serialize + DeserializeOwned,
    M::Domain: Clone + Send + Sync + 'static,
{
    type Entity = M::Domain;
    type Id = Bson;
    type Predicate = Document;

    async fn get_all(&self, filter: &Filter) -> RepoResult<ItemList<M::Domain>> {
        let predicate = self.predicate(filter);
        let total = self.collection.count_matching(predicate.clone()).await?;
        let documents = self
            .collection
            .find_many(predicate, Some(filter.window()))
            .await?;

        Ok(ItemList::new(self.decode_many(documents)?, total))
    }

    async fn find_all(&self, filter: &Filter) -> RepoResult<Vec<M::Domain>> {
        let documents = self
            .collection
            .find_many(self.predicate(filter), None)
            .await?;
        self.decode_many(documents)
    }

    async fn find_where(&self, predicate: Document) -> RepoResult<Vec<M::Domain>> {
        let documents = self
            .collection
            .find_many(self.scoped(predicate), None)
            .await?;
        self.decode_many(documents)
    }

    async fn get_one_by_id(&self, id: Bson) -> RepoResult<M::Domain> {
        let document = self
            .collection
            .find_first(self.scoped(doc! { "_id": id }))
            .await?
            .ok_or_not_found()?;
        self.decode(document)
    }

    async fn create(&self, entity: M::Domain) -> RepoResult<M::Domain> {
        let mut document = self.encode(entity)?;
        if document.get("_id") == Some(&Bson::Null) {
            document.remove("_id");
        }

        let id = self.collection.insert(document.clone()).await?;
        if !document.contains_key("_id") {
            document.insert("_id", id);
        }
        self.decode(document)
    }

    async fn update(
        &self,
        entity: M::Domain,
        conditions: Option<Criteria<Bson, Document>>,
    ) -> RepoResult<UpdateOutcome<M::Domain>> {
        let mut document = self.encode(entity)?;
        let id = document.remove("_id").filter(|id| *id != Bson::Null);

        let filter = match (conditions, id) {
            (Some(criteria), _) => criteria_document(criteria),
            (None, Some(id)) => doc! { "_id": id },
            (None, None) => {
                return Err(RepositoryError::invalid_criteria(
                    "document has no _id to match",
                ))
            }
        };

        let modified = self
            .collection
            .update_matching(self.scoped(filter), doc! { "$set": document })
            .await?;

        Ok(UpdateOutcome::Modified(modified > 0))
    }

    async fn delete(&self, conditions: Criteria<Bson, Document>) -> bool {
        let filter = self.scoped(criteria_document(conditions));
        match self.collection.delete_matching(filter).await {
            Ok(_) => true,
            Err(err) => {
                warn!(collection = %self.collection.name(), error = %err, "Delete failed");
                false
            }
        }
    }
}
