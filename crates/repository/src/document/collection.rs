//! Document collection seam.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document};
use mongodb::Collection;

use common::RepoResult;
use domain::PageWindow;

use super::decode::translate;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// The collection operations a document repository needs.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    /// Collection name, used to label translated errors
    fn name(&self) -> String;

    async fn count_matching(&self, filter: Document) -> RepoResult<u64>;

    async fn find_many(
        &self,
        filter: Document,
        window: Option<PageWindow>,
    ) -> RepoResult<Vec<Document>>;

    async fn find_first(&self, filter: Document) -> RepoResult<Option<Document>>;

    /// Insert a document, returning its `_id`
    async fn insert(&self, document: Document) -> RepoResult<Bson>;

    /// Apply `update` to every match, returning the modified count
    async fn update_matching(&self, filter: Document, update: Document) -> RepoResult<u64>;

    /// Delete every match, returning the deleted count
    async fn delete_matching(&self, filter: Document) -> RepoResult<u64>;
}

#[async_trait]
impl DocumentCollection for Collection<Document> {
    fn name(&self) -> String {
        Collection::name(self).to_string()
    }

    async fn count_matching(&self, filter: Document) -> RepoResult<u64> {
        Ok(self.count_documents(filter).await?)
    }

    async fn find_many(
        &self,
        filter: Document,
        window: Option<PageWindow>,
    ) -> RepoResult<Vec<Document>> {
        let mut find = self.find(filter);
        if let Some(window) = window {
            let limit = i64::try_from(window.limit).unwrap_or(i64::MAX);
            find = find.skip(window.offset).limit(limit);
        }

        let cursor = find.await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_first(&self, filter: Document) -> RepoResult<Option<Document>> {
        Ok(self.find_one(filter).await?)
    }

    async fn insert(&self, document: Document) -> RepoResult<Bson> {
        let result = self
            .insert_one(document)
            .await
            .map_err(|err| translate(err, Collection::name(self)))?;

        Ok(result.inserted_id)
    }

    async fn update_matching(&self, filter: Document, update: Document) -> RepoResult<u64> {
        let result = self
            .update_many(filter, update)
            .await
            .map_err(|err| translate(err, Collection::name(self)))?;

        Ok(result.modified_count)
    }

    async fn delete_matching(&self, filter: Document) -> RepoResult<u64> {
        let result = self.delete_many(filter).await?;
        Ok(result.deleted_count)
    }
}
