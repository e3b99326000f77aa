//! Redis-backed key-value repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use common::{CacheConfig, RepoResult, RepositoryError};
use domain::{
    translate_details, DetailType, DomainError, EntityDataMapper, ErrorKind, Filter, ItemList,
    KeyValueCollection, DEFAULT_KEY_EXPIRATION_SECONDS, KEY_PREFIX_SEPARATOR,
    TRANSLATED_ERROR_CODE,
};

use super::store::KeyValueStore;
use crate::contract::{Criteria, Repository, UpdateOutcome};

/// Repository storing JSON values under prefixed keys.
///
/// Identifiers and predicates are key patterns; every entry expires no later
/// than the default expiration.
pub struct KeyValueRepository<K, M> {
    store: K,
    mapper: M,
    key_prefix: String,
    default_expiration_seconds: u64,
}

impl<K, M> KeyValueRepository<K, M>
where
    K: KeyValueStore,
    M: EntityDataMapper,
    M::Store: Serialize + DeserializeOwned,
{
    pub fn new(store: K, mapper: M, key_prefix: impl Into<String>) -> Self {
        Self {
            store,
            mapper,
            key_prefix: key_prefix.into(),
            default_expiration_seconds: DEFAULT_KEY_EXPIRATION_SECONDS,
        }
    }

    pub fn from_config(store: K, mapper: M, config: &CacheConfig) -> Self {
        Self::new(store, mapper, config.key_prefix.clone())
            .with_default_expiration(config.default_expiration_seconds)
    }

    pub fn with_default_expiration(mut self, seconds: u64) -> Self {
        self.default_expiration_seconds = seconds;
        self
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    /// Lifetime of an entry written at `now`, capped by the default expiration.
    /// Already elapsed expirations are written as one second.
    pub fn seconds_to_expire(&self, expiration: Option<DateTime<Utc>>, now: DateTime<Utc>) -> u64 {
        let ceiling = self.default_expiration_seconds.max(1);
        match expiration {
            Some(at) => {
                let remaining = at.signed_duration_since(now).num_seconds().max(1);
                u64::try_from(remaining).map_or(ceiling, |seconds| seconds.min(ceiling))
            }
            None => ceiling,
        }
    }

    fn prefixed(&self, key: &str) -> String {
        format!("{}{}{}", self.key_prefix, KEY_PREFIX_SEPARATOR, key)
    }

    fn list_pattern(&self, filter: &Filter) -> String {
        match filter.query() {
            Some(query) => format!("{}*{}*", self.prefixed(""), query),
            None => format!("{}*", self.prefixed("")),
        }
    }

    async fn sorted_keys(&self, pattern: &str) -> RepoResult<Vec<String>> {
        let mut keys = self.store.matching_keys(pattern).await?;
        keys.sort();
        Ok(keys)
    }

    async fn load(&self, key: String) -> RepoResult<KeyValueCollection<M::Domain>> {
        let collection = match self.store.read(&key).await? {
            Some(json) => {
                let value = serde_json::from_str::<M::Store>(&json)
                    .map_err(RepositoryError::serialization)?;
                KeyValueCollection::new(key).with_value(self.mapper.to_domain(value))
            }
            None => KeyValueCollection::new(key),
        };
        Ok(collection)
    }

    async fn load_many(&self, keys: Vec<String>) -> RepoResult<Vec<KeyValueCollection<M::Domain>>> {
        let mut collections = Vec::with_capacity(keys.len());
        for key in keys {
            collections.push(self.load(key).await?);
        }
        Ok(collections)
    }
}

fn missing_value() -> RepositoryError {
    DomainError::builder(ErrorKind::InvalidData)
        .code(TRANSLATED_ERROR_CODE)
        .details(translate_details([DetailType::Required.field("value")]))
        .build()
        .into()
}

#[async_trait]
impl<K, M> Repository for KeyValueRepository<K, M>
where
    K: KeyValueStore,
    M: EntityDataMapper,
    M::Store: Serialize + DeserializeOwned,
    M::Domain: Clone + Send + Sync + 'static,
{
    type Entity = KeyValueCollection<M::Domain>;
    type Id = String;
    type Predicate = String;

    async fn get_all(&self, filter: &Filter) -> RepoResult<ItemList<Self::Entity>> {
        let keys = self.sorted_keys(&self.list_pattern(filter)).await?;
        let total = keys.len() as u64;
        let page = filter.window().slice(&keys);

        Ok(ItemList::new(self.load_many(page).await?, total))
    }

    async fn find_all(&self, filter: &Filter) -> RepoResult<Vec<Self::Entity>> {
        let keys = self.sorted_keys(&self.list_pattern(filter)).await?;
        self.load_many(keys).await
    }

    async fn find_where(&self, pattern: String) -> RepoResult<Vec<Self::Entity>> {
        let keys = self.sorted_keys(&pattern).await?;
        self.load_many(keys).await
    }

    async fn get_one_by_id(&self, id: String) -> RepoResult<Self::Entity> {
        let pattern = format!("*{}*", id);
        let mut keys = self.store.matching_keys(&pattern).await?;

        match keys.len() {
            0 => Err(DomainError::data_not_found().into()),
            1 => {
                let key = keys.remove(0);
                let collection = self.load(key).await?;
                if collection.value().is_none() {
                    // Expired between the key listing and the read
                    return Err(DomainError::data_not_found().into());
                }
                Ok(collection)
            }
            _ => Err(DomainError::many_records_found(&pattern).into()),
        }
    }

    async fn create(&self, entity: Self::Entity) -> RepoResult<Self::Entity> {
        let value = entity.value().cloned().ok_or_else(missing_value)?;
        let json = serde_json::to_string(&self.mapper.to_dao_entity(value))
            .map_err(RepositoryError::serialization)?;

        let key = self.prefixed(entity.key());
        let seconds = self.seconds_to_expire(entity.expiration(), Utc::now());
        self.store.write_with_expiry(&key, json, seconds).await?;

        debug!(key = %key, seconds, "Stored key-value entry");
        Ok(entity)
    }

    async fn update(
        &self,
        entity: Self::Entity,
        _conditions: Option<Criteria<String, String>>,
    ) -> RepoResult<UpdateOutcome<Self::Entity>> {
        Ok(UpdateOutcome::Entity(self.create(entity).await?))
    }

    async fn create_or_update(
        &self,
        entity: Self::Entity,
        _conditions: Option<Criteria<String, String>>,
    ) -> RepoResult<UpdateOutcome<Self::Entity>> {
        Ok(UpdateOutcome::Entity(self.create(entity).await?))
    }

    async fn delete(&self, conditions: Criteria<String, String>) -> bool {
        let patterns = match conditions {
            Criteria::Id(pattern) | Criteria::Where(pattern) => vec![pattern],
            Criteria::Ids(patterns) => patterns,
            Criteria::Between(..) => {
                warn!("Range criteria are not supported by key patterns");
                return false;
            }
        };

        let mut keys = Vec::new();
        for pattern in &patterns {
            match self.store.matching_keys(pattern).await {
                Ok(found) => keys.extend(found),
                Err(err) => {
                    warn!(pattern = %pattern, error = %err, "Key lookup failed");
                    return false;
                }
            }
        }

        match self.store.remove(keys).await {
            Ok(removed) => {
                debug!(removed, "Deleted key-value entries");
                true
            }
            Err(err) => {
                warn!(error = %err, "Delete failed");
                false
            }
        }
    }
}
