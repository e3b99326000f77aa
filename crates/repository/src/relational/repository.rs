//! SeaORM-backed repository.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QuerySelect, Select,
};
use tracing::{debug, warn};

use common::{OptionExt, RepoResult, RepositoryError};
use domain::{EntityDataMapper, ErrorFactory, Filter, ItemList};

use super::decode::store_failure;
use super::query::{
    clear_primary_key, clear_unassigned_key, criteria_condition, identity_condition,
    mark_all_set, PrimaryKeyValue, SearchOperator, SqlComposer,
};
use crate::compose::compose;
use crate::contract::{Criteria, Repository, UpdateOutcome};

type QueryShape<E> = Arc<dyn Fn(Select<E>) -> Select<E> + Send + Sync>;

/// Repository over one SeaORM entity.
///
/// An optional scope condition is AND-ed onto every read, update and delete.
/// An optional query shape (joins, extra selects) is applied to every list read,
/// counts included.
pub struct RelationalRepository<E, A, M>
where
    E: EntityTrait,
{
    db: DatabaseConnection,
    mapper: M,
    search_fields: Vec<String>,
    composer: SqlComposer,
    scope: Option<Condition>,
    shape: Option<QueryShape<E>>,
    _entity: PhantomData<fn() -> (E, A)>,
}

impl<E, A, M> RelationalRepository<E, A, M>
where
    E: EntityTrait,
{
    pub fn new(db: DatabaseConnection, mapper: M) -> Self {
        Self {
            db,
            mapper,
            search_fields: Vec::new(),
            composer: SqlComposer::new(),
            scope: None,
            shape: None,
            _entity: PhantomData,
        }
    }

    /// Column paths matched by the filter's search term.
    pub fn with_search_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Operator joining the search clauses. Defaults to `OR`.
    pub fn with_search_operator(mut self, operator: SearchOperator) -> Self {
        self.composer = self.composer.with_operator(operator);
        self
    }

    /// Raw SQL clauses added to the search alongside the field matches.
    pub fn with_search_literals<I, S>(mut self, literals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.composer = self.composer.with_literals(literals);
        self
    }

    pub fn with_scope(mut self, scope: Condition) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Shape list queries before filtering, e.g. to join tables named by search paths.
    pub fn with_query<F>(mut self, shape: F) -> Self
    where
        F: Fn(Select<E>) -> Select<E> + Send + Sync + 'static,
    {
        self.shape = Some(Arc::new(shape));
        self
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn into_connection(self) -> DatabaseConnection {
        self.db
    }

    fn table(&self) -> String {
        E::default().table_name().to_string()
    }

    fn select(&self) -> Select<E> {
        match &self.shape {
            Some(shape) => shape(E::find()),
            None => E::find(),
        }
    }

    fn scoped(&self, cond: Condition) -> Condition {
        match &self.scope {
            Some(scope) => Condition::all().add(scope.clone()).add(cond),
            None => cond,
        }
    }

    fn predicate(&self, filter: &Filter) -> Condition {
        compose(&self.composer, self.scope.clone(), filter, &self.search_fields)
            .unwrap_or_else(Condition::all)
    }

    fn translate(&self, err: DbErr) -> RepositoryError {
        let table = self.table();
        let failure = store_failure(&err, &table);
        match ErrorFactory::from_store_failure(&failure) {
            Ok(domain) => {
                debug!(table = %table, code = domain.code(), "Translated store failure");
                domain.into()
            }
            Err(_) => {
                debug!(table = %table, failure = failure.name(), "Store failure left untranslated");
                err.into()
            }
        }
    }
}

#[async_trait]
impl<E, A, M> Repository for RelationalRepository<E, A, M>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<A> + Send + Sync,
    A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + Sync + 'static,
    M: EntityDataMapper<Store = E::Model>,
    M::Domain: Clone + Send + Sync + 'static,
    PrimaryKeyValue<E>: Sync + 'static,
{
    type Entity = M::Domain;
    type Id = PrimaryKeyValue<E>;
    type Predicate = Condition;

    async fn get_all(&self, filter: &Filter) -> RepoResult<ItemList<M::Domain>> {
        let select = self.select().filter(self.predicate(filter));
        let total = select.clone().count(&self.db).await?;

        let window = filter.window();
        let models = select
            .offset(window.offset)
            .limit(window.limit)
            .all(&self.db)
            .await?;

        Ok(ItemList::new(self.mapper.to_domain_many(models), total))
    }

    async fn find_all(&self, filter: &Filter) -> RepoResult<Vec<M::Domain>> {
        let models = self
            .select()
            .filter(self.predicate(filter))
            .all(&self.db)
            .await?;

        Ok(self.mapper.to_domain_many(models))
    }

    async fn find_where(&self, predicate: Condition) -> RepoResult<Vec<M::Domain>> {
        let models = self
            .select()
            .filter(self.scoped(predicate))
            .all(&self.db)
            .await?;

        Ok(self.mapper.to_domain_many(models))
    }

    async fn get_one_by_id(&self, id: PrimaryKeyValue<E>) -> RepoResult<M::Domain> {
        let mut select = E::find_by_id(id);
        if let Some(scope) = &self.scope {
            select = select.filter(scope.clone());
        }

        let model = select.one(&self.db).await?.ok_or_not_found()?;
        Ok(self.mapper.to_domain(model))
    }

    async fn create(&self, entity: M::Domain) -> RepoResult<M::Domain> {
        let active = mark_all_set(self.mapper.to_dao_entity(entity).into_active_model());

        let model = clear_unassigned_key(active)
            .insert(&self.db)
            .await
            .map_err(|err| self.translate(err))?;

        Ok(self.mapper.to_domain(model))
    }

    async fn update(
        &self,
        entity: M::Domain,
        conditions: Option<Criteria<PrimaryKeyValue<E>, Condition>>,
    ) -> RepoResult<UpdateOutcome<M::Domain>> {
        let active = mark_all_set(self.mapper.to_dao_entity(entity).into_active_model());
        let cond = match conditions {
            Some(criteria) => criteria_condition::<E>(criteria)?,
            None => identity_condition(&active)?,
        };

        let result = E::update_many()
            .set(clear_primary_key(active))
            .filter(self.scoped(cond))
            .exec(&self.db)
            .await
            .map_err(|err| self.translate(err))?;

        Ok(UpdateOutcome::Modified(result.rows_affected > 0))
    }

    async fn delete(&self, conditions: Criteria<PrimaryKeyValue<E>, Condition>) -> bool {
        let cond = match criteria_condition::<E>(conditions) {
            Ok(cond) => cond,
            Err(err) => {
                warn!(table = %self.table(), error = %err, "Delete criteria rejected");
                return false;
            }
        };

        match E::delete_many()
            .filter(self.scoped(cond))
            .exec(&self.db)
            .await
        {
            Ok(result) => {
                debug!(table = %self.table(), rows = result.rows_affected, "Deleted rows");
                true
            }
            Err(err) => {
                warn!(table = %self.table(), error = %err, "Delete failed");
                false
            }
        }
    }
}
