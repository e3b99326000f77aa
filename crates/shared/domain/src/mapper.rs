//! Conversion between domain entities and their persisted shape.

use std::marker::PhantomData;

/// Bidirectional converter between a domain entity and its store entity.
///
/// Both directions are pure and total. Batch variants preserve order.
pub trait EntityDataMapper: Send + Sync {
    type Domain;
    type Store;

    /// Convert a store entity into a domain entity
    fn to_domain(&self, entity: Self::Store) -> Self::Domain;

    /// Convert a domain entity into a store entity
    fn to_dao_entity(&self, domain: Self::Domain) -> Self::Store;

    fn to_domain_many(&self, entities: Vec<Self::Store>) -> Vec<Self::Domain> {
        entities.into_iter().map(|e| self.to_domain(e)).collect()
    }

    fn to_dao_entity_many(&self, domains: Vec<Self::Domain>) -> Vec<Self::Store> {
        domains.into_iter().map(|d| self.to_dao_entity(d)).collect()
    }
}

/// Mapper for entity pairs that already convert into each other with `From`.
pub struct ConvertMapper<D, S> {
    _types: PhantomData<fn() -> (D, S)>,
}

impl<D, S> ConvertMapper<D, S> {
    pub fn new() -> Self {
        Self {
            _types: PhantomData,
        }
    }
}

impl<D, S> Default for ConvertMapper<D, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D, S> Clone for ConvertMapper<D, S> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<D, S> EntityDataMapper for ConvertMapper<D, S>
where
    D: From<S>,
    S: From<D>,
{
    type Domain = D;
    type Store = S;

    fn to_domain(&self, entity: S) -> D {
        D::from(entity)
    }

    fn to_dao_entity(&self, domain: D) -> S {
        S::from(domain)
    }
}

/// Mapper for entities stored in their domain shape.
pub struct IdentityMapper<T> {
    _type: PhantomData<fn() -> T>,
}

impl<T> IdentityMapper<T> {
    pub fn new() -> Self {
        Self { _type: PhantomData }
    }
}

impl<T> Default for IdentityMapper<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EntityDataMapper for IdentityMapper<T> {
    type Domain = T;
    type Store = T;

    fn to_domain(&self, entity: T) -> T {
        entity
    }

    fn to_dao_entity(&self, domain: T) -> T {
        domain
    }
}
