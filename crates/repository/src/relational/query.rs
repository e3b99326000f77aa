//! Condition building for relational repositories.

use sea_orm::sea_query::{Alias, Expr, IntoValueTuple, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, EntityTrait, Iterable,
    PrimaryKeyToColumn, PrimaryKeyTrait, Value,
};

use common::{RepoResult, RepositoryError};

use crate::compose::Composer;
use crate::contract::Criteria;

/// Primary key value of an entity.
pub type PrimaryKeyValue<E> = <<E as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::ValueType;

/// Column expression for a dotted path (`column`, `table.column` or `schema.table.column`).
pub fn column_expr(path: &str) -> Expr {
    let segments: Vec<&str> = path.split('.').collect();

    match segments.as_slice() {
        [column] => Expr::col(Alias::new(*column)),
        [table, column] => Expr::col((Alias::new(*table), Alias::new(*column))),
        [.., schema, table, column] => Expr::col((
            Alias::new(*schema),
            Alias::new(*table),
            Alias::new(*column),
        )),
        [] => Expr::col(Alias::new(path)),
    }
}

/// How the clauses of a search are joined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchOperator {
    #[default]
    Or,
    And,
}

/// `LIKE` search over column paths, plus optional raw SQL clauses.
///
/// Literal clauses are joined with the same operator and only apply when a
/// search term is present.
#[derive(Debug, Clone, Default)]
pub struct SqlComposer {
    operator: SearchOperator,
    literals: Vec<String>,
}

impl SqlComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_operator(mut self, operator: SearchOperator) -> Self {
        self.operator = operator;
        self
    }

    pub fn with_literals<I, S>(mut self, literals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.literals = literals.into_iter().map(Into::into).collect();
        self
    }
}

impl Composer for SqlComposer {
    type Predicate = Condition;

    fn search(&self, fields: &[String], term: &str) -> Option<Condition> {
        if fields.is_empty() {
            return None;
        }

        let pattern = like_pattern(term);
        let clause = match self.operator {
            SearchOperator::Or => Condition::any(),
            SearchOperator::And => Condition::all(),
        };
        let clause = fields.iter().fold(clause, |cond, field| {
            cond.add(column_expr(field).like(LikeExpr::new(pattern.as_str()).escape(LIKE_ESCAPE)))
        });
        let clause = self.literals.iter().fold(clause, |cond, literal| {
            cond.add(Expr::cust(format!("({})", literal)))
        });
        Some(clause)
    }

    fn and(&self, base: Option<Condition>, clause: Condition) -> Condition {
        match base {
            Some(base) => Condition::all().add(base).add(clause),
            None => clause,
        }
    }
}

const LIKE_ESCAPE: char = '\\';

/// Substring pattern matching `term` literally.
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Condition matching one primary key value.
pub fn id_condition<E: EntityTrait>(id: PrimaryKeyValue<E>) -> Condition {
    E::PrimaryKey::iter()
        .zip(id.into_value_tuple())
        .fold(Condition::all(), |cond, (key, value)| {
            cond.add(key.into_column().eq(value))
        })
}

/// Condition selected by `criteria`.
pub fn criteria_condition<E: EntityTrait>(
    criteria: Criteria<PrimaryKeyValue<E>, Condition>,
) -> RepoResult<Condition> {
    match criteria {
        Criteria::Id(id) => Ok(id_condition::<E>(id)),
        Criteria::Ids(ids) if ids.is_empty() => Ok(Condition::all().add(Expr::val(1).eq(0))),
        Criteria::Ids(ids) => Ok(ids
            .into_iter()
            .fold(Condition::any(), |cond, id| cond.add(id_condition::<E>(id)))),
        Criteria::Between(from, to) => {
            let mut keys = E::PrimaryKey::iter();
            let (Some(key), None) = (keys.next(), keys.next()) else {
                return Err(RepositoryError::invalid_criteria(
                    "range criteria need a single-column primary key",
                ));
            };

            match (single_value(from), single_value(to)) {
                (Some(from), Some(to)) => {
                    Ok(Condition::all().add(key.into_column().between(from, to)))
                }
                _ => Err(RepositoryError::invalid_criteria("range bounds must be single values")),
            }
        }
        Criteria::Where(condition) => Ok(condition),
    }
}

/// Condition matching the primary key carried by an active model.
pub fn identity_condition<A: ActiveModelTrait>(model: &A) -> RepoResult<Condition> {
    let mut cond = Condition::all();

    for key in <A::Entity as EntityTrait>::PrimaryKey::iter() {
        let column = key.into_column();
        match model.get(column) {
            ActiveValue::Set(value) | ActiveValue::Unchanged(value) => {
                cond = cond.add(column.eq(value));
            }
            ActiveValue::NotSet => {
                return Err(RepositoryError::invalid_criteria(
                    "entity has no primary key to match",
                ));
            }
        }
    }
    Ok(cond)
}

/// Mark every present column as set so it is written.
pub fn mark_all_set<A: ActiveModelTrait>(mut model: A) -> A {
    for column in <A::Entity as EntityTrait>::Column::iter() {
        if let Some(value) = model.get(column).into_value() {
            model.set(column, value);
        }
    }
    model
}

/// Clear primary key columns so they are neither written nor overwritten.
pub fn clear_primary_key<A: ActiveModelTrait>(mut model: A) -> A {
    for key in <A::Entity as EntityTrait>::PrimaryKey::iter() {
        model.not_set(key.into_column());
    }
    model
}

/// Clear auto-increment keys still holding their zero placeholder.
pub fn clear_unassigned_key<A: ActiveModelTrait>(mut model: A) -> A {
    if !<<A::Entity as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::auto_increment() {
        return model;
    }

    for key in <A::Entity as EntityTrait>::PrimaryKey::iter() {
        let column = key.into_column();
        let unassigned = model
            .get(column)
            .into_value()
            .is_some_and(|value| is_zero(&value));
        if unassigned {
            model.not_set(column);
        }
    }
    model
}

fn single_value<V: IntoValueTuple>(value: V) -> Option<Value> {
    let mut values = value.into_value_tuple().into_iter();
    match (values.next(), values.next()) {
        (Some(value), None) => Some(value),
        _ => None,
    }
}

fn is_zero(value: &Value) -> bool {
    matches!(
        value,
        Value::TinyInt(Some(0))
            | Value::SmallInt(Some(0))
            | Value::Int(Some(0))
            | Value::BigInt(Some(0))
            | Value::TinyUnsigned(Some(0))
            | Value::SmallUnsigned(Some(0))
            | Value::Unsigned(Some(0))
            | Value::BigUnsigned(Some(0))
    )
}
