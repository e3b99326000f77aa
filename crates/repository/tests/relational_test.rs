//! Relational repository tests against the SeaORM mock database.

use std::collections::BTreeMap;

use sea_orm::sea_query::{Alias, Expr, LikeExpr};
use sea_orm::{
    Condition, DatabaseBackend, DatabaseConnection, DbErr, EntityTrait, JoinType, MockDatabase,
    MockExecResult, QueryFilter, QuerySelect, QueryTrait, Select, Transaction, Value,
};

use domain::{ConvertMapper, ErrorKind, Filter};
use repository::{Criteria, RelationalRepository, Repository, SearchOperator, UpdateOutcome};

mod posts {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "posts")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub title: String,
        pub user_id: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Debug, Clone, PartialEq)]
struct Post {
    id: i32,
    title: String,
    user_id: i32,
}

impl From<posts::Model> for Post {
    fn from(model: posts::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            user_id: model.user_id,
        }
    }
}

impl From<Post> for posts::Model {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            user_id: post.user_id,
        }
    }
}

type PostRepository =
    RelationalRepository<posts::Entity, posts::ActiveModel, ConvertMapper<Post, posts::Model>>;

fn repository(db: DatabaseConnection) -> PostRepository {
    RelationalRepository::new(db, ConvertMapper::new()).with_search_fields(["title"])
}

fn model(id: i32, title: &str) -> posts::Model {
    posts::Model {
        id,
        title: title.to_string(),
        user_id: 1,
    }
}

fn count_row(count: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("num_items", Into::<Value>::into(count))])
}

fn transaction_log(repo: PostRepository) -> String {
    format!("{:?}", repo.into_connection().into_transaction_log())
}

#[tokio::test]
async fn test_get_all_returns_page_and_total() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count_row(17)]])
        .append_query_results([vec![model(1, "Rust"), model(2, "Rust again")]])
        .into_connection();
    let repo = repository(db);

    let filter = Filter::default().with_query("rust").with_size(2);
    let page = repo.get_all(&filter).await.unwrap();

    assert_eq!(page.total, 17);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].title, "Rust");

    let log = transaction_log(repo);
    assert!(log.contains("LIKE"), "{log}");
    assert!(log.contains("LIMIT"), "{log}");
}

#[tokio::test]
async fn test_find_all_is_unpaginated() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![model(1, "a"), model(2, "b"), model(3, "c")]])
        .into_connection();
    let repo = repository(db);

    let posts = repo.find_all(&Filter::default()).await.unwrap();

    assert_eq!(posts.len(), 3);
    assert!(!transaction_log(repo).contains("LIMIT"));
}

#[tokio::test]
async fn test_find_where_uses_condition() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![model(4, "d")]])
        .into_connection();
    let repo = repository(db);

    let condition = Condition::all().add(Expr::col(Alias::new("user_id")).eq(1));
    let posts = repo.find_where(condition).await.unwrap();

    assert_eq!(posts[0].id, 4);
    assert!(transaction_log(repo).contains("user_id"));
}

#[tokio::test]
async fn test_get_one_by_id_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![model(7, "Found")]])
        .into_connection();

    let post = repository(db).get_one_by_id(7).await.unwrap();

    assert_eq!(post.title, "Found");
}

#[tokio::test]
async fn test_get_one_by_id_missing_is_data_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<posts::Model>::new()])
        .into_connection();

    let err = repository(db).get_one_by_id(7).await.unwrap_err();

    assert!(err.is_kind(ErrorKind::DataNotFound));
    assert_eq!(err.user_message(), "Item not found.");
}

#[tokio::test]
async fn test_create_returns_stored_entity() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![model(5, "Draft")]])
        .into_connection();

    let created = repository(db)
        .create(Post {
            id: 0,
            title: "Draft".to_string(),
            user_id: 1,
        })
        .await
        .unwrap();

    assert_eq!(created.id, 5);
}

#[tokio::test]
async fn test_create_with_unrecognized_failure_keeps_driver_error() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors([DbErr::Custom("connection lost".to_string())])
        .into_connection();

    let err = repository(db)
        .create(Post {
            id: 0,
            title: "Draft".to_string(),
            user_id: 1,
        })
        .await
        .unwrap_err();

    assert!(err.as_domain().is_none());
    assert_eq!(err.code(), "DATABASE_ERROR");
}

#[tokio::test]
async fn test_update_by_criteria_reports_modified() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();
    let repo = repository(db);

    let outcome = repo
        .update(Post {
            id: 3,
            title: "Edited".to_string(),
            user_id: 1,
        }, Some(Criteria::Id(3)))
        .await
        .unwrap();

    assert_eq!(outcome, UpdateOutcome::Modified(true));
    assert!(transaction_log(repo).contains("UPDATE"));
}

#[tokio::test]
async fn test_update_by_own_identity_without_changes() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let outcome = repository(db)
        .update(Post {
            id: 3,
            title: "Edited".to_string(),
            user_id: 1,
        }, None)
        .await
        .unwrap();

    assert!(!outcome.is_modified());
}

#[tokio::test]
async fn test_update_range_over_single_key() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 4,
        }])
        .into_connection();
    let repo = repository(db);

    let outcome = repo
        .update(Post {
            id: 0,
            title: "Archived".to_string(),
            user_id: 1,
        }, Some(Criteria::Between(1, 4)))
        .await
        .unwrap();

    assert!(outcome.is_modified());
    assert!(transaction_log(repo).contains("BETWEEN"));
}

#[tokio::test]
async fn test_create_or_update_falls_back_to_update() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors([DbErr::Custom("duplicate".to_string())])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();

    let outcome = repository(db)
        .create_or_update(Post {
            id: 3,
            title: "Upserted".to_string(),
            user_id: 1,
        }, None)
        .await
        .unwrap();

    assert_eq!(outcome, UpdateOutcome::Modified(true));
}

#[tokio::test]
async fn test_delete_by_ids() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 2,
        }])
        .into_connection();
    let repo = repository(db);

    assert!(repo.delete(Criteria::Ids(vec![1, 2])).await);
    assert!(transaction_log(repo).contains("DELETE"));
}

#[tokio::test]
async fn test_delete_failure_is_false() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_errors([DbErr::Custom("locked".to_string())])
        .into_connection();

    assert!(!repository(db).delete(Criteria::Id(1)).await);
}

fn own_posts() -> Condition {
    Condition::all().add(Expr::col((Alias::new("posts"), Alias::new("user_id"))).eq(1))
}

#[tokio::test]
async fn test_scope_and_search_shape_count_and_page() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count_row(1)]])
        .append_query_results([vec![model(1, "Rust")]])
        .into_connection();
    let repo = repository(db).with_scope(own_posts());

    let page = repo
        .get_all(&Filter::default().with_query("rust"))
        .await
        .unwrap();
    assert_eq!(page.total, 1);

    let expected = Condition::all().add(own_posts()).add(
        Condition::any()
            .add(Expr::col(Alias::new("title")).like(LikeExpr::new("%rust%").escape('\\'))),
    );
    let page_query = posts::Entity::find()
        .filter(expected)
        .offset(0)
        .limit(15)
        .build(DatabaseBackend::Postgres);

    let log = repo.into_connection().into_transaction_log();
    assert_eq!(log.len(), 2);
    assert_eq!(
        log[1],
        Transaction::from_sql_and_values(
            DatabaseBackend::Postgres,
            &page_query.sql,
            page_query.values.clone().map(|values| values.0).unwrap_or_default(),
        )
    );

    // The count runs over the same WHERE clause
    let sql = &page_query.sql;
    let where_clause = &sql[sql.find(" WHERE ").unwrap()..sql.find(" LIMIT ").unwrap()];
    let escaped = format!("{:?}", where_clause);
    let count = format!("{:?}", log[0]);
    assert!(count.contains(escaped.trim_matches('"')), "{count}");
}

#[tokio::test]
async fn test_query_shape_joins_count_and_page() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count_row(1)]])
        .append_query_results([vec![model(1, "Rust")]])
        .into_connection();
    let repo = repository(db)
        .with_search_fields(["title", "users.name"])
        .with_query(|mut select: Select<posts::Entity>| {
            QueryTrait::query(&mut select).join(
                JoinType::InnerJoin,
                Alias::new("users"),
                Expr::col((Alias::new("users"), Alias::new("id")))
                    .equals((Alias::new("posts"), Alias::new("user_id"))),
            );
            select
        });

    repo.get_all(&Filter::default().with_query("ada"))
        .await
        .unwrap();

    let log = transaction_log(repo);
    assert_eq!(log.matches("INNER JOIN").count(), 2, "{log}");
    assert!(log.contains("name"), "{log}");
}

#[tokio::test]
async fn test_search_operator_and_literals() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![model(1, "Rust")]])
        .into_connection();
    let repo = repository(db)
        .with_search_fields(["title", "body"])
        .with_search_operator(SearchOperator::And)
        .with_search_literals(["char_length(title) > 3"]);

    repo.find_all(&Filter::default().with_query("rust"))
        .await
        .unwrap();

    let log = transaction_log(repo);
    assert!(log.contains("(char_length(title) > 3)"), "{log}");
    assert!(log.contains(" AND "), "{log}");
    assert!(!log.contains(" OR "), "{log}");
}

#[tokio::test]
async fn test_scope_applies_to_delete() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();
    let repo = repository(db).with_scope(own_posts());

    assert!(repo.delete(Criteria::Id(9)).await);

    let log = transaction_log(repo);
    assert!(log.contains("user_id"), "{log}");
    assert!(log.contains("DELETE"), "{log}");
}
