//! Integration tests for the User repository using in-memory SurrealDB.

use userdir_core::models::role::CreateRole;
use userdir_core::models::user::UserChange;
use userdir_core::query::{UserFilterRequest, UserQuery};
use userdir_core::repository::{RoleRepository, UnitOfWork, UnitOfWorkFactory, UserRepository};
use userdir_db::SurrealUnitOfWorkFactory;
use userdir_db::repository::{SurrealRoleRepository, SurrealUserRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

/// Helper: spin up in-memory DB, run migrations, create a role.
async fn setup() -> (
    Surreal<surrealdb::engine::local::Db>,
    Uuid, // role_id
) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    userdir_db::run_migrations(&db).await.unwrap();

    let role = SurrealRoleRepository::new(db.clone())
        .create(CreateRole {
            name: "staff".into(),
            description: "Staff".into(),
        })
        .await
        .unwrap();

    (db, role.id)
}

fn change(role_id: Uuid, first: &str, last: &str, email: &str, username: &str) -> UserChange {
    UserChange {
        id: Uuid::new_v4(),
        first_name: first.into(),
        last_name: last.into(),
        email: email.into(),
        phone: "555-0100".into(),
        role_id,
        username: username.into(),
        password_hash: "$argon2id$placeholder".into(),
    }
}

async fn seed(db: &Surreal<surrealdb::engine::local::Db>, users: &[UserChange]) {
    let mut uow = SurrealUnitOfWorkFactory::new(db.clone()).begin();
    for user in users {
        uow.insert_user(user);
    }
    uow.commit().await.unwrap();
}

fn directory(role_id: Uuid) -> Vec<UserChange> {
    vec![
        change(role_id, "Maria", "Lopez", "maria@example.com", "mlopez"),
        change(role_id, "Alice", "Zimmer", "alice@example.com", "azimmer"),
        change(role_id, "Bob", "Young", "bob@sample.org", "byoung"),
        change(role_id, "Carol", "Xu", "carol@example.com", "cxu"),
        change(role_id, "Dave", "Wong", "dave@sample.org", "dwong"),
    ]
}

fn first_names(users: &[userdir_core::models::user::User]) -> Vec<&str> {
    users.iter().map(|u| u.first_name.as_str()).collect()
}

#[tokio::test]
async fn insert_and_get_user() {
    let (db, role_id) = setup().await;
    let alice = change(role_id, "Alice", "Zimmer", "alice@example.com", "azimmer");
    seed(&db, std::slice::from_ref(&alice)).await;

    let repo = SurrealUserRepository::new(db);
    let fetched = repo.get_by_id(alice.id).await.unwrap();

    assert_eq!(fetched.id, alice.id);
    assert_eq!(fetched.first_name, "Alice");
    assert_eq!(fetched.role_id, role_id);
    assert_eq!(fetched.password_hash, "$argon2id$placeholder");
}

#[tokio::test]
async fn get_missing_user_is_not_found() {
    let (db, _) = setup().await;
    let repo = SurrealUserRepository::new(db);

    let err = repo.get_by_id(Uuid::new_v4()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn search_filters_case_insensitively() {
    let (db, role_id) = setup().await;
    seed(&db, &directory(role_id)).await;
    let repo = SurrealUserRepository::new(db);

    let query = UserQuery::resolve(&UserFilterRequest {
        search: Some("mar".into()),
        ..Default::default()
    });
    let page = repo.search(&query).await.unwrap();
    assert_eq!(first_names(&page.items), vec!["Maria"]);
    assert_eq!(page.total, 1);

    let query = UserQuery::resolve(&UserFilterRequest {
        search: Some("SAMPLE.ORG".into()),
        ..Default::default()
    });
    assert_eq!(repo.count(&query).await.unwrap(), 2);

    let query = UserQuery::resolve(&UserFilterRequest {
        search: Some("nobody-here".into()),
        ..Default::default()
    });
    let page = repo.search(&query).await.unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn search_sorts_by_requested_column() {
    let (db, role_id) = setup().await;
    seed(&db, &directory(role_id)).await;
    let repo = SurrealUserRepository::new(db);

    let query = UserQuery::resolve(&UserFilterRequest {
        sort_field: Some("lastname".into()),
        sort_direction: Some("desc".into()),
        ..Default::default()
    });
    let page = repo.search(&query).await.unwrap();
    assert_eq!(
        first_names(&page.items),
        vec!["Alice", "Bob", "Carol", "Dave", "Maria"]
    );

    let query = UserQuery::resolve(&UserFilterRequest {
        sort_field: Some("no_such_column".into()),
        ..Default::default()
    });
    let page = repo.search(&query).await.unwrap();
    assert_eq!(
        first_names(&page.items),
        vec!["Alice", "Bob", "Carol", "Dave", "Maria"]
    );
}

#[tokio::test]
async fn search_agrees_with_in_memory_engine() {
    let (db, role_id) = setup().await;
    seed(&db, &directory(role_id)).await;
    let repo = SurrealUserRepository::new(db);

    let everyone = repo
        .search(&UserQuery {
            page_size: 100,
            ..Default::default()
        })
        .await
        .unwrap()
        .items;

    let query = UserQuery::resolve(&UserFilterRequest {
        search: Some("example".into()),
        sort_field: Some("email".into()),
        sort_direction: Some("desc".into()),
        page_number: Some(1),
        page_size: Some(2),
    });
    let stored: Vec<Uuid> = repo
        .search(&query)
        .await
        .unwrap()
        .items
        .iter()
        .map(|u| u.id)
        .collect();
    let evaluated: Vec<Uuid> = query.apply(&everyone).items.iter().map(|u| u.id).collect();

    assert_eq!(stored, evaluated);
}

#[tokio::test]
async fn pages_cover_filtered_rows_exactly_once() {
    let (db, role_id) = setup().await;
    seed(&db, &directory(role_id)).await;
    let repo = SurrealUserRepository::new(db);

    let mut seen = Vec::new();
    for page_number in 1..=3 {
        let query = UserQuery {
            page_number,
            page_size: 2,
            ..Default::default()
        };
        let page = repo.search(&query).await.unwrap();
        assert_eq!(page.total, 5);
        seen.extend(page.items.into_iter().map(|u| u.id));
    }
    assert_eq!(seen.len(), 5);
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 5);

    let beyond = repo
        .search(&UserQuery {
            page_number: 4,
            page_size: 2,
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total, 5);
}

#[tokio::test]
async fn search_with_extreme_page_parameters_is_empty() {
    let (db, role_id) = setup().await;
    seed(&db, &directory(role_id)).await;
    let repo = SurrealUserRepository::new(db);

    for (page_number, page_size) in [(i64::MAX, 10), (3, i64::MAX), (i64::MAX, i64::MAX)] {
        let query = UserQuery::resolve(&UserFilterRequest {
            page_number: Some(page_number),
            page_size: Some(page_size),
            ..Default::default()
        });
        let page = repo.search(&query).await.unwrap();
        assert_eq!(page.total, 5);
        assert!(page.items.is_empty());
    }

    let everyone = repo
        .search(&UserQuery::resolve(&UserFilterRequest {
            page_size: Some(i64::MAX),
            ..Default::default()
        }))
        .await
        .unwrap();
    assert_eq!(everyone.items.len(), 5);
}

#[tokio::test]
async fn sorting_ignores_case() {
    let (db, role_id) = setup().await;
    seed(
        &db,
        &[
            change(role_id, "bob", "Young", "bob@sample.org", "byoung"),
            change(role_id, "Dave", "Wong", "dave@sample.org", "dwong"),
            change(role_id, "carol", "Xu", "carol@example.com", "cxu"),
            change(role_id, "Alice", "Zimmer", "alice@example.com", "azimmer"),
        ],
    )
    .await;
    let repo = SurrealUserRepository::new(db);

    let page = repo.search(&UserQuery::default()).await.unwrap();
    assert_eq!(first_names(&page.items), vec!["Alice", "bob", "carol", "Dave"]);

    let query = UserQuery::resolve(&UserFilterRequest {
        sort_direction: Some("desc".into()),
        ..Default::default()
    });
    let stored = repo.search(&query).await.unwrap();
    let evaluated = query.apply(&page.items);
    let evaluated: Vec<&str> = evaluated.items.iter().map(|u| u.first_name.as_str()).collect();
    assert_eq!(first_names(&stored.items), evaluated);
}
