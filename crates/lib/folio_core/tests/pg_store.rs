//! `PgStore` against a live PostgreSQL server.
//!
//! Each test migrates a throwaway schema on the server named by
//! `DATABASE_URL` and drops it afterwards. Without `DATABASE_URL` the tests
//! return early.

use std::str::FromStr;
use std::sync::Arc;

use folio_core::models::auth::{IdentityPatch, NewIdentity, Role};
use folio_core::models::project::{NewProject, ProjectPatch, ProjectStatus};
use folio_core::store::pg::PgStore;
use folio_core::store::{CredentialStore, ProjectStore, StoreError};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use uuid::Uuid;

struct TestDb {
    admin: PgPool,
    schema: String,
    store: Arc<PgStore>,
}

async fn test_db() -> Option<TestDb> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping PostgreSQL store test");
        return None;
    };
    let schema = format!("folio_test_{}", Uuid::new_v4().simple());

    let admin = PgPool::connect(&url).await.expect("connect");
    sqlx::query(&format!("CREATE SCHEMA {schema}"))
        .execute(&admin)
        .await
        .expect("create schema");

    let options = PgConnectOptions::from_str(&url)
        .expect("database url")
        .options([("search_path", schema.as_str())]);
    let pool = PgPoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await
        .expect("connect to schema");
    folio_core::migrate::migrate(&pool).await.expect("migrate");

    Some(TestDb {
        admin,
        schema,
        store: Arc::new(PgStore::new(pool)),
    })
}

impl TestDb {
    async fn finish(self) {
        self.store.pool().close().await;
        sqlx::query(&format!("DROP SCHEMA {} CASCADE", self.schema))
            .execute(&self.admin)
            .await
            .expect("drop schema");
    }
}

fn new_identity(email: &str, password_hash: &str) -> NewIdentity {
    NewIdentity {
        name: "A".into(),
        email: email.into(),
        password_hash: password_hash.into(),
        role: Role::User,
    }
}

fn new_project(owner: Uuid) -> NewProject {
    NewProject {
        title: "Folio".into(),
        description: "Portfolio backend".into(),
        short_description: "Backend".into(),
        technologies: vec!["rust".into(), "postgres".into()],
        live_url: Some("https://folio.example.com".into()),
        github_url: Some("https://github.com/example/folio".into()),
        featured: false,
        status: ProjectStatus::Published,
        created_by: owner,
    }
}

#[tokio::test]
async fn duplicate_email_is_rejected_regardless_of_case() {
    let Some(db) = test_db().await else { return };
    db.store
        .create_identity(new_identity("a@x.com", "hash"))
        .await
        .unwrap();

    let err = db
        .store
        .create_identity(new_identity("A@X.com", "hash"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateEmail(ref e) if e == "A@X.com"));
    assert_eq!(db.store.list_identities().await.unwrap().len(), 1);
    db.finish().await;
}

#[tokio::test]
async fn insert_if_absent_yields_none_when_taken() {
    let Some(db) = test_db().await else { return };
    let first = db
        .store
        .create_identity_if_absent(new_identity("admin@x.com", "hash"))
        .await
        .unwrap();
    assert!(first.is_some());

    let second = db
        .store
        .create_identity_if_absent(new_identity("ADMIN@x.com", "other"))
        .await
        .unwrap();
    assert!(second.is_none());
    db.finish().await;
}

#[tokio::test]
async fn lookup_by_email_ignores_case_and_returns_the_hash() {
    let Some(db) = test_db().await else { return };
    let created = db
        .store
        .create_identity(new_identity("a@x.com", "$2b$04$stored"))
        .await
        .unwrap();

    let credentials = db
        .store
        .find_identity_by_email("A@X.COM")
        .await
        .unwrap()
        .expect("identity");
    assert_eq!(credentials.identity, created);
    assert_eq!(credentials.password_hash, "$2b$04$stored");
    assert_eq!(credentials.identity.role, Role::User);
    assert!(credentials.identity.is_active);

    assert!(
        db.store
            .find_identity_by_email("b@x.com")
            .await
            .unwrap()
            .is_none()
    );
    db.finish().await;
}

#[tokio::test]
async fn changing_email_to_a_taken_one_is_a_duplicate() {
    let Some(db) = test_db().await else { return };
    db.store
        .create_identity(new_identity("a@x.com", "hash"))
        .await
        .unwrap();
    let b = db
        .store
        .create_identity(new_identity("b@x.com", "hash"))
        .await
        .unwrap();

    let err = db
        .store
        .update_identity(
            b.id,
            IdentityPatch {
                email: Some("A@x.com".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateEmail(_)));

    let updated = db
        .store
        .update_identity(
            b.id,
            IdentityPatch {
                role: Some(Role::Admin),
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .expect("identity");
    assert_eq!(updated.email, "b@x.com");
    assert_eq!(updated.role, Role::Admin);
    assert!(!updated.is_active);

    let missing = db
        .store
        .update_identity(Uuid::now_v7(), IdentityPatch::default())
        .await
        .unwrap();
    assert!(missing.is_none());
    db.finish().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_registrations_with_one_email_admit_exactly_one() {
    let Some(db) = test_db().await else { return };
    let attempts = (0..8)
        .map(|i| {
            let store = db.store.clone();
            // Same address, different casing per attempt.
            let email = if i % 2 == 0 { "race@x.com" } else { "RACE@x.com" };
            tokio::spawn(async move { store.create_identity(new_identity(email, "hash")).await })
        })
        .collect::<Vec<_>>();

    let mut created = 0;
    for attempt in attempts {
        match attempt.await.unwrap() {
            Ok(_) => created += 1,
            Err(StoreError::DuplicateEmail(_)) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(db.store.list_identities().await.unwrap().len(), 1);
    db.finish().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_insert_if_absent_creates_one_identity() {
    let Some(db) = test_db().await else { return };
    let attempts = (0..8)
        .map(|_| {
            let store = db.store.clone();
            tokio::spawn(async move {
                store
                    .create_identity_if_absent(new_identity("admin@x.com", "hash"))
                    .await
            })
        })
        .collect::<Vec<_>>();

    let mut created = 0;
    for attempt in attempts {
        if attempt.await.unwrap().unwrap().is_some() {
            created += 1;
        }
    }
    assert_eq!(created, 1);
    db.finish().await;
}

#[tokio::test]
async fn project_urls_can_be_cleared_and_kept() {
    let Some(db) = test_db().await else { return };
    let owner = db
        .store
        .create_identity(new_identity("a@x.com", "hash"))
        .await
        .unwrap();
    let project = db.store.create_project(new_project(owner.id)).await.unwrap();
    assert_eq!(project.technologies, vec!["rust", "postgres"]);

    let updated = db
        .store
        .update_project(
            project.id,
            ProjectPatch {
                github_url: Some(None),
                featured: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .expect("project");
    assert_eq!(updated.github_url, None);
    assert_eq!(updated.live_url.as_deref(), Some("https://folio.example.com"));
    assert!(updated.featured);
    assert_eq!(updated.title, "Folio");
    db.finish().await;
}

#[tokio::test]
async fn deleting_an_identity_cascades_to_its_projects() {
    let Some(db) = test_db().await else { return };
    let owner = db
        .store
        .create_identity(new_identity("a@x.com", "hash"))
        .await
        .unwrap();
    let project = db.store.create_project(new_project(owner.id)).await.unwrap();

    assert!(db.store.delete_identity(owner.id).await.unwrap());
    assert!(db.store.find_project(project.id).await.unwrap().is_none());
    assert!(!db.store.delete_identity(owner.id).await.unwrap());
    db.finish().await;
}
