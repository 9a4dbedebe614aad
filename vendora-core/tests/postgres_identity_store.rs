#![cfg(feature = "database")]

use anyhow::Result;
use sqlx::PgPool;
use vendora_core::identity::{
    IdentityLookup, IdentityStoreError, PostgresIdentityStore,
};

async fn insert_account(
    pool: &PgPool,
    id: &str,
    email: &str,
    password_hash: &str,
    role: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO accounts (id, email, password_hash, role)
        VALUES ($1, $2, $3, COALESCE($4, 'vendor'))
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .execute(pool)
    .await
    .map(|_| ())
}

#[sqlx::test(migrator = "vendora_core::MIGRATOR")]
async fn finds_account_by_normalized_email(pool: PgPool) -> Result<()> {
    insert_account(&pool, "u1", "a@b.com", "$argon2id$stub", None).await?;
    insert_account(&pool, "u2", "c@d.com", "$argon2id$stub", Some("admin"))
        .await?;
    let store = PostgresIdentityStore::new(pool);

    let account = store
        .find_by_normalized_identifier("a@b.com")
        .await?
        .expect("account u1");
    assert_eq!(account.id.as_str(), "u1");
    assert_eq!(account.email, "a@b.com");
    assert_eq!(account.password_hash, "$argon2id$stub");
    assert_eq!(account.role.as_str(), "vendor");

    let admin = store
        .find_by_normalized_identifier("c@d.com")
        .await?
        .expect("account u2");
    assert_eq!(admin.role.as_str(), "admin");

    Ok(())
}

#[sqlx::test(migrator = "vendora_core::MIGRATOR")]
async fn unknown_email_is_none(pool: PgPool) -> Result<()> {
    insert_account(&pool, "u1", "a@b.com", "$argon2id$stub", None).await?;
    let store = PostgresIdentityStore::new(pool);

    assert!(
        store
            .find_by_normalized_identifier("nouser@b.com")
            .await?
            .is_none()
    );
    Ok(())
}

#[sqlx::test(migrator = "vendora_core::MIGRATOR")]
async fn lookup_is_an_exact_match(pool: PgPool) -> Result<()> {
    // Written without normalization; the adapter must not fold case itself.
    insert_account(&pool, "u1", "Mixed@Case.com", "$argon2id$stub", None)
        .await?;
    let store = PostgresIdentityStore::new(pool);

    assert!(
        store
            .find_by_normalized_identifier("mixed@case.com")
            .await?
            .is_none()
    );
    assert!(
        store
            .find_by_normalized_identifier("Mixed@Case.com")
            .await?
            .is_some()
    );
    Ok(())
}

#[sqlx::test(migrator = "vendora_core::MIGRATOR")]
async fn at_most_one_account_per_email(pool: PgPool) -> Result<()> {
    insert_account(&pool, "u1", "a@b.com", "$argon2id$stub", None).await?;

    let duplicate =
        insert_account(&pool, "u2", "a@b.com", "$argon2id$other", None).await;
    let err = duplicate.expect_err("duplicate email accepted");
    let db_err = err.as_database_error().expect("database error");
    assert!(db_err.is_unique_violation());

    let store = PostgresIdentityStore::new(pool);
    let account = store
        .find_by_normalized_identifier("a@b.com")
        .await?
        .expect("account u1");
    assert_eq!(account.id.as_str(), "u1");
    Ok(())
}

#[sqlx::test(migrator = "vendora_core::MIGRATOR")]
async fn empty_password_hash_is_corrupt(pool: PgPool) -> Result<()> {
    insert_account(&pool, "u1", "a@b.com", "", None).await?;
    let store = PostgresIdentityStore::new(pool);

    let err = store
        .find_by_normalized_identifier("a@b.com")
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityStoreError::Corrupt(_)));
    Ok(())
}

#[sqlx::test(migrator = "vendora_core::MIGRATOR")]
async fn closed_pool_is_unavailable(pool: PgPool) -> Result<()> {
    let store = PostgresIdentityStore::new(pool.clone());
    pool.close().await;

    let err = store
        .find_by_normalized_identifier("a@b.com")
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityStoreError::Unavailable(_)));
    Ok(())
}
