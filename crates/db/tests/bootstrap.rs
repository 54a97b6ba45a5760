use sqlx::PgPool;

/// Connect, migrate, and verify the schema is in place.
#[sqlx::test(migrations = "./migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    eduhub_db::health_check(&pool).await.unwrap();

    let tables = [
        "users",
        "user_sessions",
        "courses",
        "course_reviews",
        "lessons",
        "enrollments",
        "course_completions",
        "lesson_progress",
        "progress_bookmarks",
    ];

    for table in tables {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert_eq!(count.0, 0, "{table} should start empty");
    }
}

/// Unique constraints follow the `uq_` prefix the API maps to conflicts.
#[sqlx::test(migrations = "./migrations")]
async fn test_unique_constraints_are_prefixed(pool: PgPool) {
    let names: Vec<(String,)> = sqlx::query_as(
        "SELECT conname::TEXT FROM pg_constraint
         WHERE contype = 'u' AND connamespace = 'public'::regnamespace
         ORDER BY conname",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(!names.is_empty());
    for (name,) in names {
        assert!(name.starts_with("uq_"), "unexpected constraint name {name}");
    }
}
