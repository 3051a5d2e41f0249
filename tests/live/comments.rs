use crate::helpers::harness::with_test_db;
use pgcomment::db::FeatureGate;
use pgcomment::db::feature::Feature;
use pgcomment::render::lookup_query;
use pgcomment::{CommentController, CommentError, CommentResource, ObjectType};

#[tokio::test]
async fn test_database_comment_round_trip() {
    with_test_db(async |db| {
        let client = db.client().await;
        assert!(client.feature_supported(Feature::Comment));
        let controller = CommentController::new(&client);

        let mut resource =
            CommentResource::new(ObjectType::Database, db.name(), "postgres", "my database comment");
        controller.create(&mut resource).await.unwrap();

        assert_eq!(resource.comment, "my database comment");
        assert_eq!(
            resource.id.as_ref().unwrap().to_string(),
            format!("postgres.{}", db.name())
        );
        assert!(controller.exists(&resource).await.unwrap());

        controller.delete(&mut resource).await.unwrap();
        assert_eq!(
            db.stored_comment(lookup_query(ObjectType::Database), db.name())
                .await,
            None
        );
    })
    .await;
}

#[tokio::test]
async fn test_role_comment() {
    with_test_db(async |db| {
        let role = db.create_role("demo").await;
        let client = db.client().await;
        let controller = CommentController::new(&client);

        let mut resource = CommentResource::new(ObjectType::Role, &role, "postgres", "my role comment");
        controller.create(&mut resource).await.unwrap();

        assert!(controller.exists(&resource).await.unwrap());
        assert_eq!(
            db.stored_comment(lookup_query(ObjectType::Role), &role)
                .await
                .as_deref(),
            Some("my role comment")
        );
    })
    .await;
}

#[tokio::test]
async fn test_table_comment_in_named_database() {
    with_test_db(async |db| {
        db.execute("CREATE TABLE table1 (id INT)").await;
        let client = db.client().await;
        let controller = CommentController::new(&client);

        let mut resource =
            CommentResource::new(ObjectType::Table, "table1", db.name(), "my table comment");
        controller.create(&mut resource).await.unwrap();

        assert_eq!(
            db.stored_comment(lookup_query(ObjectType::Table), "table1")
                .await
                .as_deref(),
            Some("my table comment")
        );

        // Out-of-band change is visible as drift
        db.execute("COMMENT ON TABLE table1 IS 'changed'").await;
        assert!(!controller.exists(&resource).await.unwrap());
        controller.read(&mut resource).await.unwrap();
        assert_eq!(resource.comment, "changed");

        controller.update(&mut resource, "it's back").await.unwrap();
        assert_eq!(resource.comment, "it's back");
        assert!(controller.exists(&resource).await.unwrap());
    })
    .await;
}

#[tokio::test]
async fn test_read_without_comment_is_empty() {
    with_test_db(async |db| {
        db.execute("CREATE TABLE table1 (id INT)").await;
        let client = db.client().await;
        let controller = CommentController::new(&client);

        let mut resource = CommentResource::new(ObjectType::Table, "table1", db.name(), "declared");
        controller.read(&mut resource).await.unwrap();
        assert_eq!(resource.comment, "");
        assert!(!controller.exists(&resource).await.unwrap());
    })
    .await;
}

#[tokio::test]
async fn test_missing_table_fails_without_partial_commit() {
    with_test_db(async |db| {
        let client = db.client().await;
        let controller = CommentController::new(&client);

        let mut resource = CommentResource::new(ObjectType::Table, "nope", db.name(), "x");
        let err = controller.create(&mut resource).await.unwrap_err();
        assert!(matches!(err, CommentError::StatementExecution { .. }));
        assert!(err.to_string().contains("42P01"));
    })
    .await;
}

#[tokio::test]
async fn test_backslash_comment_survives() {
    with_test_db(async |db| {
        db.execute("CREATE TABLE table1 (id INT)").await;
        let client = db.client().await;
        let controller = CommentController::new(&client);

        let mut resource =
            CommentResource::new(ObjectType::Table, "table1", db.name(), r"C:\temp 'quoted'");
        controller.create(&mut resource).await.unwrap();
        assert_eq!(resource.comment, r"C:\temp 'quoted'");
    })
    .await;
}

#[tokio::test]
async fn test_lifecycle_leaves_no_open_transactions() {
    with_test_db(async |db| {
        db.execute("CREATE TABLE table1 (id INT)").await;
        let client = db.client().await;
        let controller = CommentController::new(&client);

        let mut resource =
            CommentResource::new(ObjectType::Table, "table1", db.name(), "my table comment");
        controller.create(&mut resource).await.unwrap();
        controller.update(&mut resource, r"back\slash").await.unwrap();
        assert_eq!(resource.comment, r"back\slash");
        controller.delete(&mut resource).await.unwrap();

        assert_eq!(
            db.stored_comment(lookup_query(ObjectType::Table), "table1")
                .await,
            None
        );

        let open: i64 = sqlx::query_scalar(
            "SELECT count(*) FROM pg_stat_activity \
             WHERE datname = $1 AND state LIKE 'idle in transaction%'",
        )
        .bind(db.name())
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert_eq!(open, 0);
    })
    .await;
}

#[tokio::test]
async fn test_table_lookup_also_matches_column_comments() {
    with_test_db(async |db| {
        db.execute("CREATE TABLE table1 (id INT)").await;
        db.execute("COMMENT ON COLUMN table1.id IS 'column note'").await;
        let client = db.client().await;
        let controller = CommentController::new(&client);

        // The table lookup does not filter on objsubid, so a column comment
        // is read back when the table itself has none
        let mut resource = CommentResource::new(ObjectType::Table, "table1", db.name(), "");
        controller.read(&mut resource).await.unwrap();
        assert_eq!(resource.comment, "column note");
    })
    .await;
}
