//! End-to-end behavior of the widget DAO against the in-memory session.

use std::sync::Arc;

use widget_core::{StoreError, Widget, WidgetPatch};
use widget_store::{InMemorySession, WidgetDao};

fn dao_with_page_size(page_size: usize) -> (Arc<InMemorySession>, WidgetDao) {
    let session = Arc::new(InMemorySession::with_page_size(page_size));
    let dao = WidgetDao::new(Arc::clone(&session) as Arc<dyn widget_store::StoreSession>);
    (session, dao)
}

fn dao() -> (Arc<InMemorySession>, WidgetDao) {
    dao_with_page_size(100)
}

// ============================================================================
// ROUND TRIP & RETRIEVE
// ============================================================================

#[tokio::test]
async fn test_created_widget_round_trips_through_retrieve() {
    let (_session, dao) = dao();
    let widget = Widget::new("T1", "foo", "d1");

    let created = dao.create(widget.clone()).await.unwrap();
    assert_eq!(created, widget);

    let retrieved = dao.retrieve("T1", "foo").await.unwrap();
    assert_eq!(retrieved, Some(widget));
}

#[tokio::test]
async fn test_retrieve_absent_is_none_not_error() {
    let (_session, dao) = dao();
    assert_eq!(dao.retrieve("T1", "ghost").await.unwrap(), None);
}

#[tokio::test]
async fn test_create_is_last_write_wins_on_duplicate_identity() {
    let (_session, dao) = dao();
    dao.create(Widget::new("T1", "foo", "first")).await.unwrap();
    dao.create(Widget::new("T1", "foo", "second")).await.unwrap();

    let retrieved = dao.retrieve("T1", "foo").await.unwrap().unwrap();
    assert_eq!(retrieved.description(), "second");
}

// ============================================================================
// UPDATE
// ============================================================================

#[tokio::test]
async fn test_partial_update_preserves_identity_fields() {
    let (_session, dao) = dao();
    dao.create(Widget::new("T1", "foo", "d1")).await.unwrap();

    let updated = dao
        .update("T1", "foo", &WidgetPatch::description("d2"))
        .await
        .unwrap();
    assert_eq!(updated, Widget::new("T1", "foo", "d2"));

    let retrieved = dao.retrieve("T1", "foo").await.unwrap().unwrap();
    assert_eq!(retrieved, Widget::new("T1", "foo", "d2"));
}

#[tokio::test]
async fn test_identity_changing_update_moves_the_row() {
    let (_session, dao) = dao();
    dao.create(Widget::new("T1", "foo", "d1")).await.unwrap();

    let patch = WidgetPatch {
        key: Some("foo-2".to_string()),
        ..WidgetPatch::default()
    };
    let moved = dao.update("T1", "foo", &patch).await.unwrap();
    assert_eq!(moved, Widget::new("T1", "foo-2", "d1"));

    assert_eq!(dao.retrieve("T1", "foo").await.unwrap(), None);
    assert_eq!(
        dao.retrieve("T1", "foo-2").await.unwrap(),
        Some(Widget::new("T1", "foo-2", "d1"))
    );
}

#[tokio::test]
async fn test_tenant_changing_update_moves_across_tenants() {
    let (session, dao) = dao();
    dao.create(Widget::new("T1", "foo", "d1")).await.unwrap();

    let patch = WidgetPatch {
        tenant_key: Some("T2".to_string()),
        description: Some("d2".to_string()),
        ..WidgetPatch::default()
    };
    dao.update("T1", "foo", &patch).await.unwrap();

    assert_eq!(dao.retrieve("T1", "foo").await.unwrap(), None);
    assert_eq!(
        dao.retrieve("T2", "foo").await.unwrap(),
        Some(Widget::new("T2", "foo", "d2"))
    );
    // The move replaced the row rather than duplicating it.
    assert_eq!(session.row_count(), 1);
}

#[tokio::test]
async fn test_update_missing_widget_fails_not_found_naming_identity() {
    let (_session, dao) = dao();

    let err = dao
        .update("T1", "ghost", &WidgetPatch::description("d2"))
        .await
        .unwrap_err();
    match err {
        StoreError::NotFound { tenant_key, key } => {
            assert_eq!(tenant_key, "T1");
            assert_eq!(key, "ghost");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
    // The failed update never created a record.
    assert_eq!(dao.retrieve("T1", "ghost").await.unwrap(), None);
}

#[tokio::test]
async fn test_rewrite_failure_after_retrieve_leaves_row_unchanged() {
    let (session, dao) = dao();
    dao.create(Widget::new("T1", "foo", "d1")).await.unwrap();

    // The update's internal retrieve is the first execute; the rewrite
    // statement after it is the one that fails.
    session.fail_execute_after(1, "write rejected");
    let err = dao
        .update("T1", "foo", &WidgetPatch::description("d2"))
        .await
        .unwrap_err();

    assert!(format!("{}", err).contains("write rejected"));
    let stored = dao.retrieve("T1", "foo").await.unwrap().unwrap();
    assert_eq!(stored.description(), "d1");
}

#[tokio::test]
async fn test_move_batch_failure_leaves_row_at_old_identity() {
    let (session, dao) = dao();
    dao.create(Widget::new("T1", "foo", "d1")).await.unwrap();

    // Retrieve succeeds, then the delete+insert batch fails as a unit.
    session.fail_execute_after(1, "batch rejected");
    let patch = WidgetPatch {
        key: Some("foo-2".to_string()),
        ..WidgetPatch::default()
    };
    let err = dao.update("T1", "foo", &patch).await.unwrap_err();

    assert!(format!("{}", err).contains("batch rejected"));
    // The failed batch neither deleted the old row nor created the new.
    assert_eq!(
        dao.retrieve("T1", "foo").await.unwrap(),
        Some(Widget::new("T1", "foo", "d1"))
    );
    assert_eq!(dao.retrieve("T1", "foo-2").await.unwrap(), None);
    assert_eq!(session.row_count(), 1);
}

// ============================================================================
// DELETE
// ============================================================================

#[tokio::test]
async fn test_delete_returns_the_deleted_widget() {
    let (_session, dao) = dao();
    dao.create(Widget::new("T1", "foo", "d1")).await.unwrap();

    let deleted = dao.delete("T1", "foo").await.unwrap();
    assert_eq!(deleted, Widget::new("T1", "foo", "d1"));
    assert_eq!(dao.retrieve("T1", "foo").await.unwrap(), None);
}

#[tokio::test]
async fn test_delete_missing_widget_fails_not_found() {
    let (_session, dao) = dao();
    let err = dao.delete("T1", "ghost").await.unwrap_err();
    assert!(err.is_not_found());
}

// ============================================================================
// LIST & PAGINATION
// ============================================================================

#[tokio::test]
async fn test_list_is_tenant_scoped_ascending_and_capped() {
    let (_session, dao) = dao();
    for key in ["c", "a", "b", "d"] {
        dao.create(Widget::new("T1", key, key)).await.unwrap();
    }
    dao.create(Widget::new("T2", "a", "other")).await.unwrap();

    let widgets = dao.list("T1", 3, "").await.unwrap();
    let keys: Vec<&str> = widgets.iter().map(Widget::key).collect();
    assert_eq!(keys, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_list_offset_key_is_exclusive() {
    let (_session, dao) = dao();
    for key in ["a", "b", "c"] {
        dao.create(Widget::new("T1", key, key)).await.unwrap();
    }

    let widgets = dao.list("T1", 10, "a").await.unwrap();
    let keys: Vec<&str> = widgets.iter().map(Widget::key).collect();
    assert_eq!(keys, vec!["b", "c"]);
}

#[tokio::test]
async fn test_successive_offset_cursors_cover_the_full_set() {
    // Page size smaller than the row count forces the streamer through
    // multiple page fetches per call as well.
    let (session, dao) = dao_with_page_size(3);
    let total = 10;
    for n in 0..total {
        let key = format!("w{:02}", n);
        dao.create(Widget::new("T1", &key, "d")).await.unwrap();
    }

    let mut collected = Vec::new();
    let mut offset_key = String::new();
    loop {
        let page = dao.list("T1", 4, &offset_key).await.unwrap();
        match page.last() {
            Some(last) => offset_key = last.key().to_string(),
            None => break,
        }
        collected.extend(page);
    }

    let keys: Vec<&str> = collected.iter().map(Widget::key).collect();
    let expected: Vec<String> = (0..total).map(|n| format!("w{:02}", n)).collect();
    // No duplicates, no omissions, ascending order.
    assert_eq!(keys, expected.iter().map(String::as_str).collect::<Vec<_>>());
    assert!(session.page_fetches() > 0);
}

#[tokio::test]
async fn test_list_empty_tenant_is_empty() {
    let (_session, dao) = dao();
    assert!(dao.list("T1", 10, "").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_failure_surfaces_driver_cause() {
    let (session, dao) = dao();
    session.fail_next_execute("coordinator timeout");

    let err = dao.list("T1", 10, "").await.unwrap_err();
    assert!(format!("{}", err).contains("coordinator timeout"));
}

// ============================================================================
// STATEMENT CACHE STABILITY
// ============================================================================

#[tokio::test]
async fn test_repeated_operations_prepare_each_statement_once() {
    let (session, dao) = dao();

    for n in 0..5 {
        let key = format!("k{}", n);
        dao.create(Widget::new("T1", &key, "d")).await.unwrap();
        dao.list("T1", 10, "").await.unwrap();
        dao.retrieve("T1", &key).await.unwrap();
        dao.update("T1", &key, &WidgetPatch::description("d2")).await.unwrap();
        dao.delete("T1", &key).await.unwrap();
    }

    // Five logical operations, five compiled statements, regardless of
    // how many times each ran.
    assert_eq!(session.prepare_calls(), 5);
}

// ============================================================================
// CONCRETE SCENARIO
// ============================================================================

#[tokio::test]
async fn test_widget_lifecycle_scenario() {
    let (_session, dao) = dao();

    dao.create(Widget::new("T1", "foo", "d1")).await.unwrap();
    assert_eq!(
        dao.list("T1", 10, "").await.unwrap(),
        vec![Widget::new("T1", "foo", "d1")]
    );

    dao.update("T1", "foo", &WidgetPatch::description("d2")).await.unwrap();
    assert_eq!(
        dao.retrieve("T1", "foo").await.unwrap(),
        Some(Widget::new("T1", "foo", "d2"))
    );

    dao.delete("T1", "foo").await.unwrap();
    assert!(dao.list("T1", 10, "").await.unwrap().is_empty());
}
