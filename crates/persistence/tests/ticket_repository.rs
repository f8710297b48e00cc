//! PostgreSQL repository tests.
//!
//! Run against the database in `TEST_DATABASE_URL`; each test returns early
//! when the variable is unset.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use domain::models::{NewTicket, StatusChange, TicketStatus, UsageReason};
use fake::faker::address::en::StreetName;
use fake::faker::name::en::Name;
use fake::Fake;
use persistence::db::{create_pool, run_migrations, PoolSettings};
use persistence::{StatusUpdate, TicketRepository, TicketStore};
use uuid::Uuid;

async fn test_repository() -> Option<TicketRepository> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let pool = create_pool(&PoolSettings {
        url,
        max_connections: 20,
        min_connections: 1,
        connect_timeout_secs: 30,
        idle_timeout_secs: 600,
    })
    .await
    .expect("Failed to connect to test database");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    Some(TicketRepository::new(pool))
}

fn new_ticket() -> NewTicket {
    NewTicket {
        event_name: "Gala".to_string(),
        participant_name: Name().fake(),
        date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
        address: StreetName().fake(),
    }
}

#[tokio::test]
async fn test_create_and_get() {
    let Some(repo) = test_repository().await else {
        return;
    };

    let new = new_ticket();
    let ticket = repo.create(new.clone()).await.unwrap();
    assert_eq!(ticket.status, TicketStatus::Valid);
    assert!(!ticket.deleted);
    assert_eq!(ticket.participant_name, new.participant_name);
    assert_eq!(ticket.time, new.time);

    let fetched = repo.get_by_id(ticket.id).await.unwrap().unwrap();
    assert_eq!(fetched.id, ticket.id);
    assert_eq!(fetched.address, new.address);

    assert!(repo.get_by_id(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_active_contains_new_ticket_first() {
    let Some(repo) = test_repository().await else {
        return;
    };

    let older = repo.create(new_ticket()).await.unwrap();
    let newer = repo.create(new_ticket()).await.unwrap();
    let listed = repo.list_active().await.unwrap();

    let pos_older = listed.iter().position(|t| t.id == older.id).unwrap();
    let pos_newer = listed.iter().position(|t| t.id == newer.id).unwrap();
    assert!(pos_newer < pos_older);
}

#[tokio::test]
async fn test_list_deleted_newest_first() {
    let Some(repo) = test_repository().await else {
        return;
    };

    let older = repo.create(new_ticket()).await.unwrap();
    let newer = repo.create(new_ticket()).await.unwrap();
    repo.soft_delete(newer.id).await.unwrap();
    repo.soft_delete(older.id).await.unwrap();

    let trash = repo.list_deleted().await.unwrap();
    let pos_older = trash.iter().position(|t| t.id == older.id).unwrap();
    let pos_newer = trash.iter().position(|t| t.id == newer.id).unwrap();
    assert!(pos_newer < pos_older);
}

#[tokio::test]
async fn test_update_status_transitions_once() {
    let Some(repo) = test_repository().await else {
        return;
    };

    let ticket = repo.create(new_ticket()).await.unwrap();

    match repo
        .update_status(ticket.id, StatusChange::redeem("door-1"))
        .await
        .unwrap()
    {
        StatusUpdate::Applied(t) => {
            assert_eq!(t.status, TicketStatus::Used);
            assert_eq!(t.used_reason, Some(UsageReason::Redeemed));
            assert_eq!(t.used_by.as_deref(), Some("door-1"));
            assert!(t.used_at.is_some());
        }
        other => panic!("expected Applied, got {:?}", other),
    }

    assert!(matches!(
        repo.update_status(ticket.id, StatusChange::revoke("admin"))
            .await
            .unwrap(),
        StatusUpdate::Unchanged(_)
    ));

    assert_eq!(
        repo.update_status(Uuid::new_v4(), StatusChange::redeem("door-1"))
            .await
            .unwrap(),
        StatusUpdate::NotFound
    );
}

#[tokio::test]
async fn test_concurrent_redemptions_single_success() {
    let Some(repo) = test_repository().await else {
        return;
    };

    let repo = Arc::new(repo);
    let ticket = repo.create(new_ticket()).await.unwrap();

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let repo = repo.clone();
            tokio::spawn(async move {
                repo.update_status(ticket.id, StatusChange::redeem(format!("door-{}", i)))
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut applied = 0;
    for handle in handles {
        if let StatusUpdate::Applied(_) = handle.await.unwrap() {
            applied += 1;
        }
    }
    assert_eq!(applied, 1);
}

#[tokio::test]
async fn test_soft_delete_restore_and_hard_delete() {
    let Some(repo) = test_repository().await else {
        return;
    };

    let ticket = repo.create(new_ticket()).await.unwrap();

    let deleted = repo.soft_delete(ticket.id).await.unwrap().unwrap();
    assert!(deleted.deleted);
    assert!(deleted.deleted_at.is_some());
    assert!(repo.get_by_id(ticket.id).await.unwrap().is_none());
    assert!(repo
        .list_deleted()
        .await
        .unwrap()
        .iter()
        .any(|t| t.id == ticket.id));
    assert!(!repo
        .list_active()
        .await
        .unwrap()
        .iter()
        .any(|t| t.id == ticket.id));
    assert_eq!(
        repo.update_status(ticket.id, StatusChange::redeem("door"))
            .await
            .unwrap(),
        StatusUpdate::NotFound
    );

    let restored = repo.restore(ticket.id).await.unwrap().unwrap();
    assert!(!restored.deleted);
    assert!(restored.deleted_at.is_none());

    assert!(repo.hard_delete(ticket.id).await.unwrap());
    assert!(!repo.hard_delete(ticket.id).await.unwrap());
    assert!(repo.get_by_id(ticket.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_purge_deleted_and_stats() {
    let Some(repo) = test_repository().await else {
        return;
    };

    let ticket = repo.create(new_ticket()).await.unwrap();
    repo.soft_delete(ticket.id).await.unwrap();

    let stats = repo.stats().await.unwrap();
    assert!(stats.deleted >= 1);
    assert_eq!(stats.total, stats.valid + stats.used);

    repo.purge_deleted(Utc::now() + Duration::seconds(5))
        .await
        .unwrap();
    assert!(!repo
        .list_deleted()
        .await
        .unwrap()
        .iter()
        .any(|t| t.id == ticket.id));
    repo.ping().await.unwrap();
}
