//! Repository behavior over a real embedded database

use siaf_server::db::DbService;
use siaf_server::db::models::{
    AssetFields, IncidentFields, IncidentPriority, IncidentStatus, MaintenanceFields,
    MaintenanceStatus, RequestType, RequisitionFields, RequisitionStatus, UserCreate,
};
use siaf_server::db::repository::maintenance::DAY_MS;
use siaf_server::db::repository::report::DateRange;
use siaf_server::db::repository::{
    AssetRepository, IncidentRepository, MaintenanceRepository, RepoError, ReportRepository,
    RequisitionRepository, UserRepository, parse_record_id,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tempfile::TempDir;

async fn open() -> (TempDir, Surreal<Db>) {
    let dir = tempfile::tempdir().unwrap();
    let db = DbService::open(&dir.path().join("database"))
        .await
        .unwrap()
        .db;
    (dir, db)
}

async fn technician(db: &Surreal<Db>) -> String {
    UserRepository::new(db.clone())
        .create(UserCreate {
            username: "tecnico".to_string(),
            email: None,
            password: "Tecnico2025x".to_string(),
            full_name: "Técnico de Guardia".to_string(),
            role: Some("user".to_string()),
            department: Some("MANTENIMIENTO".to_string()),
        })
        .await
        .unwrap()
        .id_string()
}

#[tokio::test]
async fn asset_codes_are_unique_and_delete_is_soft() {
    let (_dir, db) = open().await;
    let repo = AssetRepository::new(db);

    let asset = repo
        .create(AssetFields {
            asset_code: Some("TV-101".to_string()),
            name: Some("Televisión habitación 101".to_string()),
            purchase_price: Some(8999.9),
            ..Default::default()
        })
        .await
        .unwrap();

    let duplicate = repo
        .create(AssetFields {
            asset_code: Some("TV-101".to_string()),
            name: Some("Otra".to_string()),
            ..Default::default()
        })
        .await;
    assert!(matches!(duplicate, Err(RepoError::Duplicate(_))));

    let retired = repo.deactivate(&asset.id_string()).await.unwrap();
    assert_eq!(retired.status.as_str(), "inactive");
    assert!(repo.find_by_code("TV-101").await.unwrap().is_some());

    assert!(matches!(
        repo.deactivate("asset:missing").await,
        Err(RepoError::NotFound(_))
    ));
}

#[tokio::test]
async fn incident_resolution_is_timed() {
    let (_dir, db) = open().await;
    let reporter = parse_record_id("user", &technician(&db).await).unwrap();
    let repo = IncidentRepository::new(db);

    let incident = repo
        .create(
            IncidentFields {
                title: Some("Fuga en baño".to_string()),
                description: Some("Habitación 204".to_string()),
                priority: Some(IncidentPriority::High),
                reported_date: Some(shared::util::now_millis() - 2 * 3_600_000),
                ..Default::default()
            },
            reporter,
        )
        .await
        .unwrap();
    assert!(incident.incident_code.starts_with("INC-"));
    assert_eq!(incident.status, IncidentStatus::Open);

    let id = incident.id.as_ref().unwrap().to_string();
    let resolved = repo
        .resolve(&id, "Cambio de empaque".to_string())
        .await
        .unwrap();
    assert_eq!(resolved.status, IncidentStatus::Resolved);
    let hours = resolved.resolution_hours().unwrap();
    assert!((1.9..2.5).contains(&hours), "{hours}");

    let stats = repo.stats().await.unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.resolved, 1);
    assert_eq!(stats.open, 0);
}

#[tokio::test]
async fn maintenance_moves_forward_only() {
    let (_dir, db) = open().await;
    let repo = MaintenanceRepository::new(db);
    let now = shared::util::now_millis();

    let scheduled = repo
        .create(MaintenanceFields {
            title: Some("Revisión de minisplit".to_string()),
            scheduled_date: Some(now + 3 * DAY_MS),
            ..Default::default()
        })
        .await
        .unwrap();
    let overdue = repo
        .create(MaintenanceFields {
            title: Some("Limpieza de alberca".to_string()),
            scheduled_date: Some(now - DAY_MS),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(repo.upcoming(now, 7).await.unwrap().len(), 1);
    assert_eq!(repo.overdue(now).await.unwrap().len(), 1);

    let id = scheduled.id.as_ref().unwrap().to_string();
    let started = repo.start(&id).await.unwrap();
    assert_eq!(started.status, MaintenanceStatus::InProgress);
    assert!(matches!(repo.start(&id).await, Err(RepoError::Validation(_))));

    let done = repo
        .complete(&id, Some("Se cambió filtro".to_string()), Some(450.0))
        .await
        .unwrap();
    assert_eq!(done.status, MaintenanceStatus::Completed);
    assert!(done.completed_date.is_some());
    assert!(matches!(
        repo.complete(&id, None, None).await,
        Err(RepoError::Validation(_))
    ));

    // Completing straight from scheduled is allowed
    let overdue_id = overdue.id.as_ref().unwrap().to_string();
    repo.complete(&overdue_id, None, Some(100.0)).await.unwrap();

    let stats = repo.stats(now, now - 365 * DAY_MS).await.unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.total_cost, 550.0);
}

#[tokio::test]
async fn requisition_status_guards() {
    let (_dir, db) = open().await;
    let requester = parse_record_id("user", &technician(&db).await).unwrap();
    let repo = RequisitionRepository::new(db.clone());

    let fields = || RequisitionFields {
        request_type: Some(RequestType::PagoTarjeta),
        amount: Some((1500.0, "MIL QUINIENTOS 00/100 MN".to_string())),
        payable_to: Some("Ferretería Tulum".to_string()),
        concept: Some("Herramienta".to_string()),
        ..Default::default()
    };

    let first = repo.create(fields(), requester.clone()).await.unwrap();
    let second = repo.create(fields(), requester.clone()).await.unwrap();
    assert_ne!(first.requisition_code, second.requisition_code);
    assert_eq!(first.status, RequisitionStatus::Pending);

    let first_id = first.id.as_ref().unwrap().to_string();
    let second_id = second.id.as_ref().unwrap().to_string();

    let approved = repo
        .approve(&first_id, true, requester.clone(), None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(approved.status, RequisitionStatus::Approved);
    assert!(
        repo.approve(&first_id, false, requester.clone(), None)
            .await
            .unwrap()
            .is_none()
    );
    assert!(repo.delete(&first_id).await.unwrap().is_none());
    assert!(repo.update_pending(&first_id, fields()).await.unwrap().is_none());

    // Rejected ones can still be removed
    repo.approve(&second_id, false, requester.clone(), None)
        .await
        .unwrap()
        .unwrap();
    assert!(repo.complete(&second_id).await.unwrap().is_none());
    assert!(repo.delete(&second_id).await.unwrap().is_some());
    assert!(repo.find_by_id(&second_id).await.unwrap().is_none());

    let activity = ReportRepository::new(db)
        .user_activity(requester, DateRange::default())
        .await
        .unwrap();
    assert_eq!(activity.requisitions_made, 1);
    assert_eq!(activity.forms_approved, 0);
}
