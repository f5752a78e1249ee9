//! Dashboard loading against in-memory backends

mod common;

use chrono::NaiveDate;
use common::*;
use octofhir_qm_client::{
    CardState, ClinicalResource, Dashboard, DashboardConfig, DashboardSession, MeasureIds, Refresh,
};
use octofhir_qm_types::{MeasurementPeriod, ResolvedPeriod};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn ids() -> MeasureIds {
    MeasureIds::from(&DashboardConfig::default())
}

fn period_2026() -> ResolvedPeriod {
    MeasurementPeriod::calendar_year(2026)
        .unwrap()
        .resolve(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap())
}

fn seeded_server() -> Arc<MockFhirServer> {
    let ids = ids();
    let server = MockFhirServer::new();
    server.set_library(&ids.cms138_library, cms138_zero_score());
    server.set_library(&ids.cms69_library, cms69_met());
    server.set_library(&ids.hospice_library, hospice_flagged());
    server.set_clinical(
        ClinicalResource::Encounter,
        "p-1",
        vec![json!({"resourceType": "Encounter", "id": "e1"})],
    );
    Arc::new(server)
}

#[tokio::test]
async fn every_card_loads() {
    let server = seeded_server();
    let dashboard = Dashboard::new(server.clone(), ids());

    let snapshot = dashboard.load_resolved("p-1", period_2026()).await;
    assert!(snapshot.failed_cards().is_empty());
    assert_eq!(snapshot.clinical.encounters.ready().map(Vec::len), Some(1));
    assert_eq!(snapshot.clinical.observations.ready().map(Vec::len), Some(0));

    let cms138 = snapshot.cms138.ready().unwrap();
    assert!(cms138.practitioner_alert);
    let cms69 = snapshot.cms69.ready().unwrap();
    assert_eq!(cms69.numerator, Some(true));
    assert!(!cms69.practitioner_alert);
    assert!(snapshot.hospice.ready().unwrap().flag);
    assert!(snapshot.palliative_care.ready().unwrap().is_empty());
    assert!(snapshot.clauses.is_none());
}

#[tokio::test]
async fn failed_card_is_isolated() {
    let server = seeded_server();
    server.fail(ids().cms69_library);
    server.fail("Condition");
    let dashboard = Dashboard::new(server.clone(), ids());

    let snapshot = dashboard.load_resolved("p-1", period_2026()).await;
    assert_eq!(snapshot.failed_cards(), vec!["conditions", "cms69"]);
    assert!(snapshot.cms69.error().unwrap().contains("HTTP 500"));
    assert!(snapshot.cms138.is_ready());
    assert!(snapshot.clinical.encounters.is_ready());

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["cms69"]["status"], "failed");
    assert_eq!(json["cms138"]["status"], "ready");
}

#[tokio::test]
async fn every_evaluation_receives_the_same_period() {
    let server = seeded_server();
    let dashboard = Dashboard::new(server.clone(), ids());
    let period = period_2026();

    dashboard.load_resolved("p-1", period).await;
    let evaluations: Vec<_> = server
        .calls()
        .into_iter()
        .filter(|call| call.period.is_some())
        .collect();
    assert_eq!(evaluations.len(), 4);
    assert!(evaluations.iter().all(|call| call.period == Some(period)));
}

#[tokio::test]
async fn clause_card_when_analytics_configured() {
    let server = seeded_server();
    let analytics = MockAnalytics::new(json!({
        "results": [{"detailedResults": [{
            "clauseResults": [{"statementName": "Numerator", "localId": "4", "final": "TRUE"}],
            "html": "<div>&lt;b&gt;</div>"
        }]}]
    }));
    let dashboard = Dashboard::new(server, ids()).with_analytics(Arc::new(analytics));

    let snapshot = dashboard.load_resolved("p-1", period_2026()).await;
    let clauses = match snapshot.clauses {
        Some(CardState::Ready(report)) => report,
        other => panic!("unexpected clause card {:?}", other),
    };
    assert_eq!(clauses.clause_results.len(), 1);
    assert_eq!(clauses.cleaned_html().as_deref(), Some("<div><b></div>"));
}

#[tokio::test]
async fn superseded_load_is_discarded() {
    let server = seeded_server();
    server.delay_patient("slow", Duration::from_millis(200));
    let session = DashboardSession::new(Dashboard::new(server.clone(), ids()));

    let (first, second) = tokio::join!(
        session.refresh_resolved("slow", period_2026()),
        session.refresh_resolved("p-1", period_2026()),
    );

    assert!(matches!(first, Refresh::Superseded { generation: 1, latest: 2 }));
    let committed = second.snapshot().expect("newest load commits");
    assert_eq!(committed.patient_id, "p-1");

    let current = session.current().unwrap();
    assert_eq!(current.patient_id, "p-1");
}

#[tokio::test]
async fn sequential_refreshes_both_commit() {
    let server = seeded_server();
    let session = DashboardSession::new(Dashboard::new(server, ids()));

    assert!(session.refresh_resolved("p-1", period_2026()).await.snapshot().is_some());
    assert!(session.refresh_resolved("p-2", period_2026()).await.snapshot().is_some());
    assert_eq!(session.current().unwrap().patient_id, "p-2");
}
