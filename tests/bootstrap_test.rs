//! End-to-end bootstrap runs against an in-memory target

mod common;

use common::{config, source, MockApi, ADMIN_ID, USERS};
use hisseed::config::secret_string;
use hisseed::core::bootstrap::{BootstrapStage, Bootstrapper};
use hisseed::domain::{SeedError, ValidationError};
use serde_json::Value;

fn value_for<'a>(values: &'a [Value], org_unit: &str, data_element: &str) -> Option<&'a Value> {
    values
        .iter()
        .find(|v| v["orgUnit"] == org_unit && v["dataElement"] == data_element)
}

#[tokio::test]
async fn test_full_run_completes_every_stage() {
    let bootstrapper = Bootstrapper::new(config(), MockApi::new(), source());
    let summary = bootstrapper.run().await.unwrap();

    assert!(summary.is_complete());
    assert_eq!(summary.stages_completed, BootstrapStage::ALL.to_vec());
    assert_eq!(summary.imported_count("organisationUnits"), 4);
    assert_eq!(summary.imported_count("organisationUnitLevels"), 3);
    assert_eq!(summary.imported_count("currentUser"), 1);
    assert_eq!(summary.imported_count("userRoles"), 1);
    assert_eq!(summary.imported_count("dataElements"), 2);
    assert_eq!(summary.imported_count("dataElementGroups"), 1);
    assert_eq!(summary.imported_count("dataValues"), 3);
    assert_eq!(summary.polls, 1);

    let api = bootstrapper.api();
    let calls = api.calls();
    assert_eq!(calls.first().map(String::as_str), Some("GET me"));
    assert_eq!(calls.last().map(String::as_str), Some("GET tasks ANALYTICS_TABLE"));
    assert_eq!(api.count_calls("POST dataValueSets"), 1);
}

#[tokio::test]
async fn test_org_units_are_sent_parents_first_with_levels_named() {
    let bootstrapper = Bootstrapper::new(config(), MockApi::new(), source());
    bootstrapper.run().await.unwrap();
    let api = bootstrapper.api();

    let units = api.posted_json("organisationUnits").unwrap();
    let units = units["organisationUnits"].as_array().unwrap();
    let codes: Vec<&str> = units.iter().map(|u| u["code"].as_str().unwrap()).collect();
    assert_eq!(codes, vec!["WLD", "AFR", "SLE", "GHA"]);
    assert!(units[0].get("parent").is_none());
    assert_eq!(units[1]["parent"]["id"], units[0]["id"]);
    assert_eq!(units[2]["geometry"]["type"], "Point");

    let levels = api.posted_json("organisationUnitLevels").unwrap();
    let names: Vec<&str> = levels["organisationUnitLevels"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["World", "Region", "Country"]);
}

#[tokio::test]
async fn test_read_back_identifiers_are_authoritative() {
    let api = MockApi::new().with_server_id("SLE", "SrvSLE00001");
    let bootstrapper = Bootstrapper::new(config(), api, source());
    bootstrapper.run().await.unwrap();

    let values = bootstrapper.api().posted_data_values();
    assert_eq!(values.len(), 3);

    let sle = values
        .iter()
        .find(|v| v["value"] == "10")
        .expect("Sierra Leone value imported");
    assert_eq!(sle["orgUnit"], "SrvSLE00001");
    assert_eq!(sle["period"], "2015");
}

#[tokio::test]
async fn test_admin_home_units_are_the_roots() {
    let bootstrapper = Bootstrapper::new(config(), MockApi::new(), source());
    bootstrapper.run().await.unwrap();
    let api = bootstrapper.api();

    let world_id = api.posted_json("organisationUnits").unwrap()["organisationUnits"][0]["id"]
        .clone();
    let update = api.posted_json("users").unwrap();
    let user = &update["users"][0];

    assert_eq!(user["id"], ADMIN_ID);
    assert_eq!(user["organisationUnits"][0]["id"], world_id);
    assert_eq!(user["dataViewOrganisationUnits"][0]["id"], world_id);
}

#[tokio::test]
async fn test_unmatched_rows_are_dropped_and_reported() {
    let bootstrapper = Bootstrapper::new(config(), MockApi::new(), source());
    let summary = bootstrapper.run().await.unwrap();

    assert_eq!(summary.dropped_rows(), 2);
    let org_join = summary
        .joins
        .iter()
        .find(|j| j.key == "orgUnit")
        .unwrap();
    assert_eq!(org_join.dataset, "TB burden");
    assert_eq!(org_join.report.left_rows, 5);
    assert_eq!(org_join.report.output_rows, 3);

    let values = bootstrapper.api().posted_data_values();
    let data_elements = bootstrapper.api().posted_json("dataElements").unwrap();
    let mort_id = data_elements["dataElements"]
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["code"] == "e_mort_num")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();
    let gha_id = bootstrapper.api().posted_json("organisationUnits").unwrap()["organisationUnits"]
        [3]["id"]
        .as_str()
        .unwrap()
        .to_string();
    assert_eq!(value_for(&values, &gha_id, &mort_id).unwrap()["value"], "1200");
}

#[tokio::test]
async fn test_strict_join_halts_at_reshape() {
    let mut config = config();
    config.import.fail_on_join_mismatch = true;

    let bootstrapper = Bootstrapper::new(config, MockApi::new(), source());
    let err = bootstrapper.run().await.unwrap_err();

    assert_eq!(err.failed_stage(), Some("ReshapeAndJoin"));
    assert!(matches!(
        err.root_cause(),
        SeedError::JoinMismatch { dropped: 2, left_rows: 5, .. }
    ));
    assert_eq!(bootstrapper.api().count_calls("POST dataValueSets"), 0);
}

#[tokio::test]
async fn test_duplicate_truncated_names_halt_before_post() {
    // Both definitions start with "Estimated"
    let api = MockApi::new().with_constraint("dataElement", "name", 9.0, true);
    let bootstrapper = Bootstrapper::new(config(), api, source());
    let err = bootstrapper.run().await.unwrap_err();

    assert_eq!(err.failed_stage(), Some("ImportDataElements"));
    match err.root_cause() {
        SeedError::Validation(ValidationError::DuplicateKey {
            field,
            value,
            count,
            ..
        }) => {
            assert_eq!(field, "name");
            assert_eq!(value, "Estimated");
            assert_eq!(*count, 2);
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(bootstrapper.api().count_calls("POST metadata dataElements"), 0);
}

#[tokio::test]
async fn test_names_truncated_to_schema_length() {
    let api = MockApi::new().with_constraint("organisationUnit", "shortName", 6.0, false);
    let bootstrapper = Bootstrapper::new(config(), api, source());
    bootstrapper.run().await.unwrap();

    let units = bootstrapper.api().posted_json("organisationUnits").unwrap();
    assert_eq!(units["organisationUnits"][1]["shortName"], "Africa");
    assert_eq!(units["organisationUnits"][1]["name"], "African Region");
}

#[tokio::test]
async fn test_polls_until_complete() {
    let api = MockApi::new().with_statuses(&[false, false, false, true]);
    let bootstrapper = Bootstrapper::new(config(), api, source());
    let summary = bootstrapper.run().await.unwrap();

    assert_eq!(summary.polls, 4);
    assert_eq!(bootstrapper.api().count_calls("GET tasks"), 4);
}

#[tokio::test]
async fn test_poll_gives_up_after_max_polls() {
    let mut config = config();
    config.recompute.max_polls = 2;
    let api = MockApi::new().with_statuses(&[false, false, false]);

    let bootstrapper = Bootstrapper::new(config, api, source());
    let err = bootstrapper.run().await.unwrap_err();

    assert_eq!(err.failed_stage(), Some("PollRecomputeStatus"));
    assert!(matches!(err.root_cause(), SeedError::Timeout(_)));
    assert_eq!(bootstrapper.api().count_calls("GET tasks"), 2);
}

#[tokio::test]
async fn test_rejected_import_halts_run() {
    let api = MockApi::new().rejecting("organisationUnitLevels");
    let bootstrapper = Bootstrapper::new(config(), api, source());
    let err = bootstrapper.run().await.unwrap_err();

    assert_eq!(err.failed_stage(), Some("SetOrgUnitLevels"));
    assert!(matches!(
        err.root_cause(),
        SeedError::ImportRejected { expected: 3, accepted: 0, .. }
    ));
    assert_eq!(bootstrapper.api().count_calls("POST metadata userRoles"), 0);
}

#[tokio::test]
async fn test_missing_source_fails_first_fetching_stage() {
    let source = common::MemorySource::default()
        .with("dictionary.csv", common::DICTIONARY)
        .with("tb_burden.csv", common::TB_BURDEN);
    let bootstrapper = Bootstrapper::new(config(), MockApi::new(), source);
    let err = bootstrapper.run().await.unwrap_err();

    assert_eq!(err.failed_stage(), Some("ImportOrgUnits"));
    assert!(matches!(err.root_cause(), SeedError::Source(_)));
}

#[tokio::test]
async fn test_users_imported_with_role_and_home_unit() {
    let mut config = config();
    config.sources.users = Some("users.csv".to_string());
    config.metadata.default_user_password = Some(secret_string("Seed!Pass1".to_string()));

    let bootstrapper = Bootstrapper::new(config, MockApi::new(), source().with("users.csv", USERS));
    let summary = bootstrapper.run().await.unwrap();
    assert_eq!(summary.imported_count("users"), 2);

    let api = bootstrapper.api();
    let xml = api.posted_xml("users").unwrap();
    let roles = api.posted_xml("userRoles").unwrap();
    let sle_id = api.posted_json("organisationUnits").unwrap()["organisationUnits"][2]["id"]
        .as_str()
        .unwrap()
        .to_string();

    assert!(xml.contains("alovelace"));
    assert!(xml.contains("Seed!Pass1"));
    assert!(xml.contains(&sle_id));
    assert!(roles.contains("SEEDED_ANALYST"));
}

#[tokio::test]
async fn test_user_with_unknown_org_unit_fails() {
    let mut config = config();
    config.sources.users = Some("users.csv".to_string());
    config.metadata.default_user_password = Some(secret_string("Seed!Pass1".to_string()));
    let roster = "firstName,surname,username,email,orgUnit\nAda,Lovelace,alovelace,,ATL\n";

    let bootstrapper =
        Bootstrapper::new(config, MockApi::new(), source().with("users.csv", roster));
    let err = bootstrapper.run().await.unwrap_err();

    assert_eq!(err.failed_stage(), Some("ImportUsers"));
    assert!(err.to_string().contains("ATL"));
}

#[tokio::test]
async fn test_same_seed_same_payloads() {
    let first = Bootstrapper::new(config(), MockApi::new(), source());
    let second = Bootstrapper::new(config(), MockApi::new(), source());
    let a = first.run().await.unwrap();
    let b = second.run().await.unwrap();

    for object_type in ["organisationUnits", "organisationUnitLevels", "dataElements", "dataValues"] {
        assert_eq!(a.checksums[object_type], b.checksums[object_type], "{object_type}");
    }

    let mut other = config();
    other.identifiers.seed += 1;
    let third = Bootstrapper::new(other, MockApi::new(), source());
    let c = third.run().await.unwrap();
    assert_ne!(a.checksums["organisationUnits"], c.checksums["organisationUnits"]);
}

#[tokio::test]
async fn test_rerun_on_same_bootstrapper_is_deterministic() {
    let bootstrapper = Bootstrapper::new(config(), MockApi::new(), source());
    let a = bootstrapper.run().await.unwrap();
    let b = bootstrapper.run().await.unwrap();
    assert_eq!(a.checksums["dataElements"], b.checksums["dataElements"]);

    let posted: Vec<_> = bootstrapper
        .api()
        .metadata
        .lock()
        .unwrap()
        .iter()
        .filter(|p| p.as_json().map_or(false, |v| v.get("dataElements").is_some()))
        .cloned()
        .collect();
    assert_eq!(posted.len(), 2);
    assert_eq!(posted[0], posted[1]);
}

#[tokio::test]
async fn test_colliding_group_codes_halt_before_post() {
    let mut config = config();
    let mut second = config.sources.datasets[0].clone();
    second.name = "TB-burden".to_string();
    config.sources.datasets.push(second);

    let bootstrapper = Bootstrapper::new(config, MockApi::new(), source());
    let err = bootstrapper.run().await.unwrap_err();

    assert_eq!(err.failed_stage(), Some("ImportDataElementGroups"));
    match err.root_cause() {
        SeedError::Validation(ValidationError::DuplicateKey {
            field,
            value,
            count,
            ..
        }) => {
            assert_eq!(field, "code");
            assert_eq!(value, "TB_BURDEN");
            assert_eq!(*count, 2);
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(
        bootstrapper.api().count_calls("POST metadata dataElementGroups"),
        0
    );
}

#[tokio::test]
async fn test_fixed_timestamp_makes_xml_payloads_reproducible() {
    let mut config = config();
    config.metadata.timestamp = Some("2024-01-01T00:00:00Z".to_string());

    let first = Bootstrapper::new(config.clone(), MockApi::new(), source())
        .run()
        .await
        .unwrap();
    let second = Bootstrapper::new(config, MockApi::new(), source())
        .run()
        .await
        .unwrap();

    assert_eq!(first.checksums["userRoles"], second.checksums["userRoles"]);
    assert_eq!(first.checksums, second.checksums);
}
