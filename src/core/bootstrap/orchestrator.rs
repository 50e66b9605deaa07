//! Bootstrap orchestrator - drives a run from authentication to recompute
//!
//! The orchestrator walks [`BootstrapStage`] in order. Every stage either
//! completes or halts the run with [`SeedError::StageFailed`]; nothing is
//! retried or rolled back. Identifiers are drawn from one generator per run
//! in a fixed order (organisation units without a source id, levels, the
//! user role, users, data elements, groups), so a given seed and input
//! always produce the same identifiers.

use super::stage::BootstrapStage;
use super::summary::BootstrapSummary;
use crate::adapters::dhis2::{CurrentUser, ImportOptions, MetadataApi};
use crate::adapters::sources::{
    parse_dictionary, parse_org_units, parse_table, parse_users, DatasetSource,
};
use crate::config::{DatasetConfig, DatasetLayout, SeedConfig};
use crate::core::join::join_lookup;
use crate::core::normalize::{normalize, SchemaConstraint};
use crate::core::payload::{self, Payload};
use crate::core::reshape::reshape;
use crate::core::uid::UidGenerator;
use crate::domain::context::ResultExt;
use crate::domain::org_unit::{build_hierarchy, depth};
use crate::domain::{
    ApiError, DataElement, DataElementGroup, DataValueRecord, DictionaryEntry, OrgUnit,
    OrgUnitLevel, Result, SeedError, Table, Uid, User, UserRole, ValidationError,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

const ORG_UNITS: &str = "organisationUnits";
const ORG_UNIT_LEVELS: &str = "organisationUnitLevels";
const CURRENT_USER: &str = "currentUser";
const USER_ROLES: &str = "userRoles";
const USERS: &str = "users";
const DATA_ELEMENTS: &str = "dataElements";
const DATA_ELEMENT_GROUPS: &str = "dataElementGroups";
const DATA_VALUES: &str = "dataValues";

/// Everything a stage hands to the stages after it
struct RunState {
    uids: UidGenerator,
    /// Stamp shared by every XML payload of the run
    timestamp: DateTime<Utc>,
    me: Option<CurrentUser>,
    org_units: Vec<OrgUnit>,
    /// Authoritative code → id map, read back from the target
    org_unit_ids: HashMap<String, Uid>,
    roots: Vec<Uid>,
    role_id: Option<Uid>,
    /// Parsed datasets by dataset name, excluded columns already dropped
    tables: HashMap<String, Table>,
    element_ids: HashMap<String, Uid>,
    /// Group members, parallel to the configured datasets
    group_members: Vec<Vec<Uid>>,
    data_values: Vec<DataValueRecord>,
}

impl RunState {
    fn new(uids: UidGenerator, timestamp: DateTime<Utc>) -> Self {
        Self {
            uids,
            timestamp,
            me: None,
            org_units: Vec::new(),
            org_unit_ids: HashMap::new(),
            roots: Vec::new(),
            role_id: None,
            tables: HashMap::new(),
            element_ids: HashMap::new(),
            group_members: Vec::new(),
            data_values: Vec::new(),
        }
    }
}

/// One observation before identifiers are resolved
#[derive(Debug, Clone)]
struct Observation {
    org_unit: String,
    data_element: String,
    period: String,
    value: String,
}

/// Bootstrap orchestrator
///
/// Generic over the target API and the upstream source so a run can be driven
/// entirely in memory.
pub struct Bootstrapper<A, S> {
    config: SeedConfig,
    api: A,
    source: S,
    options: ImportOptions,
}

impl<A: MetadataApi, S: DatasetSource> Bootstrapper<A, S> {
    pub fn new(config: SeedConfig, api: A, source: S) -> Self {
        let options = ImportOptions::new(config.import.import_strategy, config.import.atomic_mode);
        Self {
            config,
            api,
            source,
            options,
        }
    }

    pub fn config(&self) -> &SeedConfig {
        &self.config
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Execute a full run
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::StageFailed`] naming the stage that halted the run
    pub async fn run(&self) -> Result<BootstrapSummary> {
        let start_time = Instant::now();
        let mut summary = BootstrapSummary::new();

        let uids = UidGenerator::new(self.config.identifiers.seed, self.config.identifiers.length)?;
        let mut state = RunState::new(uids, self.config.metadata.timestamp());

        tracing::info!(
            target_url = %self.config.target.base_url,
            datasets = self.config.sources.datasets.len(),
            strategy = %self.options.strategy,
            seed = self.config.identifiers.seed,
            "Starting bootstrap"
        );

        let mut stage = BootstrapStage::Authenticate;
        loop {
            crate::log_stage_start!(stage);
            let stage_start = Instant::now();

            if let Err(e) = self.execute(stage, &mut state, &mut summary).await {
                crate::log_error_with_context!(&e, stage.as_str());
                return Err(SeedError::StageFailed {
                    stage: stage.to_string(),
                    source: Box::new(e),
                });
            }

            summary.record_stage(stage);
            crate::log_stage_complete!(stage, stage_start.elapsed());

            match stage.next() {
                Some(next) => stage = next,
                None => break,
            }
        }

        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    async fn execute(
        &self,
        stage: BootstrapStage,
        state: &mut RunState,
        summary: &mut BootstrapSummary,
    ) -> Result<()> {
        match stage {
            BootstrapStage::Authenticate => self.authenticate(state).await,
            BootstrapStage::ImportOrgUnits => self.import_org_units(state, summary).await,
            BootstrapStage::VerifyOrgUnits => self.verify_org_units(state).await,
            BootstrapStage::SetOrgUnitLevels => self.set_org_unit_levels(state, summary).await,
            BootstrapStage::AssignUserHomeOrgUnit => self.assign_home_org_units(state, summary).await,
            BootstrapStage::ImportUserRole => self.import_user_role(state, summary).await,
            BootstrapStage::ImportUsers => self.import_users(state, summary).await,
            BootstrapStage::ImportDataElements => self.import_data_elements(state, summary).await,
            BootstrapStage::ImportDataElementGroups => self.import_groups(state, summary).await,
            BootstrapStage::FetchExternalDatasets => self.fetch_datasets(state).await,
            BootstrapStage::ReshapeAndJoin => self.reshape_and_join(state, summary),
            BootstrapStage::ImportDataValues => self.import_data_values(state, summary).await,
            BootstrapStage::TriggerRecompute => self.api.trigger_analytics().await,
            BootstrapStage::PollRecomputeStatus => self.poll_recompute(summary).await,
            BootstrapStage::Done => Ok(()),
        }
    }

    async fn authenticate(&self, state: &mut RunState) -> Result<()> {
        let me = self.api.me().await?;
        tracing::info!(
            user_id = %me.id,
            username = me.username.as_deref().unwrap_or("unknown"),
            "Authenticated"
        );
        state.me = Some(me);
        Ok(())
    }

    async fn import_org_units(
        &self,
        state: &mut RunState,
        summary: &mut BootstrapSummary,
    ) -> Result<()> {
        let bytes = self.source.fetch(&self.config.sources.org_units).await?;
        let sources = parse_org_units(&bytes)?;
        if sources.is_empty() {
            return Err(SeedError::Source(
                "organisation unit source is empty".to_string(),
            ));
        }

        let code = self.constraint("organisationUnit", "code").await?;
        let name = self.constraint("organisationUnit", "name").await?;
        let short_name = self.constraint("organisationUnit", "shortName").await?;

        ensure_fits(sources.iter().map(|u| u.code.as_str()), &code)?;
        let sources = normalize(sources, &name, |u| &mut u.name)?;
        let sources = normalize(sources, &short_name, |u| &mut u.short_name)?;

        let ids = sources
            .iter()
            .map(|u| match &u.id {
                Some(id) => Uid::new(id.as_str()).map_err(ValidationError::InvalidUid),
                None => Ok(state.uids.next_uid()),
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let units = build_hierarchy(sources, ids)?;
        let payload = payload::org_units(&units, &self.config.metadata.opening_date)?;
        self.import(ORG_UNITS, &payload, units.len(), self.options, summary)
            .await?;

        tracing::info!(count = units.len(), levels = depth(&units), "Organisation units imported");
        state.org_units = units;
        Ok(())
    }

    async fn verify_org_units(&self, state: &mut RunState) -> Result<()> {
        let listed = self.api.list(ORG_UNITS, "id,code", None).await?;

        let mut ids = HashMap::with_capacity(listed.len());
        for object in &listed {
            let code = object.get("code").and_then(Value::as_str);
            let id = object.get("id").and_then(Value::as_str);
            let (Some(code), Some(id)) = (code, id) else {
                continue;
            };
            let uid = Uid::new(id).map_err(|e| {
                ApiError::InvalidResponse(format!("organisation unit '{code}': {e}"))
            })?;
            ids.insert(code.to_string(), uid);
        }

        let missing: Vec<&str> = state
            .org_units
            .iter()
            .filter(|u| !ids.contains_key(&u.code))
            .map(|u| u.code.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(SeedError::ImportRejected {
                object_type: ORG_UNITS.to_string(),
                expected: state.org_units.len(),
                accepted: state.org_units.len() - missing.len(),
                message: format!("not found after import: {}", missing.join(", ")),
            });
        }

        let reassigned = state
            .org_units
            .iter()
            .filter(|u| ids.get(&u.code) != Some(&u.id))
            .count();
        if reassigned > 0 {
            tracing::info!(reassigned, "Target holds other identifiers for some codes, using the target's");
        }

        state.roots = state
            .org_units
            .iter()
            .filter(|u| u.level == 1)
            .filter_map(|u| ids.get(&u.code).cloned())
            .collect();
        state.org_unit_ids = ids;
        Ok(())
    }

    async fn set_org_unit_levels(
        &self,
        state: &mut RunState,
        summary: &mut BootstrapSummary,
    ) -> Result<()> {
        let uids = &mut state.uids;
        let levels: Vec<OrgUnitLevel> = (1..=depth(&state.org_units))
            .map(|level| OrgUnitLevel {
                id: uids.next_uid(),
                name: self.config.metadata.level_name(level),
                level,
            })
            .collect();

        let payload = payload::org_unit_levels(&levels)?;
        self.import(ORG_UNIT_LEVELS, &payload, levels.len(), self.options, summary)
            .await
    }

    async fn assign_home_org_units(
        &self,
        state: &mut RunState,
        summary: &mut BootstrapSummary,
    ) -> Result<()> {
        let me = state
            .me
            .as_ref()
            .ok_or_else(|| SeedError::Authentication("no authenticated user".to_string()))?;

        let filter = format!("id:eq:{}", me.id);
        let user = self
            .api
            .list(USERS, ":owner", Some(&filter))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::InvalidResponse(format!("user {} not found", me.id)))?;

        let payload = payload::user_home_org_units(&user, &state.roots)?;
        self.import(CURRENT_USER, &payload, 1, self.options.update(), summary)
            .await
    }

    async fn import_user_role(
        &self,
        state: &mut RunState,
        summary: &mut BootstrapSummary,
    ) -> Result<()> {
        let role_config = &self.config.metadata.user_role;
        let role = UserRole {
            id: state.uids.next_uid(),
            code: role_config.code.clone(),
            name: role_config.name.clone(),
            description: role_config.description.clone(),
            authorities: role_config.authorities.clone(),
        };

        let payload = payload::user_roles_xml(std::slice::from_ref(&role), state.timestamp)?;
        self.import(USER_ROLES, &payload, 1, self.options, summary)
            .await?;

        state.role_id = Some(role.id);
        Ok(())
    }

    async fn import_users(
        &self,
        state: &mut RunState,
        summary: &mut BootstrapSummary,
    ) -> Result<()> {
        let Some(location) = &self.config.sources.users else {
            tracing::info!("No user roster configured, skipping");
            return Ok(());
        };

        let records = parse_users(&self.source.fetch(location).await?)?;
        if records.is_empty() {
            tracing::info!(location = %location, "User roster is empty, skipping");
            return Ok(());
        }

        let password = self
            .config
            .metadata
            .default_user_password
            .clone()
            .ok_or_else(|| {
                SeedError::Configuration(
                    "metadata.default_user_password is required to import users".to_string(),
                )
            })?;
        let role_id = state
            .role_id
            .clone()
            .ok_or_else(|| SeedError::Other("user role was not imported".to_string()))?;

        let mut users = Vec::with_capacity(records.len());
        for record in records {
            let org_units = match record.org_unit.as_deref().filter(|c| !c.is_empty()) {
                Some(code) => match state.org_unit_ids.get(code) {
                    Some(id) => vec![id.clone()],
                    None => {
                        return Err(SeedError::Source(format!(
                            "user '{}' references unknown organisation unit '{}'",
                            record.username, code
                        )))
                    }
                },
                None => state.roots.clone(),
            };

            users.push(User::from_record(
                state.uids.next_uid(),
                record,
                password.clone(),
                vec![role_id.clone()],
                org_units,
            ));
        }

        let payload = payload::users_xml(&users, state.timestamp)?;
        self.import(USERS, &payload, users.len(), self.options, summary)
            .await
    }

    async fn import_data_elements(
        &self,
        state: &mut RunState,
        summary: &mut BootstrapSummary,
    ) -> Result<()> {
        let sources = &self.config.sources;
        let bytes = self.source.fetch(&sources.data_dictionary).await?;
        let dictionary = parse_dictionary(
            &bytes,
            &sources.dictionary_code_column,
            &sources.dictionary_definition_column,
            sources.dictionary_dataset_column.as_deref(),
        )?;

        // Variable-layout datasets are needed now for their headers
        let mut used_codes: Vec<Vec<String>> = Vec::with_capacity(sources.datasets.len());
        for dataset in &sources.datasets {
            let codes = match dataset.layout {
                DatasetLayout::Variables => {
                    self.load_table(dataset, &mut state.tables).await?;
                    let table = loaded(&state.tables, dataset)?;
                    reshape(table, &dataset.id_columns)?
                        .variable_columns()
                        .into_iter()
                        .map(str::to_string)
                        .collect()
                }
                DatasetLayout::Periods => dataset.data_element.iter().cloned().collect(),
            };
            used_codes.push(codes);
        }

        let selected = select_entries(dictionary, &sources.datasets, &used_codes);
        let selected_codes: HashSet<&str> = selected.iter().map(|e| e.code.as_str()).collect();
        for dataset in &sources.datasets {
            if let (DatasetLayout::Periods, Some(code)) = (dataset.layout, &dataset.data_element) {
                if !selected_codes.contains(code.as_str()) {
                    return Err(SeedError::Source(format!(
                        "data element '{}' of dataset '{}' is not in the data dictionary",
                        code, dataset.name
                    )));
                }
            }
        }

        let code = self.constraint("dataElement", "code").await?;
        let name = self.constraint("dataElement", "name").await?;
        let short_name = self.constraint("dataElement", "shortName").await?;
        ensure_fits(selected.iter().map(|e| e.code.as_str()), &code)?;

        let metadata = &self.config.metadata;
        let mut elements = Vec::with_capacity(selected.len());
        for entry in selected {
            let element = DataElement::builder()
                .id(state.uids.next_uid())
                .short_name(entry.code.as_str())
                .code(entry.code)
                .name(entry.definition.as_str())
                .description(entry.definition)
                .value_type(metadata.value_type.as_str())
                .aggregation_type(metadata.aggregation_type.as_str())
                .build()
                .map_err(SeedError::Other)?;
            elements.push(element);
        }

        let elements = normalize(elements, &name, |e| &mut e.name)?;
        let elements = normalize(elements, &short_name, |e| &mut e.short_name)?;

        if elements.is_empty() {
            tracing::warn!("No dictionary entry matches a dataset variable, no data elements to import");
        } else {
            let payload = payload::data_elements(&elements)?;
            self.import(DATA_ELEMENTS, &payload, elements.len(), self.options, summary)
                .await?;
        }

        state.element_ids = elements
            .into_iter()
            .map(|e| (e.code, e.id))
            .collect();
        state.group_members = used_codes
            .iter()
            .map(|codes| {
                codes
                    .iter()
                    .filter_map(|c| state.element_ids.get(c).cloned())
                    .collect()
            })
            .collect();
        Ok(())
    }

    async fn import_groups(
        &self,
        state: &mut RunState,
        summary: &mut BootstrapSummary,
    ) -> Result<()> {
        let datasets = &self.config.sources.datasets;
        if datasets.is_empty() {
            return Ok(());
        }

        let code = self.constraint("dataElementGroup", "code").await?;
        let name = self.constraint("dataElementGroup", "name").await?;
        let short_name = self.constraint("dataElementGroup", "shortName").await?;

        let uids = &mut state.uids;
        let groups: Vec<DataElementGroup> = datasets
            .iter()
            .zip(&state.group_members)
            .map(|(dataset, members)| DataElementGroup {
                id: uids.next_uid(),
                code: group_code(dataset.group_name()),
                name: dataset.group_name().to_string(),
                short_name: dataset.group_name().to_string(),
                members: members.clone(),
            })
            .collect();

        // Codes derive from names, so distinct names can still collide
        ensure_fits(groups.iter().map(|g| g.code.as_str()), &code)?;
        let groups = normalize(groups, &code.unique(), |g| &mut g.code)?;
        let groups = normalize(groups, &name, |g| &mut g.name)?;
        let groups = normalize(groups, &short_name, |g| &mut g.short_name)?;

        let payload = payload::data_element_groups(&groups)?;
        self.import(DATA_ELEMENT_GROUPS, &payload, groups.len(), self.options, summary)
            .await
    }

    async fn fetch_datasets(&self, state: &mut RunState) -> Result<()> {
        for dataset in &self.config.sources.datasets {
            self.load_table(dataset, &mut state.tables).await?;
            let table = loaded(&state.tables, dataset)?;
            for column in &dataset.id_columns {
                table.column_index(column)?;
            }
            tracing::info!(
                dataset = %dataset.name,
                rows = table.len(),
                columns = table.columns().len(),
                "Dataset loaded"
            );
        }
        Ok(())
    }

    fn reshape_and_join(&self, state: &mut RunState, summary: &mut BootstrapSummary) -> Result<()> {
        let strict = self.config.import.fail_on_join_mismatch;
        let mut values = Vec::new();

        for dataset in &self.config.sources.datasets {
            let table = loaded(&state.tables, dataset)?;
            let observations = observations(dataset, table)?;

            let by_org_unit = join_lookup(observations, &state.org_unit_ids, |o| {
                o.org_unit.as_str()
            });
            summary.record_join(&dataset.name, "orgUnit", by_org_unit.report);
            by_org_unit
                .report
                .check(&format!("{} / orgUnit", dataset.name), strict)?;

            let by_element = join_lookup(by_org_unit.rows, &state.element_ids, |(o, _)| {
                o.data_element.as_str()
            });
            summary.record_join(&dataset.name, "dataElement", by_element.report);
            by_element
                .report
                .check(&format!("{} / dataElement", dataset.name), strict)?;

            let before = values.len();
            values.extend(by_element.rows.into_iter().map(
                |((observation, org_unit), data_element)| {
                    DataValueRecord::new(
                        data_element,
                        observation.period,
                        org_unit,
                        observation.value,
                    )
                },
            ));
            tracing::info!(
                dataset = %dataset.name,
                records = values.len() - before,
                "Dataset reshaped"
            );
        }

        state.data_values = values;
        Ok(())
    }

    async fn import_data_values(
        &self,
        state: &mut RunState,
        summary: &mut BootstrapSummary,
    ) -> Result<()> {
        let expected = state.data_values.len();
        if expected == 0 {
            tracing::warn!("No data values to import");
            return Ok(());
        }

        let payload = payload::data_value_set(&state.data_values)?;
        let checksum = payload.checksum()?;
        let result = self.api.import_data_values(&payload).await?;
        result.ensure_accepted(DATA_VALUES, expected, true)?;
        summary.record_import(DATA_VALUES, result.accepted(true), checksum);

        crate::log_import_result!(DATA_VALUES, expected, result.accepted(true));
        Ok(())
    }

    async fn poll_recompute(&self, summary: &mut BootstrapSummary) -> Result<()> {
        let recompute = &self.config.recompute;
        let interval = Duration::from_millis(recompute.poll_interval_ms);

        for attempt in 1..=recompute.max_polls {
            let status = self.api.task_status(&recompute.task_type).await?;
            summary.polls = attempt;

            if status.completed {
                tracing::info!(polls = attempt, "Recompute completed");
                return Ok(());
            }

            crate::log_poll_attempt!(
                attempt,
                recompute.max_polls,
                status.message.as_deref().unwrap_or("running")
            );
            if attempt < recompute.max_polls {
                tokio::time::sleep(interval).await;
            }
        }

        Err(SeedError::Timeout(format!(
            "{} did not complete after {} status requests",
            recompute.task_type, recompute.max_polls
        )))
    }

    /// POST a metadata payload and require every object to be accepted
    async fn import(
        &self,
        object_type: &str,
        payload: &Payload,
        expected: usize,
        options: ImportOptions,
        summary: &mut BootstrapSummary,
    ) -> Result<()> {
        let checksum = payload.checksum()?;
        tracing::debug!(
            object_type,
            expected,
            content_type = payload.content_type(),
            checksum = %checksum,
            "Posting metadata"
        );

        let result = self.api.import_metadata(payload, options).await?;
        result.ensure_accepted(object_type, expected, options.counts_updates())?;

        let accepted = result.accepted(options.counts_updates());
        summary.record_import(object_type, accepted, checksum);
        crate::log_import_result!(object_type, expected, accepted);
        Ok(())
    }

    async fn constraint(&self, object_type: &str, property: &str) -> Result<SchemaConstraint> {
        let schema = self.api.schema_property(object_type, property).await?;
        Ok(schema.into_constraint(property))
    }

    /// Fetches and parses a dataset unless it is already loaded
    async fn load_table(
        &self,
        dataset: &DatasetConfig,
        tables: &mut HashMap<String, Table>,
    ) -> Result<()> {
        if tables.contains_key(&dataset.name) {
            return Ok(());
        }

        let bytes = self.source.fetch(&dataset.location).await?;
        let table = parse_table(&bytes, &self.config.sources.na_values)
            .with_context(|| format!("Failed to parse dataset '{}'", dataset.name))?
            .without_columns(&dataset.exclude_columns);
        tables.insert(dataset.name.clone(), table);
        Ok(())
    }
}

fn loaded<'a>(tables: &'a HashMap<String, Table>, dataset: &DatasetConfig) -> Result<&'a Table> {
    tables
        .get(&dataset.name)
        .ok_or_else(|| SeedError::Other(format!("dataset '{}' was not fetched", dataset.name)))
}

/// Fails if any key is longer than the constraint allows
///
/// Codes join records across sources, so they are never truncated.
fn ensure_fits<'a>(
    values: impl IntoIterator<Item = &'a str>,
    constraint: &SchemaConstraint,
) -> std::result::Result<(), ValidationError> {
    for value in values {
        if value.chars().count() > constraint.max_length {
            return Err(ValidationError::TooLong {
                field: constraint.name.clone(),
                value: value.to_string(),
                max_length: constraint.max_length,
            });
        }
    }
    Ok(())
}

/// Dictionary entries used by at least one dataset, first occurrence wins
fn select_entries(
    dictionary: Vec<DictionaryEntry>,
    datasets: &[DatasetConfig],
    used_codes: &[Vec<String>],
) -> Vec<DictionaryEntry> {
    let mut seen = HashSet::new();
    let mut selected = Vec::new();

    for entry in dictionary {
        let used = datasets.iter().zip(used_codes).any(|(dataset, codes)| {
            let same_dataset = entry
                .dataset
                .as_deref()
                .map_or(true, |d| d == dataset.name);
            same_dataset && codes.contains(&entry.code)
        });
        if used && seen.insert(entry.code.clone()) {
            selected.push(entry);
        }
    }

    selected
}

fn group_code(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

fn id_position(dataset: &DatasetConfig, column: &str) -> std::result::Result<usize, ValidationError> {
    dataset
        .id_columns
        .iter()
        .position(|c| c == column)
        .ok_or_else(|| ValidationError::UnknownColumn(column.to_string()))
}

/// Reshapes one dataset and resolves each value's element code and period
fn observations(dataset: &DatasetConfig, table: &Table) -> Result<Vec<Observation>> {
    let melt = reshape(table, &dataset.id_columns)?;
    let org_unit_idx = id_position(dataset, &dataset.org_unit_column)?;
    let period_idx = match (dataset.layout, &dataset.period_column) {
        (DatasetLayout::Variables, Some(column)) => Some(id_position(dataset, column)?),
        _ => None,
    };

    let mut out = Vec::with_capacity(melt.expected_len());
    let mut without_period = 0usize;

    for record in melt {
        let (data_element, period) = match dataset.layout {
            DatasetLayout::Variables => (
                record.variable.clone(),
                period_idx
                    .and_then(|i| record.id(i))
                    .unwrap_or_default()
                    .to_string(),
            ),
            DatasetLayout::Periods => (
                dataset.data_element.clone().unwrap_or_default(),
                match record.variable.strip_prefix(dataset.period_prefix.as_str()) {
                    Some(period) => period.to_string(),
                    None => String::new(),
                },
            ),
        };

        if period.is_empty() {
            without_period += 1;
            continue;
        }

        out.push(Observation {
            org_unit: record.id(org_unit_idx).unwrap_or_default().to_string(),
            data_element,
            period,
            value: record.value,
        });
    }

    if without_period > 0 {
        tracing::warn!(
            dataset = %dataset.name,
            skipped = without_period,
            "Skipped values without a period"
        );
    }

    Ok(out)
}
