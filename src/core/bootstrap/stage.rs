//! Bootstrap stages
//!
//! The run is a fixed, non-branching sequence. Each stage consumes what the
//! earlier ones produced, so the order is also the dependency order.

use std::fmt;

/// One step of a bootstrap run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BootstrapStage {
    Authenticate,
    ImportOrgUnits,
    VerifyOrgUnits,
    SetOrgUnitLevels,
    AssignUserHomeOrgUnit,
    ImportUserRole,
    ImportUsers,
    ImportDataElements,
    ImportDataElementGroups,
    FetchExternalDatasets,
    ReshapeAndJoin,
    ImportDataValues,
    TriggerRecompute,
    PollRecomputeStatus,
    Done,
}

impl BootstrapStage {
    /// Every stage in execution order
    pub const ALL: [BootstrapStage; 15] = [
        BootstrapStage::Authenticate,
        BootstrapStage::ImportOrgUnits,
        BootstrapStage::VerifyOrgUnits,
        BootstrapStage::SetOrgUnitLevels,
        BootstrapStage::AssignUserHomeOrgUnit,
        BootstrapStage::ImportUserRole,
        BootstrapStage::ImportUsers,
        BootstrapStage::ImportDataElements,
        BootstrapStage::ImportDataElementGroups,
        BootstrapStage::FetchExternalDatasets,
        BootstrapStage::ReshapeAndJoin,
        BootstrapStage::ImportDataValues,
        BootstrapStage::TriggerRecompute,
        BootstrapStage::PollRecomputeStatus,
        BootstrapStage::Done,
    ];

    /// The stage that follows this one; `Done` is terminal
    pub fn next(self) -> Option<BootstrapStage> {
        let idx = Self::ALL.iter().position(|s| *s == self)?;
        Self::ALL.get(idx + 1).copied()
    }

    pub fn is_terminal(self) -> bool {
        self == BootstrapStage::Done
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BootstrapStage::Authenticate => "Authenticate",
            BootstrapStage::ImportOrgUnits => "ImportOrgUnits",
            BootstrapStage::VerifyOrgUnits => "VerifyOrgUnits",
            BootstrapStage::SetOrgUnitLevels => "SetOrgUnitLevels",
            BootstrapStage::AssignUserHomeOrgUnit => "AssignUserHomeOrgUnit",
            BootstrapStage::ImportUserRole => "ImportUserRole",
            BootstrapStage::ImportUsers => "ImportUsers",
            BootstrapStage::ImportDataElements => "ImportDataElements",
            BootstrapStage::ImportDataElementGroups => "ImportDataElementGroups",
            BootstrapStage::FetchExternalDatasets => "FetchExternalDatasets",
            BootstrapStage::ReshapeAndJoin => "ReshapeAndJoin",
            BootstrapStage::ImportDataValues => "ImportDataValues",
            BootstrapStage::TriggerRecompute => "TriggerRecompute",
            BootstrapStage::PollRecomputeStatus => "PollRecomputeStatus",
            BootstrapStage::Done => "Done",
        }
    }
}

impl fmt::Display for BootstrapStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
