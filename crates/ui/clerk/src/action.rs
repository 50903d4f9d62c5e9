use api::types::{FilterSummary, LoginResponse, MilestoneOverview};
use serde::{Deserialize, Serialize};
use strum::Display;

/// Screens the app can navigate to. The milestone board requires an
/// authenticated session; navigation falls back to `Login` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Route {
    Login,
    Register,
    Milestones,
}

/// Which workflow a submit completion belongs to, so pages only apply
/// outcomes that are theirs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Workflow {
    Registration,
    Milestone,
}

/// Resolution of one duplicate-ID probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckOutcome {
    Available,
    Taken,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Display)]
pub enum Action {
    Tick,
    Render,
    Resize(u16, u16),
    Suspend,
    Resume,
    Quit,
    Refresh,
    Error(String),
    Navigate(Route),
    Logout,
    /// Open the milestone editor, prefilled when editing an existing row.
    OpenMilestoneEditor(Option<MilestoneOverview>),
    ClosePopup,
    /// A duplicate-ID probe resolved. `candidate` is the text the probe was
    /// issued for; whether it still matters is decided where it lands.
    DuplicateChecked {
        candidate: String,
        outcome: CheckOutcome,
    },
    /// A create/update submit finished, message already screen-ready.
    SubmitFinished {
        workflow: Workflow,
        outcome: Result<(), String>,
    },
    LoginFinished(Result<LoginResponse, String>),
    MilestonesLoaded(Result<Vec<MilestoneOverview>, String>),
    FiltersLoaded(Result<FilterSummary, String>),
}
