//! User-facing message lines.
//!
//! Every string a screen can show lives here so wording stays consistent
//! between the validators, the coordinators, and the tests that pin it.
//! Transport failures use [`api::error::CONNECTION_FAILED`].

pub const ID_REQUIRED: &str = "enter an id.";
pub const ID_TOO_LONG: &str = "ids are 16 characters or fewer.";
pub const PASSWORD_REQUIRED: &str = "enter a password.";
pub const PASSWORD_TOO_LONG: &str = "passwords are 12 characters or fewer.";
pub const PASSWORD_MISMATCH: &str = "passwords do not match.";
pub const NICKNAME_REQUIRED: &str = "enter a nickname.";
pub const NICKNAME_TOO_LONG: &str = "nicknames are 16 characters or fewer.";
pub const TITLE_REQUIRED: &str = "enter a title.";
pub const DATE_SHAPE: &str = "enter the date as YYYY. MM. DD.";

pub const ID_AVAILABLE: &str = "this id can be used.";
pub const ID_TAKEN: &str = "this id is already in use.";
pub const CHECKING: &str = "checking...";

pub const SUBMITTING: &str = "submitting...";
pub const SIGNING_IN: &str = "signing in...";
pub const LOADING: &str = "loading...";
