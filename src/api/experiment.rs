use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use crate::ExperimentName;

/// Details about an experiment as known to the logbook.
///
/// Fields the server does not report are left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentInfo {
    pub name: String,
    pub description: String,
    pub proposal_id: String,
    pub leader_account: String,
    pub contact_info: String,
    pub posix_gid: String,
    pub instrument_name: String,
}

impl Display for ExperimentInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Description: {}", self.description)?;
        writeln!(f, "Proposal id: {}", self.proposal_id)?;
        writeln!(f, "Leader Account: {}", self.leader_account)?;
        writeln!(f, "Contact Info: {}", self.contact_info)?;
        writeln!(f, "Posix gid: {}", self.posix_gid)?;
        writeln!(f, "Instrument: {}", self.instrument_name)
    }
}

/// The `value` object of `lgbk/{experiment}/ws/info`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ExperimentRecord {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    params: Option<ExperimentParams>,
    #[serde(default)]
    leader_account: Option<String>,
    #[serde(default)]
    contact_info: Option<String>,
    #[serde(default)]
    posix_group: Option<String>,
    #[serde(default)]
    instrument: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ExperimentParams {
    #[serde(rename = "PNR", default)]
    pnr: Option<String>,
}

impl ExperimentRecord {
    pub(crate) fn into_info(self, name: &ExperimentName) -> ExperimentInfo {
        ExperimentInfo {
            name: name.to_string(),
            description: self.description.unwrap_or_default(),
            proposal_id: self.params.and_then(|p| p.pnr).unwrap_or_default(),
            leader_account: self.leader_account.unwrap_or_default(),
            contact_info: self.contact_info.unwrap_or_default(),
            posix_gid: self.posix_group.unwrap_or_default(),
            instrument_name: self.instrument.unwrap_or_default(),
        }
    }
}
