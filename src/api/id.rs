use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

// EXPERIMENTS

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExperimentName(String);

impl AsRef<str> for ExperimentName {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}

impl From<String> for ExperimentName {
    fn from(name: String) -> Self {
        ExperimentName(name)
    }
}

impl From<&str> for ExperimentName {
    fn from(name: &str) -> Self {
        ExperimentName(name.to_owned())
    }
}

impl Display for ExperimentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// RUNS

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunNumber(i64);

impl RunNumber {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for RunNumber {
    fn from(num: i64) -> Self {
        RunNumber(num)
    }
}

impl From<RunNumber> for i64 {
    fn from(num: RunNumber) -> Self {
        num.0
    }
}

impl Display for RunNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
