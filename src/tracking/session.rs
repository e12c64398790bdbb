use crate::{
    api::{
        error::RequestError,
        experiment::ExperimentInfo,
        file::FileInfo,
        run::{ParamDescriptions, ParamValue, RunParams},
    },
    backend::rest::Server,
    config::{Config, ConfigError},
    Client, ExperimentName, RunNumber,
};
use std::path::Path;
use thiserror::Error;

const DETECTORS_PREFIX: &str = "DAQ Detectors/";
const TOTAL_EVENTS: &str = "DAQ Detector Totals/Events";
const TOTAL_DAMAGED: &str = "DAQ Detector Totals/Damaged";
const TOTAL_SIZE: &str = "DAQ Detector Totals/Size";

/// Which experiment a [`Session`] works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Experiment(ExperimentName),
    /// Whatever experiment is currently active on this instrument station.
    /// Most instruments only have station 0.
    Station { instrument: String, station: u32 },
}

impl Target {
    pub fn experiment(name: impl Into<ExperimentName>) -> Self {
        Target::Experiment(name.into())
    }

    pub fn station(instrument: impl Into<String>, station: u32) -> Self {
        Target::Station {
            instrument: instrument.into(),
            station,
        }
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("specify either the instrument/station or the experiment name")]
    MissingTarget,
    #[error("invalid logbook configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("an error ocurred while talking to the logbook: {0}")]
    Request(#[from] RequestError),
    #[error("cannot register a file without a path")]
    MissingPath,
}

/// A logbook client bound to one experiment.
///
/// The experiment is resolved once when the session is opened, together with
/// its [`ExperimentInfo`]. All run control calls then apply to it.
pub struct Session<C: Client> {
    client: C,
    experiment: ExperimentName,
    info: ExperimentInfo,
}

impl Session<Server> {
    pub fn connect(config: Config, target: Target) -> Result<Self, SessionError> {
        config.validate()?;
        Session::open(Server::new(config), target)
    }

    pub fn from_config_file(path: impl AsRef<Path>, target: Target) -> Result<Self, SessionError> {
        let config = Config::from_file(path)?;
        Session::connect(config, target)
    }
}

impl<C: Client> Session<C> {
    pub fn open(mut client: C, target: Target) -> Result<Self, SessionError> {
        let experiment = match target {
            Target::Experiment(name) if !name.as_ref().is_empty() => name,
            Target::Station { instrument, station } if !instrument.is_empty() => {
                client.active_experiment(&instrument, station)?
            }
            _ => return Err(SessionError::MissingTarget),
        };
        let info = client.experiment_info(&experiment)?;
        log::info!("Opened logbook session for experiment {}", experiment);
        Ok(Session {
            client,
            experiment,
            info,
        })
    }

    pub fn experiment(&self) -> &ExperimentName {
        &self.experiment
    }

    pub fn info(&self) -> &ExperimentInfo {
        &self.info
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn into_client(self) -> C {
        self.client
    }

    /// `None` until the first run of the experiment was started.
    pub fn current_run(&mut self) -> Result<Option<RunNumber>, RequestError> {
        self.client.current_run(&self.experiment)
    }

    pub fn start_run(&mut self, run_type: Option<&str>) -> Result<RunNumber, RequestError> {
        self.client.start_run(&self.experiment, run_type)
    }

    /// Ends the current run. The current run keeps its number afterwards.
    pub fn end_run(&mut self) -> Result<RunNumber, RequestError> {
        self.client.end_run(&self.experiment)
    }

    pub fn add_run_params(&mut self, params: &RunParams) -> Result<serde_json::Value, RequestError> {
        self.client.add_run_params(&self.experiment, params)
    }

    pub fn add_update_run_param_descriptions(
        &mut self,
        descriptions: &ParamDescriptions,
    ) -> Result<Option<serde_json::Value>, RequestError> {
        self.client
            .add_update_run_param_descriptions(&self.experiment, descriptions)
    }

    /// Marks each named detector as part of the current run.
    pub fn report_detectors<S: AsRef<str>>(&mut self, names: &[S]) -> Result<serde_json::Value, RequestError> {
        let params: RunParams = names
            .iter()
            .map(|name| (format!("{}{}", DETECTORS_PREFIX, name.as_ref()), ParamValue::Bool(true)))
            .collect();
        self.add_run_params(&params)
    }

    pub fn report_totals(&mut self, events: i64, damaged: i64, gigabytes: f64) -> Result<serde_json::Value, RequestError> {
        let mut params = RunParams::new();
        params.insert(TOTAL_EVENTS.to_string(), events.into());
        params.insert(TOTAL_DAMAGED.to_string(), damaged.into());
        params.insert(TOTAL_SIZE.to_string(), gigabytes.into());
        self.add_run_params(&params)
    }

    /// Registers a newly opened data file with the logbook.
    pub fn report_open_file(&mut self, path: &str, hostname: Option<&str>) -> Result<serde_json::Value, SessionError> {
        if path.is_empty() {
            return Err(SessionError::MissingPath);
        }
        let mut file = FileInfo::new(path).with_generation(1);
        if let Some(hostname) = hostname {
            file = file.with_hostname(hostname);
        }
        Ok(self.client.register_file(&self.experiment, &mut file)?)
    }
}
