use crate::api::{error::*, experiment::*, file::*, id::*, run::*};

#[rustfmt::skip]
pub trait Client {
    fn active_experiment(&mut self, instrument: &str, station: u32) -> Result<ExperimentName, RequestError>;
    fn experiment_info(&mut self, experiment: &ExperimentName) -> Result<ExperimentInfo, RequestError>;

    fn current_run(&mut self, experiment: &ExperimentName) -> Result<Option<RunNumber>, RequestError>;
    fn start_run(&mut self, experiment: &ExperimentName, run_type: Option<&str>) -> Result<RunNumber, RequestError>;
    fn end_run(&mut self, experiment: &ExperimentName) -> Result<RunNumber, RequestError>;

    fn add_run_params(&mut self, experiment: &ExperimentName, params: &RunParams) -> Result<serde_json::Value, RequestError>;
    fn add_update_run_param_descriptions(&mut self, experiment: &ExperimentName, descriptions: &ParamDescriptions) -> Result<Option<serde_json::Value>, RequestError>;

    fn register_file(&mut self, experiment: &ExperimentName, file: &mut FileInfo) -> Result<serde_json::Value, RequestError>;
}
