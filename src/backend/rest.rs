use crate::{
    api::{
        client::Client,
        error::RequestError,
        experiment::{ExperimentInfo, ExperimentRecord},
        file::{relative_path, FileInfo},
        run::{truthy_run, ParamDescriptions, RunParams, RunValue},
    },
    config::{AuthMode, Config},
    ExperimentName, RunNumber,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{debug, error};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;

/// Client for the logbook web service.
///
/// Every method is a single blocking request. The only state kept between
/// calls is the set of parameter descriptions already sent, so unchanged
/// descriptions are not submitted again.
pub struct Server {
    base_url: String,
    auth: AuthMode,
    verbose: bool,
    authorization: String,
    descriptions: HashMap<String, String>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        let Config {
            endpoint,
            uid,
            password,
            auth,
            verbose,
        } = config;
        let mut base_url = endpoint;
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        if auth == AuthMode::Kerberos {
            debug!("Kerberos authentication requested; requests still use basic auth");
        }
        let credentials = format!("{}:{}", uid, password.unwrap_or_default());
        Server {
            base_url,
            auth,
            verbose,
            authorization: format!("Basic {}", STANDARD.encode(credentials)),
            descriptions: HashMap::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth_mode(&self) -> AuthMode {
        self.auth
    }

    /// The description last sent for `param`, if any.
    pub fn cached_description(&self, param: &str) -> Option<&str> {
        self.descriptions.get(param).map(String::as_str)
    }

    fn url<Ep: Endpoint>(&self, request: &Ep) -> Result<String, RequestError> {
        let url = format!("{}{}", self.base_url, request.path());
        match Ep::ENCODING {
            Encoding::Query => {
                let query = serde_qs::to_string(request)
                    .map_err(|err| RequestError::Serialize(err.to_string()))?;
                if query.is_empty() {
                    Ok(url)
                } else {
                    Ok(format!("{}?{}", url, query))
                }
            }
            Encoding::Json => Ok(url),
        }
    }

    fn execute<Ep: Endpoint>(&self, request: Ep) -> Result<Ep::Value, RequestError> {
        let url = self.url(&request)?;
        if self.verbose {
            debug!("Sending request to {}", url);
        }
        let mut http_request = Ep::METHOD(&url);
        http_request.set("Authorization", &self.authorization);
        let http_response = match Ep::ENCODING {
            Encoding::Query => http_request.call(),
            Encoding::Json => {
                let buffer = serde_json::to_string(&request)
                    .map_err(|err| RequestError::Serialize(err.to_string()))?;
                http_request
                    .set("Content-Type", "application/json")
                    .send_string(&buffer)
            }
        };

        if let Some(err) = http_response.synthetic_error() {
            return Err(RequestError::Transport(err.to_string()));
        }
        if http_response.error() {
            let status = http_response.status();
            let status_text = http_response.status_text().to_string();
            let body = http_response
                .into_string()
                .unwrap_or_else(|_| "Could not turn error body into String.".to_string());
            return Err(RequestError::Status {
                status,
                status_text,
                body,
            });
        }

        let body = http_response.into_string()?;
        match serde_json::from_str::<Ep::Response>(&body) {
            Ok(response) => Ok(request.extract(response)),
            Err(source) => {
                error!("Could not parse the response from {}: {}", url, body);
                Err(RequestError::Parse { body, source })
            }
        }
    }
}

impl Client for Server {
    fn active_experiment(&mut self, instrument: &str, station: u32) -> Result<ExperimentName, RequestError> {
        debug!("Getting current active experiment for {} {}", instrument, station);
        let request = ActiveExperiment {
            instrument_name: instrument,
            station,
        };
        self.execute(request)
    }

    fn experiment_info(&mut self, experiment: &ExperimentName) -> Result<ExperimentInfo, RequestError> {
        debug!("Getting experiment details for experiment {}", experiment);
        self.execute(GetExperimentInfo { experiment })
    }

    fn current_run(&mut self, experiment: &ExperimentName) -> Result<Option<RunNumber>, RequestError> {
        debug!("Getting the current run for experiment {}", experiment);
        self.execute(CurrentRun { experiment })
    }

    fn start_run(&mut self, experiment: &ExperimentName, run_type: Option<&str>) -> Result<RunNumber, RequestError> {
        debug!("Starting a new run for experiment {}", experiment);
        self.execute(StartRun { experiment, run_type })
    }

    fn end_run(&mut self, experiment: &ExperimentName) -> Result<RunNumber, RequestError> {
        debug!("Ending the current run for experiment {}", experiment);
        self.execute(EndRun { experiment })
    }

    fn add_run_params(&mut self, experiment: &ExperimentName, params: &RunParams) -> Result<serde_json::Value, RequestError> {
        debug!("Adding {} run params for experiment {}", params.len(), experiment);
        self.execute(AddRunParams { experiment, params })
    }

    fn add_update_run_param_descriptions(
        &mut self,
        experiment: &ExperimentName,
        descriptions: &ParamDescriptions,
    ) -> Result<Option<serde_json::Value>, RequestError> {
        let changed: ParamDescriptions = descriptions
            .iter()
            .filter(|(param, description)| self.descriptions.get(*param) != Some(*description))
            .map(|(param, description)| (param.clone(), description.clone()))
            .collect();
        if changed.is_empty() {
            debug!("Run param descriptions for experiment {} are unchanged", experiment);
            return Ok(None);
        }

        debug!("Updating {} run param descriptions for experiment {}", changed.len(), experiment);
        let response = self.execute(AddUpdateRunParamDescriptions {
            experiment,
            descriptions: &changed,
        })?;
        self.descriptions.extend(changed);
        Ok(Some(response))
    }

    fn register_file(&mut self, experiment: &ExperimentName, file: &mut FileInfo) -> Result<serde_json::Value, RequestError> {
        let path = relative_path(experiment.as_ref(), &file.absolute_path).to_owned();
        debug!("Registering file {} for experiment {}", path, experiment);
        file.path = Some(path);
        self.execute(RegisterFile { experiment, file })
    }
}

enum Encoding {
    /// Request fields go into the query string of a GET.
    Query,
    /// Request is the JSON body of a POST.
    Json,
}

trait Endpoint: Serialize {
    const METHOD: fn(&str) -> ureq::Request;
    const ENCODING: Encoding;

    type Response: DeserializeOwned;
    type Value;

    fn path(&self) -> String;
    fn extract(&self, response: Self::Response) -> Self::Value;
}

#[derive(Deserialize)]
struct ValueResponse<T> {
    value: T,
}

#[derive(Debug, Clone, Copy, Serialize)]
struct ActiveExperiment<'a> {
    pub instrument_name: &'a str,
    pub station: u32,
}
#[derive(Deserialize)]
struct NamedValue {
    name: ExperimentName,
}
impl Endpoint for ActiveExperiment<'_> {
    const METHOD: fn(&str) -> ureq::Request = ureq::get;
    const ENCODING: Encoding = Encoding::Query;
    type Response = ValueResponse<NamedValue>;
    type Value = ExperimentName;

    fn path(&self) -> String {
        "lgbk/ws/activeexperiment_for_instrument_station".to_string()
    }

    fn extract(&self, response: Self::Response) -> Self::Value {
        response.value.name
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
struct GetExperimentInfo<'a> {
    #[serde(skip)]
    pub experiment: &'a ExperimentName,
}
impl Endpoint for GetExperimentInfo<'_> {
    const METHOD: fn(&str) -> ureq::Request = ureq::get;
    const ENCODING: Encoding = Encoding::Query;
    type Response = ValueResponse<ExperimentRecord>;
    type Value = ExperimentInfo;

    fn path(&self) -> String {
        format!("lgbk/{}/ws/info", self.experiment)
    }

    fn extract(&self, response: Self::Response) -> Self::Value {
        response.value.into_info(self.experiment)
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
struct CurrentRun<'a> {
    #[serde(skip)]
    pub experiment: &'a ExperimentName,
}
#[derive(Deserialize)]
struct CurrentRunResponse {
    #[serde(default, deserialize_with = "truthy_run")]
    value: Option<RunValue>,
}
impl Endpoint for CurrentRun<'_> {
    const METHOD: fn(&str) -> ureq::Request = ureq::get;
    const ENCODING: Encoding = Encoding::Query;
    type Response = CurrentRunResponse;
    type Value = Option<RunNumber>;

    fn path(&self) -> String {
        format!("run_control/{}/ws/current_run", self.experiment)
    }

    fn extract(&self, response: Self::Response) -> Self::Value {
        response.value.map(|run| run.number())
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
struct StartRun<'a> {
    #[serde(skip)]
    pub experiment: &'a ExperimentName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_type: Option<&'a str>,
}
impl Endpoint for StartRun<'_> {
    const METHOD: fn(&str) -> ureq::Request = ureq::get;
    const ENCODING: Encoding = Encoding::Query;
    type Response = ValueResponse<RunValue>;
    type Value = RunNumber;

    fn path(&self) -> String {
        format!("run_control/{}/ws/start_run", self.experiment)
    }

    fn extract(&self, response: Self::Response) -> Self::Value {
        response.value.number()
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
struct EndRun<'a> {
    #[serde(skip)]
    pub experiment: &'a ExperimentName,
}
impl Endpoint for EndRun<'_> {
    const METHOD: fn(&str) -> ureq::Request = ureq::get;
    const ENCODING: Encoding = Encoding::Query;
    type Response = ValueResponse<RunValue>;
    type Value = RunNumber;

    fn path(&self) -> String {
        format!("run_control/{}/ws/end_run", self.experiment)
    }

    fn extract(&self, response: Self::Response) -> Self::Value {
        response.value.number()
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(transparent)]
struct AddRunParams<'a> {
    #[serde(skip)]
    pub experiment: &'a ExperimentName,
    pub params: &'a RunParams,
}
impl Endpoint for AddRunParams<'_> {
    const METHOD: fn(&str) -> ureq::Request = ureq::post;
    const ENCODING: Encoding = Encoding::Json;
    type Response = serde_json::Value;
    type Value = serde_json::Value;

    fn path(&self) -> String {
        format!("run_control/{}/ws/add_run_params", self.experiment)
    }

    fn extract(&self, response: Self::Response) -> Self::Value {
        response
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(transparent)]
struct AddUpdateRunParamDescriptions<'a> {
    #[serde(skip)]
    pub experiment: &'a ExperimentName,
    pub descriptions: &'a ParamDescriptions,
}
impl Endpoint for AddUpdateRunParamDescriptions<'_> {
    const METHOD: fn(&str) -> ureq::Request = ureq::post;
    const ENCODING: Encoding = Encoding::Json;
    type Response = serde_json::Value;
    type Value = serde_json::Value;

    fn path(&self) -> String {
        format!("run_control/{}/ws/add_update_run_param_descriptions", self.experiment)
    }

    fn extract(&self, response: Self::Response) -> Self::Value {
        response
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(transparent)]
struct RegisterFile<'a> {
    #[serde(skip)]
    pub experiment: &'a ExperimentName,
    pub file: &'a FileInfo,
}
impl Endpoint for RegisterFile<'_> {
    const METHOD: fn(&str) -> ureq::Request = ureq::post;
    const ENCODING: Encoding = Encoding::Json;
    type Response = serde_json::Value;
    type Value = serde_json::Value;

    fn path(&self) -> String {
        format!("lgbk/{}/ws/register_file", self.experiment)
    }

    fn extract(&self, response: Self::Response) -> Self::Value {
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(endpoint: &str) -> Server {
        Server::new(Config::new(endpoint).credentials("opr", "secret"))
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        assert_eq!(server("https://host/ws-auth").base_url(), "https://host/ws-auth/");
        assert_eq!(server("https://host/ws-auth/").base_url(), "https://host/ws-auth/");
    }

    #[test]
    fn authorization_is_basic_auth() {
        assert_eq!(server("https://host/").authorization, "Basic b3ByOnNlY3JldA==");
    }

    #[test]
    fn kerberos_still_sends_basic_auth() {
        let server = Server::new(
            Config::new("https://host/")
                .credentials("opr", "secret")
                .use_kerberos(true),
        );
        assert_eq!(server.auth_mode(), AuthMode::Kerberos);
        assert_eq!(server.authorization, "Basic b3ByOnNlY3JldA==");
    }

    #[test]
    fn query_strings() {
        let server = server("https://host/");
        let experiment = ExperimentName::from("xpptut15");
        assert_eq!(
            server
                .url(&StartRun {
                    experiment: &experiment,
                    run_type: None
                })
                .unwrap(),
            "https://host/run_control/xpptut15/ws/start_run"
        );
        assert_eq!(
            server
                .url(&StartRun {
                    experiment: &experiment,
                    run_type: Some("DARK")
                })
                .unwrap(),
            "https://host/run_control/xpptut15/ws/start_run?run_type=DARK"
        );
        assert_eq!(
            server
                .url(&ActiveExperiment {
                    instrument_name: "XPP",
                    station: 0
                })
                .unwrap(),
            "https://host/lgbk/ws/activeexperiment_for_instrument_station?instrument_name=XPP&station=0"
        );
    }

    #[test]
    fn json_bodies_are_plain_maps() {
        let experiment = ExperimentName::from("xpptut15");
        let mut params = RunParams::new();
        params.insert("events".to_string(), 10i64.into());
        let body = serde_json::to_string(&AddRunParams {
            experiment: &experiment,
            params: &params,
        })
        .unwrap();
        assert_eq!(body, r#"{"events":10}"#);
    }

    #[test]
    fn parse_active_experiment_response() {
        let response = r#"{"success": true, "value": {"name": "xpptut15", "id": "abc"}}"#;
        let parsed = serde_json::from_str::<ValueResponse<NamedValue>>(response).unwrap();
        assert_eq!(parsed.value.name.as_ref(), "xpptut15");
    }

    #[test]
    fn parse_end_run_response() {
        let response = r#"{"success": true, "value": {"num": 42, "begin_time": "2020-01-01"}}"#;
        let parsed = serde_json::from_str::<ValueResponse<RunValue>>(response).unwrap();
        assert_eq!(parsed.value.number(), RunNumber::from(42));
    }
}
