use thiserror::Error;

/// Failure of a single request against the logbook service.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("could not reach the logbook service: {0}")]
    Transport(String),
    #[error("{status} {status_text}:\n{body}")]
    Status {
        status: u16,
        status_text: String,
        body: String,
    },
    #[error("could not parse the response body:\n{body}")]
    Parse {
        body: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not encode the request: {0}")]
    Serialize(String),
    #[error("could not read the response body")]
    Read(#[from] std::io::Error),
}
