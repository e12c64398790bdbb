use rouille::{Request, Response};
use std::{
    collections::HashMap,
    io::Read,
    sync::{mpsc::Sender, Arc, Mutex},
    thread::JoinHandle,
};

pub const ROOT: &str = "/ws-auth/";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: String,
    pub authorization: Option<String>,
    pub body: String,
}

/// A logbook stand-in answering canned responses and recording every request.
pub struct MockLogbook {
    pub url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
    handle: Option<JoinHandle<()>>,
    stop: Sender<()>,
}

impl MockLogbook {
    /// `routes` maps paths below the service root to a status and body.
    /// Unknown paths get a 404.
    pub fn start(routes: &[(&str, u16, &str)]) -> Self {
        let routes: HashMap<String, (u16, String)> = routes
            .iter()
            .map(|(path, status, body)| (path.to_string(), (*status, body.to_string())))
            .collect();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&requests);

        let server = rouille::Server::new("127.0.0.1:0", move |request: &Request| {
            let mut body = String::new();
            if let Some(mut data) = request.data() {
                data.read_to_string(&mut body).unwrap();
            }
            let url = request.url();
            let path = url.trim_start_matches(ROOT).to_string();
            recorder.lock().unwrap().push(Recorded {
                method: request.method().to_string(),
                path: path.clone(),
                query: request.raw_query_string().to_string(),
                authorization: request.header("Authorization").map(str::to_string),
                body,
            });
            match routes.get(&path) {
                Some((status, body)) => Response::text(body.clone()).with_status_code(*status),
                None => Response::empty_404(),
            }
        })
        .expect("failed to start the mock logbook");

        // no trailing slash, the client has to add it
        let url = format!("http://{}{}", server.server_addr(), ROOT.trim_end_matches('/'));
        let (handle, stop) = server.stoppable();
        MockLogbook {
            url,
            requests,
            handle: Some(handle),
            stop,
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Recorded {
        self.requests().pop().expect("no request was made")
    }
}

impl Drop for MockLogbook {
    fn drop(&mut self) {
        let _ = self.stop.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
