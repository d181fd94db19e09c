//! A minimal HTTP/1.1 responder standing in for the hub and the database.

use std::collections;
use std::io;
use std::io::BufRead;
use std::io::Read;
use std::io::Write;
use std::net;
use std::sync;
use std::thread;

#[derive(Clone, Debug)]
pub struct Request {
    pub method: String,
    pub target: String,
    pub body: String,
}

#[derive(Clone)]
struct Response {
    status: u16,
    body: String,
}

pub struct StubServer {
    addr: net::SocketAddr,
    routes: sync::Arc<sync::Mutex<collections::HashMap<String, Response>>>,
    requests: sync::Arc<sync::Mutex<Vec<Request>>>,
}

impl StubServer {
    pub fn start() -> StubServer {
        let listener = net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let routes = sync::Arc::new(sync::Mutex::new(collections::HashMap::new()));
        let requests = sync::Arc::new(sync::Mutex::new(Vec::new()));

        let server_routes = routes.clone();
        let server_requests = requests.clone();
        thread::spawn(move || {
            for stream in listener.incoming() {
                let stream = match stream {
                    Ok(stream) => stream,
                    Err(_) => continue,
                };
                let _ = serve(stream, &server_routes, &server_requests);
            }
        });

        StubServer {
            addr,
            routes,
            requests,
        }
    }

    /// Answers requests whose path and query equal `target`. Unrouted
    /// requests get a 404.
    pub fn route(&self, target: &str, status: u16, body: &str) -> &Self {
        self.routes.lock().unwrap().insert(
            target.to_owned(),
            Response {
                status,
                body: body.to_owned(),
            },
        );
        self
    }

    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }
}

fn serve(
    stream: net::TcpStream,
    routes: &sync::Mutex<collections::HashMap<String, Response>>,
    requests: &sync::Mutex<Vec<Request>>,
) -> io::Result<()> {
    let mut reader = io::BufReader::new(stream.try_clone()?);

    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_owned();
    let target = parts.next().unwrap_or_default().to_owned();

    let mut content_length = 0;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line)?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some(idx) = line.find(':') {
            if line[..idx].eq_ignore_ascii_case("content-length") {
                content_length = line[idx + 1..].trim().parse().unwrap_or(0);
            }
        }
    }

    let mut body = vec![0; content_length];
    reader.read_exact(&mut body)?;

    requests.lock().unwrap().push(Request {
        method,
        target: target.clone(),
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let response = routes
        .lock()
        .unwrap()
        .get(&target)
        .cloned()
        .unwrap_or(Response {
            status: 404,
            body: "not found".to_owned(),
        });

    let mut stream = stream;
    if response.status == 204 {
        write!(
            stream,
            "HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n"
        )?;
    } else {
        write!(
            stream,
            "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            response.status,
            response.body.len(),
            response.body
        )?;
    }
    stream.flush()
}
