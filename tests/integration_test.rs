//! Tests de integración del servidor de archivos
//! tests/integration_test.rs
//!
//! Levantan el servidor completo (pool, cache, logger) sobre un puerto
//! efímero de loopback y un document root temporal.

use file_server::config::Config;
use file_server::error::{ConfigError, ServerError};
use file_server::logging::RequestRecord;
use file_server::server::Server;
use std::fs;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::path::Path;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

struct TestSite {
    dir: tempfile::TempDir,
}

impl TestSite {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("html");
        fs::create_dir_all(root.join("docs")).unwrap();
        fs::write(root.join("index.html"), "<h1>Welcome</h1>").unwrap();
        fs::write(root.join("docs").join("index.html"), "<h1>Docs</h1>").unwrap();
        fs::write(root.join("page.html"), "<p>page</p>").unwrap();
        fs::write(root.join("404.html"), "<h1>404 Not Found</h1>").unwrap();
        Self { dir }
    }

    fn config(&self, workers: usize) -> Config {
        Config {
            port: 0,
            document_root: self.dir.path().join("html").to_string_lossy().into_owned(),
            log_dir: self.dir.path().join("logs").to_string_lossy().into_owned(),
            log_file_name: "requests".to_string(),
            workers,
            ..Config::default()
        }
    }

    fn log_file(&self) -> std::path::PathBuf {
        self.dir.path().join("logs").join("requests.log")
    }
}

/// Acepta `connections` conexiones en otro thread y devuelve el servidor
fn serve(server: Server, connections: usize) -> JoinHandle<Server> {
    thread::spawn(move || {
        for _ in 0..connections {
            server.accept_one().unwrap();
        }
        server
    })
}

/// Helper: envía un request y retorna la response completa
fn send(addr: SocketAddr, request: &str) -> String {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(10))).unwrap();
    stream.write_all(request.as_bytes()).unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).unwrap();
    String::from_utf8_lossy(&response).into_owned()
}

fn get(addr: SocketAddr, path: &str) -> String {
    send(addr, &format!("GET {} HTTP/1.0\r\n\r\n", path))
}

/// Helper: extrae el body de una response HTTP
fn extract_body(response: &str) -> &str {
    match response.find("\r\n\r\n") {
        Some(pos) => &response[pos + 4..],
        None => "",
    }
}

fn read_records(path: &Path) -> Option<Vec<RequestRecord>> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

fn wait_for_records(path: &Path, count: usize) -> Vec<RequestRecord> {
    let start = Instant::now();
    while start.elapsed() < Duration::from_secs(10) {
        if let Some(records) = read_records(path) {
            if records.len() >= count {
                return records;
            }
        }
        thread::sleep(Duration::from_millis(20));
    }
    read_records(path).unwrap_or_default()
}

// ==================== Respuestas ====================

#[test]
fn test_serves_files_end_to_end() {
    let site = TestSite::new();
    let server = Server::bind(site.config(2)).unwrap();
    let addr = server.local_addr().unwrap();
    let handle = serve(server, 4);

    let home = get(addr, "/");
    assert!(home.starts_with("HTTP/1.0 200 OK\r\n"), "got: {}", home);
    assert!(home.contains("Content-Type: text/html\r\n"));
    assert!(home.contains("Server: file_server\r\n"));
    assert!(home.contains("Date: "));
    assert_eq!(extract_body(&home), "<h1>Welcome</h1>");

    let docs = get(addr, "/docs/?lang=es");
    assert_eq!(extract_body(&docs), "<h1>Docs</h1>");

    let missing = get(addr, "/missing.html");
    assert!(missing.starts_with("HTTP/1.0 404 Not Found\r\n"));
    assert_eq!(extract_body(&missing), "<h1>404 Not Found</h1>");

    let bad = send(addr, "DELETE /page.html HTTP/1.0\r\n\r\n");
    assert!(bad.starts_with("HTTP/1.0 400 Bad Request\r\n"));
    assert_eq!(extract_body(&bad), "");

    let server = handle.join().unwrap();
    server.shutdown();
}

#[test]
fn test_request_without_route_gets_no_response() {
    let site = TestSite::new();
    let server = Server::bind(site.config(1)).unwrap();
    let addr = server.local_addr().unwrap();
    let handle = serve(server, 1);

    assert_eq!(send(addr, "HOLA\r\n\r\n"), "");

    handle.join().unwrap().shutdown();
}

#[test]
fn test_parent_segments_are_not_served() {
    let site = TestSite::new();
    fs::write(site.dir.path().join("secret.txt"), "secreto").unwrap();
    let server = Server::bind(site.config(1)).unwrap();
    let addr = server.local_addr().unwrap();
    let handle = serve(server, 1);

    let response = get(addr, "/../secret.txt");
    assert!(response.starts_with("HTTP/1.0 404 Not Found\r\n"));
    assert!(!response.contains("secreto"));

    handle.join().unwrap().shutdown();
}

// ==================== Concurrencia ====================

#[test]
fn test_concurrent_clients() {
    let site = TestSite::new();
    let server = Server::bind(site.config(3)).unwrap();
    let addr = server.local_addr().unwrap();
    let handle = serve(server, 12);

    let clients: Vec<_> = (0..12)
        .map(|i| {
            thread::spawn(move || {
                let path = if i % 2 == 0 { "/page.html" } else { "/" };
                get(addr, path)
            })
        })
        .collect();

    for client in clients {
        let response = client.join().unwrap();
        assert!(response.starts_with("HTTP/1.0 200 OK\r\n"), "got: {}", response);
    }

    let server = handle.join().unwrap();
    let cached = format!("{}/page.html", server.config().document_root);
    assert!(server.cache().contains(&cached));
    server.shutdown();
}

// ==================== Log de requests ====================

#[test]
fn test_request_log_file_is_json_array() {
    let site = TestSite::new();
    let server = Server::bind(site.config(2)).unwrap();
    let addr = server.local_addr().unwrap();
    let handle = serve(server, 3);

    get(addr, "/");
    get(addr, "/missing.html");
    send(addr, "POST / HTTP/1.0\r\n\r\n");

    let records = wait_for_records(&site.log_file(), 3);
    assert_eq!(records.len(), 3);

    let mut statuses: Vec<_> = records.iter().map(|r| r.status).collect();
    statuses.sort();
    assert_eq!(statuses, vec![200, 400, 404]);
    assert!(records.iter().all(|r| r.origin == "127.0.0.1"));
    assert!(records.iter().any(|r| r.method == "POST" && r.route == "/"));

    handle.join().unwrap().shutdown();
}

// ==================== Configuración ====================

#[test]
fn test_invalid_config_is_rejected() {
    let site = TestSite::new();
    let mut config = site.config(1);
    config.workers = 0;

    match Server::bind(config) {
        Err(ServerError::Config(e)) => assert_eq!(e, ConfigError::NoWorkers),
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("server should not start with zero workers"),
    }
}
