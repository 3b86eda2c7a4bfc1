use http::Method;
use sessionnet::base::neterror::NetError;
use sessionnet::session::Session;
use sessionnet::transport::{HyperTransport, Transport, TransportRequest};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Read one request, including a `Content-Length` body.
async fn read_request(socket: &mut TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = socket.read(&mut buf).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);

        let text = String::from_utf8_lossy(&data);
        if let Some(head_end) = text.find("\r\n\r\n") {
            let body_len = text[..head_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if data.len() >= head_end + 4 + body_len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&data).into_owned()
}

fn header_value<'a>(request: &'a str, name: &str) -> Option<&'a str> {
    request.lines().find_map(|line| {
        let (n, v) = line.split_once(':')?;
        n.eq_ignore_ascii_case(name).then(|| v.trim())
    })
}

fn respond(status: &str, extra: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        extra,
        body.len(),
        body
    )
}

/// Serves a small site whose pages require `sid=good`.
async fn spawn_site(log: Arc<Mutex<Vec<String>>>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            if let Ok((mut socket, _)) = listener.accept().await {
                let log = log.clone();
                tokio::spawn(async move {
                    let request = read_request(&mut socket).await;
                    log.lock().unwrap().push(request.clone());

                    let logged_in = header_value(&request, "cookie")
                        .is_some_and(|c| c.contains("sid=good"));
                    let response = if request.starts_with("POST /app/login.do") {
                        respond("200 OK", "Set-Cookie: sid=good; Path=/\r\n", "welcome")
                    } else if request.starts_with("GET /app/home") && !logged_in {
                        respond(
                            "302 Found",
                            "Location: /app/portal\r\nSet-Cookie: tracker=1; Path=/\r\n",
                            "",
                        )
                    } else if request.starts_with("GET /app/home") {
                        respond("200 OK", "", "<html>home</html>")
                    } else if request.starts_with("GET /app/portal") {
                        respond("200 OK", "", "<html><p>Please log in</p></html>")
                    } else {
                        respond("404 Not Found", "", "missing")
                    };
                    let _ = socket.write_all(response.as_bytes()).await;
                });
            }
        }
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_fetch_returns_raw_redirect() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let base = spawn_site(log.clone()).await;

    let transport = HyperTransport::new().unwrap();
    let mut request = TransportRequest::new(format!("{}/app/home?x=1", base), Method::GET);
    request.headers.insert("referer", "http://example.com/").unwrap();

    let response = transport.fetch(request).await.unwrap();

    assert_eq!(response.status().as_u16(), 302);
    assert_eq!(response.location(), Some("/app/portal"));
    assert_eq!(response.set_cookies().collect::<Vec<_>>(), vec!["tracker=1; Path=/"]);

    let seen = log.lock().unwrap()[0].clone();
    assert!(seen.starts_with("GET /app/home?x=1 HTTP/1.1"));
    assert_eq!(header_value(&seen, "referer"), Some("http://example.com/"));
    assert!(header_value(&seen, "host").unwrap().starts_with("127.0.0.1:"));
}

#[tokio::test]
async fn test_fetch_fails_on_error_status() {
    let base = spawn_site(Arc::new(Mutex::new(Vec::new()))).await;
    let transport = HyperTransport::new().unwrap();

    let url = format!("{}/nowhere", base);
    let err = transport
        .fetch(TransportRequest::new(url.clone(), Method::GET))
        .await
        .unwrap_err();
    assert_eq!(err, NetError::HttpStatus { status: 404, url });

    let lenient = HyperTransport::builder().error_for_status(false).build().unwrap();
    let response = lenient
        .fetch(TransportRequest::new(format!("{}/nowhere", base), Method::GET))
        .await
        .unwrap();
    assert_eq!(response.body(), "missing");
}

#[tokio::test]
async fn test_connection_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport = HyperTransport::new().unwrap();
    let err = transport
        .fetch(TransportRequest::new(format!("http://{}/", addr), Method::GET))
        .await
        .unwrap_err();
    assert!(matches!(err, NetError::ConnectionFailedTo { .. }));
}

#[tokio::test]
async fn test_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        // accept and never answer
        let (_socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
    });

    let transport = HyperTransport::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();
    let err = transport
        .fetch(TransportRequest::new(format!("http://{}/", addr), Method::GET))
        .await
        .unwrap_err();
    assert_eq!(err, NetError::ConnectionTimedOut);
}

#[tokio::test]
async fn test_session_end_to_end_relogin() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let base = spawn_site(log.clone()).await;

    let mut session = Session::builder(format!("{}/app", base))
        .login_path("/login.do")
        .login_form(&[("user", "alice"), ("password", "s3cret!")])
        .logout_indicator("Please log in")
        .refetch_on_login(true)
        .build()
        .unwrap();

    let body = session.get("/home").await.unwrap();

    assert_eq!(body, "<html>home</html>");
    assert_eq!(session.cookies(), "tracker=1; sid=good");

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 4);
    assert!(log[0].starts_with("GET /app/home"));
    assert!(log[1].starts_with("GET /app/portal"));
    assert_eq!(header_value(&log[1], "cookie"), Some("tracker=1"));
    assert_eq!(
        header_value(&log[1], "referer"),
        Some(format!("{}/app/home", base).as_str())
    );

    assert!(log[2].starts_with("POST /app/login.do"));
    assert_eq!(
        header_value(&log[2], "content-type"),
        Some("application/x-www-form-urlencoded")
    );
    assert!(log[2].ends_with("user=alice&password=s3cret%21"));

    assert!(log[3].starts_with("GET /app/home"));
    assert_eq!(header_value(&log[3], "cookie"), Some("tracker=1; sid=good"));
}

#[tokio::test]
async fn test_session_persists_to_cookie_file() {
    let dir = tempfile::tempdir().unwrap();
    let cookie_file = dir.path().join("cookies.json");
    let base = spawn_site(Arc::new(Mutex::new(Vec::new()))).await;

    let mut session = Session::builder(format!("{}/app", base))
        .login_path("/login.do")
        .account("alice")
        .cookie_file(&cookie_file)
        .build()
        .unwrap();
    session.login().await.unwrap();

    let saved = std::fs::read_to_string(&cookie_file).unwrap();
    let saved: serde_json::Value = serde_json::from_str(&saved).unwrap();
    let key = session.storage_keys().cookie().to_string();
    assert!(key.ends_with("_cookie_alice"));
    assert_eq!(saved[key.as_str()], "sid=good");

    // a fresh session on the same file starts logged in
    let mut again = Session::builder(format!("{}/app", base))
        .account("alice")
        .cookie_file(&cookie_file)
        .build()
        .unwrap();
    assert_eq!(again.get("/home").await.unwrap(), "<html>home</html>");
}
