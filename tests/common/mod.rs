//! Scripted Postgres server for offline tests
//!
//! Speaks just enough of the startup protocol for the driver to open and
//! close a session: startup message, optional cleartext password
//! exchange, AuthenticationOk and ReadyForQuery.

#![allow(dead_code)]

use std::collections::HashMap;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// What the server saw during one session
#[derive(Debug, Default)]
pub struct Session {
    /// Startup parameters (user, database, application_name, ...)
    pub params: HashMap<String, String>,
    /// Password sent by the client, if one was requested
    pub password: Option<String>,
    /// Tags of frontend messages received after ReadyForQuery
    pub tags_after_ready: Vec<u8>,
}

impl Session {
    /// Whether the client sent Terminate
    pub fn terminated(&self) -> bool {
        self.tags_after_ready.contains(&b'X')
    }
}

/// Scripted server
pub struct FakeServer {
    /// Port the server listens on (127.0.0.1)
    pub port: u16,
    task: JoinHandle<Vec<Session>>,
}

impl FakeServer {
    /// Accept `sessions` connections, in accept order. With
    /// `expected_secret`, request a cleartext password and reject any other.
    pub async fn start(sessions: usize, expected_secret: Option<&'static str>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("local addr").port();

        // Sessions run concurrently so a client may hold several at once
        let task = tokio::spawn(async move {
            let mut handles = Vec::with_capacity(sessions);
            for _ in 0..sessions {
                let (socket, _) = listener.accept().await.expect("accept");
                handles.push(tokio::spawn(serve(socket, expected_secret)));
            }

            let mut seen = Vec::with_capacity(sessions);
            for handle in handles {
                seen.push(handle.await.expect("session task"));
            }
            seen
        });

        Self { port, task }
    }

    /// Endpoint string for this server
    pub fn endpoint(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }

    /// Wait for all scripted sessions to finish
    pub async fn finish(self) -> Vec<Session> {
        self.task.await.expect("server task")
    }
}

/// A port nothing is listening on
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    listener.local_addr().expect("local addr").port()
}

async fn serve(mut socket: TcpStream, expected_secret: Option<&str>) -> Session {
    let mut session = Session {
        params: read_startup(&mut socket).await,
        ..Session::default()
    };

    if let Some(expected) = expected_secret {
        // AuthenticationCleartextPassword
        socket
            .write_all(&[b'R', 0, 0, 0, 8, 0, 0, 0, 3])
            .await
            .expect("write auth request");

        let (tag, body) = read_message(&mut socket).await.expect("password message");
        assert_eq!(tag, b'p');
        let password = body.strip_suffix(&[0]).unwrap_or(&body);
        let password = String::from_utf8_lossy(password).into_owned();
        session.password = Some(password.clone());

        if password != expected {
            let user = session.params.get("user").cloned().unwrap_or_default();
            let message = format!("password authentication failed for user \"{}\"", user);
            socket
                .write_all(&error_response("28P01", &message))
                .await
                .expect("write error");
            return session;
        }
    }

    // AuthenticationOk, ReadyForQuery(idle)
    socket
        .write_all(&[b'R', 0, 0, 0, 8, 0, 0, 0, 0, b'Z', 0, 0, 0, 5, b'I'])
        .await
        .expect("write ready");

    while let Some((tag, _)) = read_message(&mut socket).await {
        session.tags_after_ready.push(tag);
    }
    session
}

async fn read_startup(socket: &mut TcpStream) -> HashMap<String, String> {
    let len = socket.read_i32().await.expect("startup length") as usize;
    let mut body = vec![0u8; len - 4];
    socket.read_exact(&mut body).await.expect("startup body");

    // Skip protocol version, then NUL-separated key/value pairs
    let fields: Vec<String> = body[4..]
        .split(|b| *b == 0)
        .filter(|f| !f.is_empty())
        .map(|f| String::from_utf8_lossy(f).into_owned())
        .collect();

    fields
        .chunks(2)
        .filter(|pair| pair.len() == 2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect()
}

async fn read_message(socket: &mut TcpStream) -> Option<(u8, Vec<u8>)> {
    let tag = socket.read_u8().await.ok()?;
    let len = socket.read_i32().await.ok()? as usize;
    let mut body = vec![0u8; len.saturating_sub(4)];
    socket.read_exact(&mut body).await.ok()?;
    Some((tag, body))
}

fn error_response(code: &str, message: &str) -> Vec<u8> {
    let mut fields = Vec::new();
    for (field, value) in [(b'S', "FATAL"), (b'V', "FATAL"), (b'C', code), (b'M', message)] {
        fields.push(field);
        fields.extend_from_slice(value.as_bytes());
        fields.push(0);
    }
    fields.push(0);

    let mut msg = vec![b'E'];
    msg.extend_from_slice(&((fields.len() + 4) as i32).to_be_bytes());
    msg.extend_from_slice(&fields);
    msg
}
