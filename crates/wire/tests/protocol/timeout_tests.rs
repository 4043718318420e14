//! Bounded waits on unresponsive nodes

use std::time::Duration;

use isitdown_wire::{Session, SessionConfig, SessionError, SessionState};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

/// Accept one connection, write `script`, then hold the socket open
async fn stalling_node(script: &'static [u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get local address");

    tokio::spawn(async move {
        let Ok((mut stream, _)) = listener.accept().await else { return };
        let _ = stream.write_all(script).await;
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    addr.to_string()
}

/// Accept one connection, greet, answer `list` with `cpu`, then answer any
/// fetch with a steady trickle of lines and no sentinel
async fn trickling_node(interval: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get local address");

    tokio::spawn(async move {
        let Ok((stream, _)) = listener.accept().await else { return };
        let (read_half, mut write_half) = stream.into_split();
        let mut lines = BufReader::new(read_half).lines();
        let _ = write_half.write_all(b"# munin node at test\n").await;

        while let Ok(Some(line)) = lines.next_line().await {
            if line == "list" {
                let _ = write_half.write_all(b"cpu\n").await;
                continue;
            }
            for i in 0.. {
                tokio::time::sleep(interval).await;
                if write_half.write_all(format!("k{i} v\n").as_bytes()).await.is_err() {
                    return;
                }
            }
        }
    });

    addr.to_string()
}

fn short_config() -> SessionConfig {
    SessionConfig {
        connect_timeout: Duration::from_secs(1),
        read_timeout: Duration::from_millis(200),
        fetch_timeout: Duration::from_secs(5),
    }
}

#[tokio::test]
async fn test_missing_greeting_times_out() {
    let addr = stalling_node(b"").await;

    let result = Session::connect(&addr, &short_config()).await;
    match result {
        Err(SessionError::Timeout { op, after }) => {
            assert_eq!(op, "greeting");
            assert_eq!(after, Duration::from_millis(200));
        }
        other => panic!("Expected SessionError::Timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_sentinel_times_out() {
    // The node answers list and the first fetch lines but never sends "."
    let addr = stalling_node(b"# munin node\ncpu\nvalue 42\n").await;

    let mut session = Session::connect(&addr, &short_config()).await.unwrap();
    assert_eq!(session.list().await.unwrap(), vec!["cpu"]);

    let error = session.fetch("cpu").await.unwrap_err();
    assert!(matches!(error, SessionError::Timeout { op: "fetch response", .. }), "got {error:?}");
    assert!(error.is_connection());
    assert_eq!(session.state(), SessionState::Closed);
}

#[tokio::test]
async fn test_endless_fetch_response_times_out() {
    let addr = trickling_node(Duration::from_millis(100)).await;
    let config = SessionConfig {
        read_timeout: Duration::from_millis(300),
        fetch_timeout: Duration::from_secs(1),
        ..short_config()
    };

    let mut session = Session::connect(&addr, &config).await.unwrap();
    assert_eq!(session.list().await.unwrap(), vec!["cpu"]);

    let error = tokio::time::timeout(Duration::from_secs(5), session.fetch("cpu"))
        .await
        .expect("fetch should give up on its own")
        .unwrap_err();

    match error {
        SessionError::Timeout { op, after } => {
            assert_eq!(op, "fetch");
            assert_eq!(after, Duration::from_secs(1));
        }
        other => panic!("Expected SessionError::Timeout, got {other:?}"),
    }
    assert_eq!(session.state(), SessionState::Closed);
}
