//! Sessions against a node over real sockets

use isitdown_wire::{Session, SessionConfig, SessionError, SessionState};

use super::fake_node::FakeNode;

#[tokio::test]
async fn test_list_and_fetch_over_tcp() {
    let _ = tracing_subscriber::fmt::try_init();

    let (addr, mut commands) = FakeNode::new("cpu mem\n")
        .with_fetch("cpu", "user 12\nsystem 3\n.\n")
        .with_fetch("mem", "used 2048\n.\n")
        .spawn()
        .await;

    let mut session = Session::connect(&addr.to_string(), &SessionConfig::default()).await.unwrap();
    let identifiers = session.list().await.unwrap();
    assert_eq!(identifiers, vec!["cpu", "mem"]);

    let cpu = session.fetch("cpu").await.unwrap();
    let mem = session.fetch("mem").await.unwrap();
    session.quit().await;

    assert_eq!(cpu.iter().collect::<Vec<_>>(), vec![("user", "12"), ("system", "3")]);
    assert_eq!(mem.get("used"), Some("2048"));

    let mut seen = Vec::new();
    while let Some(line) = commands.recv().await {
        seen.push(line);
    }
    assert_eq!(seen, vec!["list", "fetch cpu", "fetch mem", "quit"]);
}

#[tokio::test]
async fn test_empty_list_yields_no_identifiers() {
    let (addr, _commands) = FakeNode::new("\n").spawn().await;

    let mut session = Session::connect(&addr.to_string(), &SessionConfig::default()).await.unwrap();
    assert!(session.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_crlf_terminated_lines_are_accepted() {
    let (addr, _commands) = FakeNode::new("load\r\n").with_fetch("load", "load 0.42\r\n.\r\n").spawn().await;

    let mut session = Session::connect(&addr.to_string(), &SessionConfig::default()).await.unwrap();
    assert_eq!(session.list().await.unwrap(), vec!["load"]);
    assert_eq!(session.fetch("load").await.unwrap().get("load"), Some("0.42"));
}

#[tokio::test]
async fn test_malformed_fetch_line_is_a_decode_error() {
    let (addr, _commands) = FakeNode::new("cpu\n").with_fetch("cpu", "value 1\nnospace\n.\n").spawn().await;

    let mut session = Session::connect(&addr.to_string(), &SessionConfig::default()).await.unwrap();
    session.list().await.unwrap();

    match session.fetch("cpu").await {
        Err(SessionError::Decode { line }) => assert_eq!(line, "nospace"),
        other => panic!("Expected SessionError::Decode, got {other:?}"),
    }
    assert_eq!(session.state(), SessionState::Closed);
}

#[tokio::test]
async fn test_connection_refused() {
    // Bind then drop to get a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = Session::connect(&addr.to_string(), &SessionConfig::default()).await;
    match result {
        Err(error @ SessionError::Connect { .. }) => assert!(error.is_connection()),
        other => panic!("Expected SessionError::Connect, got {other:?}"),
    }
}
