//! A scripted metrics node listening on loopback.

use std::collections::HashMap;
use std::net::SocketAddr;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Raw response bodies per identifier, written verbatim after `fetch <id>`
pub struct FakeNode {
    pub greeting: &'static str,
    pub list: &'static str,
    pub fetch: HashMap<&'static str, &'static str>,
}

impl FakeNode {
    pub fn new(list: &'static str) -> Self {
        Self { greeting: "# munin node at fake\n", list, fetch: HashMap::new() }
    }

    pub fn with_fetch(mut self, id: &'static str, body: &'static str) -> Self {
        self.fetch.insert(id, body);
        self
    }

    /// Serve a single connection. Every command line received is forwarded
    /// on the returned channel so tests can check ordering.
    pub async fn spawn(self) -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get local address");
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let Ok((stream, _)) = listener.accept().await else { return };
            let (read_half, mut write_half) = stream.into_split();
            let mut lines = BufReader::new(read_half).lines();

            if write_half.write_all(self.greeting.as_bytes()).await.is_err() {
                return;
            }

            while let Ok(Some(line)) = lines.next_line().await {
                let _ = tx.send(line.clone());

                let reply = match line.split_once(' ') {
                    None if line == "list" => self.list.to_string(),
                    None if line == "quit" => return,
                    Some(("fetch", id)) => match self.fetch.get(id) {
                        Some(body) => body.to_string(),
                        None => "# Unknown service\n.\n".to_string(),
                    },
                    _ => "# Unknown command. Try list, fetch, quit\n".to_string(),
                };

                if write_half.write_all(reply.as_bytes()).await.is_err() {
                    return;
                }
            }
        });

        (addr, rx)
    }
}
