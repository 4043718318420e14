//! Protocol session: one connection, one command in flight.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufStream};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace};

use crate::codec::{self, Command, FetchLine};
use crate::error::SessionError;
use crate::types::MetricRecord;
use crate::Result;

/// Where a session is in its request/response cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    AwaitingGreeting,
    Ready,
    AwaitingListResponse,
    AwaitingFetchResponse,
    Closed,
}

/// Time bounds applied to a session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Bound on establishing the TCP connection
    pub connect_timeout: Duration,

    /// Bound on each line read and each command write
    pub read_timeout: Duration,

    /// Bound on reading a whole fetch response, however fast its lines arrive
    pub fetch_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(10),
            fetch_timeout: Duration::from_secs(30),
        }
    }
}

/// A single connection to a metrics node.
///
/// Every command borrows the session mutably and returns only once its
/// whole response has been read, so a second command can never be written
/// while a response is still pending. Any failure leaves the session in
/// [`SessionState::Closed`] and later commands return
/// [`SessionError::NotReady`].
#[derive(Debug)]
pub struct Session<S> {
    stream: BufStream<S>,
    state: SessionState,
    read_timeout: Duration,
    fetch_timeout: Duration,
}

impl Session<TcpStream> {
    /// Dial `addr` and consume the greeting banner
    pub async fn connect(addr: &str, config: &SessionConfig) -> Result<Self> {
        debug!("Connecting to metrics node at {}", addr);

        let stream = match timeout(config.connect_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => {
                return Err(SessionError::Connect { addr: addr.to_string(), source });
            }
            Err(_elapsed) => {
                return Err(SessionError::Timeout { op: "connect", after: config.connect_timeout });
            }
        };

        Self::handshake(stream, config).await
    }
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an already open stream and consume the greeting banner
    pub async fn handshake(stream: S, config: &SessionConfig) -> Result<Self> {
        let mut session = Self {
            stream: BufStream::new(stream),
            state: SessionState::Connected,
            read_timeout: config.read_timeout,
            fetch_timeout: config.fetch_timeout,
        };

        session.state = SessionState::AwaitingGreeting;
        let greeting = session.read_line("greeting").await?;
        debug!("Node greeted with {:?}", greeting);

        session.state = SessionState::Ready;
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Ask the node which metric identifiers it serves
    pub async fn list(&mut self) -> Result<Vec<String>> {
        self.send(Command::List, SessionState::AwaitingListResponse).await?;

        let line = self.read_line("list response").await?;
        let identifiers = codec::decode_list(&line);

        self.state = SessionState::Ready;
        Ok(identifiers)
    }

    /// Fetch one metric and read its response up to the sentinel.
    ///
    /// Each line is bounded by the read timeout and the response as a whole
    /// by the fetch timeout.
    pub async fn fetch(&mut self, identifier: &str) -> Result<MetricRecord> {
        self.send(Command::Fetch(identifier), SessionState::AwaitingFetchResponse).await?;

        let fetch_timeout = self.fetch_timeout;
        let response = timeout(fetch_timeout, self.read_record()).await;
        let record = match response {
            Ok(record) => record?,
            Err(_elapsed) => {
                return Err(self.fail(SessionError::Timeout { op: "fetch", after: fetch_timeout }));
            }
        };

        self.state = SessionState::Ready;
        Ok(record)
    }

    /// Say goodbye and shut the stream down.
    ///
    /// Errors are swallowed: the session is finished either way.
    pub async fn quit(mut self) {
        if self.state == SessionState::Ready {
            if let Err(error) = self.send(Command::Quit, SessionState::Closed).await {
                debug!("Ignoring error while sending quit: {}", error);
            }
        }

        self.state = SessionState::Closed;
        if let Err(error) = self.stream.shutdown().await {
            trace!("Ignoring error while shutting down stream: {}", error);
        }
    }

    async fn send(&mut self, command: Command<'_>, next: SessionState) -> Result<()> {
        if self.state != SessionState::Ready {
            return Err(SessionError::NotReady(self.state));
        }

        let line = command.encode()?;
        trace!("Sending {:?}", line);

        let op = command.name();
        let stream = &mut self.stream;
        let write = async move {
            stream.write_all(line.as_bytes()).await?;
            stream.flush().await
        };

        match timeout(self.read_timeout, write).await {
            Ok(Ok(())) => {
                self.state = next;
                Ok(())
            }
            Ok(Err(source)) => Err(self.fail(SessionError::Io { op, source })),
            Err(_elapsed) => Err(self.fail(SessionError::Timeout { op, after: self.read_timeout })),
        }
    }

    async fn read_line(&mut self, expected: &'static str) -> Result<String> {
        let mut buf = String::new();

        let error = match timeout(self.read_timeout, self.stream.read_line(&mut buf)).await {
            Ok(Ok(0)) => SessionError::UnexpectedEof { expected },
            Ok(Ok(_)) => {
                let line = codec::strip_terminator(&buf).to_string();
                trace!("Received {:?}", line);
                return Ok(line);
            }
            Ok(Err(source)) => SessionError::Io { op: expected, source },
            Err(_elapsed) => SessionError::Timeout { op: expected, after: self.read_timeout },
        };

        Err(self.fail(error))
    }

    async fn read_record(&mut self) -> Result<MetricRecord> {
        let mut record = MetricRecord::new();
        loop {
            let line = self.read_line("fetch response").await?;
            match codec::decode_fetch_line(&line) {
                Ok(FetchLine::End) => return Ok(record),
                Ok(FetchLine::Entry(key, value)) => record.insert(key, value),
                Err(error) => return Err(self.fail(error)),
            }
        }
    }

    fn fail(&mut self, error: SessionError) -> SessionError {
        self.state = SessionState::Closed;
        error
    }
}
