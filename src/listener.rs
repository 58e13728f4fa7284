use std::net::SocketAddr;

use tokio::{
    io::{AsyncReadExt, AsyncWrite, AsyncWriteExt},
    net::{TcpListener, TcpSocket, TcpStream},
};

use crate::config::{Config, EofPolicy};

#[derive(thiserror::Error, Debug)]
pub enum ListenerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: tokio::io::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    Io(#[from] tokio::io::Error),

    #[error("received data is not valid utf-8: {0}")]
    Decode(#[from] std::str::Utf8Error),
}

/// A listening socket that serves exactly one client.
///
/// The socket stays open while the accepted connection is served, so any
/// other client is left waiting in the backlog and is never accepted.
pub struct Listener {
    listener: TcpListener,
    config: Config,
}

impl Listener {
    // Bind a new listener to the configured address
    pub fn bind(config: Config) -> Result<Self, ListenerError> {
        if config.chunk_size == 0 {
            return Err(ListenerError::InvalidConfig(
                "the receive chunk size must be at least 1 byte".into(),
            ));
        }

        let addr = config.addr;
        let listener =
            listen(addr, config.backlog).map_err(|source| ListenerError::Bind { addr, source })?;

        Ok(Self { listener, config })
    }

    pub fn local_addr(&self) -> tokio::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Announces the listening port, accepts a single client and prints
    /// everything it sends to `out`.
    ///
    /// With [`EofPolicy::Spin`] this only returns on error.
    pub async fn run<W>(self, out: &mut W) -> Result<(), ListenerError>
    where
        W: AsyncWrite + Unpin,
    {
        let local_addr = self.local_addr()?;
        tracing::info!("mock server listening on: {}", local_addr);
        write_line(
            out,
            &format!("Mock server listening on port {}...", local_addr.port()),
        )
        .await?;

        let (stream, peer) = self.listener.accept().await?;
        tracing::info!("accepted connection from: {}", peer);
        write_line(out, &format!("Connected by {}", peer)).await?;

        let conn = Connection::new(stream, peer, self.config.chunk_size);
        serve(conn, out, self.config.on_eof).await
    }
}

fn listen(addr: SocketAddr, backlog: u32) -> tokio::io::Result<TcpListener> {
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };

    socket.bind(addr)?;
    socket.listen(backlog)
}

/// The single accepted client.
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    buffer: Vec<u8>,
}

impl Connection {
    pub fn new(stream: TcpStream, peer: SocketAddr, chunk_size: usize) -> Self {
        Self {
            stream,
            peer,
            buffer: vec![0; chunk_size],
        }
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// reads a single chunk from the stream and decodes it as text.
    ///
    /// returns an empty string once the peer has closed its side,
    /// and will keep doing so on every following call.
    pub async fn recv(&mut self) -> Result<&str, ListenerError> {
        let rcount = self.stream.read(&mut self.buffer).await?;
        tracing::debug!("received {} bytes from {}", rcount, self.peer);

        Ok(std::str::from_utf8(&self.buffer[..rcount])?)
    }
}

async fn serve<W>(
    mut conn: Connection,
    out: &mut W,
    on_eof: EofPolicy,
) -> Result<(), ListenerError>
where
    W: AsyncWrite + Unpin,
{
    let peer = conn.peer_addr();

    loop {
        let text = match conn.recv().await {
            Ok(text) => text,
            Err(ListenerError::Decode(err)) => {
                tracing::warn!("{} sent non utf-8 data: {}", peer, err);
                return Err(err.into());
            }
            Err(err) => return Err(err),
        };

        if text.is_empty() {
            tracing::debug!("{} has closed the connection", peer);
            if on_eof == EofPolicy::Stop {
                return Ok(());
            }
        }

        write_line(out, &format!("Received: {}", text)).await?;
    }
}

async fn write_line<W>(out: &mut W, line: &str) -> tokio::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    out.write_all(line.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await
}
