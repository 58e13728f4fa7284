use std::net::{IpAddr, Ipv4Addr, SocketAddr};

pub const LISTEN_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
pub const PORT: u16 = 8080;

// only a single pending connection is ever queued
pub const BACKLOG: u32 = 1;
pub const RECV_CHUNK_SIZE: usize = 1024;

/// What to do once the peer has closed its side of the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EofPolicy {
    /// Keep reading, reporting every empty read as an empty chunk.
    /// The loop never terminates on its own.
    #[default]
    Spin,

    /// Return from the serving loop on the first empty read.
    Stop,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub backlog: u32,
    pub chunk_size: usize,
    pub on_eof: EofPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::new(LISTEN_ADDR, PORT),
            backlog: BACKLOG,
            chunk_size: RECV_CHUNK_SIZE,
            on_eof: EofPolicy::default(),
        }
    }
}
