use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWrite, AsyncWriteExt},
    net::TcpStream,
};

const SEND_CHUNK_SIZE: usize = 4096;

#[derive(Parser)]
#[command(name = "send-file")]
#[command(about = "Streams a file to the mock server", long_about = None)]
struct Cli {
    /// File whose contents are sent
    path: PathBuf,

    #[arg(short, long, default_value = "127.0.0.1:8080")]
    addr: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let mut stream = TcpStream::connect(&cli.addr)
        .await
        .with_context(|| format!("failed to connect to {}", cli.addr))?;
    tracing::info!("connected to: {}", stream.peer_addr()?);

    let sent = send_file(&mut stream, &cli.path).await?;
    tracing::info!("sent {} bytes from {}", sent, cli.path.display());

    stream.shutdown().await?;
    Ok(())
}

/// writes the whole file into `writer`, one chunk at a time,
/// and returns the number of bytes sent.
async fn send_file<W>(writer: &mut W, path: &Path) -> anyhow::Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let mut file = File::open(path)
        .await
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut buffer = vec![0; SEND_CHUNK_SIZE];
    let mut sent = 0;
    loop {
        let rcount = file.read(&mut buffer).await?;
        if rcount == 0 {
            break; // EOF
        }

        writer.write_all(&buffer[..rcount]).await?;
        sent += rcount as u64;
    }
    writer.flush().await?;

    Ok(sent)
}
