//! One TCP connection to a Riemann server.
//!
//! Frames are a 4-byte big-endian length followed by an encoded [`Msg`].
//! The protocol is strictly request/response, so a connection carries one
//! query at a time.

use prost::Message;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use riemannfs_kernel::Event;

use crate::proto::Msg;
use crate::{ClientError, StoreConfig};

/// Write one length-prefixed message.
pub async fn write_frame<W>(writer: &mut W, msg: &Msg) -> Result<(), ClientError>
where
    W: AsyncWrite + Unpin,
{
    let body = msg.encode_to_vec();
    let len = u32::try_from(body.len()).map_err(|_| ClientError::FrameTooLarge(body.len()))?;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(&body).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one length-prefixed message, refusing frames over `max_len` bytes.
pub async fn read_frame<R>(reader: &mut R, max_len: usize) -> Result<Msg, ClientError>
where
    R: AsyncRead + Unpin,
{
    let len = reader.read_u32().await? as usize;
    if len > max_len {
        return Err(ClientError::FrameTooLarge(len));
    }
    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    Ok(Msg::decode(body.as_slice())?)
}

/// Turn a query response into events, or the server's error.
pub fn into_events(response: Msg) -> Result<Vec<Event>, ClientError> {
    if response.ok == Some(false) {
        return Err(ClientError::Server(
            response.error.unwrap_or_else(|| "query rejected".to_string()),
        ));
    }
    Ok(response.events.into_iter().map(Event::from).collect())
}

/// A live connection.
#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    max_frame_len: usize,
}

impl Connection {
    /// Connect to the configured server within the connect timeout.
    pub async fn open(config: &StoreConfig) -> Result<Self, ClientError> {
        let addr = config.address();
        let stream = tokio::time::timeout(config.connect_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| ClientError::Timeout)??;
        stream.set_nodelay(true)?;
        log::info!("Connected to Riemann at {addr}");
        Ok(Self {
            stream,
            max_frame_len: config.max_frame_len,
        })
    }

    /// Send one query and wait for its response.
    pub async fn query(&mut self, filter: &str) -> Result<Vec<Event>, ClientError> {
        write_frame(&mut self.stream, &Msg::query(filter)).await?;
        let response = read_frame(&mut self.stream, self.max_frame_len).await?;
        into_events(response)
    }
}
