use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, info};

use parley_types::{Offset, UserId};

use crate::codec::LogCodec;
use crate::error::{IngressError, IngressResult};
use crate::event::IngressEvent;
use crate::frame::{LogFrame, LogRecord, RecordKind};
use crate::traits::{ChatWriter, EventIngress};

/// Listener connection to an external ordered log.
pub struct RemoteIngress<S> {
    stream: S,
    topic: String,
    connected: bool,
}

impl RemoteIngress<TcpStream> {
    /// Connect over TCP and start listening after `from_offset`.
    pub async fn connect(addr: SocketAddr, topic: &str, from_offset: Offset) -> IngressResult<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        info!(%addr, topic, %from_offset, "listening to upstream log");
        Self::open(stream, topic, from_offset).await
    }
}

impl<S> RemoteIngress<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Issue the listen request on an already-established stream.
    pub async fn open(mut stream: S, topic: &str, from_offset: Offset) -> IngressResult<Self> {
        let listen = LogFrame::Listen {
            topic: topic.to_string(),
            from_offset: from_offset.get(),
        };
        LogCodec::write_frame(&mut stream, &listen).await?;
        Ok(Self {
            stream,
            topic: topic.to_string(),
            connected: true,
        })
    }
}

fn translate(record: LogRecord) -> IngressResult<Option<IngressEvent>> {
    let offset = Offset::new(record.offset);
    let event = match record.kind {
        RecordKind::TopicCreate => IngressEvent::TopicCreated { offset },
        RecordKind::TopicDestroy => IngressEvent::TopicDestroyed { offset },
        RecordKind::KeyPut { key, value } => IngressEvent::Put {
            sender: decode_key(&key, offset)?,
            value,
            offset,
        },
        RecordKind::KeyDelete { key } => IngressEvent::KeyDeleted {
            key: decode_key(&key, offset)?,
            offset,
        },
        RecordKind::ConfigChange => return Ok(None),
    };
    Ok(Some(event))
}

fn decode_key(key: &[u8], offset: Offset) -> IngressResult<UserId> {
    UserId::from_slice(key)
        .map_err(|e| IngressError::ProtocolViolation(format!("bad key at offset {offset}: {e}")))
}

#[async_trait]
impl<S> EventIngress for RemoteIngress<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn next_event(&mut self) -> IngressResult<Option<IngressEvent>> {
        loop {
            let frame = match LogCodec::read_frame(&mut self.stream).await {
                Ok(frame) => frame,
                Err(e) => {
                    self.connected = false;
                    return Err(e);
                }
            };
            match frame {
                None => {
                    self.connected = false;
                    info!(topic = %self.topic, "upstream log closed the listen stream");
                    return Ok(None);
                }
                Some(LogFrame::Record(record)) => {
                    if let Some(event) = translate(record)? {
                        return Ok(Some(event));
                    }
                }
                Some(other) => return Err(IngressError::UnexpectedFrame(other.type_name())),
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Writer connection to an external ordered log.
pub struct RemoteWriter<S> {
    stream: Mutex<S>,
    topic: String,
}

impl RemoteWriter<TcpStream> {
    pub async fn connect(addr: SocketAddr, topic: &str) -> IngressResult<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        info!(%addr, topic, "writer connected to upstream log");
        Self::open(stream, topic).await
    }
}

impl<S> RemoteWriter<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Ensure the topic exists, then hand back the writer.
    pub async fn open(mut stream: S, topic: &str) -> IngressResult<Self> {
        let create = LogFrame::CreateTopic {
            topic: topic.to_string(),
        };
        LogCodec::write_frame(&mut stream, &create).await?;
        match LogCodec::read_frame(&mut stream).await? {
            Some(LogFrame::Committed { offset }) => debug!(topic, offset, "topic created"),
            Some(LogFrame::Rejected { reason }) => debug!(topic, %reason, "topic already present"),
            Some(other) => return Err(IngressError::UnexpectedFrame(other.type_name())),
            None => return Err(IngressError::Disconnected),
        }
        Ok(Self {
            stream: Mutex::new(stream),
            topic: topic.to_string(),
        })
    }
}

#[async_trait]
impl<S> ChatWriter for RemoteWriter<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Append and wait for the commit acknowledgement.
    async fn post(&self, sender: UserId, content: &str) -> IngressResult<()> {
        let put = LogFrame::Put {
            topic: self.topic.clone(),
            key: sender.to_bytes().to_vec(),
            value: content.as_bytes().to_vec(),
        };
        let mut stream = self.stream.lock().await;
        LogCodec::write_frame(&mut *stream, &put).await?;
        match LogCodec::read_frame(&mut *stream).await? {
            Some(LogFrame::Committed { offset }) => {
                debug!(offset, %sender, "post committed");
                Ok(())
            }
            Some(LogFrame::Rejected { reason }) => Err(IngressError::Rejected(reason)),
            Some(other) => Err(IngressError::UnexpectedFrame(other.type_name())),
            None => Err(IngressError::Disconnected),
        }
    }
}
