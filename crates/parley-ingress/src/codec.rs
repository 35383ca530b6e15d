use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{IngressError, IngressResult};
use crate::frame::LogFrame;

/// Largest payload accepted on the wire. Chat values are small.
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Codec for frames exchanged with the upstream log.
pub struct LogCodec;

impl LogCodec {
    /// Encode a frame: [4 bytes len][1 byte tag][payload]
    pub fn encode(frame: &LogFrame) -> IngressResult<Vec<u8>> {
        let payload = bincode::serialize(frame)
            .map_err(|e| IngressError::Serialization(e.to_string()))?;
        if payload.len() > MAX_FRAME_SIZE {
            return Err(IngressError::FrameTooLarge {
                size: payload.len(),
                max: MAX_FRAME_SIZE,
            });
        }
        let len = (payload.len() + 1) as u32;
        let mut buf = Vec::with_capacity(4 + 1 + payload.len());
        buf.extend_from_slice(&len.to_be_bytes());
        buf.push(frame.type_tag());
        buf.extend_from_slice(&payload);
        Ok(buf)
    }

    /// Read one frame. `Ok(None)` on a clean end of stream at a frame boundary.
    pub async fn read_frame<R>(reader: &mut R) -> IngressResult<Option<LogFrame>>
    where
        R: AsyncRead + Unpin,
    {
        let mut header = [0u8; 4];
        match reader.read_exact(&mut header).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e.into()),
        }
        let len = Self::frame_len(&header)?;
        let mut body = vec![0u8; len];
        reader.read_exact(&mut body).await?;
        Self::decode_body(&body).map(Some)
    }

    /// Encode and write one frame, flushing the writer.
    pub async fn write_frame<W>(writer: &mut W, frame: &LogFrame) -> IngressResult<()>
    where
        W: AsyncWrite + Unpin,
    {
        let bytes = Self::encode(frame)?;
        writer.write_all(&bytes).await?;
        writer.flush().await?;
        Ok(())
    }

    fn frame_len(header: &[u8]) -> IngressResult<usize> {
        let bytes: [u8; 4] = header
            .try_into()
            .map_err(|_| IngressError::Framing("bad length header".into()))?;
        let len = u32::from_be_bytes(bytes) as usize;
        if len < 1 {
            return Err(IngressError::Framing("zero-length frame".into()));
        }
        if len - 1 > MAX_FRAME_SIZE {
            return Err(IngressError::FrameTooLarge {
                size: len - 1,
                max: MAX_FRAME_SIZE,
            });
        }
        Ok(len)
    }

    /// Decode `[tag][payload]`, checking the tag against the payload.
    fn decode_body(body: &[u8]) -> IngressResult<LogFrame> {
        let (tag, payload) = body
            .split_first()
            .ok_or_else(|| IngressError::Framing("missing tag".into()))?;
        let frame: LogFrame = bincode::deserialize(payload)
            .map_err(|e| IngressError::Deserialization(e.to_string()))?;
        if frame.type_tag() != *tag {
            return Err(IngressError::Framing(format!(
                "tag {tag} does not match {} frame",
                frame.type_name()
            )));
        }
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{LogRecord, RecordKind};

    async fn read_all(mut data: &[u8]) -> IngressResult<Option<LogFrame>> {
        LogCodec::read_frame(&mut data).await
    }

    #[tokio::test]
    async fn encode_then_read_record() {
        let frame = LogFrame::Record(LogRecord {
            offset: 7,
            kind: RecordKind::KeyPut {
                key: vec![1; 16],
                value: b"hello".to_vec(),
            },
        });
        let encoded = LogCodec::encode(&frame).unwrap();
        assert_eq!(read_all(&encoded).await.unwrap(), Some(frame));
    }

    #[tokio::test]
    async fn back_to_back_frames() {
        let mut both = LogCodec::encode(&LogFrame::Committed { offset: 1 }).unwrap();
        both.extend_from_slice(&LogCodec::encode(&LogFrame::Committed { offset: 2 }).unwrap());
        let mut reader = &both[..];
        let first = LogCodec::read_frame(&mut reader).await.unwrap();
        assert_eq!(first, Some(LogFrame::Committed { offset: 1 }));
        let second = LogCodec::read_frame(&mut reader).await.unwrap();
        assert_eq!(second, Some(LogFrame::Committed { offset: 2 }));
        assert_eq!(LogCodec::read_frame(&mut reader).await.unwrap(), None);
    }

    #[tokio::test]
    async fn truncated_input() {
        assert_eq!(read_all(&[0, 0, 0]).await.unwrap(), None);

        let full = LogCodec::encode(&LogFrame::Committed { offset: 1 }).unwrap();
        let err = read_all(&full[..full.len() - 1]).await.unwrap_err();
        assert!(matches!(err, IngressError::Io(_)));
    }

    #[tokio::test]
    async fn zero_length_frame() {
        let err = read_all(&[0u8, 0, 0, 0, 0]).await.unwrap_err();
        assert!(matches!(err, IngressError::Framing(_)));
    }

    #[tokio::test]
    async fn oversized_header() {
        let err = read_all(&[0xffu8, 0xff, 0xff, 0xff, 0]).await.unwrap_err();
        assert!(matches!(err, IngressError::FrameTooLarge { .. }));
    }

    #[tokio::test]
    async fn mismatched_tag() {
        let mut encoded = LogCodec::encode(&LogFrame::Committed { offset: 1 }).unwrap();
        encoded[4] = LogFrame::Listen { topic: String::new(), from_offset: 0 }.type_tag();
        let err = read_all(&encoded).await.unwrap_err();
        assert!(matches!(err, IngressError::Framing(_)));
    }

    #[test]
    fn type_tags_unique() {
        let frames = [
            LogFrame::CreateTopic { topic: "chat".into() },
            LogFrame::Put { topic: "chat".into(), key: vec![], value: vec![] },
            LogFrame::Listen { topic: "chat".into(), from_offset: 0 },
            LogFrame::Committed { offset: 0 },
            LogFrame::Rejected { reason: String::new() },
            LogFrame::Record(LogRecord { offset: 0, kind: RecordKind::TopicCreate }),
        ];
        let mut tags: Vec<u8> = frames.iter().map(|f| f.type_tag()).collect();
        let len = tags.len();
        tags.sort();
        tags.dedup();
        assert_eq!(tags.len(), len, "type tags should be unique");
    }

    #[tokio::test]
    async fn async_read_write() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        let frame = LogFrame::Listen { topic: "chat".into(), from_offset: 3 };
        LogCodec::write_frame(&mut client, &frame).await.unwrap();
        drop(client);

        let read = LogCodec::read_frame(&mut server).await.unwrap();
        assert_eq!(read, Some(frame));
        assert_eq!(LogCodec::read_frame(&mut server).await.unwrap(), None);
    }
}
