use anyhow::Context;
use bytes::{Bytes, BytesMut};
use case_import_protocol::{
    CaseEvent, Frame, FrameType, ImportEventRequest, ImportEventResponse, OpCode, ProtocolError,
    RequestPayload, ResponsePayload,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

pub struct CaseImportClient {
    stream: TcpStream,
    read_buf: BytesMut,
    correlation_id: u32,
}

impl CaseImportClient {
    pub async fn connect(addr: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr)
            .await
            .with_context(|| format!("Failed to connect to case-import server at {addr}"))?;

        Ok(CaseImportClient {
            stream,
            read_buf: BytesMut::with_capacity(4096),
            correlation_id: 0,
        })
    }

    /// Sends one event. `None` is passed through as a null event, which the
    /// server answers with a failure response.
    pub async fn publish_case_event(
        &mut self,
        event: Option<CaseEvent>,
    ) -> Result<ImportEventResponse, ProtocolError> {
        let request = ImportEventRequest::new(event);
        let data = self
            .call(OpCode::PublishCaseEvent, request.serialize()?)
            .await?;
        ImportEventResponse::deserialize(data)
    }

    pub async fn ping(&mut self) -> Result<(), ProtocolError> {
        self.call(OpCode::Ping, Bytes::new()).await?;
        Ok(())
    }

    async fn call(&mut self, op_code: OpCode, data: Bytes) -> Result<Bytes, ProtocolError> {
        let correlation_id = self.send_request(RequestPayload { op_code, data }).await?;
        let response = self.read_response(correlation_id).await?;

        match response.frame_type {
            FrameType::Error => Err(ProtocolError::Remote(
                String::from_utf8_lossy(&response.payload).into_owned(),
            )),
            _ => ResponsePayload::deserialize(Bytes::from(response.payload))?.expect_op(op_code),
        }
    }

    async fn send_request(&mut self, payload: RequestPayload) -> Result<u32, ProtocolError> {
        self.correlation_id = self.correlation_id.wrapping_add(1);

        let frame = Frame::request(self.correlation_id, payload.serialize().to_vec());

        let mut buf = BytesMut::new();
        frame.encode(&mut buf);
        self.stream.write_all(&buf).await?;
        Ok(self.correlation_id)
    }

    async fn read_response(&mut self, correlation_id: u32) -> Result<Frame, ProtocolError> {
        loop {
            while let Some(frame) = Frame::decode(&mut self.read_buf)? {
                if frame.correlation_id == correlation_id {
                    return Ok(frame);
                }
                debug!("dropping stale response {}", frame.correlation_id);
            }

            let n = self.stream.read_buf(&mut self.read_buf).await?;
            if n == 0 {
                return Err(ProtocolError::IncompleteFrame);
            }
        }
    }
}
