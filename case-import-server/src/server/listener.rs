use anyhow::Result;
use bytes::{Bytes, BytesMut};
use case_import_protocol::{
    Frame, FrameType, ImportEventRequest, OpCode, ProtocolError, RequestPayload,
    ResponsePayload,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch::Receiver;
use tracing::{debug, error, info, warn};

use crate::types::SharedHandler;

/// Accepts connections until `shutdown_rx` fires (or its sender is dropped).
pub async fn serve(listener: TcpListener, handler: SharedHandler, mut shutdown_rx: Receiver<()>) -> Result<()> {
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (socket, peer) = match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        error!("accept failed: {e}");
                        continue;
                    }
                };
                debug!("new incoming connection from {peer}");
                let handler = handler.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(socket, handler).await {
                        warn!("connection {peer} closed with error: {e:?}");
                    }
                });
            }

            _ = shutdown_rx.changed() => {
                info!("shutdown signal received; no longer accepting connections");
                return Ok(());
            }
        }
    }
}

async fn handle_connection(mut stream: TcpStream, handler: SharedHandler) -> Result<()> {
    let mut buf = BytesMut::with_capacity(4096);

    loop {
        let n = stream
            .read_buf(&mut buf)
            .await
            .map_err(ProtocolError::IoError)?;
        if n == 0 {
            return Ok(());
        }

        while let Some(frame) = Frame::decode(&mut buf)? {
            if frame.frame_type != FrameType::Request {
                debug!("ignoring {:?} frame from client", frame.frame_type);
                continue;
            }

            let correlation_id = frame.correlation_id;
            let response_frame = match dispatch_request(frame.payload, &handler).await {
                Ok(payload) => Frame::response(correlation_id, payload.serialize().to_vec()),
                Err(e) => {
                    warn!("rejecting request {correlation_id}: {e}");
                    Frame::error(correlation_id, &e.to_string())
                }
            };

            let mut out = BytesMut::new();
            response_frame.encode(&mut out);
            stream.write_all(&out).await?;
            stream.flush().await?;
        }
    }
}

async fn dispatch_request(
    payload: Vec<u8>,
    handler: &SharedHandler,
) -> Result<ResponsePayload, ProtocolError> {
    let request = RequestPayload::deserialize(Bytes::from(payload))?;
    match request.op_code {
        OpCode::PublishCaseEvent => handle_publish_case_event(request.data, handler).await,
        OpCode::Ping => Ok(ResponsePayload {
            op_code: OpCode::Ping,
            data: Bytes::new(),
        }),
    }
}

async fn handle_publish_case_event(
    data: Bytes,
    handler: &SharedHandler,
) -> Result<ResponsePayload, ProtocolError> {
    let request = ImportEventRequest::deserialize(data)?;
    let response = handler.publish_case_event(request).await;

    Ok(ResponsePayload {
        op_code: OpCode::PublishCaseEvent,
        data: response.serialize()?,
    })
}
