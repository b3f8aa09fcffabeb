pub mod frame;
pub mod payload;
pub mod event;
pub mod errors;
mod request;
mod response;
mod op_code;

// Public re-exports for easy access
pub use frame::{Frame, FrameType};
pub use payload::{RequestPayload, ResponsePayload};
pub use event::CaseEvent;
pub use errors::ProtocolError;

pub use request::ImportEventRequest;
pub use response::ImportEventResponse;

pub use op_code::OpCode;
