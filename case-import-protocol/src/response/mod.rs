mod import_event_response;

pub use import_event_response::ImportEventResponse;
