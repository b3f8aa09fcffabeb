mod import_event;

pub use import_event::ImportEventRequest;
