use std::sync::Arc;
use crate::handler::EventHandler;

pub type SharedHandler = Arc<EventHandler>;
