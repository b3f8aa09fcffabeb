mod client;

pub use client::CaseImportClient;
