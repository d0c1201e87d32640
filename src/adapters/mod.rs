// Adapters layer: concrete implementations for external systems (http transport, local storage).

pub mod http;
pub mod storage;
