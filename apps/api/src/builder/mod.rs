pub mod handlers;
pub mod pipeline;
pub mod session;
pub mod store;
