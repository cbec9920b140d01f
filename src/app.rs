pub mod backend;
pub mod errors;
pub mod factory;
pub mod local;
pub mod remote;
pub mod service;

pub use backend::AppBackend;
pub use errors::AppError;
pub use factory::AppFactory;
pub use service::{AppService, NoteDraft, RecategorizeReport};
