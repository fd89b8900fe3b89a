pub mod retry;
pub mod service_account;

pub use retry::RetryPolicy;
pub use service_account::{ServiceAccountAuth, ServiceAccountKey};
