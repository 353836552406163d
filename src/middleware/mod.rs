pub mod cache;
pub mod rate_limit;
pub mod response;

pub use cache::{cache_middleware, ResponseCache};
pub use rate_limit::{rate_limit_middleware, RateLimiter};
pub use response::{ApiResponse, ApiResult};
