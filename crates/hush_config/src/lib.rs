mod cache;
mod censor;
mod global;
mod hush;
mod proxy;
mod validation;

pub use cache::CacheConfig;
pub use censor::CensorConfig;
pub use global::GlobalConfig;
pub use hush::HushConfig;
pub use proxy::ProxyConfig;
pub use validation::{validate, ConfigReport};
