//! Best-path quoting and atomic execution across registered constant-product
//! pools.

pub mod router;
pub mod routing;
pub mod service;

pub use {
    router::{Aggregator, RouterConfig, RouterError},
    service::SwapService,
};
