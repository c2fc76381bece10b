pub mod detection;
pub mod error;
pub mod fallback;
pub mod normalize;
pub mod ports;
pub mod service;
pub mod strategy;

pub type DomainResult<T> = Result<T, error::DomainError>;
