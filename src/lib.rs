#![doc = include_str!("../README.md")]

pub mod api;
pub mod engine;
pub mod error;
pub mod policy;
pub mod services;
pub mod tools;
pub mod types;

pub use engine::*;
pub use policy::*;
pub use services::*;
pub use types::*;
