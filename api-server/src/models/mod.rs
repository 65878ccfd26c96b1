//! Request and response models

pub mod request;

pub use request::*;
