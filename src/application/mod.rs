pub mod body_selector;
pub mod builders;
pub mod decoding;
pub mod param_merger;
pub mod services;
