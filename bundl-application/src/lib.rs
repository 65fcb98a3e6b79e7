mod config;
mod location_tracker;
mod subscription_manager;

pub mod prelude {
    pub use super::{config::*, location_tracker::*, subscription_manager::*};
}

pub mod error;

pub type Result<T> = std::result::Result<T, error::AppError>;

pub(crate) use bundl_core::{coverage, entities::*, gateways, usecases};

#[cfg(test)]
pub(crate) mod tests;
