pub mod coverage;
pub mod gateways;
pub mod usecases;
pub mod util;

pub mod entities {
    pub use bundl_entities::{
        geo::*, geohash::*, location::*, subscription::*, time::*, topic::*,
    };
}
