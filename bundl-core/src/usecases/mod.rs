mod error;
mod needs_subscription_update;
mod plan_subscription_changes;

pub use self::{error::Error, needs_subscription_update::*, plan_subscription_changes::*};

mod prelude {
    pub use crate::entities::*;
}
