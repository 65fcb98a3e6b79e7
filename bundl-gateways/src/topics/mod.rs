mod instance_id;
mod record_to_json_file;

pub use self::{instance_id::InstanceId, record_to_json_file::RecordToJsonFile};
pub use bundl_core::gateways::topic::{Error, TopicGateway};
