pub mod record_allocation_command;
pub mod set_labels_received_command;

pub use record_allocation_command::{RecordAllocationCommand, RecordAllocationResult};
pub use set_labels_received_command::SetLabelsReceivedCommand;
