pub mod accept_change_request_command;
pub mod decline_change_request_command;
pub mod submit_change_request_command;

pub use accept_change_request_command::AcceptChangeRequestCommand;
pub use decline_change_request_command::DeclineChangeRequestCommand;
pub use submit_change_request_command::{
    SubmitChangeRequestCommand, SubmitChangeRequestResult,
};
