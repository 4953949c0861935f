pub mod add_payment_record_command;

pub use add_payment_record_command::AddPaymentRecordCommand;
