pub mod apply_product_edit_command;
pub mod approve_design_command;
pub mod mark_in_production_command;
pub mod re_edit_product_command;
pub mod soft_delete_product_command;

pub use apply_product_edit_command::ApplyProductEditCommand;
pub use approve_design_command::ApproveDesignCommand;
pub use mark_in_production_command::MarkInProductionCommand;
pub use re_edit_product_command::ReEditProductCommand;
pub use soft_delete_product_command::SoftDeleteProductCommand;
