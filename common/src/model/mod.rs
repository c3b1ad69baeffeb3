pub mod editable;
pub mod service_block;
pub mod site;
