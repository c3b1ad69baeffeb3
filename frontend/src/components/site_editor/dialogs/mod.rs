pub mod edit_panel;
