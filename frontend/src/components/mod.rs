pub mod site_editor;
