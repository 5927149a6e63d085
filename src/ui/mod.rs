pub mod figure_panel;
pub mod parameter_dialog;
pub mod settings_dialog;
pub mod summary_table;
