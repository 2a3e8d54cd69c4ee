pub mod chart_panel;
pub mod controls;
pub mod table_view;
