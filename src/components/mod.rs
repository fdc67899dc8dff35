pub mod address_bar;
pub mod context_menu;
pub mod dialog;
pub mod grid;
pub mod help;
pub mod icons;
pub mod list;
pub mod status_bar;
pub mod tree;
