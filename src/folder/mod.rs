//! Client-side state of the folder browser: item tree, selection, mutations,
//! dialogs and the address bar. Nothing here touches the terminal or network.

pub mod address;
pub mod browser;
pub mod dialog;
pub mod input;
pub mod item;
pub mod menu;
pub mod mutation;
pub mod path;
pub mod selection;
pub mod tree;
