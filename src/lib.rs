pub mod api;
pub mod app;
pub mod config;
pub mod diary_entry;
pub mod diary_state;
pub mod entry_form;
pub mod entry_item;
pub mod logging;
pub mod text_input;
pub mod ui;

#[cfg(test)]
mod test_support;
