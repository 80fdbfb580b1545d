#[cfg(test)]
mod test_utils;

pub mod abstractions;
pub mod access;
pub mod background_worker;
pub mod boss_list;
pub mod constants;
pub mod countdown;
pub mod dashboard;
pub mod editor;
pub mod error;
pub mod flags;
pub mod logger;
pub mod models;
pub mod settings;
pub mod spawn_resolver;
pub mod start;
pub mod ticker;

pub use start::start;
pub use start::StartOptions;
pub use editor::{start_editor, EditorCommand};
