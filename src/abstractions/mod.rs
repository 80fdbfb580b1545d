pub mod clock;
pub mod event_emitter;
pub mod file_system;
pub mod record_store;
pub mod settings_manager;

pub use clock::*;
pub use event_emitter::*;
pub use file_system::*;
pub use record_store::*;
pub use settings_manager::*;
