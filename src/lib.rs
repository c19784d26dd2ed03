pub mod competition_io;
pub mod draw;
pub mod nations;
pub mod pots;
pub mod presets;
pub mod schedule;
pub mod settings;
pub mod state;
