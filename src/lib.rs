pub mod components;
pub mod enums;
pub mod level;
pub mod plugins;
pub mod tuning;

pub use components::*;
pub use enums::*;
pub use tuning::*;
