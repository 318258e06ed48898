pub mod completion;
pub mod config;
pub mod constants;
pub mod constellation;
pub mod contact;
pub mod controller;
pub mod easing;
pub mod error;
pub mod field;
pub mod lifetime;
pub mod motion;
pub mod phase;
pub mod pick;
pub mod progress;

pub use completion::*;
pub use config::*;
pub use constants::*;
pub use constellation::*;
pub use controller::*;
pub use easing::*;
pub use error::*;
pub use field::*;
pub use lifetime::*;
pub use motion::*;
pub use phase::*;
pub use pick::*;
pub use progress::*;

// Shaders bundled as string constants
pub static STARFIELD_WGSL: &str = include_str!("../shaders/starfield.wgsl");
pub static CONSTELLATION_WGSL: &str = include_str!("../shaders/constellation.wgsl");
