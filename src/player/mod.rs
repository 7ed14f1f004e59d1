pub mod traits;

pub use traits::{MediaPlayer, PlayerEvent};
