// Engine module - reusable game engine components

pub mod components;
pub mod navigation;
pub mod priority_queue;
pub mod scheduler;
pub mod systems;

// Re-export commonly used items
pub use components::*;
pub use priority_queue::{PriorityQueue, QueueError};
