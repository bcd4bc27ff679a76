// Flume Frontier: cost-field navigation and timed spawning on top of a
// binary-heap priority queue.

pub mod engine;
