// Application layer - the windowed, count-batched buffering pipeline
pub mod batcher;
pub mod chain;
pub mod sample_writer;
pub mod streamer;
