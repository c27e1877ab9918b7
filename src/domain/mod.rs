// Domain layer - health sample and window-batch models
pub mod sample;
pub mod window;
