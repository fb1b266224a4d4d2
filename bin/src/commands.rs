pub mod render;
pub mod stats;
pub mod suggest;
