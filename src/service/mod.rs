pub mod directory;
pub mod projection;
pub mod recorder;
