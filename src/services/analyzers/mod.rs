pub mod content;
pub mod meta;
pub mod mobile;
pub mod technical;
