pub mod job;
pub mod page;
pub mod report;
pub mod url;
