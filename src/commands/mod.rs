pub mod report;
pub mod serve;
pub mod tools;
