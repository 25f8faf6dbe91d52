pub mod assignment;
pub mod course;
pub mod response;
pub mod submission;
