pub mod assignment;
pub mod course;
pub mod enrollment;
pub mod submission;
