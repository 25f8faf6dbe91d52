pub mod assignment;
pub mod course;
pub mod files;
pub mod health;
pub mod root;
pub mod student;
pub mod submission;
