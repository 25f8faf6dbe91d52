pub mod assignments;
pub mod courses;
pub mod enrollments;
pub mod students;
pub mod submissions;
