pub mod announcement;
pub mod duration;
