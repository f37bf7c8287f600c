//! Curriculum reference data: lessons, signs, and their ordering.

pub mod seed;
pub mod store;
pub mod types;

pub use store::CurriculumStore;
pub use types::{Lesson, LessonSign, Sign};
