//! Curriculum data shapes.

use serde::{Deserialize, Serialize};

/// A single sign in the vocabulary, with the phonological parameters shown
/// in the example panel during practice.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Sign {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub difficulty: i64,
    pub handshape: String,
    pub location: String,
    pub orientation: String,
    pub movement: String,
}

/// A lesson with its signs in practice order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub description: String,
    pub order: i64,
    pub signs: Vec<LessonSign>,
}

/// One sign's slot within a lesson.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonSign {
    pub order: i64,
    pub sign: Sign,
}
