//! Read paths over the seeded curriculum.

use crate::curriculum::types::{Lesson, LessonSign, Sign};
use crate::error::Result;

use anyhow::Context as _;
use sqlx::SqlitePool;

/// Persistent store for lessons and signs. Reference data is effectively
/// immutable at runtime, so this store only reads; writes live in
/// [`crate::curriculum::seed`].
#[derive(Clone)]
pub struct CurriculumStore {
    pool: SqlitePool,
}

impl CurriculumStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All lessons ordered by their sort order, each with its signs in
    /// lesson order.
    pub async fn list_lessons(&self) -> Result<Vec<Lesson>> {
        let lesson_rows = sqlx::query_as::<_, LessonRow>(
            "SELECT id, title, description, sort_order FROM lessons ORDER BY sort_order ASC",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch lessons")?;

        let sign_rows = sqlx::query_as::<_, LessonSignRow>(
            "SELECT ls.lesson_id, ls.sort_order,
                    s.id, s.name, s.description, s.image_url, s.difficulty,
                    s.handshape, s.location, s.orientation, s.movement
             FROM lesson_signs ls
             JOIN signs s ON s.id = ls.sign_id
             ORDER BY ls.lesson_id ASC, ls.sort_order ASC",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch lesson signs")?;

        let mut lessons: Vec<Lesson> = lesson_rows
            .into_iter()
            .map(|row| Lesson {
                id: row.id,
                title: row.title,
                description: row.description,
                order: row.sort_order,
                signs: Vec::new(),
            })
            .collect();

        for row in sign_rows {
            if let Some(lesson) = lessons.iter_mut().find(|l| l.id == row.lesson_id) {
                lesson.signs.push(LessonSign {
                    order: row.sort_order,
                    sign: Sign {
                        id: row.id,
                        name: row.name,
                        description: row.description,
                        image_url: row.image_url,
                        difficulty: row.difficulty,
                        handshape: row.handshape,
                        location: row.location,
                        orientation: row.orientation,
                        movement: row.movement,
                    },
                });
            }
        }

        Ok(lessons)
    }

    /// Fetch a single sign by id.
    pub async fn get_sign(&self, id: &str) -> Result<Option<Sign>> {
        let sign = sqlx::query_as::<_, Sign>(
            "SELECT id, name, description, image_url, difficulty,
                    handshape, location, orientation, movement
             FROM signs WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch sign by id")?;

        Ok(sign)
    }

    /// Fetch a sign by its unique name.
    pub async fn get_sign_by_name(&self, name: &str) -> Result<Option<Sign>> {
        let sign = sqlx::query_as::<_, Sign>(
            "SELECT id, name, description, image_url, difficulty,
                    handshape, location, orientation, movement
             FROM signs WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch sign by name")?;

        Ok(sign)
    }
}

#[derive(sqlx::FromRow)]
struct LessonRow {
    id: String,
    title: String,
    description: String,
    sort_order: i64,
}

#[derive(sqlx::FromRow)]
struct LessonSignRow {
    lesson_id: String,
    sort_order: i64,
    id: String,
    name: String,
    description: String,
    image_url: String,
    difficulty: i64,
    handshape: String,
    location: String,
    orientation: String,
    movement: String,
}
