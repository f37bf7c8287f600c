//! Idempotent curriculum seeding.
//!
//! Runs at startup. Existing rows are left untouched so re-running a server
//! against the same database never rewrites reference data.

use crate::error::Result;

use anyhow::Context as _;
use sqlx::SqlitePool;

struct SeedSign {
    name: &'static str,
    description: &'static str,
    image_url: &'static str,
    difficulty: i64,
    handshape: &'static str,
    location: &'static str,
    orientation: &'static str,
    movement: &'static str,
}

const SIGNS: &[SeedSign] = &[
    SeedSign {
        name: "Hello",
        description: "Raise your hand to your forehead and move it away in a salute-like motion.",
        image_url: "/signs/hello.svg",
        difficulty: 1,
        handshape: "Flat hand (B-hand)",
        location: "Near temple/forehead",
        orientation: "Palm facing out",
        movement: "Outward away from head",
    },
    SeedSign {
        name: "Thank You",
        description: "Touch your chin with your fingertips and move your hand forward.",
        image_url: "/signs/thank-you.svg",
        difficulty: 1,
        handshape: "Flat hand",
        location: "Chin",
        orientation: "Palm facing in",
        movement: "Forward and down",
    },
    SeedSign {
        name: "A",
        description: "Make a fist with your thumb resting on the side of your index finger.",
        image_url: "/signs/a.svg",
        difficulty: 1,
        handshape: "Fist (A-hand)",
        location: "Neutral space",
        orientation: "Palm facing out",
        movement: "None (Static)",
    },
    SeedSign {
        name: "B",
        description: "Hold your hand open with fingers together and thumb tucked across your palm.",
        image_url: "/signs/b.svg",
        difficulty: 1,
        handshape: "Open palm (B-hand)",
        location: "Neutral space",
        orientation: "Palm facing out",
        movement: "None (Static)",
    },
];

const LESSON_ID: &str = "lesson-1";

/// Seed the sign vocabulary and the starter lesson.
pub async fn run(pool: &SqlitePool) -> Result<()> {
    for sign in SIGNS {
        sqlx::query(
            "INSERT INTO signs (id, name, description, image_url, difficulty,
                                handshape, location, orientation, movement)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(name) DO NOTHING",
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(sign.name)
        .bind(sign.description)
        .bind(sign.image_url)
        .bind(sign.difficulty)
        .bind(sign.handshape)
        .bind(sign.location)
        .bind(sign.orientation)
        .bind(sign.movement)
        .execute(pool)
        .await
        .with_context(|| format!("failed to seed sign {}", sign.name))?;
    }

    sqlx::query(
        "INSERT INTO lessons (id, title, description, sort_order)
         VALUES (?, ?, ?, ?)
         ON CONFLICT(id) DO NOTHING",
    )
    .bind(LESSON_ID)
    .bind("Basics 101")
    .bind("Learn the fundamental greetings and first letters.")
    .bind(1_i64)
    .execute(pool)
    .await
    .context("failed to seed starter lesson")?;

    // Link every seeded sign into the starter lesson, in vocabulary order.
    for (index, sign) in SIGNS.iter().enumerate() {
        sqlx::query(
            "INSERT INTO lesson_signs (sign_id, lesson_id, sort_order)
             SELECT id, ?, ? FROM signs WHERE name = ?
             ON CONFLICT(sign_id, lesson_id) DO NOTHING",
        )
        .bind(LESSON_ID)
        .bind((index + 1) as i64)
        .bind(sign.name)
        .execute(pool)
        .await
        .with_context(|| format!("failed to link sign {} into starter lesson", sign.name))?;
    }

    tracing::info!("curriculum seeded");
    Ok(())
}
