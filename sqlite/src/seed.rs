//! Synthetic test data for the bundled application schema.
//!
//! The dataset is fixed: three users, four cached products, two photos per
//! seeded user and one processing task per photo. Every row is identified by
//! a natural key so seeding is insert-if-absent and clearing removes exactly
//! what seeding can create. Photos and tasks are removed through the
//! schema's `ON DELETE CASCADE` when their user is deleted.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rusqlite::{OptionalExtension, Transaction, params};
use tracing::debug;

/// A seeded user, keyed by `tg_user_id`.
#[derive(Debug, Clone, Copy)]
pub struct UserFixture {
    pub tg_user_id: &'static str,
    pub username: &'static str,
    pub first_name: &'static str,
    pub last_name: &'static str,
}

/// A cached nutrition lookup, keyed by `(normalized_name, variant, source)`.
#[derive(Debug, Clone, Copy)]
pub struct ProductFixture {
    pub normalized_name: &'static str,
    pub variant: Option<&'static str>,
    pub source: &'static str,
    pub source_url: &'static str,
    pub calories_100g: f64,
    pub protein_100g: f64,
    pub fat_100g: f64,
    pub carbs_100g: f64,
    pub confidence: f64,
}

pub const USERS: [UserFixture; 3] = [
    UserFixture {
        tg_user_id: "1001",
        username: "alice",
        first_name: "Alice",
        last_name: "Wonder",
    },
    UserFixture {
        tg_user_id: "1002",
        username: "bob",
        first_name: "Bob",
        last_name: "Builder",
    },
    UserFixture {
        tg_user_id: "1003",
        username: "carol",
        first_name: "Carol",
        last_name: "Smith",
    },
];

pub const PRODUCTS: [ProductFixture; 4] = [
    ProductFixture {
        normalized_name: "chicken breast",
        variant: None,
        source: "calorizator",
        source_url: "https://calorizator.ru/product/chicken-breast",
        calories_100g: 165.0,
        protein_100g: 31.0,
        fat_100g: 3.6,
        carbs_100g: 0.0,
        confidence: 0.95,
    },
    ProductFixture {
        normalized_name: "banana",
        variant: None,
        source: "calorizator",
        source_url: "https://calorizator.ru/product/banana",
        calories_100g: 96.0,
        protein_100g: 1.5,
        fat_100g: 0.5,
        carbs_100g: 21.0,
        confidence: 0.98,
    },
    ProductFixture {
        normalized_name: "rice white",
        variant: None,
        source: "fatsecret",
        source_url: "https://www.fatsecret.com/calories-nutrition/rice",
        calories_100g: 130.0,
        protein_100g: 2.4,
        fat_100g: 0.3,
        carbs_100g: 28.0,
        confidence: 0.9,
    },
    ProductFixture {
        normalized_name: "salmon fillet",
        variant: None,
        source: "calorizator",
        source_url: "https://calorizator.ru/product/salmon",
        calories_100g: 208.0,
        protein_100g: 20.0,
        fat_100g: 13.0,
        carbs_100g: 0.0,
        confidence: 0.92,
    },
];

/// Version tag stamped on seeded cache rows.
pub const PRODUCT_VERSION_TAG: &str = "v1";

/// Photos created per seeded user.
pub const PHOTOS_PER_USER: usize = 2;

pub const CAPTIONS: [&str; 4] = ["Breakfast", "Lunch", "Dinner", "Snack"];

/// Task states drawn for seeded photo tasks.
pub const TASK_STATUSES: [TaskStatus; 3] =
    [TaskStatus::Queued, TaskStatus::Running, TaskStatus::Done];

/// Result payload attached to finished tasks.
pub const DONE_RESULT_JSON: &str = r#"{"sample":"ok"}"#;

/// Processing state of a photo task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Queued,
    Running,
    Done,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Queued => "queued",
            TaskStatus::Running => "running",
            TaskStatus::Done => "done",
        }
    }
}

/// Natural key of the `index`-th photo of a user.
pub fn photo_unique_id(tg_user_id: &str, index: usize) -> String {
    format!("uniq_{tg_user_id}_{index}")
}

/// Rows affected by a seed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub products: usize,
    pub photos: usize,
    pub tasks: usize,
}

/// Rows deleted by a clear run. Cascaded photo and task deletions are not
/// counted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearReport {
    pub users: usize,
    pub products: usize,
}

/// Task fields drawn from the random source.
#[derive(Debug)]
struct TaskPlan {
    status: TaskStatus,
    retry_count: u32,
    next_run_at: Option<String>,
    result_json: Option<&'static str>,
}

impl TaskPlan {
    fn draw<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> Self {
        let status = TASK_STATUSES[rng.random_range(0..TASK_STATUSES.len())];
        let retry_count = rng.random_range(0..=3);
        if status == TaskStatus::Done {
            Self {
                status,
                retry_count,
                next_run_at: None,
                result_json: Some(DONE_RESULT_JSON),
            }
        } else {
            let delay = Duration::minutes(rng.random_range(1..=30));
            Self {
                status,
                retry_count,
                next_run_at: Some(timestamp(now + delay)),
                result_json: None,
            }
        }
    }
}

/// Formats a UTC instant the way seeded rows store it.
pub fn timestamp(at: DateTime<Utc>) -> String {
    format!("{}Z", at.format("%Y-%m-%dT%H:%M:%S%.6f"))
}

pub(crate) fn insert_fixtures<R: Rng + ?Sized>(
    tx: &Transaction<'_>,
    rng: &mut R,
    now: DateTime<Utc>,
) -> rusqlite::Result<SeedReport> {
    let mut report = SeedReport::default();

    for user in &USERS {
        report.users += tx.execute(
            "INSERT OR IGNORE INTO users (tg_user_id, username, first_name, last_name)
             VALUES (?1, ?2, ?3, ?4)",
            params![user.tg_user_id, user.username, user.first_name, user.last_name],
        )?;
    }

    // variant is nullable, so a UNIQUE constraint would not catch repeats.
    for product in &PRODUCTS {
        report.products += tx.execute(
            "INSERT INTO kbju_cache
                 (normalized_name, variant, source, source_url, calories_100g,
                  protein_100g, fat_100g, carbs_100g, confidence, version_tag)
             SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10
             WHERE NOT EXISTS (
                 SELECT 1 FROM kbju_cache
                 WHERE normalized_name = ?1 AND variant IS ?2 AND source = ?3
             )",
            params![
                product.normalized_name,
                product.variant,
                product.source,
                product.source_url,
                product.calories_100g,
                product.protein_100g,
                product.fat_100g,
                product.carbs_100g,
                product.confidence,
                PRODUCT_VERSION_TAG,
            ],
        )?;
    }

    let created_at = timestamp(now);
    for user in &USERS {
        let Some(user_id) = tx
            .query_row(
                "SELECT id FROM users WHERE tg_user_id = ?1",
                [user.tg_user_id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
        else {
            continue;
        };

        for index in 0..PHOTOS_PER_USER {
            let unique_id = photo_unique_id(user.tg_user_id, index);
            let file_id = format!("file_{}_{index}", user.tg_user_id);
            let caption = CAPTIONS[rng.random_range(0..CAPTIONS.len())];
            let taken_at = timestamp(now - Duration::minutes(10 * index as i64));

            report.photos += tx.execute(
                "INSERT OR IGNORE INTO photos (user_id, tg_file_unique_id, tg_file_id, caption, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![user_id, unique_id, file_id, caption, taken_at],
            )?;

            let Some(photo_id) = tx
                .query_row(
                    "SELECT id FROM photos WHERE tg_file_unique_id = ?1",
                    [&unique_id],
                    |row| row.get::<_, i64>(0),
                )
                .optional()?
            else {
                continue;
            };

            let plan = TaskPlan::draw(rng, now);
            debug!(photo = %unique_id, status = plan.status.as_str(), "Seeding photo task");
            report.tasks += tx.execute(
                "INSERT INTO photo_tasks
                     (photo_id, status, retry_count, next_run_at, result_json, created_at, updated_at)
                 SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?6
                 WHERE NOT EXISTS (SELECT 1 FROM photo_tasks WHERE photo_id = ?1)",
                params![
                    photo_id,
                    plan.status.as_str(),
                    plan.retry_count,
                    plan.next_run_at,
                    plan.result_json,
                    created_at,
                ],
            )?;
        }
    }

    Ok(report)
}

pub(crate) fn delete_fixtures(tx: &Transaction<'_>) -> rusqlite::Result<ClearReport> {
    let mut report = ClearReport::default();

    for user in &USERS {
        report.users += tx.execute(
            "DELETE FROM users WHERE tg_user_id = ?1",
            [user.tg_user_id],
        )?;
    }

    for product in &PRODUCTS {
        report.products += tx.execute(
            "DELETE FROM kbju_cache
             WHERE normalized_name = ?1 AND variant IS ?2 AND source = ?3",
            params![product.normalized_name, product.variant, product.source],
        )?;
    }

    Ok(report)
}
