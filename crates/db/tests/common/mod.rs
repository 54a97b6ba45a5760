//! Fixture builders shared by the repository integration tests.

#![allow(dead_code)]

use eduhub_core::types::DbId;
use eduhub_db::models::course::{Course, CreateCourse};
use eduhub_db::models::lesson::{CreateLesson, Lesson};
use eduhub_db::models::user::{CreateUser, User};
use eduhub_db::repositories::{CourseRepo, LessonRepo, UserRepo};
use sqlx::PgPool;

pub async fn create_user(pool: &PgPool, email: &str, role: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            name: email.split('@').next().unwrap_or(email).to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$test-only".to_string(),
            role: role.to_string(),
        },
    )
    .await
    .unwrap()
}

pub fn new_course(title: &str, category: &str, level: &str) -> CreateCourse {
    CreateCourse {
        title: title.to_string(),
        description: format!("{title}: a hands-on course"),
        short_description: None,
        category: category.to_string(),
        level: level.to_string(),
        price: 49.0,
        discount_price: None,
        thumbnail_url: None,
        duration_hours: Some(3),
        duration_minutes: Some(30),
        language: None,
        requirements: vec![],
        learning_outcomes: vec![],
        tags: vec![],
    }
}

pub async fn create_course(pool: &PgPool, instructor_id: DbId, title: &str) -> Course {
    let slug = eduhub_core::course::unique_slug(title);
    CourseRepo::create(
        pool,
        instructor_id,
        &slug,
        &new_course(title, "Programming", "Beginner"),
    )
    .await
    .unwrap()
}

pub async fn create_published_course(
    pool: &PgPool,
    instructor_id: DbId,
    title: &str,
    category: &str,
    level: &str,
) -> Course {
    let slug = eduhub_core::course::unique_slug(title);
    let course = CourseRepo::create(pool, instructor_id, &slug, &new_course(title, category, level))
        .await
        .unwrap();
    CourseRepo::set_status(pool, course.id, "published")
        .await
        .unwrap()
        .unwrap()
}

pub fn new_lesson(course_id: DbId, sort_order: i32) -> CreateLesson {
    CreateLesson {
        course_id,
        title: format!("Lesson {sort_order}"),
        description: None,
        sort_order,
        duration_mins: 10,
        video_url: format!("https://videos.example.com/{course_id}/{sort_order}.mp4"),
        resources: vec![],
        quiz: vec![],
        is_preview: None,
        is_published: Some(true),
    }
}

pub async fn create_lessons(
    pool: &PgPool,
    instructor_id: DbId,
    course_id: DbId,
    count: i32,
) -> Vec<Lesson> {
    let mut lessons = Vec::new();
    for order in 1..=count {
        lessons.push(
            LessonRepo::create(pool, instructor_id, &new_lesson(course_id, order))
                .await
                .unwrap(),
        );
    }
    lessons
}
