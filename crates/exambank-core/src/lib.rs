//! exambank-core — Exam composition, psychometric scoring, and bank growth.
//!
//! This crate defines the question data model, the difficulty/category
//! tagger, the exam composer, the psychometric scorer, and the pipeline
//! that grows the generated question bank.

pub mod bank;
pub mod composer;
pub mod error;
pub mod grading;
pub mod model;
pub mod scoring;
pub mod service;
pub mod store;
pub mod tagger;
pub mod traits;
pub mod weights;
