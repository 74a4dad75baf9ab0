// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
pub mod config;
pub mod database;
pub mod date_parser;
pub mod handlers;
pub mod routes;

use std::sync::Arc;

use chrono::{FixedOffset, Offset, Utc};
use sqlx::SqlitePool;

use crate::date_parser::{DateParser, KeywordDateParser};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    /// Offset at which calendar days start for "today" / "this week" / "overdue".
    pub utc_offset: FixedOffset,
    pub date_parser: Arc<dyn DateParser>,
}

impl AppState {
    /// State with UTC day boundaries and the built-in keyword date parser.
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_offset(pool, Utc.fix())
    }

    pub fn with_offset(pool: SqlitePool, utc_offset: FixedOffset) -> Self {
        Self {
            pool,
            utc_offset,
            date_parser: Arc::new(KeywordDateParser::new(utc_offset)),
        }
    }

    pub fn with_date_parser(mut self, date_parser: Arc<dyn DateParser>) -> Self {
        self.date_parser = date_parser;
        self
    }
}
