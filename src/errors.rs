/*
 *  Tromo - Discord bot for tracking per-day help counts reported by staff.
 *  Copyright (C) 2026  Tromo contributors
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;
use thiserror::Error;

/**
 * Unified application error type.
 *
 * Every module (store, aggregation, report, responder, scheduler) returns
 * AppError so the command boundary can handle failures uniformly. None of
 * these are fatal: the poise `on_error` hook catches them all.
 */
#[derive(Error, Debug)]
pub enum AppError {
    /// A persisted day file exists but cannot be parsed. Non-fatal: the
    /// store logs it and treats the day as empty.
    #[error("corrupt day file for {date}: {reason}")]
    CorruptData { date: String, reason: String },

    /// Undo or admin-reset against a user with nothing recorded.
    #[error("{0}")]
    NotFound(String),

    /// The summary was delivered but the tabular export failed.
    #[error("export failed: {0}")]
    Export(String),

    /// A response could not be delivered even after the retry.
    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Generic fallback:
    #[error("internal error: {0}")]
    Unknown(String),
}

pub type AppResult<T> = Result<T, AppError>;

/**
 * One recorded failure, kept for operator inspection.
 */
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEntry {
    pub when: DateTime<Utc>,
    /// Where the failure happened (command name, job name, ...).
    pub context: String,
    pub message: String,
}

/**
 * Bounded in-memory ring buffer of the most recent failures.
 *
 * Surfaced through the owner-only `errors` command and `GET /errors`.
 * Deliberately not persisted across restarts.
 */
pub struct ErrorLog {
    entries: Mutex<VecDeque<ErrorEntry>>,
    capacity: usize,
}

pub const DEFAULT_ERROR_CAPACITY: usize = 50;

impl ErrorLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /**
     * Records a failure, evicting the oldest entry when full.
     */
    pub fn push(&self, context: &str, message: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(ErrorEntry {
            when: Utc::now(),
            context: context.to_string(),
            message: message.to_string(),
        });
    }

    /**
     * Returns the most recent entries, newest last, at most `limit`.
     */
    pub fn recent(&self, limit: usize) -> Vec<ErrorEntry> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .iter()
            .rev()
            .take(limit)
            .rev()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ErrorLog {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_CAPACITY)
    }
}
