// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Question reads.

use super::Store;
use crate::error::StorageError;
use fray_core::{AgentId, Question, QuestionId, QuestionStatus};
use rusqlite::{params, OptionalExtension, Row};

const QUESTION_COLS: &str =
    "guid, asked_by, asked_of, body, home, status, answer, created_at, answered_at";

pub(crate) fn status_from_str(s: &str) -> QuestionStatus {
    match s {
        "answered" => QuestionStatus::Answered,
        "dismissed" => QuestionStatus::Dismissed,
        _ => QuestionStatus::Open,
    }
}

pub(crate) fn row_to_question(row: &Row<'_>) -> rusqlite::Result<Question> {
    Ok(Question {
        guid: QuestionId::new(row.get::<_, String>(0)?),
        asked_by: AgentId::new(row.get::<_, String>(1)?),
        asked_of: row.get::<_, Option<String>>(2)?.map(AgentId::new),
        body: row.get(3)?,
        home: row.get(4)?,
        status: status_from_str(&row.get::<_, String>(5)?),
        answer: row.get(6)?,
        created_at: row.get(7)?,
        answered_at: row.get(8)?,
    })
}

impl Store {
    pub fn get_question(&self, guid: &str) -> Result<Question, StorageError> {
        let sql = format!("SELECT {QUESTION_COLS} FROM questions WHERE guid = ?1");
        self.conn()
            .query_row(&sql, params![guid], row_to_question)
            .optional()?
            .ok_or_else(|| StorageError::not_found("question", guid))
    }

    pub fn open_questions(&self, asked_of: Option<&str>) -> Result<Vec<Question>, StorageError> {
        let mut out = Vec::new();
        match asked_of {
            Some(agent) => {
                let sql = format!(
                    "SELECT {QUESTION_COLS} FROM questions WHERE status = 'open' \
                     AND asked_of = ?1 ORDER BY created_at, guid"
                );
                let mut stmt = self.conn().prepare(&sql)?;
                for row in stmt.query_map(params![agent], row_to_question)? {
                    out.push(row?);
                }
            }
            None => {
                let sql = format!(
                    "SELECT {QUESTION_COLS} FROM questions WHERE status = 'open' \
                     ORDER BY created_at, guid"
                );
                let mut stmt = self.conn().prepare(&sql)?;
                for row in stmt.query_map([], row_to_question)? {
                    out.push(row?);
                }
            }
        }
        Ok(out)
    }
}
