// ABOUTME: JSON snapshot export of registrants, waitlist, and successors per year
// ABOUTME: Writes <dir>/<prefix><year>-{attendees,waitinglist,successors}.txt files
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::config::ExportConfig;
use crate::constants::export;
use crate::errors::{AppError, AppResult};
use crate::registration::TokenManager;

/// Files written by one export run
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    /// Exported year
    pub year: i32,
    /// Registrant snapshot path
    pub attendees: PathBuf,
    /// Waitlist snapshot path
    pub waiting_list: PathBuf,
    /// Successor snapshot path
    pub successors: PathBuf,
    /// Rows per snapshot, in the order above
    pub counts: [usize; 3],
}

/// Writes year snapshots as pretty-printed JSON
pub struct Exporter {
    config: ExportConfig,
}

impl Exporter {
    /// Exporter writing into `config.directory`
    #[must_use]
    pub const fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Snapshot path for `year` and `kind`
    #[must_use]
    pub fn path_for(&self, year: i32, kind: &str) -> PathBuf {
        self.config
            .directory
            .join(format!("{}{year}-{kind}.txt", self.config.prefix))
    }

    /// Export registrants, waitlist, and successors of `year`
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails or a file cannot be written
    pub async fn export_year(&self, manager: &TokenManager, year: i32) -> AppResult<ExportReport> {
        tokio::fs::create_dir_all(&self.config.directory)
            .await
            .map_err(|e| {
                AppError::storage(format!(
                    "Cannot create export directory {}: {e}",
                    self.config.directory.display()
                ))
            })?;

        let registrants = manager.registrants(Some(year)).await?;
        let waitlist = manager.waitlist(Some(year)).await?;
        let successors = manager.successors(Some(year)).await?;

        let report = ExportReport {
            year,
            attendees: self.path_for(year, export::ATTENDEES),
            waiting_list: self.path_for(year, export::WAITING_LIST),
            successors: self.path_for(year, export::SUCCESSORS),
            counts: [registrants.len(), waitlist.len(), successors.len()],
        };

        write_json(&report.attendees, &registrants).await?;
        write_json(&report.waiting_list, &waitlist).await?;
        write_json(&report.successors, &successors).await?;

        info!(
            export.year = year,
            export.attendees = report.counts[0],
            export.waiting_list = report.counts[1],
            export.successors = report.counts[2],
            export.directory = %self.config.directory.display(),
            "Export written"
        );

        Ok(report)
    }
}

async fn write_json<T: Serialize + Sync>(path: &Path, rows: &T) -> AppResult<()> {
    let body = serde_json::to_vec_pretty(rows)?;
    tokio::fs::write(path, body)
        .await
        .map_err(|e| AppError::storage(format!("Cannot write {}: {e}", path.display())))
}
