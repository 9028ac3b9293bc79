//! Puts every raster of a [`Config`] on the model grid and writes the arrays.

use rayon::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};

use crate::array_io::{self, GridIoError};
use crate::config::{Config, RasterJob};
use crate::resample::{DataSourceError, GridResampler};
use crate::summary::GridSummary;

#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    DataSource(#[from] DataSourceError),
    #[error(transparent)]
    Write(#[from] GridIoError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    Processed(GridSummary),
    /// Source missing; the no-data grid was written instead.
    Fallback,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobOutcome {
    pub name: String,
    pub output: PathBuf,
    pub status: JobStatus,
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub outcomes: Vec<JobOutcome>,
}

impl BatchReport {
    pub fn failures(&self) -> impl Iterator<Item = &JobOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, JobStatus::Failed(_)))
    }

    pub fn fallbacks(&self) -> impl Iterator<Item = &JobOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, JobStatus::Fallback))
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            match &outcome.status {
                JobStatus::Processed(_) => {
                    writeln!(f, "✓ {} -> {}", outcome.name, outcome.output.display())?
                }
                JobStatus::Fallback => writeln!(
                    f,
                    "✗ {} -> {} (source missing, no-data grid written)",
                    outcome.name,
                    outcome.output.display()
                )?,
                JobStatus::Failed(message) => {
                    writeln!(f, "✗ {} failed: {}", outcome.name, message)?
                }
            }
        }
        write!(
            f,
            "{} rasters: {} processed, {} missing, {} failed",
            self.outcomes.len(),
            self.outcomes.len() - self.fallbacks().count() - self.failures().count(),
            self.fallbacks().count(),
            self.failures().count()
        )
    }
}

#[derive(Debug)]
pub struct BatchProcessor {
    config: Config,
    resampler: GridResampler,
}

impl BatchProcessor {
    pub fn new(config: Config) -> Self {
        let resampler = GridResampler::new().with_scale_fallback(config.scale_fallback());
        BatchProcessor { config, resampler }
    }

    /// Runs every job; a failing job does not stop the others.
    pub fn process(&self) -> BatchReport {
        let jobs = self.config.rasters();
        let outcomes: Vec<JobOutcome> = if self.config.parallel() {
            jobs.par_iter().map(|job| self.run_job(job)).collect()
        } else {
            jobs.iter().map(|job| self.run_job(job)).collect()
        };

        BatchReport { outcomes }
    }

    fn run_job(&self, job: &RasterJob) -> JobOutcome {
        let output = self.config.output_path(job);
        let status = match self.process_job(job, &output) {
            Ok(status) => status,
            Err(e) => {
                error!(
                    name = %job.name,
                    source = %job.path.display(),
                    error = %e,
                    "Raster job failed"
                );
                JobStatus::Failed(e.to_string())
            }
        };

        JobOutcome {
            name: job.name.clone(),
            output,
            status,
        }
    }

    fn process_job(&self, job: &RasterJob, output: &Path) -> Result<JobStatus, JobError> {
        let grid = self.config.grid();
        let conversion = job.conversion.factor();

        let outcome = self
            .resampler
            .resample(&job.path, grid, job.method, conversion)?;

        // The text dump is written even when the source was missing.
        array_io::write_grid(output, &outcome.grid)?;

        if outcome.fallback {
            return Ok(JobStatus::Fallback);
        }

        let summary = GridSummary::of(&outcome.grid, grid.nodata() * conversion);
        info!(
            name = %job.name,
            output = %output.display(),
            method = %job.method,
            conversion,
            "Raster processed\n{summary}"
        );
        Ok(JobStatus::Processed(summary))
    }
}
