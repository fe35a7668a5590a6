//! Run orchestration: options → files → engine → output.

use rayon::prelude::*;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, info};

use crate::configuration::{self, ConfigurationError, ConfigurationResolver, LintConfiguration};
use crate::engine::LintEngine;
use crate::files::{self, LintTarget};
use crate::issue::Issue;
use crate::options::{self, Options, OptionsError};
use crate::output::{Framing, IssueSender, IssueWriter, OutputError, XcodeReporter};

/// Errors that end a run before or while linting.
#[derive(Debug, Error)]
pub enum RunError {
    /// The options document could not be loaded.
    #[error(transparent)]
    Options(#[from] OptionsError),

    /// The override configuration could not be loaded.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The output stream failed.
    #[error(transparent)]
    Output(#[from] OutputError),

    /// IO error outside the output stream.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The worker pool could not be built.
    #[error("Failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// How files are linted and reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Issue records streamed from a worker pool.
    Stream {
        /// Worker count; `None` uses the hardware concurrency.
        jobs: Option<usize>,
        /// Record terminator.
        framing: Framing,
    },
    /// Xcode-style report, one file at a time.
    Report,
}

impl Default for RunMode {
    fn default() -> Self {
        Self::Stream {
            jobs: None,
            framing: Framing::Nul,
        }
    }
}

/// Counts for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Files handed to the engine.
    pub files: usize,
    /// Violations the engine reported.
    pub violations: usize,
}

/// Where a run reads its inputs from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    /// Directory include/exclude paths resolve against.
    pub project_root: PathBuf,
    /// The options document.
    pub options_file: PathBuf,
    /// The project-wide SwiftLint configuration, used if it exists.
    pub override_file: PathBuf,
    /// Reporting mode.
    pub mode: RunMode,
}

impl Run {
    /// Derives the input locations from an optional project root.
    ///
    /// Without a root, paths resolve against the current directory and the
    /// well-known `/config.json` and `/code/.swiftlint.yml` are used.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined.
    pub fn for_root(root: Option<&Path>, mode: RunMode) -> io::Result<Self> {
        let cwd = std::env::current_dir()?;
        let project_root = root.map_or_else(|| cwd.clone(), |r| crate::paths::absolutize(&cwd, r));
        Ok(Self {
            project_root,
            options_file: options::options_path(root),
            override_file: configuration::override_path(root),
            mode,
        })
    }

    /// Loads the options and resolves the files to lint.
    ///
    /// # Errors
    ///
    /// Returns an error if the options or the override configuration cannot
    /// be loaded.
    pub fn targets(&self) -> Result<Vec<LintTarget>, RunError> {
        let options = Options::from_file(&self.options_file)?;
        debug!("Loaded options from {}", self.options_file.display());

        let root_config = LintConfiguration::root(&self.project_root, &self.override_file)?;
        let mut resolver = ConfigurationResolver::new(&self.project_root, root_config);
        Ok(files::resolve(&options, &mut resolver))
    }

    /// Runs the whole pipeline, writing to `out`, and returns `out` once
    /// every record has been written.
    ///
    /// # Errors
    ///
    /// Returns an error if loading inputs or writing output fails.
    pub fn execute<E, W>(&self, engine: &E, out: W) -> Result<(W, RunSummary), RunError>
    where
        E: LintEngine + ?Sized,
        W: Write + Send + 'static,
    {
        let targets = self.targets()?;
        self.lint(engine, &targets, out)
    }

    /// Lints resolved targets in this run's mode, writing to `out`, and
    /// returns `out` once every record has been written.
    ///
    /// # Errors
    ///
    /// Returns an error if writing output fails.
    pub fn lint<E, W>(
        &self,
        engine: &E,
        targets: &[LintTarget],
        out: W,
    ) -> Result<(W, RunSummary), RunError>
    where
        E: LintEngine + ?Sized,
        W: Write + Send + 'static,
    {
        match self.mode {
            RunMode::Stream { jobs, framing } => {
                let writer = IssueWriter::spawn(out, framing)?;
                let result = stream(engine, targets, &self.project_root, &writer.sender(), jobs);
                let out = writer.finish()?;
                Ok((out, result?))
            }
            RunMode::Report => {
                let mut reporter = XcodeReporter::new(out);
                let summary = report(engine, targets, &mut reporter)?;
                Ok((reporter.into_inner()?, summary))
            }
        }
    }
}

/// Lints every target on a worker pool and sends the issues to `sender`.
///
/// Completion order is unspecified.
///
/// # Errors
///
/// Returns an error if the pool cannot be built or the writer has stopped.
pub fn stream<E: LintEngine + ?Sized>(
    engine: &E,
    targets: &[LintTarget],
    root: &Path,
    sender: &IssueSender,
    jobs: Option<usize>,
) -> Result<RunSummary, RunError> {
    if targets.is_empty() {
        info!("No files to lint");
        return Ok(RunSummary::default());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.unwrap_or(0))
        .thread_name(|i| format!("lint-worker-{i}"))
        .build()?;
    info!(
        "Linting {} files on {} worker(s)",
        targets.len(),
        pool.current_num_threads()
    );

    let violations = AtomicUsize::new(0);
    pool.install(|| {
        targets
            .par_iter()
            .try_for_each_with(sender.clone(), |sender, target| {
                let found = engine.lint(&target.file, &target.configuration);
                violations.fetch_add(found.len(), Ordering::Relaxed);
                let issues = found.iter().map(|v| Issue::new(v, root)).collect();
                sender.send(issues)
            })
    })?;

    Ok(RunSummary {
        files: targets.len(),
        violations: violations.into_inner(),
    })
}

/// Lints targets one at a time, in order, writing a human-readable report.
///
/// # Errors
///
/// Returns an error if writing the report fails.
pub fn report<E, W>(
    engine: &E,
    targets: &[LintTarget],
    reporter: &mut XcodeReporter<W>,
) -> Result<RunSummary, RunError>
where
    E: LintEngine + ?Sized,
    W: Write,
{
    let count = Mutex::new(0usize);

    for target in targets {
        let found = engine.lint(&target.file, &target.configuration);
        *count.lock().unwrap_or_else(std::sync::PoisonError::into_inner) += found.len();
        reporter.report(&found)?;
    }

    Ok(RunSummary {
        files: targets.len(),
        violations: count
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner),
    })
}
