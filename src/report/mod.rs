//! Fatal error reporting
//!
//! Any unrecoverable condition ends the run with a single copy-pasteable report:
//!
//! ```text
//! ------------------------------ BEGIN ERROR REPORT ------------------------------
//! SPECIFIC DETAILS:
//!     Software Version: 5.10.50.85
//!     Dirty Path: /data/cvr.csv
//! --------------------------------------------------------------------------------
//! STACK TRACE:
//! ...
//! --------------------------------------------------------------------------------
//! REASON: Unable to parse CSV file.
//! ERROR KIND: input-malformed
//! INTERNAL ERROR OBJECT: CSV error: ...
//! <help text>
//! ------------------------------- END ERROR REPORT -------------------------------
//! ```
//!
//! Details are free text supplied by the failing stage. They quote offending input
//! where useful but never the seed or derived key.

use crate::domain::{ErrorKind, SanitizerError};
use std::backtrace::Backtrace;
use std::fmt;

/// Process exit code used after a fatal report
pub const FATAL_EXIT_CODE: i32 = 5;

const BEGIN_LINE: &str =
    "------------------------------ BEGIN ERROR REPORT ------------------------------\n";
const END_LINE: &str =
    "------------------------------- END ERROR REPORT -------------------------------\n";
const SEPARATOR: &str =
    "--------------------------------------------------------------------------------\n";

const HELP_TEXT: &str = "\
################################################################################

The sanitizer stopped because it could not proceed safely and no output was
finalized. The details above describe what was encountered. If the cause is not
obvious, copy everything between the \"BEGIN ERROR REPORT\" and \"END ERROR
REPORT\" lines into a bug report.

Common causes are:
    - an export format that has not been seen before
    - two values that should agree but do not
    - a check that failed where proceeding may be safe but is not confirmed

Review the report before sharing it. It never contains the seed, but it may
quote lines or identifiers from the input files.

################################################################################
";

/// Notes collected during a run and attached to any fatal report
///
/// ```
/// use cvr_sanitizer::report::{Diagnostics, FatalReport};
///
/// let mut notes = Diagnostics::default();
/// notes.note("Software Version: 5.2");
/// let report = FatalReport::new("Unable to parse CSV file.").with_notes(&notes);
/// assert_eq!(report.details(), ["Software Version: 5.2"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    notes: Vec<String>,
}

impl Diagnostics {
    /// Records a note
    pub fn note(&mut self, line: impl Into<String>) {
        self.notes.push(line.into());
    }

    /// Recorded notes in insertion order
    pub fn notes(&self) -> &[String] {
        &self.notes
    }
}

/// Everything needed to explain an aborted run
#[derive(Debug, Clone)]
pub struct FatalReport {
    reason: String,
    kind: Option<ErrorKind>,
    cause: Option<String>,
    details: Vec<String>,
}

impl FatalReport {
    /// Creates a report with no cause and no details
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            kind: None,
            cause: None,
            details: Vec::new(),
        }
    }

    /// Creates a report caused by `err`, carrying its kind and diagnostic lines
    pub fn from_error(reason: impl Into<String>, err: &SanitizerError) -> Self {
        Self {
            reason: reason.into(),
            kind: Some(err.kind()),
            cause: Some(err.to_string()),
            details: err.details(),
        }
    }

    /// Sets the internal error text
    pub fn with_cause(mut self, cause: impl fmt::Display) -> Self {
        self.cause = Some(cause.to_string());
        self
    }

    /// Sets the error kind
    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Appends a detail line
    pub fn with_detail(mut self, line: impl Into<String>) -> Self {
        self.details.push(line.into());
        self
    }

    /// Places the run's notes ahead of the existing details
    pub fn with_notes(mut self, diagnostics: &Diagnostics) -> Self {
        let mut details = diagnostics.notes.clone();
        details.append(&mut self.details);
        self.details = details;
        self
    }

    /// The stage-level reason
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// The error kind, when known
    pub fn kind(&self) -> Option<ErrorKind> {
        self.kind
    }

    /// The internal error text, when known
    pub fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }

    /// Detail lines
    pub fn details(&self) -> &[String] {
        &self.details
    }

    /// Renders the report with a freshly captured backtrace
    pub fn render(&self) -> String {
        self.render_with_trace(&Backtrace::force_capture().to_string())
    }

    /// Renders the report around the supplied stack trace
    pub fn render_with_trace(&self, trace: &str) -> String {
        let mut out = String::from(BEGIN_LINE);

        // Details first since they are unbounded
        if self.details.is_empty() {
            out.push_str("SPECIFIC DETAILS: None\n");
        } else {
            out.push_str("SPECIFIC DETAILS:\n");
            for line in &self.details {
                out.push('\t');
                out.push_str(line);
                out.push('\n');
            }
        }

        out.push_str(SEPARATOR);
        out.push_str("STACK TRACE:\n");
        out.push_str(trace);
        if !trace.ends_with('\n') {
            out.push('\n');
        }

        out.push_str(SEPARATOR);
        out.push_str(&format!("REASON: {}\n", self.reason));
        if let Some(kind) = self.kind {
            out.push_str(&format!("ERROR KIND: {kind}\n"));
        }
        match &self.cause {
            Some(cause) => out.push_str(&format!("INTERNAL ERROR OBJECT: {cause}\n")),
            None => out.push_str("INTERNAL ERROR OBJECT: None\n"),
        }

        out.push_str(HELP_TEXT);
        out.push_str(END_LINE);
        out
    }
}

impl fmt::Display for FatalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}: {}", self.reason, cause),
            None => write!(f, "{}", self.reason),
        }
    }
}

impl std::error::Error for FatalReport {}

/// Logs and prints `report`, returning the exit code the process must halt with
///
/// The caller exits only after dropping its logging guard, so the `error!` event
/// reaches buffered file logs.
pub fn report_fatal(report: &FatalReport) -> i32 {
    tracing::error!(
        reason = %report.reason(),
        kind = report.kind().map(|k| k.as_str()).unwrap_or("unknown"),
        details = report.details().len(),
        "Sanitization aborted, printing error report"
    );
    eprintln!("{}", report.render());
    FATAL_EXIT_CODE
}
