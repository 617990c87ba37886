#![deny(missing_docs)]
//! Pulse core library.
//!
//! This crate contains the snapshot types, the project health analyzer, the
//! duplicate/dependency candidate extractor, and the analysis prompt
//! contracts that power the Pulse CLI. Everything here is pure and
//! synchronous; fetching and rendering to the terminal live in the CLI crate.

pub mod analysis;
pub mod candidates;
pub mod domain;
pub mod error;
pub mod health;
pub mod render;

pub use analysis::{
    ANALYST_PROMPT, DEPENDENCY_PROMPT, DUPLICATE_PROMPT, DependencyAnalysis, DuplicateAnalysis,
    analysis_payload, parse_dependency_analysis, parse_duplicate_analysis,
};
pub use candidates::{
    DependencyCandidate, DuplicateCandidate, ProjectIssues, dependency_candidates,
    duplicate_candidates,
};
pub use domain::{
    CommentSnapshot, CycleSnapshot, InitiativeSnapshot, IssueSnapshot, MemberSnapshot,
    ProjectSnapshot, StateType, TeamSnapshot, priority_label,
};
pub use error::{PulseError, Result};
pub use health::{
    CycleStats, HealthMetrics, HealthReport, RiskEntry, RiskSeverity, RiskType,
    analyze_project_health, cycle_stats,
};
pub use render::render_json;
