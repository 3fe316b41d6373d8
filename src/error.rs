use thiserror::Error;

/// Failure taxonomy for the TA-PRM core, per the spec's failure model summary:
/// configuration errors, construction errors, and planning errors are all
/// surfaced unmodified to the caller.
#[derive(Debug, Error, PartialEq)]
pub enum TaPrmError {
    #[error("environment configuration is invalid: {0}")]
    EnvConfigError(String),

    #[error("roadmap construction could not place a single collision-free vertex")]
    GraphTooSparse,

    #[error("start vertex could not be connected to the roadmap")]
    StartUnreachable,

    #[error("goal vertex could not be connected to the roadmap")]
    GoalUnreachable,

    #[error("no path to the goal exists within the query horizon")]
    NoPathInHorizon,

    #[error("planning exceeded its wall-clock budget")]
    Timeout,
}
