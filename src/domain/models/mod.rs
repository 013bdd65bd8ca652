pub mod attempt;
pub mod config;
pub mod diagnosis;
pub mod launch;

pub use attempt::{AttemptLogs, AttemptOutcome, AttemptRecord, FailureReason};
pub use config::{
    ClientConfig, CommandConfig, Config, DiagnosisConfig, LoggingConfig, PrebuiltConfig,
    ProbesConfig, RuleConfig, SeedConfig, ServiceConfig, SupervisorConfig,
};
pub use diagnosis::{
    Diagnosis, DiagnosisRule, DiagnosisRules, Finding, AUTH_FAILURE, DOWNSTREAM_UNREACHABLE,
    NO_MATCH_MESSAGE, PORT_CONFLICT, UNCAUGHT_EXCEPTION,
};
pub use launch::{expand_args, LaunchPath, LaunchPlan, LaunchSpec};
