//! External-command collaborators.
//!
//! Thin, stateless wrappers that build command lines for the executor and
//! shape its output. None of these hold lifecycle state; the interesting
//! coordination lives in the listeners and the orchestrator.

pub mod auth;
pub mod command;
pub mod docker;
pub mod logs;
pub mod system;

pub use auth::AuthService;
pub use command::{CommandReport, CommandService};
pub use docker::{ContainerSpec, DockerService};
pub use logs::LogService;
pub use system::{SystemService, SystemStatus};
