//! Ephemeral remote sandboxes.
//!
//! - `provider`: the `SandboxProvider` trait and wire types
//! - `daytona`: REST implementation against the Daytona API
//! - `session`: scoped acquisition that always deletes the sandbox
//! - `script`: the create / clone / exec / delete script

pub mod daytona;
pub mod provider;
pub mod script;
pub mod session;

pub use daytona::DaytonaClient;
pub use provider::{
    CreateSandboxParams, ExecuteRequest, ExecuteResponse, GitCloneRequest, SandboxInfo,
    SandboxProvider,
};
pub use script::{RepoSpec, SandboxScript, ScriptReport, Step, StepReport};
pub use session::{Sandbox, with_sandbox};
