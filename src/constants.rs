//! # Constants
//!
//! Fixed values shared across the deployer: layout geometry, remote error markers
//! and REST path fragments.

/// Suffix of the error body NiFi returns while a component is still stopping.
pub const TRANSIENT_STATE_MARKER: &str = "Current state is STOPPING";

/// Alias NiFi accepts in place of the root process group id.
pub const ROOT_GROUP_ALIAS: &str = "root";

/// Separator used when a branch path is written on a single line (`root>group>sub`).
pub const BRANCH_SEPARATOR: char = '>';

/// Layout geometry used when placing new process groups.
///
/// NiFi does not expose rendered component sizes, so these are fixed.
pub mod layout {
    pub const ELEMENT_WIDTH: f64 = 500.0;
    pub const ELEMENT_HEIGHT: f64 = 350.0;
    pub const MAX_X: f64 = 5000.0;
}

/// REST path fragments relative to the `nifi-api` base URL.
pub mod api_paths {
    pub const ACCESS_TOKEN: &str = "access/token";
    pub const FLOW_PROCESS_GROUPS: &str = "flow/process-groups";
    pub const FLOW_TEMPLATES: &str = "flow/templates";
    pub const PROCESS_GROUPS: &str = "process-groups";
    pub const PROCESSORS: &str = "processors";
    pub const CONNECTIONS: &str = "connections";
    pub const TEMPLATES: &str = "templates";
}

/// Environment variables consulted by the configuration loader.
pub mod env_vars {
    pub const ENVIRONMENT: &str = "NIFI_DEPLOY_ENV";
    pub const URL: &str = "NIFI_DEPLOY_URL";
    pub const USERNAME: &str = "NIFI_DEPLOY_USERNAME";
    pub const PASSWORD: &str = "NIFI_DEPLOY_PASSWORD";
    pub const INTERVAL_MS: &str = "NIFI_DEPLOY_INTERVAL_MS";
    pub const TIMEOUT_MS: &str = "NIFI_DEPLOY_TIMEOUT_MS";
}
