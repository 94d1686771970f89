//! VM configuration types and launch-time validation.
//!
//! A [`VmConfig`] accumulates settings field by field while its context
//! handle is open. At launch the engine calls [`VmConfig::resolve`], which
//! materializes defaults and produces a fully-resolved [`LaunchRequest`]
//! for the hypervisor backend. Until then every field may be rewritten
//! (last write wins).

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Maximum number of vCPUs a guest may be configured with.
pub const MAX_VCPUS: u8 = 32;

/// Maximum guest RAM in MiB (1 TiB).
pub const MAX_RAM_MIB: u32 = 1024 * 1024;

/// Default vCPU count when resources were never configured.
pub const DEFAULT_VCPUS: u8 = 1;

/// Default guest RAM in MiB when resources were never configured.
pub const DEFAULT_RAM_MIB: u32 = 512;

/// Guest resource sizing (vCPUs and RAM).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmResources {
    /// Number of vCPUs.
    pub vcpus: u8,

    /// RAM in MiB.
    pub ram_mib: u32,
}

impl Default for VmResources {
    fn default() -> Self {
        Self {
            vcpus: DEFAULT_VCPUS,
            ram_mib: DEFAULT_RAM_MIB,
        }
    }
}

impl VmResources {
    /// Validate against host limits.
    ///
    /// Zero values and values above [`MAX_VCPUS`] / [`MAX_RAM_MIB`] are
    /// rejected with `InvalidArgument`.
    pub fn validate(&self) -> Result<()> {
        if self.vcpus == 0 || self.vcpus > MAX_VCPUS {
            return Err(Error::invalid_argument(format!(
                "vcpu count must be in 1..={}, got {}",
                MAX_VCPUS, self.vcpus
            )));
        }
        if self.ram_mib == 0 || self.ram_mib > MAX_RAM_MIB {
            return Err(Error::invalid_argument(format!(
                "ram must be in 1..={} MiB, got {}",
                MAX_RAM_MIB, self.ram_mib
            )));
        }
        Ok(())
    }
}

/// Environment the guest entrypoint runs with.
///
/// `Inherit` is the "use host environment" sentinel and is distinct from
/// an explicitly empty list. It resolves to a snapshot of the host
/// environment taken at *launch* time, not at `set_exec` time, so changes
/// made between configuration and launch are honored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GuestEnv {
    /// Snapshot the host environment when the launch is validated.
    #[default]
    Inherit,

    /// Use exactly these `KEY=VALUE` entries.
    Explicit {
        /// Environment entries, passed through verbatim.
        vars: Vec<String>,
    },
}

impl GuestEnv {
    /// Materialize the environment list for the guest.
    fn resolve(self) -> Vec<String> {
        match self {
            GuestEnv::Inherit => std::env::vars()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect(),
            GuestEnv::Explicit { vars } => vars,
        }
    }
}

/// Accumulated configuration for one VM context.
///
/// A fresh config has nothing set; `root_path` and `exec_path` are
/// required before launch, resources fall back to documented defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VmConfig {
    /// Guest sizing; `None` means "use defaults at launch".
    pub(crate) resources: Option<VmResources>,

    /// Host path serving as the guest root filesystem.
    pub(crate) root_path: Option<PathBuf>,

    /// Guest entrypoint, relative to `root_path`.
    pub(crate) exec_path: Option<PathBuf>,

    /// Arguments for the entrypoint. Empty means "just argv[0]".
    pub(crate) argv: Vec<String>,

    /// Guest environment policy.
    pub(crate) env: GuestEnv,
}

impl VmConfig {
    /// Set vCPU count and RAM size, overwriting any prior values.
    pub fn set_resources(&mut self, vcpus: u8, ram_mib: u32) -> Result<()> {
        let resources = VmResources { vcpus, ram_mib };
        resources.validate()?;
        self.resources = Some(resources);
        Ok(())
    }

    /// Set the host path to use as the guest root.
    ///
    /// No filesystem check happens here; root readability is the
    /// backend's concern when it binds the root at launch.
    pub fn set_root(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::invalid_argument("root path must not be empty"));
        }
        self.root_path = Some(path.to_path_buf());
        Ok(())
    }

    /// Set the guest entrypoint, its arguments, and its environment.
    ///
    /// `argv` is stored verbatim and may be empty. `env = GuestEnv::Inherit`
    /// defers the host-environment snapshot to launch time.
    pub fn set_exec(
        &mut self,
        exec_path: impl AsRef<Path>,
        argv: Vec<String>,
        env: GuestEnv,
    ) -> Result<()> {
        let exec_path = exec_path.as_ref();
        if exec_path.as_os_str().is_empty() {
            return Err(Error::invalid_argument("exec path must not be empty"));
        }
        self.exec_path = Some(exec_path.to_path_buf());
        self.argv = argv;
        self.env = env;
        Ok(())
    }

    /// Validate and resolve this configuration into a [`LaunchRequest`].
    ///
    /// Checks fail fast in order: root set, exec set, resources within
    /// host limits. Unset resources fall back to [`DEFAULT_VCPUS`] /
    /// [`DEFAULT_RAM_MIB`]. The environment snapshot (for
    /// [`GuestEnv::Inherit`]) is taken here, i.e. at launch time.
    pub fn resolve(self) -> Result<LaunchRequest> {
        let root = self
            .root_path
            .ok_or(Error::ConfigIncomplete { field: "root_path" })?;
        let exec_path = self
            .exec_path
            .ok_or(Error::ConfigIncomplete { field: "exec_path" })?;

        let resources = self.resources.unwrap_or_default();
        resources.validate()?;

        let argv = if self.argv.is_empty() {
            vec![exec_path.to_string_lossy().into_owned()]
        } else {
            self.argv
        };

        Ok(LaunchRequest {
            resources,
            root,
            exec_path,
            argv,
            env: self.env.resolve(),
        })
    }
}

/// Fully-resolved launch parameters handed to the hypervisor backend.
///
/// All defaults are materialized and the environment is a concrete list;
/// nothing here is optional or lazy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchRequest {
    /// Guest sizing.
    pub resources: VmResources,

    /// Host path bound as the guest root.
    pub root: PathBuf,

    /// Entrypoint inside the guest root.
    pub exec_path: PathBuf,

    /// Argument vector, never empty (argv[0] defaults to the exec path).
    pub argv: Vec<String>,

    /// `KEY=VALUE` environment entries for the entrypoint.
    pub env: Vec<String>,
}
