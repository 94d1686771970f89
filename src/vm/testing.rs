//! Test doubles for the backend seam.

use crate::error::{Error, Result};
use crate::vm::config::LaunchRequest;
use crate::vm::VmBackend;
use parking_lot::Mutex;
use std::path::Path;

/// Serializes tests that mutate the process environment against the
/// launch-time environment snapshot.
pub(crate) static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Stage at which a [`TestBackend`] injects a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailPoint {
    Allocate,
    BindRoot,
    StartGuest,
    Wait,
}

/// Recording backend: captures what the engine asked for and returns a
/// fixed guest exit code, optionally failing at one stage.
pub(crate) struct TestBackend {
    pub allocations: Mutex<Vec<(u8, u32)>>,
    pub bound_roots: Mutex<Vec<std::path::PathBuf>>,
    pub started: Mutex<Vec<LaunchRequest>>,
    pub exit_code: i32,
    pub fail: Option<FailPoint>,
}

impl TestBackend {
    pub(crate) fn new(exit_code: i32) -> Self {
        Self {
            allocations: Mutex::new(Vec::new()),
            bound_roots: Mutex::new(Vec::new()),
            started: Mutex::new(Vec::new()),
            exit_code,
            fail: None,
        }
    }

    pub(crate) fn failing(fail: FailPoint) -> Self {
        Self {
            fail: Some(fail),
            ..Self::new(0)
        }
    }
}

impl VmBackend for TestBackend {
    fn name(&self) -> &'static str {
        "test"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn allocate(&self, vcpus: u8, ram_mib: u32) -> Result<()> {
        if self.fail == Some(FailPoint::Allocate) {
            return Err(Error::backend("vcpu/memory allocation refused"));
        }
        self.allocations.lock().push((vcpus, ram_mib));
        Ok(())
    }

    fn bind_root(&self, root: &Path) -> Result<()> {
        if self.fail == Some(FailPoint::BindRoot) {
            return Err(Error::backend(format!(
                "root not readable: {}",
                root.display()
            )));
        }
        self.bound_roots.lock().push(root.to_path_buf());
        Ok(())
    }

    fn start_guest(&self, request: &LaunchRequest) -> Result<()> {
        if self.fail == Some(FailPoint::StartGuest) {
            return Err(Error::backend("guest entrypoint load failed"));
        }
        self.started.lock().push(request.clone());
        Ok(())
    }

    fn wait_shutdown(&self) -> Result<i32> {
        if self.fail == Some(FailPoint::Wait) {
            return Err(Error::backend("guest connection lost"));
        }
        Ok(self.exit_code)
    }
}
