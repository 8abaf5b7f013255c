//! Capability bundle selected once per process.

use std::sync::Arc;

use hubless_core::EditorProfile;

use crate::lock::{FileLockInspector, LockGuard, LockInspector};
use crate::registry::{ProcessEnumerator, ProcessRegistry};
use crate::signal::{Activator, NativeActivator, NativeSignaller, ProcessSignaller};
use crate::terminate::{TerminationPolicy, Terminator};

/// Every OS-facing capability the orchestrator needs.
///
/// Tests build one from fakes with struct literal syntax; the binary uses
/// [`Platform::native`].
#[derive(Clone)]
pub struct Platform {
    pub profile: EditorProfile,
    pub enumerator: Arc<dyn ProcessEnumerator>,
    pub signaller: Arc<dyn ProcessSignaller>,
    pub activator: Arc<dyn Activator>,
    pub lock_inspector: Arc<dyn LockInspector>,
}

impl Platform {
    /// Implementations for the host OS.
    pub fn native(profile: EditorProfile) -> Self {
        Self {
            enumerator: native_enumerator(&profile),
            signaller: Arc::new(NativeSignaller),
            activator: Arc::new(NativeActivator),
            lock_inspector: Arc::new(FileLockInspector),
            profile,
        }
    }

    pub fn registry(&self) -> ProcessRegistry {
        ProcessRegistry::new(self.enumerator.clone(), self.profile)
    }

    pub fn lock_guard(&self) -> LockGuard {
        LockGuard::new(self.lock_inspector.clone(), self.profile)
    }

    pub fn terminator(&self, policy: TerminationPolicy) -> Terminator {
        Terminator::new(self.registry(), self.signaller.clone(), policy)
    }
}

#[cfg(unix)]
fn native_enumerator(_profile: &EditorProfile) -> Arc<dyn ProcessEnumerator> {
    Arc::new(crate::registry::PsEnumerator)
}

#[cfg(windows)]
fn native_enumerator(profile: &EditorProfile) -> Arc<dyn ProcessEnumerator> {
    Arc::new(crate::registry::CimEnumerator::new(profile))
}
