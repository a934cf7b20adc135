//! System tests built on the two-phase compare orchestrator.
//!
//! A comparison test supplies its behaviour through [`CompareTwoTest`]:
//!
//! - `run_common_setup`: called before BOTH runs, ahead of the run-specific
//!   setup. Holds settings both runs need (e.g. CONTINUE_RUN = false). Running
//!   it twice keeps each run independent of whatever the other left behind.
//! - `run_one_setup` / `run_two_setup`: run-specific settings. Staging of
//!   saved layouts, build records and executables is done by the orchestrator.
//! - `pre_build`: optional, called once per `build()` call before any build
//!   pass. May be called again on rebuilds, so it must be idempotent.
//!
//! Hooks that are only needed under certain flags are optional capabilities:
//!
//! - [`PeLayoutHooks`] when `runs_have_different_pe_settings`
//! - [`TwoBuildHooks`] when either two-build flag is set
//!
//! The orchestrator refuses to construct a test whose flags demand a
//! capability the test does not provide.

pub mod ers;
pub mod lii;
pub mod rep;
pub mod user_nl;

use crate::case::Case;
use crate::error::HookError;

pub use ers::Ers;
pub use lii::Lii;
pub use rep::Rep;

/// Trait implemented by every two-phase comparison test
pub trait CompareTwoTest {
    fn run_common_setup(&mut self, case: &mut dyn Case) -> Result<(), HookError>;

    fn run_one_setup(&mut self, case: &mut dyn Case) -> Result<(), HookError>;

    fn run_two_setup(&mut self, case: &mut dyn Case) -> Result<(), HookError>;

    fn pre_build(&mut self, _case: &mut dyn Case) -> Result<(), HookError> {
        Ok(())
    }

    /// Layout adjustment hooks, for tests whose runs use different PE layouts.
    fn pe_layouts(&mut self) -> Option<&mut dyn PeLayoutHooks> {
        None
    }

    /// Build setup hooks, for tests that build twice.
    fn two_builds(&mut self) -> Option<&mut dyn TwoBuildHooks> {
        None
    }
}

/// Per-run processor layout adjustments
///
/// Each hook is called at most once per layout snapshot: the orchestrator
/// flushes the case and saves the layout right after it returns.
pub trait PeLayoutHooks {
    fn adjust_pes_for_run_one(&mut self, case: &mut dyn Case) -> Result<(), HookError>;
    fn adjust_pes_for_run_two(&mut self, case: &mut dyn Case) -> Result<(), HookError>;
}

/// Setup immediately before each of the two builds
///
/// With two builds for the shared libraries only, these run before each
/// sharedlib build but NOT before the common model build.
pub trait TwoBuildHooks {
    fn build_one_setup(&mut self, case: &mut dyn Case) -> Result<(), HookError>;
    fn build_two_setup(&mut self, case: &mut dyn Case) -> Result<(), HookError>;
}

/// Names accepted by [`by_name`].
pub const TEST_NAMES: [&str; 3] = ["ers", "rep", "lii"];

/// Construct one of the bundled tests by name, reading what it needs from the case.
pub fn by_name(
    name: &str,
    case: &dyn Case,
) -> Option<crate::Result<(Box<dyn CompareTwoTest>, crate::config::CompareTwoSettings)>> {
    let built = match name.to_ascii_lowercase().as_str() {
        "ers" => Ers::new(case).map(|t| {
            let settings = Ers::settings();
            (Box::new(t) as Box<dyn CompareTwoTest>, settings)
        }),
        "rep" => Ok((Box::new(Rep) as Box<dyn CompareTwoTest>, Rep::settings())),
        "lii" => Ok((Box::new(Lii) as Box<dyn CompareTwoTest>, Lii::settings())),
        _ => return None,
    };
    Some(built)
}

impl<T: CompareTwoTest + ?Sized> CompareTwoTest for Box<T> {
    fn run_common_setup(&mut self, case: &mut dyn Case) -> Result<(), HookError> {
        (**self).run_common_setup(case)
    }

    fn run_one_setup(&mut self, case: &mut dyn Case) -> Result<(), HookError> {
        (**self).run_one_setup(case)
    }

    fn run_two_setup(&mut self, case: &mut dyn Case) -> Result<(), HookError> {
        (**self).run_two_setup(case)
    }

    fn pre_build(&mut self, case: &mut dyn Case) -> Result<(), HookError> {
        (**self).pre_build(case)
    }

    fn pe_layouts(&mut self) -> Option<&mut dyn PeLayoutHooks> {
        (**self).pe_layouts()
    }

    fn two_builds(&mut self) -> Option<&mut dyn TwoBuildHooks> {
        (**self).two_builds()
    }
}
