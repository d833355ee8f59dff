//! Run many specs at once against one shared server.
//!
//! Every spec registers its own users and workspaces, so running them side by
//! side checks that concurrent tenants never see each other's data.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinSet;

use crate::client::TestContext;
use crate::specs;

/// Outcome of one spec.
pub struct SpecOutcome {
    pub module: &'static str,
    pub name: &'static str,
    pub elapsed: Duration,
    pub error: Option<String>,
}

impl SpecOutcome {
    pub fn passed(&self) -> bool {
        self.error.is_none()
    }
}

/// Pass/fail counts for one spec module.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ModuleTally {
    pub passed: usize,
    pub failed: usize,
}

/// Everything a concurrent run produced, ordered by module then spec name.
pub struct SuiteReport {
    pub outcomes: Vec<SpecOutcome>,
    pub wall_time: Duration,
}

impl SuiteReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failures(&self) -> impl Iterator<Item = &SpecOutcome> {
        self.outcomes.iter().filter(|o| !o.passed())
    }

    pub fn by_module(&self) -> BTreeMap<&'static str, ModuleTally> {
        let mut tallies: BTreeMap<&'static str, ModuleTally> = BTreeMap::new();
        for o in &self.outcomes {
            let t = tallies.entry(o.module).or_default();
            if o.passed() {
                t.passed += 1;
            } else {
                t.failed += 1;
            }
        }
        tallies
    }

    /// One line per module, then one line per failure.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for (module, t) in self.by_module() {
            let _ = writeln!(out, "{module}: {} passed, {} failed", t.passed, t.failed);
        }
        for o in self.failures() {
            let _ = writeln!(
                out,
                "FAIL {}::{} ({:?}): {}",
                o.module,
                o.name,
                o.elapsed,
                o.error.as_deref().unwrap_or("")
            );
        }
        let _ = write!(out, "{} specs in {:?}", self.total(), self.wall_time);
        out
    }
}

/// Spawn every spec whose module is listed in `modules` (all of them when the
/// list is empty) and wait for all of them.
pub async fn run_modules(ctx: Arc<TestContext>, modules: &[&str]) -> SuiteReport {
    let started = Instant::now();
    let mut set = JoinSet::new();

    macro_rules! spawn_spec {
        ($module:ident :: $name:ident) => {
            let module = stringify!($module);
            if modules.is_empty() || modules.contains(&module) {
                let ctx = Arc::clone(&ctx);
                set.spawn(async move {
                    let t0 = Instant::now();
                    let result = specs::$module::$name(&ctx).await;
                    SpecOutcome {
                        module,
                        name: stringify!($name),
                        elapsed: t0.elapsed(),
                        error: result.err().map(|e| format!("{e:#}")),
                    }
                });
            }
        };
    }

    crate::for_each_spec!(spawn_spec);

    let mut outcomes = Vec::with_capacity(set.len());
    while let Some(joined) = set.join_next().await {
        outcomes.push(joined.unwrap_or_else(|e| SpecOutcome {
            module: "runner",
            name: "join",
            elapsed: Duration::ZERO,
            error: Some(format!("spec task panicked or was cancelled: {e}")),
        }));
    }
    outcomes.sort_by_key(|o| (o.module, o.name));

    SuiteReport {
        outcomes,
        wall_time: started.elapsed(),
    }
}
