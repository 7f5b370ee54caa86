use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_yaml::Value;
use tempfile::TempDir;
use tengine::ClusterRegistry;
use tengine::ExecutionConfig;
use tengine::ModuleContext;
use tengine::ModuleOutcome;
use tengine::ModuleRegistry;
use tengine::StepExecutor;
use tengine::SuiteRunner;
use tengine::TestModule;

pub const INVENTORY: &str = r#"
clusters:
  ceph-pri:
    nodes:
      - name: node1
        ip: 10.0.0.1
        roles: [installer, mon, mgr]
      - name: node5
        ip: 10.0.0.5
        roles: [rgw]
    services:
      shared.pri:
        daemon_id: shared.pri
        service_name: rgw.shared.pri
  ceph-sec:
    nodes:
      - name: node1
        ip: 10.1.0.1
        roles: [installer, mon]
      - name: node5
        ip: 10.1.0.5
        roles: [rgw]
    services:
      shared.sec:
        daemon_id: shared.sec
        service_name: rgw.shared.sec
"#;

/// Writes suite + inventory fixtures into a temp dir and returns their paths.
pub fn write_fixtures(suite_yaml: &str) -> (TempDir, PathBuf, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let suite_path = dir.path().join("suite.yaml");
    let inventory_path = dir.path().join("inventory.yaml");
    std::fs::write(&suite_path, suite_yaml).unwrap();
    std::fs::write(&inventory_path, INVENTORY).unwrap();
    (dir, suite_path, inventory_path)
}

pub fn registry_from_inventory(inventory_path: &std::path::Path) -> Arc<ClusterRegistry> {
    let registry = Arc::new(ClusterRegistry::new());
    registry.load_inventory(inventory_path).unwrap();
    registry
}

/// Records every dispatch (cluster name + resolved config) and fails when
/// the config carries `fail: true`.
pub struct CapturingModule {
    pub dispatches: Mutex<Vec<(String, Option<Value>)>>,
}

impl CapturingModule {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            dispatches: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl TestModule for CapturingModule {
    async fn execute(
        &self,
        ctx: ModuleContext,
    ) -> tengine::Result<ModuleOutcome> {
        self.dispatches
            .lock()
            .push((ctx.cluster.name.clone(), ctx.config.clone()));

        let fail = ctx
            .config
            .as_ref()
            .and_then(|c| c.get("fail"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if fail {
            Ok(ModuleOutcome::fail("scripted failure"))
        } else {
            Ok(ModuleOutcome::pass("ok"))
        }
    }
}

/// Module that blocks far beyond any reasonable step timeout.
pub struct HangingModule;

#[async_trait]
impl TestModule for HangingModule {
    async fn execute(
        &self,
        _ctx: ModuleContext,
    ) -> tengine::Result<ModuleOutcome> {
        tokio::time::sleep(Duration::from_secs(86_400)).await;
        Ok(ModuleOutcome::pass("unreachable"))
    }
}

pub fn runner_with_modules(
    registry: Arc<ClusterRegistry>,
    modules: Arc<ModuleRegistry>,
) -> SuiteRunner {
    let execution = ExecutionConfig {
        default_cluster: "ceph-pri".to_string(),
        default_timeout_secs: 60,
        parallel_dispatch: true,
    };
    let executor = StepExecutor::new(registry.clone(), modules, execution);
    SuiteRunner::new(executor, registry, "ceph-pri".to_string())
}
