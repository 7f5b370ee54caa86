//! Live, queryable facts about each named cluster.
//!
//! The registry is the single shared resource of a suite run: every step
//! reads it through immutable snapshots, and topology-changing steps mutate
//! it through per-cluster atomic swaps. A reader never observes a
//! half-applied node list.

mod facts;
pub use facts::*;


use std::collections::HashMap;
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use dashmap::DashMap;
use serde::Deserialize;
use tracing::info;

use crate::ResolutionError;
use crate::Result;
use crate::SuiteError;

/// Tracks named clusters (`ceph-pri`, `ceph-sec`, ...) and their live
/// inventories for the duration of a suite run.
#[derive(Debug, Default)]
pub struct ClusterRegistry {
    clusters: DashMap<String, ArcSwap<ClusterFacts>>,
}

/// On-disk shape of a cluster inventory file:
/// `clusters.<name>.nodes[]` plus optional `clusters.<name>.services{}`.
#[derive(Debug, Deserialize)]
struct InventoryFile {
    clusters: HashMap<String, ClusterInventory>,
}

#[derive(Debug, Deserialize)]
struct ClusterInventory {
    nodes: Vec<NodeFacts>,
    #[serde(default)]
    services: HashMap<String, ServiceFacts>,
}

impl ClusterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a cluster's node inventory. Idempotent by cluster name.
    pub fn register(
        &self,
        cluster_name: &str,
        node_list: Vec<NodeFacts>,
    ) {
        self.register_facts(ClusterFacts::new(cluster_name, node_list));
    }

    /// Adds or replaces a cluster entry with full facts (nodes and services)
    pub fn register_facts(
        &self,
        facts: ClusterFacts,
    ) {
        let name = facts.name.clone();
        let facts = Arc::new(facts);
        match self.clusters.get(&name) {
            Some(entry) => entry.store(facts),
            None => {
                self.clusters.insert(name, ArcSwap::new(facts));
            }
        }
    }

    /// Removes a cluster entry. Returns false when the name was not registered.
    pub fn deregister(
        &self,
        cluster_name: &str,
    ) -> bool {
        self.clusters.remove(cluster_name).is_some()
    }

    pub fn contains(
        &self,
        cluster_name: &str,
    ) -> bool {
        self.clusters.contains_key(cluster_name)
    }

    pub fn cluster_names(&self) -> Vec<String> {
        self.clusters.iter().map(|e| e.key().clone()).collect()
    }

    /// Consistent point-in-time view of one cluster. The snapshot stays
    /// valid for the caller even if a concurrent step swaps in a newer one.
    pub fn snapshot(
        &self,
        cluster_name: &str,
    ) -> Result<Arc<ClusterFacts>> {
        let entry = self
            .clusters
            .get(cluster_name)
            .ok_or_else(|| ResolutionError::UnknownCluster(cluster_name.to_string()))?;
        Ok(entry.load_full())
    }

    pub fn lookup_node_ip(
        &self,
        cluster_name: &str,
        node_selector: &str,
    ) -> Result<IpAddr> {
        let facts = self.snapshot(cluster_name)?;
        let node = facts
            .node(node_selector)
            .ok_or_else(|| ResolutionError::UnknownNode {
                cluster: cluster_name.to_string(),
                node: node_selector.to_string(),
            })?;
        Ok(node.ip)
    }

    pub fn lookup_daemon_id(
        &self,
        cluster_name: &str,
        service_key: &str,
    ) -> Result<String> {
        Ok(self.lookup_service(cluster_name, service_key)?.daemon_id)
    }

    pub fn lookup_service_name(
        &self,
        cluster_name: &str,
        service_key: &str,
    ) -> Result<String> {
        Ok(self.lookup_service(cluster_name, service_key)?.service_name)
    }

    fn lookup_service(
        &self,
        cluster_name: &str,
        service_key: &str,
    ) -> Result<ServiceFacts> {
        let facts = self.snapshot(cluster_name)?;
        let service = facts
            .service(service_key)
            .ok_or_else(|| ResolutionError::UnknownService {
                cluster: cluster_name.to_string(),
                key: service_key.to_string(),
            })?;
        Ok(service.clone())
    }

    /// Applies a topology delta to a single cluster entry atomically.
    /// In-flight readers keep their old snapshot; new readers observe the
    /// fully applied delta.
    pub fn update_topology(
        &self,
        cluster_name: &str,
        delta: &TopologyDelta,
    ) -> Result<()> {
        let entry = self
            .clusters
            .get(cluster_name)
            .ok_or_else(|| ResolutionError::UnknownCluster(cluster_name.to_string()))?;
        entry.rcu(|facts| facts.with_delta(delta));
        Ok(())
    }

    /// Registers every cluster declared in a YAML inventory file
    pub fn load_inventory(
        &self,
        path: &Path,
    ) -> Result<usize> {
        let raw = std::fs::read_to_string(path).map_err(|e| SuiteError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let inventory: InventoryFile =
            serde_yaml::from_str(&raw).map_err(|e| SuiteError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?;

        let count = inventory.clusters.len();
        for (name, cluster) in inventory.clusters {
            info!("registering cluster {} ({} nodes)", name, cluster.nodes.len());
            self.register_facts(ClusterFacts {
                name,
                nodes: cluster.nodes,
                services: cluster.services,
            });
        }
        Ok(count)
    }
}
