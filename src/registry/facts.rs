use std::collections::HashMap;
use std::collections::HashSet;
use std::net::IpAddr;

use serde::Deserialize;
use serde::Serialize;

/// Role labels a node can carry. A node usually carries several
/// (e.g. an installer node that also runs mon and mgr daemons).
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Mon,
    Mgr,
    Osd,
    Mds,
    Rgw,
    Nfs,
    Client,
    Installer,
    Grafana,
    IscsiGw,
    /// Generic entity with no daemon attached
    Pool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Mon => "mon",
            Role::Mgr => "mgr",
            Role::Osd => "osd",
            Role::Mds => "mds",
            Role::Rgw => "rgw",
            Role::Nfs => "nfs",
            Role::Client => "client",
            Role::Installer => "installer",
            Role::Grafana => "grafana",
            Role::IscsiGw => "iscsi-gw",
            Role::Pool => "pool",
        }
    }
}

/// Live facts about a single cluster node.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NodeFacts {
    /// Short node name used by `{node_ip:...}` selectors, e.g. `node5`
    pub name: String,

    pub ip: IpAddr,

    #[serde(default)]
    pub roles: HashSet<Role>,
}

impl NodeFacts {
    pub fn has_role(
        &self,
        role: Role,
    ) -> bool {
        self.roles.contains(&role)
    }
}

/// Daemon/service naming metadata, keyed by service key (e.g. `shared.pri`).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ServiceFacts {
    /// e.g. `shared.pri`
    pub daemon_id: String,
    /// e.g. `rgw.shared.pri`
    pub service_name: String,
}

/// Consistent snapshot of one named cluster.
///
/// Snapshots are immutable once published to the registry; topology changes
/// produce a new snapshot that replaces the old one atomically.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClusterFacts {
    pub name: String,
    pub nodes: Vec<NodeFacts>,
    #[serde(default)]
    pub services: HashMap<String, ServiceFacts>,
}

impl ClusterFacts {
    pub fn new(
        name: impl Into<String>,
        nodes: Vec<NodeFacts>,
    ) -> Self {
        Self {
            name: name.into(),
            nodes,
            services: HashMap::new(),
        }
    }

    pub fn node(
        &self,
        name: &str,
    ) -> Option<&NodeFacts> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Get node(s) by role. Returns all nodes if role is not defined
    pub fn nodes_with_role(
        &self,
        role: Option<Role>,
    ) -> Vec<&NodeFacts> {
        match role {
            Some(role) => self.nodes.iter().filter(|n| n.has_role(role)).collect(),
            None => self.nodes.iter().collect(),
        }
    }

    pub fn first_node_with_role(
        &self,
        role: Role,
    ) -> Option<&NodeFacts> {
        self.nodes.iter().find(|n| n.has_role(role))
    }

    pub fn service(
        &self,
        key: &str,
    ) -> Option<&ServiceFacts> {
        self.services.get(key)
    }

    /// Produces the snapshot resulting from applying `delta` to `self`.
    /// Additions replace same-named entries; removals are applied last.
    pub fn with_delta(
        &self,
        delta: &TopologyDelta,
    ) -> Self {
        let mut next = self.clone();

        for node in &delta.added_nodes {
            next.nodes.retain(|n| n.name != node.name);
            next.nodes.push(node.clone());
        }
        next.nodes.retain(|n| !delta.removed_nodes.contains(&n.name));

        for (key, service) in &delta.services {
            next.services.insert(key.clone(), service.clone());
        }
        for key in &delta.removed_services {
            next.services.remove(key);
        }

        next
    }
}

/// Topology mutation reported by a module after a step that adds or removes
/// roles/services (e.g. RGW realm setup registering `rgw.shared.pri`).
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct TopologyDelta {
    #[serde(default)]
    pub added_nodes: Vec<NodeFacts>,

    #[serde(default)]
    pub removed_nodes: Vec<String>,

    /// Service entries to add or replace, keyed by service key
    #[serde(default)]
    pub services: HashMap<String, ServiceFacts>,

    #[serde(default)]
    pub removed_services: Vec<String>,
}

impl TopologyDelta {
    pub fn is_empty(&self) -> bool {
        self.added_nodes.is_empty()
            && self.removed_nodes.is_empty()
            && self.services.is_empty()
            && self.removed_services.is_empty()
    }
}
