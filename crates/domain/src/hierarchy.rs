use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One catalog grant row: `granted_role` is granted to `granted_to_role`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGrant {
    /// The role whose privileges are inherited.
    pub granted_role: String,
    /// The role receiving the grant.
    pub granted_to_role: String,
    /// Grant creation time, when the catalog reports one.
    pub granted_at: Option<DateTime<Utc>>,
}

/// One hierarchy row: a role and the roles granted to it, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleHierarchyEntry {
    /// Role name.
    pub role: String,
    /// Roles granted to `role`, newest grant first.
    pub granted_roles: Vec<String>,
}

/// A single directed edge of the grant graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyEdge {
    /// The role holding the grants.
    pub parent: String,
    /// The granted role.
    pub child: String,
}

/// Placeholder plot coordinates for one role node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePosition {
    /// Role name.
    pub role: String,
    /// Horizontal slot, the role's position in the listing.
    pub x: usize,
    /// Vertical slot; all nodes share the baseline.
    pub y: usize,
}

/// The role-grant graph, rebuilt from the live catalog on every request.
///
/// Entries keep their insertion order, so projections are deterministic:
/// edges come out in entry-then-grant order. The catalog may contain cycles
/// or repeated grants; both are represented as-is. This is a view over the
/// catalog, not a structure the system reasons over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleHierarchy {
    entries: Vec<RoleHierarchyEntry>,
}

impl RoleHierarchy {
    /// Builds a hierarchy from ordered entries.
    #[must_use]
    pub fn from_entries(entries: Vec<RoleHierarchyEntry>) -> Self {
        Self { entries }
    }

    /// Returns the ordered entries.
    #[must_use]
    pub fn entries(&self) -> &[RoleHierarchyEntry] {
        self.entries.as_slice()
    }

    /// Returns true when no roles were observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of role nodes.
    #[must_use]
    pub fn role_count(&self) -> usize {
        self.entries.len()
    }

    /// Flattens the hierarchy into one row per grant, in entry-then-grant
    /// order. Duplicate grants in the source produce duplicate edges.
    #[must_use]
    pub fn edges(&self) -> Vec<HierarchyEdge> {
        self.entries
            .iter()
            .flat_map(|entry| {
                entry.granted_roles.iter().map(|granted| HierarchyEdge {
                    parent: entry.role.clone(),
                    child: granted.clone(),
                })
            })
            .collect()
    }

    /// Assigns each role a slot derived from its listing index.
    ///
    /// Naive layout: positions distinguish nodes and nothing more. Edges
    /// drawn between index-derived coordinates can overlap unrelated nodes;
    /// depth in the grant graph is not encoded.
    #[must_use]
    pub fn layout(&self) -> Vec<NodePosition> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| NodePosition {
                role: entry.role.clone(),
                x: index,
                y: 0,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{HierarchyEdge, RoleHierarchy, RoleHierarchyEntry};

    fn hierarchy(entries: &[(&str, &[&str])]) -> RoleHierarchy {
        RoleHierarchy::from_entries(
            entries
                .iter()
                .map(|(role, granted)| RoleHierarchyEntry {
                    role: (*role).to_owned(),
                    granted_roles: granted.iter().map(|name| (*name).to_owned()).collect(),
                })
                .collect(),
        )
    }

    #[test]
    fn empty_role_set_yields_empty_hierarchy() {
        let empty = RoleHierarchy::default();
        assert!(empty.is_empty());
        assert!(empty.edges().is_empty());
        assert!(empty.layout().is_empty());
    }

    #[test]
    fn grant_less_roles_yield_no_edges() {
        let graph = hierarchy(&[("A", &[]), ("B", &[])]);
        assert_eq!(graph.role_count(), 2);
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn edges_follow_entry_then_grant_order() {
        let graph = hierarchy(&[("SYSADMIN", &["ETL_TR", "BI_FR"]), ("ETL_TR", &["LOADER_TR"])]);

        assert_eq!(
            graph.edges(),
            vec![
                HierarchyEdge {
                    parent: "SYSADMIN".to_owned(),
                    child: "ETL_TR".to_owned(),
                },
                HierarchyEdge {
                    parent: "SYSADMIN".to_owned(),
                    child: "BI_FR".to_owned(),
                },
                HierarchyEdge {
                    parent: "ETL_TR".to_owned(),
                    child: "LOADER_TR".to_owned(),
                },
            ]
        );
    }

    #[test]
    fn duplicate_grants_produce_duplicate_edges() {
        let graph = hierarchy(&[("A", &["B", "B"])]);
        assert_eq!(graph.edges().len(), 2);
    }

    #[test]
    fn cyclic_grants_project_both_edges() {
        let graph = hierarchy(&[("A", &["B"]), ("B", &["A"])]);

        let edges = graph.edges();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].parent, "A");
        assert_eq!(edges[1].parent, "B");
    }

    #[test]
    fn layout_slots_follow_listing_order() {
        let graph = hierarchy(&[("A", &[]), ("B", &["A"]), ("C", &[])]);

        let positions = graph.layout();
        assert_eq!(positions.len(), 3);
        assert_eq!(positions[1].role, "B");
        assert_eq!(positions[1].x, 1);
        assert!(positions.iter().all(|position| position.y == 0));
    }

    proptest! {
        #[test]
        fn edge_count_equals_total_grant_count(
            entries in proptest::collection::vec(
                ("[A-Z]{1,8}", proptest::collection::vec("[A-Z]{1,8}", 0..6)),
                0..12,
            )
        ) {
            let graph = RoleHierarchy::from_entries(
                entries
                    .iter()
                    .map(|(role, granted)| RoleHierarchyEntry {
                        role: role.clone(),
                        granted_roles: granted.clone(),
                    })
                    .collect(),
            );

            let expected: usize = entries.iter().map(|(_, granted)| granted.len()).sum();
            prop_assert_eq!(graph.edges().len(), expected);
        }

        #[test]
        fn edges_preserve_source_order(
            entries in proptest::collection::vec(
                ("[A-Z]{1,8}", proptest::collection::vec("[A-Z]{1,8}", 0..6)),
                0..12,
            )
        ) {
            let graph = RoleHierarchy::from_entries(
                entries
                    .iter()
                    .map(|(role, granted)| RoleHierarchyEntry {
                        role: role.clone(),
                        granted_roles: granted.clone(),
                    })
                    .collect(),
            );

            let flattened: Vec<(String, String)> = entries
                .iter()
                .flat_map(|(role, granted)| {
                    granted.iter().map(|child| (role.clone(), child.clone()))
                })
                .collect();
            let projected: Vec<(String, String)> = graph
                .edges()
                .into_iter()
                .map(|edge| (edge.parent, edge.child))
                .collect();

            prop_assert_eq!(projected, flattened);
        }
    }
}
