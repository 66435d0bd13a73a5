//! Tier role synchronization
//!
//! A participant holds at most one tier role: the one mapped to the highest
//! threshold not above their level. Below every threshold they hold none.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::domain::RoleId;

/// Roles to add and remove so the participant holds exactly the right tier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleDelta {
    pub add: Option<RoleId>,
    pub remove: BTreeSet<RoleId>,
}

impl RoleDelta {
    pub fn is_empty(&self) -> bool {
        self.add.is_none() && self.remove.is_empty()
    }

    /// The role set after applying this delta
    pub fn apply_to(&self, roles: &HashSet<RoleId>) -> HashSet<RoleId> {
        let mut result: HashSet<RoleId> = roles
            .iter()
            .filter(|role| !self.remove.contains(*role))
            .copied()
            .collect();
        result.extend(self.add);
        result
    }
}

/// Tier role a participant at `level` should hold, if any
pub fn tier_role(thresholds: &BTreeMap<u32, RoleId>, level: u32) -> Option<RoleId> {
    thresholds
        .range(..=level)
        .next_back()
        .map(|(_, role)| *role)
}

/// Compute the minimal change between held roles and the target tier role
pub fn diff(thresholds: &BTreeMap<u32, RoleId>, current: &HashSet<RoleId>, level: u32) -> RoleDelta {
    let target = tier_role(thresholds, level);

    let add = target.filter(|role| !current.contains(role));
    let remove = current
        .iter()
        .filter(|role| Some(**role) != target && thresholds.values().any(|tier| tier == *role))
        .copied()
        .collect();

    RoleDelta { add, remove }
}
