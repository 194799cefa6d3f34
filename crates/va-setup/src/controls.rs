//! Control-surface groups.
//!
//! Groups are owned by [`ControlGroupTable`] under stable ids. A single
//! assignment map from member key to group id keeps every subsurface copy in
//! at most one group.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};
use va_core::GroupId;
use va_project::{ControlGroupDef, ControlMemberDef, SubSurfaceDef};

use crate::{SetupError, SetupResult};

pub const DEFAULT_GROUP_NAME: &str = "Unnamed Control Group";

/// Identity of one subsurface copy: parent geometry, subsurface and
/// symmetry reflection index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberKey {
    pub parent_geom_id: String,
    pub ss_id: String,
    pub reflect: u32,
}

impl MemberKey {
    pub fn new(parent_geom_id: impl Into<String>, ss_id: impl Into<String>, reflect: u32) -> Self {
        Self {
            parent_geom_id: parent_geom_id.into(),
            ss_id: ss_id.into(),
            reflect,
        }
    }
}

/// A control subsurface copy available for grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlSurface {
    pub key: MemberKey,
    /// `<geom>_Surf<reflect>_<subsurface>`
    pub full_name: String,
    pub geom_name: String,
    pub ss_name: String,
}

impl ControlSurface {
    pub fn new(def: &SubSurfaceDef, reflect: u32) -> Self {
        Self {
            key: MemberKey::new(&def.geom_id, &def.ss_id, reflect),
            full_name: format!("{}_Surf{}_{}", def.geom_name, reflect, def.ss_name),
            geom_name: def.geom_name.clone(),
            ss_name: def.ss_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlMember {
    pub key: MemberKey,
    pub full_name: String,
    /// Deflection gain for mixing within the group.
    pub gain: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlGroup {
    pub name: String,
    pub parent_geom_base: Option<String>,
    pub used: bool,
    pub deflection: f64,
    members: Vec<ControlMember>,
}

impl ControlGroup {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent_geom_base: None,
            used: true,
            deflection: 0.0,
            members: Vec::new(),
        }
    }

    pub fn members(&self) -> &[ControlMember] {
        &self.members
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn set_gain(&mut self, index: usize, gain: f64) -> SetupResult<()> {
        let len = self.members.len();
        let member = self
            .members
            .get_mut(index)
            .ok_or(SetupError::IndexOutOfRange {
                what: "control group member",
                index,
                len,
            })?;
        member.gain = gain;
        Ok(())
    }

    /// Written to the setup file only when used and non-empty.
    pub fn is_active(&self) -> bool {
        self.used && !self.members.is_empty()
    }

    fn remove(&mut self, key: &MemberKey) -> bool {
        let before = self.members.len();
        self.members.retain(|m| &m.key != key);
        self.members.len() != before
    }
}

#[derive(Debug, Clone)]
pub struct ControlGroupTable {
    groups: BTreeMap<GroupId, ControlGroup>,
    order: Vec<GroupId>,
    assignment: HashMap<MemberKey, GroupId>,
    complete: Vec<ControlSurface>,
    current: Option<GroupId>,
    next_id: GroupId,
}

impl Default for ControlGroupTable {
    fn default() -> Self {
        Self {
            groups: BTreeMap::new(),
            order: Vec::new(),
            assignment: HashMap::new(),
            complete: Vec::new(),
            current: None,
            next_id: GroupId::from_index(0),
        }
    }
}

impl ControlGroupTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from saved definitions. Members already claimed by an earlier
    /// group are dropped with a warning.
    pub fn from_defs(defs: &[ControlGroupDef]) -> Self {
        let mut table = Self::new();
        for def in defs {
            let id = table.insert_group(ControlGroup {
                name: def.name.clone(),
                parent_geom_base: def.parent_geom_base.clone(),
                used: def.used,
                deflection: def.deflection,
                members: Vec::new(),
            });
            for m in &def.members {
                let member = ControlMember {
                    key: MemberKey::new(&m.parent_geom_id, &m.ss_id, m.reflect),
                    full_name: m.full_name.clone(),
                    gain: m.gain,
                };
                if !table.attach(id, member) {
                    warn!(group = %def.name, ss_id = %m.ss_id, reflect = m.reflect, "subsurface already grouped; skipped");
                }
            }
        }
        table.current = table.order.first().copied();
        table
    }

    pub fn to_defs(&self) -> Vec<ControlGroupDef> {
        self.iter()
            .map(|(_, g)| ControlGroupDef {
                name: g.name.clone(),
                parent_geom_base: g.parent_geom_base.clone(),
                members: g
                    .members
                    .iter()
                    .map(|m| ControlMemberDef {
                        parent_geom_id: m.key.parent_geom_id.clone(),
                        ss_id: m.key.ss_id.clone(),
                        reflect: m.key.reflect,
                        full_name: m.full_name.clone(),
                        gain: m.gain,
                    })
                    .collect(),
                used: g.used,
                deflection: g.deflection,
            })
            .collect()
    }

    fn insert_group(&mut self, group: ControlGroup) -> GroupId {
        let id = self.next_id;
        self.next_id = id.next();
        self.groups.insert(id, group);
        self.order.push(id);
        id
    }

    /// Add a member to a group unless it already belongs to one.
    fn attach(&mut self, id: GroupId, member: ControlMember) -> bool {
        if self.assignment.contains_key(&member.key) {
            return false;
        }
        let Some(group) = self.groups.get_mut(&id) else {
            return false;
        };
        self.assignment.insert(member.key.clone(), id);
        group.members.push(member);
        true
    }

    fn detach(&mut self, id: GroupId, key: &MemberKey) -> bool {
        let removed = self
            .groups
            .get_mut(&id)
            .is_some_and(|group| group.remove(key));
        if removed {
            self.assignment.remove(key);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Groups in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (GroupId, &ControlGroup)> {
        self.order
            .iter()
            .filter_map(|id| self.groups.get(id).map(|g| (*id, g)))
    }

    pub fn get(&self, id: GroupId) -> Option<&ControlGroup> {
        self.groups.get(&id)
    }

    pub fn get_mut(&mut self, id: GroupId) -> Option<&mut ControlGroup> {
        self.groups.get_mut(&id)
    }

    /// Group at a display position.
    pub fn id_at(&self, index: usize) -> Option<GroupId> {
        self.order.get(index).copied()
    }

    pub fn group_of(&self, key: &MemberKey) -> Option<GroupId> {
        self.assignment.get(key).copied()
    }

    pub fn display_names(&self) -> Vec<String> {
        self.iter().map(|(_, g)| g.name.clone()).collect()
    }

    /// Names of the groups written to the setup file, in deck order. The
    /// solver numbers its `ConGrp_` columns by this position.
    pub fn active_names(&self) -> Vec<String> {
        self.active_groups().map(|g| g.name.clone()).collect()
    }

    pub fn active_groups(&self) -> impl Iterator<Item = &ControlGroup> {
        self.iter().map(|(_, g)| g).filter(|g| g.is_active())
    }

    pub fn current(&self) -> Option<GroupId> {
        self.current
    }

    pub fn set_current(&mut self, id: GroupId) -> SetupResult<()> {
        if !self.groups.contains_key(&id) {
            return Err(SetupError::IndexOutOfRange {
                what: "control group",
                index: id.index() as usize,
                len: self.order.len(),
            });
        }
        self.current = Some(id);
        Ok(())
    }

    pub fn current_group_name(&self) -> Option<&str> {
        self.current
            .and_then(|id| self.groups.get(&id))
            .map(|g| g.name.as_str())
    }

    pub fn set_current_group_name(&mut self, name: impl Into<String>) -> SetupResult<()> {
        let id = self.current.ok_or(SetupError::NoCurrentGroup)?;
        let group = self.groups.get_mut(&id).ok_or(SetupError::NoCurrentGroup)?;
        group.name = name.into();
        Ok(())
    }

    /// Add an empty group and make it current.
    pub fn add_group(&mut self) -> GroupId {
        self.add_group_named(DEFAULT_GROUP_NAME)
    }

    pub fn add_group_named(&mut self, name: impl Into<String>) -> GroupId {
        let id = self.insert_group(ControlGroup::new(name));
        self.current = Some(id);
        id
    }

    /// Remove the current group, releasing its members. The first remaining
    /// group becomes current.
    pub fn remove_current_group(&mut self) -> SetupResult<ControlGroup> {
        let id = self.current.ok_or(SetupError::NoCurrentGroup)?;
        let group = self.groups.remove(&id).ok_or(SetupError::NoCurrentGroup)?;
        for m in &group.members {
            self.assignment.remove(&m.key);
        }
        self.order.retain(|g| *g != id);
        self.current = self.order.first().copied();
        Ok(group)
    }

    /// Every control subsurface copy reported by the geometry.
    pub fn complete_surfaces(&self) -> &[ControlSurface] {
        &self.complete
    }

    /// Surfaces not yet in any group.
    pub fn available_surfaces(&self) -> Vec<&ControlSurface> {
        self.complete
            .iter()
            .filter(|s| !self.assignment.contains_key(&s.key))
            .collect()
    }

    /// Add surfaces from [`available_surfaces`](Self::available_surfaces) by
    /// position to the current group.
    pub fn add_selected_to_current(&mut self, selected: &[usize]) -> SetupResult<usize> {
        let id = self.current.ok_or(SetupError::NoCurrentGroup)?;
        let available: Vec<ControlSurface> =
            self.available_surfaces().into_iter().cloned().collect();
        let mut added = 0;
        for &index in selected {
            let surface = available.get(index).ok_or(SetupError::IndexOutOfRange {
                what: "available control surface",
                index,
                len: available.len(),
            })?;
            if self.attach(id, member_from(surface)) {
                added += 1;
            }
        }
        Ok(added)
    }

    pub fn add_all_to_current(&mut self) -> SetupResult<usize> {
        let count = self.available_surfaces().len();
        let all: Vec<usize> = (0..count).collect();
        self.add_selected_to_current(&all)
    }

    /// Remove members of the current group by position.
    pub fn remove_selected_from_current(&mut self, selected: &[usize]) -> SetupResult<usize> {
        let id = self.current.ok_or(SetupError::NoCurrentGroup)?;
        let members: Vec<MemberKey> = self
            .groups
            .get(&id)
            .map(|g| g.members.iter().map(|m| m.key.clone()).collect())
            .unwrap_or_default();
        let mut removed = 0;
        for &index in selected {
            let key = members.get(index).ok_or(SetupError::IndexOutOfRange {
                what: "control group member",
                index,
                len: members.len(),
            })?;
            if self.detach(id, key) {
                removed += 1;
            }
        }
        Ok(removed)
    }

    pub fn remove_all_from_current(&mut self) -> SetupResult<usize> {
        let id = self.current.ok_or(SetupError::NoCurrentGroup)?;
        let count = self.groups.get(&id).map_or(0, |g| g.members.len());
        let all: Vec<usize> = (0..count).collect();
        self.remove_selected_from_current(&all)
    }

    /// Replace the list of available surfaces from a geometry snapshot and
    /// reconcile existing members: names are refreshed and members whose
    /// subsurface disappeared are dropped.
    pub fn refresh_from_geometry(&mut self, subsurfaces: &[SubSurfaceDef]) {
        self.complete = subsurfaces
            .iter()
            .flat_map(|ss| (0..ss.num_symm_copies).map(move |r| ControlSurface::new(ss, r)))
            .collect();

        let by_key: HashMap<&MemberKey, &ControlSurface> =
            self.complete.iter().map(|s| (&s.key, s)).collect();

        let mut stale = Vec::new();
        for (id, group) in self.groups.iter_mut() {
            for member in group.members.iter_mut() {
                match by_key.get(&member.key) {
                    Some(surface) => member.full_name = surface.full_name.clone(),
                    None => stale.push((*id, member.key.clone())),
                }
            }
        }
        for (id, key) in stale {
            debug!(ss_id = %key.ss_id, reflect = key.reflect, "dropping member with missing subsurface");
            self.detach(id, &key);
        }
    }

    /// Put every ungrouped surface into a group per parent geometry and
    /// subsurface, named `<geom>_<subsurface>`; symmetry copies share it.
    pub fn auto_group(&mut self) {
        let pending: Vec<ControlSurface> = self
            .available_surfaces()
            .into_iter()
            .cloned()
            .collect();

        for surface in pending {
            let existing = self.iter().find_map(|(id, g)| {
                let same_parent = g.parent_geom_base.as_deref() == Some(surface.key.parent_geom_id.as_str());
                let same_ss = g
                    .members
                    .first()
                    .is_some_and(|m| m.key.ss_id == surface.key.ss_id);
                (same_parent && same_ss).then_some(id)
            });

            let id = match existing {
                Some(id) => id,
                None => {
                    let mut group =
                        ControlGroup::new(format!("{}_{}", surface.geom_name, surface.ss_name));
                    group.parent_geom_base = Some(surface.key.parent_geom_id.clone());
                    self.insert_group(group)
                }
            };
            self.attach(id, member_from(&surface));
        }
    }
}

fn member_from(surface: &ControlSurface) -> ControlMember {
    ControlMember {
        key: surface.key.clone(),
        full_name: surface.full_name.clone(),
        gain: 1.0,
    }
}
