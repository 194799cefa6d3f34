//! Actuator disk records.

use nalgebra::Vector3;
use tracing::debug;
use va_core::DiskId;
use va_project::{DiskSurfaceDef, RotorDiskDef};

/// Actuator-disk model of one rotor.
#[derive(Debug, Clone, PartialEq)]
pub struct RotorDisk {
    pub name: String,
    pub parent_geom_id: Option<String>,
    pub surf_index: Option<u32>,
    pub position: Vector3<f64>,
    pub normal: Vector3<f64>,
    pub diameter: f64,
    pub hub_diameter: f64,
    pub rpm: f64,
    pub ct: f64,
    pub cp: f64,
    pub used: bool,
}

impl Default for RotorDisk {
    fn default() -> Self {
        Self::from(&RotorDiskDef::default())
    }
}

impl RotorDisk {
    pub fn radius(&self) -> f64 {
        self.diameter / 2.0
    }

    pub fn hub_radius(&self) -> f64 {
        self.hub_diameter / 2.0
    }

    /// Keep the hub no larger than the disk.
    pub fn clamp_hub(&mut self) {
        if self.hub_diameter > self.diameter {
            self.hub_diameter = self.diameter;
        }
    }

    fn matches(&self, surface: &DiskSurfaceDef) -> bool {
        self.parent_geom_id.as_deref() == Some(surface.geom_id.as_str())
            && self.surf_index == Some(surface.surf_index)
    }

    /// Take placement from the geometry. The rotor normal opposes the
    /// surface's outward normal.
    fn sync_with(&mut self, surface: &DiskSurfaceDef) {
        self.name = format!("{}_{}", surface.geom_name, surface.surf_index);
        self.diameter = surface.diameter;
        self.position = Vector3::from(surface.position);
        self.normal = -Vector3::from(surface.normal);
        self.clamp_hub();
    }
}

impl From<&RotorDiskDef> for RotorDisk {
    fn from(def: &RotorDiskDef) -> Self {
        let mut disk = Self {
            name: def.name.clone(),
            parent_geom_id: def.parent_geom_id.clone(),
            surf_index: def.surf_index,
            position: Vector3::from(def.position),
            normal: Vector3::from(def.normal),
            diameter: def.diameter,
            hub_diameter: def.hub_diameter,
            rpm: def.rpm,
            ct: def.ct,
            cp: def.cp,
            used: def.used,
        };
        disk.clamp_hub();
        disk
    }
}

impl From<&RotorDisk> for RotorDiskDef {
    fn from(disk: &RotorDisk) -> Self {
        Self {
            name: disk.name.clone(),
            parent_geom_id: disk.parent_geom_id.clone(),
            surf_index: disk.surf_index,
            position: disk.position.into(),
            normal: disk.normal.into(),
            diameter: disk.diameter,
            hub_diameter: disk.hub_diameter,
            rpm: disk.rpm,
            ct: disk.ct,
            cp: disk.cp,
            used: disk.used,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RotorDiskTable {
    disks: Vec<(DiskId, RotorDisk)>,
    next_id: DiskId,
}

impl Default for RotorDiskTable {
    fn default() -> Self {
        Self {
            disks: Vec::new(),
            next_id: DiskId::from_index(0),
        }
    }
}

impl RotorDiskTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_defs(defs: &[RotorDiskDef]) -> Self {
        let mut table = Self::new();
        for def in defs {
            table.add(RotorDisk::from(def));
        }
        table
    }

    pub fn to_defs(&self) -> Vec<RotorDiskDef> {
        self.iter().map(|(_, d)| RotorDiskDef::from(d)).collect()
    }

    pub fn add(&mut self, mut disk: RotorDisk) -> DiskId {
        disk.clamp_hub();
        let id = self.next_id;
        self.next_id = id.next();
        self.disks.push((id, disk));
        id
    }

    pub fn add_default(&mut self) -> DiskId {
        self.add(RotorDisk::default())
    }

    pub fn remove(&mut self, id: DiskId) -> Option<RotorDisk> {
        let pos = self.disks.iter().position(|(d, _)| *d == id)?;
        Some(self.disks.remove(pos).1)
    }

    pub fn get(&self, id: DiskId) -> Option<&RotorDisk> {
        self.disks.iter().find(|(d, _)| *d == id).map(|(_, r)| r)
    }

    pub fn get_mut(&mut self, id: DiskId) -> Option<&mut RotorDisk> {
        self.disks
            .iter_mut()
            .find(|(d, _)| *d == id)
            .map(|(_, r)| r)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DiskId, &RotorDisk)> {
        self.disks.iter().map(|(id, d)| (*id, d))
    }

    pub fn used(&self) -> impl Iterator<Item = &RotorDisk> {
        self.disks.iter().map(|(_, d)| d).filter(|d| d.used)
    }

    pub fn len(&self) -> usize {
        self.disks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.disks.is_empty()
    }

    /// Match disks to the geometry's disk surfaces and rebuild the table in
    /// surface order, which fixes the `PropElement_<n>` numbering. Disks
    /// whose surface disappeared are dropped, new surfaces get a default
    /// disk, survivors keep their id and settings but take placement from
    /// the geometry. Manually added disks with no parent geometry are
    /// dropped too.
    pub fn reconcile(&mut self, surfaces: &[DiskSurfaceDef]) {
        let before = self.disks.len();
        let mut previous = std::mem::take(&mut self.disks);

        let mut created = 0;
        for surface in surfaces {
            match previous.iter().position(|(_, d)| d.matches(surface)) {
                Some(pos) => {
                    let (id, mut disk) = previous.swap_remove(pos);
                    disk.sync_with(surface);
                    self.disks.push((id, disk));
                }
                None => {
                    let mut disk = RotorDisk {
                        parent_geom_id: Some(surface.geom_id.clone()),
                        surf_index: Some(surface.surf_index),
                        ..RotorDisk::default()
                    };
                    disk.sync_with(surface);
                    self.add(disk);
                    created += 1;
                }
            }
        }
        let dropped = before + created - self.disks.len();
        debug!(dropped, created, total = self.disks.len(), "rotor disks reconciled");
    }

    /// Clamp every hub to its disk.
    pub fn update(&mut self) {
        for (_, disk) in &mut self.disks {
            disk.clamp_hub();
        }
    }
}
