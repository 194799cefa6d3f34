//! Planar Cp cuts sampled by the slicer after a solve.

use va_core::CutAxis;
use va_project::CpSliceDef;

use crate::{SetupError, SetupResult};

#[derive(Debug, Clone, PartialEq)]
pub struct CpSlice {
    pub name: String,
    pub axis: CutAxis,
    pub position: f64,
    pub draw: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpSliceList {
    slices: Vec<CpSlice>,
}

impl CpSliceList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_defs(defs: &[CpSliceDef]) -> Self {
        let mut list = Self::new();
        for def in defs {
            let index = list.add();
            let slice = &mut list.slices[index];
            slice.axis = def.axis;
            slice.position = def.position;
            slice.draw = def.draw;
        }
        list
    }

    pub fn to_defs(&self) -> Vec<CpSliceDef> {
        self.slices
            .iter()
            .map(|s| CpSliceDef {
                axis: s.axis,
                position: s.position,
                draw: s.draw,
            })
            .collect()
    }

    /// Append a Y cut at the origin and return its index.
    pub fn add(&mut self) -> usize {
        let index = self.slices.len();
        self.slices.push(CpSlice {
            name: format!("CpSlice_{index}"),
            axis: CutAxis::Y,
            position: 0.0,
            draw: true,
        });
        index
    }

    pub fn add_positions(&mut self, axis: CutAxis, positions: &[f64]) {
        for &position in positions {
            let index = self.add();
            self.slices[index].axis = axis;
            self.slices[index].position = position;
        }
    }

    /// Positions of all cuts along one axis, in list order.
    pub fn positions_for(&self, axis: CutAxis) -> Vec<f64> {
        self.slices
            .iter()
            .filter(|s| s.axis == axis)
            .map(|s| s.position)
            .collect()
    }

    pub fn delete(&mut self, index: usize) -> SetupResult<CpSlice> {
        if index >= self.slices.len() {
            return Err(SetupError::IndexOutOfRange {
                what: "cp slice",
                index,
                len: self.slices.len(),
            });
        }
        Ok(self.slices.remove(index))
    }

    pub fn clear(&mut self) {
        self.slices.clear();
    }

    pub fn get(&self, index: usize) -> Option<&CpSlice> {
        self.slices.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut CpSlice> {
        self.slices.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CpSlice> {
        self.slices.iter()
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_uses_defaults_and_counting_names() {
        let mut list = CpSliceList::new();
        list.add();
        list.add();
        let s = list.get(1).unwrap();
        assert_eq!(s.name, "CpSlice_1");
        assert_eq!(s.axis, CutAxis::Y);
        assert_eq!(s.position, 0.0);
        assert!(s.draw);
    }

    #[test]
    fn positions_by_axis() {
        let mut list = CpSliceList::new();
        list.add_positions(CutAxis::X, &[1.0, 2.0]);
        list.add_positions(CutAxis::Z, &[0.5]);
        list.add_positions(CutAxis::X, &[3.0]);
        assert_eq!(list.positions_for(CutAxis::X), vec![1.0, 2.0, 3.0]);
        assert_eq!(list.positions_for(CutAxis::Y), Vec::<f64>::new());
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn delete_and_clear() {
        let mut list = CpSliceList::new();
        list.add_positions(CutAxis::Y, &[1.0, 2.0]);
        assert_eq!(list.delete(0).unwrap().position, 1.0);
        assert!(list.delete(5).is_err());
        list.clear();
        assert!(list.is_empty());
    }

    #[test]
    fn defs_roundtrip() {
        let mut list = CpSliceList::new();
        list.add_positions(CutAxis::Z, &[0.25, 0.75]);
        list.get_mut(1).unwrap().draw = false;
        let back = CpSliceList::from_defs(&list.to_defs());
        assert_eq!(back, list);
    }
}
