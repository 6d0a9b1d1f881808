//! Degree-of-freedom algebra.
//!
//! A [`Dof`] is one of the six physical unknowns at a node. [`Dofs`] packs a
//! set of them into a single byte; iteration always walks translations X, Y, Z
//! then rotations X, Y, Z, and every serializer relies on that order.
//! [`DofMatrix`] and [`DofCoefs`] express couplings and linear participation
//! coefficients over those unknowns.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, AddAssign, Index, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::numeric::{is_equal, is_zero};

/// A single degree of freedom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Dof {
    Dx,
    Dy,
    Dz,
    Rx,
    Ry,
    Rz,
}

impl Dof {
    /// All DOFs in position order.
    pub const ALL: [Dof; 6] = [Dof::Dx, Dof::Dy, Dof::Dz, Dof::Rx, Dof::Ry, Dof::Rz];

    /// Array index of this DOF (0..=5).
    pub fn position(self) -> usize {
        self as usize
    }

    /// Bit value of this DOF inside a [`Dofs`] mask.
    pub fn code(self) -> u8 {
        1 << self.position()
    }

    pub fn from_position(position: usize) -> Result<Dof> {
        Dof::ALL.get(position).copied().ok_or_else(|| {
            ModelError::InvalidDofConfiguration(format!("DOF position {position} out of range"))
        })
    }

    pub fn is_translation(self) -> bool {
        self.position() < 3
    }

    pub fn is_rotation(self) -> bool {
        !self.is_translation()
    }

    pub fn label(self) -> &'static str {
        match self {
            Dof::Dx => "DX",
            Dof::Dy => "DY",
            Dof::Dz => "DZ",
            Dof::Rx => "RX",
            Dof::Ry => "RY",
            Dof::Rz => "RZ",
        }
    }
}

impl fmt::Display for Dof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A set of DOFs packed into six bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Dofs(u8);

impl Dofs {
    pub const NONE: Dofs = Dofs(0);
    pub const TRANSLATIONS: Dofs = Dofs(0b000_111);
    pub const ROTATIONS: Dofs = Dofs(0b111_000);
    pub const ALL: Dofs = Dofs(0b111_111);

    /// Build a set from a raw mask. Fails if bits above the sixth are set.
    pub fn from_bits(bits: u8) -> Result<Dofs> {
        if bits & !Dofs::ALL.0 != 0 {
            return Err(ModelError::InvalidDofConfiguration(format!(
                "DOF mask {bits:#010b} has bits outside the six DOFs"
            )));
        }
        Ok(Dofs(bits))
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn combine(dx: bool, dy: bool, dz: bool, rx: bool, ry: bool, rz: bool) -> Dofs {
        [dx, dy, dz, rx, ry, rz]
            .iter()
            .zip(Dof::ALL)
            .filter(|(set, _)| **set)
            .map(|(_, dof)| dof)
            .collect()
    }

    /// Decode a positional DOF code where each decimal digit 1-6 names a DOF
    /// (`123` is DX, DY, DZ). Zero means no DOF. A digit may appear once.
    pub fn from_nastran_code(code: i64) -> Result<Dofs> {
        if code < 0 {
            return Err(ModelError::InvalidDofConfiguration(format!(
                "negative DOF code {code}"
            )));
        }
        if code == 0 {
            return Ok(Dofs::NONE);
        }
        let mut dofs = Dofs::NONE;
        for digit in code.to_string().bytes() {
            let value = usize::from(digit - b'0');
            if !(1..=6).contains(&value) {
                return Err(ModelError::InvalidDofConfiguration(format!(
                    "DOF code {code} contains invalid digit {value}"
                )));
            }
            let dof = Dof::from_position(value - 1)?;
            if dofs.contains(dof) {
                return Err(ModelError::InvalidDofConfiguration(format!(
                    "DOF code {code} repeats digit {value}"
                )));
            }
            dofs += dof;
        }
        Ok(dofs)
    }

    /// Encode as a positional code with ascending digits; `0` when empty.
    pub fn nastran_code(self) -> u32 {
        self.iter()
            .fold(0, |acc, dof| acc * 10 + dof.position() as u32 + 1)
    }

    pub fn contains(self, dof: Dof) -> bool {
        self.0 & dof.code() != 0
    }

    pub fn contains_all(self, other: Dofs) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn contains_any_of(self, other: Dofs) -> bool {
        self.0 & other.0 != 0
    }

    pub fn intersection(self, other: Dofs) -> Dofs {
        Dofs(self.0 & other.0)
    }

    pub fn translations(self) -> Dofs {
        self.intersection(Dofs::TRANSLATIONS)
    }

    pub fn rotations(self) -> Dofs {
        self.intersection(Dofs::ROTATIONS)
    }

    /// Number of DOFs in the set.
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> DofsIter {
        DofsIter {
            bits: self.0,
            position: 0,
        }
    }
}

impl TryFrom<u8> for Dofs {
    type Error = ModelError;

    fn try_from(bits: u8) -> Result<Self> {
        Dofs::from_bits(bits)
    }
}

impl From<Dofs> for u8 {
    fn from(dofs: Dofs) -> u8 {
        dofs.0
    }
}

impl From<Dof> for Dofs {
    fn from(dof: Dof) -> Self {
        Dofs(dof.code())
    }
}

impl PartialEq<Dof> for Dofs {
    fn eq(&self, other: &Dof) -> bool {
        self.0 == other.code()
    }
}

impl FromIterator<Dof> for Dofs {
    fn from_iter<I: IntoIterator<Item = Dof>>(iter: I) -> Self {
        iter.into_iter().fold(Dofs::NONE, |acc, dof| acc + dof)
    }
}

/// Iterator over the DOFs of a [`Dofs`], in ascending position.
#[derive(Debug, Clone)]
pub struct DofsIter {
    bits: u8,
    position: usize,
}

impl Iterator for DofsIter {
    type Item = Dof;

    fn next(&mut self) -> Option<Dof> {
        while self.position < Dof::ALL.len() {
            let dof = Dof::ALL[self.position];
            self.position += 1;
            if self.bits & dof.code() != 0 {
                return Some(dof);
            }
        }
        None
    }
}

impl IntoIterator for Dofs {
    type Item = Dof;
    type IntoIter = DofsIter;

    fn into_iter(self) -> DofsIter {
        self.iter()
    }
}

impl Add for Dofs {
    type Output = Dofs;

    fn add(self, rhs: Dofs) -> Dofs {
        Dofs(self.0 | rhs.0)
    }
}

impl Add<Dof> for Dofs {
    type Output = Dofs;

    fn add(self, rhs: Dof) -> Dofs {
        Dofs(self.0 | rhs.code())
    }
}

impl Sub for Dofs {
    type Output = Dofs;

    fn sub(self, rhs: Dofs) -> Dofs {
        Dofs(self.0 & !rhs.0)
    }
}

impl Sub<Dof> for Dofs {
    type Output = Dofs;

    fn sub(self, rhs: Dof) -> Dofs {
        Dofs(self.0 & !rhs.code())
    }
}

impl AddAssign for Dofs {
    fn add_assign(&mut self, rhs: Dofs) {
        *self = *self + rhs;
    }
}

impl AddAssign<Dof> for Dofs {
    fn add_assign(&mut self, rhs: Dof) {
        *self = *self + rhs;
    }
}

impl SubAssign for Dofs {
    fn sub_assign(&mut self, rhs: Dofs) {
        *self = *self - rhs;
    }
}

impl SubAssign<Dof> for Dofs {
    fn sub_assign(&mut self, rhs: Dof) {
        *self = *self - rhs;
    }
}

impl fmt::Display for Dofs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        let labels: Vec<&str> = self.iter().map(Dof::label).collect();
        f.write_str(&labels.join(","))
    }
}

/// Sparse 6x6 coupling matrix keyed by DOF pairs.
///
/// In symmetric mode only the upper half (`row <= col`) is stored and lookups
/// of the lower half are answered from it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DofMatrix {
    symmetric: bool,
    #[serde(with = "component_list")]
    components: BTreeMap<(Dof, Dof), f64>,
}

impl DofMatrix {
    pub fn new(symmetric: bool) -> Self {
        Self {
            symmetric,
            components: BTreeMap::new(),
        }
    }

    fn key(&self, row: Dof, col: Dof) -> (Dof, Dof) {
        if self.symmetric && row > col {
            (col, row)
        } else {
            (row, col)
        }
    }

    /// Store a component, replacing any previous value.
    pub fn add_component(&mut self, row: Dof, col: Dof, value: f64) {
        let key = self.key(row, col);
        self.components.insert(key, value);
    }

    /// Stored value for `(row, col)`; missing entries are `0.0`.
    pub fn find_component(&self, row: Dof, col: Dof) -> f64 {
        self.components
            .get(&self.key(row, col))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn symmetric_storage(&self) -> bool {
        self.symmetric
    }

    /// Non-zero stored components in key order.
    pub fn components(&self) -> impl Iterator<Item = ((Dof, Dof), f64)> + '_ {
        self.components
            .iter()
            .filter(|(_, value)| !is_zero(**value))
            .map(|(key, value)| (*key, *value))
    }

    pub fn is_empty(&self) -> bool {
        self.components().next().is_none()
    }

    pub fn is_diagonal(&self) -> bool {
        self.components().all(|((row, col), _)| row == col)
    }

    pub fn is_symmetric(&self) -> bool {
        if self.symmetric {
            return true;
        }
        self.components()
            .all(|((row, col), value)| is_equal(value, self.find_component(col, row)))
    }

    pub fn has_translations(&self) -> bool {
        self.components()
            .any(|((row, col), _)| row.is_translation() || col.is_translation())
    }

    pub fn has_rotations(&self) -> bool {
        self.components()
            .any(|((row, col), _)| row.is_rotation() || col.is_rotation())
    }

    /// DOFs touched by a non-zero component.
    pub fn dofs(&self) -> Dofs {
        self.components()
            .flat_map(|((row, col), _)| [row, col])
            .collect()
    }
}

/// Serializes the component map as a list of `(row, col, value)` triples so
/// formats with string-only map keys can carry it.
mod component_list {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serializer};

    use super::Dof;

    pub fn serialize<S: Serializer>(
        components: &BTreeMap<(Dof, Dof), f64>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(components.iter().map(|(&(row, col), &value)| (row, col, value)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<(Dof, Dof), f64>, D::Error> {
        let entries: Vec<(Dof, Dof, f64)> = Vec::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .map(|(row, col, value)| ((row, col), value))
            .collect())
    }
}

/// Dense coefficient vector, one slot per DOF.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DofCoefs([f64; 6]);

impl DofCoefs {
    pub fn new(coefs: [f64; 6]) -> Self {
        Self(coefs)
    }

    /// Coefficient at `position`, `0.0` outside 0..=5.
    pub fn get(&self, position: usize) -> f64 {
        self.0.get(position).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, dof: Dof, value: f64) {
        self.0[dof.position()] = value;
    }

    /// DOFs with a non-zero coefficient.
    pub fn dofs(&self) -> Dofs {
        Dof::ALL
            .into_iter()
            .filter(|dof| !is_zero(self.0[dof.position()]))
            .collect()
    }

    pub fn as_array(&self) -> &[f64; 6] {
        &self.0
    }
}

impl Index<Dof> for DofCoefs {
    type Output = f64;

    fn index(&self, dof: Dof) -> &f64 {
        &self.0[dof.position()]
    }
}

impl AddAssign for DofCoefs {
    fn add_assign(&mut self, rhs: DofCoefs) {
        for (lhs, rhs) in self.0.iter_mut().zip(rhs.0) {
            *lhs += rhs;
        }
    }
}

impl PartialEq for DofCoefs {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DofCoefs {}

impl PartialOrd for DofCoefs {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DofCoefs {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| a.total_cmp(b))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}
