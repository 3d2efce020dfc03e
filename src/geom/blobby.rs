//! Implicit surfaces built from ellipsoid blobs.
//!
//! A [`BlobbyTree`] is the explicit form: ellipsoid leaves combined by
//! sum (blend) and maximum (union) nodes. [`BlobbyTree::encode`] flattens
//! it into the opcode stream backends consume:
//!
//! | opcode | operands |
//! |--------|----------|
//! | `1001` ellipsoid | offset of its 16 matrix floats |
//! | `0` sum | operand count, operand indices |
//! | `2` maximum | operand count, operand indices |
//!
//! Leaves are numbered first (depth-first order), combiners after them
//! in post-order.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use smallvec::SmallVec;

use crate::render::BlobbyStream;
use crate::util::{Mat4, Time, Vec3};

pub const OP_ELLIPSOID: i32 = 1001;
pub const OP_SUM: i32 = 0;
pub const OP_MAXIMUM: i32 = 2;

/// Combining operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlobbyOp {
    /// Blend fields additively.
    Sum,
    /// Union (field maximum).
    Maximum,
}

impl BlobbyOp {
    pub const fn code(self) -> i32 {
        match self {
            Self::Sum => OP_SUM,
            Self::Maximum => OP_MAXIMUM,
        }
    }
}

/// Node of a blobby tree.
#[derive(Clone, Debug, PartialEq)]
pub enum BlobbyNode {
    /// Unit sphere field under a transform.
    Ellipsoid(Mat4),
    Combine { op: BlobbyOp, children: Vec<BlobbyNode> },
}

impl BlobbyNode {
    pub fn sum(children: Vec<BlobbyNode>) -> Self {
        Self::Combine { op: BlobbyOp::Sum, children }
    }

    pub fn maximum(children: Vec<BlobbyNode>) -> Self {
        Self::Combine { op: BlobbyOp::Maximum, children }
    }

    /// Ellipsoid of diameter `width` centered at `position`.
    pub fn particle(position: Vec3, width: f32) -> Self {
        Self::Ellipsoid(Mat4::from_translation(position) * Mat4::from_scale(Vec3::splat(width * 0.5)))
    }

    pub fn num_leaves(&self) -> usize {
        match self {
            Self::Ellipsoid(_) => 1,
            Self::Combine { children, .. } => children.iter().map(Self::num_leaves).sum(),
        }
    }

    fn push_leaves(&self, stream: &mut BlobbyStream) {
        match self {
            Self::Ellipsoid(m) => {
                stream.codes.push(OP_ELLIPSOID);
                stream.codes.push(stream.floats.len() as i32);
                stream.floats.extend_from_slice(&m.to_cols_array());
            }
            Self::Combine { children, .. } => {
                for child in children {
                    child.push_leaves(stream);
                }
            }
        }
    }

    /// Emits combiners and returns this node's instruction index.
    fn push_ops(&self, stream: &mut BlobbyStream, next_leaf: &mut usize, next_op: &mut usize) -> i32 {
        match self {
            Self::Ellipsoid(_) => {
                let index = *next_leaf;
                *next_leaf += 1;
                index as i32
            }
            Self::Combine { op, children } => {
                let operands: SmallVec<[i32; 8]> = children
                    .iter()
                    .map(|c| c.push_ops(stream, next_leaf, next_op))
                    .collect();
                stream.codes.push(op.code());
                stream.codes.push(operands.len() as i32);
                stream.codes.extend_from_slice(&operands);
                let index = *next_op;
                *next_op += 1;
                index as i32
            }
        }
    }
}

/// Blobby expression tree.
#[derive(Clone, Debug, PartialEq)]
pub struct BlobbyTree {
    pub root: BlobbyNode,
}

impl BlobbyTree {
    pub fn new(root: BlobbyNode) -> Self {
        Self { root }
    }

    /// Tree for a particle cloud.
    ///
    /// With group ids, particles sharing an id are summed and the sums
    /// are unioned, groups ordered by first appearance. Without them, all
    /// particles form one sum. Leaves follow [`particle_order`].
    pub fn from_particles(positions: &[Vec3], widths: &[f32], groups: Option<&[i32]>) -> Self {
        let leaf = |i: usize| {
            let width = widths.get(i).or(widths.last()).copied().unwrap_or(1.0);
            BlobbyNode::particle(positions[i], width)
        };
        match groups.filter(|g| g.len() == positions.len()) {
            None => Self::new(BlobbyNode::sum((0..positions.len()).map(leaf).collect())),
            Some(groups) => Self::new(BlobbyNode::maximum(
                group_members(groups)
                    .into_iter()
                    .map(|(_, members)| BlobbyNode::sum(members.into_iter().map(leaf).collect()))
                    .collect(),
            )),
        }
    }

    pub fn num_leaves(&self) -> usize {
        self.root.num_leaves()
    }

    /// Flatten to the opcode stream.
    pub fn encode(&self) -> BlobbyStream {
        let mut stream = BlobbyStream::default();
        self.root.push_leaves(&mut stream);
        stream.leaves = self.root.num_leaves();
        let mut next_leaf = 0;
        let mut next_op = stream.leaves;
        self.root.push_ops(&mut stream, &mut next_leaf, &mut next_op);
        stream
    }
}

/// Particle indices per group id, groups in order of first appearance.
pub fn group_members(groups: &[i32]) -> Vec<(i32, Vec<usize>)> {
    let mut slots: HashMap<i32, usize> = HashMap::new();
    let mut out: Vec<(i32, Vec<usize>)> = Vec::new();
    for (i, &g) in groups.iter().enumerate() {
        let slot = *slots.entry(g).or_insert_with(|| {
            out.push((g, Vec::new()));
            out.len() - 1
        });
        out[slot].1.push(i);
    }
    out
}

/// Order in which [`BlobbyTree::from_particles`] emits particle leaves;
/// per-particle values must be permuted the same way.
pub fn particle_order(count: usize, groups: Option<&[i32]>) -> Vec<usize> {
    match groups.filter(|g| g.len() == count) {
        None => (0..count).collect(),
        Some(groups) => group_members(groups).into_iter().flat_map(|(_, m)| m).collect(),
    }
}

/// Blobby groups already written, per time sample.
///
/// Every member of a group is visited on its own; the first one to claim
/// the group writes the fused surface for all of them.
#[derive(Debug, Default)]
pub struct BlobbyGroups {
    claimed: HashMap<u32, HashSet<i32>>,
}

/// Registry shared by the sphere emitters of one export pass.
pub type BlobbyGroupsRef = Arc<Mutex<BlobbyGroups>>;

impl BlobbyGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> BlobbyGroupsRef {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Claim `group` at `time`; false when already claimed.
    pub fn claim(&mut self, time: Time, group: i32) -> bool {
        self.claimed.entry(time.to_bits()).or_default().insert(group)
    }

    pub fn is_claimed(&self, time: Time, group: i32) -> bool {
        self.claimed.get(&time.to_bits()).is_some_and(|g| g.contains(&group))
    }

    /// Forget every claim (start of a new frame).
    pub fn clear(&mut self) {
        self.claimed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_ops(codes: &[i32]) -> (usize, usize, usize) {
        let (mut ellipsoids, mut sums, mut maxima) = (0, 0, 0);
        let mut i = 0;
        while i < codes.len() {
            match codes[i] {
                OP_ELLIPSOID => {
                    ellipsoids += 1;
                    i += 2;
                }
                op => {
                    if op == OP_SUM {
                        sums += 1;
                    } else {
                        maxima += 1;
                    }
                    i += 2 + codes[i + 1] as usize;
                }
            }
        }
        (ellipsoids, sums, maxima)
    }

    #[test]
    fn test_two_groups() {
        let p = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let tree = BlobbyTree::from_particles(&p, &[2.0], Some(&[7, 7, 9]));
        let s = tree.encode();

        assert_eq!(s.leaves, 3);
        assert_eq!(
            s.codes,
            vec![
                OP_ELLIPSOID, 0, OP_ELLIPSOID, 16, OP_ELLIPSOID, 32, //
                OP_SUM, 2, 0, 1, //
                OP_SUM, 1, 2, //
                OP_MAXIMUM, 2, 3, 4,
            ]
        );
        assert_eq!(s.floats.len(), 48);
        // Unit scale (width 2), translated to X.
        assert_eq!(&s.floats[16..32], &Mat4::from_translation(Vec3::X).to_cols_array());
    }

    #[test]
    fn test_op_and_slot_counts() {
        let n = 10;
        let groups: Vec<i32> = (0..n).map(|i| (i % 4) as i32).collect();
        let p = vec![Vec3::ZERO; n];
        let s = BlobbyTree::from_particles(&p, &[1.0], Some(&groups)).encode();

        let k = 4;
        assert_eq!(count_ops(&s.codes), (n, k, 1));
        let sizes = [3, 3, 2, 2];
        let slots = 2 * n + sizes.iter().map(|s| 2 + s).sum::<usize>() + (2 + k);
        assert_eq!(s.codes.len(), slots);
    }

    #[test]
    fn test_interleaved_groups_reorder_leaves() {
        let groups = [1, 2, 1];
        assert_eq!(particle_order(3, Some(&groups)), vec![0, 2, 1]);
        assert_eq!(particle_order(3, None), vec![0, 1, 2]);

        let p = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let s = BlobbyTree::from_particles(&p, &[2.0], Some(&groups)).encode();
        // Second leaf is particle 2.
        assert_eq!(&s.floats[16..32], &Mat4::from_translation(Vec3::Y).to_cols_array());
        assert_eq!(&s.codes[6..], &[OP_SUM, 2, 0, 1, OP_SUM, 1, 2, OP_MAXIMUM, 2, 3, 4]);
    }

    #[test]
    fn test_ungrouped_is_single_sum() {
        let p = [Vec3::ZERO, Vec3::X];
        let s = BlobbyTree::from_particles(&p, &[1.0, 1.0], None).encode();
        assert_eq!(count_ops(&s.codes), (2, 1, 0));
        assert_eq!(&s.codes[4..], &[OP_SUM, 2, 0, 1]);
    }

    #[test]
    fn test_group_claims_are_per_time() {
        let mut groups = BlobbyGroups::new();
        assert!(groups.claim(0.0, 3));
        assert!(!groups.claim(0.0, 3));
        assert!(groups.claim(0.5, 3));
        assert!(groups.is_claimed(0.5, 3));

        groups.clear();
        assert!(!groups.is_claimed(0.0, 3));
    }
}
