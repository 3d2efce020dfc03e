//! Element types - the typed interpretation of a value buffer.

use bytemuck::{Pod, Zeroable};
use std::fmt;

/// Scalar storage kind backing an element type.
///
/// Every [`ElementType`] is stored as a run of one scalar kind: points are
/// three floats, matrices sixteen floats and so on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScalarKind {
    Bool,
    Int,
    Float,
    String,
}

impl ScalarKind {
    /// Size in bytes of one scalar of this kind.
    /// For strings, returns the size of a pointer (in-memory handle).
    #[inline]
    pub const fn num_bytes(self) -> usize {
        match self {
            Self::Bool => 1,
            Self::Int => 4,
            Self::Float => 4,
            Self::String => std::mem::size_of::<usize>(),
        }
    }

    /// Returns the name of this kind as a string.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Element type of a [`TypedValue`](crate::core::TypedValue).
///
/// Point, vector and normal share storage (three floats) but keep their
/// semantics so backends can transform them correctly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ElementType {
    /// Unknown/unset type
    #[default]
    Undefined = 0,
    Bool = 1,
    Int = 2,
    Float = 3,
    /// RGBA color (4 floats)
    Color = 4,
    /// 3D point (3 floats)
    Point = 5,
    /// Homogeneous point (4 floats)
    HPoint = 6,
    /// Direction (3 floats)
    Vector = 7,
    /// Surface normal (3 floats)
    Normal = 8,
    /// 4x4 matrix (16 floats)
    Matrix = 9,
    String = 10,
}

impl ElementType {
    /// All defined element types.
    pub const ALL: [Self; 10] = [
        Self::Bool,
        Self::Int,
        Self::Float,
        Self::Color,
        Self::Point,
        Self::HPoint,
        Self::Vector,
        Self::Normal,
        Self::Matrix,
        Self::String,
    ];

    /// Number of scalars per element.
    #[inline]
    pub const fn components(self) -> usize {
        match self {
            Self::Undefined => 0,
            Self::Bool | Self::Int | Self::Float | Self::String => 1,
            Self::Point | Self::Vector | Self::Normal => 3,
            Self::HPoint | Self::Color => 4,
            Self::Matrix => 16,
        }
    }

    /// Scalar kind the element is stored as, `None` when undefined.
    #[inline]
    pub const fn scalar_kind(self) -> Option<ScalarKind> {
        match self {
            Self::Undefined => None,
            Self::Bool => Some(ScalarKind::Bool),
            Self::Int => Some(ScalarKind::Int),
            Self::String => Some(ScalarKind::String),
            Self::Float
            | Self::Color
            | Self::Point
            | Self::HPoint
            | Self::Vector
            | Self::Normal
            | Self::Matrix => Some(ScalarKind::Float),
        }
    }

    /// Size in bytes of one scalar component.
    #[inline]
    pub const fn scalar_bytes(self) -> usize {
        match self.scalar_kind() {
            Some(kind) => kind.num_bytes(),
            None => 0,
        }
    }

    /// Size in bytes of one whole element.
    #[inline]
    pub const fn num_bytes(self) -> usize {
        self.scalar_bytes() * self.components()
    }

    /// Returns true for every type but `Undefined`.
    #[inline]
    pub const fn is_defined(self) -> bool {
        !matches!(self, Self::Undefined)
    }

    /// Returns the name of this type as a string.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Color => "color",
            Self::Point => "point",
            Self::HPoint => "hpoint",
            Self::Vector => "vector",
            Self::Normal => "normal",
            Self::Matrix => "matrix",
            Self::String => "string",
        }
    }

    /// Parse an element type from its name string.
    pub fn from_name(name: &str) -> Self {
        match name {
            "bool" => Self::Bool,
            "int" | "integer" => Self::Int,
            "float" => Self::Float,
            "color" => Self::Color,
            "point" => Self::Point,
            "hpoint" => Self::HPoint,
            "vector" => Self::Vector,
            "normal" => Self::Normal,
            "matrix" => Self::Matrix,
            "string" => Self::String,
            _ => Self::Undefined,
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Boolean with guaranteed 1-byte storage.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct Bool(u8);

impl Bool {
    pub const TRUE: Self = Self(1);
    pub const FALSE: Self = Self(0);

    #[inline]
    pub const fn new(v: bool) -> Self {
        Self(v as u8)
    }

    #[inline]
    pub const fn get(self) -> bool {
        self.0 != 0
    }
}

impl From<bool> for Bool {
    #[inline]
    fn from(v: bool) -> Self {
        Self::new(v)
    }
}

impl From<Bool> for bool {
    #[inline]
    fn from(v: Bool) -> Self {
        v.get()
    }
}

impl fmt::Debug for Bool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_counts() {
        assert_eq!(ElementType::Float.components(), 1);
        assert_eq!(ElementType::Point.components(), 3);
        assert_eq!(ElementType::Normal.components(), 3);
        assert_eq!(ElementType::HPoint.components(), 4);
        assert_eq!(ElementType::Color.components(), 4);
        assert_eq!(ElementType::Matrix.components(), 16);
        assert_eq!(ElementType::Undefined.components(), 0);
    }

    #[test]
    fn test_element_sizes() {
        assert_eq!(ElementType::Bool.num_bytes(), 1);
        assert_eq!(ElementType::Int.num_bytes(), 4);
        assert_eq!(ElementType::Point.num_bytes(), 12);
        assert_eq!(ElementType::Matrix.num_bytes(), 64);
        assert_eq!(ElementType::Undefined.num_bytes(), 0);
    }

    #[test]
    fn test_names_roundtrip() {
        for ty in ElementType::ALL {
            assert_eq!(ElementType::from_name(ty.name()), ty);
        }
        assert_eq!(ElementType::from_name("quaternion"), ElementType::Undefined);
    }

    #[test]
    fn test_bool_type() {
        assert!(Bool::new(true).get());
        assert!(!Bool::new(false).get());
        assert_eq!(std::mem::size_of::<Bool>(), 1);
    }
}
