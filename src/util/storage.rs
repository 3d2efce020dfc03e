//! Storage classes - interpolation frequency of a value over a primitive.

use std::fmt;

/// How a value is distributed over the domain of a primitive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StorageClass {
    /// Not yet classified.
    Undefined,
    /// One value for the entire primitive.
    Constant,
    /// One value per piece (face, curve, patch).
    Uniform,
    /// Linearly interpolated over each piece.
    Varying,
    /// One value per control vertex, interpolated with the primitive basis.
    #[default]
    Vertex,
    /// Per face corner, linearly interpolated.
    FaceVarying,
    /// Per face corner, interpolated with the primitive basis.
    FaceVertex,
}

impl StorageClass {
    /// Parse from string.
    pub fn from_name(s: &str) -> Self {
        match s {
            "constant" => Self::Constant,
            "uniform" => Self::Uniform,
            "varying" => Self::Varying,
            "vertex" => Self::Vertex,
            "facevarying" => Self::FaceVarying,
            "facevertex" => Self::FaceVertex,
            _ => Self::Undefined,
        }
    }

    /// Name as used in textual scene descriptions.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Constant => "constant",
            Self::Uniform => "uniform",
            Self::Varying => "varying",
            Self::Vertex => "vertex",
            Self::FaceVarying => "facevarying",
            Self::FaceVertex => "facevertex",
        }
    }
}

impl fmt::Display for StorageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
