//! Typed values - named, classed, typed buffers of parameter data.
//!
//! A [`TypedValue`] is the unit every parameter, attribute, option and
//! variable travels in. Its buffer ([`ValueData`]) is always held behind an
//! `Arc`, which gives the three ownership modes callers need:
//!
//! - copy: `ValueData::from(&slice[..])` clones a transient source,
//! - transfer: `ValueData::from(vec)` moves the caller's `Vec` in without copying,
//! - share: `ValueData::from(arc)` aliases a buffer other values also hold.
//!
//! Mutation through [`TypedValue::element_mut`] is copy-on-write, so a
//! shared buffer is never changed behind another holder's back.

use std::fmt::{self, Write as _};
use std::sync::Arc;

use crate::util::{Bool, ElementType, Error, Mat4, Result, ScalarKind, StorageClass, Vec3};

/// Name given to values constructed without one.
pub const UNNAMED: &str = "unnamed";

/// Reference-counted backing array.
pub type Shared<T> = Arc<Vec<T>>;

/// Untyped (kind-tagged) value buffer.
#[derive(Clone, Debug, Default)]
pub enum ValueData {
    #[default]
    Unset,
    Bool(Shared<Bool>),
    Int(Shared<i32>),
    Float(Shared<f32>),
    String(Shared<String>),
}

impl ValueData {
    /// Copy a transient source into a fresh buffer.
    pub fn copied<T: ValueScalar>(src: &[T]) -> Self {
        T::wrap(Arc::new(src.to_vec()))
    }

    /// Copy a point/vector/normal slice as flat floats.
    pub fn from_vec3(src: &[Vec3]) -> Self {
        Self::Float(Arc::new(bytemuck::cast_slice::<Vec3, f32>(src).to_vec()))
    }

    /// Copy matrices as flat floats (16 per matrix).
    pub fn from_matrices(src: &[Mat4]) -> Self {
        Self::Float(Arc::new(src.iter().flat_map(|m| m.to_cols_array()).collect()))
    }

    /// Zero-filled buffer of `len` scalars.
    pub fn zeroed(kind: ScalarKind, len: usize) -> Self {
        match kind {
            ScalarKind::Bool => Self::Bool(Arc::new(vec![Bool::FALSE; len])),
            ScalarKind::Int => Self::Int(Arc::new(vec![0; len])),
            ScalarKind::Float => Self::Float(Arc::new(vec![0.0; len])),
            ScalarKind::String => Self::String(Arc::new(vec![String::new(); len])),
        }
    }

    /// Scalar kind held, `None` when unset.
    pub fn kind(&self) -> Option<ScalarKind> {
        match self {
            Self::Unset => None,
            Self::Bool(_) => Some(ScalarKind::Bool),
            Self::Int(_) => Some(ScalarKind::Int),
            Self::Float(_) => Some(ScalarKind::Float),
            Self::String(_) => Some(ScalarKind::String),
        }
    }

    /// Number of scalars (not elements).
    pub fn len(&self) -> usize {
        match self {
            Self::Unset => 0,
            Self::Bool(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::String(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Number of holders of the backing array (0 when unset).
    pub fn holders(&self) -> usize {
        match self {
            Self::Unset => 0,
            Self::Bool(v) => Arc::strong_count(v),
            Self::Int(v) => Arc::strong_count(v),
            Self::Float(v) => Arc::strong_count(v),
            Self::String(v) => Arc::strong_count(v),
        }
    }

    /// True when both hold the very same backing array.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => Arc::ptr_eq(a, b),
            (Self::Int(a), Self::Int(b)) => Arc::ptr_eq(a, b),
            (Self::Float(a), Self::Float(b)) => Arc::ptr_eq(a, b),
            (Self::String(a), Self::String(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    fn bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bool(v) => Some(bytemuck::cast_slice(v.as_slice())),
            Self::Int(v) => Some(bytemuck::cast_slice(v.as_slice())),
            Self::Float(v) => Some(bytemuck::cast_slice(v.as_slice())),
            Self::Unset | Self::String(_) => None,
        }
    }

    fn bytes_mut(&mut self) -> Option<&mut [u8]> {
        match self {
            Self::Bool(v) => Some(bytemuck::cast_slice_mut(Arc::make_mut(v).as_mut_slice())),
            Self::Int(v) => Some(bytemuck::cast_slice_mut(Arc::make_mut(v).as_mut_slice())),
            Self::Float(v) => Some(bytemuck::cast_slice_mut(Arc::make_mut(v).as_mut_slice())),
            Self::Unset | Self::String(_) => None,
        }
    }
}

/// Scalar types a [`ValueData`] buffer can hold.
pub trait ValueScalar: Clone + Send + Sync + 'static {
    const KIND: ScalarKind;

    fn wrap(data: Shared<Self>) -> ValueData;
    fn slice(data: &ValueData) -> Option<&[Self]>;
    fn slice_mut(data: &mut ValueData) -> Option<&mut [Self]>;
}

macro_rules! impl_value_scalar {
    ($ty:ty, $variant:ident, $kind:expr) => {
        impl ValueScalar for $ty {
            const KIND: ScalarKind = $kind;

            #[inline]
            fn wrap(data: Shared<Self>) -> ValueData {
                ValueData::$variant(data)
            }

            #[inline]
            fn slice(data: &ValueData) -> Option<&[Self]> {
                match data {
                    ValueData::$variant(v) => Some(v.as_slice()),
                    _ => None,
                }
            }

            #[inline]
            fn slice_mut(data: &mut ValueData) -> Option<&mut [Self]> {
                match data {
                    ValueData::$variant(v) => Some(Arc::make_mut(v).as_mut_slice()),
                    _ => None,
                }
            }
        }
    };
}

impl_value_scalar!(Bool, Bool, ScalarKind::Bool);
impl_value_scalar!(i32, Int, ScalarKind::Int);
impl_value_scalar!(f32, Float, ScalarKind::Float);
impl_value_scalar!(String, String, ScalarKind::String);

impl<T: ValueScalar> From<Vec<T>> for ValueData {
    fn from(v: Vec<T>) -> Self {
        T::wrap(Arc::new(v))
    }
}

impl<T: ValueScalar> From<Shared<T>> for ValueData {
    fn from(v: Shared<T>) -> Self {
        T::wrap(v)
    }
}

impl<T: ValueScalar> From<&[T]> for ValueData {
    fn from(v: &[T]) -> Self {
        Self::copied(v)
    }
}

impl From<Vec<bool>> for ValueData {
    fn from(v: Vec<bool>) -> Self {
        Self::Bool(Arc::new(v.into_iter().map(Bool::new).collect()))
    }
}

/// Single convenience value for `(name, value)` style calls.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i32),
    Float(f32),
    String(String),
}

impl Scalar {
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Bool(_) => ElementType::Bool,
            Self::Int(_) => ElementType::Int,
            Self::Float(_) => ElementType::Float,
            Self::String(_) => ElementType::String,
        }
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for Scalar {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

/// Named, typed, storage-classed value buffer.
#[derive(Clone, Debug)]
pub struct TypedValue {
    name: String,
    class: StorageClass,
    ty: ElementType,
    count: usize,
    data: ValueData,
}

impl Default for TypedValue {
    fn default() -> Self {
        Self {
            name: UNNAMED.to_string(),
            class: StorageClass::Undefined,
            ty: ElementType::Undefined,
            count: 0,
            data: ValueData::Unset,
        }
    }
}

impl TypedValue {
    /// Create a value, checking that `data` holds whole elements of `ty`.
    pub fn new(
        name: impl Into<String>,
        class: StorageClass,
        ty: ElementType,
        data: impl Into<ValueData>,
    ) -> Result<Self> {
        let data = data.into();
        let count = element_count(ty, &data)?;
        Ok(Self { name: name.into(), class, ty, count, data })
    }

    /// Array value with defaults: unnamed, vertex class, type inferred from
    /// the scalar kind (float data becomes `float`).
    pub fn array(data: impl Into<ValueData>) -> Self {
        let data = data.into();
        let ty = match data.kind() {
            None => ElementType::Undefined,
            Some(ScalarKind::Bool) => ElementType::Bool,
            Some(ScalarKind::Int) => ElementType::Int,
            Some(ScalarKind::Float) => ElementType::Float,
            Some(ScalarKind::String) => ElementType::String,
        };
        let count = data.len();
        Self { name: UNNAMED.to_string(), class: StorageClass::Vertex, ty, count, data }
    }

    /// Constant single value.
    pub fn scalar(name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        let data = match value.into() {
            Scalar::Bool(v) => ValueData::from(vec![Bool::new(v)]),
            Scalar::Int(v) => ValueData::from(vec![v]),
            Scalar::Float(v) => ValueData::from(vec![v]),
            Scalar::String(v) => ValueData::from(vec![v]),
        };
        let mut value = Self::array(data);
        value.name = name.into();
        value.class = StorageClass::Constant;
        value
    }

    pub fn from_bool(name: impl Into<String>, v: bool) -> Self {
        Self::scalar(name, v)
    }

    pub fn from_int(name: impl Into<String>, v: i32) -> Self {
        Self::scalar(name, v)
    }

    pub fn from_float(name: impl Into<String>, v: f32) -> Self {
        Self::scalar(name, v)
    }

    pub fn from_string(name: impl Into<String>, v: impl Into<String>) -> Self {
        Self::scalar(name, Scalar::String(v.into()))
    }

    /// Points/vectors/normals copied from glam vectors.
    pub fn from_vec3(
        name: impl Into<String>,
        class: StorageClass,
        ty: ElementType,
        src: &[Vec3],
    ) -> Result<Self> {
        Self::new(name, class, ty, ValueData::from_vec3(src))
    }

    /// Builder: rename.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder: reclassify.
    pub fn with_class(mut self, class: StorageClass) -> Self {
        self.class = class;
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> StorageClass {
        self.class
    }

    pub fn element_type(&self) -> ElementType {
        self.ty
    }

    /// Number of elements.
    pub fn size(&self) -> usize {
        self.count
    }

    /// Total payload size: elements * components * scalar bytes.
    pub fn byte_size(&self) -> usize {
        self.count * self.ty.components() * self.ty.scalar_bytes()
    }

    pub fn data(&self) -> &ValueData {
        &self.data
    }

    /// Empty iff there are no elements or no buffer.
    pub fn is_empty(&self) -> bool {
        self.count == 0 || self.data.is_unset()
    }

    /// Valid iff named and typed.
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && self.ty.is_defined()
    }

    /// Whole buffer as scalars of `T`.
    pub fn as_slice<T: ValueScalar>(&self) -> Option<&[T]> {
        T::slice(&self.data)
    }

    /// First scalar, handy for constant values.
    pub fn first<T: ValueScalar>(&self) -> Option<&T> {
        self.as_slice::<T>().and_then(|s| s.first())
    }

    /// Components of element `index`.
    pub fn element<T: ValueScalar>(&self, index: usize) -> Option<&[T]> {
        let range = self.element_range(index)?;
        self.as_slice::<T>()?.get(range)
    }

    /// Mutable components of element `index` (copy-on-write when shared).
    pub fn element_mut<T: ValueScalar>(&mut self, index: usize) -> Option<&mut [T]> {
        let range = self.element_range(index)?;
        T::slice_mut(&mut self.data)?.get_mut(range)
    }

    /// Raw bytes of element `index`; `None` for strings.
    pub fn element_bytes(&self, index: usize) -> Option<&[u8]> {
        let range = self.element_byte_range(index)?;
        self.data.bytes()?.get(range)
    }

    /// Mutable raw bytes of element `index` (copy-on-write when shared).
    pub fn element_bytes_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        let range = self.element_byte_range(index)?;
        self.data.bytes_mut()?.get_mut(range)
    }

    fn element_range(&self, index: usize) -> Option<std::ops::Range<usize>> {
        if index >= self.count {
            return None;
        }
        let n = self.ty.components();
        Some(index * n..(index + 1) * n)
    }

    fn element_byte_range(&self, index: usize) -> Option<std::ops::Range<usize>> {
        if index >= self.count {
            return None;
        }
        let n = self.ty.num_bytes();
        Some(index * n..(index + 1) * n)
    }

    // ------------------------------------------------------------------
    // Mutators
    // ------------------------------------------------------------------

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_class(&mut self, class: StorageClass) {
        self.class = class;
    }

    /// Reinterpret the buffer as another type of the same scalar kind.
    ///
    /// Fails (leaving the value untouched) when the scalar kinds differ or
    /// the buffer is not a whole number of the new elements.
    pub fn set_type(&mut self, ty: ElementType) -> Result<()> {
        self.count = element_count(ty, &self.data)?;
        self.ty = ty;
        Ok(())
    }

    /// Replace the buffer, keeping name, class and type.
    pub fn set_data(&mut self, data: impl Into<ValueData>) -> Result<()> {
        let data = data.into();
        self.count = element_count(self.ty, &data)?;
        self.data = data;
        Ok(())
    }

    /// Reallocate to `n` zeroed elements of the current type.
    pub fn resize(&mut self, n: usize) -> Result<()> {
        let kind = self.ty.scalar_kind().ok_or(Error::UndefinedType)?;
        self.data = ValueData::zeroed(kind, n * self.ty.components());
        self.count = n;
        Ok(())
    }

    /// Drop the buffer.
    pub fn clear(&mut self) {
        self.data = ValueData::Unset;
        self.count = 0;
    }

    // ------------------------------------------------------------------
    // Textual forms
    // ------------------------------------------------------------------

    /// Contents as decimal text: one element per line, components
    /// separated by single spaces, in storage order.
    pub fn data_as_string(&self) -> String {
        let n = self.ty.components().max(1);
        let mut out = String::new();
        match &self.data {
            ValueData::Unset => {}
            ValueData::Bool(v) => write_rows(&mut out, v, n, |o, b| {
                let _ = write!(o, "{}", b.get() as u8);
            }),
            ValueData::Int(v) => write_rows(&mut out, v, n, |o, i| {
                let _ = write!(o, "{i}");
            }),
            ValueData::Float(v) => write_rows(&mut out, v, n, |o, f| {
                let _ = write!(o, "{f}");
            }),
            ValueData::String(v) => write_rows(&mut out, v, n, |o, s| o.push_str(s)),
        }
        out
    }

    /// Self-describing record:
    /// `<attrib name=".." type=".." size="N">values</attrib>`.
    pub fn to_xml(&self) -> String {
        format!(
            "<attrib name=\"{}\" type=\"{}\" size=\"{}\">{}</attrib>",
            escape_xml(&self.name),
            self.ty.name(),
            self.count,
            escape_xml(&self.data_as_string()),
        )
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}[{}]", self.class, self.ty, self.name, self.count)
    }
}

fn element_count(ty: ElementType, data: &ValueData) -> Result<usize> {
    let Some(kind) = data.kind() else {
        return Ok(0);
    };
    let expected = ty.scalar_kind().ok_or(Error::UndefinedType)?;
    if expected != kind {
        return Err(Error::TypeMismatch {
            expected: expected.name().to_string(),
            actual: kind.name().to_string(),
        });
    }
    let n = ty.components();
    if data.len() % n != 0 {
        return Err(Error::SizeMismatch { expected: n, actual: data.len() });
    }
    Ok(data.len() / n)
}

fn write_rows<T>(out: &mut String, values: &[T], per_row: usize, mut put: impl FnMut(&mut String, &T)) {
    for (row, chunk) in values.chunks(per_row).enumerate() {
        if row > 0 {
            out.push('\n');
        }
        for (i, v) in chunk.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            put(out, v);
        }
    }
}

pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_size_invariant() {
        for ty in ElementType::ALL {
            let Some(kind) = ty.scalar_kind() else { continue };
            let n = 7;
            let data = ValueData::zeroed(kind, n * ty.components());
            let v = TypedValue::new("v", StorageClass::Vertex, ty, data).unwrap();
            assert_eq!(v.size(), n, "{ty}");
            assert_eq!(v.byte_size(), n * ty.components() * kind.num_bytes(), "{ty}");
        }
    }

    #[test]
    fn test_float_roundtrip_through_accessor() {
        let src = [0.1f32, -2.5, 3.25, 1e-7, 42.0, f32::MAX];
        let v = TypedValue::new("P", StorageClass::Vertex, ElementType::Point, &src[..]).unwrap();
        assert_eq!(v.size(), 2);
        let mut back = Vec::new();
        for i in 0..v.size() {
            back.extend_from_slice(v.element::<f32>(i).unwrap());
        }
        assert_eq!(back, src);
        assert!(v.element::<f32>(2).is_none());
        assert!(v.element::<i32>(0).is_none());
    }

    #[test]
    fn test_element_bytes() {
        let v = TypedValue::array(vec![1i32, 2, 3]);
        assert_eq!(v.element_bytes(1).unwrap(), &2i32.to_ne_bytes());
        assert!(v.element_bytes(3).is_none());

        let s = TypedValue::from_string("name", "x");
        assert!(s.element_bytes(0).is_none());
    }

    #[test]
    fn test_patch_element_bytes() {
        let mut v = TypedValue::new("Cs", StorageClass::Vertex, ElementType::Float, vec![0.0f32; 3]).unwrap();
        v.element_bytes_mut(1).unwrap().copy_from_slice(&5.0f32.to_ne_bytes());
        assert_eq!(v.as_slice::<f32>().unwrap(), &[0.0, 5.0, 0.0]);
    }

    #[test]
    fn test_data_as_string_point() {
        let v = TypedValue::new("P", StorageClass::Vertex, ElementType::Point, vec![1.0f32, 2.0, 3.0]).unwrap();
        let text = v.data_as_string();
        let parsed: Vec<f32> = text.split_whitespace().map(|s| s.parse().unwrap()).collect();
        assert_eq!(parsed.len(), 3);
        for (a, b) in parsed.iter().zip([1.0f32, 2.0, 3.0]) {
            assert!((a - b).abs() <= f32::EPSILON);
        }
    }

    #[test]
    fn test_data_as_string_rows() {
        let v = TypedValue::new("P", StorageClass::Vertex, ElementType::Point, vec![0.0f32, 0.5, 1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(v.data_as_string(), "0 0.5 1\n2 3 4");

        let b = TypedValue::array(vec![true, false]);
        assert_eq!(b.data_as_string(), "1\n0");

        let m = TypedValue::new("xf", StorageClass::Constant, ElementType::Matrix, ValueData::from_matrices(&[Mat4::IDENTITY])).unwrap();
        assert_eq!(m.data_as_string().split(' ').count(), 16);
    }

    #[test]
    fn test_xml_record() {
        let v = TypedValue::new("width", StorageClass::Varying, ElementType::Float, vec![0.5f32, 1.0]).unwrap();
        assert_eq!(v.to_xml(), "<attrib name=\"width\" type=\"float\" size=\"2\">0.5\n1</attrib>");

        let s = TypedValue::from_string("label", "a<b");
        assert_eq!(s.to_xml(), "<attrib name=\"label\" type=\"string\" size=\"1\">a&lt;b</attrib>");
    }

    #[test]
    fn test_scalar_constructors() {
        let f = TypedValue::from_float("Kd", 0.8);
        assert_eq!(f.class(), StorageClass::Constant);
        assert_eq!(f.element_type(), ElementType::Float);
        assert_eq!(f.first::<f32>(), Some(&0.8));

        let b = TypedValue::from_bool("visible", true);
        assert_eq!(b.first::<Bool>().map(|b| b.get()), Some(true));

        let i = TypedValue::from_int("samples", 4);
        assert_eq!(i.byte_size(), 4);
    }

    #[test]
    fn test_array_defaults() {
        let v = TypedValue::array(vec![1.0f32, 2.0]);
        assert_eq!(v.name(), UNNAMED);
        assert_eq!(v.class(), StorageClass::Vertex);
        assert_eq!(v.element_type(), ElementType::Float);
        assert!(v.is_valid());
    }

    #[test]
    fn test_empty_and_valid() {
        let v = TypedValue::default();
        assert!(v.is_empty());
        assert!(!v.is_valid());

        let v = TypedValue::array(Vec::<f32>::new());
        assert!(v.is_empty());
        assert!(v.is_valid());

        let v = TypedValue::from_float("", 1.0);
        assert!(!v.is_valid());
    }

    #[test]
    fn test_constructor_rejects_partial_elements() {
        let err = TypedValue::new("P", StorageClass::Vertex, ElementType::Point, vec![1.0f32, 2.0]).unwrap_err();
        assert!(matches!(err, Error::SizeMismatch { expected: 3, actual: 2 }));

        let err = TypedValue::new("P", StorageClass::Vertex, ElementType::Point, vec![1i32, 2, 3]).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_resize() {
        let mut v = TypedValue::new("Cs", StorageClass::Vertex, ElementType::Color, vec![1.0f32; 4]).unwrap();
        v.resize(3).unwrap();
        assert_eq!(v.size(), 3);
        assert_eq!(v.as_slice::<f32>().unwrap(), &[0.0; 12]);

        let mut undefined = TypedValue::default();
        assert!(matches!(undefined.resize(2), Err(Error::UndefinedType)));
    }

    #[test]
    fn test_set_type() {
        let mut v = TypedValue::array(vec![0.0f32; 6]);
        v.set_type(ElementType::Normal).unwrap();
        assert_eq!(v.size(), 2);

        assert!(v.set_type(ElementType::Color).is_err());
        assert_eq!(v.element_type(), ElementType::Normal);
        assert_eq!(v.size(), 2);
    }

    #[test]
    fn test_transfer_does_not_copy() {
        let buffer: Shared<f32> = Arc::new(vec![1.0, 2.0, 3.0]);
        let a = TypedValue::new("a", StorageClass::Vertex, ElementType::Float, Arc::clone(&buffer)).unwrap();
        let b = TypedValue::new("b", StorageClass::Vertex, ElementType::Float, Arc::clone(&buffer)).unwrap();
        assert!(a.data().ptr_eq(b.data()));
        assert_eq!(a.data().holders(), 3);

        drop(buffer);
        drop(a);
        assert_eq!(b.data().holders(), 1);
        assert_eq!(b.as_slice::<f32>().unwrap(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_copy_on_write_when_shared() {
        let a = TypedValue::array(vec![1.0f32, 2.0]);
        let mut b = a.clone();
        assert!(a.data().ptr_eq(b.data()));

        b.element_mut::<f32>(0).unwrap()[0] = 9.0;
        assert!(!a.data().ptr_eq(b.data()));
        assert_eq!(a.as_slice::<f32>().unwrap(), &[1.0, 2.0]);
        assert_eq!(b.as_slice::<f32>().unwrap(), &[9.0, 2.0]);
    }

    #[test]
    fn test_reclassify_mid_build() {
        let mut v = TypedValue::array(vec![0.1f32, 0.2]).named("radius");
        v.set_name("width");
        v.set_class(StorageClass::Varying);
        assert_eq!(v.name(), "width");
        assert_eq!(v.class(), StorageClass::Varying);
        assert_eq!(v.to_string(), "varying float width[2]");
    }
}
