//! Attribute maps - ordered, name-deduplicated value collections.
//!
//! The first value stored under a name wins. Hierarchies are flattened by
//! inserting the child layer first and letting ancestor layers fill only
//! the names still unset ([`AttributeMap::merge_layer`]).

use std::collections::HashMap;

use super::value::TypedValue;

/// Insertion-ordered set of values keyed by name.
#[derive(Clone, Debug, Default)]
pub struct AttributeMap {
    values: Vec<TypedValue>,
    index: HashMap<String, usize>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the name is taken. Returns whether it was stored.
    pub fn insert(&mut self, value: TypedValue) -> bool {
        if self.index.contains_key(value.name()) {
            return false;
        }
        self.index.insert(value.name().to_string(), self.values.len());
        self.values.push(value);
        true
    }

    /// Fill names not yet present from a lower-priority layer.
    /// Returns how many values were taken over.
    pub fn merge_layer<I>(&mut self, layer: I) -> usize
    where
        I: IntoIterator<Item = TypedValue>,
    {
        let mut taken = 0;
        for value in layer {
            if self.insert(value) {
                taken += 1;
            }
        }
        taken
    }

    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.index.get(name).map(|&i| &self.values[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut TypedValue> {
        let i = *self.index.get(name)?;
        self.values.get_mut(i)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Remove by name, keeping the order of the rest.
    pub fn remove(&mut self, name: &str) -> Option<TypedValue> {
        let i = self.index.remove(name)?;
        let value = self.values.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(value)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TypedValue> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.index.clear();
    }

    pub fn as_slice(&self) -> &[TypedValue] {
        &self.values
    }

    /// All records, one `<attrib>` element per line.
    pub fn to_xml(&self) -> String {
        self.values.iter().map(TypedValue::to_xml).collect::<Vec<_>>().join("\n")
    }
}

impl FromIterator<TypedValue> for AttributeMap {
    fn from_iter<T: IntoIterator<Item = TypedValue>>(iter: T) -> Self {
        let mut map = Self::new();
        map.merge_layer(iter);
        map
    }
}

impl IntoIterator for AttributeMap {
    type Item = TypedValue;
    type IntoIter = std::vec::IntoIter<TypedValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a AttributeMap {
    type Item = &'a TypedValue;
    type IntoIter = std::slice::Iter<'a, TypedValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_writer_wins() {
        let mut map = AttributeMap::new();
        assert!(map.insert(TypedValue::from_float("Kd", 0.5)));
        assert!(!map.insert(TypedValue::from_float("Kd", 0.9)));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("Kd").and_then(|v| v.first::<f32>()), Some(&0.5));
    }

    #[test]
    fn test_layered_merge() {
        let mut map: AttributeMap = [
            TypedValue::from_float("Kd", 0.5),
            TypedValue::from_int("samples", 2),
        ]
        .into_iter()
        .collect();

        let parent = vec![
            TypedValue::from_float("Kd", 1.0),
            TypedValue::from_string("group", "hero"),
        ];
        assert_eq!(map.merge_layer(parent), 1);

        let names: Vec<&str> = map.iter().map(|v| v.name()).collect();
        assert_eq!(names, ["Kd", "samples", "group"]);
        assert_eq!(map.get("Kd").and_then(|v| v.first::<f32>()), Some(&0.5));
    }

    #[test]
    fn test_remove_keeps_index() {
        let mut map: AttributeMap = ["a", "b", "c"]
            .into_iter()
            .map(|n| TypedValue::from_int(n, 1))
            .collect();
        assert!(map.remove("a").is_some());
        assert!(map.remove("a").is_none());
        assert_eq!(map.get("c").map(|v| v.name()), Some("c"));
        assert!(map.insert(TypedValue::from_int("a", 2)));
        assert_eq!(map.as_slice().last().map(|v| v.name()), Some("a"));
    }

    #[test]
    fn test_to_xml() {
        let map: AttributeMap = [TypedValue::from_int("a", 1), TypedValue::from_bool("b", true)]
            .into_iter()
            .collect();
        assert_eq!(
            map.to_xml(),
            "<attrib name=\"a\" type=\"int\" size=\"1\">1</attrib>\n<attrib name=\"b\" type=\"bool\" size=\"1\">1</attrib>"
        );
    }
}
