//! Generic typed property store.
//!
//! A property set maps string keys to exactly four slots. The first access to
//! a key fixes the slot type; later accesses through another accessor type
//! are rejected instead of coerced. Reading a key that was never written
//! materializes it with default values, which plugins rely on.

use std::collections::HashMap;
use std::ffi::{CStr, CString, c_void};
use std::ptr;

use crate::error::{Error, Result};

/// Number of slots behind every key.
pub const SLOT_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Pointer,
    String,
    Double,
    Int,
}

impl PropertyKind {
    pub fn label(self) -> &'static str {
        match self {
            PropertyKind::Pointer => "pointer",
            PropertyKind::String => "string",
            PropertyKind::Double => "double",
            PropertyKind::Int => "int",
        }
    }
}

/// Tagged storage of the four slots of one key.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertySlots {
    Pointer([*mut c_void; SLOT_COUNT]),
    String([CString; SLOT_COUNT]),
    Double([f64; SLOT_COUNT]),
    Int([i32; SLOT_COUNT]),
}

impl PropertySlots {
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertySlots::Pointer(_) => PropertyKind::Pointer,
            PropertySlots::String(_) => PropertyKind::String,
            PropertySlots::Double(_) => PropertyKind::Double,
            PropertySlots::Int(_) => PropertyKind::Int,
        }
    }
}

/// A value type that can live in a property slot.
pub trait PropertyValue: Clone + Sized {
    const KIND: PropertyKind;

    fn defaults() -> PropertySlots;
    fn slots(slots: &PropertySlots) -> Option<&[Self; SLOT_COUNT]>;
    fn slots_mut(slots: &mut PropertySlots) -> Option<&mut [Self; SLOT_COUNT]>;
}

macro_rules! property_value {
    ($ty:ty, $variant:ident, $default:expr) => {
        impl PropertyValue for $ty {
            const KIND: PropertyKind = PropertyKind::$variant;

            fn defaults() -> PropertySlots {
                PropertySlots::$variant(std::array::from_fn(|_| $default))
            }

            fn slots(slots: &PropertySlots) -> Option<&[Self; SLOT_COUNT]> {
                match slots {
                    PropertySlots::$variant(values) => Some(values),
                    _ => None,
                }
            }

            fn slots_mut(slots: &mut PropertySlots) -> Option<&mut [Self; SLOT_COUNT]> {
                match slots {
                    PropertySlots::$variant(values) => Some(values),
                    _ => None,
                }
            }
        }
    };
}

property_value!(*mut c_void, Pointer, ptr::null_mut());
property_value!(CString, String, CString::default());
property_value!(f64, Double, 0.0);
property_value!(i32, Int, 0);

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    slots: PropertySlots,
    /// One past the highest slot ever written.
    dimension: usize,
}

impl Property {
    fn new<T: PropertyValue>() -> Self {
        Self {
            slots: T::defaults(),
            dimension: 0,
        }
    }

    pub fn kind(&self) -> PropertyKind {
        self.slots.kind()
    }

    pub fn slots(&self) -> &PropertySlots {
        &self.slots
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertySet {
    entries: HashMap<String, Property>,
}

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn property(&self, key: &str) -> Option<&Property> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Overwrite one slot, materializing the key if needed.
    pub fn set<T: PropertyValue>(&mut self, key: &str, index: usize, value: T) -> Result<()> {
        let index = check_index(index)?;
        let property = self.entry::<T>(key)?;
        typed_mut::<T>(key, &mut property.slots)?[index] = value;
        property.dimension = property.dimension.max(index + 1);
        Ok(())
    }

    /// Overwrite the first `values.len()` slots.
    pub fn set_all<T: PropertyValue>(&mut self, key: &str, values: &[T]) -> Result<()> {
        if values.len() > SLOT_COUNT {
            return Err(Error::BadIndex(values.len() as i64 - 1));
        }
        let property = self.entry::<T>(key)?;
        let slots = typed_mut::<T>(key, &mut property.slots)?;
        slots[..values.len()].clone_from_slice(values);
        property.dimension = property.dimension.max(values.len());
        Ok(())
    }

    /// Read one slot. A key that was never written is materialized with the
    /// accessor's defaults.
    pub fn get<T: PropertyValue>(&mut self, key: &str, index: usize) -> Result<&T> {
        let index = check_index(index)?;
        let property = self.entry::<T>(key)?;
        let slots = T::slots(&property.slots).ok_or_else(|| mismatch::<T>(key, property.kind()))?;
        Ok(&slots[index])
    }

    /// Read one slot without materializing the key.
    pub fn peek<T: PropertyValue>(&self, key: &str, index: usize) -> Result<Option<&T>> {
        let index = check_index(index)?;
        let Some(property) = self.entries.get(key) else {
            return Ok(None);
        };
        let slots = T::slots(&property.slots).ok_or_else(|| mismatch::<T>(key, property.kind()))?;
        Ok(Some(&slots[index]))
    }

    /// Restore every slot of an existing key to its default value.
    pub fn reset(&mut self, key: &str) -> Result<()> {
        let property = self
            .entries
            .get_mut(key)
            .ok_or_else(|| Error::UnknownProperty(key.to_string()))?;
        property.slots = match property.kind() {
            PropertyKind::Pointer => <*mut c_void>::defaults(),
            PropertyKind::String => CString::defaults(),
            PropertyKind::Double => f64::defaults(),
            PropertyKind::Int => i32::defaults(),
        };
        Ok(())
    }

    pub fn dimension(&self, key: &str) -> Result<usize> {
        self.entries
            .get(key)
            .map(Property::dimension)
            .ok_or_else(|| Error::UnknownProperty(key.to_string()))
    }

    pub fn set_int(&mut self, key: &str, index: usize, value: i32) -> Result<()> {
        self.set(key, index, value)
    }

    pub fn set_double(&mut self, key: &str, index: usize, value: f64) -> Result<()> {
        self.set(key, index, value)
    }

    pub fn set_pointer(&mut self, key: &str, index: usize, value: *mut c_void) -> Result<()> {
        self.set(key, index, value)
    }

    pub fn set_str(&mut self, key: &str, index: usize, value: &str) -> Result<()> {
        let value = CString::new(value).map_err(|err| Error::InvalidValue(err.to_string()))?;
        self.set(key, index, value)
    }

    /// Host-side read of an int slot; unset keys read as 0.
    pub fn int(&self, key: &str, index: usize) -> Result<i32> {
        Ok(self.peek::<i32>(key, index)?.copied().unwrap_or_default())
    }

    pub fn double(&self, key: &str, index: usize) -> Result<f64> {
        Ok(self.peek::<f64>(key, index)?.copied().unwrap_or_default())
    }

    pub fn pointer(&self, key: &str, index: usize) -> Result<*mut c_void> {
        Ok(self
            .peek::<*mut c_void>(key, index)?
            .copied()
            .unwrap_or(ptr::null_mut()))
    }

    /// Host-side read of a string slot; unset keys read as "".
    pub fn string(&self, key: &str, index: usize) -> Result<&CStr> {
        Ok(self
            .peek::<CString>(key, index)?
            .map(CString::as_c_str)
            .unwrap_or_default())
    }

    fn entry<T: PropertyValue>(&mut self, key: &str) -> Result<&mut Property> {
        if !self.entries.contains_key(key) {
            self.entries.insert(key.to_string(), Property::new::<T>());
        }
        let property = self
            .entries
            .get_mut(key)
            .ok_or_else(|| Error::UnknownProperty(key.to_string()))?;
        if property.kind() != T::KIND {
            return Err(mismatch::<T>(key, property.kind()));
        }
        Ok(property)
    }
}

fn check_index(index: usize) -> Result<usize> {
    if index < SLOT_COUNT {
        Ok(index)
    } else {
        Err(Error::BadIndex(index as i64))
    }
}

fn typed_mut<'a, T: PropertyValue>(
    key: &str,
    slots: &'a mut PropertySlots,
) -> Result<&'a mut [T; SLOT_COUNT]> {
    let found = slots.kind();
    T::slots_mut(slots).ok_or_else(|| mismatch::<T>(key, found))
}

fn mismatch<T: PropertyValue>(key: &str, found: PropertyKind) -> Error {
    Error::TypeMismatch {
        key: key.to_string(),
        expected: T::KIND.label(),
        found: found.label(),
    }
}
