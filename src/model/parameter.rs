//! Parameter definitions and values.
//!
//! Values are stored according to the type table of the protocol:
//!
//! | type                                              | components        |
//! |---------------------------------------------------|-------------------|
//! | Integer, Choice, Custom, Group, Page, PushButton  | 1 × int           |
//! | Double                                            | 1 × double        |
//! | Boolean                                           | 1 × bool          |
//! | RGBA                                              | 4 × double        |
//! | RGB, Double3D                                     | 3 × double        |
//! | Double2D                                          | 2 × double        |
//! | Integer2D                                         | 2 × int           |
//! | Integer3D                                         | 3 × int           |
//! | String                                            | 1 × `const char*` |

use std::ffi::{CStr, CString, c_char, c_int, c_void};

use smallvec::SmallVec;

use crate::constants::*;
use crate::error::{Error, Result};
use crate::model::property::{PropertySet, PropertySlots};
use crate::model::registry::{ObjectKey, Registry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    Integer,
    Double,
    Boolean,
    Choice,
    Rgba,
    Rgb,
    Double2D,
    Integer2D,
    Double3D,
    Integer3D,
    String,
    Custom,
    Group,
    Page,
    PushButton,
}

/// Storage of a single parameter component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamScalar {
    Int,
    Double,
    Boolean,
    String,
}

impl ParamType {
    pub const ALL: [ParamType; 15] = [
        ParamType::Integer,
        ParamType::Double,
        ParamType::Boolean,
        ParamType::Choice,
        ParamType::Rgba,
        ParamType::Rgb,
        ParamType::Double2D,
        ParamType::Integer2D,
        ParamType::Double3D,
        ParamType::Integer3D,
        ParamType::String,
        ParamType::Custom,
        ParamType::Group,
        ParamType::Page,
        ParamType::PushButton,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            ParamType::Integer => PARAM_TYPE_INTEGER,
            ParamType::Double => PARAM_TYPE_DOUBLE,
            ParamType::Boolean => PARAM_TYPE_BOOLEAN,
            ParamType::Choice => PARAM_TYPE_CHOICE,
            ParamType::Rgba => PARAM_TYPE_RGBA,
            ParamType::Rgb => PARAM_TYPE_RGB,
            ParamType::Double2D => PARAM_TYPE_DOUBLE_2D,
            ParamType::Integer2D => PARAM_TYPE_INTEGER_2D,
            ParamType::Double3D => PARAM_TYPE_DOUBLE_3D,
            ParamType::Integer3D => PARAM_TYPE_INTEGER_3D,
            ParamType::String => PARAM_TYPE_STRING,
            ParamType::Custom => PARAM_TYPE_CUSTOM,
            ParamType::Group => PARAM_TYPE_GROUP,
            ParamType::Page => PARAM_TYPE_PAGE,
            ParamType::PushButton => PARAM_TYPE_PUSH_BUTTON,
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.tag() == tag)
    }

    /// Tag without the `OfxParamType` prefix, for display.
    pub fn short_name(self) -> &'static str {
        self.tag().trim_start_matches("OfxParamType")
    }

    pub fn layout(self) -> (ParamScalar, usize) {
        match self {
            ParamType::Integer
            | ParamType::Choice
            | ParamType::Custom
            | ParamType::Group
            | ParamType::Page
            | ParamType::PushButton => (ParamScalar::Int, 1),
            ParamType::Double => (ParamScalar::Double, 1),
            ParamType::Boolean => (ParamScalar::Boolean, 1),
            ParamType::Rgba => (ParamScalar::Double, 4),
            ParamType::Rgb | ParamType::Double3D => (ParamScalar::Double, 3),
            ParamType::Double2D => (ParamScalar::Double, 2),
            ParamType::Integer2D => (ParamScalar::Int, 2),
            ParamType::Integer3D => (ParamScalar::Int, 3),
            ParamType::String => (ParamScalar::String, 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(SmallVec<[i32; 4]>),
    Double(SmallVec<[f64; 4]>),
    Boolean(bool),
    String(CString),
}

impl ParamValue {
    /// Zero value of a type.
    pub fn zero(ty: ParamType) -> Self {
        match ty.layout() {
            (ParamScalar::Int, n) => ParamValue::Int(SmallVec::from_elem(0, n)),
            (ParamScalar::Double, n) => ParamValue::Double(SmallVec::from_elem(0.0, n)),
            (ParamScalar::Boolean, _) => ParamValue::Boolean(false),
            (ParamScalar::String, _) => ParamValue::String(CString::default()),
        }
    }

    pub fn ints(values: &[i32]) -> Self {
        ParamValue::Int(SmallVec::from_slice(values))
    }

    pub fn doubles(values: &[f64]) -> Self {
        ParamValue::Double(SmallVec::from_slice(values))
    }

    pub fn text(value: &str) -> Result<Self> {
        CString::new(value)
            .map(ParamValue::String)
            .map_err(|err| Error::InvalidValue(err.to_string()))
    }

    /// Whether this value has the shape the type table prescribes for `ty`.
    pub fn conforms_to(&self, ty: ParamType) -> bool {
        match (ty.layout(), self) {
            ((ParamScalar::Int, n), ParamValue::Int(values)) => values.len() == n,
            ((ParamScalar::Double, n), ParamValue::Double(values)) => values.len() == n,
            ((ParamScalar::Boolean, _), ParamValue::Boolean(_)) => true,
            ((ParamScalar::String, _), ParamValue::String(_)) => true,
            _ => false,
        }
    }

    pub fn as_doubles(&self) -> Option<&[f64]> {
        match self {
            ParamValue::Double(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_ints(&self) -> Option<&[i32]> {
        match self {
            ParamValue::Int(values) => Some(values),
            _ => None,
        }
    }

    /// Value taken from `OfxParamPropDefault`, or the zero value when the
    /// default is absent or stored with an incompatible slot type. Int
    /// defaults widen into double parameters.
    pub fn from_default(ty: ParamType, props: &PropertySet) -> Self {
        let Some(default) = props.property(PARAM_PROP_DEFAULT) else {
            return Self::zero(ty);
        };
        match (ty.layout(), default.slots()) {
            ((ParamScalar::Int, n), PropertySlots::Int(values)) => Self::ints(&values[..n]),
            ((ParamScalar::Double, n), PropertySlots::Double(values)) => {
                Self::doubles(&values[..n])
            }
            ((ParamScalar::Double, n), PropertySlots::Int(values)) => {
                ParamValue::Double(values[..n].iter().map(|&v| f64::from(v)).collect())
            }
            ((ParamScalar::Boolean, _), PropertySlots::Int(values)) => {
                ParamValue::Boolean(values[0] != 0)
            }
            ((ParamScalar::String, _), PropertySlots::String(values)) => {
                ParamValue::String(values[0].clone())
            }
            (_, slots) => {
                tracing::warn!(
                    "ignoring {:?} default for {} parameter",
                    slots.kind(),
                    ty.short_name()
                );
                Self::zero(ty)
            }
        }
    }

    /// Copy the components out to plugin memory.
    ///
    /// # Safety
    ///
    /// `dst` must be valid for writes of every component of this value laid
    /// out contiguously. String values write a pointer that stays valid until
    /// the parameter value changes.
    pub unsafe fn write_to(&self, dst: *mut c_void) {
        // SAFETY: the caller guarantees room for every component.
        unsafe {
            match self {
                ParamValue::Int(values) => {
                    let dst = dst.cast::<c_int>();
                    for (i, value) in values.iter().enumerate() {
                        dst.add(i).write_unaligned(*value);
                    }
                }
                ParamValue::Double(values) => {
                    let dst = dst.cast::<f64>();
                    for (i, value) in values.iter().enumerate() {
                        dst.add(i).write_unaligned(*value);
                    }
                }
                ParamValue::Boolean(value) => dst.cast::<bool>().write(*value),
                ParamValue::String(value) => {
                    dst.cast::<*const c_char>().write_unaligned(value.as_ptr())
                }
            }
        }
    }

    /// Read a value of type `ty` from plugin memory.
    ///
    /// # Safety
    ///
    /// `src` must be valid for reads of every component of `ty`. For strings
    /// it must hold a null or nul-terminated string pointer.
    pub unsafe fn read_from(ty: ParamType, src: *const c_void) -> Result<Self> {
        // SAFETY: the caller guarantees every component is readable.
        unsafe {
            Ok(match ty.layout() {
                (ParamScalar::Int, n) => {
                    let src = src.cast::<c_int>();
                    ParamValue::Int((0..n).map(|i| src.add(i).read_unaligned()).collect())
                }
                (ParamScalar::Double, n) => {
                    let src = src.cast::<f64>();
                    ParamValue::Double((0..n).map(|i| src.add(i).read_unaligned()).collect())
                }
                (ParamScalar::Boolean, _) => ParamValue::Boolean(src.cast::<u8>().read() != 0),
                (ParamScalar::String, _) => {
                    let text = src.cast::<*const c_char>().read_unaligned();
                    if text.is_null() {
                        return Err(Error::InvalidValue("null string".to_string()));
                    }
                    ParamValue::String(CStr::from_ptr(text).to_owned())
                }
            })
        }
    }
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: ParamType,
    pub value: ParamValue,
    pub props: ObjectKey,
}

#[derive(Debug, Clone)]
pub struct ParamSet {
    pub props: ObjectKey,
    /// Parameters in definition order.
    pub params: Vec<(String, ObjectKey)>,
    /// Set once the owning effect leaves `Describing`.
    pub frozen: bool,
}

impl ParamSet {
    pub fn lookup(&self, name: &str) -> Option<ObjectKey> {
        self.params
            .iter()
            .find(|(param_name, _)| param_name == name)
            .map(|(_, key)| *key)
    }
}

/// Summary of a parameter, for inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamInfo {
    pub name: String,
    pub ty: ParamType,
    pub value: ParamValue,
}

impl Registry {
    pub fn create_param_set(&mut self) -> ObjectKey {
        let props = self.create_property_set();
        self.wrap(ParamSet {
            props,
            params: Vec::new(),
            frozen: false,
        })
    }

    /// Define a parameter and return the handle of its property set.
    pub fn define_param(&mut self, set: ObjectKey, type_tag: &str, name: &str) -> Result<ObjectKey> {
        let ty = ParamType::from_tag(type_tag).ok_or_else(|| Error::Unsupported {
            what: "parameter type",
            value: type_tag.to_string(),
        })?;
        let params = self.param_set(set)?;
        if params.frozen {
            return Err(Error::Frozen("parameter"));
        }
        if params.lookup(name).is_some() {
            return Err(Error::Exists {
                kind: "parameter",
                name: name.to_string(),
            });
        }

        let mut props = PropertySet::new();
        props.set_str(PROP_NAME, 0, name)?;
        props.set_str(PARAM_PROP_TYPE, 0, type_tag)?;
        let props = self.wrap(props);
        let param = self.wrap(Param {
            name: name.to_string(),
            ty,
            value: ParamValue::zero(ty),
            props,
        });
        self.param_set_mut(set)?.params.push((name.to_string(), param));
        Ok(props)
    }

    /// Parameter handle and its property set handle.
    pub fn param_handle(&self, set: ObjectKey, name: &str) -> Result<(ObjectKey, ObjectKey)> {
        let param = self
            .param_set(set)?
            .lookup(name)
            .ok_or_else(|| Error::Unknown {
                kind: "parameter",
                name: name.to_string(),
            })?;
        Ok((param, self.param(param)?.props))
    }

    pub fn set_param_value(&mut self, param: ObjectKey, value: ParamValue) -> Result<()> {
        let param = self.param_mut(param)?;
        if !value.conforms_to(param.ty) {
            return Err(Error::InvalidValue(format!(
                "{:?} does not fit {} parameter '{}'",
                value,
                param.ty.short_name(),
                param.name
            )));
        }
        param.value = value;
        Ok(())
    }

    /// Set every parameter of a set to its declared default.
    pub fn apply_param_defaults(&mut self, set: ObjectKey) -> Result<()> {
        let params: Vec<ObjectKey> = self.param_set(set)?.params.iter().map(|(_, k)| *k).collect();
        for key in params {
            let param = self.param(key)?;
            let value = ParamValue::from_default(param.ty, self.property_set(param.props)?);
            self.param_mut(key)?.value = value;
        }
        Ok(())
    }

    pub fn param_infos(&self, set: ObjectKey) -> Result<Vec<ParamInfo>> {
        self.param_set(set)?
            .params
            .iter()
            .map(|(_, key)| {
                let param = self.param(*key)?;
                Ok(ParamInfo {
                    name: param.name.clone(),
                    ty: param.ty,
                    value: param.value.clone(),
                })
            })
            .collect()
    }
}
