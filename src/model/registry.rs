//! Handle registry.
//!
//! Every object that crosses the plugin boundary lives in one slot map. A
//! handle is the 64-bit FFI encoding of its key (index + generation), so a
//! released handle can never resolve to a newer object sharing its slot.
//!
//! Suite callbacks carry no context pointer, so the registry is a
//! thread-local. It is borrowed only for the duration of one suite call or
//! host operation and never while the plugin is running.

use std::cell::RefCell;

use slotmap::{Key, KeyData, SlotMap, new_key_type};

use crate::error::{Error, Result};
use crate::model::effect::{Effect, MeshInput};
use crate::model::mesh::Mesh;
use crate::model::parameter::{Param, ParamSet};
use crate::model::property::PropertySet;

#[cfg(not(target_pointer_width = "64"))]
compile_error!("opaque handles carry 64-bit registry keys and need 64-bit pointers");

new_key_type! {
    /// Key of a host object. Crosses the boundary as an opaque handle.
    pub struct ObjectKey;
}

/// Host objects reachable through handles.
#[derive(Debug, Clone)]
pub enum Object {
    PropertySet(PropertySet),
    ParamSet(ParamSet),
    Param(Param),
    Effect(Effect),
    Input(MeshInput),
    Mesh(Mesh),
    /// Mesh reference handed out by `inputGetMesh`. Not an owner.
    MeshLease(ObjectKey),
}

impl Object {
    pub fn kind(&self) -> &'static str {
        match self {
            Object::PropertySet(_) => "property set",
            Object::ParamSet(_) => "parameter set",
            Object::Param(_) => "parameter",
            Object::Effect(_) => "mesh effect",
            Object::Input(_) => "mesh input",
            Object::Mesh(_) => "mesh",
            Object::MeshLease(_) => "mesh lease",
        }
    }

    /// Keys of the objects this one owns.
    fn children(&self) -> Vec<ObjectKey> {
        match self {
            Object::PropertySet(_) | Object::MeshLease(_) => Vec::new(),
            Object::ParamSet(set) => std::iter::once(set.props)
                .chain(set.params.iter().map(|(_, key)| *key))
                .collect(),
            Object::Param(param) => vec![param.props],
            Object::Effect(effect) => [effect.props, effect.param_set]
                .into_iter()
                .chain(effect.inputs.iter().map(|(_, key)| *key))
                .collect(),
            Object::Input(input) => vec![input.props, input.mesh],
            Object::Mesh(mesh) => std::iter::once(mesh.props)
                .chain(mesh.attributes.iter().map(|attr| attr.props))
                .chain(mesh.leases.iter().copied())
                .collect(),
        }
    }

    /// Mutable slots holding owned keys, as rewritten by a deep clone.
    /// Mesh leases are not part of the clone.
    fn owned_slots_mut(&mut self) -> Vec<&mut ObjectKey> {
        match self {
            Object::PropertySet(_) | Object::MeshLease(_) => Vec::new(),
            Object::ParamSet(set) => std::iter::once(&mut set.props)
                .chain(set.params.iter_mut().map(|(_, key)| key))
                .collect(),
            Object::Param(param) => vec![&mut param.props],
            Object::Effect(effect) => {
                let mut slots = vec![&mut effect.props, &mut effect.param_set];
                slots.extend(effect.inputs.iter_mut().map(|(_, key)| key));
                slots
            }
            Object::Input(input) => vec![&mut input.props, &mut input.mesh],
            Object::Mesh(mesh) => {
                mesh.leases.clear();
                std::iter::once(&mut mesh.props)
                    .chain(mesh.attributes.iter_mut().map(|attr| &mut attr.props))
                    .collect()
            }
        }
    }
}

macro_rules! object_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Object {
                fn from(value: $ty) -> Self {
                    Object::$variant(value)
                }
            }
        )*
    };
}

object_from!(
    PropertySet(PropertySet),
    ParamSet(ParamSet),
    Param(Param),
    Effect(Effect),
    Input(MeshInput),
    Mesh(Mesh),
);

macro_rules! typed_access {
    ($($variant:ident($ty:ty) => $get:ident, $get_mut:ident, $label:literal;)*) => {
        impl Registry {
            $(
                pub fn $get(&self, key: ObjectKey) -> Result<&$ty> {
                    match self.resolve(key)? {
                        Object::$variant(value) => Ok(value),
                        other => Err(Error::WrongKind {
                            expected: $label,
                            found: other.kind(),
                        }),
                    }
                }

                pub fn $get_mut(&mut self, key: ObjectKey) -> Result<&mut $ty> {
                    match self.resolve_mut(key)? {
                        Object::$variant(value) => Ok(value),
                        other => Err(Error::WrongKind {
                            expected: $label,
                            found: other.kind(),
                        }),
                    }
                }
            )*
        }
    };
}

typed_access! {
    PropertySet(PropertySet) => property_set, property_set_mut, "property set";
    ParamSet(ParamSet) => param_set, param_set_mut, "parameter set";
    Param(Param) => param, param_mut, "parameter";
    Effect(Effect) => effect, effect_mut, "mesh effect";
    Input(MeshInput) => input, input_mut, "mesh input";
    Mesh(Mesh) => mesh, mesh_mut, "mesh";
}

#[derive(Debug, Default)]
pub struct Registry {
    objects: SlotMap<ObjectKey, Object>,
}

impl Registry {
    /// Store an object and issue its handle.
    pub fn wrap(&mut self, object: impl Into<Object>) -> ObjectKey {
        self.objects.insert(object.into())
    }

    pub fn resolve(&self, key: ObjectKey) -> Result<&Object> {
        self.objects.get(key).ok_or(Error::InvalidHandle)
    }

    pub fn resolve_mut(&mut self, key: ObjectKey) -> Result<&mut Object> {
        self.objects.get_mut(key).ok_or(Error::InvalidHandle)
    }

    pub fn contains(&self, key: ObjectKey) -> bool {
        self.objects.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Remove a single object. Its handle is stale from now on.
    pub fn release(&mut self, key: ObjectKey) -> Result<Object> {
        self.objects.remove(key).ok_or(Error::InvalidHandle)
    }

    /// Remove an object together with everything it owns.
    pub fn destroy(&mut self, key: ObjectKey) -> Result<()> {
        let object = self.release(key)?;
        for child in object.children() {
            // Leases may already have been released by the plugin.
            if self.contains(child) {
                self.destroy(child)?;
            }
        }
        Ok(())
    }

    /// Duplicate an object tree, issuing a fresh handle for every node.
    /// The copy shares nothing with the original.
    pub fn deep_clone(&mut self, key: ObjectKey) -> Result<ObjectKey> {
        let mut object = self.resolve(key)?.clone();
        let mut cloned = Vec::new();
        let mut failure = None;

        for slot in object.owned_slots_mut() {
            match self.deep_clone(*slot) {
                Ok(copy) => {
                    *slot = copy;
                    cloned.push(copy);
                }
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        if let Some(err) = failure {
            for copy in cloned {
                self.destroy(copy)?;
            }
            return Err(err);
        }

        let is_mesh = matches!(object, Object::Mesh(_));
        let copy = self.wrap(object);
        if is_mesh {
            self.rebind_mesh_buffers(copy)?;
        }
        Ok(copy)
    }

    pub fn create_property_set(&mut self) -> ObjectKey {
        self.wrap(PropertySet::new())
    }
}

/// Encode a key as an opaque handle.
pub fn to_handle<T>(key: ObjectKey) -> *mut T {
    std::ptr::without_provenance_mut(key.data().as_ffi() as usize)
}

/// Decode a handle received from a plugin.
pub fn from_handle<T>(handle: *const T) -> Result<ObjectKey> {
    if handle.is_null() {
        return Err(Error::NullHandle);
    }
    Ok(KeyData::from_ffi(handle.addr() as u64).into())
}

thread_local! {
    static REGISTRY: RefCell<Registry> = RefCell::new(Registry::default());
}

/// Run `f` against this thread's registry.
pub fn with_registry<R>(f: impl FnOnce(&mut Registry) -> R) -> R {
    REGISTRY.with_borrow_mut(f)
}
