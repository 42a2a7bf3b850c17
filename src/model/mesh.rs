//! Attribute-based meshes and their buffers.
//!
//! A mesh is a property set holding the point, corner and face counts plus an
//! ordered list of attributes. Each attribute is exposed to the plugin as its
//! own property set; `OfxMeshAttribPropData` points at the buffer once the
//! mesh is allocated. Owned buffers live here and are freed on release, while
//! non-owned attributes point at memory someone else provides.

use std::ffi::c_void;
use std::ptr;

use crate::constants::*;
use crate::error::{Error, Result};
use crate::model::effect::RequestedAttribute;
use crate::model::property::PropertySet;
use crate::model::registry::{Object, ObjectKey, Registry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attachment {
    Point,
    Corner,
    Face,
    Mesh,
}

impl Attachment {
    pub fn name(self) -> &'static str {
        match self {
            Attachment::Point => MESH_ATTRIB_POINT,
            Attachment::Corner => MESH_ATTRIB_CORNER,
            Attachment::Face => MESH_ATTRIB_FACE,
            Attachment::Mesh => MESH_ATTRIB_MESH,
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        [
            Attachment::Point,
            Attachment::Corner,
            Attachment::Face,
            Attachment::Mesh,
        ]
        .into_iter()
        .find(|attachment| attachment.name() == name)
        .ok_or_else(|| Error::Unsupported {
            what: "attachment",
            value: name.to_string(),
        })
    }

    /// Mesh property holding the item count, if any.
    fn count_property(self) -> Option<&'static str> {
        match self {
            Attachment::Point => Some(MESH_PROP_POINT_COUNT),
            Attachment::Corner => Some(MESH_PROP_CORNER_COUNT),
            Attachment::Face => Some(MESH_PROP_FACE_COUNT),
            Attachment::Mesh => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    UByte,
    Int,
    Float,
}

impl AttributeType {
    pub fn tag(self) -> &'static str {
        match self {
            AttributeType::UByte => MESH_ATTRIB_TYPE_UBYTE,
            AttributeType::Int => MESH_ATTRIB_TYPE_INT,
            AttributeType::Float => MESH_ATTRIB_TYPE_FLOAT,
        }
    }

    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag {
            MESH_ATTRIB_TYPE_UBYTE => Ok(AttributeType::UByte),
            MESH_ATTRIB_TYPE_INT => Ok(AttributeType::Int),
            MESH_ATTRIB_TYPE_FLOAT => Ok(AttributeType::Float),
            other => Err(Error::Unsupported {
                what: "attribute type",
                value: other.to_string(),
            }),
        }
    }

    /// Element size in bytes.
    pub fn size(self) -> usize {
        match self {
            AttributeType::UByte => size_of::<u8>(),
            AttributeType::Int => size_of::<i32>(),
            AttributeType::Float => size_of::<f32>(),
        }
    }
}

/// Attribute storage, typed so every element is naturally aligned.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeBuffer {
    UByte(Vec<u8>),
    Int(Vec<i32>),
    Float(Vec<f32>),
}

impl AttributeBuffer {
    /// Zero-filled buffer of `len` elements. A refused allocation is an
    /// error, not an abort.
    pub fn zeroed(ty: AttributeType, len: usize) -> Result<Self> {
        Ok(match ty {
            AttributeType::UByte => AttributeBuffer::UByte(filled(len)?),
            AttributeType::Int => AttributeBuffer::Int(filled(len)?),
            AttributeType::Float => AttributeBuffer::Float(filled(len)?),
        })
    }

    pub fn ty(&self) -> AttributeType {
        match self {
            AttributeBuffer::UByte(_) => AttributeType::UByte,
            AttributeBuffer::Int(_) => AttributeType::Int,
            AttributeBuffer::Float(_) => AttributeType::Float,
        }
    }

    /// Number of elements (not items).
    pub fn len(&self) -> usize {
        match self {
            AttributeBuffer::UByte(values) => values.len(),
            AttributeBuffer::Int(values) => values.len(),
            AttributeBuffer::Float(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn byte_len(&self) -> usize {
        self.len() * self.ty().size()
    }

    fn as_mut_ptr(&mut self) -> *mut c_void {
        match self {
            AttributeBuffer::UByte(values) => values.as_mut_ptr().cast(),
            AttributeBuffer::Int(values) => values.as_mut_ptr().cast(),
            AttributeBuffer::Float(values) => values.as_mut_ptr().cast(),
        }
    }

    fn copy_from(&mut self, name: &str, src: &AttributeBuffer) -> Result<()> {
        match (self, src) {
            (AttributeBuffer::UByte(dst), AttributeBuffer::UByte(src)) if dst.len() == src.len() => {
                dst.copy_from_slice(src)
            }
            (AttributeBuffer::Int(dst), AttributeBuffer::Int(src)) if dst.len() == src.len() => {
                dst.copy_from_slice(src)
            }
            (AttributeBuffer::Float(dst), AttributeBuffer::Float(src)) if dst.len() == src.len() => {
                dst.copy_from_slice(src)
            }
            (dst, src) => {
                return Err(Error::InvalidValue(format!(
                    "attribute '{name}' holds {} {:?} elements, got {} {:?}",
                    dst.len(),
                    dst.ty(),
                    src.len(),
                    src.ty()
                )));
            }
        }
        Ok(())
    }

    /// Gather `items` rows of `components` elements spaced `stride` bytes
    /// apart.
    ///
    /// # Safety
    ///
    /// `data` must be readable for `items` rows of the given stride.
    unsafe fn gather(
        ty: AttributeType,
        data: *const u8,
        stride: usize,
        items: usize,
        components: usize,
    ) -> Result<Self> {
        unsafe fn rows<T: Copy>(data: *const u8, stride: usize, items: usize, n: usize) -> Result<Vec<T>> {
            let len = items.checked_mul(n).ok_or(Error::OutOfMemory(usize::MAX))?;
            let mut out = Vec::new();
            out.try_reserve_exact(len).map_err(|_| Error::OutOfMemory(len))?;
            for item in 0..items {
                // SAFETY: guaranteed by the caller of `gather`.
                let row = unsafe { data.add(item * stride) }.cast::<T>();
                for c in 0..n {
                    out.push(unsafe { row.add(c).read_unaligned() });
                }
            }
            Ok(out)
        }

        // SAFETY: forwarded from the caller.
        unsafe {
            Ok(match ty {
                AttributeType::UByte => {
                    AttributeBuffer::UByte(rows(data, stride, items, components)?)
                }
                AttributeType::Int => AttributeBuffer::Int(rows(data, stride, items, components)?),
                AttributeType::Float => {
                    AttributeBuffer::Float(rows(data, stride, items, components)?)
                }
            })
        }
    }
}

fn filled<T: Copy + Default>(len: usize) -> Result<Vec<T>> {
    let mut values = Vec::new();
    values
        .try_reserve_exact(len)
        .map_err(|_| Error::OutOfMemory(len))?;
    values.resize(len, T::default());
    Ok(values)
}

#[derive(Debug, Clone)]
pub struct Attribute {
    pub attachment: Attachment,
    pub name: String,
    pub props: ObjectKey,
    /// Host-owned storage, present between allocation and release.
    pub buffer: Option<AttributeBuffer>,
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub props: ObjectKey,
    /// Attributes in definition order.
    pub attributes: Vec<Attribute>,
    /// Outstanding `inputGetMesh` handles.
    pub leases: Vec<ObjectKey>,
}

impl Mesh {
    fn find(&self, attachment: Attachment, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|attr| attr.attachment == attachment && attr.name == name)
    }
}

/// Item counts of the three counted attachments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeshCounts {
    pub points: usize,
    pub corners: usize,
    pub faces: usize,
}

impl MeshCounts {
    pub fn items(&self, attachment: Attachment) -> usize {
        match attachment {
            Attachment::Point => self.points,
            Attachment::Corner => self.corners,
            Attachment::Face => self.faces,
            Attachment::Mesh => 1,
        }
    }

    fn read(props: &PropertySet) -> Result<Self> {
        let count = |attachment: Attachment| -> Result<usize> {
            let Some(key) = attachment.count_property() else {
                return Ok(1);
            };
            let value = props.int(key, 0)?;
            usize::try_from(value)
                .map_err(|_| Error::InvalidValue(format!("{key} is negative ({value})")))
        };
        Ok(Self {
            points: count(Attachment::Point)?,
            corners: count(Attachment::Corner)?,
            faces: count(Attachment::Face)?,
        })
    }
}

/// Layout an attribute negotiates through its property set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AttributeLayout {
    is_owner: bool,
    components: usize,
    ty: AttributeType,
    stride: usize,
}

impl AttributeLayout {
    fn read(props: &PropertySet) -> Result<Self> {
        let components = props.int(MESH_ATTRIB_PROP_COMPONENT_COUNT, 0)?;
        let components = usize::try_from(components)
            .ok()
            .filter(|n| (1..=4).contains(n))
            .ok_or_else(|| Error::InvalidValue(format!("component count {components}")))?;
        let ty = AttributeType::from_tag(
            props
                .string(MESH_ATTRIB_PROP_TYPE, 0)?
                .to_str()
                .map_err(|_| Error::InvalidString)?,
        )?;
        let packed = components * ty.size();
        let stride = usize::try_from(props.int(MESH_ATTRIB_PROP_STRIDE, 0)?)
            .ok()
            .filter(|stride| *stride > 0)
            .unwrap_or(packed);
        Ok(Self {
            is_owner: props.int(MESH_ATTRIB_PROP_IS_OWNER, 0)? != 0,
            components,
            ty,
            stride,
        })
    }
}

/// Extra attribute carried by [`MeshData`].
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeData {
    pub attachment: Attachment,
    pub name: String,
    pub components: usize,
    pub semantic: Option<String>,
    pub values: AttributeBuffer,
}

/// Host-side snapshot of a mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    /// Point index of each corner.
    pub corner_points: Vec<i32>,
    /// Corner count of each face.
    pub face_sizes: Vec<i32>,
    pub attributes: Vec<AttributeData>,
}

impl MeshData {
    /// Unit quad in the XY plane, centered on the origin.
    pub fn quad() -> Self {
        Self {
            positions: vec![
                [-1.0, -1.0, 0.0],
                [1.0, -1.0, 0.0],
                [1.0, 1.0, 0.0],
                [-1.0, 1.0, 0.0],
            ],
            corner_points: vec![0, 1, 2, 3],
            face_sizes: vec![4],
            attributes: Vec::new(),
        }
    }

    pub fn counts(&self) -> MeshCounts {
        MeshCounts {
            points: self.positions.len(),
            corners: self.corner_points.len(),
            faces: self.face_sizes.len(),
        }
    }

    pub fn attribute(&self, attachment: Attachment, name: &str) -> Option<&AttributeData> {
        self.attributes
            .iter()
            .find(|attr| attr.attachment == attachment && attr.name == name)
    }

    /// Check that faces, corners and points agree.
    pub fn validate(&self) -> Result<()> {
        let corners: i64 = self.face_sizes.iter().map(|&n| i64::from(n)).sum();
        if self.face_sizes.iter().any(|&n| n < 0) || corners != self.corner_points.len() as i64 {
            return Err(Error::InvalidValue(format!(
                "face sizes add up to {corners} corners, mesh has {}",
                self.corner_points.len()
            )));
        }
        let points = self.positions.len() as i64;
        if let Some(bad) = self
            .corner_points
            .iter()
            .find(|&&p| p < 0 || i64::from(p) >= points)
        {
            return Err(Error::InvalidValue(format!(
                "corner refers to point {bad}, mesh has {points}"
            )));
        }
        let counts = self.counts();
        for attr in &self.attributes {
            let expected = counts.items(attr.attachment) * attr.components;
            if attr.values.len() != expected {
                return Err(Error::InvalidValue(format!(
                    "attribute '{}' has {} elements, expected {expected}",
                    attr.name,
                    attr.values.len()
                )));
            }
        }
        Ok(())
    }
}

impl Registry {
    /// Empty mesh with the three mandatory attributes.
    pub fn create_mesh(&mut self) -> Result<ObjectKey> {
        let props = self.create_property_set();
        let mesh = self.wrap(Mesh {
            props,
            attributes: Vec::new(),
            leases: Vec::new(),
        });
        let mandatory = [
            (MESH_ATTRIB_POINT, MESH_ATTRIB_POINT_POSITION, 3, MESH_ATTRIB_TYPE_FLOAT),
            (MESH_ATTRIB_CORNER, MESH_ATTRIB_CORNER_POINT, 1, MESH_ATTRIB_TYPE_INT),
            (MESH_ATTRIB_FACE, MESH_ATTRIB_FACE_SIZE, 1, MESH_ATTRIB_TYPE_INT),
        ];
        for (attachment, name, components, ty) in mandatory {
            self.define_attribute(mesh, attachment, name, components, ty, None)?;
        }
        Ok(mesh)
    }

    /// Mesh behind a mesh key or a lease.
    pub fn mesh_target(&self, key: ObjectKey) -> Result<ObjectKey> {
        match self.resolve(key)? {
            Object::Mesh(_) => Ok(key),
            Object::MeshLease(mesh) => {
                self.mesh(*mesh)?;
                Ok(*mesh)
            }
            other => Err(Error::WrongKind {
                expected: "mesh",
                found: other.kind(),
            }),
        }
    }

    /// Hand out a mesh reference.
    pub fn lease_mesh(&mut self, mesh: ObjectKey) -> Result<ObjectKey> {
        self.mesh(mesh)?;
        let lease = self.wrap(Object::MeshLease(mesh));
        self.mesh_mut(mesh)?.leases.push(lease);
        Ok(lease)
    }

    pub fn release_lease(&mut self, lease: ObjectKey) -> Result<()> {
        let mesh = match self.resolve(lease)? {
            Object::MeshLease(mesh) => *mesh,
            other => {
                return Err(Error::WrongKind {
                    expected: "mesh lease",
                    found: other.kind(),
                });
            }
        };
        self.release(lease)?;
        if let Ok(mesh) = self.mesh_mut(mesh) {
            mesh.leases.retain(|key| *key != lease);
        }
        Ok(())
    }

    /// Add an owned attribute and return its property set.
    pub fn define_attribute(
        &mut self,
        mesh: ObjectKey,
        attachment: &str,
        name: &str,
        components: i32,
        type_tag: &str,
        semantic: Option<&str>,
    ) -> Result<ObjectKey> {
        let attachment = Attachment::from_name(attachment)?;
        let ty = AttributeType::from_tag(type_tag)?;
        if !(1..=4).contains(&components) {
            return Err(Error::InvalidValue(format!(
                "attribute '{name}' needs 1 to 4 components, got {components}"
            )));
        }
        if self.mesh(mesh)?.find(attachment, name).is_some() {
            return Err(Error::Exists {
                kind: "attribute",
                name: name.to_string(),
            });
        }

        let mut props = PropertySet::new();
        props.set_pointer(MESH_ATTRIB_PROP_DATA, 0, ptr::null_mut())?;
        props.set_int(MESH_ATTRIB_PROP_IS_OWNER, 0, 1)?;
        props.set_int(MESH_ATTRIB_PROP_STRIDE, 0, components * ty.size() as i32)?;
        props.set_int(MESH_ATTRIB_PROP_COMPONENT_COUNT, 0, components)?;
        props.set_str(MESH_ATTRIB_PROP_TYPE, 0, type_tag)?;
        if let Some(semantic) = semantic {
            props.set_str(MESH_ATTRIB_PROP_SEMANTIC, 0, semantic)?;
        }
        let props = self.wrap(props);
        self.mesh_mut(mesh)?.attributes.push(Attribute {
            attachment,
            name: name.to_string(),
            props,
            buffer: None,
        });
        Ok(props)
    }

    pub fn mesh_attribute(&self, mesh: ObjectKey, attachment: &str, name: &str) -> Result<ObjectKey> {
        let attachment = Attachment::from_name(attachment)?;
        self.mesh(mesh)?
            .find(attachment, name)
            .map(|attr| attr.props)
            .ok_or_else(|| Error::NotFound {
                kind: "attribute",
                name: name.to_string(),
            })
    }

    pub fn attribute_by_index(&self, mesh: ObjectKey, index: i64) -> Result<ObjectKey> {
        let mesh = self.mesh(mesh)?;
        usize::try_from(index)
            .ok()
            .and_then(|i| mesh.attributes.get(i))
            .map(|attr| attr.props)
            .ok_or(Error::BadIndex(index))
    }

    pub fn mesh_counts(&self, mesh: ObjectKey) -> Result<MeshCounts> {
        MeshCounts::read(self.property_set(self.mesh(mesh)?.props)?)
    }

    pub fn set_mesh_counts(&mut self, mesh: ObjectKey, counts: MeshCounts) -> Result<()> {
        let to_int = |n: usize| i32::try_from(n).map_err(|_| Error::InvalidValue(format!("count {n}")));
        let props = self.mesh(mesh)?.props;
        let props = self.property_set_mut(props)?;
        props.set_int(MESH_PROP_POINT_COUNT, 0, to_int(counts.points)?)?;
        props.set_int(MESH_PROP_CORNER_COUNT, 0, to_int(counts.corners)?)?;
        props.set_int(MESH_PROP_FACE_COUNT, 0, to_int(counts.faces)?)?;
        Ok(())
    }

    /// Allocate every owned attribute for the current counts and publish the
    /// data pointers. Nothing is allocated if any owned attribute already is,
    /// or if any buffer is refused.
    pub fn allocate_mesh(&mut self, mesh: ObjectKey) -> Result<()> {
        let counts = self.mesh_counts(mesh)?;
        let mut plan = Vec::new();
        for (index, attr) in self.mesh(mesh)?.attributes.iter().enumerate() {
            let layout = AttributeLayout::read(self.property_set(attr.props)?)?;
            if !layout.is_owner {
                continue;
            }
            if attr.buffer.is_some() {
                return Err(Error::AlreadyAllocated(attr.name.clone()));
            }
            let items = counts.items(attr.attachment);
            let len = items
                .checked_mul(layout.components)
                .ok_or(Error::OutOfMemory(usize::MAX))?;
            plan.push((index, layout, len));
        }

        let mut buffers = Vec::with_capacity(plan.len());
        for (index, layout, len) in plan {
            let buffer = AttributeBuffer::zeroed(layout.ty, len)?;
            buffers.push((index, layout, buffer));
        }

        for (index, layout, mut buffer) in buffers {
            let attr = &mut self.mesh_mut(mesh)?.attributes[index];
            let data = buffer.as_mut_ptr();
            attr.buffer = Some(buffer);
            let props = attr.props;

            let stride = layout.components * layout.ty.size();
            let props = self.property_set_mut(props)?;
            props.set_pointer(MESH_ATTRIB_PROP_DATA, 0, data)?;
            props.set_int(MESH_ATTRIB_PROP_STRIDE, 0, stride as i32)?;
        }
        tracing::debug!(
            "allocated mesh: {} points, {} corners, {} faces",
            counts.points,
            counts.corners,
            counts.faces
        );
        Ok(())
    }

    /// Free every owned buffer and clear its data pointer.
    pub fn release_mesh_buffers(&mut self, mesh: ObjectKey) -> Result<()> {
        let mut freed = Vec::new();
        for attr in &mut self.mesh_mut(mesh)?.attributes {
            if attr.buffer.take().is_some() {
                freed.push(attr.props);
            }
        }
        for props in freed {
            self.property_set_mut(props)?
                .set_pointer(MESH_ATTRIB_PROP_DATA, 0, ptr::null_mut())?;
        }
        Ok(())
    }

    /// Republish the data pointers of owned buffers, after the mesh was
    /// cloned and its buffers moved.
    pub fn rebind_mesh_buffers(&mut self, mesh: ObjectKey) -> Result<()> {
        let mut bound = Vec::new();
        for attr in &mut self.mesh_mut(mesh)?.attributes {
            if let Some(buffer) = attr.buffer.as_mut() {
                bound.push((attr.props, buffer.as_mut_ptr()));
            }
        }
        for (props, data) in bound {
            self.property_set_mut(props)?
                .set_pointer(MESH_ATTRIB_PROP_DATA, 0, data)?;
        }
        Ok(())
    }

    /// Build an allocated mesh holding `data`. Requested attributes absent
    /// from `data` are added zero-filled unless mandatory.
    pub fn build_mesh(&mut self, data: &MeshData, requested: &[RequestedAttribute]) -> Result<ObjectKey> {
        data.validate()?;
        let mesh = self.create_mesh()?;
        if let Err(err) = self.populate_mesh(mesh, data, requested) {
            self.destroy(mesh)?;
            return Err(err);
        }
        Ok(mesh)
    }

    fn populate_mesh(&mut self, mesh: ObjectKey, data: &MeshData, requested: &[RequestedAttribute]) -> Result<()> {
        self.set_mesh_counts(mesh, data.counts())?;
        for attr in &data.attributes {
            self.define_attribute(
                mesh,
                attr.attachment.name(),
                &attr.name,
                attr.components as i32,
                attr.values.ty().tag(),
                attr.semantic.as_deref(),
            )?;
        }
        for request in requested {
            let attachment = Attachment::from_name(&request.attachment)?;
            if self.mesh(mesh)?.find(attachment, &request.name).is_some() {
                continue;
            }
            if request.mandatory {
                return Err(Error::NotFound {
                    kind: "mandatory attribute",
                    name: request.name.clone(),
                });
            }
            self.define_attribute(
                mesh,
                &request.attachment,
                &request.name,
                request.components,
                &request.type_tag,
                request.semantic.as_deref(),
            )?;
        }
        self.allocate_mesh(mesh)?;

        let positions = AttributeBuffer::Float(data.positions.iter().flatten().copied().collect());
        let corners = AttributeBuffer::Int(data.corner_points.clone());
        let faces = AttributeBuffer::Int(data.face_sizes.clone());
        let fills = [
            (Attachment::Point, MESH_ATTRIB_POINT_POSITION, &positions),
            (Attachment::Corner, MESH_ATTRIB_CORNER_POINT, &corners),
            (Attachment::Face, MESH_ATTRIB_FACE_SIZE, &faces),
        ]
        .into_iter()
        .chain(
            data.attributes
                .iter()
                .map(|attr| (attr.attachment, attr.name.as_str(), &attr.values)),
        );

        for (attachment, name, values) in fills {
            let attr = self
                .mesh_mut(mesh)?
                .attributes
                .iter_mut()
                .find(|attr| attr.attachment == attachment && attr.name == name)
                .ok_or_else(|| Error::NotFound {
                    kind: "attribute",
                    name: name.to_string(),
                })?;
            attr.buffer
                .as_mut()
                .ok_or_else(|| Error::Unallocated(name.to_string()))?
                .copy_from(name, values)?;
        }
        Ok(())
    }

    /// Copy a mesh out into host-owned data.
    ///
    /// Non-owned attributes are read through their published data pointer
    /// and stride; the protocol requires that memory to stay valid until the
    /// mesh is released.
    pub fn read_mesh(&self, mesh: ObjectKey) -> Result<MeshData> {
        let counts = self.mesh_counts(mesh)?;
        let mut out = MeshData::default();

        for attr in &self.mesh(mesh)?.attributes {
            let props = self.property_set(attr.props)?;
            let layout = AttributeLayout::read(props)?;
            let items = counts.items(attr.attachment);
            let values = match &attr.buffer {
                Some(buffer) => buffer.clone(),
                None if items == 0 => AttributeBuffer::zeroed(layout.ty, 0)?,
                None => {
                    let data = props.pointer(MESH_ATTRIB_PROP_DATA, 0)?;
                    if data.is_null() {
                        return Err(Error::Unallocated(attr.name.clone()));
                    }
                    // SAFETY: see above.
                    unsafe {
                        AttributeBuffer::gather(
                            layout.ty,
                            data.cast_const().cast(),
                            layout.stride,
                            items,
                            layout.components,
                        )?
                    }
                }
            };

            match (attr.attachment, attr.name.as_str(), values) {
                (Attachment::Point, MESH_ATTRIB_POINT_POSITION, AttributeBuffer::Float(values))
                    if layout.components == 3 =>
                {
                    out.positions = values
                        .chunks_exact(3)
                        .map(|p| [p[0], p[1], p[2]])
                        .collect();
                }
                (Attachment::Corner, MESH_ATTRIB_CORNER_POINT, AttributeBuffer::Int(values)) => {
                    out.corner_points = values;
                }
                (Attachment::Face, MESH_ATTRIB_FACE_SIZE, AttributeBuffer::Int(values)) => {
                    out.face_sizes = values;
                }
                (attachment, name, values) => out.attributes.push(AttributeData {
                    attachment,
                    name: name.to_string(),
                    components: layout.components,
                    semantic: props
                        .peek::<std::ffi::CString>(MESH_ATTRIB_PROP_SEMANTIC, 0)?
                        .and_then(|s| s.to_str().ok())
                        .map(str::to_string),
                    values,
                }),
            }
        }
        Ok(out)
    }
}
