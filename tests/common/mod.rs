//! In-process translate effect, written against the C ABI only.
//!
//! It fetches its suites through `fetchSuite` on load, declares a Double3D
//! `translation` parameter and the two reserved inputs, and on cook moves
//! every input point by the translation. Topology is forwarded to the input
//! buffers instead of copied.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::ffi::{CStr, c_char, c_int, c_void};
use std::ptr;

use mfx_host::abi::{
    OfxHost, OfxMeshEffectHandle, OfxMeshEffectSuiteV1, OfxMeshHandle, OfxMeshInputHandle,
    OfxParamHandle, OfxParamSetHandle, OfxParameterSuiteV1, OfxPlugin, OfxPropertySetHandle,
    OfxPropertySuiteV1, OfxStatus,
};
use mfx_host::host::EffectSession;
use mfx_host::model::config::HostSection;
use mfx_host::plugin::Plugin;

const OK: OfxStatus = 0;

#[derive(Clone, Copy)]
struct Suites {
    props: &'static OfxPropertySuiteV1,
    params: &'static OfxParameterSuiteV1,
    mesh: &'static OfxMeshEffectSuiteV1,
}

thread_local! {
    static HOST: Cell<*mut OfxHost> = const { Cell::new(ptr::null_mut()) };
    static SUITES: Cell<Option<Suites>> = const { Cell::new(None) };
    static DESCRIBE_STATUS: Cell<OfxStatus> = const { Cell::new(OK) };
    static COOK_STATUS: Cell<OfxStatus> = const { Cell::new(OK) };
    static REQUEST_UV: Cell<Option<bool>> = const { Cell::new(None) };
    static DEFINE_ON_COOK: Cell<bool> = const { Cell::new(false) };
    static LATE_DEFINES: Cell<Option<[OfxStatus; 2]>> = const { Cell::new(None) };
    static ACTIONS: RefCell<Vec<&'static str>> = const { RefCell::new(Vec::new()) };
}

pub static TRANSLATE: OfxPlugin = OfxPlugin {
    plugin_api: c"OfxMeshEffectPluginAPI".as_ptr(),
    api_version: 1,
    plugin_identifier: c"test.Translate".as_ptr(),
    plugin_version_major: 1,
    plugin_version_minor: 0,
    set_host: Some(set_host),
    main_entry: Some(main_entry),
};

/// Status describe returns (after defining nothing) when not OK.
pub fn set_describe_status(status: OfxStatus) {
    DESCRIBE_STATUS.with(|cell| cell.set(status));
}

/// Status cook returns without touching the output when not OK.
pub fn set_cook_status(status: OfxStatus) {
    COOK_STATUS.with(|cell| cell.set(status));
}

/// Make describe request a 2-component `uv` corner attribute on the input.
pub fn request_uv(mandatory: bool) {
    REQUEST_UV.with(|cell| cell.set(Some(mandatory)));
}

/// Make cook try to define a `late` input and a `late_param` parameter on
/// the instance before doing its work.
pub fn define_on_cook() {
    DEFINE_ON_COOK.with(|cell| cell.set(true));
}

/// Statuses of the last cook-time `inputDefine` and `paramDefine` calls.
pub fn late_define_statuses() -> Option<[OfxStatus; 2]> {
    LATE_DEFINES.with(Cell::get)
}

/// Actions received so far on this thread.
pub fn actions() -> Vec<&'static str> {
    ACTIONS.with_borrow(Vec::clone)
}

/// A loaded session around the translate plugin.
pub fn loaded_session() -> EffectSession {
    let plugin = Plugin::from_record(&TRANSLATE).unwrap();
    let mut session = EffectSession::new(plugin, &HostSection::default()).unwrap();
    session.load().unwrap();
    session
}

unsafe extern "C" fn set_host(host: *mut OfxHost) {
    HOST.with(|cell| cell.set(host));
}

unsafe extern "C" fn main_entry(
    action: *const c_char,
    handle: *const c_void,
    _in_args: OfxPropertySetHandle,
    _out_args: OfxPropertySetHandle,
) -> OfxStatus {
    let action = unsafe { CStr::from_ptr(action) }.to_str().unwrap_or("?");
    let effect: OfxMeshEffectHandle = handle.cast_mut().cast();
    let result = match action {
        "OfxActionLoad" => {
            record("load");
            unsafe { load() }
        }
        "OfxActionUnload" => {
            record("unload");
            SUITES.with(|cell| cell.set(None));
            Ok(())
        }
        "OfxActionDescribe" => {
            record("describe");
            unsafe { describe(effect) }
        }
        "OfxActionCreateInstance" => {
            record("create_instance");
            Ok(())
        }
        "OfxActionDestroyInstance" => {
            record("destroy_instance");
            Ok(())
        }
        "OfxMeshEffectActionCook" => {
            record("cook");
            unsafe { cook(effect) }
        }
        _ => Err(mfx_host::Status::ReplyDefault.code()),
    };
    match result {
        Ok(()) => OK,
        Err(status) => status,
    }
}

fn record(action: &'static str) {
    ACTIONS.with_borrow_mut(|actions| actions.push(action));
}

fn check(status: OfxStatus) -> Result<(), OfxStatus> {
    if status == OK { Ok(()) } else { Err(status) }
}

fn suites() -> Result<Suites, OfxStatus> {
    SUITES
        .with(Cell::get)
        .ok_or(mfx_host::Status::ErrMissingHostFeature.code())
}

unsafe fn fetch<T>(host: &OfxHost, name: &CStr, version: c_int) -> Result<&'static T, OfxStatus> {
    let table = unsafe { (host.fetch_suite)(host.host, name.as_ptr(), version) };
    if table.is_null() {
        return Err(mfx_host::Status::ErrMissingHostFeature.code());
    }
    Ok(unsafe { &*table.cast::<T>() })
}

unsafe fn load() -> Result<(), OfxStatus> {
    let host = HOST.with(Cell::get);
    if host.is_null() {
        return Err(mfx_host::Status::Failed.code());
    }
    let host = unsafe { &*host };
    let suites = unsafe {
        Suites {
            props: fetch(host, c"OfxPropertySuite", 1)?,
            params: fetch(host, c"OfxParameterSuite", 1)?,
            mesh: fetch(host, c"OfxMeshEffectSuite", 1)?,
        }
    };
    SUITES.with(|cell| cell.set(Some(suites)));
    Ok(())
}

unsafe fn describe(effect: OfxMeshEffectHandle) -> Result<(), OfxStatus> {
    check(DESCRIBE_STATUS.with(Cell::get))?;
    let s = suites()?;
    unsafe {
        let mut params: OfxParamSetHandle = ptr::null_mut();
        check((s.mesh.get_param_set)(effect, &mut params))?;
        let mut props: OfxPropertySetHandle = ptr::null_mut();
        check((s.params.param_define)(
            params,
            c"OfxParamTypeDouble3D".as_ptr(),
            c"translation".as_ptr(),
            &mut props,
        ))?;
        check((s.props.prop_set_string)(props, c"OfxPropLabel".as_ptr(), 0, c"Translation".as_ptr()))?;

        let mut input: OfxMeshInputHandle = ptr::null_mut();
        check((s.mesh.input_define)(effect, c"OfxMeshMainInput".as_ptr(), &mut input, ptr::null_mut()))?;
        if let Some(mandatory) = REQUEST_UV.with(Cell::get) {
            check((s.mesh.input_request_attribute)(
                input,
                c"OfxMeshAttribCorner".as_ptr(),
                c"uv".as_ptr(),
                2,
                c"OfxMeshAttribTypeFloat".as_ptr(),
                c"OfxMeshAttribSemanticTextureCoordinate".as_ptr(),
                c_int::from(mandatory),
            ))?;
        }
        let mut output: OfxMeshInputHandle = ptr::null_mut();
        check((s.mesh.input_define)(effect, c"OfxMeshMainOutput".as_ptr(), &mut output, ptr::null_mut()))?;
    }
    Ok(())
}

struct Leased {
    mesh: OfxMeshHandle,
    props: OfxPropertySetHandle,
}

unsafe fn get_mesh(s: Suites, effect: OfxMeshEffectHandle, name: &CStr) -> Result<Leased, OfxStatus> {
    let mut input: OfxMeshInputHandle = ptr::null_mut();
    let mut mesh: OfxMeshHandle = ptr::null_mut();
    let mut props: OfxPropertySetHandle = ptr::null_mut();
    unsafe {
        check((s.mesh.input_get_handle)(effect, name.as_ptr(), &mut input, ptr::null_mut()))?;
        check((s.mesh.input_get_mesh)(input, 0.0, &mut mesh, &mut props))?;
    }
    Ok(Leased { mesh, props })
}

unsafe fn get_int(s: Suites, props: OfxPropertySetHandle, key: &CStr) -> Result<c_int, OfxStatus> {
    let mut value = 0;
    check(unsafe { (s.props.prop_get_int)(props, key.as_ptr(), 0, &mut value) })?;
    Ok(value)
}

/// Data pointer and stride of an attribute.
unsafe fn attribute(
    s: Suites,
    mesh: OfxMeshHandle,
    attachment: &CStr,
    name: &CStr,
) -> Result<(OfxPropertySetHandle, *mut c_void, usize), OfxStatus> {
    let mut props: OfxPropertySetHandle = ptr::null_mut();
    let mut data: *mut c_void = ptr::null_mut();
    unsafe {
        check((s.mesh.mesh_get_attribute)(mesh, attachment.as_ptr(), name.as_ptr(), &mut props))?;
        check((s.props.prop_get_pointer)(props, c"OfxMeshAttribPropData".as_ptr(), 0, &mut data))?;
        let stride = get_int(s, props, c"OfxMeshAttribPropStride")?;
        Ok((props, data, stride as usize))
    }
}

unsafe fn cook(effect: OfxMeshEffectHandle) -> Result<(), OfxStatus> {
    check(COOK_STATUS.with(Cell::get))?;
    let s = suites()?;
    unsafe {
        let mut params: OfxParamSetHandle = ptr::null_mut();
        let mut param: OfxParamHandle = ptr::null_mut();
        let mut translation = [0.0f64; 3];
        check((s.mesh.get_param_set)(effect, &mut params))?;
        check((s.params.param_get_handle)(params, c"translation".as_ptr(), &mut param, ptr::null_mut()))?;
        check((s.params.param_get_value)(param, translation.as_mut_ptr().cast()))?;

        if DEFINE_ON_COOK.with(Cell::get) {
            let mut input: OfxMeshInputHandle = ptr::null_mut();
            let mut props: OfxPropertySetHandle = ptr::null_mut();
            let statuses = [
                (s.mesh.input_define)(effect, c"late".as_ptr(), &mut input, ptr::null_mut()),
                (s.params.param_define)(
                    params,
                    c"OfxParamTypeDouble".as_ptr(),
                    c"late_param".as_ptr(),
                    &mut props,
                ),
            ];
            LATE_DEFINES.with(|cell| cell.set(Some(statuses)));
        }

        let input = get_mesh(s, effect, c"OfxMeshMainInput")?;
        let points = get_int(s, input.props, c"OfxMeshPropPointCount")?;
        let corners = get_int(s, input.props, c"OfxMeshPropCornerCount")?;
        let faces = get_int(s, input.props, c"OfxMeshPropFaceCount")?;

        let output = get_mesh(s, effect, c"OfxMeshMainOutput")?;
        for (key, count) in [
            (c"OfxMeshPropPointCount", points),
            (c"OfxMeshPropCornerCount", corners),
            (c"OfxMeshPropFaceCount", faces),
        ] {
            check((s.props.prop_set_int)(output.props, key.as_ptr(), 0, count))?;
        }

        // Forward topology: the output reads corners and faces from the input.
        for (attachment, name) in [
            (c"OfxMeshAttribCorner", c"OfxMeshAttribCornerPoint"),
            (c"OfxMeshAttribFace", c"OfxMeshAttribFaceSize"),
        ] {
            let (_, data, stride) = attribute(s, input.mesh, attachment, name)?;
            let (props, _, _) = attribute(s, output.mesh, attachment, name)?;
            check((s.props.prop_set_int)(props, c"OfxMeshAttribPropIsOwner".as_ptr(), 0, 0))?;
            check((s.props.prop_set_pointer)(props, c"OfxMeshAttribPropData".as_ptr(), 0, data))?;
            check((s.props.prop_set_int)(props, c"OfxMeshAttribPropStride".as_ptr(), 0, stride as c_int))?;
        }
        check((s.mesh.mesh_alloc)(output.mesh))?;

        let (_, src, src_stride) =
            attribute(s, input.mesh, c"OfxMeshAttribPoint", c"OfxMeshAttribPointPosition")?;
        let (_, dst, dst_stride) =
            attribute(s, output.mesh, c"OfxMeshAttribPoint", c"OfxMeshAttribPointPosition")?;
        for i in 0..points as usize {
            let from = src.cast::<u8>().add(i * src_stride).cast::<[f32; 3]>();
            let to = dst.cast::<u8>().add(i * dst_stride).cast::<[f32; 3]>();
            let p = from.read_unaligned();
            to.write_unaligned([
                p[0] + translation[0] as f32,
                p[1] + translation[1] as f32,
                p[2] + translation[2] as f32,
            ]);
        }

        check((s.mesh.input_release_mesh)(input.mesh))?;
        check((s.mesh.input_release_mesh)(output.mesh))?;
    }
    Ok(())
}
