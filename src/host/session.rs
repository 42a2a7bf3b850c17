//! Lifecycle driver for one plugin.
//!
//! Every action runs with the registry unborrowed, so the plugin is free to
//! call back into any suite. A status other than OK leaves descriptors and
//! instances in the stage they were in; a fatal status poisons the session.

use std::ffi::c_void;
use std::ptr;

use crate::action::Action;
use crate::constants::MESH_MAIN_OUTPUT;
use crate::error::Status;
use crate::host::{Host, HostError};
use crate::model::config::HostSection;
use crate::model::effect::InputInfo;
use crate::model::mesh::MeshData;
use crate::model::parameter::{ParamInfo, ParamType, ParamValue};
use crate::model::registry::{ObjectKey, Registry, to_handle, with_registry};
use crate::model::stage::{EffectStage, SessionStage};
use crate::plugin::Plugin;

type Result<T> = std::result::Result<T, HostError>;

#[derive(Debug)]
pub struct EffectSession {
    plugin: Plugin,
    host: Host,
    stage: SessionStage,
    /// Descriptors and instances created by this session, in creation order.
    effects: Vec<ObjectKey>,
}

impl EffectSession {
    /// Create the host record and hand it to the plugin.
    pub fn new(plugin: Plugin, identity: &HostSection) -> Result<Self> {
        let mut host = Host::new(identity)?;
        // SAFETY: the host record is boxed and outlives the plugin's use of
        // it; the session sends Unload before dropping it.
        unsafe { plugin.set_host(host.record()) };
        tracing::info!("host attached to {}", plugin.info());
        Ok(Self {
            plugin,
            host,
            stage: SessionStage::Unloaded,
            effects: Vec::new(),
        })
    }

    pub fn plugin(&self) -> &Plugin {
        &self.plugin
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn stage(&self) -> SessionStage {
        self.stage
    }

    pub fn load(&mut self) -> Result<()> {
        self.require_session(Action::Load, SessionStage::Unloaded)?;
        self.send(Action::Load, None)?;
        self.stage = SessionStage::Loaded;
        Ok(())
    }

    /// Send `OfxActionUnload`, after destroying every live instance.
    pub fn unload(&mut self) -> Result<()> {
        self.require_session(Action::Unload, SessionStage::Loaded)?;
        self.teardown_instances();
        self.send(Action::Unload, None)?;
        self.stage = SessionStage::Unloaded;
        Ok(())
    }

    /// Describe a fresh descriptor. It must define both reserved inputs.
    pub fn describe(&mut self) -> Result<ObjectKey> {
        self.require_session(Action::Describe, SessionStage::Loaded)?;
        let descriptor = with_registry(Registry::create_effect);
        if let Err(err) = self.send(Action::Describe, Some(descriptor)) {
            discard(descriptor);
            return Err(err);
        }

        let has_main_io = with_registry(|registry| {
            registry.effect(descriptor).map(|effect| effect.has_main_io())
        });
        match has_main_io {
            Ok(true) => {}
            Ok(false) => {
                discard(descriptor);
                return Err(HostError::MissingMainIo);
            }
            Err(err) => {
                discard(descriptor);
                return Err(err.into());
            }
        }

        with_registry(|registry| registry.set_effect_stage(descriptor, EffectStage::Described))?;
        self.effects.push(descriptor);
        tracing::info!("described {}", self.plugin.info());
        Ok(descriptor)
    }

    /// Clone a described descriptor and send `OfxActionCreateInstance`.
    pub fn create_instance(&mut self, descriptor: ObjectKey) -> Result<ObjectKey> {
        self.require_session(Action::CreateInstance, SessionStage::Loaded)?;
        let stage = with_registry(|registry| registry.effect_stage(descriptor))?;
        if stage != EffectStage::Described {
            return Err(wrong_effect_stage(Action::CreateInstance, stage));
        }

        let instance = with_registry(|registry| registry.clone_for_instance(descriptor))?;
        if let Err(err) = self.send(Action::CreateInstance, Some(instance)) {
            discard(instance);
            return Err(err);
        }
        with_registry(|registry| registry.set_effect_stage(instance, EffectStage::Instantiated))?;
        self.effects.push(instance);
        Ok(instance)
    }

    /// Send `OfxActionDestroyInstance` and free the instance. A failing
    /// status keeps the instance alive.
    pub fn destroy_instance(&mut self, instance: ObjectKey) -> Result<()> {
        self.require_session(Action::DestroyInstance, SessionStage::Loaded)?;
        self.require_instance(Action::DestroyInstance, instance)?;
        self.send(Action::DestroyInstance, Some(instance))?;
        self.effects.retain(|key| *key != instance);
        discard(instance);
        Ok(())
    }

    /// Feed mesh data to one of an instance's inputs, replacing its mesh.
    pub fn set_input_mesh(&mut self, instance: ObjectKey, input: &str, data: &MeshData) -> Result<()> {
        self.require_instance(Action::Cook, instance)?;
        with_registry(|registry| {
            let (input, _) = registry.input_handle(instance, input)?;
            let requested = registry.input(input)?.requested.clone();
            let mesh = registry.build_mesh(data, &requested)?;
            registry.replace_input_mesh(input, mesh)
        })?;
        tracing::debug!(
            "input '{input}': {} points, {} faces",
            data.positions.len(),
            data.face_sizes.len()
        );
        Ok(())
    }

    /// Store a parameter value on an instance. Descriptors are templates and
    /// keep their values.
    pub fn set_param(&mut self, effect: ObjectKey, name: &str, value: ParamValue) -> Result<()> {
        self.require_instance(Action::Cook, effect)?;
        with_registry(|registry| {
            let set = registry.effect(effect)?.param_set;
            let (param, _) = registry.param_handle(set, name)?;
            registry.set_param_value(param, value)
        })?;
        Ok(())
    }

    pub fn param_type(&self, effect: ObjectKey, name: &str) -> Result<ParamType> {
        let ty = with_registry(|registry| {
            let set = registry.effect(effect)?.param_set;
            let (param, _) = registry.param_handle(set, name)?;
            registry.param(param).map(|param| param.ty)
        })?;
        Ok(ty)
    }

    /// Cook an instance and return the content of its main output.
    ///
    /// The output gets a fresh mesh before the action and loses it after, so
    /// no output buffer outlives the cook.
    pub fn cook(&mut self, instance: ObjectKey) -> Result<MeshData> {
        self.require_session(Action::Cook, SessionStage::Loaded)?;
        self.require_instance(Action::Cook, instance)?;
        let output = with_registry(|registry| fresh_output(registry, instance))?;

        let status = self.send(Action::Cook, Some(instance));
        let cooked = status.and_then(|()| {
            with_registry(|registry| {
                let mesh = registry.input(output)?.mesh;
                registry.read_mesh(mesh)
            })
            .map_err(HostError::from)
        });
        with_registry(|registry| fresh_output(registry, instance))?;

        let data = cooked?;
        with_registry(|registry| registry.set_effect_stage(instance, EffectStage::Cooked))?;
        tracing::debug!(
            "cooked {} points, {} faces",
            data.positions.len(),
            data.face_sizes.len()
        );
        Ok(data)
    }

    pub fn input_infos(&self, effect: ObjectKey) -> Result<Vec<InputInfo>> {
        Ok(with_registry(|registry| registry.input_infos(effect))?)
    }

    pub fn param_infos(&self, effect: ObjectKey) -> Result<Vec<ParamInfo>> {
        Ok(with_registry(|registry| registry.effect_param_infos(effect))?)
    }

    fn require_session(&self, action: Action, stage: SessionStage) -> Result<()> {
        match self.stage {
            SessionStage::Poisoned => Err(HostError::Poisoned),
            current if current == stage => Ok(()),
            current => Err(HostError::WrongStage {
                action,
                what: "session",
                stage: current.label(),
            }),
        }
    }

    fn require_instance(&self, action: Action, effect: ObjectKey) -> Result<()> {
        if self.stage == SessionStage::Poisoned {
            return Err(HostError::Poisoned);
        }
        let stage = with_registry(|registry| registry.effect_stage(effect))?;
        if stage.is_instance() {
            Ok(())
        } else {
            Err(wrong_effect_stage(action, stage))
        }
    }

    /// Call `mainEntry`. The registry must not be borrowed here.
    fn send(&mut self, action: Action, effect: Option<ObjectKey>) -> Result<()> {
        let handle = effect.map_or(ptr::null(), |key| to_handle::<c_void>(key).cast_const());
        tracing::debug!("-> {action}");
        // SAFETY: the handle is a live registry key (or null for Load and
        // Unload) and no argument sets are passed.
        let code = unsafe {
            self.plugin
                .main_entry(action.name(), handle, ptr::null_mut(), ptr::null_mut())
        };

        let Some(status) = Status::from_code(code) else {
            tracing::warn!("{action} returned unknown status {code}");
            return Err(HostError::UnknownStatus { action, code });
        };
        if status.is_ok() {
            return Ok(());
        }
        if status.is_fatal() {
            tracing::error!("{action} returned {status}; poisoning session");
            self.stage = SessionStage::Poisoned;
        } else {
            tracing::warn!("{action} returned {status}");
        }
        Err(HostError::Action { action, status })
    }

    fn teardown_instances(&mut self) {
        let instances: Vec<ObjectKey> = with_registry(|registry| {
            self.effects
                .iter()
                .copied()
                .filter(|key| registry.effect_stage(*key).is_ok_and(|stage| stage.is_instance()))
                .collect()
        });
        for instance in instances {
            if let Err(err) = self.destroy_instance(instance) {
                tracing::warn!("destroying instance on teardown: {err}");
            }
        }
    }
}

impl Drop for EffectSession {
    fn drop(&mut self) {
        if self.stage == SessionStage::Loaded {
            if let Err(err) = self.unload() {
                tracing::warn!("unload on drop: {err}");
            }
        }
        for effect in self.effects.drain(..) {
            discard(effect);
        }
    }
}

/// Give the main output of `instance` an empty mesh, returning the input key.
fn fresh_output(registry: &mut Registry, instance: ObjectKey) -> crate::Result<ObjectKey> {
    let (output, _) = registry.input_handle(instance, MESH_MAIN_OUTPUT)?;
    let mesh = registry.create_mesh()?;
    registry.replace_input_mesh(output, mesh)?;
    Ok(output)
}

fn discard(effect: ObjectKey) {
    with_registry(|registry| {
        if !registry.contains(effect) {
            return;
        }
        if let Err(err) = registry.destroy(effect) {
            tracing::warn!("discarding effect: {err}");
        }
    });
}

fn wrong_effect_stage(action: Action, stage: EffectStage) -> HostError {
    HostError::WrongStage {
        action,
        what: "effect",
        stage: stage.label(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{OfxHost, OfxPlugin, OfxPropertySetHandle, OfxStatus};
    use crate::constants::{MESH_MAIN_INPUT, PARAM_TYPE_DOUBLE};
    use crate::model::registry::from_handle;
    use std::cell::Cell;
    use std::ffi::{CStr, c_char};

    thread_local! {
        static DESCRIBE_STATUS: Cell<OfxStatus> = const { Cell::new(0) };
        static LAST_ACTION: Cell<&'static str> = const { Cell::new("") };
    }

    unsafe extern "C" fn set_host(_host: *mut OfxHost) {}

    /// Defines the reserved inputs straight through the registry.
    unsafe extern "C" fn main_entry(
        action: *const c_char,
        handle: *const c_void,
        _in_args: OfxPropertySetHandle,
        _out_args: OfxPropertySetHandle,
    ) -> OfxStatus {
        let action = unsafe { CStr::from_ptr(action) };
        let action = Action::ALL
            .into_iter()
            .find(|candidate| candidate.name() == action)
            .map_or("?", |found| found.name().to_str().unwrap_or("?"));
        LAST_ACTION.with(|last| last.set(action));
        if action != "OfxActionDescribe" {
            return 0;
        }
        let status = DESCRIBE_STATUS.with(Cell::get);
        if status == 0 {
            let effect = from_handle(handle).unwrap();
            with_registry(|registry| {
                for name in [MESH_MAIN_INPUT, MESH_MAIN_OUTPUT] {
                    registry.define_input(effect, name).unwrap();
                }
                let set = registry.effect(effect).unwrap().param_set;
                registry.define_param(set, PARAM_TYPE_DOUBLE, "gain").unwrap();
            });
        }
        status
    }

    static STUB: OfxPlugin = OfxPlugin {
        plugin_api: c"OfxMeshEffectPluginAPI".as_ptr(),
        api_version: 1,
        plugin_identifier: c"test.Stub".as_ptr(),
        plugin_version_major: 1,
        plugin_version_minor: 0,
        set_host: Some(set_host),
        main_entry: Some(main_entry),
    };

    fn session() -> EffectSession {
        let plugin = Plugin::from_record(&STUB).unwrap();
        let mut session = EffectSession::new(plugin, &HostSection::default()).unwrap();
        session.load().unwrap();
        session
    }

    #[test]
    fn test_cook_requires_create_instance() {
        let mut session = session();
        let descriptor = session.describe().unwrap();
        assert!(session.cook(descriptor).is_err());

        // A clone the plugin never saw is not an instance either.
        let clone = with_registry(|registry| registry.clone_for_instance(descriptor)).unwrap();
        let err = session.cook(clone).unwrap_err();
        assert!(matches!(err, HostError::WrongStage { action: Action::Cook, .. }));
        assert_ne!(LAST_ACTION.with(Cell::get), "OfxMeshEffectActionCook");

        let instance = session.create_instance(descriptor).unwrap();
        let cooked = session.cook(instance).unwrap();
        assert!(cooked.positions.is_empty());
        discard(clone);
    }

    #[test]
    fn test_failed_describe_leaves_nothing_behind() {
        let mut session = session();
        let before = with_registry(|registry| registry.len());
        DESCRIBE_STATUS.with(|status| status.set(Status::Failed.code()));
        let err = session.describe().unwrap_err();
        assert_eq!(err.status(), Some(Status::Failed));
        assert_eq!(with_registry(|registry| registry.len()), before);
        assert_eq!(session.stage(), SessionStage::Loaded);
        DESCRIBE_STATUS.with(|status| status.set(0));
    }

    #[test]
    fn test_instances_cannot_be_instantiated() {
        let mut session = session();
        let descriptor = session.describe().unwrap();
        let instance = session.create_instance(descriptor).unwrap();
        assert!(matches!(
            session.create_instance(instance),
            Err(HostError::WrongStage { .. })
        ));
        session.destroy_instance(instance).unwrap();
        assert!(!with_registry(|registry| registry.contains(instance)));
    }

    #[test]
    fn test_set_param_requires_instance() {
        let mut session = session();
        let descriptor = session.describe().unwrap();
        let err = session
            .set_param(descriptor, "gain", ParamValue::doubles(&[3.0]))
            .unwrap_err();
        assert!(matches!(err, HostError::WrongStage { what: "effect", .. }));
        assert_eq!(
            session.param_infos(descriptor).unwrap()[0].value,
            ParamValue::doubles(&[0.0])
        );

        let instance = session.create_instance(descriptor).unwrap();
        session
            .set_param(instance, "gain", ParamValue::doubles(&[3.0]))
            .unwrap();
        assert_eq!(
            session.param_infos(instance).unwrap()[0].value,
            ParamValue::doubles(&[3.0])
        );
        assert_eq!(
            session.param_infos(descriptor).unwrap()[0].value,
            ParamValue::doubles(&[0.0])
        );
    }

    #[test]
    fn test_drop_unloads_and_frees_effects() {
        let mut session = session();
        let descriptor = session.describe().unwrap();
        let instance = session.create_instance(descriptor).unwrap();
        drop(session);
        assert_eq!(LAST_ACTION.with(Cell::get), "OfxActionUnload");
        with_registry(|registry| {
            assert!(!registry.contains(descriptor));
            assert!(!registry.contains(instance));
        });
    }
}
