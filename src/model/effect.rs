//! Mesh effects and their inputs.

use crate::constants::*;
use crate::error::{Error, Result};
use crate::model::parameter::ParamInfo;
use crate::model::property::PropertySet;
use crate::model::registry::{ObjectKey, Registry};
use crate::model::stage::EffectStage;

/// Attribute an effect wants to find on an input mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedAttribute {
    pub attachment: String,
    pub name: String,
    pub components: i32,
    pub type_tag: String,
    pub semantic: Option<String>,
    pub mandatory: bool,
}

#[derive(Debug, Clone)]
pub struct MeshInput {
    pub name: String,
    pub props: ObjectKey,
    pub mesh: ObjectKey,
    pub requested: Vec<RequestedAttribute>,
    /// Set once the owning effect leaves `Describing`.
    pub frozen: bool,
}

/// Descriptor or instance of a mesh effect.
#[derive(Debug, Clone)]
pub struct Effect {
    pub props: ObjectKey,
    pub param_set: ObjectKey,
    /// Inputs in definition order.
    pub inputs: Vec<(String, ObjectKey)>,
    pub stage: EffectStage,
}

impl Effect {
    pub fn lookup(&self, name: &str) -> Option<ObjectKey> {
        self.inputs
            .iter()
            .find(|(input_name, _)| input_name == name)
            .map(|(_, key)| *key)
    }

    /// Whether both reserved inputs are defined.
    pub fn has_main_io(&self) -> bool {
        self.lookup(MESH_MAIN_INPUT).is_some() && self.lookup(MESH_MAIN_OUTPUT).is_some()
    }
}

/// Summary of an input, for inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct InputInfo {
    pub name: String,
    pub requested: Vec<RequestedAttribute>,
}

impl Registry {
    /// Empty effect in the describing stage.
    pub fn create_effect(&mut self) -> ObjectKey {
        let props = self.create_property_set();
        let param_set = self.create_param_set();
        self.wrap(Effect {
            props,
            param_set,
            inputs: Vec::new(),
            stage: EffectStage::Describing,
        })
    }

    /// Define an input and return its handle and property set.
    pub fn define_input(&mut self, effect: ObjectKey, name: &str) -> Result<(ObjectKey, ObjectKey)> {
        let owner = self.effect(effect)?;
        if owner.stage != EffectStage::Describing {
            return Err(Error::Frozen("input"));
        }
        if owner.lookup(name).is_some() {
            return Err(Error::Exists {
                kind: "input",
                name: name.to_string(),
            });
        }

        let mut props = PropertySet::new();
        props.set_str(PROP_NAME, 0, name)?;
        let props = self.wrap(props);
        let mesh = self.create_mesh()?;
        let input = self.wrap(MeshInput {
            name: name.to_string(),
            props,
            mesh,
            requested: Vec::new(),
            frozen: false,
        });
        self.effect_mut(effect)?.inputs.push((name.to_string(), input));
        Ok((input, props))
    }

    pub fn input_handle(&self, effect: ObjectKey, name: &str) -> Result<(ObjectKey, ObjectKey)> {
        let input = self
            .effect(effect)?
            .lookup(name)
            .ok_or_else(|| Error::NotFound {
                kind: "input",
                name: name.to_string(),
            })?;
        Ok((input, self.input(input)?.props))
    }

    pub fn request_attribute(&mut self, input: ObjectKey, request: RequestedAttribute) -> Result<()> {
        let input = self.input_mut(input)?;
        if input.frozen {
            return Err(Error::Frozen("requested attribute"));
        }
        let duplicate = input
            .requested
            .iter()
            .any(|r| r.attachment == request.attachment && r.name == request.name);
        if duplicate {
            return Err(Error::Exists {
                kind: "requested attribute",
                name: request.name,
            });
        }
        tracing::debug!(
            "input '{}' requests {} ({} x {}, {})",
            input.name,
            request.name,
            request.components,
            request.type_tag,
            if request.mandatory { "mandatory" } else { "optional" }
        );
        input.requested.push(request);
        Ok(())
    }

    /// Replace the mesh of an input, destroying the previous one.
    pub fn replace_input_mesh(&mut self, input: ObjectKey, mesh: ObjectKey) -> Result<()> {
        self.mesh(mesh)?;
        let old = std::mem::replace(&mut self.input_mut(input)?.mesh, mesh);
        if old != mesh && self.contains(old) {
            self.destroy(old)?;
        }
        Ok(())
    }

    /// Independent copy of a described effect, with parameters set to their
    /// defaults. The copy keeps the descriptor's stage until the plugin
    /// accepts it as an instance.
    pub fn clone_for_instance(&mut self, descriptor: ObjectKey) -> Result<ObjectKey> {
        let instance = self.deep_clone(descriptor)?;
        let param_set = self.effect(instance)?.param_set;
        if let Err(err) = self.apply_param_defaults(param_set) {
            self.destroy(instance)?;
            return Err(err);
        }
        Ok(instance)
    }

    /// Move an effect to `stage`. Leaving `Describing` freezes its inputs
    /// and parameter set, and clones inherit the freeze.
    pub fn set_effect_stage(&mut self, effect: ObjectKey, stage: EffectStage) -> Result<()> {
        let entry = self.effect_mut(effect)?;
        entry.stage = stage;
        if stage == EffectStage::Describing {
            return Ok(());
        }

        let param_set = entry.param_set;
        let inputs: Vec<ObjectKey> = entry.inputs.iter().map(|(_, key)| *key).collect();
        self.param_set_mut(param_set)?.frozen = true;
        for input in inputs {
            self.input_mut(input)?.frozen = true;
        }
        Ok(())
    }

    pub fn effect_stage(&self, effect: ObjectKey) -> Result<EffectStage> {
        Ok(self.effect(effect)?.stage)
    }

    pub fn input_infos(&self, effect: ObjectKey) -> Result<Vec<InputInfo>> {
        self.effect(effect)?
            .inputs
            .iter()
            .map(|(name, key)| {
                Ok(InputInfo {
                    name: name.clone(),
                    requested: self.input(*key)?.requested.clone(),
                })
            })
            .collect()
    }

    pub fn effect_param_infos(&self, effect: ObjectKey) -> Result<Vec<ParamInfo>> {
        self.param_infos(self.effect(effect)?.param_set)
    }
}
