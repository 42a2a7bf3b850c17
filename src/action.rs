use std::ffi::CStr;
use std::fmt;

/// Actions the host sends through `mainEntry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Load,
    Unload,
    /// Handle is an empty descriptor.
    Describe,
    /// Handle is a fresh instance cloned from the descriptor.
    CreateInstance,
    DestroyInstance,
    /// Handle is an instance with its inputs populated.
    Cook,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::Load,
        Action::Unload,
        Action::Describe,
        Action::CreateInstance,
        Action::DestroyInstance,
        Action::Cook,
    ];

    pub fn name(self) -> &'static CStr {
        match self {
            Action::Load => c"OfxActionLoad",
            Action::Unload => c"OfxActionUnload",
            Action::Describe => c"OfxActionDescribe",
            Action::CreateInstance => c"OfxActionCreateInstance",
            Action::DestroyInstance => c"OfxActionDestroyInstance",
            Action::Cook => c"OfxMeshEffectActionCook",
        }
    }

    /// Whether the action targets an effect handle.
    pub fn takes_effect(self) -> bool {
        !matches!(self, Action::Load | Action::Unload)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().to_str().unwrap_or("?"))
    }
}
