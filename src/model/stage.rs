/// Lifecycle of a loaded plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStage {
    /// `OfxActionLoad` not sent yet, or the plugin was unloaded.
    #[default]
    Unloaded,
    /// Load succeeded; effects may be described.
    Loaded,
    /// The plugin returned a fatal status. Every later action is refused.
    Poisoned,
}

impl SessionStage {
    pub fn label(&self) -> &'static str {
        match self {
            SessionStage::Unloaded => "UNLOADED",
            SessionStage::Loaded => "LOADED",
            SessionStage::Poisoned => "POISONED",
        }
    }
}

/// Lifecycle of a single effect handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EffectStage {
    /// Fresh descriptor handed to `OfxActionDescribe`.
    #[default]
    Describing,
    /// Describe succeeded; the descriptor can be instantiated.
    Described,
    /// Deep clone of a descriptor that went through `OfxActionCreateInstance`.
    Instantiated,
    /// Instance cooked at least once.
    Cooked,
}

impl EffectStage {
    pub fn label(&self) -> &'static str {
        match self {
            EffectStage::Describing => "DESCRIBING",
            EffectStage::Described => "DESCRIBED",
            EffectStage::Instantiated => "INSTANTIATED",
            EffectStage::Cooked => "COOKED",
        }
    }

    /// Whether cook and destroy-instance actions accept this effect.
    pub fn is_instance(&self) -> bool {
        matches!(self, EffectStage::Instantiated | EffectStage::Cooked)
    }
}
