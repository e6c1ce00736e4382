use super::{Audit, LearningModuleId, TabConfigurationId};

/// Binds a Teams channel tab to a learning module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TabConfiguration {
    pub id: TabConfigurationId,
    pub team_id: String,
    pub channel_id: Option<String>,
    pub learning_module_id: LearningModuleId,
    pub audit: Audit,
}
