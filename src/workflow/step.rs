use crate::workflow::{MessageId, ModuleError};

/// Named states of one module's workflow. The step token of a message id is
/// the state's token; anything else is rejected before the module runs.
pub trait StepMachine: Sized + Copy + 'static {
    const MODULE: &'static str;
    const STEPS: &'static [Self];

    fn token(self) -> &'static str;

    fn from_token(token: &str) -> Option<Self> {
        Self::STEPS.iter().copied().find(|step| step.token() == token)
    }

    fn message_id(self) -> MessageId {
        MessageId::new(Self::MODULE, self.token())
    }

    fn resolve(message_id: &MessageId) -> Result<Self, ModuleError> {
        Self::from_token(message_id.step_token()).ok_or_else(|| ModuleError::UnknownStep {
            module: Self::MODULE.to_string(),
            step: message_id.step_token().to_string(),
        })
    }
}
