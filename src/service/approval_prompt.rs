use async_trait::async_trait;
use inquire::Confirm;

/// Gate in front of irreversible bulk deletion. Wiping the whole store
/// needs an affirmative signal beyond the parsed command itself.
#[async_trait]
pub trait ApprovalPromptService: Send + Sync {
    async fn confirm_delete_all(&self) -> Result<bool, String>;
}

/// Interactive console confirmation, defaulting to "no".
pub struct ConsoleApprovalPrompt;

#[async_trait]
impl ApprovalPromptService for ConsoleApprovalPrompt {
    async fn confirm_delete_all(&self) -> Result<bool, String> {
        Confirm::new("This will delete ALL calendar events. Continue?")
            .with_default(false)
            .prompt()
            .map_err(|err| format!("Failed to read confirmation: {}", err))
    }
}

/// Non-interactive stand-in: approves when built from an explicit --yes,
/// declines otherwise. Also what tests drive the clear flow with.
pub struct PresetApprovalPrompt {
    approve: bool,
}

impl PresetApprovalPrompt {
    pub fn new(approve: bool) -> Self {
        Self { approve }
    }
}

#[async_trait]
impl ApprovalPromptService for PresetApprovalPrompt {
    async fn confirm_delete_all(&self) -> Result<bool, String> {
        Ok(self.approve)
    }
}
