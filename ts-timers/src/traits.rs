use crate::error::Result;
use crate::spec::TimerSpec;
use crate::types::{Timer, TimerId, TimerList};
use async_trait::async_trait;

/// Timer management operations, scoped to one user and request.
#[async_trait]
pub trait TimerService: Send + Sync {
    async fn list_timers(&self) -> Result<TimerList>;

    async fn get_timer(&self, id: &TimerId) -> Result<Timer>;

    async fn create_timer(&self, spec: &TimerSpec) -> Result<Timer>;

    async fn delete_timer(&self, id: &TimerId) -> Result<()>;

    /// Deletes every timer this skill created for the user.
    async fn delete_all_timers(&self) -> Result<()>;

    async fn pause_timer(&self, id: &TimerId) -> Result<()>;

    async fn resume_timer(&self, id: &TimerId) -> Result<()>;
}
