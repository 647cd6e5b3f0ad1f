//! Driving port for reviewing dropout requests.

use async_trait::async_trait;

use crate::domain::{DropoutRequest, DropoutStatus, Error};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DropoutQuery: Send + Sync {
    async fn list_dropouts(&self, status: DropoutStatus) -> Result<Vec<DropoutRequest>, Error>;
}
