//! Settings service over the key/value store.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::fee_engine::map_settings_error;
use crate::domain::ports::{SettingsCommand, SettingsQuery, SettingsRepository, UpdateUpiRequest};
use crate::domain::{Error, SettingKey, UpiSettings, parse_monthly_amount};

#[derive(Clone)]
pub struct SettingsService<S> {
    settings_repo: Arc<S>,
}

impl<S> SettingsService<S> {
    pub fn new(settings_repo: Arc<S>) -> Self {
        Self { settings_repo }
    }
}

impl<S> SettingsService<S>
where
    S: SettingsRepository,
{
    async fn read(&self, key: SettingKey) -> Result<Option<String>, Error> {
        self.settings_repo.get(key).await.map_err(map_settings_error)
    }

    async fn write(&self, key: SettingKey, value: &str) -> Result<(), Error> {
        self.settings_repo
            .put(key, value)
            .await
            .map_err(map_settings_error)
    }
}

fn required(value: &str, field: &'static str) -> Result<String, Error> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_request(format!("{field} must not be empty"))
            .with_details(json!({ "field": field })));
    }
    Ok(trimmed.to_owned())
}

#[async_trait]
impl<S> SettingsCommand for SettingsService<S>
where
    S: SettingsRepository,
{
    async fn set_monthly_due_amount(&self, amount: u32) -> Result<(), Error> {
        self.write(SettingKey::MonthlyDueAmount, &amount.to_string())
            .await?;
        info!(amount, "monthly due amount updated");
        Ok(())
    }

    async fn update_upi_settings(&self, request: UpdateUpiRequest) -> Result<UpiSettings, Error> {
        let upi_id = required(&request.upi_id, "upiId")?;
        let upi_phone = required(&request.upi_phone, "upiPhone")?;
        let upi_qr = request
            .upi_qr
            .map(|qr| qr.trim().to_owned())
            .filter(|qr| !qr.is_empty());

        self.write(SettingKey::UpiId, &upi_id).await?;
        self.write(SettingKey::UpiPhone, &upi_phone).await?;
        // A missing QR keeps whatever image was uploaded before.
        if let Some(qr) = &upi_qr {
            self.write(SettingKey::UpiQr, qr).await?;
        }
        let upi_qr = match upi_qr {
            Some(qr) => Some(qr),
            None => self.read(SettingKey::UpiQr).await?,
        };
        info!("upi settings updated");
        Ok(UpiSettings {
            upi_id: Some(upi_id),
            upi_phone: Some(upi_phone),
            upi_qr,
        })
    }
}

#[async_trait]
impl<S> SettingsQuery for SettingsService<S>
where
    S: SettingsRepository,
{
    async fn monthly_due_amount(&self) -> Result<Option<u32>, Error> {
        let Some(raw) = self.read(SettingKey::MonthlyDueAmount).await? else {
            return Ok(None);
        };
        let parsed = parse_monthly_amount(&raw);
        if parsed.is_none() {
            warn!(value = %raw, "stored monthly due amount is not a whole number");
        }
        Ok(parsed)
    }

    async fn upi_settings(&self) -> Result<UpiSettings, Error> {
        Ok(UpiSettings {
            upi_id: self.read(SettingKey::UpiId).await?,
            upi_phone: self.read(SettingKey::UpiPhone).await?,
            upi_qr: self.read(SettingKey::UpiQr).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{FixtureSettingsRepository, MockSettingsRepository, SettingsRepositoryError};

    #[tokio::test]
    async fn monthly_amount_round_trips_through_the_store() {
        let service = SettingsService::new(Arc::new(FixtureSettingsRepository::default()));
        assert_eq!(service.monthly_due_amount().await.expect("read"), None);

        service.set_monthly_due_amount(1200).await.expect("write");
        assert_eq!(service.monthly_due_amount().await.expect("read"), Some(1200));
    }

    #[tokio::test]
    async fn garbage_amount_reads_as_unset() {
        let repo = FixtureSettingsRepository::with_values([(
            SettingKey::MonthlyDueAmount,
            "lots",
        )]);
        let service = SettingsService::new(Arc::new(repo));
        assert_eq!(service.monthly_due_amount().await.expect("read"), None);
    }

    #[tokio::test]
    async fn upi_update_without_qr_keeps_the_old_image() {
        let repo = FixtureSettingsRepository::with_values([(SettingKey::UpiQr, "qr/old.png")]);
        let service = SettingsService::new(Arc::new(repo));

        let updated = service
            .update_upi_settings(UpdateUpiRequest {
                upi_id: " centre@upi ".to_owned(),
                upi_phone: "9800000000".to_owned(),
                upi_qr: None,
            })
            .await
            .expect("update succeeds");

        assert_eq!(
            updated,
            UpiSettings {
                upi_id: Some("centre@upi".to_owned()),
                upi_phone: Some("9800000000".to_owned()),
                upi_qr: Some("qr/old.png".to_owned()),
            }
        );
        assert_eq!(service.upi_settings().await.expect("read"), updated);
    }

    #[tokio::test]
    async fn blank_upi_id_is_rejected() {
        let service = SettingsService::new(Arc::new(FixtureSettingsRepository::default()));
        let error = service
            .update_upi_settings(UpdateUpiRequest {
                upi_id: " ".to_owned(),
                upi_phone: "9800000000".to_owned(),
                upi_qr: None,
            })
            .await
            .expect_err("blank id");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.details(), Some(&json!({ "field": "upiId" })));
    }

    #[tokio::test]
    async fn store_outage_is_service_unavailable() {
        let mut repo = MockSettingsRepository::new();
        repo.expect_put()
            .return_once(|_, _| Err(SettingsRepositoryError::connection("refused")));

        let error = SettingsService::new(Arc::new(repo))
            .set_monthly_due_amount(900)
            .await
            .expect_err("store down");
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }
}
