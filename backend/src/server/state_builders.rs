//! Builders wiring repositories into domain services and HTTP state.

use std::sync::Arc;

use actix_web::web;
use chrono::FixedOffset;
use mockable::Clock;

use tutorhub::domain::ports::{
    CourseworkRepository, DropoutRepository, FixtureCourseworkRepository,
    FixtureDropoutRepository, FixtureLeaderboardRepository, FixtureLedgerRepository,
    FixtureNotificationRepository, FixturePaymentRepository, FixtureRosterRepository,
    FixtureSettingsRepository, LeaderboardRepository, LedgerRepository, NotificationRepository,
    PaymentRepository, RealtimePublisher, RosterRepository, SettingsRepository,
};
use tutorhub::domain::{
    CourseworkService, DropoutService, FeeEngine, LeaderboardService, NotificationService,
    PaymentService, RosterService, SettingsService,
};
use tutorhub::inbound::http::state::HttpState;
use tutorhub::outbound::persistence::{
    DbPool, DieselCourseworkRepository, DieselDropoutRepository, DieselLeaderboardRepository,
    DieselLedgerRepository, DieselNotificationRepository, DieselPaymentRepository,
    DieselRosterRepository, DieselSettingsRepository,
};

use super::ServerConfig;

/// One repository per driven port, sharing a backing store.
struct Repositories<Lg, St, Ro, Pa, Dr, No, Co, Lb> {
    ledger: Arc<Lg>,
    settings: Arc<St>,
    roster: Arc<Ro>,
    payments: Arc<Pa>,
    dropouts: Arc<Dr>,
    notifications: Arc<No>,
    coursework: Arc<Co>,
    leaderboard: Arc<Lb>,
}

type DieselRepositories = Repositories<
    DieselLedgerRepository,
    DieselSettingsRepository,
    DieselRosterRepository,
    DieselPaymentRepository,
    DieselDropoutRepository,
    DieselNotificationRepository,
    DieselCourseworkRepository,
    DieselLeaderboardRepository,
>;

type FixtureRepositories = Repositories<
    FixtureLedgerRepository,
    FixtureSettingsRepository,
    FixtureRosterRepository,
    FixturePaymentRepository,
    FixtureDropoutRepository,
    FixtureNotificationRepository,
    FixtureCourseworkRepository,
    FixtureLeaderboardRepository,
>;

fn diesel_repositories(pool: &DbPool) -> DieselRepositories {
    Repositories {
        ledger: Arc::new(DieselLedgerRepository::new(pool.clone())),
        settings: Arc::new(DieselSettingsRepository::new(pool.clone())),
        roster: Arc::new(DieselRosterRepository::new(pool.clone())),
        payments: Arc::new(DieselPaymentRepository::new(pool.clone())),
        dropouts: Arc::new(DieselDropoutRepository::new(pool.clone())),
        notifications: Arc::new(DieselNotificationRepository::new(pool.clone())),
        coursework: Arc::new(DieselCourseworkRepository::new(pool.clone())),
        leaderboard: Arc::new(DieselLeaderboardRepository::new(pool.clone())),
    }
}

fn fixture_repositories() -> FixtureRepositories {
    Repositories {
        ledger: Arc::default(),
        settings: Arc::default(),
        roster: Arc::default(),
        payments: Arc::default(),
        dropouts: Arc::default(),
        notifications: Arc::default(),
        coursework: Arc::default(),
        leaderboard: Arc::default(),
    }
}

/// Everything services need besides their repositories.
#[derive(Clone)]
pub(super) struct ServiceContext {
    pub(super) publisher: Arc<dyn RealtimePublisher>,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) utc_offset: FixedOffset,
    pub(super) retention_days: u32,
}

fn build_services<Lg, St, Ro, Pa, Dr, No, Co, Lb>(
    repos: Repositories<Lg, St, Ro, Pa, Dr, No, Co, Lb>,
    ctx: ServiceContext,
) -> HttpState
where
    Lg: LedgerRepository + 'static,
    St: SettingsRepository + 'static,
    Ro: RosterRepository + 'static,
    Pa: PaymentRepository + 'static,
    Dr: DropoutRepository + 'static,
    No: NotificationRepository + 'static,
    Co: CourseworkRepository + 'static,
    Lb: LeaderboardRepository + 'static,
{
    let fee_engine = Arc::new(FeeEngine::new(
        repos.ledger.clone(),
        repos.settings.clone(),
        ctx.publisher.clone(),
        ctx.clock.clone(),
        ctx.utc_offset,
    ));
    let payments = Arc::new(PaymentService::new(
        repos.payments,
        repos.ledger.clone(),
        ctx.clock.clone(),
    ));
    let roster = Arc::new(RosterService::new(repos.roster.clone()));
    let dropouts = Arc::new(DropoutService::new(
        repos.dropouts,
        repos.ledger,
        repos.roster,
        ctx.clock.clone(),
    ));
    let notifications = Arc::new(
        NotificationService::new(repos.notifications, ctx.publisher.clone(), ctx.clock.clone())
            .with_retention_days(ctx.retention_days),
    );
    let coursework = Arc::new(CourseworkService::new(
        repos.coursework,
        ctx.publisher,
        ctx.clock,
    ));
    let settings = Arc::new(SettingsService::new(repos.settings));

    HttpState {
        dues: fee_engine.clone(),
        dues_query: fee_engine,
        payments: payments.clone(),
        payments_query: payments,
        roster: roster.clone(),
        roster_query: roster,
        leaderboard: Arc::new(LeaderboardService::new(repos.leaderboard)),
        dropouts: dropouts.clone(),
        dropouts_query: dropouts,
        notifications: notifications.clone(),
        notifications_query: notifications,
        coursework,
        settings: settings.clone(),
        settings_query: settings,
    }
}

/// Build the shared HTTP state, backed by PostgreSQL when a pool is
/// configured and by empty fixtures otherwise.
pub(super) fn build_http_state(
    config: &ServerConfig,
    ctx: ServiceContext,
) -> web::Data<HttpState> {
    let state = match &config.db_pool {
        Some(pool) => build_services(diesel_repositories(pool), ctx),
        None => {
            tracing::warn!("no database configured; serving fixture data");
            build_services(fixture_repositories(), ctx)
        }
    };
    web::Data::new(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use tutorhub::domain::ports::FixtureRealtimePublisher;
    use tutorhub::domain::{DEFAULT_MONTHLY_DUE_AMOUNT, StudentId};

    struct FixedClock(chrono::DateTime<Utc>);

    impl Clock for FixedClock {
        fn local(&self) -> chrono::DateTime<chrono::Local> {
            self.0.with_timezone(&chrono::Local)
        }

        fn utc(&self) -> chrono::DateTime<Utc> {
            self.0
        }
    }

    fn fixture_state() -> HttpState {
        let ctx = ServiceContext {
            publisher: Arc::new(FixtureRealtimePublisher),
            clock: Arc::new(FixedClock(
                Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0)
                    .single()
                    .expect("valid timestamp"),
            )),
            utc_offset: FixedOffset::east_opt(330 * 60).expect("offset"),
            retention_days: 15,
        };
        build_services(fixture_repositories(), ctx)
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_wiring_bills_nobody() {
        let state = fixture_state();
        let outcome = state
            .dues
            .assign_current_month()
            .await
            .expect("fixture assignment succeeds");
        assert_eq!(outcome.month.to_string(), "March 2025");
        assert_eq!(outcome.amount, DEFAULT_MONTHLY_DUE_AMOUNT);
        assert_eq!(outcome.created, 0);
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_wiring_shares_the_settings_store() {
        let state = fixture_state();
        state
            .settings
            .set_monthly_due_amount(1800)
            .await
            .expect("store amount");
        assert_eq!(
            state
                .settings_query
                .monthly_due_amount()
                .await
                .expect("read amount"),
            Some(1800)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_wiring_reports_unknown_students() {
        let state = fixture_state();
        let error = state
            .dues_query
            .fee_status(StudentId::random())
            .await
            .expect_err("no students exist");
        assert_eq!(error.code(), tutorhub::domain::ErrorCode::NotFound);
    }
}
