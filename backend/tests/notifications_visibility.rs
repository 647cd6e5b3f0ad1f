//! Notification fan-out, visibility and retention on PostgreSQL.

use std::sync::Arc;

use rstest::{fixture, rstest};
use tutorhub::domain::ports::{
    FixtureRealtimePublisher, NotificationCommand, NotificationQuery, RosterRepository,
};
use tutorhub::domain::{
    Audience, ClassKey, ErrorCode, EventKind, NotificationService, StudentId,
};
use tutorhub::outbound::persistence::{DieselNotificationRepository, DieselRosterRepository};
use tutorhub::outbound::realtime::BroadcastHub;

mod support;

use support::{FixedClock, TestDatabase, registration};

type Service = NotificationService<DieselNotificationRepository>;

fn service_at(db: &TestDatabase, clock: FixedClock) -> Service {
    NotificationService::new(
        Arc::new(DieselNotificationRepository::new(db.pool.clone())),
        Arc::new(FixtureRealtimePublisher),
        Arc::new(clock),
    )
}

fn enrol(db: &TestDatabase, class_key: ClassKey, roll: i32) -> StudentId {
    let roster = DieselRosterRepository::new(db.pool.clone());
    let record = registration(&format!("Student {roll}"), class_key, roll);
    db.block_on(roster.insert_student(&record))
        .expect("student inserted");
    record.student.id
}

fn messages(db: &TestDatabase, service: &Service, student: StudentId) -> Vec<String> {
    db.block_on(service.notifications_for(student))
        .expect("notifications load")
        .into_iter()
        .map(|n| n.message)
        .collect()
}

#[fixture]
fn db() -> Option<TestDatabase> {
    support::database()
}

#[rstest]
fn students_see_their_class_and_everyone_announcements(db: Option<TestDatabase>) {
    let Some(db) = db else { return };
    let nine = enrol(&db, ClassKey::Nine, 1);
    let ten = enrol(&db, ClassKey::Ten, 2);
    let early = service_at(&db, FixedClock::at(2025, 3, 1, 9));
    let later = service_at(&db, FixedClock::at(2025, 3, 2, 9));

    db.block_on(early.broadcast(Audience::Everyone, "Holiday on Friday".to_owned()))
        .expect("broadcast");
    db.block_on(later.broadcast(Audience::Class(ClassKey::Nine), "Algebra test".to_owned()))
        .expect("broadcast");

    assert_eq!(
        messages(&db, &later, nine),
        ["Algebra test", "Holiday on Friday"],
        "newest first"
    );
    assert_eq!(messages(&db, &later, ten), ["Holiday on Friday"]);
}

#[rstest]
fn unknown_students_have_no_inbox(db: Option<TestDatabase>) {
    let Some(db) = db else { return };
    let service = service_at(&db, FixedClock::at(2025, 3, 1, 9));

    let error = db
        .block_on(service.notifications_for(StudentId::random()))
        .expect_err("unknown student");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
fn marking_read_needs_the_notification_to_be_visible(db: Option<TestDatabase>) {
    let Some(db) = db else { return };
    let nine = enrol(&db, ClassKey::Nine, 1);
    let ten = enrol(&db, ClassKey::Ten, 2);
    let service = service_at(&db, FixedClock::at(2025, 3, 1, 9));
    let notice = db
        .block_on(service.broadcast(Audience::Class(ClassKey::Ten), "Bring notebooks".to_owned()))
        .expect("broadcast");

    let hidden = db
        .block_on(service.mark_read(nine, notice.id))
        .expect_err("not visible to class 9");
    assert_eq!(hidden.code(), ErrorCode::NotFound);

    db.block_on(service.mark_read(ten, notice.id))
        .expect("marked read");
    let inbox = db
        .block_on(service.notifications_for(ten))
        .expect("notifications load");
    assert!(inbox.iter().all(|n| n.is_read));
}

#[rstest]
fn purge_removes_only_notifications_past_retention(db: Option<TestDatabase>) {
    let Some(db) = db else { return };
    let student = enrol(&db, ClassKey::Six, 1);
    db.block_on(
        service_at(&db, FixedClock::at(2025, 3, 1, 9))
            .broadcast(Audience::Everyone, "Old news".to_owned()),
    )
    .expect("broadcast");
    db.block_on(
        service_at(&db, FixedClock::at(2025, 3, 12, 9))
            .broadcast(Audience::Everyone, "Fresh news".to_owned()),
    )
    .expect("broadcast");

    let purger = service_at(&db, FixedClock::at(2025, 3, 20, 9)).with_retention_days(15);
    let purged = db.block_on(purger.purge_expired()).expect("purge");

    assert_eq!(purged, 1);
    assert_eq!(messages(&db, &purger, student), ["Fresh news"]);
}

#[rstest]
fn broadcasts_reach_live_subscribers(db: Option<TestDatabase>) {
    let Some(db) = db else { return };
    let hub = BroadcastHub::default();
    let mut events = hub.subscribe();
    let service = NotificationService::new(
        Arc::new(DieselNotificationRepository::new(db.pool.clone())),
        Arc::new(hub.clone()),
        Arc::new(FixedClock::at(2025, 3, 1, 9)),
    );

    db.block_on(service.broadcast(Audience::Everyone, "Results are out".to_owned()))
        .expect("broadcast");

    let event = events.try_recv().expect("event published");
    assert_eq!(event.kind, EventKind::NewNotification);
    assert_eq!(event.room, None);
    assert_eq!(event.payload.message, "Results are out");
}
