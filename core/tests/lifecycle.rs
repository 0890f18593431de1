//! End-to-end lifecycle tests over the in-memory stores.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{NaiveDate, NaiveTime};
use nuelreserve_core::mocks::{MemoryStore, RecordingNotifier};
use nuelreserve_core::stores::{NewService, NewSlot, ServiceStore, SlotStore};
use nuelreserve_core::{
    AvailabilitySlot, BookingEnvironment, BookingError, BookingLifecycle, BookingStatus,
    NotificationType, RealtimeHub, Service, ServiceId, UserId,
};

type Lifecycle = BookingLifecycle<MemoryStore, MemoryStore, MemoryStore, RecordingNotifier>;

struct Fixture {
    lifecycle: Lifecycle,
    store: MemoryStore,
    notifier: RecordingNotifier,
    provider: UserId,
    customer: UserId,
}

fn fixture() -> Fixture {
    let store = MemoryStore::new();
    let notifier = RecordingNotifier::new();
    let lifecycle = BookingLifecycle::new(BookingEnvironment {
        services: store.clone(),
        slots: store.clone(),
        bookings: store.clone(),
        notifier: notifier.clone(),
        realtime: RealtimeHub::new(),
    });
    Fixture {
        lifecycle,
        store,
        notifier,
        provider: UserId::new(),
        customer: UserId::new(),
    }
}

async fn seed_service(fixture: &Fixture, price: f64) -> Service {
    ServiceStore::create(
        &fixture.store,
        NewService {
            provider_id: fixture.provider,
            title: "Deep Tissue Massage".to_string(),
            description: None,
            category: "wellness".to_string(),
            duration_minutes: 60,
            price,
            currency: "USD".to_string(),
            location: None,
        },
    )
    .await
    .unwrap()
}

async fn seed_slot(fixture: &Fixture, service_id: ServiceId) -> AvailabilitySlot {
    SlotStore::create(
        &fixture.store,
        NewSlot {
            service_id,
            provider_id: fixture.provider,
            date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        },
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn booking_happy_path_denormalizes_and_notifies() {
    let fx = fixture();
    let service = seed_service(&fx, 50.0).await;
    let slot = seed_slot(&fx, service.id).await;

    let booking = fx
        .lifecycle
        .create_booking(fx.customer, "Casey", service.id, slot.id, None)
        .await
        .unwrap();

    assert_eq!(booking.status, BookingStatus::Pending);
    assert!((booking.total_price - 50.0).abs() < f64::EPSILON);
    assert_eq!(booking.booking_date, slot.date);
    assert_eq!(booking.start_time, slot.start_time);
    assert_eq!(booking.availability_id, slot.id);

    let stored_slot = SlotStore::get(&fx.store, slot.id).await.unwrap();
    assert!(stored_slot.is_booked);

    let emitted = fx.notifier.emitted();
    assert_eq!(emitted.len(), 1);
    assert_eq!(emitted[0].user_id, fx.provider);
    assert_eq!(emitted[0].content.kind, NotificationType::BookingRequest);
    assert!(emitted[0].content.message.contains("Casey"));
    assert!(emitted[0].content.message.contains("Deep Tissue Massage"));

    // Provider confirms; customer gets the booking_confirmed notification.
    let confirmed = fx
        .lifecycle
        .transition_status(booking.id, fx.provider, BookingStatus::Confirmed)
        .await
        .unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);

    let emitted = fx.notifier.emitted();
    assert_eq!(emitted.len(), 2);
    assert_eq!(emitted[1].user_id, fx.customer);
    assert_eq!(emitted[1].content.kind, NotificationType::BookingConfirmed);
}

#[tokio::test]
async fn racing_customers_get_exactly_one_booking() {
    let fx = fixture();
    let service = seed_service(&fx, 50.0).await;
    let slot = seed_slot(&fx, service.id).await;

    let customer_a = UserId::new();
    let customer_b = UserId::new();
    let (a, b) = tokio::join!(
        fx.lifecycle
            .create_booking(customer_a, "A", service.id, slot.id, None),
        fx.lifecycle
            .create_booking(customer_b, "B", service.id, slot.id, None),
    );

    let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one of two racing bookings succeeds");
    let loser = if a.is_ok() { b } else { a };
    assert_eq!(loser.unwrap_err(), BookingError::SlotAlreadyBooked);
}

#[tokio::test]
async fn second_open_booking_for_same_service_conflicts() {
    let fx = fixture();
    let service = seed_service(&fx, 50.0).await;
    let first_slot = seed_slot(&fx, service.id).await;
    let second_slot = SlotStore::create(
        &fx.store,
        NewSlot {
            service_id: service.id,
            provider_id: fx.provider,
            date: NaiveDate::from_ymd_opt(2025, 7, 2).unwrap(),
            start_time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
        },
    )
    .await
    .unwrap();

    fx.lifecycle
        .create_booking(fx.customer, "Casey", service.id, first_slot.id, None)
        .await
        .unwrap();

    let err = fx
        .lifecycle
        .create_booking(fx.customer, "Casey", service.id, second_slot.id, None)
        .await
        .unwrap_err();
    assert_eq!(err, BookingError::DuplicateOpenBooking);

    // The second slot must not be consumed by the failed attempt.
    let second = SlotStore::get(&fx.store, second_slot.id).await.unwrap();
    assert!(!second.is_booked);
}

#[tokio::test]
async fn cancelled_booking_allows_rebooking_but_keeps_slot_consumed() {
    let fx = fixture();
    let service = seed_service(&fx, 50.0).await;
    let slot = seed_slot(&fx, service.id).await;

    let booking = fx
        .lifecycle
        .create_booking(fx.customer, "Casey", service.id, slot.id, None)
        .await
        .unwrap();
    fx.lifecycle
        .transition_status(booking.id, fx.customer, BookingStatus::Cancelled)
        .await
        .unwrap();

    // Carried-over product behavior: the slot stays consumed forever.
    let stored_slot = SlotStore::get(&fx.store, slot.id).await.unwrap();
    assert!(stored_slot.is_booked);

    // But the customer may book the service again through another slot.
    let other_slot = SlotStore::create(
        &fx.store,
        NewSlot {
            service_id: service.id,
            provider_id: fx.provider,
            date: NaiveDate::from_ymd_opt(2025, 7, 3).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        },
    )
    .await
    .unwrap();
    let second = fx
        .lifecycle
        .create_booking(fx.customer, "Casey", service.id, other_slot.id, None)
        .await
        .unwrap();
    assert_eq!(second.status, BookingStatus::Pending);
}

#[tokio::test]
async fn completed_booking_blocks_rebooking() {
    let fx = fixture();
    let service = seed_service(&fx, 50.0).await;
    let slot = seed_slot(&fx, service.id).await;

    let booking = fx
        .lifecycle
        .create_booking(fx.customer, "Casey", service.id, slot.id, None)
        .await
        .unwrap();
    fx.lifecycle
        .transition_status(booking.id, fx.provider, BookingStatus::Confirmed)
        .await
        .unwrap();
    fx.lifecycle
        .transition_status(booking.id, fx.provider, BookingStatus::Completed)
        .await
        .unwrap();

    let other_slot = SlotStore::create(
        &fx.store,
        NewSlot {
            service_id: service.id,
            provider_id: fx.provider,
            date: NaiveDate::from_ymd_opt(2025, 7, 5).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        },
    )
    .await
    .unwrap();
    let err = fx
        .lifecycle
        .create_booking(fx.customer, "Casey", service.id, other_slot.id, None)
        .await
        .unwrap_err();
    assert_eq!(err, BookingError::DuplicateOpenBooking);
}

#[tokio::test]
async fn transitions_out_of_terminal_statuses_fail() {
    let fx = fixture();
    let service = seed_service(&fx, 50.0).await;
    let slot = seed_slot(&fx, service.id).await;

    let booking = fx
        .lifecycle
        .create_booking(fx.customer, "Casey", service.id, slot.id, None)
        .await
        .unwrap();
    fx.lifecycle
        .transition_status(booking.id, fx.provider, BookingStatus::Cancelled)
        .await
        .unwrap();

    let err = fx
        .lifecycle
        .transition_status(booking.id, fx.provider, BookingStatus::Confirmed)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        BookingError::InvalidTransition {
            from: BookingStatus::Cancelled,
            to: BookingStatus::Confirmed,
        }
    );

    // Status is unchanged by the failed transition.
    let stored = nuelreserve_core::stores::BookingStore::get(&fx.store, booking.id)
        .await
        .unwrap();
    assert_eq!(stored.status, BookingStatus::Cancelled);
}

#[tokio::test]
async fn customer_cannot_confirm_and_strangers_are_forbidden() {
    let fx = fixture();
    let service = seed_service(&fx, 50.0).await;
    let slot = seed_slot(&fx, service.id).await;

    let booking = fx
        .lifecycle
        .create_booking(fx.customer, "Casey", service.id, slot.id, None)
        .await
        .unwrap();

    let err = fx
        .lifecycle
        .transition_status(booking.id, fx.customer, BookingStatus::Confirmed)
        .await
        .unwrap_err();
    assert!(err.is_forbidden());

    let err = fx
        .lifecycle
        .transition_status(booking.id, UserId::new(), BookingStatus::Cancelled)
        .await
        .unwrap_err();
    assert_eq!(err, BookingError::NotAParticipant);
}

#[tokio::test]
async fn provider_cancellation_notifies_the_customer_and_vice_versa() {
    let fx = fixture();
    let service = seed_service(&fx, 50.0).await;
    let slot = seed_slot(&fx, service.id).await;
    let booking = fx
        .lifecycle
        .create_booking(fx.customer, "Casey", service.id, slot.id, None)
        .await
        .unwrap();

    fx.lifecycle
        .transition_status(booking.id, fx.provider, BookingStatus::Cancelled)
        .await
        .unwrap();
    let emitted = fx.notifier.emitted();
    let last = emitted.last().unwrap();
    assert_eq!(last.content.kind, NotificationType::BookingCancelled);
    assert_eq!(last.user_id, fx.customer, "provider acted, customer notified");

    // Fresh fixture for the customer-acted direction.
    let fx = fixture();
    let service = seed_service(&fx, 50.0).await;
    let slot = seed_slot(&fx, service.id).await;
    let booking = fx
        .lifecycle
        .create_booking(fx.customer, "Casey", service.id, slot.id, None)
        .await
        .unwrap();
    fx.lifecycle
        .transition_status(booking.id, fx.customer, BookingStatus::Cancelled)
        .await
        .unwrap();
    let emitted = fx.notifier.emitted();
    let last = emitted.last().unwrap();
    assert_eq!(last.user_id, fx.provider, "customer acted, provider notified");
}

#[tokio::test]
async fn notification_failure_does_not_fail_the_booking() {
    let fx = fixture();
    let service = seed_service(&fx, 50.0).await;
    let slot = seed_slot(&fx, service.id).await;

    fx.notifier.set_failing(true);
    let booking = fx
        .lifecycle
        .create_booking(fx.customer, "Casey", service.id, slot.id, None)
        .await
        .unwrap();
    assert_eq!(booking.status, BookingStatus::Pending);
    let stored_slot = SlotStore::get(&fx.store, slot.id).await.unwrap();
    assert!(stored_slot.is_booked);
}

#[tokio::test]
async fn inactive_service_is_not_bookable() {
    let fx = fixture();
    let mut service = seed_service(&fx, 50.0).await;
    let slot = seed_slot(&fx, service.id).await;

    service.is_active = false;
    ServiceStore::update(&fx.store, &service).await.unwrap();

    let err = fx
        .lifecycle
        .create_booking(fx.customer, "Casey", service.id, slot.id, None)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        BookingError::NotFound {
            resource: "Service",
        }
    );
}

#[tokio::test]
async fn slot_from_another_service_is_rejected() {
    let fx = fixture();
    let service = seed_service(&fx, 50.0).await;
    let other_service = seed_service(&fx, 80.0).await;
    let slot = seed_slot(&fx, other_service.id).await;

    let err = fx
        .lifecycle
        .create_booking(fx.customer, "Casey", service.id, slot.id, None)
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn booked_slot_cannot_be_deleted() {
    let fx = fixture();
    let service = seed_service(&fx, 50.0).await;
    let slot = seed_slot(&fx, service.id).await;
    fx.lifecycle
        .create_booking(fx.customer, "Casey", service.id, slot.id, None)
        .await
        .unwrap();

    let err = SlotStore::delete(&fx.store, slot.id).await.unwrap_err();
    assert_eq!(err, BookingError::SlotInUse);

    // A free slot deletes fine.
    let free = seed_slot(&fx, service.id).await;
    SlotStore::delete(&fx.store, free.id).await.unwrap();
}

#[tokio::test]
async fn price_changes_do_not_drift_into_existing_bookings() {
    let fx = fixture();
    let mut service = seed_service(&fx, 50.0).await;
    let slot = seed_slot(&fx, service.id).await;

    let booking = fx
        .lifecycle
        .create_booking(fx.customer, "Casey", service.id, slot.id, None)
        .await
        .unwrap();

    service.price = 90.0;
    ServiceStore::update(&fx.store, &service).await.unwrap();

    let stored = nuelreserve_core::stores::BookingStore::get(&fx.store, booking.id)
        .await
        .unwrap();
    assert!((stored.total_price - 50.0).abs() < f64::EPSILON);
}
