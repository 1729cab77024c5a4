use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};

use engine::{
    AppointmentStatus, CreateAppointmentCmd, EngineError, MAX_DURATION_MINUTES,
    NewProfessionalCmd, NewServiceCmd, RescheduleCmd, Slot, SlotInterval, WorkingDays, overlaps,
};

mod common;
use common::{at, engine_in, monday, salon};

#[tokio::test]
async fn empty_monday_has_seventeen_hour_slots() {
    let s = salon().await;
    let slots = s
        .engine
        .available_slots(s.professional_id, monday(), s.cut_id, None)
        .await
        .unwrap();

    assert_eq!(slots.len(), 17);
    assert_eq!(
        slots.first(),
        Some(&Slot {
            start: at(5, 9, 0),
            end: at(5, 10, 0)
        })
    );
    assert_eq!(
        slots.last(),
        Some(&Slot {
            start: at(5, 17, 0),
            end: at(5, 18, 0)
        })
    );
}

#[tokio::test]
async fn booking_removes_the_overlapping_slots() {
    let s = salon().await;
    s.engine
        .create_appointment(s.booking(s.cut_id, at(5, 10, 0)))
        .await
        .unwrap();

    let slots = s
        .engine
        .available_slots(s.professional_id, monday(), s.cut_id, None)
        .await
        .unwrap();

    // 09:30, 10:00 and 10:30 overlap [10:00, 11:00); 09:00 and 11:00 abut it.
    assert_eq!(slots.len(), 14);
    let starts: Vec<_> = slots.iter().map(|slot| slot.start).collect();
    assert!(starts.contains(&at(5, 9, 0)));
    assert!(starts.contains(&at(5, 11, 0)));
    assert!(!starts.contains(&at(5, 9, 30)));
    assert!(!starts.contains(&at(5, 10, 0)));
    assert!(!starts.contains(&at(5, 10, 30)));
}

#[tokio::test]
async fn slots_are_deterministic_without_writes() {
    let s = salon().await;
    s.engine
        .create_appointment(s.booking(s.cut_id, at(5, 14, 0)))
        .await
        .unwrap();

    let first = s
        .engine
        .available_slots(s.professional_id, monday(), s.cut_id, None)
        .await
        .unwrap();
    let second = s
        .engine
        .available_slots(s.professional_id, monday(), s.cut_id, None)
        .await
        .unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn weekend_has_no_slots() {
    let s = salon().await;
    let saturday = NaiveDate::from_ymd_opt(2099, 1, 10).unwrap();
    let slots = s
        .engine
        .available_slots(s.professional_id, saturday, s.cut_id, None)
        .await
        .unwrap();
    assert!(slots.is_empty());
}

#[tokio::test]
async fn agenda_opening_in_a_dst_gap_starts_after_the_jump() {
    // Europe/Rome jumps from 02:00 to 03:00 on Sunday 2024-03-31.
    let engine = engine_in(chrono_tz::Europe::Rome).await;
    let professional_id = engine
        .new_professional(NewProfessionalCmd {
            name: "Early".to_string(),
            working_days: WorkingDays::NONE.with(Weekday::Sun),
            work_start: NaiveTime::from_hms_opt(2, 30, 0).unwrap(),
            work_end: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            slot_interval: SlotInterval::Minutes30,
        })
        .await
        .unwrap();
    let cut_id = engine
        .new_service(NewServiceCmd::new("Cut", 60, 10_000))
        .await
        .unwrap();

    let sunday = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
    let slots = engine
        .available_slots(professional_id, sunday, cut_id, None)
        .await
        .unwrap();
    let starts: Vec<_> = slots.iter().map(|slot| slot.start).collect();
    // 03:00, 03:30, 04:00, 04:30 and 05:00 CEST
    let three_cest = Utc.with_ymd_and_hms(2024, 3, 31, 1, 0, 0).unwrap();
    let expected: Vec<_> = (0..5)
        .map(|step| three_cest + Duration::minutes(30 * step))
        .collect();
    assert_eq!(starts, expected);
}

#[tokio::test]
async fn excluded_appointment_does_not_block_its_own_slots() {
    let s = salon().await;
    let booked = s
        .engine
        .create_appointment(s.booking(s.cut_id, at(5, 10, 0)))
        .await
        .unwrap();

    let slots = s
        .engine
        .available_slots(s.professional_id, monday(), s.cut_id, Some(booked.id))
        .await
        .unwrap();
    assert_eq!(slots.len(), 17);
}

#[tokio::test]
async fn finished_appointments_free_the_agenda() {
    let s = salon().await;
    let appointment = s
        .engine
        .create_appointment(s.booking(s.cut_id, at(5, 10, 0)))
        .await
        .unwrap();
    s.engine
        .transition_appointment(appointment.id, AppointmentStatus::Cancelled, None)
        .await
        .unwrap();

    let slots = s
        .engine
        .available_slots(s.professional_id, monday(), s.cut_id, None)
        .await
        .unwrap();
    assert_eq!(slots.len(), 17);

    s.engine
        .create_appointment(s.booking(s.cut_id, at(5, 10, 0)))
        .await
        .unwrap();
}

#[tokio::test]
async fn unknown_professional_or_service_is_not_found() {
    let s = salon().await;
    let err = s
        .engine
        .available_slots(uuid::Uuid::new_v4(), monday(), s.cut_id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = s
        .engine
        .available_slots(s.professional_id, monday(), uuid::Uuid::new_v4(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn services_longer_than_a_day_are_refused() {
    let s = salon().await;
    for minutes in [MAX_DURATION_MINUTES + 1, 1_000_000_000_000] {
        let err = s
            .engine
            .new_service(NewServiceCmd::new("Forever", minutes, 10_000))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidSchedule(_)));
    }

    let all_day = s
        .engine
        .new_service(NewServiceCmd::new("All day", MAX_DURATION_MINUTES, 10_000))
        .await
        .unwrap();
    let slots = s
        .engine
        .available_slots(s.professional_id, monday(), all_day, None)
        .await
        .unwrap();
    assert!(slots.is_empty());
    let err = s
        .engine
        .create_appointment(s.booking(all_day, at(5, 9, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidSchedule(_)));
}

#[tokio::test]
async fn overlapping_booking_is_rejected() {
    let s = salon().await;
    s.engine
        .create_appointment(s.booking(s.cut_id, at(5, 10, 0)))
        .await
        .unwrap();

    let err = s
        .engine
        .create_appointment(s.booking(s.cut_id, at(5, 10, 30)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::SlotNoLongerAvailable(_)));

    // Abutting bookings are fine.
    s.engine
        .create_appointment(s.booking(s.cut_id, at(5, 11, 0)))
        .await
        .unwrap();
    s.engine
        .create_appointment(s.booking(s.cut_id, at(5, 9, 0)))
        .await
        .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_bookings_of_one_slot_have_one_winner() {
    let s = salon().await;
    let engine = Arc::new(s.engine);

    let mut handles = Vec::new();
    for client in ["client-a", "client-b"] {
        let engine = Arc::clone(&engine);
        let cmd = CreateAppointmentCmd::new(client, s.cut_id, at(5, 10, 0))
            .professional_id(s.professional_id);
        handles.push(tokio::spawn(
            async move { engine.create_appointment(cmd).await },
        ));
    }

    let mut won = 0;
    let mut lost = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => won += 1,
            Err(EngineError::SlotNoLongerAvailable(_)) => lost += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!((won, lost), (1, 1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_bookings_never_overlap() {
    let s = salon().await;
    let engine = Arc::new(s.engine);

    let mut handles = Vec::new();
    for minutes in (0..8).map(|step| step * 15) {
        let engine = Arc::clone(&engine);
        let start_at = at(5, 12, 0) + Duration::minutes(minutes);
        let cmd = CreateAppointmentCmd::new("client", s.cut_id, start_at)
            .professional_id(s.professional_id);
        handles.push(tokio::spawn(
            async move { engine.create_appointment(cmd).await },
        ));
    }
    for handle in handles {
        let _ = handle.await.unwrap();
    }

    let booked = engine
        .appointments(&engine::AppointmentListFilter {
            professional_id: Some(s.professional_id),
            statuses: Some(AppointmentStatus::BLOCKING.to_vec()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(!booked.is_empty());
    for (i, a) in booked.iter().enumerate() {
        for b in &booked[i + 1..] {
            assert!(
                !overlaps(a.start_at, a.end_at, b.start_at, b.end_at),
                "{} overlaps {}",
                a.id,
                b.id
            );
        }
    }
}

#[tokio::test]
async fn booking_outside_working_hours_is_rejected() {
    let s = salon().await;

    let early = s
        .engine
        .create_appointment(s.booking(s.cut_id, at(5, 8, 30)))
        .await
        .unwrap_err();
    assert!(matches!(early, EngineError::InvalidSchedule(_)));

    let spills_over = s
        .engine
        .create_appointment(s.booking(s.cut_id, at(5, 17, 30)))
        .await
        .unwrap_err();
    assert!(matches!(spills_over, EngineError::InvalidSchedule(_)));

    let saturday = s
        .engine
        .create_appointment(s.booking(s.cut_id, at(10, 10, 0)))
        .await
        .unwrap_err();
    assert!(matches!(saturday, EngineError::InvalidSchedule(_)));
}

#[tokio::test]
async fn booking_in_the_past_is_rejected() {
    let s = salon().await;
    let yesterday = Utc::now() - Duration::days(1);
    let err = s
        .engine
        .create_appointment(s.booking(s.cut_id, yesterday))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidSchedule(_)));
}

#[tokio::test]
async fn unassigned_appointments_skip_agenda_checks() {
    let s = salon().await;
    for _ in 0..2 {
        let appointment = s
            .engine
            .create_appointment(CreateAppointmentCmd::new("walk-in", s.cut_id, at(10, 7, 0)))
            .await
            .unwrap();
        assert_eq!(appointment.professional_id, None);
    }
}

#[tokio::test]
async fn reschedule_keeps_length_and_excludes_itself() {
    let s = salon().await;
    let appointment = s
        .engine
        .create_appointment(s.booking(s.cut_id, at(5, 10, 0)))
        .await
        .unwrap();

    // Moving half an hour overlaps only the appointment itself.
    let moved = s
        .engine
        .reschedule_appointment(RescheduleCmd::new(appointment.id, at(5, 10, 30)))
        .await
        .unwrap();
    assert_eq!(moved.start_at, at(5, 10, 30));
    assert_eq!(moved.end_at, at(5, 11, 30));
    assert_eq!(moved.length(), appointment.length());

    s.engine
        .create_appointment(s.booking(s.cut_id, at(5, 14, 0)))
        .await
        .unwrap();
    let err = s
        .engine
        .reschedule_appointment(RescheduleCmd::new(appointment.id, at(5, 13, 30)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::SlotNoLongerAvailable(_)));

    let unchanged = s.engine.appointment(appointment.id).await.unwrap();
    assert_eq!(unchanged.start_at, at(5, 10, 30));
}

#[tokio::test]
async fn reschedule_to_another_day_moves_the_business_date() {
    let s = salon().await;
    let appointment = s
        .engine
        .create_appointment(s.booking(s.cut_id, at(5, 10, 0)))
        .await
        .unwrap();

    let moved = s
        .engine
        .reschedule_appointment(RescheduleCmd::new(appointment.id, at(6, 16, 0)))
        .await
        .unwrap();
    assert_eq!(moved.date, NaiveDate::from_ymd_opt(2099, 1, 6).unwrap());

    let monday_slots = s
        .engine
        .available_slots(s.professional_id, monday(), s.cut_id, None)
        .await
        .unwrap();
    assert_eq!(monday_slots.len(), 17);
}

#[tokio::test]
async fn terminal_appointments_cannot_be_rescheduled() {
    let s = salon().await;
    let appointment = s
        .engine
        .create_appointment(s.booking(s.cut_id, at(5, 10, 0)))
        .await
        .unwrap();
    s.engine
        .transition_appointment(appointment.id, AppointmentStatus::Cancelled, None)
        .await
        .unwrap();

    let err = s
        .engine
        .reschedule_appointment(RescheduleCmd::new(appointment.id, at(5, 15, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition(_)));
}
