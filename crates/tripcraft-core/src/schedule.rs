//! Day organizer
//!
//! The generation service returns each day as a flat list in which transport
//! entries precede the activity they lead to. Presentation wants the nested
//! form: an activity with its arrival leg attached. `organize_day` performs
//! that transformation in a single left-to-right walk.

use tracing::debug;

use crate::models::{Activity, ActivityKind, DaySchedule, TransportLeg};

/// Nest transport legs under the activities they precede
///
/// A single pending-transport slot is carried through the walk. A transport
/// entry fills the slot, overwriting any leg already held: only the most
/// recent immediately-preceding leg survives, since exactly one leg precedes
/// each destination. A non-transport entry is emitted with the held leg
/// attached (if any). A leg still held at the end of the day becomes a
/// synthetic end-of-day entry so no transport is ever silently dropped.
///
/// Output length never exceeds input length, every input transport entry is
/// represented in exactly one output entry, and the relative order of
/// non-transport activities is preserved.
pub fn organize_day(activities: &[Activity]) -> Vec<Activity> {
    let mut organized = Vec::with_capacity(activities.len());
    let mut pending: Option<TransportLeg> = None;

    for activity in activities {
        if activity.kind.is_transport() {
            let leg = TransportLeg::from_activity(activity);
            if let Some(dropped) = pending.replace(leg) {
                debug!(dropped = %dropped.summary(), "consecutive transport legs, most recent wins");
            }
        } else {
            let mut stop = activity.clone();
            stop.transport = pending.take();
            organized.push(stop);
        }
    }

    if let Some(leg) = pending.take() {
        organized.push(end_of_day_entry(leg));
    }

    organized
}

/// Organize every day of a schedule, preserving day order
pub fn organize_plan(schedule: &DaySchedule) -> DaySchedule {
    let mut organized = DaySchedule::new();
    for (key, activities) in schedule.iter() {
        organized.push_day(key, organize_day(activities));
    }
    organized
}

/// Synthetic terminal entry for a day that ends on a transport leg
fn end_of_day_entry(leg: TransportLeg) -> Activity {
    Activity {
        kind: ActivityKind::EndOfDay,
        name: leg.summary(),
        time: None,
        estimated_cost: leg.estimated_cost(),
        detail: None,
        note: None,
        location: None,
        routes: None,
        transport: Some(leg),
    }
}
