use crate::model::ScheduleEntry;
use crate::shift::TimeWindow;

/// The occupant that blocks a drop into a cell, if any.
///
/// A cell blocks when it already holds a different, non-empty entry
/// whose window overlaps the incoming one. Entries with incomplete
/// times cannot be proven disjoint, so they block.
pub fn blocking_entry<'a>(
    occupant: Option<&'a ScheduleEntry>,
    source_id: i64,
    incoming: Option<&TimeWindow>,
) -> Option<&'a ScheduleEntry> {
    let occupant = occupant?;
    if occupant.id == source_id || occupant.is_empty() {
        return None;
    }

    match (incoming, TimeWindow::of_entry(occupant)) {
        (Some(incoming), Some(occupied)) if !incoming.overlaps(&occupied) => None,
        _ => Some(occupant),
    }
}
