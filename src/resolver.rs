use crate::models::{ActivityStatus, Curriculum, Module, NextActivityRef, NextReason};

/// Picks the activity a learner should be sent to.
///
/// Scans in curriculum order (modules, then activities). An open session
/// (`needs_resume` on an uncompleted activity) anywhere in the course beats
/// the first uncompleted activity; `None` means nothing is pending.
pub fn resolve_next(curriculum: &Curriculum) -> Option<NextActivityRef> {
    let mut first_pending = None;

    for (module, index, activity) in curriculum.positions() {
        match activity.status() {
            ActivityStatus::Resume => {
                return Some(to_ref(module, index, NextReason::Resume));
            }
            ActivityStatus::Pending if first_pending.is_none() => {
                first_pending = Some((module, index));
            }
            _ => {}
        }
    }

    first_pending.map(|(module, index)| to_ref(module, index, NextReason::Pending))
}

fn to_ref(module: &Module, activity_index: usize, reason: NextReason) -> NextActivityRef {
    let activity = &module.activities[activity_index];
    NextActivityRef {
        module_index: module.index,
        activity_index,
        title: activity.title.clone(),
        activity_id: activity.id.clone(),
        module_title: module.title.clone(),
        reason,
    }
}
