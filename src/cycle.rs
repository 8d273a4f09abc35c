//! Long-break cadence: which interval follows the one that just finished.

use crate::models::IntervalKind;

/// Outcome of a completed interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleStep {
    pub next: IntervalKind,
    pub cycle_count: u32,
}

/// Picks the interval that follows `completed`.
///
/// Every completed focus interval advances the cycle; reaching
/// `pomodoros_before_long_break` earns a long break and restarts the count.
/// Any break is followed by focus, and a long break always leaves the count at 0.
pub fn next_interval(
    completed: IntervalKind,
    cycle_count: u32,
    pomodoros_before_long_break: u32,
) -> CycleStep {
    match completed {
        IntervalKind::Focus => {
            let count = cycle_count.saturating_add(1);
            if count >= pomodoros_before_long_break {
                CycleStep {
                    next: IntervalKind::LongBreak,
                    cycle_count: 0,
                }
            } else {
                CycleStep {
                    next: IntervalKind::ShortBreak,
                    cycle_count: count,
                }
            }
        }
        IntervalKind::ShortBreak => CycleStep {
            next: IntervalKind::Focus,
            cycle_count,
        },
        IntervalKind::LongBreak => CycleStep {
            next: IntervalKind::Focus,
            cycle_count: 0,
        },
    }
}
