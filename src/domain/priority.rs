use super::Task;

/// Orders tasks high → medium → low. The sort is stable, so tasks of equal
/// priority keep their relative order.
pub fn sort_by_priority(tasks: &mut [Task]) {
    tasks.sort_by_key(|task| task.priority.rank());
}

#[cfg(test)]
pub fn is_priority_ordered(tasks: &[Task]) -> bool {
    tasks
        .windows(2)
        .all(|pair| pair[0].priority.rank() <= pair[1].priority.rank())
}
