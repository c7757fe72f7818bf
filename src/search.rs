//! Debounced search input.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Quiet period after the last keystroke before the list re-renders.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(180);

/// Delayed, cancellable callbacks on the page's event loop.
///
/// Cancelling a handle whose task already ran must be a no-op.
pub trait Scheduler {
    type Handle;

    fn schedule(&mut self, delay: Duration, task: Box<dyn FnOnce()>) -> Self::Handle;
    fn cancel(&mut self, handle: Self::Handle);
}

/// Owns the pending render for the search field. A new input cancels the
/// previous render before scheduling its own, so only the last one runs.
pub struct SearchController<S: Scheduler> {
    scheduler: S,
    pending: Option<S::Handle>,
}

impl<S: Scheduler> SearchController<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            pending: None,
        }
    }

    pub fn on_input<F>(&mut self, render: F)
    where
        F: FnOnce() + 'static,
    {
        self.cancel();
        self.pending = Some(self.scheduler.schedule(DEBOUNCE_DELAY, Box::new(render)));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

/// Virtual-time scheduler. Tasks only run when [`ManualScheduler::advance`]
/// moves the clock past their deadline.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    queue: Rc<RefCell<TaskQueue>>,
}

#[derive(Default)]
struct TaskQueue {
    now: Duration,
    next_id: u64,
    tasks: Vec<ScheduledTask>,
}

struct ScheduledTask {
    id: TaskId,
    due: Duration,
    run: Box<dyn FnOnce()>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward by `by`, running due tasks in deadline order.
    /// Returns how many tasks ran.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.queue.borrow().now + by;
        let mut ran = 0;
        loop {
            let next = {
                let mut queue = self.queue.borrow_mut();
                let position = queue
                    .tasks
                    .iter()
                    .enumerate()
                    .filter(|(_, task)| task.due <= target)
                    .min_by_key(|(_, task)| (task.due, task.id.0))
                    .map(|(position, _)| position);
                position.map(|position| {
                    let task = queue.tasks.remove(position);
                    queue.now = task.due;
                    task
                })
            };
            let Some(task) = next else { break };
            (task.run)();
            ran += 1;
        }
        self.queue.borrow_mut().now = target;
        ran
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().tasks.len()
    }
}

impl Scheduler for ManualScheduler {
    type Handle = TaskId;

    fn schedule(&mut self, delay: Duration, task: Box<dyn FnOnce()>) -> TaskId {
        let mut queue = self.queue.borrow_mut();
        let id = TaskId(queue.next_id);
        queue.next_id += 1;
        let due = queue.now + delay;
        queue.tasks.push(ScheduledTask { id, due, run: task });
        id
    }

    fn cancel(&mut self, handle: TaskId) {
        self.queue
            .borrow_mut()
            .tasks
            .retain(|task| task.id != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, ManualScheduler) {
        (Rc::new(RefCell::new(Vec::new())), ManualScheduler::new())
    }

    #[test]
    fn render_waits_for_the_quiet_period() {
        let (log, scheduler) = recorder();
        let mut search = SearchController::new(scheduler.clone());
        let sink = Rc::clone(&log);
        search.on_input(move || sink.borrow_mut().push("render"));

        assert_eq!(scheduler.advance(Duration::from_millis(179)), 0);
        assert!(log.borrow().is_empty());
        assert_eq!(scheduler.advance(Duration::from_millis(1)), 1);
        assert_eq!(*log.borrow(), vec!["render"]);
    }

    #[test]
    fn rapid_inputs_collapse_into_the_last_render() {
        let (log, scheduler) = recorder();
        let mut search = SearchController::new(scheduler.clone());
        for value in ["r", "re", "red"] {
            let sink = Rc::clone(&log);
            search.on_input(move || sink.borrow_mut().push(value));
            scheduler.advance(Duration::from_millis(100));
        }
        assert_eq!(scheduler.pending(), 1);
        scheduler.advance(DEBOUNCE_DELAY);
        assert_eq!(*log.borrow(), vec!["red"]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn inputs_after_the_quiet_period_each_render() {
        let (log, scheduler) = recorder();
        let mut search = SearchController::new(scheduler.clone());
        for value in ["web", "datos"] {
            let sink = Rc::clone(&log);
            search.on_input(move || sink.borrow_mut().push(value));
            scheduler.advance(DEBOUNCE_DELAY);
        }
        assert_eq!(*log.borrow(), vec!["web", "datos"]);
    }

    #[test]
    fn cancelling_a_fired_task_is_harmless() {
        let (log, scheduler) = recorder();
        let mut search = SearchController::new(scheduler.clone());
        let sink = Rc::clone(&log);
        search.on_input(move || sink.borrow_mut().push("once"));
        scheduler.advance(DEBOUNCE_DELAY);
        search.cancel();
        search.cancel();
        assert_eq!(*log.borrow(), vec!["once"]);
    }

    #[test]
    fn tasks_may_schedule_more_tasks() {
        let scheduler = ManualScheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut inner = scheduler.clone();
        let sink = Rc::clone(&log);
        let mut outer = scheduler.clone();
        outer.schedule(
            Duration::from_millis(10),
            Box::new(move || {
                sink.borrow_mut().push(1);
                let sink = Rc::clone(&sink);
                inner.schedule(
                    Duration::from_millis(10),
                    Box::new(move || sink.borrow_mut().push(2)),
                );
            }),
        );
        assert_eq!(scheduler.advance(Duration::from_millis(30)), 2);
        assert_eq!(*log.borrow(), vec![1, 2]);
    }
}
