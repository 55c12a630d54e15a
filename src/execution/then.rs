use super::submit::work_item;
use crate::error::Result;
use crate::executor::panic_handler::capture;
use crate::executor::Executor;
use crate::handle::{promise, ResultHandle};

/// Attach `body` to `predecessor`; it runs on `exec` once the predecessor is
/// ready and its `Result` becomes the returned handle's outcome.
pub(crate) fn continue_with<E, T, F, R>(
    exec: &E,
    description: &'static str,
    predecessor: ResultHandle<T>,
    body: F,
) -> Result<ResultHandle<R>>
where
    E: Executor + Clone + 'static,
    T: Send + 'static,
    F: FnOnce(ResultHandle<T>) -> Result<R> + Send + 'static,
    R: Send + 'static,
{
    let (promise, handle) = promise();
    let exec = exec.clone();
    let ready = predecessor.clone();

    predecessor.attach(Box::new(move || {
        tracing::trace!(description, "continuation fired");
        let task = work_item(&exec, description, move || {
            promise.complete(capture(move || body(ready)).and_then(|r| r));
        });
        exec.schedule(task);
    }))?;

    Ok(handle)
}

/// Run `f` on `exec` after `predecessor` becomes ready.
///
/// `f` receives the ready predecessor and can take its value or error from
/// it. The continuation always goes through `exec`, even when the predecessor
/// is already ready. Each handle takes one continuation: attaching through a
/// second clone fails with
/// [`Error::ContinuationAlreadyAttached`](crate::Error::ContinuationAlreadyAttached)
/// and schedules nothing.
pub fn then_execute<E, T, F, R>(
    exec: &E,
    predecessor: ResultHandle<T>,
    f: F,
) -> Result<ResultHandle<R>>
where
    E: Executor + Clone + 'static,
    T: Send + 'static,
    F: FnOnce(ResultHandle<T>) -> R + Send + 'static,
    R: Send + 'static,
{
    continue_with(exec, "then_execute", predecessor, move |ready| Ok(f(ready)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::executor::{InlineExecutor, Task, ThreadPoolExecutor};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct Counting {
        scheduled: Arc<AtomicUsize>,
    }

    impl Executor for Counting {
        fn schedule(&self, task: Task) {
            self.scheduled.fetch_add(1, Ordering::SeqCst);
            task.execute();
        }
    }

    #[test]
    fn test_runs_after_predecessor() {
        let exec = Counting::default();
        let (trigger, pred) = promise();

        let next = then_execute(&exec, pred, |p| p.wait_and_get().map(|v: i32| v + 1)).unwrap();
        assert!(!next.is_ready());
        assert_eq!(exec.scheduled.load(Ordering::SeqCst), 0);

        trigger.set_value(1);
        assert_eq!(exec.scheduled.load(Ordering::SeqCst), 1);
        assert_eq!(next.wait_and_get(), Ok(Ok(2)));
    }

    #[test]
    fn test_ready_predecessor_still_scheduled() {
        let exec = Counting::default();
        let next = then_execute(&exec, ResultHandle::ready(3), |p| p.try_take()).unwrap();

        assert_eq!(exec.scheduled.load(Ordering::SeqCst), 1);
        assert_eq!(next.wait_and_get(), Ok(Some(Ok(3))));
    }

    #[test]
    fn test_second_attach_fails_before_scheduling() {
        let exec = Counting::default();
        let (trigger, pred) = promise::<u8>();
        let again = pred.clone();

        then_execute(&exec, pred, |_| ()).unwrap();
        let err = then_execute(&exec, again, |_| ()).unwrap_err();
        assert_eq!(err, Error::ContinuationAlreadyAttached);
        assert_eq!(exec.scheduled.load(Ordering::SeqCst), 0);

        trigger.set_value(0);
        assert_eq!(exec.scheduled.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_error_reaches_continuation() {
        let failed = ResultHandle::<i32>::failed(Error::panicked("upstream"));
        let next = then_execute(&InlineExecutor::new(), failed, |p| {
            p.wait_and_get().unwrap_err()
        })
        .unwrap();
        assert_eq!(next.wait_and_get(), Ok(Error::panicked("upstream")));
    }

    #[test]
    fn test_panic_in_continuation() {
        let next = then_execute(&InlineExecutor::new(), ResultHandle::ready(()), |_| -> u8 {
            panic!("in continuation")
        })
        .unwrap();
        assert_eq!(next.wait_and_get(), Err(Error::panicked("in continuation")));
    }

    #[test]
    fn test_chain_on_pool() {
        let exec = ThreadPoolExecutor::with_threads(2).unwrap();
        let (trigger, first) = promise();

        let second = then_execute(&exec, first, |p| p.wait_and_get().unwrap_or(0) * 10).unwrap();
        let third = then_execute(&exec, second, |p| p.wait_and_get().unwrap_or(0) + 5).unwrap();

        assert!(!third.wait_timeout(Duration::from_millis(10)));
        trigger.set_value(4);
        assert_eq!(third.wait_and_get(), Ok(45));
    }
}
