use super::shape::Shape;
use super::submit::{submit, submit_fallible};
use super::then::continue_with;
use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::handle::ResultHandle;
use std::sync::Arc;

/// Submit `f(element)` for every element of `shape`, in shape order.
///
/// Handle `i` belongs to element `i` whatever order the elements finish in.
/// Elements are independent: one failing leaves the others untouched.
pub fn bulk_async_execute<E, S, F, R>(exec: &E, shape: S, f: F) -> Vec<ResultHandle<R>>
where
    E: Executor + ?Sized,
    S: Shape,
    F: Fn(S::Element) -> R + Send + Sync + 'static,
    R: Send + 'static,
{
    let f = Arc::new(f);
    let elements = shape.into_elements();

    let mut results = Vec::with_capacity(elements.size_hint().0);
    for elem in elements {
        let f = f.clone();
        results.push(submit(exec, "bulk_async_execute", move || f(elem)));
    }
    tracing::trace!(size = results.len(), "bulk fan-out");
    results
}

/// [`bulk_async_execute`] for a fallible `f`: an `Err` fails that element's
/// handle.
pub fn try_bulk_async_execute<E, S, F, R>(exec: &E, shape: S, f: F) -> Vec<ResultHandle<R>>
where
    E: Executor + ?Sized,
    S: Shape,
    F: Fn(S::Element) -> Result<R> + Send + Sync + 'static,
    R: Send + 'static,
{
    let f = Arc::new(f);
    shape
        .into_elements()
        .map(|elem| {
            let f = f.clone();
            submit_fallible(exec, "bulk_async_execute", move || f(elem))
        })
        .collect()
}

/// Wait for every handle and collect the values in order.
///
/// Always waits for all of them. If any failed, returns the error of the
/// lowest-index failure; later errors are dropped.
pub fn wait_all<R>(handles: Vec<ResultHandle<R>>) -> Result<Vec<R>> {
    let mut values = Vec::with_capacity(handles.len());
    let mut first_error: Option<Error> = None;

    for handle in handles {
        match handle.wait_and_get() {
            Ok(value) if first_error.is_none() => values.push(value),
            Ok(_) => {}
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(values),
    }
}

/// [`wait_all`] for logical tasks: awaits each handle instead of blocking.
pub async fn when_all<R>(handles: Vec<ResultHandle<R>>) -> Result<Vec<R>> {
    let mut values = Vec::with_capacity(handles.len());
    let mut first_error: Option<Error> = None;

    for handle in handles {
        match handle.await {
            Ok(value) if first_error.is_none() => values.push(value),
            Ok(_) => {}
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(values),
    }
}

/// Fan `f` out over `shape` and wait for all of it.
///
/// Values come back in shape order. A unit-returning `f` yields a `Vec<()>`,
/// which does not allocate. Only panics count as element failures here; for
/// an `f` returning `Result`, use [`try_bulk_sync_execute`].
pub fn bulk_sync_execute<E, S, F, R>(exec: &E, shape: S, f: F) -> Result<Vec<R>>
where
    E: Executor + ?Sized,
    S: Shape,
    F: Fn(S::Element) -> R + Send + Sync + 'static,
    R: Send + 'static,
{
    wait_all(bulk_async_execute(exec, shape, f))
}

/// [`bulk_sync_execute`] for a fallible `f`: the lowest-index `Err` (or panic)
/// is reported once every element has finished.
pub fn try_bulk_sync_execute<E, S, F, R>(exec: &E, shape: S, f: F) -> Result<Vec<R>>
where
    E: Executor + ?Sized,
    S: Shape,
    F: Fn(S::Element) -> Result<R> + Send + Sync + 'static,
    R: Send + 'static,
{
    wait_all(try_bulk_async_execute(exec, shape, f))
}

/// Once `predecessor` is ready, fan `f(element, &value)` out over `shape`.
///
/// Nothing is submitted for the elements until the predecessor is ready. The
/// returned handle becomes ready after every element has finished, with the
/// values in shape order or the lowest-index error. If the predecessor itself
/// failed, its error is forwarded and no element runs.
pub fn bulk_then_execute<E, S, T, F, R>(
    exec: &E,
    shape: S,
    predecessor: ResultHandle<T>,
    f: F,
) -> Result<ResultHandle<Vec<R>>>
where
    E: Executor + Clone + 'static,
    S: Shape + Send + 'static,
    T: Send + Sync + 'static,
    F: Fn(S::Element, &T) -> R + Send + Sync + 'static,
    R: Send + 'static,
{
    let inner = exec.clone();
    continue_with(exec, "bulk_then_execute", predecessor, move |ready| {
        let value = Arc::new(ready.wait_and_get()?);
        let handles = bulk_async_execute(&inner, shape, move |elem| f(elem, &value));
        wait_all(handles)
    })
}
