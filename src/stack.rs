//! Stack headroom for recursion whose depth follows the input document.

use serde_json::Value;

const RED_ZONE: usize = 64 * 1024;
const STACK_SIZE: usize = 1024 * 1024;

/// Run `f`, moving onto a fresh heap-allocated stack segment first if less
/// than [`RED_ZONE`] bytes of the current stack remain.
pub(crate) fn guarded<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_SIZE, f)
}

/// Drop a decoded document without recursing into it.
pub(crate) fn dispose(value: Value) {
    let mut pending = vec![value];
    while let Some(mut value) = pending.pop() {
        match &mut value {
            Value::Array(items) => pending.append(items),
            Value::Object(map) => pending.extend(std::mem::take(map).into_iter().map(|(_, v)| v)),
            _ => {}
        }
    }
}
