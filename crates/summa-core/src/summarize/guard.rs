use crate::error::SummarizeError;
use std::{cell::Cell, marker::PhantomData};

thread_local! {
    static ACTIVE: Cell<bool> = const { Cell::new(false) };
}

///
/// NestingGuard
///
/// Marks a summarize invocation as running on this thread. Entering while
/// another invocation is active fails with `IllegalNesting`, whether the
/// inner call comes from the proxy or from any other relation.
///

pub(crate) struct NestingGuard {
    // not Send: the flag lives in this thread's local storage
    _marker: PhantomData<*const ()>,
}

impl NestingGuard {
    pub(crate) fn enter() -> Result<Self, SummarizeError> {
        if ACTIVE.with(|active| active.replace(true)) {
            return Err(SummarizeError::IllegalNesting);
        }

        Ok(Self {
            _marker: PhantomData,
        })
    }
}

impl Drop for NestingGuard {
    fn drop(&mut self) {
        ACTIVE.with(|active| active.set(false));
    }
}
