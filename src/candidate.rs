use std::fmt::Display;
use std::hint::black_box;
use std::sync::Arc;

use crate::error::CandidateFault;

type CandidateFn<A> = Arc<dyn Fn(&A) -> Result<(), CandidateFault> + Send + Sync>;

/// A registered function together with its display name and registration index.
pub struct Candidate<A> {
    index: usize,
    name: String,
    func: CandidateFn<A>,
}

impl<A> Clone for Candidate<A> {
    fn clone(&self) -> Self {
        Self {
            index: self.index,
            name: self.name.clone(),
            func: Arc::clone(&self.func),
        }
    }
}

impl<A> std::fmt::Debug for Candidate<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Candidate")
            .field("index", &self.index)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<A> Candidate<A> {
    pub fn new<F, R>(index: usize, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&A) -> R + Send + Sync + 'static,
    {
        Self {
            index,
            name: name.into(),
            func: Arc::new(move |args: &A| -> Result<(), CandidateFault> {
                black_box(f(args));
                Ok(())
            }),
        }
    }

    /// A candidate whose `Err` results count as execution faults.
    pub fn fallible<F, T, E>(index: usize, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&A) -> Result<T, E> + Send + Sync + 'static,
        E: Display,
    {
        Self {
            index,
            name: name.into(),
            func: Arc::new(move |args: &A| match f(args) {
                Ok(v) => {
                    black_box(v);
                    Ok(())
                }
                Err(e) => Err(CandidateFault::new(e.to_string())),
            }),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    pub(crate) fn call(&self, args: &A) -> Result<(), CandidateFault> {
        (self.func)(args)
    }
}

/// Display name for a callable type: the last path segment of a named
/// function, `closure#<index>` for anything anonymous.
pub fn derive_name<F>(index: usize) -> String {
    let full = std::any::type_name::<F>();
    if full.contains("{{closure}}") || full.starts_with("fn(") || full.starts_with('&') {
        return format!("closure#{index}");
    }
    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::").next().unwrap_or(path).to_string()
}
