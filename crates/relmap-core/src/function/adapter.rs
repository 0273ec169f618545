//! Type-erased adapters between raw values and typed callbacks.

use relmap_common::RelmapResult;

use super::{AggregateFunction, ScalarFunction};
use crate::args;
use crate::value::{ToValue, Value};

/// A scalar function behind a raw-value interface.
pub(crate) trait ErasedScalar: Send {
    fn invoke(&mut self, values: &[Value]) -> RelmapResult<Value>;
}

pub(crate) struct ScalarAdapter<F>(pub(crate) F);

impl<F: ScalarFunction> ErasedScalar for ScalarAdapter<F> {
    fn invoke(&mut self, values: &[Value]) -> RelmapResult<Value> {
        let args = args::build::<F::Args<'_>>(values, values.len())?;
        let output = self.0.call(args)?;
        Ok(output.to_value())
    }
}

/// Accumulator state of one aggregation behind a raw-value interface.
pub(crate) trait ErasedAggregate: Send {
    fn step(&mut self, values: &[Value]) -> RelmapResult<()>;

    fn finalize(self: Box<Self>) -> Value;
}

pub(crate) struct AggregateAdapter<F>(pub(crate) F);

impl<F: AggregateFunction> ErasedAggregate for AggregateAdapter<F> {
    fn step(&mut self, values: &[Value]) -> RelmapResult<()> {
        let args = args::build::<F::Args<'_>>(values, values.len())?;
        self.0.step(args)
    }

    fn finalize(self: Box<Self>) -> Value {
        self.0.finalize().to_value()
    }
}

/// Creates a fresh accumulator per aggregation.
pub(crate) type AggregateFactory = Box<dyn Fn() -> Box<dyn ErasedAggregate> + Send>;

pub(crate) fn aggregate_factory<F, M>(make: M) -> AggregateFactory
where
    F: AggregateFunction,
    M: Fn() -> F + Send + 'static,
{
    Box::new(move || -> Box<dyn ErasedAggregate> { Box::new(AggregateAdapter(make())) })
}
