//! Registration and invocation of user-defined functions.

use std::collections::HashMap;
use std::fmt;

use relmap_common::{RelmapError, RelmapResult, StorageConfig};

use super::adapter::{aggregate_factory, AggregateFactory, ErasedAggregate, ErasedScalar, ScalarAdapter};
use super::{AggregateFunction, FunctionKind, ScalarFunction};
use crate::args::{ArgTuple, ParamShape};
use crate::value::{Value, ValueType};

/// Metadata of a registered function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionInfo {
    name: String,
    kind: FunctionKind,
    shape: ParamShape,
    deterministic: bool,
    param_types: Vec<Option<ValueType>>,
}

impl FunctionInfo {
    /// Name as registered.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scalar or aggregate.
    pub fn kind(&self) -> FunctionKind {
        self.kind
    }

    /// Declared parameter shape.
    pub fn shape(&self) -> ParamShape {
        self.shape
    }

    /// Whether the function is deterministic. Aggregates always are.
    pub fn is_deterministic(&self) -> bool {
        self.deterministic
    }

    /// Declared storage class per parameter; empty for variadic functions.
    pub fn param_types(&self) -> &[Option<ValueType>] {
        &self.param_types
    }

    fn check_count(&self, actual: usize) -> RelmapResult<()> {
        match self.shape {
            ParamShape::Fixed(expected) if expected != actual => Err(RelmapError::WrongArgumentCount {
                name: self.name.clone(),
                expected,
                actual,
            }),
            _ => Ok(()),
        }
    }
}

enum Callable {
    Scalar(Box<dyn ErasedScalar>),
    Aggregate(AggregateFactory),
}

struct Registered {
    info: FunctionInfo,
    callable: Callable,
}

/// Functions registered with one storage, keyed by case-insensitive name.
pub struct FunctionRegistry {
    functions: HashMap<String, Registered>,
    max_function_args: usize,
    trace_invocations: bool,
}

fn key(name: &str) -> String {
    name.to_ascii_uppercase()
}

fn log_failure(name: &str, err: &RelmapError) {
    if err.is_decode_error() {
        tracing::debug!(function = name, error = %err, "argument decoding failed, invocation aborted");
    }
}

impl FunctionRegistry {
    /// Creates an empty registry honoring the function limits of `config`.
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            functions: HashMap::new(),
            max_function_args: config.max_function_args,
            trace_invocations: config.trace_invocations,
        }
    }

    fn register(&mut self, info: FunctionInfo, callable: Callable) -> RelmapResult<()> {
        if let ParamShape::Fixed(count) = info.shape {
            if count > self.max_function_args {
                return Err(RelmapError::TooManyArguments {
                    name: info.name,
                    count,
                    max: self.max_function_args,
                });
            }
        }

        tracing::debug!(
            function = %info.name,
            kind = %info.kind,
            arity = info.shape.as_engine_arity(),
            deterministic = info.deterministic,
            "creating function"
        );

        let replaced = self
            .functions
            .insert(key(&info.name), Registered { info, callable });
        if let Some(old) = replaced {
            tracing::debug!(function = %old.info.name, "replaced existing function");
        }
        Ok(())
    }

    /// Registers a scalar function instance.
    ///
    /// Re-registering a name replaces the previous function.
    ///
    /// # Errors
    ///
    /// Returns `TooManyArguments` if the declared arity exceeds
    /// `max_function_args`.
    pub fn create_scalar_function<F: ScalarFunction>(&mut self, function: F) -> RelmapResult<()> {
        let info = FunctionInfo {
            name: F::NAME.to_string(),
            kind: FunctionKind::Scalar,
            shape: <F::Args<'static> as ArgTuple<'static>>::SHAPE,
            deterministic: F::DETERMINISTIC,
            param_types: <F::Args<'static> as ArgTuple<'static>>::param_types(),
        };
        self.register(info, Callable::Scalar(Box::new(ScalarAdapter(function))))
    }

    /// Registers an aggregate function; `make` constructs one fresh
    /// accumulator per aggregation.
    ///
    /// # Errors
    ///
    /// Returns `TooManyArguments` if the declared arity exceeds
    /// `max_function_args`.
    pub fn create_aggregate_function<F, M>(&mut self, make: M) -> RelmapResult<()>
    where
        F: AggregateFunction,
        M: Fn() -> F + Send + 'static,
    {
        let info = FunctionInfo {
            name: F::NAME.to_string(),
            kind: FunctionKind::Aggregate,
            shape: <F::Args<'static> as ArgTuple<'static>>::SHAPE,
            deterministic: true,
            param_types: <F::Args<'static> as ArgTuple<'static>>::param_types(),
        };
        self.register(info, Callable::Aggregate(aggregate_factory(make)))
    }

    /// Removes the function called `name`.
    ///
    /// # Errors
    ///
    /// Returns `NoSuchFunction` if nothing is registered under `name`.
    pub fn delete_function(&mut self, name: &str) -> RelmapResult<FunctionInfo> {
        let removed = self
            .functions
            .remove(&key(name))
            .ok_or_else(|| RelmapError::NoSuchFunction {
                name: name.to_string(),
            })?;
        tracing::debug!(function = %removed.info.name, kind = %removed.info.kind, "deleted function");
        Ok(removed.info)
    }

    /// Removes the scalar function `F`.
    ///
    /// # Errors
    ///
    /// Returns `NoSuchFunction` if `F` is not registered, or `NotScalar` if
    /// its name is registered as an aggregate.
    pub fn delete_scalar_function<F: ScalarFunction>(&mut self) -> RelmapResult<()> {
        self.expect_kind(F::NAME, FunctionKind::Scalar)?;
        self.delete_function(F::NAME).map(|_| ())
    }

    /// Removes the aggregate function `F`.
    ///
    /// # Errors
    ///
    /// Returns `NoSuchFunction` if `F` is not registered, or `NotAggregate`
    /// if its name is registered as a scalar.
    pub fn delete_aggregate_function<F: AggregateFunction>(&mut self) -> RelmapResult<()> {
        self.expect_kind(F::NAME, FunctionKind::Aggregate)?;
        self.delete_function(F::NAME).map(|_| ())
    }

    fn lookup(&self, name: &str) -> RelmapResult<&Registered> {
        self.functions
            .get(&key(name))
            .ok_or_else(|| RelmapError::NoSuchFunction {
                name: name.to_string(),
            })
    }

    fn expect_kind(&self, name: &str, kind: FunctionKind) -> RelmapResult<()> {
        let registered = self.lookup(name)?;
        match (registered.info.kind, kind) {
            (FunctionKind::Aggregate, FunctionKind::Scalar) => Err(RelmapError::NotScalar {
                name: registered.info.name.clone(),
            }),
            (FunctionKind::Scalar, FunctionKind::Aggregate) => Err(RelmapError::NotAggregate {
                name: registered.info.name.clone(),
            }),
            _ => Ok(()),
        }
    }

    /// Returns true if a function called `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(&key(name))
    }

    /// Metadata of the function called `name`.
    pub fn info(&self, name: &str) -> Option<&FunctionInfo> {
        self.functions.get(&key(name)).map(|r| &r.info)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.values().map(|r| r.info.name()).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered functions.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Invokes the scalar function `name` with one row of raw arguments.
    ///
    /// # Errors
    ///
    /// Returns `NoSuchFunction`, `NotScalar`, `WrongArgumentCount`, or the
    /// error raised while decoding the arguments or by the function itself.
    pub fn invoke(&mut self, name: &str, values: &[Value]) -> RelmapResult<Value> {
        let trace = self.trace_invocations;
        let registered = self
            .functions
            .get_mut(&key(name))
            .ok_or_else(|| RelmapError::NoSuchFunction {
                name: name.to_string(),
            })?;

        let Callable::Scalar(function) = &mut registered.callable else {
            return Err(RelmapError::NotScalar {
                name: registered.info.name.clone(),
            });
        };
        registered.info.check_count(values.len())?;

        if trace {
            tracing::trace!(function = %registered.info.name, args = values.len(), "scalar call");
        }
        function.invoke(values).map_err(|err| {
            log_failure(&registered.info.name, &err);
            err
        })
    }

    /// Starts an aggregation of the aggregate function `name`.
    ///
    /// # Errors
    ///
    /// Returns `NoSuchFunction` or `NotAggregate`.
    pub fn begin(&self, name: &str) -> RelmapResult<AggregateContext> {
        let registered = self.lookup(name)?;
        let Callable::Aggregate(make) = &registered.callable else {
            return Err(RelmapError::NotAggregate {
                name: registered.info.name.clone(),
            });
        };
        Ok(AggregateContext {
            info: registered.info.clone(),
            state: make(),
            steps: 0,
            trace: self.trace_invocations,
        })
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.names())
            .field("max_function_args", &self.max_function_args)
            .finish()
    }
}

/// One in-flight aggregation.
///
/// Owns the accumulator; `finalize` consumes the context, so no step can
/// follow it and it cannot run twice.
pub struct AggregateContext {
    info: FunctionInfo,
    state: Box<dyn ErasedAggregate>,
    steps: usize,
    trace: bool,
}

impl AggregateContext {
    /// Metadata of the aggregated function.
    pub fn info(&self) -> &FunctionInfo {
        &self.info
    }

    /// Number of successful steps so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Folds one row of raw arguments into the accumulator.
    ///
    /// # Errors
    ///
    /// Returns `WrongArgumentCount`, or the error raised while decoding the
    /// arguments or by the step itself.
    pub fn step(&mut self, values: &[Value]) -> RelmapResult<()> {
        self.info.check_count(values.len())?;
        if self.trace {
            tracing::trace!(function = %self.info.name, step = self.steps, args = values.len(), "aggregate step");
        }
        self.state.step(values).map_err(|err| {
            log_failure(&self.info.name, &err);
            err
        })?;
        self.steps += 1;
        Ok(())
    }

    /// Produces the aggregate result.
    pub fn finalize(self) -> Value {
        if self.trace {
            tracing::trace!(function = %self.info.name, steps = self.steps, "aggregate finalize");
        }
        self.state.finalize()
    }
}

impl fmt::Debug for AggregateContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggregateContext")
            .field("function", &self.info.name)
            .field("steps", &self.steps)
            .finish()
    }
}
