//! Invocation of a bound call.

use std::time::Instant;

use callsite_params::ParamError;
use tracing::{debug, error};

use crate::binder::BoundCall;
use crate::component::InvocationFailure;
use crate::context::CallScope;
use crate::error::DispatchError;
use crate::result::{micros, DebugInfo, ResultData};

/// Calls the selected overload and returns its result.
///
/// When `debug` is given and the result accepts a debug payload, the payload
/// is completed with the elapsed time and attached.
///
/// A failure raised by the method surfaces with its own identity: the
/// invocation wrapper is removed, [`DispatchError`]s and [`ParamError`]s
/// pass through as themselves, and anything else becomes
/// [`DispatchError::Component`] holding the original error.
pub fn invoke(
    call: BoundCall<'_>,
    scope: &CallScope<'_>,
    debug: Option<DebugInfo>,
) -> Result<Box<dyn ResultData>, DispatchError> {
    let signature = call.overload.signature();
    let started = Instant::now();
    let outcome = call.overload.call(scope, call.args);
    let elapsed = started.elapsed();

    let mut result = outcome.map_err(|failure| {
        let err = unwrap_failure(failure);
        error!(
            component = call.component.name(),
            signature = %signature,
            error = %err,
            "method failed"
        );
        err
    })?;

    debug!(
        component = call.component.name(),
        signature = %signature,
        elapsed_micros = micros(elapsed),
        shape = result.shape(),
        "method returned"
    );

    if let Some(mut info) = debug {
        info.set_elapsed(elapsed);
        if !result.attach_debug_info(info) {
            debug!(shape = result.shape(), "result does not carry debug info");
        }
    }

    Ok(result)
}

/// Removes the single wrapping layer from a method failure.
pub fn unwrap_failure(failure: InvocationFailure) -> DispatchError {
    let inner = failure.into_inner();
    let inner = match inner.downcast::<DispatchError>() {
        Ok(err) => return err,
        Err(other) => other,
    };
    match inner.downcast::<ParamError>() {
        Ok(err) => DispatchError::Param(err),
        Err(other) => DispatchError::Component(other),
    }
}
