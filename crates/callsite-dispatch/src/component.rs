//! Components and their method tables.
//!
//! A component is registered once at startup together with a table of typed
//! method overloads. Each overload pairs a [`MethodSignature`] (method name
//! plus ordered parameter names and kinds) with a thunk that converts bound
//! arguments back into Rust values and calls a closure.
//!
//! ```rust,ignore
//! let search = ComponentType::new(Search::new(corpus))
//!     .method("Find", &["query", "limit"], |s: &Search, query: String, limit: i64| {
//!         s.find(&query, limit)
//!     })
//!     .method("Find", &["query"], |s: &Search, query: String| s.find(&query, 10))
//!     .scoped_method("Terms", &[], |s: &Search, scope: &CallScope<'_>| s.terms_in(scope));
//!
//! let mut registry = ComponentRegistry::new();
//! registry.register("Search", search)?;
//! ```
//!
//! Closures take the component by reference followed by up to eight
//! [`FromParam`] arguments, and return `Result<R, E>` where `R` implements
//! [`ResultData`] and `E` converts into [`anyhow::Error`].

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use callsite_params::{FromParam, ParamError, ValueKind};
use thiserror::Error;

use crate::binder::{Argument, BoundArguments};
use crate::context::CallScope;
use crate::error::{DispatchError, RegistryError};
use crate::result::ResultData;

/// One formal parameter of a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    /// Parameter name, matched case-sensitively against bag keys.
    pub name: String,
    /// Declared kind.
    pub kind: ValueKind,
}

/// A method name plus its ordered formal parameters.
///
/// Displays as `Find(string, int)`; [`describe`](Self::describe) includes
/// parameter names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    method: String,
    params: Vec<ParamSpec>,
}

impl MethodSignature {
    /// Creates a signature.
    pub fn new(method: impl Into<String>, params: Vec<ParamSpec>) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }

    /// The method name.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Formal parameters in declared order.
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Number of formal parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Declared kinds in order.
    pub fn kinds(&self) -> impl Iterator<Item = ValueKind> + '_ {
        self.params.iter().map(|p| p.kind)
    }

    /// Signature with parameter names, e.g. `Find(query: string, limit: int)`.
    pub fn describe(&self) -> String {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| format!("{}: {}", p.name, p.kind))
            .collect();
        format!("{}({})", self.method, params.join(", "))
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.method)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(p.kind.name())?;
        }
        f.write_str(")")
    }
}

/// The single layer of wrapping a thunk puts around a callee failure.
///
/// The invoker removes it again, so the wrapper never reaches callers.
#[derive(Debug, Error)]
#[error("method invocation failed: {source}")]
pub struct InvocationFailure {
    source: anyhow::Error,
}

impl InvocationFailure {
    /// Wraps a callee failure.
    pub fn new(source: impl Into<anyhow::Error>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// The callee's own error.
    pub fn into_inner(self) -> anyhow::Error {
        self.source
    }
}

type Thunk =
    Arc<dyn Fn(&CallScope<'_>, BoundArguments) -> Result<Box<dyn ResultData>, InvocationFailure> + Send + Sync>;

type TypedThunk<C> = Arc<
    dyn Fn(&C, &CallScope<'_>, BoundArguments) -> Result<Box<dyn ResultData>, InvocationFailure>
        + Send
        + Sync,
>;

/// A typed closure usable as a method of component `C`.
///
/// Implemented for `Fn(&C, T1, .., Tn) -> Result<R, E>` with up to eight
/// [`FromParam`] arguments. `Args` is the tuple of argument types.
pub trait Method<C, Args>: Send + Sync + 'static {
    /// Declared kinds of the arguments, in order.
    fn kinds() -> Vec<ValueKind>;

    /// Calls the closure with converted arguments.
    fn call(
        &self,
        component: &C,
        scope: &CallScope<'_>,
        args: BoundArguments,
    ) -> Result<Box<dyn ResultData>, InvocationFailure>;
}

/// Like [`Method`], for closures that also take a [`CallScope`].
///
/// Implemented for `Fn(&C, &CallScope, T1, .., Tn) -> Result<R, E>`.
pub trait ScopedMethod<C, Args>: Send + Sync + 'static {
    /// Declared kinds of the arguments, in order.
    fn kinds() -> Vec<ValueKind>;

    /// Calls the closure with the scope and converted arguments.
    fn call(
        &self,
        component: &C,
        scope: &CallScope<'_>,
        args: BoundArguments,
    ) -> Result<Box<dyn ResultData>, InvocationFailure>;
}

fn take_arg<T: FromParam>(
    args: &mut std::vec::IntoIter<Argument>,
) -> Result<T, InvocationFailure> {
    let arg = args.next().ok_or_else(|| {
        InvocationFailure::new(DispatchError::configuration(
            "bound arguments are shorter than the method signature",
        ))
    })?;
    T::from_value(arg.value.clone())
        .ok_or_else(|| InvocationFailure::new(ParamError::parse(arg.name, T::KIND, arg.value.to_string())))
}

fn finish<R, E>(outcome: Result<R, E>) -> Result<Box<dyn ResultData>, InvocationFailure>
where
    R: ResultData,
    E: Into<anyhow::Error>,
{
    match outcome {
        Ok(result) => Ok(Box::new(result)),
        Err(e) => Err(InvocationFailure::new(e)),
    }
}

macro_rules! impl_method {
    (
        $($ty:ident),*
    ) => {
        #[allow(non_snake_case, unused_mut, unused_variables)]
        impl<C, F, R, E, $($ty,)*> Method<C, ($($ty,)*)> for F
        where
            F: Fn(&C, $($ty,)*) -> Result<R, E> + Send + Sync + 'static,
            R: ResultData,
            E: Into<anyhow::Error>,
            $( $ty: FromParam, )*
        {
            fn kinds() -> Vec<ValueKind> {
                vec![$($ty::KIND,)*]
            }

            fn call(
                &self,
                component: &C,
                _scope: &CallScope<'_>,
                args: BoundArguments,
            ) -> Result<Box<dyn ResultData>, InvocationFailure> {
                let mut args = args.into_iter();
                $(
                    let $ty = take_arg::<$ty>(&mut args)?;
                )*
                finish((self)(component, $($ty,)*))
            }
        }

        #[allow(non_snake_case, unused_mut, unused_variables)]
        impl<C, F, R, E, $($ty,)*> ScopedMethod<C, ($($ty,)*)> for F
        where
            F: Fn(&C, &CallScope<'_>, $($ty,)*) -> Result<R, E> + Send + Sync + 'static,
            R: ResultData,
            E: Into<anyhow::Error>,
            $( $ty: FromParam, )*
        {
            fn kinds() -> Vec<ValueKind> {
                vec![$($ty::KIND,)*]
            }

            fn call(
                &self,
                component: &C,
                scope: &CallScope<'_>,
                args: BoundArguments,
            ) -> Result<Box<dyn ResultData>, InvocationFailure> {
                let mut args = args.into_iter();
                $(
                    let $ty = take_arg::<$ty>(&mut args)?;
                )*
                finish((self)(component, scope, $($ty,)*))
            }
        }
    };
}

// Generate implementations for 0-8 parameters
impl_method!();
impl_method!(T1);
impl_method!(T1, T2);
impl_method!(T1, T2, T3);
impl_method!(T1, T2, T3, T4);
impl_method!(T1, T2, T3, T4, T5);
impl_method!(T1, T2, T3, T4, T5, T6);
impl_method!(T1, T2, T3, T4, T5, T6, T7);
impl_method!(T1, T2, T3, T4, T5, T6, T7, T8);

struct PendingOverload<C> {
    method: String,
    names: Vec<String>,
    kinds: Vec<ValueKind>,
    call: TypedThunk<C>,
}

/// Builder for a component instance and its method table.
pub struct ComponentType<C> {
    instance: Arc<C>,
    overloads: Vec<PendingOverload<C>>,
}

impl<C: Send + Sync + 'static> ComponentType<C> {
    /// Starts a method table for `instance`.
    pub fn new(instance: C) -> Self {
        Self::shared(Arc::new(instance))
    }

    /// Starts a method table for an already shared instance.
    pub fn shared(instance: Arc<C>) -> Self {
        Self {
            instance,
            overloads: Vec::new(),
        }
    }

    /// Registers an overload of `method` with the given parameter names.
    ///
    /// Names pair up with the closure's typed arguments in order.
    pub fn method<M, Args>(mut self, method: impl Into<String>, params: &[&str], f: M) -> Self
    where
        M: Method<C, Args>,
    {
        let call: TypedThunk<C> = Arc::new(move |component: &C, scope: &CallScope<'_>, args| {
            f.call(component, scope, args)
        });
        self.overloads.push(PendingOverload {
            method: method.into(),
            names: params.iter().map(|p| p.to_string()).collect(),
            kinds: M::kinds(),
            call,
        });
        self
    }

    /// Registers an overload whose closure also receives the [`CallScope`].
    ///
    /// Only the typed arguments after the scope are bound from the bag, so
    /// `params` names those alone.
    pub fn scoped_method<M, Args>(
        mut self,
        method: impl Into<String>,
        params: &[&str],
        f: M,
    ) -> Self
    where
        M: ScopedMethod<C, Args>,
    {
        let call: TypedThunk<C> = Arc::new(move |component: &C, scope: &CallScope<'_>, args| {
            f.call(component, scope, args)
        });
        self.overloads.push(PendingOverload {
            method: method.into(),
            names: params.iter().map(|p| p.to_string()).collect(),
            kinds: M::kinds(),
            call,
        });
        self
    }

    /// Validates the table and erases the component type.
    pub fn build(self, name: impl Into<String>) -> Result<Component, RegistryError> {
        let mut methods: BTreeMap<String, Vec<Overload>> = BTreeMap::new();

        for pending in self.overloads {
            if pending.names.len() != pending.kinds.len() {
                return Err(RegistryError::ArityMismatch {
                    method: pending.method,
                    names: pending.names.len(),
                    arity: pending.kinds.len(),
                });
            }

            let mut seen = HashSet::new();
            if let Some(dup) = pending.names.iter().find(|n| !seen.insert(n.as_str())) {
                return Err(RegistryError::DuplicateParameter {
                    method: pending.method.clone(),
                    name: dup.clone(),
                });
            }

            let signature = MethodSignature::new(
                pending.method.clone(),
                pending
                    .names
                    .into_iter()
                    .zip(pending.kinds)
                    .map(|(name, kind)| ParamSpec { name, kind })
                    .collect(),
            );

            let overloads = methods.entry(pending.method).or_default();
            if overloads
                .iter()
                .any(|o| o.signature.kinds().eq(signature.kinds()))
            {
                return Err(RegistryError::DuplicateOverload {
                    signature: signature.to_string(),
                });
            }

            let instance = Arc::clone(&self.instance);
            let call = pending.call;
            overloads.push(Overload {
                signature,
                thunk: Arc::new(move |scope: &CallScope<'_>, args| call(&instance, scope, args)),
            });
        }

        Ok(Component {
            name: name.into(),
            methods,
        })
    }
}

impl<C> fmt::Debug for ComponentType<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentType")
            .field("overloads", &self.overloads.len())
            .finish_non_exhaustive()
    }
}

/// One registered overload.
#[derive(Clone)]
pub struct Overload {
    signature: MethodSignature,
    thunk: Thunk,
}

impl Overload {
    /// The overload's signature.
    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    /// Calls the overload with bound arguments.
    ///
    /// Callee failures come back wrapped in one [`InvocationFailure`]; see
    /// [`invoke`](crate::invoke) for the unwrapping step.
    pub fn call(
        &self,
        scope: &CallScope<'_>,
        args: BoundArguments,
    ) -> Result<Box<dyn ResultData>, InvocationFailure> {
        (self.thunk)(scope, args)
    }
}

impl fmt::Debug for Overload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overload")
            .field("signature", &self.signature.describe())
            .finish_non_exhaustive()
    }
}

/// A registered component with its method table.
#[derive(Clone)]
pub struct Component {
    name: String,
    methods: BTreeMap<String, Vec<Overload>>,
}

impl Component {
    /// The registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Overloads of `method`, in registration order.
    ///
    /// Method names match case-sensitively.
    pub fn overloads(&self, method: &str) -> &[Overload] {
        self.methods.get(method).map(Vec::as_slice).unwrap_or_default()
    }

    /// Signatures of `method`, in registration order.
    pub fn signatures<'a>(&'a self, method: &str) -> impl Iterator<Item = &'a MethodSignature> {
        self.overloads(method).iter().map(Overload::signature)
    }

    /// Registered method names, sorted.
    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let signatures: Vec<String> = self
            .methods
            .values()
            .flatten()
            .map(|o| o.signature.to_string())
            .collect();
        f.debug_struct("Component")
            .field("name", &self.name)
            .field("methods", &signatures)
            .finish()
    }
}

/// Maps component names to registered components.
///
/// Populated at startup, read-only afterwards. Names match case-sensitively.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    components: HashMap<String, Arc<Component>>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds and registers a component under `name`.
    pub fn register<C: Send + Sync + 'static>(
        &mut self,
        name: impl Into<String>,
        component: ComponentType<C>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.components.contains_key(&name) {
            return Err(RegistryError::DuplicateComponent(name));
        }
        let built = component.build(name.clone())?;
        self.components.insert(name, Arc::new(built));
        Ok(())
    }

    /// Resolves a component by name.
    pub fn resolve(&self, name: &str) -> Result<Arc<Component>, DispatchError> {
        self.components
            .get(name)
            .cloned()
            .ok_or_else(|| DispatchError::ComponentNotFound(name.to_string()))
    }

    /// Registered component names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.components.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
