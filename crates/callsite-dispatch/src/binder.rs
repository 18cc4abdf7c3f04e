//! Overload resolution.
//!
//! Chooses exactly one overload of a method for a parameter bag, or reports
//! why none fits.
//!
//! # Matching
//!
//! Only overloads whose arity equals the bag size are considered.
//!
//! 1. **Exact.** Overloads whose declared kinds equal the kinds of the bag
//!    values (as a multiset, so bag order never matters) are selected first.
//!    Within them, the one whose parameter names each carry a value of the
//!    declared kind is bound. A lone exact overload with a parameter the bag
//!    does not name fails with [`ParamError::Missing`].
//! 2. **Coerced.** Only when no exact overload exists, string values that
//!    parse as a declared kind may stand in for it. Each argument scores:
//!
//! | Bag value | Declared kind | Score |
//! |-----------|---------------|-------|
//! | same kind | any | 2 |
//! | string that parses as the declared kind | non-string | 1 |
//! | anything else | | no match |
//!
//! Typed values are never widened: an `int` does not satisfy a `double`
//! parameter. The highest total wins and a tie at the top is ambiguous.

use std::fmt;

use callsite_params::{parse::parse_as, ParamError, Value, ValueKind};
use tracing::debug;

use crate::bag::ParameterBag;
use crate::component::{Component, Overload};
use crate::error::DispatchError;

/// One bound argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    /// Formal parameter name.
    pub name: String,
    /// Value converted to the declared kind.
    pub value: Value,
}

/// Arguments in formal parameter order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArguments {
    args: Vec<Argument>,
}

impl BoundArguments {
    /// Creates an argument list.
    pub fn new(args: Vec<Argument>) -> Self {
        Self { args }
    }

    /// Iterates arguments in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Argument> {
        self.args.iter()
    }

    /// Argument values in order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.args.iter().map(|a| &a.value)
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Returns true for a zero-argument call.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

impl IntoIterator for BoundArguments {
    type Item = Argument;
    type IntoIter = std::vec::IntoIter<Argument>;

    fn into_iter(self) -> Self::IntoIter {
        self.args.into_iter()
    }
}

impl<'a> IntoIterator for &'a BoundArguments {
    type Item = &'a Argument;
    type IntoIter = std::slice::Iter<'a, Argument>;

    fn into_iter(self) -> Self::IntoIter {
        self.args.iter()
    }
}

/// Renders as `name = value` pairs.
impl fmt::Display for BoundArguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} = {}", arg.name, arg.value)?;
        }
        Ok(())
    }
}

/// The selected overload together with its arguments.
#[derive(Debug, Clone)]
pub struct BoundCall<'c> {
    /// Component the overload belongs to.
    pub component: &'c Component,
    /// The selected overload.
    pub overload: &'c Overload,
    /// Arguments converted to the declared kinds, in formal order.
    pub args: BoundArguments,
}

/// Selects the overload of `method` that best fits `bag`.
///
/// # Errors
///
/// - [`DispatchError::AmbiguousOverload`] when two or more overloads fit
///   equally well.
/// - [`ParamError::Missing`] when the overload selected by type vector
///   declares a parameter the bag does not name.
/// - [`DispatchError::MethodNotFound`] otherwise.
pub fn bind<'c>(
    component: &'c Component,
    method: &str,
    bag: &ParameterBag,
) -> Result<BoundCall<'c>, DispatchError> {
    let same_arity: Vec<&Overload> = component
        .overloads(method)
        .iter()
        .filter(|o| o.signature().arity() == bag.len())
        .collect();

    let supplied = sorted_kinds(bag.iter().map(|(_, v)| v.kind()));
    let exact: Vec<&Overload> = same_arity
        .iter()
        .copied()
        .filter(|o| sorted_kinds(o.signature().kinds()) == supplied)
        .collect();

    if !exact.is_empty() {
        return bind_exact(component, method, bag, &exact);
    }
    bind_coerced(component, method, bag, &same_arity)
}

/// Binds among overloads whose kinds equal the bag's kinds, names ignored.
fn bind_exact<'c>(
    component: &'c Component,
    method: &str,
    bag: &ParameterBag,
    exact: &[&'c Overload],
) -> Result<BoundCall<'c>, DispatchError> {
    let mut named: Vec<(&'c Overload, Vec<Argument>)> = exact
        .iter()
        .filter_map(|o| match score(o, bag) {
            Some((points, args)) if points == 2 * o.signature().arity() as u32 => {
                Some((*o, args))
            }
            _ => None,
        })
        .collect();

    if named.len() == 1 {
        let (overload, args) = named.swap_remove(0);
        return Ok(selected(component, overload, args, "exact"));
    }
    if named.len() > 1 {
        return Err(ambiguous(component, method, named.iter().map(|(o, _)| *o)));
    }
    if let [overload] = exact {
        if let Some(param) = overload
            .signature()
            .params()
            .iter()
            .find(|p| bag.get_exact(&p.name).is_none())
        {
            return Err(ParamError::missing(param.name.clone()).into());
        }
        return Err(not_found(component, method, bag));
    }
    Err(ambiguous(component, method, exact.iter().copied()))
}

/// Falls back to parsing string values into the declared kinds.
fn bind_coerced<'c>(
    component: &'c Component,
    method: &str,
    bag: &ParameterBag,
    same_arity: &[&'c Overload],
) -> Result<BoundCall<'c>, DispatchError> {
    let mut matches: Vec<(u32, &'c Overload, Vec<Argument>)> = same_arity
        .iter()
        .filter_map(|o| score(o, bag).map(|(s, args)| (s, *o, args)))
        .collect();
    matches.sort_by(|a, b| b.0.cmp(&a.0));

    let best = match matches.first() {
        Some((best, ..)) => *best,
        None => return Err(not_found(component, method, bag)),
    };
    let tied = matches.iter().take_while(|(s, ..)| *s == best).count();
    if tied > 1 {
        return Err(ambiguous(
            component,
            method,
            matches.iter().take(tied).map(|(_, o, _)| *o),
        ));
    }

    let (_, overload, args) = matches.swap_remove(0);
    Ok(selected(component, overload, args, "coerced"))
}

fn selected<'c>(
    component: &'c Component,
    overload: &'c Overload,
    args: Vec<Argument>,
    strategy: &'static str,
) -> BoundCall<'c> {
    debug!(
        component = component.name(),
        signature = %overload.signature(),
        strategy,
        "overload selected"
    );
    BoundCall {
        component,
        overload,
        args: BoundArguments::new(args),
    }
}

fn sorted_kinds(kinds: impl Iterator<Item = ValueKind>) -> Vec<ValueKind> {
    let mut kinds: Vec<ValueKind> = kinds.collect();
    kinds.sort_unstable();
    kinds
}

/// Scores an overload against the bag by parameter name: 2 per value of the
/// declared kind, 1 per string that parses as it.
fn score(overload: &Overload, bag: &ParameterBag) -> Option<(u32, Vec<Argument>)> {
    let mut total = 0;
    let mut args = Vec::with_capacity(overload.signature().arity());

    for param in overload.signature().params() {
        let supplied = bag.get_exact(&param.name)?;
        let (points, value) = if supplied.kind() == param.kind {
            (2, supplied.clone())
        } else {
            match supplied {
                Value::String(text) => (1, parse_as(text, param.kind)?),
                _ => return None,
            }
        };
        total += points;
        args.push(Argument {
            name: param.name.clone(),
            value,
        });
    }

    Some((total, args))
}

fn ambiguous<'c>(
    component: &Component,
    method: &str,
    candidates: impl Iterator<Item = &'c Overload>,
) -> DispatchError {
    let candidates: Vec<String> = candidates.map(|o| o.signature().to_string()).collect();
    DispatchError::AmbiguousOverload {
        component: component.name().to_string(),
        method: method.to_string(),
        candidates: candidates.join(", "),
    }
}

fn not_found(component: &Component, method: &str, bag: &ParameterBag) -> DispatchError {
    DispatchError::MethodNotFound {
        component: component.name().to_string(),
        method: method.to_string(),
        arguments: bag.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentType;

    struct Calc;

    type Outcome = Result<String, anyhow::Error>;

    fn calc() -> Component {
        ComponentType::new(Calc)
            .method("Add", &["a", "b"], |_: &Calc, a: i64, b: i64| -> Outcome {
                Ok(format!("int {}", a + b))
            })
            .method("Add", &["a", "b"], |_: &Calc, a: f64, b: f64| -> Outcome {
                Ok(format!("double {}", a + b))
            })
            .method("Echo", &["text"], |_: &Calc, text: String| -> Outcome { Ok(text) })
            .method("Echo", &["count"], |_: &Calc, count: i64| -> Outcome {
                Ok(count.to_string())
            })
            .method("Scale", &["x", "factor"], |_: &Calc, x: f64, factor: i64| -> Outcome {
                Ok((x * factor as f64).to_string())
            })
            .build("Calc")
            .unwrap()
    }

    fn sig(call: &BoundCall<'_>) -> String {
        call.overload.signature().to_string()
    }

    #[test]
    fn exact_kinds_beat_parsed_text() {
        let calc = calc();
        let bag: ParameterBag = [("a", 1i64), ("b", 2i64)].into_iter().collect();
        assert_eq!(sig(&bind(&calc, "Add", &bag).unwrap()), "Add(int, int)");

        let bag: ParameterBag = [("a", 1.5f64), ("b", 2.0f64)].into_iter().collect();
        assert_eq!(sig(&bind(&calc, "Add", &bag).unwrap()), "Add(double, double)");
    }

    #[test]
    fn text_parsing_two_ways_is_ambiguous() {
        let calc = calc();
        let bag: ParameterBag = [("a", "1"), ("b", "2")].into_iter().collect();
        match bind(&calc, "Add", &bag).unwrap_err() {
            DispatchError::AmbiguousOverload { candidates, .. } => {
                assert!(candidates.contains("Add(int, int)"));
                assert!(candidates.contains("Add(double, double)"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn text_that_only_parses_one_way_binds() {
        let calc = calc();
        let bag: ParameterBag = [("a", "1.5"), ("b", "2")].into_iter().collect();
        let call = bind(&calc, "Add", &bag).unwrap();
        assert_eq!(sig(&call), "Add(double, double)");
        assert_eq!(
            call.args.values().cloned().collect::<Vec<_>>(),
            vec![Value::Double(1.5), Value::Double(2.0)]
        );
    }

    #[test]
    fn exact_type_vector_wins_over_coercion() {
        let calc = calc();
        let bag: ParameterBag = [("count", "3")].into_iter().collect();
        assert!(matches!(
            bind(&calc, "Echo", &bag),
            Err(DispatchError::Param(ParamError::Missing(name))) if name == "text"
        ));

        let bag: ParameterBag = [("count", 3i64)].into_iter().collect();
        let call = bind(&calc, "Echo", &bag).unwrap();
        assert_eq!(sig(&call), "Echo(int)");
        assert_eq!(call.args.to_string(), "count = 3");
    }

    #[test]
    fn names_pick_among_exact_overloads() {
        let pair = ComponentType::new(Calc)
            .method("Pair", &["a", "b"], |_: &Calc, a: i64, b: String| -> Outcome {
                Ok(format!("{a}{b}"))
            })
            .method("Pair", &["x", "y"], |_: &Calc, x: String, y: i64| -> Outcome {
                Ok(format!("{x}{y}"))
            })
            .build("Pair")
            .unwrap();

        let bag: ParameterBag = [("y", Value::Int(1)), ("x", Value::from("s"))]
            .into_iter()
            .collect();
        assert_eq!(sig(&bind(&pair, "Pair", &bag).unwrap()), "Pair(string, int)");

        let bag: ParameterBag = [("b", Value::from("s")), ("a", Value::Int(1))]
            .into_iter()
            .collect();
        assert_eq!(sig(&bind(&pair, "Pair", &bag).unwrap()), "Pair(int, string)");

        let bag: ParameterBag = [("p", Value::Int(1)), ("q", Value::from("s"))]
            .into_iter()
            .collect();
        assert!(matches!(
            bind(&pair, "Pair", &bag),
            Err(DispatchError::AmbiguousOverload { .. })
        ));
    }

    #[test]
    fn typed_values_are_not_widened() {
        let calc = calc();
        let bag: ParameterBag = [("x", 2i64), ("factor", 3i64)].into_iter().collect();
        assert!(matches!(
            bind(&calc, "Scale", &bag),
            Err(DispatchError::MethodNotFound { .. })
        ));
    }

    #[test]
    fn args_follow_formal_order() {
        let calc = calc();
        let bag: ParameterBag = [("factor", Value::Int(3)), ("x", Value::Double(0.5))]
            .into_iter()
            .collect();
        let call = bind(&calc, "Scale", &bag).unwrap();
        let names: Vec<&str> = call.args.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["x", "factor"]);
    }

    #[test]
    fn wrong_name_with_matching_kinds_is_missing_parameter() {
        let calc = calc();
        let bag: ParameterBag = [("x", Value::Double(0.5)), ("times", Value::Int(3))]
            .into_iter()
            .collect();
        assert!(matches!(
            bind(&calc, "Scale", &bag),
            Err(DispatchError::Param(ParamError::Missing(name))) if name == "factor"
        ));
    }

    #[test]
    fn names_are_case_sensitive() {
        let calc = calc();
        let bag: ParameterBag = [("Text", "hi")].into_iter().collect();
        assert!(matches!(
            bind(&calc, "Echo", &bag),
            Err(DispatchError::Param(ParamError::Missing(name))) if name == "text"
        ));
    }

    #[test]
    fn unknown_method_and_arity() {
        let calc = calc();
        let bag: ParameterBag = [("a", 1i64)].into_iter().collect();
        match bind(&calc, "Add", &bag).unwrap_err() {
            DispatchError::MethodNotFound {
                component,
                method,
                arguments,
            } => {
                assert_eq!(component, "Calc");
                assert_eq!(method, "Add");
                assert_eq!(arguments, "a: int");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(
            bind(&calc, "Subtract", &ParameterBag::new()),
            Err(DispatchError::MethodNotFound { .. })
        ));
    }
}
