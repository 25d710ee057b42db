//! Sandbox harness: structural and stimulus validation of one artifact.
//!
//! Given raw source text purporting to define one component, the harness
//! compiles it in a fresh engine, discovers the constructor, checks the
//! defaults-only overload, instantiates with only the probe name, verifies
//! the instance exposes ports and logged outputs, then drives it through
//! the zero and random stimulus regimes. Everything it finds is appended
//! to one issue list in discovery order; PASS means the list stayed empty.
//!
//! No state survives a call: each invocation builds its own engine, scope,
//! and dummy ports.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rhai::{Dynamic, Engine, Scope, AST};
use tracing::warn;

use super::contract::{self, Component, Port, PowerPort, SignalPort};
use crate::domain::errors::SandboxError;
use crate::domain::models::ValidationResult;

/// Fixed step size for the discrete-time advance operation.
pub const STEP_SIZE: f64 = 0.01;

/// Identifying name used to instantiate the component under test.
const PROBE_NAME: &str = "TestComponent";

/// Stimulus regime applied to every connected dummy port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Regime {
    Zero,
    Random,
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Regime::Zero => f.write_str("zero"),
            Regime::Random => f.write_str("random"),
        }
    }
}

/// Tunables for one validation call.
#[derive(Debug, Clone)]
pub struct HarnessOptions {
    /// Engine operation ceiling; 0 disables the in-process limit.
    pub max_operations: u64,
    /// Inclusive lower bound of the random regime.
    pub random_min: f64,
    /// Exclusive upper bound of the random regime.
    pub random_max: f64,
    /// Fixed RNG seed; entropy-seeded when unset.
    pub seed: Option<u64>,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            max_operations: 25_000_000,
            random_min: 0.1,
            random_max: 10.0,
            seed: None,
        }
    }
}

/// Validate one artifact's raw source text.
pub fn validate_source(raw: &str, opts: &HarnessOptions) -> ValidationResult {
    let source = strip_code_fences(raw);
    let engine = contract::engine(opts.max_operations);

    let ast = match engine.compile(source.as_str()) {
        Ok(ast) => ast,
        Err(e) => {
            return ValidationResult::fail_with(SandboxError::Parse(e.to_string()).to_string())
        }
    };

    let Some(constructor) = discover_constructor(&ast) else {
        return ValidationResult::fail_with(SandboxError::Discovery.to_string());
    };

    let mut issues = Vec::new();

    if !has_safe_constructor(&ast, &constructor) {
        issues.push("Missing default parameters in constructor.".to_string());
    }

    // Instantiate with only the identifying name; a missing-defaults finding
    // above does not block this call, but any failure here is fatal to the
    // attempt.
    let mut scope = Scope::new();
    let instance = match engine.call_fn::<Dynamic>(
        &mut scope,
        &ast,
        &constructor,
        (PROBE_NAME.to_string(),),
    ) {
        // Flatten first: a constructor whose closures capture the component
        // returns it as a shared value.
        Ok(value) => match value.flatten().try_cast::<Component>() {
            Some(component) => component,
            None => {
                issues.push(
                    SandboxError::Construction(format!(
                        "constructor `{constructor}` did not return a component."
                    ))
                    .to_string(),
                );
                return ValidationResult::from_issues(issues);
            }
        },
        Err(e) => {
            issues.push(SandboxError::Construction(e.to_string()).to_string());
            return ValidationResult::from_issues(issues);
        }
    };

    if instance.port_count() == 0 {
        issues.push("No ports defined.".to_string());
    }
    if instance.logged_count() == 0 {
        issues.push("No logged variables.".to_string());
    }

    let mut rng = match opts.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    for regime in [Regime::Zero, Regime::Random] {
        connect_all_ports(&instance, regime, &mut rng, opts);
        if let Err(e) = exercise(&engine, &ast, &instance, &mut issues) {
            issues.push(
                SandboxError::RuntimeStep {
                    regime: regime.to_string(),
                    message: e.to_string(),
                }
                .to_string(),
            );
        }
    }

    ValidationResult::from_issues(issues)
}

/// Strip leading/trailing markdown code fences from generated output.
pub fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("```") && trimmed.ends_with("```") && trimmed.len() > 6 {
        let start = trimmed.find('\n').map_or(3, |p| p + 1);
        let end = trimmed.rfind("\n```").unwrap_or(trimmed.len() - 3);
        if start <= end {
            return trimmed[start..end].trim().to_string();
        }
    }
    trimmed.to_string()
}

/// Find the component constructor among the artifact's top-level functions:
/// a function whose first parameter is the identifying `name`. Candidate
/// names are enumerated in sorted order and the first wins; multiplicity is
/// a latent ambiguity in the artifact and is flagged, not resolved.
fn discover_constructor(ast: &AST) -> Option<String> {
    let mut candidates: Vec<String> = ast
        .iter_functions()
        .filter(|f| f.params.first().is_some_and(|p| *p == "name"))
        .map(|f| f.name.to_string())
        .collect();
    candidates.sort();
    candidates.dedup();

    if candidates.len() > 1 {
        warn!(
            candidates = ?candidates,
            "artifact defines multiple component constructors; using the first in enumeration order"
        );
    }
    candidates.into_iter().next()
}

/// The defaults-only overload: the constructor name must also be callable
/// with just the identifying name.
fn has_safe_constructor(ast: &AST, name: &str) -> bool {
    ast.iter_functions()
        .any(|f| f.name == name && f.params.len() == 1)
}

/// Construct kind-matched dummy ports carrying the regime's stimulus and
/// connect each one symmetrically to the instance's port. A power port's
/// effort and flow receive the same drawn value.
fn connect_all_ports(
    component: &Component,
    regime: Regime,
    rng: &mut StdRng,
    opts: &HarnessOptions,
) {
    for port in component.ports() {
        match port {
            Port::Power(p) => {
                let mut dummy = PowerPort::new(&format!("dummy_{}", p.name()));
                let value = stimulus(regime, rng, opts);
                dummy.write_effort(value);
                dummy.write_flow(value);
                contract::connect_power(&p, &dummy);
            }
            Port::Signal(s) => {
                let mut dummy = SignalPort::new(&format!("dummy_{}", s.name()));
                dummy.write_signal(stimulus(regime, rng, opts));
                contract::connect_signal(&s, &dummy);
            }
        }
    }
}

fn stimulus(regime: Regime, rng: &mut StdRng, opts: &HarnessOptions) -> f64 {
    match regime {
        Regime::Zero => 0.0,
        Regime::Random => rng.gen_range(opts.random_min..opts.random_max),
    }
}

/// Advance, refresh outputs, and check every logged accessor. Script errors
/// propagate to the caller, which records them against the active regime.
fn exercise(
    engine: &Engine,
    ast: &AST,
    component: &Component,
    issues: &mut Vec<String>,
) -> Result<(), Box<rhai::EvalAltResult>> {
    component.step(engine, ast, STEP_SIZE)?;
    let values = component.refresh_outputs(engine, ast)?;
    for (name, value) in values {
        match contract::numeric_value(&value) {
            None => issues.push(format!("{name} returned non-numeric: {value}")),
            Some(v) if v.is_nan() => issues.push(format!("{name} returned NaN")),
            Some(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(source: &str) -> ValidationResult {
        validate_source(
            source,
            &HarnessOptions {
                seed: Some(42),
                ..HarnessOptions::default()
            },
        )
    }

    const DC_MOTOR: &str = r#"
        fn dc_motor(name) {
            dc_motor(name, 0.5, 0.05)
        }

        fn dc_motor(name, r, kt) {
            let w = 0.0;
            let elec = power_port(name + "_elec");
            let rot = power_port(name + "_rot");
            let c = component(name);
            c.add_port(elec);
            c.add_port(rot);
            c.add_logged("w", || w);
            c.on_step(|dt| {
                let v = elec.read_effort();
                let t_load = rot.read_effort();
                let t_m = kt * (v - kt * w) / r;
                w += dt * (t_m - t_load);
                elec.write_flow((v - kt * w) / r);
                rot.write_effort(t_m);
            });
            c
        }
    "#;

    #[test]
    fn test_well_formed_artifact_passes_both_regimes() {
        let result = validate(DC_MOTOR);
        assert!(result.passed(), "issues: {:?}", result.issues);
    }

    #[test]
    fn test_constant_output_component_passes() {
        let result = validate(
            r#"
                fn probe(name) {
                    let c = component(name);
                    c.add_port(power_port(name + "_p"));
                    c.add_logged("y", || 1.0);
                    c.on_step(|dt| {});
                    c
                }
            "#,
        );
        assert!(result.passed(), "issues: {:?}", result.issues);
    }

    #[test]
    fn test_fenced_artifact_is_stripped_before_loading() {
        let fenced = format!("```rhai\n{DC_MOTOR}\n```");
        let result = validate(&fenced);
        assert!(result.passed(), "issues: {:?}", result.issues);
    }

    #[test]
    fn test_artifact_without_constructor_fails_discovery() {
        let result = validate("let x = 1;");
        assert!(!result.passed());
        assert_eq!(
            result.issues,
            vec!["No valid component constructor found in artifact."]
        );
    }

    #[test]
    fn test_helper_functions_are_not_constructors() {
        // First parameter is not the identifying name.
        let result = validate("fn interp(x, xs, ys) { x }");
        assert_eq!(
            result.issues,
            vec!["No valid component constructor found in artifact."]
        );
    }

    #[test]
    fn test_unparseable_artifact_fails() {
        let result = validate("fn broken(name { }");
        assert!(!result.passed());
        assert_eq!(result.issues.len(), 1);
    }

    #[test]
    fn test_missing_defaults_still_attempts_instantiation() {
        // Only a two-parameter overload: no defaults-only form.
        let result = validate(
            r#"
                fn gain_block(name, k) {
                    let c = component(name);
                    c.add_logged("k", || k);
                    c.on_step(|dt| {});
                    c
                }
            "#,
        );
        assert!(!result.passed());
        assert_eq!(result.issues[0], "Missing default parameters in constructor.");
        // Instantiation with only the name then fails fatally.
        assert!(result.issues[1].starts_with("Fatal error:"), "{:?}", result.issues);
        assert_eq!(result.issues.len(), 2);
    }

    #[test]
    fn test_constructor_not_returning_component_is_fatal() {
        let result = validate("fn thing(name) { 42 }");
        assert_eq!(
            result.issues,
            vec!["Fatal error: constructor `thing` did not return a component."]
        );
    }

    #[test]
    fn test_shape_findings_are_independent_and_non_fatal() {
        let result = validate("fn empty_shell(name) { component(name) }");
        assert!(!result.passed());
        assert!(result.issues.contains(&"No ports defined.".to_string()));
        assert!(result.issues.contains(&"No logged variables.".to_string()));
    }

    #[test]
    fn test_nan_output_is_reported_per_regime() {
        let result = validate(
            r#"
                fn nan_source(name) {
                    let c = component(name);
                    c.add_logged("y", || 0.0 / 0.0);
                    c.on_step(|dt| {});
                    c
                }
            "#,
        );
        assert!(!result.passed());
        let nan_issues: Vec<&String> = result
            .issues
            .iter()
            .filter(|i| i.as_str() == "TestComponent_y returned NaN")
            .collect();
        assert_eq!(nan_issues.len(), 2, "one finding per regime: {:?}", result.issues);
    }

    #[test]
    fn test_non_numeric_output_is_reported() {
        let result = validate(
            r#"
                fn chatty(name) {
                    let c = component(name);
                    c.add_logged("label", || "hello");
                    c.on_step(|dt| {});
                    c
                }
            "#,
        );
        assert!(!result.passed());
        assert!(
            result
                .issues
                .iter()
                .any(|i| i == "TestComponent_label returned non-numeric: hello"),
            "{:?}",
            result.issues
        );
    }

    #[test]
    fn test_random_only_step_failure_keeps_zero_findings() {
        // Throws whenever the input is non-zero: only the random regime.
        let result = validate(
            r#"
                fn touchy(name) {
                    let inp = power_port(name + "_in");
                    let c = component(name);
                    c.add_port(inp);
                    c.add_logged("y", || 0.0);
                    c.on_step(|dt| {
                        let v = inp.read_effort();
                        if v != 0.0 {
                            throw "input rejected";
                        }
                    });
                    c
                }
            "#,
        );
        assert!(!result.passed());
        assert_eq!(result.issues.len(), 1, "{:?}", result.issues);
        assert!(result.issues[0].starts_with("Step/update failed on random input:"));
    }

    #[test]
    fn test_component_without_step_fails_both_regimes() {
        let result = validate(
            r#"
                fn inert(name) {
                    let c = component(name);
                    c.add_logged("y", || 0.0);
                    c
                }
            "#,
        );
        assert!(!result.passed());
        assert!(result.issues[0].starts_with("Step/update failed on zero input:"));
        assert!(result.issues[1].starts_with("Step/update failed on random input:"));
    }

    #[test]
    fn test_runaway_step_is_stopped_by_operation_ceiling() {
        let result = validate_source(
            r#"
                fn spinner(name) {
                    let c = component(name);
                    c.add_logged("y", || 0.0);
                    c.on_step(|dt| {
                        loop { }
                    });
                    c
                }
            "#,
            &HarnessOptions {
                max_operations: 100_000,
                seed: Some(42),
                ..HarnessOptions::default()
            },
        );
        assert!(!result.passed());
        assert!(result.issues[0].starts_with("Step/update failed on zero input:"));
    }

    #[test]
    fn test_harness_is_idempotent_under_fixed_seed() {
        let first = validate(DC_MOTOR);
        let second = validate(DC_MOTOR);
        assert_eq!(first, second);

        let failing = r#"
            fn nan_source(name) {
                let c = component(name);
                c.add_logged("y", || 0.0 / 0.0);
                c.on_step(|dt| {});
                c
            }
        "#;
        assert_eq!(validate(failing), validate(failing));
    }

    #[test]
    fn test_ambiguous_artifact_uses_first_constructor_in_order() {
        // Two qualifying constructors: enumeration order (sorted) picks
        // `alpha`, which is well-formed.
        let result = validate(
            r#"
                fn alpha(name) {
                    let c = component(name);
                    c.add_port(power_port(name + "_p"));
                    c.add_logged("y", || 2.0);
                    c.on_step(|dt| {});
                    c
                }

                fn beta(name) { 42 }
            "#,
        );
        assert!(result.passed(), "issues: {:?}", result.issues);
    }

    #[test]
    fn test_strip_code_fences_variants() {
        assert_eq!(strip_code_fences("```rhai\nfn f(name) {}\n```"), "fn f(name) {}");
        assert_eq!(strip_code_fences("```\nlet x = 1;\n```"), "let x = 1;");
        assert_eq!(strip_code_fences("plain text"), "plain text");
        assert_eq!(strip_code_fences("  padded  "), "padded");
    }
}
