//! Numeric values computed from small expressions.
//!
//! A [`Value`] wraps an expression tree together with the last result it
//! produced. Readers (shape rasterization in particular) use
//! [`Value::cached`] so a draw never resamples; only [`Value::calculate`]
//! walks the tree again and, for random nodes, draws fresh samples.

pub mod env;
pub mod expr;
pub mod parser;
pub mod random;

use std::fmt;

use thiserror::Error;

pub use env::Environment;
pub use expr::{Expr, Func, RandomCall, RandomFunc};
pub use parser::parse_expr;
pub use random::{RandomAware, RandomHandle, RandomSource};

/// Errors raised while parsing or evaluating a value
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    #[error("syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    #[error("unknown function \"{0}\"")]
    UnknownFunction(String),

    #[error("invalid arity for {func}: expected {expected}, got {actual}")]
    Arity {
        func: String,
        expected: usize,
        actual: usize,
    },

    #[error("unresolved variable \"{0}\"")]
    UnresolvedVariable(String),

    #[error("random function evaluated without a random source")]
    MissingRandomSource,

    #[error("invalid random range [{min}, {max}]")]
    InvalidRange { min: f64, max: f64 },
}

/// An expression plus its cached result.
#[derive(Debug, Clone)]
pub struct Value {
    source: String,
    expr: Expr,
    cached: f64,
    random: bool,
}

impl Value {
    /// Parse a value from its textual form.
    ///
    /// Expressions without variables or random calls are evaluated right
    /// away, so literal sizes are usable before the first `calculate`.
    pub fn parse(source: &str) -> Result<Self, ValueError> {
        let expr = parse_expr(source)?;
        let random = expr.contains_random();
        let mut value = Self {
            source: source.trim().to_string(),
            expr,
            cached: 0.0,
            random,
        };
        if !random && value.variables().is_empty() {
            value.cached = value.expr.eval(&Environment::new())?;
        }
        Ok(value)
    }

    /// A literal.
    pub fn constant(v: f64) -> Self {
        Self {
            source: v.to_string(),
            expr: Expr::Constant(v),
            cached: v,
            random: false,
        }
    }

    /// Compute the value without touching the cache.
    pub fn evaluate(&self, env: &Environment) -> Result<f64, ValueError> {
        self.expr.eval(env)
    }

    /// Recompute and cache. Random sub-expressions draw new samples.
    pub fn calculate(&mut self, env: &Environment) -> Result<f64, ValueError> {
        self.cached = self.expr.eval(env)?;
        Ok(self.cached)
    }

    /// Store a result obtained from [`Self::evaluate`].
    pub(crate) fn set_cached(&mut self, v: f64) {
        self.cached = v;
    }

    /// Last result of [`Self::calculate`] (or the literal for constants).
    pub fn cached(&self) -> f64 {
        self.cached
    }

    /// True if calculating this value consumes randomness.
    pub fn is_random(&self) -> bool {
        self.random
    }

    /// Referenced variable names in first-occurrence order.
    pub fn variables(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.expr.collect_variables(&mut names);
        names
    }

    /// Fail with `UnresolvedVariable` on the first name `is_known` rejects.
    pub fn check_bindings(&self, is_known: impl Fn(&str) -> bool) -> Result<(), ValueError> {
        match self.variables().into_iter().find(|name| !is_known(name)) {
            Some(name) => Err(ValueError::UnresolvedVariable(name.to_string())),
            None => Ok(()),
        }
    }

    /// Source text the value was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

impl RandomAware for Value {
    fn set_random_source(&mut self, source: &RandomSource) {
        if self.random {
            self.expr.set_random_source(source);
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (= {})", self.source, self.cached)
    }
}

impl std::str::FromStr for Value {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Value::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_cached_on_parse() {
        let value = Value::parse("2 * 3 + 1").unwrap();
        assert_eq!(value.cached(), 7.0);
        assert!(!value.is_random());
    }

    #[test]
    fn test_cached_is_stable_between_calculations() {
        let source = RandomSource::new(11);
        let mut value = Value::parse("rand(0, 1000)").unwrap();
        value.set_random_source(&source);

        let first = value.calculate(&Environment::new()).unwrap();
        assert_eq!(value.cached(), first);
        assert_eq!(value.cached(), first);

        let second = value.calculate(&Environment::new()).unwrap();
        assert_eq!(value.cached(), second);
        assert_ne!(first, second);
    }

    #[test]
    fn test_calculate_non_random_consumes_no_randomness() {
        let source = RandomSource::new(21);
        let handle = source.handle();
        let mut value = Value::parse("w + 1").unwrap();
        value.set_random_source(&source);
        let env: Environment = [("w", 2.0)].into_iter().collect();

        for _ in 0..5 {
            assert_eq!(value.calculate(&env).unwrap(), 3.0);
        }

        let untouched = RandomSource::new(21).handle().int_inclusive(0, i64::MAX);
        assert_eq!(handle.int_inclusive(0, i64::MAX), untouched);
    }

    #[test]
    fn test_reseed_reproduces_value_sequence() {
        let mut source = RandomSource::new(4);
        let mut value = Value::parse("randi(1, 100) * 2").unwrap();
        value.set_random_source(&source);
        let env = Environment::new();

        let run = |value: &mut Value| -> Vec<f64> {
            (0..8).map(|_| value.calculate(&env).unwrap()).collect()
        };
        let first = run(&mut value);
        source.reseed(4);
        assert_eq!(run(&mut value), first);
    }

    #[test]
    fn test_random_without_source_fails() {
        let mut value = Value::parse("rand(0, 1)").unwrap();
        assert_eq!(
            value.calculate(&Environment::new()),
            Err(ValueError::MissingRandomSource)
        );
    }

    #[test]
    fn test_check_bindings() {
        let value = Value::parse("a + max(b, 2)").unwrap();
        assert_eq!(value.variables(), vec!["a", "b"]);
        assert!(value.check_bindings(|n| n == "a" || n == "b").is_ok());
        assert_eq!(
            value.check_bindings(|n| n == "a"),
            Err(ValueError::UnresolvedVariable("b".into()))
        );
    }

    #[test]
    fn test_failed_calculate_keeps_previous_cache() {
        let mut value = Value::parse("w").unwrap();
        let env: Environment = [("w", 5.0)].into_iter().collect();
        value.calculate(&env).unwrap();
        assert!(value.calculate(&Environment::new()).is_err());
        assert_eq!(value.cached(), 5.0);
    }

    #[test]
    fn test_display() {
        let value = Value::parse(" 1 + 1 ").unwrap();
        assert_eq!(value.to_string(), "1 + 1 (= 2)");
    }
}
