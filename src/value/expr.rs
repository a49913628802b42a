//! Expression tree for [`Value`](super::Value).
//!
//! Operators and named functions share one representation: a [`Func`]
//! applied to evaluated arguments. Random functions live in their own node
//! type, [`RandomCall`], which is the only node that needs a random source.

use super::env::Environment;
use super::random::{RandomAware, RandomHandle, RandomSource};
use super::ValueError;

/// Deterministic functions, including arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Neg,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Min,
    Max,
    Abs,
    Floor,
    Ceil,
    Round,
    Sqrt,
    Clamp,
}

impl Func {
    /// Look up a named function. Operators have no name and are not returned.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "min" => Func::Min,
            "max" => Func::Max,
            "abs" => Func::Abs,
            "floor" => Func::Floor,
            "ceil" => Func::Ceil,
            "round" => Func::Round,
            "sqrt" => Func::Sqrt,
            "clamp" => Func::Clamp,
            _ => return None,
        })
    }

    /// Name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Func::Neg => "neg",
            Func::Add => "+",
            Func::Sub => "-",
            Func::Mul => "*",
            Func::Div => "/",
            Func::Rem => "%",
            Func::Pow => "^",
            Func::Min => "min",
            Func::Max => "max",
            Func::Abs => "abs",
            Func::Floor => "floor",
            Func::Ceil => "ceil",
            Func::Round => "round",
            Func::Sqrt => "sqrt",
            Func::Clamp => "clamp",
        }
    }

    /// Exact number of arguments.
    pub fn arity(self) -> usize {
        match self {
            Func::Neg | Func::Abs | Func::Floor | Func::Ceil | Func::Round | Func::Sqrt => 1,
            Func::Clamp => 3,
            _ => 2,
        }
    }

    /// Apply to already evaluated arguments. `None` on an arity mismatch.
    fn apply(self, args: &[f64]) -> Option<f64> {
        Some(match (self, args) {
            (Func::Neg, [a]) => -a,
            (Func::Add, [a, b]) => a + b,
            (Func::Sub, [a, b]) => a - b,
            (Func::Mul, [a, b]) => a * b,
            (Func::Div, [a, b]) => a / b,
            (Func::Rem, [a, b]) => a % b,
            (Func::Pow, [a, b]) => a.powf(*b),
            (Func::Min, [a, b]) => a.min(*b),
            (Func::Max, [a, b]) => a.max(*b),
            (Func::Abs, [a]) => a.abs(),
            (Func::Floor, [a]) => a.floor(),
            (Func::Ceil, [a]) => a.ceil(),
            (Func::Round, [a]) => a.round(),
            (Func::Sqrt, [a]) => a.sqrt(),
            // f64::clamp panics on min > max
            (Func::Clamp, [v, lo, hi]) => v.max(*lo).min(*hi),
            _ => return None,
        })
    }
}

/// Functions that draw from the shared random source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RandomFunc {
    /// `rand(min, max)`: uniform double in `[min, max)`
    Uniform,
    /// `randi(min, max)`: uniform integer in `[min, max]`
    Int,
}

impl RandomFunc {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "rand" => Some(RandomFunc::Uniform),
            "randi" => Some(RandomFunc::Int),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RandomFunc::Uniform => "rand",
            RandomFunc::Int => "randi",
        }
    }

    pub fn arity(self) -> usize {
        2
    }
}

/// A call to a random function, holding its own handle to the shared source.
#[derive(Debug, Clone)]
pub struct RandomCall {
    pub func: RandomFunc,
    pub args: Vec<Expr>,
    source: RandomHandle,
}

impl RandomCall {
    pub fn new(func: RandomFunc, args: Vec<Expr>) -> Self {
        Self {
            func,
            args,
            source: RandomHandle::default(),
        }
    }

    fn sample(&self, env: &Environment) -> Result<f64, ValueError> {
        let [min, max] = self.args.as_slice() else {
            return Err(ValueError::Arity {
                func: self.func.name().to_string(),
                expected: self.func.arity(),
                actual: self.args.len(),
            });
        };
        let min = min.eval(env)?;
        let max = max.eval(env)?;
        if !(max - min).is_finite() || min > max {
            return Err(ValueError::InvalidRange { min, max });
        }
        let sampled = match self.func {
            RandomFunc::Uniform => self.source.uniform(min, max),
            RandomFunc::Int => {
                let (lo, hi) = (min.ceil() as i64, max.floor() as i64);
                if lo > hi {
                    return Err(ValueError::InvalidRange { min, max });
                }
                self.source.int_inclusive(lo, hi).map(|v| v as f64)
            }
        };
        sampled.ok_or(ValueError::MissingRandomSource)
    }
}

impl RandomAware for RandomCall {
    fn set_random_source(&mut self, source: &RandomSource) {
        self.source = source.handle();
        for arg in &mut self.args {
            arg.set_random_source(source);
        }
    }
}

/// Expression node.
#[derive(Debug, Clone)]
pub enum Expr {
    Constant(f64),
    Variable(String),
    Call { func: Func, args: Vec<Expr> },
    Random(RandomCall),
}

impl Expr {
    /// Evaluate the subtree. Random nodes draw a fresh sample on every call.
    pub fn eval(&self, env: &Environment) -> Result<f64, ValueError> {
        match self {
            Expr::Constant(v) => Ok(*v),
            Expr::Variable(name) => env
                .get(name)
                .ok_or_else(|| ValueError::UnresolvedVariable(name.clone())),
            Expr::Call { func, args } => {
                let values = args
                    .iter()
                    .map(|arg| arg.eval(env))
                    .collect::<Result<Vec<_>, _>>()?;
                func.apply(&values).ok_or_else(|| ValueError::Arity {
                    func: func.name().to_string(),
                    expected: func.arity(),
                    actual: values.len(),
                })
            }
            Expr::Random(call) => call.sample(env),
        }
    }

    /// True if any node below (and including) this one is a random call.
    pub fn contains_random(&self) -> bool {
        match self {
            Expr::Constant(_) | Expr::Variable(_) => false,
            Expr::Call { args, .. } => args.iter().any(Expr::contains_random),
            Expr::Random(_) => true,
        }
    }

    /// Collect referenced variable names in first-occurrence order.
    pub fn collect_variables<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Constant(_) => {}
            Expr::Variable(name) => {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
            Expr::Call { args, .. } => args.iter().for_each(|a| a.collect_variables(out)),
            Expr::Random(call) => call.args.iter().for_each(|a| a.collect_variables(out)),
        }
    }
}

impl RandomAware for Expr {
    fn set_random_source(&mut self, source: &RandomSource) {
        match self {
            Expr::Constant(_) | Expr::Variable(_) => {}
            Expr::Call { args, .. } => {
                for arg in args {
                    arg.set_random_source(source);
                }
            }
            Expr::Random(call) => call.set_random_source(source),
        }
    }
}
