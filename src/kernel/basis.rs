//! The kernel basis: numeric semantics and symbolic printers.
//!
//! Arithmetic kernels fold over all connected operands. Function-style
//! kernels (`sin`, `log`, ...) read only their first operand; extra
//! connections are ignored, which keeps every kernel usable at any arity.

use serde::{Deserialize, Serialize};

/// A primitive operation computed by an expression node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Kernel {
    /// Sum of all operands.
    Sum,
    /// First operand minus the remaining ones.
    Diff,
    /// Product of all operands.
    Mul,
    /// First operand divided by the remaining ones (IEEE semantics).
    Div,
    /// Protected division: a non-finite quotient collapses to 1.
    Pdiv,
    /// Sine of the first operand.
    Sin,
    /// Cosine of the first operand.
    Cos,
    /// Natural logarithm of the first operand.
    Log,
    /// Exponential of the first operand.
    Exp,
    /// Square root of the first operand.
    Sqrt,
    /// Gaussian `exp(-x^2)` of the first operand.
    Gaussian,
    /// Hyperbolic tangent of the first operand.
    Tanh,
    /// Logistic sigmoid of the first operand.
    Sig,
    /// Rectified linear unit of the first operand.
    Relu,
}

impl Kernel {
    /// Every kernel in the basis, in a stable order.
    pub const ALL: [Self; 14] = [
        Self::Sum,
        Self::Diff,
        Self::Mul,
        Self::Div,
        Self::Pdiv,
        Self::Sin,
        Self::Cos,
        Self::Log,
        Self::Exp,
        Self::Sqrt,
        Self::Gaussian,
        Self::Tanh,
        Self::Sig,
        Self::Relu,
    ];

    /// The wire name of this kernel, as accepted by [`Kernel::parse`].
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Diff => "diff",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Pdiv => "pdiv",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Log => "log",
            Self::Exp => "exp",
            Self::Sqrt => "sqrt",
            Self::Gaussian => "gaussian",
            Self::Tanh => "tanh",
            Self::Sig => "sig",
            Self::Relu => "relu",
        }
    }

    /// Look up a kernel by its wire name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.name() == name)
    }

    /// Evaluate this kernel over the connected operand values.
    ///
    /// The operand slice holds exactly the node's arity; function-style
    /// kernels use only the first entry.
    #[must_use]
    pub fn eval(self, operands: &[f64]) -> f64 {
        let first = operands.first().copied().unwrap_or(0.0);
        match self {
            Self::Sum => operands.iter().sum(),
            Self::Diff => operands.iter().skip(1).fold(first, |acc, x| acc - x),
            Self::Mul => operands.iter().product(),
            Self::Div => operands.iter().skip(1).fold(first, |acc, x| acc / x),
            Self::Pdiv => {
                let q = operands.iter().skip(1).fold(first, |acc, x| acc / x);
                if q.is_finite() { q } else { 1.0 }
            }
            Self::Sin => first.sin(),
            Self::Cos => first.cos(),
            Self::Log => first.ln(),
            Self::Exp => first.exp(),
            Self::Sqrt => first.sqrt(),
            Self::Gaussian => (-first * first).exp(),
            Self::Tanh => first.tanh(),
            Self::Sig => 1.0 / (1.0 + (-first).exp()),
            Self::Relu => first.max(0.0),
        }
    }

    /// Render this kernel applied to the given operand expressions.
    #[must_use]
    pub fn print(self, operands: &[String]) -> String {
        let first = operands.first().map_or("", String::as_str);
        match self {
            Self::Sum => format!("({})", operands.join("+")),
            Self::Diff => format!("({})", operands.join("-")),
            Self::Mul => format!("({})", operands.join("*")),
            Self::Div | Self::Pdiv => format!("({})", operands.join("/")),
            Self::Sin => format!("sin({first})"),
            Self::Cos => format!("cos({first})"),
            Self::Log => format!("log({first})"),
            Self::Exp => format!("exp({first})"),
            Self::Sqrt => format!("sqrt({first})"),
            Self::Gaussian => format!("exp(-{first}**2)"),
            Self::Tanh => format!("tanh({first})"),
            Self::Sig => format!("sig({first})"),
            Self::Relu => format!("relu({first})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_names() {
        for kernel in Kernel::ALL {
            assert_eq!(Kernel::parse(kernel.name()), Some(kernel));
        }
        assert_eq!(Kernel::parse("frobnicate"), None);
    }

    #[test]
    fn test_arithmetic_folds_all_operands() {
        assert!((Kernel::Sum.eval(&[1.0, 2.0, 3.0]) - 6.0).abs() < 1e-12);
        assert!((Kernel::Diff.eval(&[10.0, 3.0, 2.0]) - 5.0).abs() < 1e-12);
        assert!((Kernel::Mul.eval(&[2.0, 3.0, 4.0]) - 24.0).abs() < 1e-12);
        assert!((Kernel::Div.eval(&[12.0, 3.0, 2.0]) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_pdiv_collapses_non_finite() {
        assert!(Kernel::Div.eval(&[1.0, 0.0]).is_infinite());
        assert!((Kernel::Pdiv.eval(&[1.0, 0.0]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_unary_kernels_ignore_extra_operands() {
        let lhs = Kernel::Sin.eval(&[0.5, 100.0]);
        let rhs = Kernel::Sin.eval(&[0.5]);
        assert!((lhs - rhs).abs() < 1e-12);
    }

    #[test]
    fn test_print_infix_and_function_style() {
        let args = vec!["x".to_string(), "y".to_string()];
        assert_eq!(Kernel::Sum.print(&args), "(x+y)");
        assert_eq!(Kernel::Div.print(&args), "(x/y)");
        assert_eq!(Kernel::Sin.print(&args), "sin(x)");
        assert_eq!(Kernel::Gaussian.print(&args), "exp(-x**2)");
    }
}
