//! Model descriptors parsed from an exchange-file header.
//!
//! The header has the shape `NAME(VAR; P1, P2, ...) = EXPRESSION`. The
//! variable is bound to slot 0 and parameter `i` to slot `i + 1`, so the
//! compiled expression is evaluated as `f(x, p1, p2, ...)`.

use crate::domain::Dimensionality;
use crate::error::AppError;
use crate::models::expr::{Expr, SymbolTable};

#[derive(Debug, Clone)]
pub struct ModelDescriptor {
    name: String,
    variable: String,
    parameters: Vec<String>,
    expression_source: String,
    expression: Expr,
}

impl ModelDescriptor {
    /// Parse a header line. There is no fallback: anything that does not match
    /// the expected shape is a format error.
    pub fn parse_header(line: &str) -> Result<Self, AppError> {
        let line = line.trim();
        let shape_error = || {
            AppError::format(format!(
                "Header '{line}' does not match 'NAME(VAR; P1, P2, ...) = EXPRESSION'."
            ))
        };

        let (name, rest) = line.split_once('(').ok_or_else(shape_error)?;
        let (variable, rest) = rest.split_once(';').ok_or_else(shape_error)?;
        let (params, rest) = rest.split_once(')').ok_or_else(shape_error)?;
        let expression_source = rest.trim_start().strip_prefix('=').ok_or_else(shape_error)?;

        let name = name.trim();
        let variable = variable.trim();
        let expression_source = expression_source.trim();
        if name.is_empty() || variable.is_empty() || expression_source.is_empty() {
            return Err(shape_error());
        }

        let parameters: Vec<String> = params.split(',').map(|p| p.trim().to_string()).collect();
        if parameters.iter().any(|p| p.is_empty()) {
            return Err(AppError::format(format!(
                "Header '{line}' has an empty parameter name."
            )));
        }

        let mut names = Vec::with_capacity(parameters.len() + 1);
        names.push(variable.to_string());
        names.extend(parameters.iter().cloned());
        let symbols = SymbolTable::from_names(&names).ok_or_else(|| {
            AppError::format(format!(
                "Header '{line}' repeats a name among its variable and parameters."
            ))
        })?;

        let expression = Expr::parse(expression_source, &symbols)?;

        Ok(Self {
            name: name.to_string(),
            variable: variable.to_string(),
            parameters,
            expression_source: expression_source.to_string(),
            expression,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    pub fn parameter_index(&self, name: &str) -> Option<usize> {
        self.parameters.iter().position(|p| p == name)
    }

    /// The expression text exactly as it appeared in the header.
    pub fn expression_source(&self) -> &str {
        &self.expression_source
    }

    pub fn expression(&self) -> &Expr {
        &self.expression
    }

    pub fn dimensionality(&self) -> Dimensionality {
        Dimensionality::from_parameter_count(self.parameters.len())
    }

    /// Evaluate the model at a single `x`.
    ///
    /// # Panics
    /// Panics if `params.len()` differs from the parameter count.
    pub fn evaluate(&self, x: f64, params: &[f64]) -> f64 {
        let mut slots = self.slots(params);
        slots[0] = x;
        self.expression.eval(&slots)
    }

    /// Evaluate the model at every `x` in `xs`.
    ///
    /// # Panics
    /// Panics if `params.len()` differs from the parameter count.
    pub fn evaluate_many(&self, xs: &[f64], params: &[f64]) -> Vec<f64> {
        let mut slots = self.slots(params);
        xs.iter()
            .map(|&x| {
                slots[0] = x;
                self.expression.eval(&slots)
            })
            .collect()
    }

    /// `NAME(VAR; P1, P2)` without the expression.
    pub fn signature(&self) -> String {
        format!("{}({}; {})", self.name, self.variable, self.parameters.join(", "))
    }

    /// A header line that parses back to an equivalent descriptor.
    pub fn header_line(&self) -> String {
        format!("{} = {}", self.signature(), self.expression)
    }

    fn slots(&self, params: &[f64]) -> Vec<f64> {
        assert_eq!(
            params.len(),
            self.parameters.len(),
            "{} takes {} parameters, got {}",
            self.name,
            self.parameters.len(),
            params.len()
        );
        let mut slots = Vec::with_capacity(params.len() + 1);
        slots.push(0.0);
        slots.extend_from_slice(params);
        slots
    }
}
