use crate::{filter::FilterSpec, log::Notice, region::Region, value::Value};

/// A compiled expression that can be rendered with a `Store`.
///
/// An `Expression` owns the text it was compiled from, the base that
/// begins the pipeline, and the validated filter steps that follow it.
/// It is immutable once compiled, and may be shared freely between
/// threads and rendered concurrently.
///
/// Equality compares what the expression means, not where its pieces sat
/// in the source text, so differences in whitespace around pipes never
/// distinguish two compiled expressions.
#[derive(Debug, Clone)]
pub struct Expression {
    /// The text this expression was compiled from.
    pub(crate) source: String,
    /// The name of the expression, if it was stored in an engine.
    pub(crate) name: Option<String>,
    /// The literal or variable that begins the pipeline.
    pub(crate) base: Base,
    /// The filter steps applied to the base, in order.
    pub(crate) filters: Vec<FilterStep>,
    /// Non-fatal diagnostics collected during compilation.
    pub(crate) notices: Vec<Notice>,
}

impl Expression {
    /// Return the text this expression was compiled from.
    pub fn get_source(&self) -> &str {
        &self.source
    }

    /// Return the name of the expression, if any.
    pub fn get_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Return the filter steps applied by this expression, in order.
    pub fn get_steps(&self) -> &[FilterStep] {
        &self.filters
    }

    /// Return the non-fatal diagnostics collected while this expression
    /// was compiled.
    pub fn get_notices(&self) -> &[Notice] {
        &self.notices
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.filters.len() == other.filters.len()
            && base_matches(&self.base, &self.source, &other.base, &other.source)
            && self
                .filters
                .iter()
                .zip(other.filters.iter())
                .all(|(left, right)| {
                    left.name.literal(&self.source) == right.name.literal(&other.source)
                        && left.spec == right.spec
                        && match (&left.argument, &right.argument) {
                            (Some(a), Some(b)) => {
                                base_matches(a, &self.source, b, &other.source)
                            }
                            (None, None) => true,
                            _ => false,
                        }
                })
    }
}

/// Return true when two [`Base`] instances mean the same thing, reading
/// each side's segments out of its own source text.
fn base_matches(left: &Base, left_source: &str, right: &Base, right_source: &str) -> bool {
    match (left, right) {
        (Base::Literal(a), Base::Literal(b)) => a.value == b.value,
        (Base::Variable(a), Base::Variable(b)) => {
            a.path.len() == b.path.len()
                && a.path
                    .iter()
                    .zip(b.path.iter())
                    .all(|(left_key, right_key)| {
                        left_key.literal(left_source) == right_key.literal(right_source)
                    })
        }
        _ => false,
    }
}

/// The value at the beginning of a pipeline, or a filter argument.
///
/// ## Literal
///
/// A literal value is some literal data, such as a string or number.
///
/// ## Variable
///
/// A variable is a dotted path such as "person.name" which indicates
/// the location of the true value within the Store.
#[derive(Debug, Clone)]
pub enum Base {
    /// A value located in the Store.
    Variable(Variable),
    /// A literal value located directly in the expression source.
    Literal(Literal),
}

impl Base {
    /// Get a Region from the underlying Base kind.
    pub fn get_region(&self) -> Region {
        match self {
            Base::Variable(variable) => variable.get_region(),
            Base::Literal(literal) => literal.region,
        }
    }
}

/// Set of path segments that can be used to locate data within the Store.
#[derive(Debug, Clone)]
pub struct Variable {
    /// Segments of the path, in order. Never empty.
    pub path: Vec<Region>,
}

impl Variable {
    /// Get a Region spanning the area from the first and last segments.
    pub fn get_region(&self) -> Region {
        self.path
            .first()
            .expect("variable path should always have at least one segment")
            .combine(
                *self
                    .path
                    .last()
                    .expect("variable path should always have at least one segment"),
            )
    }
}

/// Literal data that does not need to be evaluated any further.
///
/// String literals carry their unescaped text.
#[derive(Debug, Clone)]
pub struct Literal {
    /// The parsed value.
    pub value: Value,
    /// Location of the literal in the source.
    pub region: Region,
}

/// A single validated filter application within a pipeline.
#[derive(Debug, Clone)]
pub struct FilterStep {
    /// The name of the filter.
    pub name: Region,
    /// The argument passed to the filter, if any.
    pub argument: Option<Base>,
    /// The call contract the name resolved to when the expression was
    /// compiled.
    pub spec: FilterSpec,
    /// Location of the whole step in the source.
    pub region: Region,
}

impl FilterStep {
    /// Return the call contract the filter name resolved to.
    pub fn get_spec(&self) -> &FilterSpec {
        &self.spec
    }
}
