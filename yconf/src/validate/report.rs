//! Validation failures and their aggregation.

use std::fmt;

use serde_yaml::Value;

/// Category of a single validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required field is absent.
    MissingRequired,
    /// A value has the wrong type or is not one of the allowed literals.
    TypeMismatch,
    /// A key is not declared and the composite rejects extra keys.
    UnexpectedField,
    /// No alternative of a union accepts the value.
    NoMatchingAlternative,
}

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A mapping key.
    Key(String),
    /// A sequence index.
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, "{key}"),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Location of a value inside a document, from the root down.
///
/// # Examples
///
/// ```
/// use yconf::validate::FieldPath;
///
/// let path = FieldPath::root().child("folders").index(2).child("path");
/// assert_eq!(path.to_string(), "folders.2.path");
/// assert!(FieldPath::root().is_root());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// Returns the empty path denoting the document root.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new path extended by a mapping key.
    #[must_use]
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Key(key.into()));
        Self { segments }
    }

    /// Returns a new path extended by a sequence index.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Index(index));
        Self { segments }
    }

    /// Check whether this is the root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the individual segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Location of the offending value.
    pub path: FieldPath,
    /// Failure category.
    pub kind: ErrorKind,
    /// Human-readable message, without location.
    pub message: String,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(path: FieldPath, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            path,
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} in section '{}'", self.message, self.path)
        }
    }
}

impl std::error::Error for ValidationError {}

/// Every failure found in one validation pass, in discovery order.
///
/// # Examples
///
/// ```
/// use yconf::validate::{ErrorKind, FieldPath, ValidationError, ValidationReport};
///
/// let report = ValidationReport::from(vec![
///     ValidationError::new(FieldPath::root(), ErrorKind::MissingRequired, "'a' is a required property"),
///     ValidationError::new(FieldPath::root().child("b"), ErrorKind::TypeMismatch, "1 is not of type 'string'"),
/// ]);
/// assert_eq!(report.len(), 2);
/// assert_eq!(
///     report.to_string(),
///     "'a' is a required property\n1 is not of type 'string' in section 'b'"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: Vec<ValidationError>,
}

impl ValidationReport {
    /// Returns the number of failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Check whether the report holds no failures.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterate over the failures in discovery order.
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    /// Returns the failures as a slice.
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Count the failures of a given kind.
    #[must_use]
    pub fn count(&self, kind: ErrorKind) -> usize {
        self.errors.iter().filter(|e| e.kind == kind).count()
    }
}

impl From<Vec<ValidationError>> for ValidationReport {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }
}

impl IntoIterator for ValidationReport {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationReport {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}

/// Render a value the way validation messages quote it.
///
/// # Examples
///
/// ```
/// use serde_yaml::Value;
/// use yconf::validate::repr;
///
/// assert_eq!(repr(&Value::from("bar")), "'bar'");
/// assert_eq!(repr(&Value::from(true)), "True");
/// assert_eq!(repr(&Value::Null), "None");
/// ```
#[must_use]
pub fn repr(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("'{}'", s.replace('\'', "\\'")),
        Value::Sequence(items) => {
            let inner: Vec<String> = items.iter().map(repr).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Mapping(map) => {
            let inner: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", repr(k), repr(v)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
        Value::Tagged(tagged) => repr(&tagged.value),
    }
}
