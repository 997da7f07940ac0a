//! # Captured task arguments.
//!
//! Each registration captures an ordered list of [`Arg`] values that the unit reads
//! back through typed accessors. A missing or mistyped argument is a task body
//! error ([`TaskError::Arg`]), so `?` inside the task fails the run like any other error.
//!
//! ```rust
//! use taskgate::{args, Arg};
//!
//! let a = args![3, "x", true];
//! assert_eq!(a.len(), 3);
//! assert_eq!(a.int(0).unwrap(), 3);
//! assert_eq!(a.str(1).unwrap(), "x");
//! assert!(a.bool(2).unwrap());
//! assert!(a.int(1).is_err());
//! assert_eq!(a.get(0), Some(&Arg::Int(3)));
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::TaskError;

/// One captured argument.
#[derive(Clone, Debug, PartialEq)]
pub enum Arg {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(Arc<str>),
}

impl Arg {
    fn type_name(&self) -> &'static str {
        match self {
            Arg::Int(_) => "int",
            Arg::Float(_) => "float",
            Arg::Bool(_) => "bool",
            Arg::Str(_) => "string",
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Int(v) => write!(f, "{v}"),
            Arg::Float(v) => write!(f, "{v}"),
            Arg::Bool(v) => write!(f, "{v}"),
            Arg::Str(v) => f.write_str(v),
        }
    }
}

macro_rules! arg_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Arg {
            fn from(v: $t) -> Self {
                Arg::Int(i64::from(v))
            }
        })*
    };
}

arg_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<usize> for Arg {
    fn from(v: usize) -> Self {
        Arg::Int(v as i64)
    }
}

impl From<f32> for Arg {
    fn from(v: f32) -> Self {
        Arg::Float(f64::from(v))
    }
}

impl From<f64> for Arg {
    fn from(v: f64) -> Self {
        Arg::Float(v)
    }
}

impl From<bool> for Arg {
    fn from(v: bool) -> Self {
        Arg::Bool(v)
    }
}

impl From<&str> for Arg {
    fn from(v: &str) -> Self {
        Arg::Str(v.into())
    }
}

impl From<String> for Arg {
    fn from(v: String) -> Self {
        Arg::Str(v.into())
    }
}

/// Ordered, cheaply clonable argument list shared by every unit of one registration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskArgs(Arc<[Arg]>);

impl TaskArgs {
    /// Creates an argument list.
    pub fn new(args: Vec<Arg>) -> Self {
        Self(args.into())
    }

    /// Creates an empty argument list.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the raw argument at `index`.
    pub fn get(&self, index: usize) -> Option<&Arg> {
        self.0.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arg> {
        self.0.iter()
    }

    /// Returns argument `index` as an integer.
    pub fn int(&self, index: usize) -> Result<i64, TaskError> {
        match self.get(index) {
            Some(Arg::Int(v)) => Ok(*v),
            _ => Err(TaskError::Arg {
                index,
                expected: "int",
            }),
        }
    }

    /// Returns argument `index` as a float; integers are widened.
    pub fn float(&self, index: usize) -> Result<f64, TaskError> {
        match self.get(index) {
            Some(Arg::Float(v)) => Ok(*v),
            Some(Arg::Int(v)) => Ok(*v as f64),
            _ => Err(TaskError::Arg {
                index,
                expected: "float",
            }),
        }
    }

    /// Returns argument `index` as a bool.
    pub fn bool(&self, index: usize) -> Result<bool, TaskError> {
        match self.get(index) {
            Some(Arg::Bool(v)) => Ok(*v),
            _ => Err(TaskError::Arg {
                index,
                expected: "bool",
            }),
        }
    }

    /// Returns argument `index` as a string slice.
    pub fn str(&self, index: usize) -> Result<&str, TaskError> {
        match self.get(index) {
            Some(Arg::Str(v)) => Ok(&**v),
            _ => Err(TaskError::Arg {
                index,
                expected: "string",
            }),
        }
    }
}

impl fmt::Display for TaskArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, arg) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}: {}", arg.type_name())?;
        }
        f.write_str(")")
    }
}

impl From<Vec<Arg>> for TaskArgs {
    fn from(args: Vec<Arg>) -> Self {
        Self::new(args)
    }
}

impl From<()> for TaskArgs {
    fn from(_: ()) -> Self {
        Self::empty()
    }
}

impl FromIterator<Arg> for TaskArgs {
    fn from_iter<I: IntoIterator<Item = Arg>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Builds a [`TaskArgs`] from heterogeneous values.
///
/// `args![]` is the empty list; every element goes through `Arg::from`.
#[macro_export]
macro_rules! args {
    () => {
        $crate::TaskArgs::empty()
    };
    ($($arg:expr),+ $(,)?) => {
        $crate::TaskArgs::new(vec![$($crate::Arg::from($arg)),+])
    };
}
