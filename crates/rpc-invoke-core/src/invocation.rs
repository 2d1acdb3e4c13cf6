//! Invocations and their responses.
//!
//! An [`Invocation`] is a named, parameterized, synchronously callable unit of
//! remote work. It is cheap to clone and may be invoked any number of times;
//! whether a second call is safe for the remote side is the caller's concern.
//!
//! A [`Response`] is the outcome of a single attempt. It only exists inside the
//! failover machinery: callers of the requester see a plain `Result`.

use crate::error::BoxError;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// A parameter bound to an invocation, kept for diagnostics.
pub type Parameter = Arc<dyn fmt::Debug + Send + Sync>;

type Call<T> = Arc<dyn Fn() -> Result<T, BoxError> + Send + Sync>;

/// A named, repeatable unit of remote work.
pub struct Invocation<T> {
    name: Arc<str>,
    parameters: Arc<[Parameter]>,
    call: Call<T>,
}

impl<T> Clone for Invocation<T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            parameters: Arc::clone(&self.parameters),
            call: Arc::clone(&self.call),
        }
    }
}

impl<T> Invocation<T> {
    /// Creates an invocation without parameters.
    pub fn new<F, E>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        InvocationBuilder::new(name).build(f)
    }

    /// Starts building an invocation named `name`.
    pub fn builder(name: impl Into<String>) -> InvocationBuilder {
        InvocationBuilder::new(name)
    }

    /// The operation name; also the scope the requester derives for this call.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The bound parameters, in order.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Performs one attempt.
    pub fn invoke(&self) -> Result<T, BoxError> {
        (self.call)()
    }

    /// Performs one attempt and captures the outcome as a [`Response`].
    pub fn attempt(&self) -> Response<T> {
        self.invoke().into()
    }

    /// Returns an invocation with the same name and parameters whose call is
    /// `wrapper` applied to this invocation.
    pub fn wrap<F>(self, wrapper: F) -> Invocation<T>
    where
        F: Fn(&Invocation<T>) -> Result<T, BoxError> + Send + Sync + 'static,
        T: 'static,
    {
        let name = Arc::clone(&self.name);
        let parameters = Arc::clone(&self.parameters);
        let inner = self;
        Invocation {
            name,
            parameters,
            call: Arc::new(move || wrapper(&inner)),
        }
    }
}

impl<T> fmt::Debug for Invocation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .finish()
    }
}

impl<T> fmt::Display for Invocation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, parameter) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}", parameter)?;
        }
        write!(f, ")")
    }
}

/// Builder binding parameters to an [`Invocation`].
pub struct InvocationBuilder {
    name: String,
    parameters: Vec<Parameter>,
}

impl InvocationBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
        }
    }

    /// Appends a parameter.
    pub fn parameter<P>(mut self, parameter: P) -> Self
    where
        P: fmt::Debug + Send + Sync + 'static,
    {
        self.parameters.push(Arc::new(parameter));
        self
    }

    /// Finishes the invocation with the call to perform on each attempt.
    pub fn build<T, F, E>(self, f: F) -> Invocation<T>
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Invocation {
            name: Arc::from(self.name),
            parameters: Arc::from(self.parameters),
            call: Arc::new(move || f().map_err(Into::into)),
        }
    }
}

/// The outcome of one invocation attempt: exactly one of a value or a failure.
pub enum Response<T> {
    /// The attempt produced a value.
    Success(T),
    /// The attempt failed.
    Failure(BoxError),
}

impl<T> Response<T> {
    /// A successful response.
    pub fn success(value: T) -> Self {
        Response::Success(value)
    }

    /// A failed response.
    pub fn failure(error: impl Into<BoxError>) -> Self {
        Response::Failure(error.into())
    }

    /// Returns `true` if this response carries a value.
    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success(_))
    }

    /// Returns `true` if this response carries a failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, Response::Failure(_))
    }

    /// The value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Response::Success(value) => Some(value),
            Response::Failure(_) => None,
        }
    }

    /// The failure, if any.
    pub fn error(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        match self {
            Response::Success(_) => None,
            Response::Failure(error) => Some(error.as_ref()),
        }
    }

    /// Converts into a plain `Result`.
    pub fn into_result(self) -> Result<T, BoxError> {
        match self {
            Response::Success(value) => Ok(value),
            Response::Failure(error) => Err(error),
        }
    }
}

impl<T, E> From<Result<T, E>> for Response<T>
where
    E: Into<BoxError>,
{
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Response::Success(value),
            Err(error) => Response::Failure(error.into()),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Response<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Success(value) => f.debug_tuple("Success").field(value).finish(),
            Response::Failure(error) => f.debug_tuple("Failure").field(error).finish(),
        }
    }
}
