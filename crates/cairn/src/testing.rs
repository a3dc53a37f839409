use crate::alloc::AllocError;
use crate::error::Error;

pub(crate) trait TestExt<T> {
    fn abort(self) -> T;
}

impl<T> TestExt<T> for Result<T, Error> {
    fn abort(self) -> T {
        match self {
            Ok(value) => value,
            Err(error) => handle_error(error),
        }
    }
}

impl<T> TestExt<T> for Result<T, AllocError> {
    fn abort(self) -> T {
        match self {
            Ok(value) => value,
            Err(error) => handle_error(Error::from(error)),
        }
    }
}

fn handle_error(error: Error) -> ! {
    panic!("{}", error)
}
