//! Topics integration tests.

mod naming;
mod on_done;
mod on_error;
mod support;
mod teardown;
