//! Unit test entry point; each component's tests live under `tests/unit/`.

mod unit;
