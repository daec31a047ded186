//! Global subscriber installation. Kept in its own test binary because the
//! global default can only be set once per process.

use colgrid::{Error, Recovery, logging};

#[test]
fn second_init_reports_logging_error() {
    logging::init().expect("first install succeeds");
    let err = logging::init().expect_err("global subscriber already set");
    assert!(matches!(err, Error::Logging(_)));
    assert_eq!(err.recovery(), Recovery::Continue);
    tracing::warn!(target: "colgrid.test", "subscriber installed");
}
