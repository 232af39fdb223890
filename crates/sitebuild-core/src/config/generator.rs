//! Interpreter detection for generated helper scripts

/// Python interpreters in order of preference
const PYTHON_RUNTIMES: &[&str] = &["python3", "python"];

/// Detect the available Python interpreter
pub fn detect_python() -> &'static str {
    for runtime in PYTHON_RUNTIMES {
        if std::process::Command::new(runtime)
            .arg("--version")
            .output()
            .is_ok_and(|o| o.status.success())
        {
            return runtime;
        }
    }
    // Default to python3 if nothing detected (launch will fail with a clear error)
    PYTHON_RUNTIMES[0]
}
