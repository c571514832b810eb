fn main() {
    // Only propagate the ESP-IDF sysenv when building for the device;
    // host builds (tests, clippy) skip it.
    if std::env::var_os("CARGO_FEATURE_ESPIDF").is_some() {
        embuild::espidf::sysenv::output();
    }
}
